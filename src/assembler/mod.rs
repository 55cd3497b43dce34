//! Notebook to PDF conversion.
//!
//! The pipeline is strictly sequential:
//! 1. build the title block from the header settings
//! 2. optionally have the editor save the notebook
//! 3. load and validate the notebook
//! 4. export it to LaTeX
//! 5. patch the LaTeX (see [`patch`]) and splice in the title block
//! 6. write `arxiv.sty`, `<name>.tex` and the exported resources into the output directory
//! 7. run the typesetter from inside the output directory
//!
//! The output directory is reused as-is: files left by earlier runs stay
//! unless this run writes a file of the same name.

mod patch;
pub use patch::*;

mod workdir;
pub use workdir::*;

use crate::editor::{save_and_wait, EditorSession, SaveSettings};
use crate::exporters::{ExportResult, Exporter};
use crate::header::{build_header, HeaderSpec};
use crate::notebook::{CellType, Notebook};
use crate::style::{ARXIV_STYLE, STYLE_FILE_NAME};
use crate::typesetter::Typesetter;
use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Which notebook to convert and where the results go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub notebook: PathBuf,
    /// Stem of the generated `.tex` and `.pdf` files
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_name() -> String {
    "output".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    /// Ask the editor to save the notebook before reading it
    pub save_first: bool,
    /// Echo the typesetter's output once it succeeds
    pub verbose: bool,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct AssembleStats {
    pub tex_path: PathBuf,
    pub pdf_path: PathBuf,
    pub resource_count: usize,
    pub patch: PatchReport,
    pub typesetter_output: String,
}

pub struct Assembler {
    exporter: Box<dyn Exporter>,
    typesetter: Typesetter,
    editor: Option<Box<dyn EditorSession>>,
    save: SaveSettings,
}

impl Assembler {
    pub fn new<E: Exporter + 'static>(exporter: E, typesetter: Typesetter) -> Assembler {
        Assembler {
            exporter: Box::new(exporter),
            typesetter,
            editor: None,
            save: SaveSettings::default(),
        }
    }

    pub fn with_editor<S: EditorSession + 'static>(
        mut self,
        editor: S,
        settings: SaveSettings,
    ) -> Assembler {
        self.editor = Some(Box::new(editor));
        self.save = settings;
        self
    }

    /// Convert `document.notebook` into `<output_dir>/<name>.pdf`.
    pub fn assemble(
        &self,
        document: &Document,
        header: &HeaderSpec,
        options: RunOptions,
        progress: &ProgressBar,
        console: &mut dyn Write,
    ) -> Result<AssembleStats> {
        check_name(&document.name)?;
        let fragment = build_header(header);

        if options.save_first {
            let editor = self.editor.as_deref().ok_or_else(|| {
                anyhow!("Saving first needs an editor save command under [save] in the configuration")
            })?;
            progress.set_message("Saving notebook...");
            save_and_wait(editor, &document.notebook, &self.save)
                .with_context(|| "Failed to save the notebook")?;
        }

        progress.set_message("Loading notebook...");
        let notebook = Notebook::load(&document.notebook)?;
        log::debug!(
            "{}: {} code cells, {} markdown cells",
            notebook.path.display(),
            notebook.count_cells(CellType::Code),
            notebook.count_cells(CellType::Markdown)
        );

        progress.set_message("Exporting notebook to LaTeX...");
        let ExportResult { body, resources } = self
            .exporter
            .export(&notebook)
            .with_context(|| format!("Failed to export {}", notebook.path.display()))?;
        for key in resources.keys() {
            check_resource_key(key)?;
        }

        let (body, patch) = patch_body(&body, &fragment)?;

        let output_dir = &document.output_dir;
        if output_dir.is_dir() {
            log::debug!(
                "reusing {}, files from earlier runs are kept",
                output_dir.display()
            );
        } else {
            std::fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }
        let output_dir = std::fs::canonicalize(output_dir)
            .with_context(|| format!("Failed to resolve {}", output_dir.display()))?;

        let tex_name = format!("{}.tex", document.name);
        let typesetter_output = {
            let _cwd = WorkingDirGuard::enter(&output_dir)?;

            std::fs::write(STYLE_FILE_NAME, ARXIV_STYLE)
                .with_context(|| format!("Failed to write {STYLE_FILE_NAME}"))?;
            std::fs::write(&tex_name, &body)
                .with_context(|| format!("Failed to write {tex_name}"))?;

            for (key, contents) in resources.iter() {
                let path = Path::new(key);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create resource directory {}", parent.display())
                    })?;
                }
                std::fs::write(path, contents)
                    .with_context(|| format!("Failed to write resource {key}"))?;
            }

            progress.set_message("Typesetting...");
            let output = self
                .typesetter
                .run(&tex_name)
                .with_context(|| format!("Failed to typeset {tex_name}"))?;

            if options.verbose {
                progress
                    .suspend(|| writeln!(console, "{output}"))
                    .with_context(|| "Failed to print the typesetter output")?;
            }
            output
        };

        let pdf_path = output_dir.join(format!("{}.pdf", document.name));
        if !pdf_path.is_file() {
            log::warn!(
                "{} finished but {} does not exist",
                self.typesetter.program,
                pdf_path.display()
            );
        }

        Ok(AssembleStats {
            tex_path: output_dir.join(tex_name),
            pdf_path,
            resource_count: resources.len(),
            patch,
            typesetter_output,
        })
    }
}

fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(anyhow!(
            "Output name '{name}' must be a plain file name without directories"
        )),
    }
}

/// Resource keys come from the exporter and must stay inside the output directory.
fn check_resource_key(key: &str) -> Result<()> {
    let path = Path::new(key);
    let inside = path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(anyhow!(
            "Refusing to write exported resource '{key}' outside the output directory"
        ))
    }
}
