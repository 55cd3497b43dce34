use super::{ExportResult, Exporter};
use crate::notebook::Notebook;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// File stem nbconvert writes under; resources land in `notebook_files/`
const EXPORT_STEM: &str = "notebook";

/// Exports notebooks by running `jupyter nbconvert --to latex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbConvert {
    /// The `jupyter` executable
    #[serde(default = "default_program")]
    pub program: String,
    /// Appended to the nbconvert invocation, e.g. `--no-input` or preprocessor options
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_program() -> String {
    "jupyter".to_string()
}

impl Default for NbConvert {
    fn default() -> Self {
        NbConvert {
            program: default_program(),
            extra_args: Vec::default(),
        }
    }
}

impl NbConvert {
    fn command(&self, notebook_path: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("nbconvert")
            .arg("--to")
            .arg("latex")
            .arg("--output-dir")
            .arg(output_dir)
            .arg("--output")
            .arg(EXPORT_STEM)
            .args(&self.extra_args)
            .arg(notebook_path)
            .stdin(Stdio::null());
        command
    }
}

impl Exporter for NbConvert {
    fn export(&self, notebook: &Notebook) -> Result<ExportResult> {
        let workdir = tempfile::tempdir()
            .with_context(|| "Failed to create a scratch directory for nbconvert")?;

        let output = self
            .command(&notebook.path, workdir.path())
            .output()
            .with_context(|| format!("Failed to run `{} nbconvert`", self.program))?;
        if !output.status.success() {
            return Err(anyhow!(
                "`{} nbconvert` failed on {} ({}):\n{}",
                self.program,
                notebook.path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        log::debug!(
            "nbconvert: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );

        let tex_path = workdir.path().join(format!("{EXPORT_STEM}.tex"));
        let body = std::fs::read_to_string(&tex_path).with_context(|| {
            format!("nbconvert did not produce {}", tex_path.display())
        })?;
        let resources = collect_resources(workdir.path(), &tex_path)?;

        Ok(ExportResult { body, resources })
    }
}

/// Read every file below `root` except `skip`, keyed by its `/`-separated relative path.
fn collect_resources(root: &Path, skip: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    use ignore::WalkBuilder;

    let mut resources = BTreeMap::default();
    for entry in WalkBuilder::new(root).standard_filters(false).build() {
        let entry = entry.with_context(|| "Failed to walk nbconvert output directory")?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file || entry.path() == skip {
            continue;
        }

        let relative: PathBuf = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} escaped the output directory", entry.path().display()))?
            .to_path_buf();
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<String>>()
            .join("/");

        let contents = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read resource {}", entry.path().display()))?;
        resources.insert(key, contents);
    }

    Ok(resources)
}
