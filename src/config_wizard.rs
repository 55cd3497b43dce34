//! Interactive configuration wizard for creating `arxiv-notebook.toml`.
//!
//! The wizard picks the notebook, then collects the title block: title, date,
//! authors, the line above the title, the running header texts and the
//! abstract. Exporter, typesetter and save settings are written with their
//! defaults so they are easy to find and edit afterwards.

use crate::assembler::Document;
use crate::detection::{detect_name, detect_notebook, detect_title};
use crate::editor::SaveSettings;
use crate::exporters::NbConvert;
use crate::header::{AuthorEntry, DateSpec, HeaderSpec};
use crate::notebook::Notebook;
use crate::typesetter::Typesetter;
use anyhow::{anyhow, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "arxiv-notebook.toml";

/// Complete configuration for converting one notebook.
#[derive(Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub document: Document,
    pub header: HeaderSpec,
    #[serde(default)]
    pub exporter: NbConvert,
    #[serde(default)]
    pub typesetter: Typesetter,
    #[serde(default)]
    pub save: SaveSettings,
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to load {} - run 'arxiv-notebook config' first",
                path.display()
            )
        })?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Run the interactive configuration wizard.
///
/// Prompts for the notebook and the title block, then writes
/// `arxiv-notebook.toml` to the current directory.
pub fn run() -> Result<()> {
    let theme = ColorfulTheme::default();

    let detected_notebook = detect_notebook(Path::new("."))
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let notebook: String = Input::with_theme(&theme)
        .with_prompt("Notebook file")
        .with_initial_text(detected_notebook)
        .allow_empty(false)
        .interact()
        .with_context(|| "Failed to obtain notebook path")?;
    let notebook_path = PathBuf::from(notebook.trim());
    if !notebook_path.is_file() {
        return Err(anyhow!("'{}' isn't a file!", notebook_path.display()));
    }
    let notebook = Notebook::load(&notebook_path)?;

    let name: String = Input::with_theme(&theme)
        .with_prompt("Output name (for the .tex and .pdf files)")
        .default(detect_name(&notebook_path))
        .interact()
        .with_context(|| "Failed to obtain output name")?;
    let output_dir: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default("output".to_string())
        .interact()
        .with_context(|| "Failed to obtain output directory")?;

    let title: String = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(detect_title(&notebook).unwrap_or_default())
        .allow_empty(false)
        .interact()
        .with_context(|| "Failed to obtain title")?;

    let date_options = [
        DateSpec::Today.to_string(),
        DateSpec::Suppressed.to_string(),
        "Custom text".to_string(),
    ];
    let date = match FuzzySelect::with_theme(&theme)
        .with_prompt("Date")
        .items(&date_options)
        .default(0)
        .interact()?
    {
        0 => DateSpec::Today,
        1 => DateSpec::Suppressed,
        _ => {
            let today = chrono::Local::now().format("%B %-d, %Y").to_string();
            let text: String = Input::with_theme(&theme)
                .with_prompt("Date text")
                .default(today)
                .interact()?;
            DateSpec::Explicit(text)
        }
    };

    let mut authors: Vec<AuthorEntry> = Vec::default();
    if Confirm::with_theme(&theme)
        .with_prompt("Do you wish to add authors?")
        .default(true)
        .interact()?
    {
        'authors: loop {
            let name = optional_input(&theme, "Author name (leave blank to move on)")?;
            let Some(name) = name else {
                break 'authors;
            };
            let author = AuthorEntry {
                name: Some(name),
                first_line: optional_input(&theme, "First line, e.g. department (optional)")?,
                second_line: optional_input(&theme, "Second line, e.g. institution (optional)")?,
                email: optional_input(&theme, "Email (optional)")?,
            };
            println!("Added {author}");
            authors.push(author);
        }
    }

    let under_title = optional_input(&theme, "Line above the title (leave empty for none)")?;
    let header_right = optional_input(
        &theme,
        "Right header text (leave empty for \"A Preprint\")",
    )?;
    let header_center = optional_input(
        &theme,
        "Centre header text (leave empty to repeat the title)",
    )?;
    let abstract_text = optional_input(&theme, "Abstract (optional)")?;

    let config = Configuration {
        document: Document {
            notebook: notebook_path,
            name: name.trim().to_string(),
            output_dir: PathBuf::from(output_dir.trim()),
        },
        header: HeaderSpec {
            title,
            date,
            under_title,
            header_right,
            header_center,
            abstract_text,
            authors: if authors.is_empty() {
                None
            } else {
                Some(authors)
            },
        },
        exporter: NbConvert::default(),
        typesetter: Typesetter::default(),
        save: SaveSettings::default(),
    };

    let config =
        toml::to_string_pretty(&config).with_context(|| "Failed to convert configuration to TOML")?;

    let config_path = PathBuf::from(CONFIG_FILE);
    if config_path.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!("{CONFIG_FILE} already exists, do you want to override it?"))
            .interact()?
    {
        println!("Configuration:");
        println!("{}", config);
    } else {
        std::fs::write(&config_path, config)
            .with_context(|| "Failed to write configuration file")?;
        println!("{CONFIG_FILE} written!");
    }

    Ok(())
}

fn optional_input(theme: &ColorfulTheme, prompt: &str) -> Result<Option<String>> {
    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact()?;
    let value = value.trim();
    Ok(if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    })
}
