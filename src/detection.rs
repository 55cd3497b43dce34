//! Guesses defaults for the config wizard.

use crate::notebook::Notebook;
use std::path::{Path, PathBuf};

/// Find the notebook to convert when a directory holds exactly one.
pub fn detect_notebook(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut notebooks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("ipynb"))
                    .unwrap_or(false)
        })
        .collect();

    if notebooks.len() == 1 {
        notebooks.pop()
    } else {
        None
    }
}

/// Title from the notebook metadata, falling back to a title-cased file name.
pub fn detect_title(notebook: &Notebook) -> Option<String> {
    if let Some(title) = notebook.title() {
        return Some(title.to_string());
    }

    let stem = notebook.path.file_stem()?.to_str()?;
    let title = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Output name derived from the notebook file name, safe to use as a LaTeX job name.
pub fn detect_name(notebook: &Path) -> String {
    let name = notebook
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    if name.is_empty() {
        "output".to_string()
    } else {
        name
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
