//! Just enough of the Jupyter notebook format to validate input files.
//!
//! Cell contents are never interpreted here; turning cells into LaTeX is the
//! exporter's job.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
}

/// A notebook that has been read from disk and checked for basic structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    #[serde(skip)]
    pub path: PathBuf,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    /// Absent for nbformat 3 files, which keep their cells in worksheets
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Notebook {
    /// Read and validate the notebook at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Notebook> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read notebook {}", path.display()))?;
        Notebook::parse(&contents, path)
    }

    /// Parse notebook JSON, remembering `path` as the notebook's location.
    pub fn parse(contents: &str, path: &Path) -> Result<Notebook> {
        let mut notebook: Notebook = serde_json::from_str(contents)
            .with_context(|| format!("{} is not a valid notebook", path.display()))?;

        if notebook.nbformat == 0 {
            return Err(anyhow!(
                "{} has an invalid nbformat version 0",
                path.display()
            ));
        }
        if notebook.nbformat < 4 {
            log::warn!(
                "{} uses nbformat {}.{}, leaving the upgrade to the exporter",
                path.display(),
                notebook.nbformat,
                notebook.nbformat_minor
            );
        }

        notebook.path = path.to_path_buf();
        Ok(notebook)
    }

    /// The title stored in the notebook metadata, if any.
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .get("title")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    pub fn count_cells(&self, cell_type: CellType) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.cell_type == cell_type)
            .count()
    }
}

#[cfg(test)]
pub(crate) const EMPTY_NOTEBOOK: &str = r#"{
 "cells": [],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 5
}"#;
