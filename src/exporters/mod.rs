use crate::notebook::Notebook;
use anyhow::Result;
use std::collections::BTreeMap;

mod nbconvert;
pub use nbconvert::*;

/// The LaTeX produced from a notebook, plus the files it refers to.
#[derive(Debug, Default, Clone)]
pub struct ExportResult {
    /// Complete LaTeX document, preamble included
    pub body: String,
    /// Relative output path (always `/`-separated) to file contents, e.g. rendered plots
    pub resources: BTreeMap<String, Vec<u8>>,
}

/// Turns a notebook into a LaTeX document.
pub trait Exporter {
    fn export(&self, notebook: &Notebook) -> Result<ExportResult>;
}
