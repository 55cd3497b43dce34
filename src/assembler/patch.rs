//! Rewrites the exporter's LaTeX so the arXiv style can take over.
//!
//! These are the only places that depend on the exact text nbconvert emits:
//!
//! | target                              | action                        |
//! |-------------------------------------|-------------------------------|
//! | `\usepackage[...]{geometry}`        | commented out                 |
//! | `\geometry{...}`                    | commented out                 |
//! | `\maketitle`                        | removed                       |
//! | first `\begin{document}`            | replaced by the title block   |
//!
//! The style loads geometry itself and the title block renders the title, so
//! leaving either in place would conflict or duplicate.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const DOCUMENT_START: &str = r"\begin{document}";

static GEOMETRY_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage(?:\[[^\]]*\])?\{geometry\}").expect("geometry package regex is valid")
});
static GEOMETRY_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\geometry\{").expect("geometry call regex is valid"));
static MAKETITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\maketitle\b").expect("maketitle regex is valid"));

/// How many times each target matched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    pub geometry_packages: usize,
    pub geometry_calls: usize,
    pub titles_removed: usize,
    pub document_starts: usize,
}

/// Apply the substitutions and splice `fragment` in at the document start.
pub fn patch_body(body: &str, fragment: &str) -> Result<(String, PatchReport)> {
    let report = PatchReport {
        geometry_packages: GEOMETRY_PACKAGE.find_iter(body).count(),
        geometry_calls: GEOMETRY_CALL.find_iter(body).count(),
        titles_removed: MAKETITLE.find_iter(body).count(),
        document_starts: body.matches(DOCUMENT_START).count(),
    };

    let body = GEOMETRY_PACKAGE.replace_all(body, "%${0}");
    let body = GEOMETRY_CALL.replace_all(&body, "%${0}");
    // before the splice, so the fragment's own \maketitle survives
    let body = MAKETITLE.replace_all(&body, "");

    let start = body.find(DOCUMENT_START).ok_or_else(|| {
        anyhow!("The exported LaTeX has no {DOCUMENT_START}, so there is nowhere to put the title block")
    })?;

    if report.document_starts > 1 {
        log::warn!(
            "exported LaTeX contains {} occurrences of {DOCUMENT_START}, only the first was replaced",
            report.document_starts
        );
    }
    if report.geometry_packages == 0 && report.geometry_calls == 0 {
        log::debug!("exported LaTeX does not load geometry");
    }
    if report.titles_removed == 0 {
        log::debug!("exported LaTeX has no \\maketitle");
    }

    let mut patched = String::with_capacity(body.len() + fragment.len());
    patched.push_str(&body[..start]);
    patched.push_str(fragment);
    patched.push_str(&body[start + DOCUMENT_START.len()..]);

    Ok((patched, report))
}
