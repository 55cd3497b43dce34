/// File name the style is written under; the header loads it with `\usepackage{arxiv}`
pub const STYLE_FILE_NAME: &str = "arxiv.sty";

/// The arXiv preprint style (derived from the NeurIPS 2018 style), bundled at build time.
pub const ARXIV_STYLE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/arxiv.sty"));
