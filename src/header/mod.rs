//! Title block generation.
//!
//! Builds the LaTeX fragment that activates the arXiv style and sets up the
//! title, date, authors, running headers and abstract. The fragment starts
//! with `\usepackage{arxiv}` and contains `\begin{document}`, so it is spliced
//! into the exporter's output in place of its own `\begin{document}`.
//!
//! Field values are inserted verbatim. Nothing is escaped: a title such as
//! `Profit & Loss` must be written as `Profit \& Loss` by the caller.

mod author;
pub use author::*;

mod date;
pub use date::*;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Separates two author groups inside `\author{...}`
pub const AUTHOR_CONNECTOR: &str = r"\And";
/// Ends every author line except the last entry's email
pub const LINE_CONTINUATION: &str = r"\\";

/// Everything that goes into the title block of the document.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct HeaderSpec {
    pub title: String,
    #[builder(default)]
    #[serde(default)]
    pub date: DateSpec,
    /// Small caps line above the title (the style's default is "A Preprint")
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub under_title: Option<String>,
    /// Right side of the running header
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_right: Option<String>,
    /// Centre of the running header (the style's default is the title)
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_center: Option<String>,
    #[builder(setter(into, strip_option), default)]
    #[serde(
        default,
        rename = "abstract",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_text: Option<String>,
    /// `None` leaves out `\author` entirely, an empty list still emits an empty block
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<AuthorEntry>>,
}

/// Build the LaTeX title block for `spec`.
pub fn build_header(spec: &HeaderSpec) -> String {
    let mut header = String::from("\\usepackage{arxiv}\n\n");
    header.push_str(&format!("\\title{{{}}}\n\n", spec.title));

    match &spec.date {
        DateSpec::Explicit(date) => header.push_str(&format!("\\date{{{date}}}\n\n")),
        DateSpec::Suppressed => header.push_str("\\date{}\n\n"),
        // LaTeX fills in the current date on its own
        DateSpec::Today => {}
    }

    if let Some(authors) = &spec.authors {
        header.push_str(&author_block(authors));
    }

    header.push_str(&format!(
        "\\renewcommand{{\\undertitle}}{{{}}}\n",
        spec.under_title.as_deref().unwrap_or_default()
    ));

    if let Some(header_right) = &spec.header_right {
        header.push_str(&format!(
            "\\renewcommand{{\\headeright}}{{{header_right}}}\n"
        ));
    }

    if let Some(header_center) = &spec.header_center {
        header.push_str(&format!(
            "\\renewcommand{{\\shorttitle}}{{{header_center}}}\n\n"
        ));
    }

    header.push_str("\\begin{document}\n    \\maketitle\n\n");

    if let Some(abstract_text) = &spec.abstract_text {
        header.push_str("    \\begin{abstract}\n");
        header.push_str(&format!("    {abstract_text}\n"));
        header.push_str("    \\end{abstract}\n");
    }

    header
}

fn author_block(authors: &[AuthorEntry]) -> String {
    let mut block = String::from("\\author{\n");

    for (i, author) in authors.iter().enumerate() {
        let is_last = i + 1 == authors.len();

        for line in author.lines() {
            block.push_str(&format!("    {line}{LINE_CONTINUATION}\n"));
        }

        if let Some(email) = &author.email {
            if is_last {
                block.push_str(&format!("    \\texttt{{{email}}}\n"));
            } else {
                block.push_str(&format!("    \\texttt{{{email}}}{LINE_CONTINUATION}\n"));
            }
        }

        // empty entries still get their connector so group positions don't shift
        if !is_last {
            block.push_str(&format!("    {AUTHOR_CONNECTOR}\n"));
        }
    }

    block.push_str("}\n\n");
    block
}

#[cfg(test)]
mod test {
    use super::*;

    fn minimal() -> HeaderSpec {
        HeaderSpecBuilder::default()
            .title("Test Title")
            .build()
            .expect("can build header spec")
    }

    fn john_doe() -> AuthorEntry {
        AuthorEntryBuilder::default()
            .name("John Doe")
            .first_line("Department of Computer Science")
            .second_line("University of Example")
            .email("johndoe@example.com")
            .build()
            .expect("can build author")
    }

    #[test]
    fn minimal_header_is_exact() {
        let header = build_header(&minimal());
        assert_eq!(
            header,
            "\\usepackage{arxiv}\n\n\
             \\title{Test Title}\n\n\
             \\renewcommand{\\undertitle}{}\n\
             \\begin{document}\n    \\maketitle\n\n"
        );
    }

    #[test]
    fn date_today_emits_no_date_directive() {
        let header = build_header(&minimal());
        assert!(!header.contains("\\date"));
    }

    #[test]
    fn suppressed_date_emits_empty_directive() {
        let mut spec = minimal();
        spec.date = DateSpec::Suppressed;
        assert!(build_header(&spec).contains("\\date{}\n\n"));

        spec.date = DateSpec::from(None);
        assert!(build_header(&spec).contains("\\date{}\n\n"));
    }

    #[test]
    fn explicit_date_is_wrapped_verbatim() {
        let mut spec = minimal();
        spec.date = DateSpec::Explicit("21 May 2023".to_string());
        let header = build_header(&spec);
        assert!(header.contains("\\date{21 May 2023}\n\n"));
        assert_eq!(header.matches("\\date").count(), 1);
    }

    #[test]
    fn title_is_not_escaped() {
        let mut spec = minimal();
        spec.title = "Profit & $x^2$ 100%".to_string();
        assert!(build_header(&spec).contains("\\title{Profit & $x^2$ 100%}"));
    }

    #[test]
    fn single_author_block() {
        let mut spec = minimal();
        spec.authors = Some(vec![john_doe()]);
        let header = build_header(&spec);
        assert!(header.contains(
            "\\author{\n\
             \x20   John Doe\\\\\n\
             \x20   Department of Computer Science\\\\\n\
             \x20   University of Example\\\\\n\
             \x20   \\texttt{johndoe@example.com}\n\
             }\n\n"
        ));
        assert!(!header.contains(AUTHOR_CONNECTOR));
    }

    #[test]
    fn connectors_between_every_pair_of_authors() {
        let mut spec = minimal();
        spec.authors = Some(vec![
            john_doe(),
            AuthorEntry::default(),
            AuthorEntryBuilder::default()
                .email("only@example.com")
                .build()
                .expect("can build author"),
            john_doe(),
        ]);
        let header = build_header(&spec);
        assert_eq!(header.matches(AUTHOR_CONNECTOR).count(), 3);
    }

    #[test]
    fn only_the_last_email_closes_without_continuation() {
        let mut spec = minimal();
        spec.authors = Some(vec![john_doe(), john_doe()]);
        let header = build_header(&spec);

        assert_eq!(
            header
                .matches("\\texttt{johndoe@example.com}\\\\\n")
                .count(),
            1
        );
        assert!(header.contains("\\texttt{johndoe@example.com}\n}"));
        // every other line of the block carries the continuation
        assert_eq!(header.matches("Example\\\\\n").count(), 2);
        assert_eq!(header.matches("John Doe\\\\\n").count(), 2);
    }

    #[test]
    fn last_author_without_email_keeps_continuations() {
        let mut spec = minimal();
        spec.authors = Some(vec![AuthorEntryBuilder::default()
            .name("Jane Roe")
            .build()
            .expect("can build author")]);
        assert!(build_header(&spec).contains("\\author{\n    Jane Roe\\\\\n}\n\n"));
    }

    #[test]
    fn empty_author_list_still_emits_block() {
        let mut spec = minimal();
        spec.authors = Some(Vec::new());
        assert!(build_header(&spec).contains("\\author{\n}\n\n"));

        spec.authors = None;
        assert!(!build_header(&spec).contains("\\author"));
    }

    #[test]
    fn under_title_is_set_or_cleared() {
        let mut spec = minimal();
        assert!(build_header(&spec).contains("\\renewcommand{\\undertitle}{}\n"));

        spec.under_title = Some("X".to_string());
        let header = build_header(&spec);
        assert!(header.contains("\\renewcommand{\\undertitle}{X}\n"));
        assert_eq!(header.matches("\\undertitle").count(), 1);
    }

    #[test]
    fn running_headers_only_when_given() {
        let mut spec = minimal();
        let header = build_header(&spec);
        assert!(!header.contains("\\headeright"));
        assert!(!header.contains("\\shorttitle"));

        spec.header_right = Some("Right Text".to_string());
        spec.header_center = Some("Center Text".to_string());
        let header = build_header(&spec);
        assert!(header.contains("\\renewcommand{\\headeright}{Right Text}\n"));
        assert!(header.contains("\\renewcommand{\\shorttitle}{Center Text}\n\n"));
    }

    #[test]
    fn abstract_follows_maketitle() {
        let mut spec = minimal();
        spec.abstract_text = Some("This is an abstract.".to_string());
        let header = build_header(&spec);
        assert!(header.ends_with(
            "\\begin{document}\n    \\maketitle\n\n\
             \x20   \\begin{abstract}\n\
             \x20   This is an abstract.\n\
             \x20   \\end{abstract}\n"
        ));
    }

    #[test]
    fn full_header_keeps_directive_order() {
        let spec = HeaderSpecBuilder::default()
            .title("Test Title")
            .date(DateSpec::Explicit("2023-05-21".to_string()))
            .authors(vec![john_doe()])
            .under_title("Test Subheading")
            .header_right("Right Text")
            .header_center("Center Text")
            .abstract_text("This is an abstract.")
            .build()
            .expect("can build header spec");
        let header = build_header(&spec);

        let order = [
            "\\usepackage{arxiv}",
            "\\title{Test Title}",
            "\\date{2023-05-21}",
            "\\author{",
            "\\renewcommand{\\undertitle}{Test Subheading}",
            "\\renewcommand{\\headeright}{Right Text}",
            "\\renewcommand{\\shorttitle}{Center Text}",
            "\\begin{document}",
            "\\maketitle",
            "\\begin{abstract}",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| {
                header
                    .find(needle)
                    .unwrap_or_else(|| panic!("header is missing {needle}"))
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
