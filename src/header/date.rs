use serde::{Deserialize, Serialize};
use std::fmt;

/// How the title block dates the document.
///
/// In the project file this is written as `date = true`, `date = false` or
/// `date = "some text"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawDate", into = "RawDate")]
pub enum DateSpec {
    /// Leave `\date` alone so LaTeX prints the day the PDF is typeset
    #[default]
    Today,
    /// Emit an empty `\date{}`
    Suppressed,
    /// Emit `\date{...}` with this text verbatim
    Explicit(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Flag(bool),
    Text(String),
}

impl From<RawDate> for DateSpec {
    fn from(raw: RawDate) -> Self {
        match raw {
            RawDate::Flag(true) => DateSpec::Today,
            RawDate::Flag(false) => DateSpec::Suppressed,
            RawDate::Text(text) => DateSpec::Explicit(text),
        }
    }
}

impl From<DateSpec> for RawDate {
    fn from(date: DateSpec) -> Self {
        match date {
            DateSpec::Today => RawDate::Flag(true),
            DateSpec::Suppressed => RawDate::Flag(false),
            DateSpec::Explicit(text) => RawDate::Text(text),
        }
    }
}

impl From<Option<String>> for DateSpec {
    /// `None` is the "no date" case, matching an explicit `false`.
    fn from(date: Option<String>) -> Self {
        match date {
            Some(text) => DateSpec::Explicit(text),
            None => DateSpec::Suppressed,
        }
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSpec::Today => write!(f, "Today's date (set by LaTeX)"),
            DateSpec::Suppressed => write!(f, "No date"),
            DateSpec::Explicit(text) => write!(f, "{text}"),
        }
    }
}
