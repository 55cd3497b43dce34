use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the author block.
///
/// Every field is optional; present fields are always written in the order
/// name, first line, second line, email.
#[derive(Builder, Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct AuthorEntry {
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Usually the department
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<String>,
    /// Usually the institution
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_line: Option<String>,
    #[builder(setter(into, strip_option), default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthorEntry {
    /// The plain text lines of the entry, in presentation order. The email is not included.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        [&self.name, &self.first_line, &self.second_line]
            .into_iter()
            .filter_map(|line| line.as_deref())
    }
}

impl fmt::Display for AuthorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.lines().collect();
        if let Some(email) = &self.email {
            parts.push(email);
        }
        if parts.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
