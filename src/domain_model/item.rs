use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an element inside one of the portfolio lists.
/// Assigned once when the element is appended and never reassigned.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        ItemId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id can be addressed as a single URL path segment.
    pub fn is_addressable(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'))
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_owned())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListName {
    Experience,
    Certifications,
    Skills,
}

impl ListName {
    /// Singular label used in messages ("Experience not found").
    pub fn label(&self) -> &'static str {
        match self {
            ListName::Experience => "Experience",
            ListName::Certifications => "Certification",
            ListName::Skills => "Skill",
        }
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListName::Experience => "experience",
            ListName::Certifications => "certifications",
            ListName::Skills => "skills",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ListName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(ListName::Experience),
            "certification" | "certifications" => Ok(ListName::Certifications),
            "skill" | "skills" => Ok(ListName::Skills),
            other => Err(format!("unknown list: {}", other)),
        }
    }
}
