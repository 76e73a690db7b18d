//! Closed set of task categories.

use super::ParseCategoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a task at posting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    /// Anything that does not fit a more specific category.
    General,
    /// Course work, notes sharing, and study help.
    Academic,
    /// Technical help such as device or software troubleshooting.
    Technical,
    /// Errands around campus.
    Errand,
    /// Everything else.
    Other,
}

impl TaskCategory {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Academic => "ACADEMIC",
            Self::Technical => "TECHNICAL",
            Self::Errand => "ERRAND",
            Self::Other => "OTHER",
        }
    }

    /// Returns the human-readable display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Academic => "Academic",
            Self::Technical => "Technical",
            Self::Errand => "Errand",
            Self::Other => "Other",
        }
    }

    /// All categories in presentation order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::General,
            Self::Academic,
            Self::Technical,
            Self::Errand,
            Self::Other,
        ]
    }
}

impl TryFrom<&str> for TaskCategory {
    type Error = ParseCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "GENERAL" => Ok(Self::General),
            "ACADEMIC" => Ok(Self::Academic),
            "TECHNICAL" => Ok(Self::Technical),
            "ERRAND" => Ok(Self::Errand),
            "OTHER" => Ok(Self::Other),
            _ => Err(ParseCategoryError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
