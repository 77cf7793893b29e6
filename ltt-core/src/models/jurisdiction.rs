use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the purchased property is located.
///
/// Every purchase in Ontario pays the provincial tax; a property inside
/// Toronto additionally pays the municipal tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Anywhere in Ontario outside Toronto.
    #[serde(rename = "other", alias = "default")]
    Default,
    #[default]
    #[serde(rename = "toronto")]
    Toronto,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "other",
            Self::Toronto => "toronto",
        }
    }

    /// Parses a location code. Case and surrounding whitespace are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "other" | "default" | "outside-toronto" => Some(Self::Default),
            "toronto" | "toronto-like" | "torontolike" => Some(Self::Toronto),
            _ => None,
        }
    }

    /// Whether the municipal layer is levied on top of the provincial tax.
    pub fn has_municipal_tax(&self) -> bool {
        matches!(self, Self::Toronto)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
