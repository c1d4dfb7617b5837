//! The runtime-language catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A programming-language runtime a process can be attributed to.
///
/// `Unknown` is the sentinel for "no tier produced an answer"; it is not
/// distinguished from "definitely none of these".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Go,
    Python,
    Ruby,
    Php,
    Node,
    DotNet,
    Rust,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl Language {
    /// All concrete languages, excluding the sentinel.
    pub const ALL: [Language; 8] = [
        Language::Java,
        Language::Go,
        Language::Python,
        Language::Ruby,
        Language::Php,
        Language::Node,
        Language::DotNet,
        Language::Rust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Go => "go",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Node => "node",
            Language::DotNet => "dotnet",
            Language::Rust => "rust",
            Language::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    /// Unrecognised labels parse to `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .unwrap_or(Language::Unknown))
    }
}
