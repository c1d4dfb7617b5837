//! Configuration for the classifier.
//!
//! Provides centralized configuration for all tiers with sensible
//! defaults. Every section deserializes with defaults filled in, so a JSON
//! document only needs the knobs it changes.

use crate::error::Result;
use crate::timeout::{DEFAULT_EXECUTABLE_TIMEOUT_MS, DEFAULT_PRIVILEGED_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Master configuration for the classification pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Executable path resolution.
    pub resolve: ResolveConfig,
    /// Binary signature inspection.
    pub inspect: InspectConfig,
    /// Privileged fallback detector.
    pub privileged: PrivilegedConfig,
    /// Per-tier time budgets.
    pub timeouts: TierTimeouts,
}

impl ClassifierConfig {
    /// Parse a (possibly partial) JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Executable path resolution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Environment variable holding the search path.
    pub path_var: String,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            path_var: "PATH".to_string(),
        }
    }
}

/// Binary signature inspection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Total bytes the inspector may read from one file (default: 32MB).
    pub max_read_bytes: u64,
    /// Sections larger than this are never loaded (default: 1MB).
    pub max_section_bytes: u64,
    /// Symbols examined when looking for runtime symbols.
    pub max_symbols: usize,
    /// Window of a PE/COFF `.data` section searched for the Go marker (default: 64KB).
    pub data_scan_bytes: u64,
    /// Longest shebang line considered.
    pub shebang_bytes: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: 32 * 1024 * 1024,
            max_section_bytes: 1024 * 1024,
            max_symbols: 200_000,
            data_scan_bytes: 64 * 1024,
            shebang_bytes: 256,
        }
    }
}

/// Privileged fallback detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegedConfig {
    /// Mount point of procfs.
    pub proc_root: PathBuf,
    /// Bytes of `/proc/<pid>/maps` scanned for runtime libraries (default: 256KB).
    pub maps_read_bytes: u64,
}

impl Default for PrivilegedConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            maps_read_bytes: 256 * 1024,
        }
    }
}

/// Time budgets, in milliseconds, for the tiers that block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTimeouts {
    /// Resolution plus signature inspection.
    pub executable_ms: u64,
    /// One privileged collaborator round-trip.
    pub privileged_ms: u64,
}

impl Default for TierTimeouts {
    fn default() -> Self {
        Self {
            executable_ms: DEFAULT_EXECUTABLE_TIMEOUT_MS,
            privileged_ms: DEFAULT_PRIVILEGED_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;

    #[test]
    fn test_defaults() {
        let cfg = ClassifierConfig::default();
        assert_eq!(cfg.resolve.path_var, "PATH");
        assert_eq!(cfg.inspect.max_read_bytes, 32 * 1024 * 1024);
        assert_eq!(cfg.inspect.data_scan_bytes, 65536);
        assert_eq!(cfg.privileged.proc_root, PathBuf::from("/proc"));
        assert_eq!(cfg.timeouts.executable_ms, 2_000);
        assert_eq!(cfg.timeouts.privileged_ms, 5_000);
    }

    #[test]
    fn test_partial_json() {
        let cfg = ClassifierConfig::from_json(
            r#"{"resolve": {"path_var": "Path"}, "timeouts": {"privileged_ms": 250}}"#,
        )
        .unwrap();
        assert_eq!(cfg.resolve.path_var, "Path");
        assert_eq!(cfg.timeouts.privileged_ms, 250);
        assert_eq!(cfg.timeouts.executable_ms, 2_000);
        assert_eq!(cfg.inspect, InspectConfig::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut cfg = ClassifierConfig::default();
        cfg.inspect.max_symbols = 10;
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(ClassifierConfig::from_json(&text).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_json() {
        let err = ClassifierConfig::from_json("{\"timeouts\": 3}").unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidConfig(_)));
    }
}
