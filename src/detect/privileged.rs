//! Privileged fallback detection.
//!
//! A [`PrivilegedDetector`] classifies a process from its pid alone, through
//! a channel that does not depend on the caller resolving argv[0] itself.
//! Detectors are injected explicitly; there is no process-wide instance.

use crate::config::{InspectConfig, PrivilegedConfig};
use crate::detect::signature;
use crate::error::{ClassifyError, Result};
use crate::io::BoundedReader;
use crate::language::Language;
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, trace};

/// An elevated-capability collaborator able to classify any process by pid.
///
/// Implementations must be safe to call from many threads at once; any
/// rate limiting is theirs to do.
pub trait PrivilegedDetector: Send + Sync {
    /// Classify `pid`. `Ok(Language::Unknown)` means "no opinion".
    fn detect(&self, pid: u32) -> Result<Language>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "privileged"
    }
}

/// Run `detector` against `pid`, folding every failure into `Unknown`.
pub fn classify_privileged(detector: &dyn PrivilegedDetector, pid: u32) -> Language {
    match detector.detect(pid) {
        Ok(lang) => lang,
        Err(err) => {
            debug!(pid, detector = detector.name(), error = %err, "Privileged detection failed");
            Language::Unknown
        }
    }
}

/// Shared libraries whose presence in a process image identifies its runtime.
const RUNTIME_LIBRARIES: &[(&str, Language)] = &[
    ("libjvm.so", Language::Java),
    ("libcoreclr.so", Language::DotNet),
    ("libpython", Language::Python),
    ("libruby", Language::Ruby),
    ("libnode.so", Language::Node),
];

static RUNTIME_LIBRARY_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(RUNTIME_LIBRARIES.iter().map(|(needle, _)| *needle))
        .expect("static runtime library patterns")
});

/// Find a runtime library mentioned in `/proc/<pid>/maps` content.
pub fn runtime_from_maps(maps: &[u8]) -> Language {
    RUNTIME_LIBRARY_MATCHER
        .find(maps)
        .map(|m| RUNTIME_LIBRARIES[m.pattern().as_usize()].1)
        .unwrap_or(Language::Unknown)
}

/// Detector backed by procfs.
///
/// `<proc_root>/<pid>/exe` opens the image the process was started from even
/// after it was deleted or replaced on disk, and, given ptrace-level
/// capability, for processes of other users. The memory map is consulted
/// when the image carries no marker (e.g. a JVM launched through a wrapper).
#[derive(Debug, Clone, Default)]
pub struct ProcfsDetector {
    privileged: PrivilegedConfig,
    inspect: InspectConfig,
}

impl ProcfsDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(privileged: PrivilegedConfig, inspect: InspectConfig) -> Self {
        Self {
            privileged,
            inspect,
        }
    }

    fn proc_path(&self, pid: u32, entry: &str) -> PathBuf {
        self.privileged
            .proc_root
            .join(pid.to_string())
            .join(entry)
    }

    fn inspect_image(&self, pid: u32) -> Result<Language> {
        let path = self.proc_path(pid, "exe");
        let file = File::open(&path).map_err(|e| ClassifyError::from_io(e, &path))?;
        Ok(signature::inspect_reader(file, &self.inspect))
    }

    fn inspect_maps(&self, pid: u32) -> Result<Language> {
        let path = self.proc_path(pid, "maps");
        let file = File::open(&path).map_err(|e| ClassifyError::from_io(e, &path))?;
        let mut maps = Vec::new();
        BoundedReader::new(file, self.privileged.maps_read_bytes)
            .read_to_end(&mut maps)
            .map_err(|e| ClassifyError::from_io(e, &path))?;
        Ok(runtime_from_maps(&maps))
    }
}

impl PrivilegedDetector for ProcfsDetector {
    fn detect(&self, pid: u32) -> Result<Language> {
        if !cfg!(target_os = "linux") && self.privileged.proc_root == PathBuf::from("/proc") {
            return Err(ClassifyError::CollaboratorUnavailable(
                "procfs is only available on Linux".to_string(),
            ));
        }

        let lang = self.inspect_image(pid)?;
        if lang.is_known() {
            trace!(pid, language = %lang, "Image marker");
            return Ok(lang);
        }

        let lang = self.inspect_maps(pid)?;
        trace!(pid, language = %lang, "Memory map scan");
        Ok(lang)
    }

    fn name(&self) -> &'static str {
        "procfs"
    }
}
