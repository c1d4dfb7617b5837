//! Process snapshots: the facts a classification works from.

use crate::error::{ClassifyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Immutable snapshot of one process's classification-relevant facts.
///
/// Argument 0 is the invoked command. The environment may lack any given
/// variable; `cwd` is the target process's working directory when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub args: Vec<String>,
    pub envs: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl ProcessInfo {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    pub fn with_envs(mut self, envs: HashMap<String, String>) -> Self {
        self.envs = envs;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The invoked command, if any.
    pub fn command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Snapshot of the calling process.
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            args: std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            envs: std::env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
            cwd: std::env::current_dir().ok(),
        }
    }

    /// Capture a snapshot of `pid` from the system procfs.
    pub fn from_pid(pid: u32) -> Result<Self> {
        Self::from_proc(Path::new("/proc"), pid)
    }

    /// Capture a snapshot of `pid` from a procfs mounted at `proc_root`.
    ///
    /// `cmdline` is required; an unreadable `environ` or `cwd` (another
    /// user's process) leaves those facts empty rather than failing.
    pub fn from_proc(proc_root: &Path, pid: u32) -> Result<Self> {
        let base = proc_root.join(pid.to_string());

        let cmdline_path = base.join("cmdline");
        let cmdline =
            fs::read(&cmdline_path).map_err(|e| ClassifyError::from_io(e, &cmdline_path))?;
        let args = split_nul(&cmdline);

        let envs = match fs::read(base.join("environ")) {
            Ok(content) => parse_environ_content(&content),
            Err(e) => {
                trace!(pid, error = %e, "environ unreadable");
                HashMap::new()
            }
        };

        let cwd = fs::read_link(base.join("cwd")).ok();

        Ok(Self {
            pid,
            args,
            envs,
            cwd,
        })
    }
}

/// Split NUL-terminated fields. Empty fields keep their position; only the
/// terminator after the last field is dropped.
fn split_nul(content: &[u8]) -> Vec<String> {
    let content = content.strip_suffix(b"\0").unwrap_or(content);
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split(|&b| b == 0)
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect()
}

/// Parse NUL-separated `KEY=VALUE` pairs as found in `/proc/<pid>/environ`.
///
/// Bytes that are not UTF-8 are replaced, as for `cmdline`; entries without
/// `=` are skipped.
pub fn parse_environ_content(content: &[u8]) -> HashMap<String, String> {
    let mut env = HashMap::new();

    for entry in content.split(|&b| b == 0) {
        if entry.is_empty() {
            continue;
        }

        let s = String::from_utf8_lossy(entry);
        if let Some((key, value)) = s.split_once('=') {
            env.insert(key.to_string(), value.to_string());
        }
    }

    env
}
