//! Executable path resolver.
//!
//! Maps argv[0] to an open, readable file the way a shell locates the
//! command it is about to run:
//! 1. absolute path: open exactly that path;
//! 2. relative path with a separator: resolve against the process's working
//!    directory (ours when unknown), never against the search path;
//! 3. bare name: try each search-path directory in order.
//!
//! A candidate only counts once it is actually open and is a regular file.

use crate::config::ResolveConfig;
use crate::error::{ClassifyError, Result};
use crate::process::ProcessInfo;
use crate::timeout::Deadline;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::trace;

/// An open, read-only handle to a resolved executable.
///
/// The descriptor is released when the value is dropped, whichever way the
/// owning scope is left.
#[derive(Debug)]
pub struct ResolvedExecutable {
    path: PathBuf,
    file: File,
}

impl ResolvedExecutable {
    /// Open `path`, accepting only regular files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| open_error(e, path))?;
        let metadata = file.metadata().map_err(|e| open_error(e, path))?;
        if !metadata.is_file() {
            return Err(ClassifyError::ResolutionFailure {
                command: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }
        trace!(path = %path.display(), "Opened executable");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl Read for ResolvedExecutable {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for ResolvedExecutable {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Drop for ResolvedExecutable {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "Releasing executable handle");
    }
}

fn open_error(err: io::Error, path: &Path) -> ClassifyError {
    match err.kind() {
        io::ErrorKind::NotFound => ClassifyError::ResolutionFailure {
            command: path.display().to_string(),
            reason: "no such file".to_string(),
        },
        _ => ClassifyError::from_io(err, path),
    }
}

fn not_resolved(command: &str, reason: &str) -> ClassifyError {
    ClassifyError::ResolutionFailure {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

fn has_separator(command: &str) -> bool {
    command.chars().any(std::path::is_separator)
}

/// The directory relative commands are resolved against.
fn working_dir(info: &ProcessInfo) -> Result<PathBuf> {
    match &info.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Resolve argv[0] of `info` to an open executable.
///
/// `None` covers every expected failure; nothing stays open in that case.
pub fn resolve_executable(info: &ProcessInfo) -> Option<ResolvedExecutable> {
    try_resolve_executable(info, &ResolveConfig::default(), &Deadline::unbounded()).ok()
}

/// Resolve argv[0] of `info`, reporting why resolution failed.
///
/// `AccessDenied` is reported when some candidate existed but could not be
/// opened and no later candidate succeeded.
pub fn try_resolve_executable(
    info: &ProcessInfo,
    config: &ResolveConfig,
    deadline: &Deadline,
) -> Result<ResolvedExecutable> {
    let command = match info.command() {
        Some(c) if !c.is_empty() => c,
        _ => return Err(not_resolved("", "empty argument vector")),
    };
    deadline.check("resolve")?;

    let path = Path::new(command);
    if path.is_absolute() {
        return ResolvedExecutable::open(path);
    }
    if has_separator(command) {
        return ResolvedExecutable::open(working_dir(info)?.join(path));
    }

    let Some(search) = info.envs.get(&config.path_var) else {
        return Err(not_resolved(command, "no search path in environment"));
    };

    let mut denied = None;
    for dir in std::env::split_paths(search) {
        deadline.check("resolve")?;
        // An empty or relative entry is taken relative to the working directory.
        let dir = if dir.is_absolute() {
            dir
        } else {
            working_dir(info)?.join(dir)
        };
        let candidate = dir.join(command);
        match ResolvedExecutable::open(&candidate) {
            Ok(exe) => return Ok(exe),
            Err(err @ ClassifyError::AccessDenied { .. }) => {
                trace!(path = %candidate.display(), "Candidate not readable");
                denied.get_or_insert(err);
            }
            Err(err) => {
                trace!(path = %candidate.display(), error = %err, "Candidate rejected");
            }
        }
    }

    Err(denied.unwrap_or_else(|| not_resolved(command, "not found in search path")))
}
