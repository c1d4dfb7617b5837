//! Tiered runtime-language classification for live processes.
//!
//! Given a snapshot of a running process (argv, environment, pid), decide
//! which language runtime it belongs to without touching the process:
//! first from the command name, then from markers inside the executable,
//! and finally through an optional privileged detector. "Unknown" is an
//! ordinary answer, never an error.
//!
//! ```no_run
//! use proclang::{classify, ProcessInfo, Language};
//!
//! let info = ProcessInfo::new(4242).with_args(["/usr/bin/java", "-jar", "app.jar"]);
//! assert_eq!(classify(&info), Language::Java);
//! ```

pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod io;
pub mod language;
pub mod logging;
pub mod process;
pub mod timeout;

pub use classify::{classify, classify_from_arguments, Classification, Classifier, Tier, TIER_ORDER};
pub use config::{ClassifierConfig, InspectConfig, PrivilegedConfig, ResolveConfig, TierTimeouts};
pub use detect::{
    classify_privileged, inspect_executable, inspect_reader, resolve_executable,
    try_resolve_executable, PrivilegedDetector, ProcfsDetector, ResolvedExecutable,
};
pub use error::{ClassifyError, Result};
pub use language::Language;
pub use process::ProcessInfo;
