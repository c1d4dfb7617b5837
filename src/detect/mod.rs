//! The detection tiers, cheapest first.
//!
//! - [`args`]: argv[0] against known interpreter names, no I/O
//! - [`resolve`]: argv[0] to an open executable, shell lookup rules
//! - [`signature`]: toolchain markers inside the executable
//! - [`privileged`]: classification by pid through an injected collaborator

pub mod args;
pub mod privileged;
pub mod resolve;
pub mod shebang;
pub mod signature;

pub use args::find_in_args;
pub use privileged::{classify_privileged, PrivilegedDetector, ProcfsDetector};
pub use resolve::{resolve_executable, try_resolve_executable, ResolvedExecutable};
pub use signature::{inspect_bytes, inspect_executable, inspect_reader};
