//! Shebang-based detection for script executables.
//!
//! A script found on disk (e.g. `./serve` starting with
//! `#!/usr/bin/env python3`) names its interpreter on the first line; the
//! interpreter is then classified exactly like argv[0].

use crate::detect::args::{base_name, language_for_command};
use crate::language::Language;

/// Extract the interpreter command from the first line of `content`.
///
/// Handles both `#!/usr/bin/node` and `#!/usr/bin/env [-S] [flags] node`.
pub fn interpreter(content: &[u8]) -> Option<&str> {
    let rest = content.strip_prefix(b"#!")?;
    let end = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
    let line = std::str::from_utf8(&rest[..end]).ok()?;

    let mut words = line.split_whitespace();
    let program = words.next()?;
    if base_name(program) != "env" {
        return Some(program);
    }
    // env: skip its own flags and VAR=value assignments.
    words.find(|w| !w.starts_with('-') && !w.contains('='))
}

/// Detect a language from a shebang line in file content.
pub fn detect_from_shebang(content: &[u8]) -> Language {
    interpreter(content)
        .map(language_for_command)
        .unwrap_or(Language::Unknown)
}
