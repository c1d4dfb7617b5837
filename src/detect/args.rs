//! Argument heuristic matcher.
//!
//! Pure, I/O-free classification from argv[0]. The base name of the
//! command must match an interpreter pattern in full; substrings never
//! count, so `javac` or `nodemon` stay unknown.

use crate::language::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Interpreter base-name patterns, anchored at both ends.
static INTERPRETERS: Lazy<Vec<(Regex, Language)>> = Lazy::new(|| {
    [
        (r"^java$", Language::Java),
        (r"^python(\d+(\.\d+)?)?$", Language::Python),
        (r"^pypy3?$", Language::Python),
        (r"^ruby(\d+(\.\d+)?)?$", Language::Ruby),
        (r"^php(\d+(\.\d+)?)?$", Language::Php),
        (r"^php-(fpm|cgi)(\d+(\.\d+)?)?$", Language::Php),
        (r"^nodejs$|^node$", Language::Node),
        (r"^dotnet$", Language::DotNet),
    ]
    .into_iter()
    .map(|(pattern, lang)| (Regex::new(pattern).expect("static interpreter pattern"), lang))
    .collect()
});

/// Final path component of a command, with `/` or `\` as separator and
/// any trailing `.exe` removed.
pub fn base_name(command: &str) -> &str {
    let name = command
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(command);
    match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".exe") => {
            &name[..cut]
        }
        _ => name,
    }
}

/// Classify an interpreter by its executable name (path prefixes allowed).
pub fn language_for_command(command: &str) -> Language {
    let name = base_name(command);
    if name.is_empty() {
        return Language::Unknown;
    }
    INTERPRETERS
        .iter()
        .find(|(re, _)| re.is_match(name))
        .map(|(_, lang)| *lang)
        .unwrap_or(Language::Unknown)
}

/// Classify a process from its argument vector alone.
///
/// Only argument 0 is consulted. An empty vector yields `Unknown`.
pub fn find_in_args<S: AsRef<str>>(args: &[S]) -> Language {
    let Some(command) = args.first() else {
        return Language::Unknown;
    };
    let lang = language_for_command(command.as_ref());
    trace!(command = command.as_ref(), language = %lang, "Argument heuristic");
    lang
}
