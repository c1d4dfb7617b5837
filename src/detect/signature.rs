//! Binary signature inspector.
//!
//! Looks for markers that toolchains embed in the executables they produce:
//! - Go build info (`\xff Go buildinf:`) in `.go.buildinfo` / `__go_buildinfo`,
//!   the `.note.go.buildid` note, or the start of a PE `.data` section
//! - .NET: the CLR runtime header of a PE image, or the diagnostic exports
//!   of the native .NET host
//! - Rust: the `rustc version` stamp in `.comment`, or std/core symbols
//! - scripts: a `#!` line naming a known interpreter
//!
//! Markers are ranked Go, then .NET, then Rust. The Rust markers only say
//! that rustc produced some of the linked code, so a binary of another
//! runtime that links Rust libraries (and none of the stronger markers)
//! reports Rust.
//!
//! The file is read through [`ReadCache`] on top of a [`BoundedReader`], so
//! only headers and the consulted sections are pulled from disk, and never
//! more than `InspectConfig::max_read_bytes` in total. Anything truncated,
//! corrupt or unrecognised yields `Language::Unknown`.

use crate::config::InspectConfig;
use crate::detect::resolve::ResolvedExecutable;
use crate::detect::shebang;
use crate::io::BoundedReader;
use crate::language::Language;
use memchr::memmem;
use object::pe::{ImageNtHeaders32, ImageNtHeaders64};
use object::read::pe::{ImageNtHeaders, PeFile};
use object::{FileKind, Object, ObjectSection, ObjectSymbol, ReadCache, ReadRef};
use std::io::{Read, Seek};
use tracing::{debug, trace};

/// Magic at the start of Go's build info blob.
pub const GO_BUILDINFO_MAGIC: &[u8] = b"\xff Go buildinf:";

/// Go aligns the build info blob to this boundary.
const GO_BUILDINFO_ALIGN: usize = 16;

/// Stamp rustc writes into the ELF `.comment` section.
const RUSTC_COMMENT: &[u8] = b"rustc version";

/// Exports of the native .NET host (apphost / singlefilehost / coreclr).
const DOTNET_HOST_EXPORTS: &[&str] = &["DotNetRuntimeInfo", "DotNetRuntimeDebugHeader"];

/// Inspect a resolved executable.
pub fn inspect_executable(exe: &mut ResolvedExecutable, config: &InspectConfig) -> Language {
    let path = exe.path().to_path_buf();
    let lang = inspect_reader(exe, config);
    debug!(path = %path.display(), language = %lang, "Signature inspection finished");
    lang
}

/// Inspect any seekable byte stream for a toolchain marker.
pub fn inspect_reader<R: Read + Seek>(reader: R, config: &InspectConfig) -> Language {
    let cache = ReadCache::new(BoundedReader::new(reader, config.max_read_bytes));
    inspect_data(&cache, config)
}

/// Inspect an in-memory image.
pub fn inspect_bytes(data: &[u8], config: &InspectConfig) -> Language {
    inspect_data(data, config)
}

fn inspect_data<'data, R: ReadRef<'data>>(data: R, config: &InspectConfig) -> Language {
    let kind = match FileKind::parse(data) {
        Ok(kind) => kind,
        Err(_) => return inspect_script(data, config),
    };
    trace!(?kind, "Executable format");

    let found = match kind {
        FileKind::Elf32 | FileKind::Elf64 | FileKind::MachO32 | FileKind::MachO64 => {
            object::File::parse(data)
                .ok()
                .and_then(|obj| inspect_object(data, &obj, config))
        }
        FileKind::Pe32 => PeFile::<ImageNtHeaders32, R>::parse(data)
            .ok()
            .and_then(|pe| inspect_pe(data, &pe, config)),
        FileKind::Pe64 => PeFile::<ImageNtHeaders64, R>::parse(data)
            .ok()
            .and_then(|pe| inspect_pe(data, &pe, config)),
        FileKind::Coff => object::File::parse(data)
            .ok()
            .and_then(|obj| inspect_object(data, &obj, config)),
        _ => None,
    };
    found.unwrap_or(Language::Unknown)
}

fn inspect_script<'data, R: ReadRef<'data>>(data: R, config: &InspectConfig) -> Language {
    let Ok(len) = data.len() else {
        return Language::Unknown;
    };
    let want = len.min(config.shebang_bytes as u64);
    match data.read_bytes_at(0, want) {
        Ok(head) => shebang::detect_from_shebang(head),
        Err(()) => Language::Unknown,
    }
}

fn inspect_pe<'data, Pe, R>(data: R, pe: &PeFile<'data, Pe, R>, config: &InspectConfig) -> Option<Language>
where
    Pe: ImageNtHeaders,
    R: ReadRef<'data>,
{
    if pe
        .data_directory(object::pe::IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR)
        .is_some()
    {
        return Some(Language::DotNet);
    }
    inspect_object(data, pe, config)
}

fn inspect_object<'data, O, R>(data: R, obj: &O, config: &InspectConfig) -> Option<Language>
where
    O: Object<'data>,
    R: ReadRef<'data>,
{
    if has_go_marker(data, obj, config) {
        return Some(Language::Go);
    }
    if exports_dotnet_host(obj, config) {
        return Some(Language::DotNet);
    }
    if has_rust_marker(obj, config) {
        return Some(Language::Rust);
    }
    None
}

/// Up to `limit` bytes from the start of a section's file contents.
fn section_prefix<'data, S, R>(data: R, section: &S, limit: u64) -> Option<&'data [u8]>
where
    S: ObjectSection<'data>,
    R: ReadRef<'data>,
{
    let (offset, size) = section.file_range()?;
    data.read_bytes_at(offset, size.min(limit)).ok()
}

/// Whole section contents, unless the section exceeds the configured cap.
fn section_data<'data, S: ObjectSection<'data>>(section: &S, config: &InspectConfig) -> Option<&'data [u8]> {
    if section.size() > config.max_section_bytes {
        trace!(size = section.size(), "Section over budget, skipped");
        return None;
    }
    section.data().ok()
}

fn has_go_marker<'data, O, R>(data: R, obj: &O, config: &InspectConfig) -> bool
where
    O: Object<'data>,
    R: ReadRef<'data>,
{
    for name in [".go.buildinfo", "__go_buildinfo"] {
        if let Some(section) = obj.section_by_name(name) {
            let head = section_prefix(data, &section, GO_BUILDINFO_MAGIC.len() as u64);
            if head.is_some_and(|h| h.starts_with(GO_BUILDINFO_MAGIC)) {
                return true;
            }
        }
    }

    if obj.section_by_name(".note.go.buildid").is_some() {
        return true;
    }

    // PE and friends have no dedicated section: the blob sits early in .data.
    obj.section_by_name(".data")
        .and_then(|section| section_prefix(data, &section, config.data_scan_bytes))
        .is_some_and(contains_aligned_buildinfo)
}

fn contains_aligned_buildinfo(window: &[u8]) -> bool {
    memmem::find_iter(window, GO_BUILDINFO_MAGIC).any(|pos| pos % GO_BUILDINFO_ALIGN == 0)
}

fn exports_dotnet_host<'data, O: Object<'data>>(obj: &O, config: &InspectConfig) -> bool {
    obj.dynamic_symbols()
        .chain(obj.symbols())
        .take(config.max_symbols)
        .filter_map(|sym| sym.name().ok())
        .any(|name| {
            let bare = name.strip_prefix('_').unwrap_or(name);
            DOTNET_HOST_EXPORTS.iter().any(|export| *export == bare)
        })
}

fn has_rust_marker<'data, O: Object<'data>>(obj: &O, config: &InspectConfig) -> bool {
    let stamped = obj
        .section_by_name(".comment")
        .and_then(|section| section_data(&section, config))
        .is_some_and(|comment| memmem::find(comment, RUSTC_COMMENT).is_some());
    if stamped {
        return true;
    }

    obj.symbols()
        .chain(obj.dynamic_symbols())
        .take(config.max_symbols)
        .filter_map(|sym| sym.name().ok())
        .any(is_rust_runtime_symbol)
}

/// Symbols only the Rust standard library produces.
fn is_rust_runtime_symbol(name: &str) -> bool {
    if name.contains("rust_begin_unwind") || name.contains("__rust_alloc") {
        return true;
    }
    // Legacy mangling spells out `std` (C++ writes it as `St`); v0 mangling
    // starts with `_R`. Mach-O adds one more underscore.
    let bare = name.trim_start_matches('_');
    ["ZN3std", "RNv"]
        .iter()
        .any(|prefix| bare.starts_with(prefix))
}
