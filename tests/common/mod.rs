//! Shared fixtures for integration tests.
//!
//! Synthetic executables are produced with `object::write`, so tests never
//! depend on toolchains being installed.

#![allow(dead_code)]

use object::write::{Object, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const GO_BUILDINFO_MAGIC: &[u8] = b"\xff Go buildinf:";

/// Go build info blob: magic, pointer size, flags, then padding.
pub fn go_buildinfo_blob() -> Vec<u8> {
    let mut blob = GO_BUILDINFO_MAGIC.to_vec();
    blob.push(8);
    blob.push(2);
    blob.resize(32, 0);
    blob
}

fn new_object(format: BinaryFormat) -> Object<'static> {
    let arch = match format {
        BinaryFormat::MachO => Architecture::Aarch64,
        _ => Architecture::X86_64,
    };
    Object::new(format, arch, Endianness::Little)
}

/// An ELF object carrying the given extra sections.
pub fn elf_with_sections(sections: &[(&str, SectionKind, &[u8])]) -> Vec<u8> {
    let mut obj = new_object(BinaryFormat::Elf);
    let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text, &[0xC3], 16);
    for (name, kind, data) in sections {
        let id = obj.add_section(Vec::new(), name.as_bytes().to_vec(), *kind);
        obj.append_section_data(id, data, 16);
    }
    obj.write().unwrap()
}

/// An ELF object carrying one extra section.
pub fn elf_with_section(name: &str, kind: SectionKind, data: &[u8]) -> Vec<u8> {
    elf_with_sections(&[(name, kind, data)])
}

/// An ELF object exporting the given symbol names from `.text`.
pub fn elf_with_symbols(names: &[&str]) -> Vec<u8> {
    let mut obj = new_object(BinaryFormat::Elf);
    let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text, &[0xC3; 16], 16);
    for (i, name) in names.iter().enumerate() {
        obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value: i as u64,
            size: 1,
            kind: SymbolKind::Data,
            scope: SymbolScope::Dynamic,
            weak: false,
            section: SymbolSection::Section(text),
            flags: SymbolFlags::None,
        });
    }
    obj.write().unwrap()
}

/// A Go-built ELF image.
pub fn go_elf() -> Vec<u8> {
    elf_with_section(".go.buildinfo", SectionKind::Data, &go_buildinfo_blob())
}

/// A Go-built Mach-O image.
pub fn go_macho() -> Vec<u8> {
    let mut obj = new_object(BinaryFormat::MachO);
    let id = obj.add_section(
        b"__DATA".to_vec(),
        b"__go_buildinfo".to_vec(),
        SectionKind::Data,
    );
    obj.append_section_data(id, &go_buildinfo_blob(), 16);
    obj.write().unwrap()
}

/// A COFF object with the Go blob at the start of `.data`.
pub fn go_coff() -> Vec<u8> {
    let mut data = vec![0u8; 48];
    data.extend_from_slice(&go_buildinfo_blob());
    let mut obj = new_object(BinaryFormat::Coff);
    let id = obj.add_section(Vec::new(), b".data".to_vec(), SectionKind::Data);
    obj.append_section_data(id, &data, 16);
    obj.write().unwrap()
}

pub const RUSTC_COMMENT: &[u8] = b"\0GCC: (GNU) 13.2.0\0rustc version 1.80.0 (051478957 2024-07-21)\0";

/// A Rust-built ELF image (rustc `.comment` stamp).
pub fn rust_elf() -> Vec<u8> {
    elf_with_section(".comment", SectionKind::OtherString, RUSTC_COMMENT)
}

/// A C-built ELF image.
pub fn c_elf() -> Vec<u8> {
    elf_with_section(".comment", SectionKind::OtherString, b"\0GCC: (GNU) 13.2.0\0")
}

/// Write `content` to `dir/name` and return the full path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
