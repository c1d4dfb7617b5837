//! Integration tests for executable path resolution

mod common;

use common::write_file;
use proclang::timeout::Deadline;
use proclang::{resolve_executable, try_resolve_executable, ClassifyError, ProcessInfo, ResolveConfig};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

struct Case {
    name: &'static str,
    args: Vec<String>,
    envs: HashMap<String, String>,
    success: bool,
}

#[test]
fn test_process_info_file_reader() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_string_lossy().to_string();
    let full_path = write_file(temp_dir.path(), "my_file", b"hello");
    let path_env = HashMap::from([("PATH".to_string(), dir.clone())]);

    let data = vec![
        Case {
            name: "full",
            args: vec![full_path.to_string_lossy().to_string()],
            envs: path_env.clone(),
            success: true,
        },
        Case {
            name: "full_missing",
            args: vec![format!("{}/not_my_file", dir)],
            envs: path_env.clone(),
            success: false,
        },
        Case {
            name: "relative_in_path",
            args: vec!["my_file".to_string()],
            envs: path_env.clone(),
            success: true,
        },
        Case {
            name: "relative_in_path_missing",
            args: vec!["not_my_file".to_string()],
            envs: path_env.clone(),
            success: false,
        },
        Case {
            // Resolved against our own working directory (the crate root).
            name: "relative_not_in_path",
            args: vec!["tests/resolve_executable.rs".to_string()],
            envs: path_env.clone(),
            success: true,
        },
        Case {
            name: "relative_not_in_path_missing",
            args: vec!["tests/not_my_file".to_string()],
            envs: path_env.clone(),
            success: false,
        },
        Case {
            name: "no_search_path",
            args: vec!["my_file".to_string()],
            envs: HashMap::new(),
            success: false,
        },
    ];

    for d in data {
        let info = ProcessInfo::new(1).with_args(d.args).with_envs(d.envs);
        let resolved = resolve_executable(&info);
        assert_eq!(resolved.is_some(), d.success, "case {}", d.name);
    }
}

#[test]
fn test_relative_path_never_falls_back_to_search_path() {
    let bin = TempDir::new().unwrap();
    fs::create_dir(bin.path().join("sub")).unwrap();
    write_file(&bin.path().join("sub"), "tool", b"x");
    let cwd = TempDir::new().unwrap();

    let info = ProcessInfo::new(1)
        .with_args(["sub/tool"])
        .with_env("PATH", bin.path().to_string_lossy())
        .with_cwd(cwd.path());
    assert!(resolve_executable(&info).is_none());

    // Same command relative to the directory that has it.
    let info = info.with_cwd(bin.path());
    let exe = resolve_executable(&info).unwrap();
    assert_eq!(exe.path(), bin.path().join("sub/tool"));
}

#[test]
fn test_relative_path_uses_process_cwd() {
    let cwd = TempDir::new().unwrap();
    write_file(cwd.path(), "mybinary", b"x");
    let info = ProcessInfo::new(1)
        .with_args(["./mybinary", "arg1"])
        .with_cwd(cwd.path());
    assert!(resolve_executable(&info).is_some());
}

#[test]
fn test_failure_kinds() {
    let dir = TempDir::new().unwrap();
    let config = ResolveConfig::default();
    let deadline = Deadline::unbounded();

    let info = ProcessInfo::new(1).with_args(["my_file"]);
    assert!(matches!(
        try_resolve_executable(&info, &config, &deadline),
        Err(ClassifyError::ResolutionFailure { ref reason, .. }) if reason.contains("search path")
    ));

    let info = ProcessInfo::new(1)
        .with_args(["my_file"])
        .with_env("PATH", dir.path().to_string_lossy());
    assert!(matches!(
        try_resolve_executable(&info, &config, &deadline),
        Err(ClassifyError::ResolutionFailure { .. })
    ));
}

#[test]
fn test_later_search_entry_wins_after_missing_ones() {
    let empty = TempDir::new().unwrap();
    let full = TempDir::new().unwrap();
    write_file(full.path(), "my_file", b"hello");

    let search = std::env::join_paths([empty.path(), full.path()]).unwrap();
    let info = ProcessInfo::new(1)
        .with_args(["my_file"])
        .with_env("PATH", search.to_string_lossy());
    let exe = resolve_executable(&info).unwrap();
    assert_eq!(exe.path(), full.path().join("my_file"));
}
