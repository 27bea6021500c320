//! Tests for root folder resolution priority order

use ltrk_common::config::{database_path, resolve_root_folder, ROOT_FOLDER_ENV};
use serial_test::serial;
use std::path::PathBuf;

#[test]
#[serial]
fn cli_argument_beats_environment() {
    std::env::set_var(ROOT_FOLDER_ENV, "/tmp/ltrk-from-env");
    let root = resolve_root_folder(Some("/tmp/ltrk-from-cli"));
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/ltrk-from-cli"));
}

#[test]
#[serial]
fn environment_used_when_no_cli_argument() {
    std::env::set_var(ROOT_FOLDER_ENV, "/tmp/ltrk-from-env");
    let root = resolve_root_folder(None);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/ltrk-from-env"));
}

#[test]
#[serial]
fn fallback_resolves_to_some_folder() {
    std::env::remove_var(ROOT_FOLDER_ENV);
    let root = resolve_root_folder(None);
    assert!(!root.as_os_str().is_empty());
}

#[test]
fn database_file_lives_under_root() {
    let db = database_path(&PathBuf::from("/var/lib/leadtrk"));
    assert_eq!(db, PathBuf::from("/var/lib/leadtrk/leadtrk.db"));
}
