// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

const TTL: Duration = Duration::from_secs(3600);

#[test]
fn memory_roundtrip() {
    let backend = MemoryBackend::new();
    assert_eq!(backend.get("access_token"), None);
    backend.set("access_token", "tok-1", TTL, false);
    assert_eq!(backend.get("access_token"), Some("tok-1".to_owned()));
}

#[test]
fn memory_overwrite_supersedes() {
    let backend = MemoryBackend::new();
    backend.set("access_token", "tok-1", TTL, false);
    backend.set("access_token", "tok-2", TTL, true);
    assert_eq!(backend.get("access_token"), Some("tok-2".to_owned()));
}

#[test]
fn memory_remove_is_idempotent() {
    let backend = MemoryBackend::new();
    backend.set("access_token", "tok-1", TTL, false);
    backend.remove("access_token");
    assert_eq!(backend.get("access_token"), None);
    backend.remove("access_token");
}

#[test]
fn memory_entry_expires_by_wall_clock() {
    let backend = MemoryBackend::new();
    backend.set("access_token", "tok-1", Duration::ZERO, false);
    assert_eq!(backend.get("access_token"), None);
}

#[test]
fn file_roundtrip_survives_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::new(dir.path());
    backend.set("refresh_token", "rt-1", TTL, true);
    assert_eq!(backend.get("refresh_token"), Some("rt-1".to_owned()));

    // A fresh backend over the same directory sees the persisted value.
    let reloaded = FileBackend::new(dir.path());
    assert_eq!(reloaded.get("refresh_token"), Some("rt-1".to_owned()));
    Ok(())
}

#[test]
fn file_missing_is_absent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::new(dir.path());
    assert_eq!(backend.get("access_token"), None);
    Ok(())
}

#[test]
fn file_corrupt_contents_read_as_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("credentials.json"), "{not json")?;
    let backend = FileBackend::new(dir.path());
    assert_eq!(backend.get("access_token"), None);

    // Writes recover the file.
    backend.set("access_token", "tok-1", TTL, false);
    assert_eq!(backend.get("access_token"), Some("tok-1".to_owned()));
    Ok(())
}

#[test]
fn file_remove_persists() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::new(dir.path());
    backend.set("user", "{\"id\":1}", TTL, false);
    backend.remove("user");
    assert_eq!(FileBackend::new(dir.path()).get("user"), None);
    Ok(())
}

#[test]
fn file_expired_entry_is_absent_after_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::new(dir.path());
    backend.set("access_token", "tok-1", Duration::ZERO, false);
    assert_eq!(FileBackend::new(dir.path()).get("access_token"), None);
    Ok(())
}

#[test]
fn file_leaves_no_tmp_behind() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = FileBackend::new(dir.path());
    backend.set("access_token", "tok-1", TTL, false);
    backend.set("refresh_token", "rt-1", TTL, false);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}
