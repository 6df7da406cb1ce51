#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build;
use crate::error::{AcfError, AcfResult};
use crate::format::Entry;
use crate::meta::{self, MetaHooks};
use crate::path::to_native;
use crate::read::{self, read_entry_data};

/// Build an archive from filesystem inputs, stored relative to `base`
/// under the `internal_base` prefix.
pub fn create(
    archive: &Path,
    inputs: &[PathBuf],
    base: &Path,
    internal_base: &str,
) -> AcfResult<()> {
    build::create(archive, inputs, base, internal_base, &MetaHooks::default(), |_, _, _| {})
}

pub fn create_with_progress(
    archive: &Path,
    inputs: &[PathBuf],
    base: &Path,
    internal_base: &str,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    build::create(archive, inputs, base, internal_base, &MetaHooks::default(), progress)
}

pub fn create_with_hooks(
    archive: &Path,
    inputs: &[PathBuf],
    base: &Path,
    internal_base: &str,
    hooks: &MetaHooks,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    build::create(archive, inputs, base, internal_base, hooks, progress)
}

/// Write a single-entry archive from an in-memory blob.
pub fn create_from_memory(archive: &Path, internal_path: &str, data: &[u8]) -> AcfResult<()> {
    build::create_from_memory(archive, internal_path, data, &MetaHooks::default())
}

pub fn create_from_memory_with_hooks(
    archive: &Path,
    internal_path: &str,
    data: &[u8],
    hooks: &MetaHooks,
) -> AcfResult<()> {
    build::create_from_memory(archive, internal_path, data, hooks)
}

/// Read the central directory of an archive.
pub fn list(archive: &Path) -> AcfResult<Vec<Entry>> {
    read::list(archive)
}

/// Decompress a single entry, located by its exact in-archive path.
pub fn extract_one(archive: &Path, name: &str) -> AcfResult<Vec<u8>> {
    read::extract_one(archive, name)
}

/// Extract every entry under `output`.
pub fn extract_all(archive: &Path, output: &Path) -> AcfResult<()> {
    extract_all_with_hooks(archive, output, &MetaHooks::default(), |_, _, _| {})
}

pub fn extract_all_with_progress(
    archive: &Path,
    output: &Path,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    extract_all_with_hooks(archive, output, &MetaHooks::default(), progress)
}

pub fn extract_all_with_hooks(
    archive: &Path,
    output: &Path,
    hooks: &MetaHooks,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    let mut ar = read::open(archive)?;
    let entries = std::mem::take(&mut ar.entries);
    extract_entries(&mut ar, &entries, output, hooks, progress)
}

/// Extract the named entries (exact in-archive paths) under `output`.
pub fn extract(archive: &Path, names: &[String], output: &Path) -> AcfResult<()> {
    extract_with_hooks(archive, names, output, &MetaHooks::default(), |_, _, _| {})
}

pub fn extract_with_progress(
    archive: &Path,
    names: &[String],
    output: &Path,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    extract_with_hooks(archive, names, output, &MetaHooks::default(), progress)
}

pub fn extract_with_hooks(
    archive: &Path,
    names: &[String],
    output: &Path,
    hooks: &MetaHooks,
    progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    let mut ar = read::open(archive)?;
    let wanted: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();
    let selected: Vec<Entry> = ar
        .entries
        .iter()
        .filter(|e| wanted.contains(e.path.as_str()))
        .cloned()
        .collect();
    extract_entries(&mut ar, &selected, output, hooks, progress)
}

fn extract_entries(
    ar: &mut read::Archive,
    entries: &[Entry],
    output: &Path,
    hooks: &MetaHooks,
    mut progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    let total = entries.len().max(1) as f32;
    for (i, entry) in entries.iter().enumerate() {
        progress(&entry.path, 0.0, i as f32 / total);

        let dest = to_native(output, &entry.path)?;
        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let data = read_entry_data(&mut ar.file, ar.header.central_dir_offset, entry)?;
            fs::write(&dest, &data)?;
        }
        // timestamp and attribute restoration is best-effort
        meta::apply_entry_metadata(hooks, &dest, entry);

        progress(&entry.path, 1.0, (i + 1) as f32 / total);
    }
    progress("Done.", 1.0, 1.0);
    Ok(())
}

/// Decode every file entry and check bounds, length and CRC-32.
/// Returns the number of entries checked.
pub fn verify(archive: &Path) -> AcfResult<usize> {
    let mut ar = read::open(archive)?;
    let entries = std::mem::take(&mut ar.entries);
    for entry in &entries {
        if entry.is_dir() {
            continue;
        }
        let data = read_entry_data(&mut ar.file, ar.header.central_dir_offset, entry)?;
        if data.len() as u64 != entry.original_size {
            return Err(AcfError::BadArchive(format!(
                "decompressed size mismatch: {}",
                entry.path
            )));
        }
    }
    Ok(entries.len())
}
