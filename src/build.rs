#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::compress::Compressor;
use crate::crc::{crc32, crc32_update};
use crate::error::{AcfError, AcfResult};
use crate::format::{Entry, EntryKind, Header};
use crate::meta::{MetaHooks, ATTR_ARCHIVE};
use crate::path::internal_path;

/// Archive layout:
/// - file header (placeholder first, patched on close)
/// - one zstd frame per file entry
/// - central directory: descriptors interleaved with their paths,
///   directories first then files, each group sorted by path bytes,
///   CRC'd as one contiguous block
pub fn create(
    archive_path: &Path,
    input_paths: &[PathBuf],
    base_path: &Path,
    internal_base: &str,
    hooks: &MetaHooks,
    mut progress: impl FnMut(&str, f32, f32),
) -> AcfResult<()> {
    let mut archive = File::create(archive_path)?;
    archive.write_all(&Header::default().encode())?;

    let (dirs, files) = enumerate(input_paths)?;

    let mut dir_entries = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let internal = internal_path(base_path, &dir, internal_base, true)?;
        if internal.is_empty() {
            continue;
        }
        dir_entries.push((internal, dir));
    }
    dir_entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut file_entries = Vec::with_capacity(files.len());
    for file in files {
        let internal = internal_path(base_path, &file, internal_base, false)?;
        file_entries.push((internal, file));
    }
    file_entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut central_dir: Vec<Entry> = Vec::with_capacity(dir_entries.len() + file_entries.len());

    for (internal, dir) in dir_entries {
        let mtime = std::fs::metadata(&dir)?.modified()?;
        central_dir.push(Entry {
            kind: EntryKind::Directory,
            original_size: 0,
            compressed_size: 0,
            data_offset: 0,
            crc32: 0,
            dos_datetime: (hooks.pack_time)(mtime),
            attributes: (hooks.get_attribute)(&dir),
            path: internal,
        });
    }

    let total = file_entries.len().max(1) as f32;
    let mut done = 0usize;
    let mut in_buf = vec![0u8; Compressor::input_hint()];
    let mut scratch = vec![0u8; Compressor::output_hint()];

    for (internal, file) in file_entries {
        progress(&internal, 0.0, done as f32 / total);

        let dos_datetime = std::fs::metadata(&file)
            .and_then(|md| md.modified())
            .map(|t| (hooks.pack_time)(t))
            .unwrap_or(0);
        let attributes = (hooks.get_attribute)(&file);

        // An unreadable source file is skipped and left out of the archive.
        let mut src = match File::open(&file) {
            Ok(f) => f,
            Err(_) => continue,
        };

        let data_offset = archive.stream_position()?;
        let mut compressor = Compressor::new()?;
        let mut original_size = 0u64;
        let mut compressed_size = 0u64;
        let mut crc = 0u32;
        loop {
            let n = src.read(&mut in_buf)?;
            if n == 0 {
                break;
            }
            crc = crc32_update(crc, &in_buf[..n]);
            original_size += n as u64;
            compressed_size += compressor.write_block(&in_buf[..n], &mut archive, &mut scratch)?;
        }
        compressed_size += compressor.finish(&mut archive, &mut scratch)?;

        central_dir.push(Entry {
            kind: EntryKind::File,
            original_size,
            compressed_size,
            data_offset,
            crc32: crc,
            dos_datetime,
            attributes,
            path: internal.clone(),
        });

        done += 1;
        progress(&internal, 1.0, done as f32 / total);
    }

    finish_archive(&mut archive, &central_dir)?;
    progress("Done.", 1.0, 1.0);
    Ok(())
}

/// Write a single-entry archive from an in-memory blob. The entry is
/// stamped with the current time and the "archive" attribute.
pub fn create_from_memory(
    archive_path: &Path,
    internal: &str,
    data: &[u8],
    hooks: &MetaHooks,
) -> AcfResult<()> {
    let mut archive = File::create(archive_path)?;
    archive.write_all(&Header::default().encode())?;

    let data_offset = archive.stream_position()?;
    let mut scratch = vec![0u8; Compressor::output_hint()];
    let mut compressor = Compressor::new()?;
    let mut compressed_size = compressor.write_block(data, &mut archive, &mut scratch)?;
    compressed_size += compressor.finish(&mut archive, &mut scratch)?;

    let entry = Entry {
        kind: EntryKind::File,
        original_size: data.len() as u64,
        compressed_size,
        data_offset,
        crc32: crc32(data),
        dos_datetime: (hooks.pack_time)(SystemTime::now()),
        attributes: ATTR_ARCHIVE,
        path: internal.to_string(),
    };
    finish_archive(&mut archive, std::slice::from_ref(&entry))
}

/// Collect directories and regular files from the inputs, descending
/// into directories. Deduplicated by canonical path; symlinks and
/// special files are ignored.
fn enumerate(inputs: &[PathBuf]) -> AcfResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for input in inputs {
        let Ok(canon) = std::fs::canonicalize(input) else {
            continue;
        };
        if !seen.insert(canon) {
            continue;
        }
        let md = match std::fs::symlink_metadata(input) {
            Ok(md) => md,
            Err(_) => continue,
        };

        if md.is_dir() {
            for ent in WalkDir::new(input).follow_links(false) {
                let ent = ent.map_err(walk_err)?;
                let ft = ent.file_type();
                if !ft.is_dir() && !ft.is_file() {
                    continue;
                }
                if ent.depth() > 0 {
                    let Ok(canon) = std::fs::canonicalize(ent.path()) else {
                        continue;
                    };
                    if !seen.insert(canon) {
                        continue;
                    }
                }
                if ft.is_dir() {
                    dirs.push(ent.path().to_path_buf());
                } else {
                    files.push(ent.path().to_path_buf());
                }
            }
        } else if md.is_file() {
            files.push(input.clone());
        }
    }

    Ok((dirs, files))
}

fn walk_err(e: walkdir::Error) -> AcfError {
    let msg = e.to_string();
    let io = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
    AcfError::Io(io)
}

/// Serialize the central directory, then rewrite the header with the
/// final offset, count and CRC.
fn finish_archive(archive: &mut File, entries: &[Entry]) -> AcfResult<()> {
    let central_dir_offset = archive.stream_position()?;

    let mut buf: Vec<u8> = Vec::new();
    for entry in entries {
        entry.encode_into(&mut buf)?;
    }
    archive.write_all(&buf)?;

    let header = Header {
        central_dir_offset,
        entry_count: entries.len() as u64,
        central_dir_crc32: crc32(&buf),
    };
    archive.seek(SeekFrom::Start(0))?;
    archive.write_all(&header.encode())?;
    archive.flush()?;
    Ok(())
}
