#![forbid(unsafe_code)]

//! Opaque-handle surface for file-manager packer hosts.
//!
//! Hosts that drive archives through a C-style handle table (open an
//! archive, iterate headers one call at a time, act on the current
//! entry, close) go through this process-wide registry. Handles are
//! monotonic integers behind one coarse lock; archive I/O itself runs
//! with the lock released.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{AcfError, AcfResult};
use crate::format::Entry;
use crate::meta::{self, MetaHooks};
use crate::ops;
use crate::path::to_native;

#[derive(Debug)]
struct OpenArchive {
    path: PathBuf,
    entries: Vec<Entry>,
    /// Next entry [`read_header`] hands out.
    cursor: usize,
    /// Entry the last [`read_header`] returned, if any.
    current: Option<usize>,
}

/// What to do with the entry most recently returned by [`read_header`].
#[derive(Debug, Clone)]
pub enum ProcessOp {
    /// Move on without touching the entry.
    Skip,
    /// Decode the entry and discard the bytes (integrity check).
    Test,
    /// Extract the entry under `dest`.
    Extract { dest: PathBuf },
}

fn registry() -> &'static Mutex<HashMap<u64, OpenArchive>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u64, OpenArchive>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock() -> MutexGuard<'static, HashMap<u64, OpenArchive>> {
    registry().lock().unwrap_or_else(PoisonError::into_inner)
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn bad_handle() -> AcfError {
    AcfError::InvalidOperation("unknown archive handle".into())
}

/// Open an archive for host-driven iteration. Validates the archive the
/// same way listing does and returns an opaque handle.
pub fn open_archive(path: &Path) -> AcfResult<u64> {
    let entries = ops::list(path)?;
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    lock().insert(
        handle,
        OpenArchive {
            path: path.to_path_buf(),
            entries,
            cursor: 0,
            current: None,
        },
    );
    Ok(handle)
}

/// Advance the per-handle iteration and return the next entry, or
/// `None` once all entries have been handed out.
pub fn read_header(handle: u64) -> AcfResult<Option<Entry>> {
    let mut reg = lock();
    let state = reg.get_mut(&handle).ok_or_else(bad_handle)?;
    if state.cursor >= state.entries.len() {
        state.current = None;
        return Ok(None);
    }
    state.current = Some(state.cursor);
    let entry = state.entries[state.cursor].clone();
    state.cursor += 1;
    Ok(Some(entry))
}

/// Act on the entry most recently returned by [`read_header`].
pub fn process_current(handle: u64, op: ProcessOp) -> AcfResult<()> {
    let (archive_path, entry) = {
        let reg = lock();
        let state = reg.get(&handle).ok_or_else(bad_handle)?;
        let idx = state
            .current
            .ok_or_else(|| AcfError::InvalidOperation("no current entry".into()))?;
        (state.path.clone(), state.entries[idx].clone())
    };

    match op {
        ProcessOp::Skip => Ok(()),
        ProcessOp::Test => {
            if entry.is_dir() {
                return Ok(());
            }
            ops::extract_one(&archive_path, &entry.path).map(drop)
        }
        ProcessOp::Extract { dest } => {
            let target = to_native(&dest, &entry.path)?;
            if entry.is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let data = ops::extract_one(&archive_path, &entry.path)?;
                fs::write(&target, &data)?;
            }
            meta::apply_entry_metadata(&MetaHooks::default(), &target, &entry);
            Ok(())
        }
    }
}

/// Drop a handle and its state.
pub fn close_archive(handle: u64) -> AcfResult<()> {
    lock().remove(&handle).map(drop).ok_or_else(bad_handle)
}
