#![forbid(unsafe_code)]

//! ACF single-file archives.
//!
//! An ACF archive is a fixed header, one Zstandard frame per file entry,
//! and a trailing central directory that is CRC'd as a whole. Entries
//! carry a CRC-32 of their uncompressed contents, a packed DOS date/time
//! and an opaque attribute byte; paths are UTF-8 with `\` separators.
//!
//! Create with [`create`] / [`create_from_memory`], inspect with
//! [`list`], unpack with [`extract_one`], [`extract_all`] or
//! [`extract`]. Hosts embedding the engine behind a handle table use
//! [`shim`].

mod build;
mod compress;
mod crc;
mod error;
mod format;
mod io;
mod ops;
mod read;

pub mod meta;
pub mod path;
pub mod shim;

pub use compress::{Compressor, Decompressor, LEVEL};
pub use crc::{crc32, crc32_update};
pub use error::{AcfError, AcfResult};
pub use format::{Entry, EntryKind, Header, ENTRY_FIXED_LEN, HEADER_LEN, MAGIC, VERSION};
pub use meta::MetaHooks;
pub use ops::{
    create, create_from_memory, create_from_memory_with_hooks, create_with_hooks,
    create_with_progress, extract, extract_all, extract_all_with_hooks,
    extract_all_with_progress, extract_one, extract_with_hooks, extract_with_progress, list,
    verify,
};
