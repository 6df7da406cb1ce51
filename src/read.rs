#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::compress::Decompressor;
use crate::crc::crc32;
use crate::error::{AcfError, AcfResult};
use crate::format::{Entry, Header, ENTRY_FIXED_LEN, HEADER_LEN};

pub(crate) struct Archive {
    pub file: File,
    pub header: Header,
    pub entries: Vec<Entry>,
}

/// Open an archive, validate the header and central directory, and parse
/// the entry list.
pub(crate) fn open(path: &Path) -> AcfResult<Archive> {
    let mut file = File::open(path)?;
    let mut head = [0u8; HEADER_LEN];
    file.read_exact(&mut head)?;
    let header = Header::decode(&head)?;

    let file_len = file.seek(SeekFrom::End(0))?;
    if header.central_dir_offset < HEADER_LEN as u64 || header.central_dir_offset > file_len {
        return Err(AcfError::BadArchive(
            "central directory offset outside file".into(),
        ));
    }

    file.seek(SeekFrom::Start(header.central_dir_offset))?;
    let mut cd = vec![0u8; (file_len - header.central_dir_offset) as usize];
    file.read_exact(&mut cd)?;
    if crc32(&cd) != header.central_dir_crc32 {
        return Err(AcfError::BadArchive("central directory crc32 mismatch".into()));
    }

    if header.entry_count as usize > cd.len() / ENTRY_FIXED_LEN {
        return Err(AcfError::BadArchive(
            "entry count does not fit central directory".into(),
        ));
    }
    let mut entries = Vec::with_capacity(header.entry_count as usize);
    let mut cur = Cursor::new(cd.as_slice());
    for _ in 0..header.entry_count {
        entries.push(Entry::decode_from(&mut cur)?);
    }

    Ok(Archive {
        file,
        header,
        entries,
    })
}

/// Read the central directory of an archive.
pub fn list(path: &Path) -> AcfResult<Vec<Entry>> {
    Ok(open(path)?.entries)
}

/// Decompress a single entry, located by its exact in-archive path.
pub fn extract_one(path: &Path, name: &str) -> AcfResult<Vec<u8>> {
    let mut archive = open(path)?;
    let entry = archive
        .entries
        .iter()
        .find(|e| e.path == name)
        .ok_or_else(|| AcfError::NotFound(name.to_string()))?
        .clone();
    read_entry_data(&mut archive.file, archive.header.central_dir_offset, &entry)
}

/// Stream an entry's data range through the decompressor and verify its
/// CRC-32.
pub(crate) fn read_entry_data(
    file: &mut File,
    central_dir_offset: u64,
    entry: &Entry,
) -> AcfResult<Vec<u8>> {
    if entry.is_dir() {
        return Err(AcfError::InvalidOperation(format!(
            "cannot extract data from a directory entry: {}",
            entry.path
        )));
    }

    let in_bounds = entry.data_offset >= HEADER_LEN as u64
        && entry
            .data_offset
            .checked_add(entry.compressed_size)
            .is_some_and(|end| end <= central_dir_offset);
    if !in_bounds {
        return Err(AcfError::BadArchive(format!(
            "entry data outside archive body: {}",
            entry.path
        )));
    }

    file.seek(SeekFrom::Start(entry.data_offset))?;
    let mut decompressor = Decompressor::new()?;
    let mut in_buf = vec![0u8; Decompressor::input_hint()];
    let mut scratch = vec![0u8; Decompressor::output_hint()];
    let mut out = Vec::with_capacity(entry.original_size as usize);

    let mut remaining = entry.compressed_size;
    while remaining > 0 {
        let want = remaining.min(in_buf.len() as u64) as usize;
        file.read_exact(&mut in_buf[..want])?;
        decompressor.read_block(&in_buf[..want], &mut out, &mut scratch)?;
        remaining -= want as u64;
    }

    if crc32(&out) != entry.crc32 {
        return Err(AcfError::CrcMismatch(entry.path.clone()));
    }
    Ok(out)
}
