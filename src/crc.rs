#![forbid(unsafe_code)]

//! CRC-32 (IEEE 802.3, polynomial 0xEDB88320, reflected) helpers.
//!
//! Every checksum stored in an ACF archive, for entry contents and for the
//! central directory alike, uses this variant.

/// Compute the CRC-32 of a byte slice.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Continue a CRC-32 computation from a previous value.
///
/// `crc32_update(crc32(a), b)` equals `crc32` of `a` followed by `b`.
#[inline]
pub fn crc32_update(prev: u32, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(prev);
    hasher.update(data);
    hasher.finalize()
}
