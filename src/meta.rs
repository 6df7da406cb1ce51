#![forbid(unsafe_code)]

//! Platform metadata: DOS date/time packing and the attribute byte.
//!
//! The engine treats both as opaque; hosts can swap the conversions by
//! supplying their own [`MetaHooks`].

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::format::Entry;

pub const ATTR_READONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;

/// 1980-01-01 00:00:00 UTC in Unix seconds.
const DOS_EPOCH_UNIX: u64 = 315_532_800;

/// Plain-function hooks the host supplies for timestamp and attribute
/// conversion. [`MetaHooks::default`] gives the portable behavior.
pub struct MetaHooks {
    pub pack_time: fn(SystemTime) -> u32,
    pub unpack_time: fn(u32) -> SystemTime,
    pub get_attribute: fn(&Path) -> u8,
    pub set_attribute: fn(&Path, u8),
}

impl Default for MetaHooks {
    fn default() -> Self {
        Self {
            pack_time: pack_dos_datetime,
            unpack_time: unpack_dos_datetime,
            get_attribute: default_attribute,
            set_attribute: apply_attribute,
        }
    }
}

/// Pack a timestamp into DOS date/time: high 16 bits
/// `(year-1980)<<9 | month<<5 | day`, low 16 bits
/// `hour<<11 | minute<<5 | second/2`.
///
/// Times outside 1980-01-01..=2107-12-31 clamp to 0, which unpacks back
/// to the DOS epoch. Conversion is UTC in both directions, so a
/// round-trip is exact to the 2-second granularity.
pub fn pack_dos_datetime(t: SystemTime) -> u32 {
    let dt: DateTime<Utc> = t.into();
    let year = dt.year();
    if !(1980..=2107).contains(&year) {
        return 0;
    }
    let date = (((year - 1980) as u32) << 9) | (dt.month() << 5) | dt.day();
    let time = (dt.hour() << 11) | (dt.minute() << 5) | (dt.second() / 2);
    (date << 16) | time
}

/// Unpack a DOS date/time. `0` means unknown and yields the DOS epoch;
/// so does any value whose fields do not name a real calendar date.
pub fn unpack_dos_datetime(v: u32) -> SystemTime {
    if v == 0 {
        return dos_epoch();
    }
    let year = 1980 + ((v >> 25) & 0x7F) as i32;
    let month = (v >> 21) & 0x0F;
    let day = (v >> 16) & 0x1F;
    let hour = (v >> 11) & 0x1F;
    let minute = (v >> 5) & 0x3F;
    let second = (v & 0x1F) * 2;
    match Utc
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
    {
        Some(dt) => dt.into(),
        None => dos_epoch(),
    }
}

fn dos_epoch() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(DOS_EPOCH_UNIX)
}

/// Attribute byte for a path: directory/archive plus the read-only bit.
/// Paths that cannot be inspected report 0.
pub fn default_attribute(path: &Path) -> u8 {
    match fs::metadata(path) {
        Ok(md) => {
            let mut attr = if md.is_dir() {
                ATTR_DIRECTORY
            } else {
                ATTR_ARCHIVE
            };
            if md.permissions().readonly() {
                attr |= ATTR_READONLY;
            }
            attr
        }
        Err(_) => 0,
    }
}

/// Apply what the platform supports of an attribute byte (the read-only
/// bit). Best-effort: failures are ignored.
pub fn apply_attribute(path: &Path, attr: u8) {
    if attr & ATTR_READONLY != 0 {
        if let Ok(md) = fs::metadata(path) {
            let mut perms = md.permissions();
            perms.set_readonly(true);
            let _ = fs::set_permissions(path, perms);
        }
    }
}

/// Best-effort restore of an extracted entry's timestamp and attributes.
pub(crate) fn apply_entry_metadata(hooks: &MetaHooks, path: &Path, entry: &Entry) {
    let mtime = (hooks.unpack_time)(entry.dos_datetime);
    if let Ok(f) = fs::File::options().write(true).open(path) {
        let _ = f.set_modified(mtime);
    }
    (hooks.set_attribute)(path, entry.attributes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> SystemTime {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().into()
    }

    #[test]
    fn packs_known_timestamp() {
        let v = pack_dos_datetime(utc(2003, 7, 15, 12, 34, 56));
        assert_eq!(v >> 25, 23); // 2003 - 1980
        assert_eq!((v >> 21) & 0x0F, 7);
        assert_eq!((v >> 16) & 0x1F, 15);
        assert_eq!((v >> 11) & 0x1F, 12);
        assert_eq!((v >> 5) & 0x3F, 34);
        assert_eq!((v & 0x1F) * 2, 56);
    }

    #[test]
    fn round_trip_is_exact_at_two_second_granularity() {
        let even = utc(1999, 12, 31, 23, 59, 58);
        assert_eq!(unpack_dos_datetime(pack_dos_datetime(even)), even);

        // odd seconds truncate down
        let odd = utc(1999, 12, 31, 23, 59, 59);
        assert_eq!(unpack_dos_datetime(pack_dos_datetime(odd)), even);
    }

    #[test]
    fn out_of_range_clamps_to_zero() {
        assert_eq!(pack_dos_datetime(UNIX_EPOCH), 0);
        assert_eq!(pack_dos_datetime(utc(2110, 1, 1, 0, 0, 0)), 0);
    }

    #[test]
    fn zero_unpacks_to_dos_epoch() {
        assert_eq!(unpack_dos_datetime(0), utc(1980, 1, 1, 0, 0, 0));
    }

    #[test]
    fn nonsense_fields_unpack_to_dos_epoch() {
        // month 15, day 0
        let v = 15u32 << 21;
        assert_eq!(unpack_dos_datetime(v), utc(1980, 1, 1, 0, 0, 0));
    }
}
