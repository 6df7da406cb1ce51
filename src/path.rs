#![forbid(unsafe_code)]

use std::path::{Component, Path, PathBuf};

use crate::error::{AcfError, AcfResult};

/// Canonical in-archive path separator.
pub const SEPARATOR: char = '\\';

/// Build the in-archive path for `path`: relative to `base`, prefixed
/// with `internal_base`, `\`-separated, trailing `\` for directories.
///
/// `path` must live under `base`; no entry ever starts with `\` or keeps
/// a `..` segment.
pub fn internal_path(
    base: &Path,
    path: &Path,
    internal_base: &str,
    is_dir: bool,
) -> AcfResult<String> {
    let rel = path
        .strip_prefix(base)
        .map_err(|_| AcfError::Outside(path.to_string_lossy().into_owned()))?;

    let mut out = normalize_prefix(internal_base);
    for comp in rel.components() {
        match comp {
            Component::Normal(c) => {
                if !out.is_empty() && !out.ends_with(SEPARATOR) {
                    out.push(SEPARATOR);
                }
                out.push_str(&c.to_string_lossy());
            }
            Component::CurDir => {}
            _ => return Err(AcfError::Outside(path.to_string_lossy().into_owned())),
        }
    }

    if is_dir && !out.is_empty() && !out.ends_with(SEPARATOR) {
        out.push(SEPARATOR);
    }
    Ok(out)
}

fn normalize_prefix(prefix: &str) -> String {
    let mut p = prefix.replace('/', "\\");
    while p.starts_with('\\') {
        p.remove(0);
    }
    if p == "." {
        p.clear();
    }
    if !p.is_empty() && !p.ends_with('\\') {
        p.push('\\');
    }
    p
}

/// Map a `\`-separated in-archive path onto `dest` for extraction.
/// Accepts `/` as a separator too; rejects anything that could escape
/// the output directory.
pub fn to_native(dest: &Path, internal: &str) -> AcfResult<PathBuf> {
    let mut out = dest.to_path_buf();
    for seg in internal.split(['\\', '/']) {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." || seg.contains(':') {
            return Err(AcfError::BadArchive(format!(
                "entry path escapes output directory: {internal}"
            )));
        }
        out.push(seg);
    }
    Ok(out)
}
