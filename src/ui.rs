#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use acf::meta::{ATTR_ARCHIVE, ATTR_DIRECTORY, ATTR_HIDDEN, ATTR_READONLY, ATTR_SYSTEM};
use acf::AcfResult;

const BAR_WIDTH: usize = 50;

fn shorten(name: &str) -> String {
    const MAX: usize = 35;
    let count = name.chars().count();
    if count <= MAX {
        return name.to_string();
    }
    let tail: String = name.chars().skip(count - (MAX - 3)).collect();
    format!("...{tail}")
}

fn draw_progress(current: &str, general: f32) {
    let pos = (BAR_WIDTH as f32 * general) as usize;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(if i < pos {
            '='
        } else if i == pos {
            '>'
        } else {
            ' '
        });
    }
    print!("[{bar}] {:5.1}% {:<40}\r", general * 100.0, shorten(current));
    let _ = std::io::stdout().flush();
}

fn format_dos_datetime(v: u32) -> String {
    if v == 0 {
        return "1980-01-01 00:00:00".to_string();
    }
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        1980 + ((v >> 25) & 0x7F),
        (v >> 21) & 0x0F,
        (v >> 16) & 0x1F,
        (v >> 11) & 0x1F,
        (v >> 5) & 0x3F,
        (v & 0x1F) * 2
    )
}

fn attr_string(attr: u8) -> String {
    [
        (ATTR_READONLY, 'R'),
        (ATTR_HIDDEN, 'H'),
        (ATTR_SYSTEM, 'S'),
        (ATTR_DIRECTORY, 'D'),
        (ATTR_ARCHIVE, 'A'),
    ]
    .iter()
    .map(|&(bit, c)| if attr & bit != 0 { c } else { '-' })
    .collect()
}

pub fn create(archive: &Path, inputs: &[PathBuf], base: &Path, prefix: &str) -> AcfResult<()> {
    acf::create_with_progress(archive, inputs, base, prefix, |file, _, general| {
        draw_progress(file, general);
    })?;
    println!();
    println!("Archive created successfully.");
    Ok(())
}

pub fn list(archive: &Path) -> AcfResult<()> {
    let entries = acf::list(archive)?;
    println!(
        "{:<22}{:<8}{:<14}{:<10}Path",
        "DateTime", "Attr", "Size", "CRC32"
    );
    println!("{}", "-".repeat(80));
    for e in &entries {
        println!(
            "{:<22}{:<8}{:<14}{:08X}  {}",
            format_dos_datetime(e.dos_datetime),
            attr_string(e.attributes),
            e.original_size,
            e.crc32,
            e.path
        );
    }
    Ok(())
}

pub fn extract(archive: &Path, output: &Path) -> AcfResult<()> {
    acf::extract_all_with_progress(archive, output, |file, _, general| {
        draw_progress(file, general);
    })?;
    println!();
    println!("Archive extracted successfully.");
    Ok(())
}

pub fn verify(archive: &Path) -> AcfResult<()> {
    let count = acf::verify(archive)?;
    println!("ok: {count} entries");
    Ok(())
}
