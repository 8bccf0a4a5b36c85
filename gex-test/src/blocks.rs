//! Packed expression-block writing for tests

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};

/// Append one `[u32 LE key][f32 LE x n]` block to `path`, creating the
/// file if needed. Returns the byte offset the block starts at and the
/// number of values written.
pub fn write_block(path: &Path, key: u32, values: &[f32]) -> Result<(u64, usize)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let offset = file.metadata()?.len();

    let mut buf = Vec::with_capacity(4 + values.len() * 4);
    buf.write_u32::<LittleEndian>(key)?;
    for value in values {
        buf.write_f32::<LittleEndian>(*value)?;
    }

    file.write_all(&buf)?;

    Ok((offset, values.len()))
}
