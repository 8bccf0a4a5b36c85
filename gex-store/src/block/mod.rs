//! Random-access reads of packed expression blocks
//!
//! Expression vectors are stored as runs of
//! `[u32 LE probe key][f32 LE x len]` inside flat data files; the catalog
//! records which file, offset and length hold each `(dataset, probe,
//! expression type)` block. The leading key makes every block
//! self-describing, so a stale catalog or a misaligned offset is caught at
//! read time instead of producing silently wrong vectors.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use gex_core::GexResult;

/// Read the block at `offset` holding `len` float32 values.
///
/// Returns the stored probe key alongside the decoded vector. The key is
/// not compared against anything here; only the caller knows which probe
/// it asked for, so verification happens there. Missing files, seeks past
/// the end and short reads all surface as `GexError::Io`.
pub fn read_block(path: &Path, offset: u64, len: usize) -> GexResult<(u32, Vec<f32>)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    reader.seek(SeekFrom::Start(offset))?;

    let probe_key = reader.read_u32::<LittleEndian>()?;

    let mut values = vec![0f32; len];
    reader.read_f32_into::<LittleEndian>(&mut values)?;

    Ok((probe_key, values))
}
