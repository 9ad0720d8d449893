//! Minimal MATLAB Level-5 (.mat) reader for NinaPro session files.
//!
//! Only what the loader needs: little-endian files, numeric 2-D matrices,
//! the small-data-element format, and zlib-compressed (`miCOMPRESSED`)
//! elements.  Cell arrays, structs, sparse and character data are skipped.
//!
//! On-disk layout (after the 128-byte header, always 8-byte aligned):
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  type : u32  │  size : u32  │  <size bytes>   │   ← data element
//! └───────────────────────────────────────────────┘
//! ```
//!
//! A `miMATRIX` element nests four sub-elements in the same format: array
//! flags, dimensions, name, real part.  When the upper 16 bits of `type`
//! are nonzero the element uses the small format: size lives in those
//! bits and the payload in the remaining 4 bytes of the tag.
use anyhow::{bail, Context, Result};
use ndarray::{Array2, ShapeBuilder};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

// MAT-file data element types.
const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

// Array classes (low byte of the array-flags word).
const MX_DOUBLE_CLASS: u8 = 6;
const MX_UINT64_CLASS: u8 = 15;
const FLAG_COMPLEX: u32 = 0x0800;

/// Read every numeric 2-D matrix from a `.mat` file, keyed by variable
/// name, with all element types widened to `f64`.
pub fn read_mat(path: &Path) -> Result<HashMap<String, Array2<f64>>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading MAT file {}", path.display()))?;
    parse_mat(&bytes).with_context(|| format!("parsing MAT file {}", path.display()))
}

/// Parse an in-memory MAT-file image.  See [`read_mat`].
pub fn parse_mat(bytes: &[u8]) -> Result<HashMap<String, Array2<f64>>> {
    if bytes.len() < 128 {
        bail!("file too small for a Level-5 MAT header ({} bytes)", bytes.len());
    }
    // Endian indicator: the i16 "MI" reads back as "IM" on little-endian files.
    match &bytes[126..128] {
        b"IM" => {}
        b"MI" => bail!("big-endian MAT files are not supported"),
        other => bail!("bad endian indicator {other:?}, not a Level-5 MAT file"),
    }

    let mut vars = HashMap::new();
    let mut cur = Cursor { buf: bytes, pos: 128 };
    while cur.remaining() >= 8 {
        parse_element(&mut cur, &mut vars)?;
    }
    Ok(vars)
}

/// Parse one top-level data element, inflating `miCOMPRESSED` payloads.
fn parse_element(cur: &mut Cursor, vars: &mut HashMap<String, Array2<f64>>) -> Result<()> {
    let (dtype, payload) = cur.read_tagged()?;
    match dtype {
        MI_COMPRESSED => {
            let mut inflated = Vec::new();
            flate2::read::ZlibDecoder::new(payload)
                .read_to_end(&mut inflated)
                .context("inflating miCOMPRESSED element")?;
            let mut inner = Cursor { buf: &inflated, pos: 0 };
            let (inner_type, inner_payload) = inner.read_tagged()?;
            if inner_type == MI_MATRIX {
                if let Some((name, arr)) = parse_matrix(inner_payload)? {
                    vars.insert(name, arr);
                }
            }
        }
        MI_MATRIX => {
            if let Some((name, arr)) = parse_matrix(payload)? {
                vars.insert(name, arr);
            }
        }
        // Anything else at top level (metadata, character data) is skipped.
        _ => {}
    }
    Ok(())
}

/// Decode a `miMATRIX` payload into `(name, matrix)`.
///
/// Returns `Ok(None)` for variables the loader has no use for: non-numeric
/// classes, complex data, or arrays that are not 2-D.
fn parse_matrix(payload: &[u8]) -> Result<Option<(String, Array2<f64>)>> {
    let mut cur = Cursor { buf: payload, pos: 0 };

    // 1. Array flags: miUINT32 × 2 (flags+class, nzmax).
    let (flags_type, flags) = cur.read_tagged()?;
    if flags_type != MI_UINT32 || flags.len() < 8 {
        bail!("malformed array-flags sub-element (type {flags_type})");
    }
    let word = u32::from_le_bytes(flags[0..4].try_into().unwrap());
    let class = (word & 0xFF) as u8;
    let complex = word & FLAG_COMPLEX != 0;

    // 2. Dimensions: miINT32 array.
    let (dims_type, dims_raw) = cur.read_tagged()?;
    if dims_type != MI_INT32 {
        bail!("malformed dimensions sub-element (type {dims_type})");
    }
    let dims: Vec<usize> = dims_raw
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes(b.try_into().unwrap()) as usize)
        .collect();

    // 3. Array name: miINT8 bytes.
    let (_, name_raw) = cur.read_tagged()?;
    let name = String::from_utf8_lossy(name_raw).into_owned();

    if !(MX_DOUBLE_CLASS..=MX_UINT64_CLASS).contains(&class) || complex || dims.len() != 2 {
        return Ok(None);
    }

    // 4. Real part: numeric data in any mi type, column-major.
    let (data_type, data) = cur.read_tagged()?;
    let values = widen_to_f64(data_type, data)
        .with_context(|| format!("real part of variable '{name}'"))?;
    let (rows, cols) = (dims[0], dims[1]);
    if values.len() != rows * cols {
        bail!("variable '{name}': {rows}×{cols} dims but {} values", values.len());
    }

    // MATLAB stores column-major; `.f()` keeps the element order correct.
    let arr = Array2::from_shape_vec((rows, cols).f(), values)
        .with_context(|| format!("shaping variable '{name}'"))?;
    Ok(Some((name, arr)))
}

/// Convert a raw payload of the given mi type to `f64` values.
fn widen_to_f64(dtype: u32, raw: &[u8]) -> Result<Vec<f64>> {
    let out = match dtype {
        MI_INT8 => raw.iter().map(|&b| b as i8 as f64).collect(),
        MI_UINT8 => raw.iter().map(|&b| b as f64).collect(),
        MI_INT16 => raw
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_UINT16 => raw
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_INT32 => raw
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_UINT32 => raw
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_SINGLE => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_DOUBLE => raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
            .collect(),
        MI_INT64 => raw
            .chunks_exact(8)
            .map(|b| i64::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        MI_UINT64 => raw
            .chunks_exact(8)
            .map(|b| u64::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect(),
        other => bail!("unsupported numeric element type {other}"),
    };
    Ok(out)
}

// ── Byte cursor ──────────────────────────────────────────────────────────

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn read_u32(&mut self) -> Result<u32> {
        if self.remaining() < 4 {
            bail!("truncated element at offset {}", self.pos);
        }
        let v = u32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    /// Read one tagged element, handling the small-data-element format,
    /// and leave the cursor 8-byte aligned past its payload.
    fn read_tagged(&mut self) -> Result<(u32, &'a [u8])> {
        let word = self.read_u32()?;
        let small_size = word >> 16;
        let (dtype, size) = if small_size != 0 {
            (word & 0xFFFF, small_size as usize)
        } else {
            (word, self.read_u32()? as usize)
        };

        if small_size != 0 {
            // Payload lives in the 4 remaining tag bytes.
            if self.remaining() < 4 {
                bail!("truncated small element at offset {}", self.pos);
            }
            let payload = &self.buf[self.pos..self.pos + size.min(4)];
            self.pos += 4;
            return Ok((dtype, payload));
        }

        if self.remaining() < size {
            bail!("element of {size} bytes exceeds file at offset {}", self.pos);
        }
        let payload = &self.buf[self.pos..self.pos + size];
        self.pos += size;
        // Compressed elements are unpadded; everything else aligns to 8.
        if dtype != MI_COMPRESSED {
            self.pos += (8 - self.pos % 8) % 8;
        }
        Ok((dtype, payload))
    }
}
