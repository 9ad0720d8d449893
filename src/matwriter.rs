//! Level-5 MAT-file writer.
//!
//! Counterpart of [`crate::mat`], used to synthesize session files for
//! tests and tooling.  Writes little-endian files with `f64` or `u8`
//! matrices, optionally zlib-compressed per variable.
use anyhow::{Context, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;

/// One variable to be written: a 2-D numeric matrix.
///
/// Payload values are given in MATLAB's column-major order.
pub struct MatVar {
    name: String,
    rows: usize,
    cols: usize,
    payload: Payload,
    compressed: bool,
}

enum Payload {
    F64(Vec<f64>),
    U8(Vec<u8>),
}

impl MatVar {
    /// An `mxDOUBLE` matrix with `values` in column-major order.
    pub fn f64(name: &str, rows: usize, cols: usize, values: &[f64]) -> Self {
        assert_eq!(values.len(), rows * cols);
        Self {
            name: name.to_string(),
            rows,
            cols,
            payload: Payload::F64(values.to_vec()),
            compressed: false,
        }
    }

    /// An `mxUINT8` matrix with `values` in column-major order.
    pub fn u8(name: &str, rows: usize, cols: usize, values: &[u8]) -> Self {
        assert_eq!(values.len(), rows * cols);
        Self {
            name: name.to_string(),
            rows,
            cols,
            payload: Payload::U8(values.to_vec()),
            compressed: false,
        }
    }

    /// Wrap this variable in a zlib `miCOMPRESSED` element.
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Encode the complete `miMATRIX` element (tag + padded sub-elements).
    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();

        // Array flags: class in the low byte.
        let class: u32 = match self.payload {
            Payload::F64(_) => 6, // mxDOUBLE_CLASS
            Payload::U8(_) => 9,  // mxUINT8_CLASS
        };
        put_tag(&mut body, 6, 8); // miUINT32
        body.extend_from_slice(&class.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());

        // Dimensions.
        put_tag(&mut body, 5, 8); // miINT32
        body.extend_from_slice(&(self.rows as i32).to_le_bytes());
        body.extend_from_slice(&(self.cols as i32).to_le_bytes());

        // Name.
        put_tag(&mut body, 1, self.name.len() as u32); // miINT8
        body.extend_from_slice(self.name.as_bytes());
        pad8(&mut body);

        // Real part.
        match &self.payload {
            Payload::F64(vals) => {
                put_tag(&mut body, 9, (vals.len() * 8) as u32); // miDOUBLE
                for v in vals {
                    body.extend_from_slice(&v.to_le_bytes());
                }
            }
            Payload::U8(vals) => {
                put_tag(&mut body, 2, vals.len() as u32); // miUINT8
                body.extend_from_slice(vals);
            }
        }
        pad8(&mut body);

        let mut element = Vec::with_capacity(body.len() + 8);
        put_tag(&mut element, 14, body.len() as u32); // miMATRIX
        element.extend_from_slice(&body);

        if self.compressed {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&element).expect("zlib write to Vec");
            let deflated = enc.finish().expect("zlib finish to Vec");
            let mut wrapped = Vec::with_capacity(deflated.len() + 8);
            put_tag(&mut wrapped, 15, deflated.len() as u32); // miCOMPRESSED
            wrapped.extend_from_slice(&deflated);
            // Compressed elements are not padded.
            wrapped
        } else {
            element
        }
    }
}

/// Serialize a complete MAT-file image.
pub fn write_mat_bytes(vars: &[MatVar]) -> Vec<u8> {
    let mut out = Vec::new();

    // 128-byte header: 116 bytes of text, 8 subsystem bytes, version, "IM".
    let text = b"MATLAB 5.0 MAT-file, written by emgwin";
    let mut header = [b' '; 116];
    header[..text.len()].copy_from_slice(text);
    out.extend_from_slice(&header);
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&0x0100u16.to_le_bytes());
    out.extend_from_slice(b"IM");

    for var in vars {
        out.extend_from_slice(&var.encode());
    }
    out
}

/// Write a MAT file to disk, creating parent directories as needed.
pub fn write_mat(path: &Path, vars: &[MatVar]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, write_mat_bytes(vars))
        .with_context(|| format!("writing MAT file {}", path.display()))
}

fn put_tag(out: &mut Vec<u8>, dtype: u32, size: u32) {
    out.extend_from_slice(&dtype.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
}

fn pad8(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}
