//! Writing and reading of NRRD volumes.
//!
//! Emits an NRRD0004 text header followed by the data payload, either raw or
//! gzip-compressed. Sizes are listed fastest axis first, so a `(Z, Y, X)`
//! volume is declared as `sizes: X Y Z` with its payload in C order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array3, ArrayBase, Data, Ix3};
use num_traits::AsPrimitive;

use crate::element::DataElement;
use crate::error::{Result, VolumeError};

const NRRD_MAGIC: &str = "NRRD0004";

/// Payload encoding of an NRRD file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NrrdEncoding {
    /// Uncompressed little-endian samples.
    Raw,
    /// Gzip-compressed little-endian samples.
    Gzip,
}

impl NrrdEncoding {
    fn name(self) -> &'static str {
        match self {
            NrrdEncoding::Raw => "raw",
            NrrdEncoding::Gzip => "gzip",
        }
    }
}

impl Default for NrrdEncoding {
    fn default() -> NrrdEncoding {
        NrrdEncoding::Raw
    }
}

/// Options for [`write_nrrd`].
#[derive(Debug, Clone, Default)]
pub struct NrrdOptions {
    /// Payload encoding, raw by default.
    pub encoding: NrrdEncoding,
}

impl NrrdOptions {
    /// Options with the default raw encoding.
    pub fn new() -> NrrdOptions {
        NrrdOptions::default()
    }

    /// Use the given payload encoding.
    pub fn encoding(mut self, encoding: NrrdEncoding) -> NrrdOptions {
        self.encoding = encoding;
        self
    }
}

/// Write the volume to `path` as an NRRD file.
pub fn write_nrrd<P, S, A>(path: P, volume: &ArrayBase<S, Ix3>, options: &NrrdOptions) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = A>,
    A: DataElement,
    u8: AsPrimitive<A>,
    i8: AsPrimitive<A>,
    u16: AsPrimitive<A>,
    i16: AsPrimitive<A>,
    u32: AsPrimitive<A>,
    i32: AsPrimitive<A>,
    u64: AsPrimitive<A>,
    i64: AsPrimitive<A>,
    f32: AsPrimitive<A>,
    f64: AsPrimitive<A>,
{
    let (z, y, x) = volume.dim();
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", NRRD_MAGIC)?;
    writeln!(writer, "type: {}", A::NRRD_TYPE)?;
    writeln!(writer, "dimension: 3")?;
    writeln!(writer, "sizes: {} {} {}", x, y, z)?;
    writeln!(writer, "endian: little")?;
    writeln!(writer, "encoding: {}", options.encoding.name())?;
    writeln!(writer)?;

    let data = volume.as_standard_layout();
    let samples = data.as_slice().unwrap();
    match options.encoding {
        NrrdEncoding::Raw => {
            A::write_slice(&mut writer, samples)?;
            writer.flush()?;
        }
        NrrdEncoding::Gzip => {
            let mut gz = GzEncoder::new(writer, Compression::default());
            A::write_slice(&mut gz, samples)?;
            let mut writer = gz.finish()?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Read an NRRD volume back into a `(Z, Y, X)` array.
///
/// Understands the header fields this crate emits; unknown fields are
/// skipped. Samples stored as a different type are cast numerically.
pub fn read_nrrd<P, A>(path: P) -> Result<Array3<A>>
where
    P: AsRef<Path>,
    A: DataElement,
    u8: AsPrimitive<A>,
    i8: AsPrimitive<A>,
    u16: AsPrimitive<A>,
    i16: AsPrimitive<A>,
    u32: AsPrimitive<A>,
    i32: AsPrimitive<A>,
    u64: AsPrimitive<A>,
    i64: AsPrimitive<A>,
    f32: AsPrimitive<A>,
    f64: AsPrimitive<A>,
{
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !line.starts_with("NRRD") {
        return Err(VolumeError::InvalidFormat(
            "missing NRRD magic line".to_string(),
        ));
    }

    let mut type_name = None;
    let mut dimension = None;
    let mut sizes: Option<Vec<usize>> = None;
    let mut encoding = None;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(VolumeError::InvalidFormat(
                "header ended without a data section".to_string(),
            ));
        }
        let entry = line.trim_end();
        if entry.is_empty() {
            break;
        }
        if entry.starts_with('#') {
            continue;
        }
        let mut parts = entry.splitn(2, ':');
        let key = parts.next().unwrap_or("");
        let value = match parts.next() {
            Some(value) => value.trim(),
            None => {
                return Err(VolumeError::InvalidFormat(format!(
                    "malformed header line {:?}",
                    entry
                )))
            }
        };
        match key {
            "type" => type_name = Some(value.to_string()),
            "dimension" => {
                dimension = Some(value.parse::<usize>().map_err(|e| {
                    VolumeError::InvalidFormat(format!("bad dimension field: {}", e))
                })?)
            }
            "sizes" => {
                let parsed = value
                    .split_whitespace()
                    .map(str::parse)
                    .collect::<::std::result::Result<Vec<usize>, _>>()
                    .map_err(|e| VolumeError::InvalidFormat(format!("bad sizes field: {}", e)))?;
                sizes = Some(parsed);
            }
            "encoding" => encoding = Some(value.to_string()),
            "endian" => {
                if value != "little" {
                    return Err(VolumeError::InvalidFormat(format!(
                        "unsupported endianness {:?}",
                        value
                    )));
                }
            }
            _ => {}
        }
    }

    let type_name =
        type_name.ok_or_else(|| VolumeError::InvalidFormat("missing type field".to_string()))?;
    let sizes =
        sizes.ok_or_else(|| VolumeError::InvalidFormat("missing sizes field".to_string()))?;
    if dimension != Some(3) || sizes.len() != 3 {
        return Err(VolumeError::InvalidFormat(format!(
            "expected a 3-dimensional volume, got dimension {:?} with sizes {:?}",
            dimension, sizes
        )));
    }
    let (x, y, z) = (sizes[0], sizes[1], sizes[2]);
    let len = x * y * z;

    let values: Vec<A> = match encoding.as_deref() {
        Some("raw") => A::read_nrrd_typed(&mut reader, &type_name, len)?,
        Some("gzip") | Some("gz") => {
            A::read_nrrd_typed(GzDecoder::new(&mut reader), &type_name, len)?
        }
        other => {
            return Err(VolumeError::InvalidFormat(format!(
                "unsupported encoding {:?}",
                other
            )))
        }
    };
    Array3::from_shape_vec((z, y, x), values).map_err(|e| VolumeError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use tempfile::tempdir;

    #[test]
    fn header_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vol.nrrd");
        let volume = Array3::<u8>::zeros((5, 4, 3));
        write_nrrd(&path, &volume, &NrrdOptions::new()).unwrap();

        let contents = std::fs::read(&path).unwrap();
        let text = String::from_utf8_lossy(&contents[..contents.len() - volume.len()]);
        assert!(text.starts_with("NRRD0004\n"));
        assert!(text.contains("type: uint8\n"));
        assert!(text.contains("sizes: 3 4 5\n"));
        assert!(text.contains("encoding: raw\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn rejects_missing_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vol.nrrd");
        std::fs::write(&path, b"not an nrrd\n\n").unwrap();
        assert!(read_nrrd::<_, u8>(&path).is_err());
    }
}
