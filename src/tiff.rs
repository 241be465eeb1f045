//! TIFF stack and plane-sequence I/O.
//!
//! A volume can be written as one multi-page TIFF ([`write_tiff`]) or as a
//! sequence of single-plane files ([`write_tiff_sequence`]), one per slice
//! along axis 0. Sequence file names follow
//! `{prefix}_{zero_padded_index}{suffix}{extension}`, padded wide enough
//! that lexicographic and numeric ordering coincide.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, ArrayBase, Axis, Data, Ix3};
use num_traits::AsPrimitive;
use tiff::decoder::Decoder;
use tiff::encoder::TiffEncoder;

use crate::element::{DataElement, TiffElement};
use crate::error::{Result, VolumeError};
use crate::util::plane_pad_width;

/// How pixel values map to color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Photometric {
    /// Grayscale, with zero as black.
    MiniSBlack,
    /// Color planes holding interleaved RGB samples along the X axis.
    Rgb,
}

impl Default for Photometric {
    fn default() -> Photometric {
        Photometric::MiniSBlack
    }
}

/// Options for [`write_tiff`].
#[derive(Debug, Clone, Default)]
pub struct TiffOptions {
    /// Color space of the samples, grayscale by default.
    pub photometric: Photometric,
}

impl TiffOptions {
    /// Options with the default grayscale interpretation.
    pub fn new() -> TiffOptions {
        TiffOptions::default()
    }

    /// Use the given photometric interpretation.
    pub fn photometric(mut self, photometric: Photometric) -> TiffOptions {
        self.photometric = photometric;
        self
    }
}

/// File-name options for [`write_tiff_sequence`].
#[derive(Debug, Clone)]
pub struct SequenceOptions {
    /// Text between the zero-padded index and the extension, empty by default.
    pub suffix: String,
    /// File extension for each plane, `.tif` by default.
    pub extension: String,
}

impl Default for SequenceOptions {
    fn default() -> SequenceOptions {
        SequenceOptions {
            suffix: String::new(),
            extension: ".tif".to_string(),
        }
    }
}

impl SequenceOptions {
    /// Options with an empty suffix and the `.tif` extension.
    pub fn new() -> SequenceOptions {
        SequenceOptions::default()
    }

    /// Insert the given text between the index and the extension.
    pub fn suffix<S: Into<String>>(mut self, suffix: S) -> SequenceOptions {
        self.suffix = suffix.into();
        self
    }

    /// Use the given file extension for each plane.
    pub fn extension<S: Into<String>>(mut self, extension: S) -> SequenceOptions {
        self.extension = extension.into();
        self
    }
}

/// Write the whole volume to `path` as one multi-page TIFF.
pub fn write_tiff<P, S, A>(path: P, volume: &ArrayBase<S, Ix3>, options: &TiffOptions) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = A>,
    A: TiffElement,
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
    let (_, height, row) = volume.dim();
    let (width, height) = plane_dimensions(row, height, options.photometric)?;
    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)?;
    for plane in volume.axis_iter(Axis(0)) {
        let plane = plane.as_standard_layout();
        A::write_plane(
            &mut encoder,
            width,
            height,
            options.photometric,
            plane.as_slice().unwrap(),
        )?;
    }
    Ok(())
}

fn plane_dimensions(row: usize, height: usize, photometric: Photometric) -> Result<(u32, u32)> {
    let width = match photometric {
        Photometric::MiniSBlack => row,
        Photometric::Rgb => {
            if row % 3 != 0 {
                return Err(VolumeError::InvalidFormat(format!(
                    "RGB planes need an X extent divisible by 3, got {}",
                    row
                )));
            }
            row / 3
        }
    };
    Ok((width as u32, height as u32))
}

/// Write the volume as a sequence of single-plane grayscale TIFF files.
///
/// Each plane `i` lands at `{path_prefix}_{i}{suffix}{extension}` with the
/// index zero-padded to `round(Z/10) + 1` digits. Planes are written
/// sequentially in ascending index order; if one write fails, the earlier
/// planes remain on disk and the error propagates.
pub fn write_tiff_sequence<P, S, A>(
    path_prefix: P,
    volume: &ArrayBase<S, Ix3>,
    options: &SequenceOptions,
) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = A>,
    A: TiffElement,
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
    let prefix = path_prefix.as_ref();
    let pad = plane_pad_width(volume.len_of(Axis(0)));
    for (i, plane) in volume.axis_iter(Axis(0)).enumerate() {
        let (height, width) = plane.dim();
        let file = File::create(plane_path(prefix, i, pad, options))?;
        let mut encoder = TiffEncoder::new(file)?;
        let plane = plane.as_standard_layout();
        A::write_plane(
            &mut encoder,
            width as u32,
            height as u32,
            Photometric::MiniSBlack,
            plane.as_slice().unwrap(),
        )?;
    }
    Ok(())
}

fn plane_path(prefix: &Path, index: usize, pad: usize, options: &SequenceOptions) -> PathBuf {
    let mut name = prefix.file_name().map(OsString::from).unwrap_or_default();
    name.push(format!(
        "_{:0pad$}{}{}",
        index,
        options.suffix,
        options.extension,
        pad = pad
    ));
    prefix.with_file_name(name)
}

/// Read a multi-page TIFF into a `(Z, Y, X)` stack.
///
/// All pages must agree in dimensions. RGB pages come back as interleaved
/// samples along the X axis, mirroring how [`write_tiff`] lays them out.
pub fn read_tiff<P, A>(path: P) -> Result<Array3<A>>
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
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let mut planes = Vec::new();
    loop {
        planes.push(decode_plane(&mut decoder)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }
    stack_planes(planes)
}

/// Read the first page of a TIFF file as a single plane.
pub fn read_tiff_plane<P, A>(path: P) -> Result<Array2<A>>
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
    let mut decoder = Decoder::new(BufReader::new(file))?;
    decode_plane(&mut decoder)
}

/// Read a directory of single-plane TIFF files, in lexicographic file-name
/// order, into a `(Z, Y, X)` stack.
pub fn read_tiff_sequence<P, A>(dir: P) -> Result<Array3<A>>
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
    let mut paths: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    paths.sort();
    let mut planes = Vec::with_capacity(paths.len());
    for path in &paths {
        planes.push(read_tiff_plane(path)?);
    }
    stack_planes(planes)
}

fn decode_plane<R, A>(decoder: &mut Decoder<R>) -> Result<Array2<A>>
where
    R: Read + Seek,
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
    let (width, height) = decoder.dimensions()?;
    let values = A::from_decoded(decoder.read_image()?);
    let height = height as usize;
    // Works out to the plain width for grayscale pages and three times the
    // width for interleaved RGB pages.
    let row = if height == 0 { 0 } else { values.len() / height };
    if row * height != values.len() {
        return Err(VolumeError::InvalidFormat(format!(
            "page of {} samples does not divide into {} rows ({} x {} image)",
            values.len(),
            height,
            width,
            height
        )));
    }
    Array2::from_shape_vec((height, row), values)
        .map_err(|e| VolumeError::InvalidFormat(e.to_string()))
}

pub(crate) fn stack_planes<A>(planes: Vec<Array2<A>>) -> Result<Array3<A>>
where
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
    let dim = planes.first().map(|p| p.dim()).unwrap_or((0, 0));
    let (height, width) = dim;
    let mut values = Vec::with_capacity(planes.len() * height * width);
    for plane in &planes {
        if plane.dim() != dim {
            return Err(VolumeError::InvalidFormat(format!(
                "plane dimensions differ within the stack: {:?} vs {:?}",
                plane.dim(),
                dim
            )));
        }
        values.extend_from_slice(plane.as_slice().unwrap());
    }
    Array3::from_shape_vec((planes.len(), height, width), values)
        .map_err(|e| VolumeError::InvalidFormat(e.to_string()))
}
