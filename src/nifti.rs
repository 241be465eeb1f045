//! Writing and reading of NIfTI-1 volumes.
//!
//! The writer produces a single `.nii` file, or a `.nii.gz` file when the
//! destination carries a `.gz` extension. Volume data is stored in Fortran
//! order, as the format requires, so a `(Z, Y, X)` array round-trips to an
//! identical array.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::mem;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array3, ArrayBase, Axis, Data, Ix3, ShapeBuilder};
use num_traits::AsPrimitive;

use crate::element::DataElement;
use crate::error::{Result, VolumeError};
use crate::header::NiftiHeader;
use crate::util::is_gz_file;

const IDENTITY_AFFINE: [[f32; 4]; 4] = [
    [1., 0., 0., 0.],
    [0., 1., 0., 0.],
    [0., 0., 1., 0.],
    [0., 0., 0., 1.],
];

/// Options for [`write_nifti`], with named defaults.
///
/// Without a reference header, the file's header is built from the affine
/// transform (identity when absent, stored in the sform rows with
/// `sform_code` 1). A `scale` overwrites the voxel-size metadata after
/// construction. In all cases, `dim`, `datatype` and `bitpix` depend only on
/// the volume being written, never on the options.
#[derive(Debug, Clone, Default)]
pub struct NiftiOptions {
    /// Header of an already-built image to carry metadata over from.
    /// When set, `affine` is ignored.
    pub reference: Option<NiftiHeader>,
    /// 4x4 affine transform to store in the header.
    pub affine: Option<[[f32; 4]; 4]>,
    /// Per-axis voxel sizes, stored in `pixdim[1..=3]`.
    pub scale: Option<[f32; 3]>,
}

impl NiftiOptions {
    /// Options with all defaults: no reference, identity affine, no scale.
    pub fn new() -> NiftiOptions {
        NiftiOptions::default()
    }

    /// Carry metadata over from the header of an already-built image.
    pub fn reference(mut self, header: NiftiHeader) -> NiftiOptions {
        self.reference = Some(header);
        self
    }

    /// Store the given 4x4 affine transform in the header.
    pub fn affine(mut self, affine: [[f32; 4]; 4]) -> NiftiOptions {
        self.affine = Some(affine);
        self
    }

    /// Overwrite the voxel sizes in the header.
    pub fn scale(mut self, scale: [f32; 3]) -> NiftiOptions {
        self.scale = Some(scale);
        self
    }
}

/// Write the volume to `path` as a NIfTI-1 file (`.nii` or `.nii.gz`).
pub fn write_nifti<P, S, A>(
    path: P,
    volume: &ArrayBase<S, Ix3>,
    options: &NiftiOptions,
) -> Result<()>
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
    let header = build_header::<A>(volume.dim(), options);
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    if is_gz_file(path.as_ref()) {
        let mut gz = GzEncoder::new(writer, Compression::default());
        write_file(&mut gz, &header, volume)?;
        let mut writer = gz.finish()?;
        writer.flush()?;
    } else {
        let mut writer = writer;
        write_file(&mut writer, &header, volume)?;
        writer.flush()?;
    }
    Ok(())
}

fn build_header<A>(shape: (usize, usize, usize), options: &NiftiOptions) -> NiftiHeader
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
    let mut header = match &options.reference {
        Some(reference) => reference.clone(),
        None => {
            let affine = options.affine.unwrap_or(IDENTITY_AFFINE);
            NiftiHeader {
                sform_code: 1,
                srow_x: affine[0],
                srow_y: affine[1],
                srow_z: affine[2],
                ..NiftiHeader::default()
            }
        }
    };
    let (z, y, x) = shape;
    header.dim = [3, z as u16, y as u16, x as u16, 1, 1, 1, 1];
    header.datatype = A::NIFTI_CODE;
    header.bitpix = (mem::size_of::<A>() * 8) as i16;
    header.vox_offset = 352.;
    if let Some(scale) = options.scale {
        header.pixdim[1] = scale[0];
        header.pixdim[2] = scale[1];
        header.pixdim[3] = scale[2];
    }
    header
}

fn write_file<W, S, A>(writer: &mut W, header: &NiftiHeader, volume: &ArrayBase<S, Ix3>) -> Result<()>
where
    W: Write,
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
    header.write_to(&mut *writer)?;
    // Empty extender bytes between the header and the volume.
    writer.write_u32::<LittleEndian>(0)?;

    // The format stores Fortran-ordered data. Reversing the axes and then
    // iterating plane-wise in C order emits exactly that.
    let data = volume.t();
    for plane in data.axis_iter(Axis(0)) {
        let plane = plane.as_standard_layout();
        A::write_slice(&mut *writer, plane.as_slice().unwrap())?;
    }
    Ok(())
}

/// Read a NIfTI-1 volume (`.nii` or `.nii.gz`) back into a `(Z, Y, X)` array.
///
/// Samples stored as a different type are cast numerically. Files with more
/// than three dimensions yield the first volume.
pub fn read_nifti<P, A>(path: P) -> Result<(NiftiHeader, Array3<A>)>
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
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    if is_gz_file(path) {
        read_file(GzDecoder::new(file))
    } else {
        read_file(file)
    }
}

fn read_file<R, A>(mut reader: R) -> Result<(NiftiHeader, Array3<A>)>
where
    R: Read,
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
    let header = NiftiHeader::from_reader(&mut reader)?;
    if header.dim[0] < 3 {
        return Err(VolumeError::InvalidFormat(format!(
            "expected a 3-dimensional volume, got {} dimensions",
            header.dim[0]
        )));
    }
    let skip = (header.vox_offset as u64).saturating_sub(348);
    io::copy(&mut reader.by_ref().take(skip), &mut io::sink())?;

    let (z, y, x) = (
        header.dim[1] as usize,
        header.dim[2] as usize,
        header.dim[3] as usize,
    );
    let len = z * y * x;
    let values = A::read_nifti_typed(&mut reader, header.datatype, len)?;
    let volume = Array3::from_shape_vec((z, y, x).f(), values)
        .map_err(|e| VolumeError::InvalidFormat(e.to_string()))?;
    Ok((header, volume))
}
