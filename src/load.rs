//! Read-side counterpart of the save pipeline.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use num_traits::AsPrimitive;

use crate::element::DataElement;
use crate::error::Result;
use crate::nifti::read_nifti;
use crate::nrrd::read_nrrd;
use crate::save::Destination;
use crate::tiff::{read_tiff, read_tiff_plane, read_tiff_sequence, stack_planes};

/// Load a volume from `path`, using the reader matching its destination type.
///
/// Routes exactly like [`save_any`](crate::save_any): a directory is read as
/// a TIFF sequence, `.txt` as a manifest of plane files, `.tif`/`.tiff` as a
/// multi-page stack, and `.nrrd`/`.nii` through the respective readers.
pub fn load_any<P, A>(path: P) -> Result<Array3<A>>
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
    match Destination::classify(path)? {
        Destination::Directory(dir) => read_tiff_sequence(dir),
        Destination::TiffSequenceManifest(txt_path) => load_from_manifest(&txt_path),
        Destination::Tiff(path) => read_tiff(path),
        Destination::Nrrd(path) => read_nrrd(path),
        Destination::Nifti(path) => read_nifti(path).map(|(_, volume)| volume),
    }
}

/// Load the planes named by a manifest file, in the order they are listed.
fn load_from_manifest<A>(txt_path: &Path) -> Result<Array3<A>>
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
    let manifest = fs::read_to_string(txt_path)?;
    let mut planes = Vec::new();
    for line in manifest.lines().filter(|line| !line.trim().is_empty()) {
        planes.push(read_tiff_plane(line)?);
    }
    stack_planes(planes)
}
