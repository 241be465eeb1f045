//! Utilities for saving and loading volumetric brain images.
//!
//! A volume is a 3-dimensional [`ndarray`] array of shape `(Z, Y, X)`; the
//! first axis is the plane axis. Volumes can be written as a multi-page TIFF
//! stack, a sequence of single-plane TIFFs, an NRRD file, a NIfTI-1 file, or
//! a text manifest listing the files of a TIFF sequence. [`save_any`] picks
//! the writer from the destination path, [`load_any`] does the reverse.
//!
//! # Examples
//!
//! ```no_run
//! use ndarray::Array3;
//!
//! # fn run() -> brainstack::Result<()> {
//! let volume = Array3::<u16>::zeros((64, 512, 512));
//!
//! // One multi-page TIFF stack.
//! brainstack::save_any("brain.tif", &volume)?;
//!
//! // A NIfTI-1 file with voxel sizes in the header.
//! let options = brainstack::NiftiOptions::new().scale([1.0, 0.5, 0.5]);
//! brainstack::write_nifti("brain.nii", &volume, &options)?;
//! # Ok(())
//! # }
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts)]

pub mod element;
pub mod error;
pub mod header;
pub mod load;
pub mod nifti;
pub mod nrrd;
pub mod save;
pub mod tiff;
mod util;

#[cfg(feature = "dialogs")]
pub mod dialog;

pub use crate::element::{DataElement, TiffElement};
pub use crate::error::{Result, VolumeError};
pub use crate::header::NiftiHeader;
pub use crate::load::load_any;
pub use crate::nifti::{read_nifti, write_nifti, NiftiOptions};
pub use crate::nrrd::{read_nrrd, write_nrrd, NrrdEncoding, NrrdOptions};
pub use crate::save::{
    save_any, write_tiff_sequence_with_manifest, Destination, ManifestOptions,
};
pub use crate::tiff::{
    read_tiff, read_tiff_plane, read_tiff_sequence, write_tiff, write_tiff_sequence, Photometric,
    SequenceOptions, TiffOptions,
};
