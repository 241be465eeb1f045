//! Destination classification and the format-dispatching save pipeline.
//!
//! [`save_any`] is the single entry point for collaborators that do not want
//! to pick a format themselves: the destination path decides which writer
//! runs. The classification lives in [`Destination`] so that the routing is
//! an exhaustive `match` rather than a chain of string comparisons.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ndarray::{ArrayBase, Data, Ix3};
use num_traits::AsPrimitive;

use crate::element::TiffElement;
use crate::error::{Result, VolumeError};
use crate::nifti::{write_nifti, NiftiOptions};
use crate::nrrd::{write_nrrd, NrrdOptions};
use crate::tiff::{write_tiff, write_tiff_sequence, SequenceOptions, TiffOptions};

/// File-name prefix used for sequences written by the dispatcher.
pub(crate) const SEQUENCE_PREFIX: &str = "image";

/// The write strategy chosen for a destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An existing directory: a TIFF sequence is placed directly inside it.
    Directory(PathBuf),
    /// A `.tif`/`.tiff` file: one multi-page TIFF stack.
    Tiff(PathBuf),
    /// A `.txt` file: a manifest plus a TIFF sequence in a sibling
    /// sub-directory.
    TiffSequenceManifest(PathBuf),
    /// A `.nrrd` file.
    Nrrd(PathBuf),
    /// A `.nii` file.
    Nifti(PathBuf),
}

impl Destination {
    /// Classify a destination path.
    ///
    /// An existing directory wins over any extension; otherwise the final
    /// extension decides, case-sensitively. The classification is made from
    /// scratch on every call, with no caching.
    pub fn classify<P: AsRef<Path>>(path: P) -> Result<Destination> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Destination::Directory(path.to_path_buf()));
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Ok(Destination::TiffSequenceManifest(path.to_path_buf())),
            Some("tif") | Some("tiff") => Ok(Destination::Tiff(path.to_path_buf())),
            Some("nrrd") => Ok(Destination::Nrrd(path.to_path_buf())),
            Some("nii") => Ok(Destination::Nifti(path.to_path_buf())),
            _ => Err(VolumeError::UnsupportedDestination(path.to_path_buf())),
        }
    }
}

/// Save the volume to `path`, using the writer matching its destination type.
///
/// Routing, in precedence order:
///
/// 1. an existing directory receives a TIFF sequence with the `image` prefix;
/// 2. `.txt` receives a manifest plus a sequence sub-directory
///    ([`write_tiff_sequence_with_manifest`] with defaults);
/// 3. `.tif`/`.tiff` receives a multi-page TIFF stack;
/// 4. `.nrrd` receives an NRRD file;
/// 5. `.nii` receives a NIfTI-1 file;
///
/// and anything else fails with
/// [`UnsupportedDestination`](VolumeError::UnsupportedDestination).
pub fn save_any<P, S, A>(path: P, volume: &ArrayBase<S, Ix3>) -> Result<()>
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
    match Destination::classify(path)? {
        Destination::Directory(dir) => write_tiff_sequence(
            dir.join(SEQUENCE_PREFIX),
            volume,
            &SequenceOptions::default(),
        ),
        Destination::TiffSequenceManifest(txt_path) => {
            write_tiff_sequence_with_manifest(txt_path, volume, &ManifestOptions::default())
        }
        Destination::Tiff(dest) => write_tiff(dest, volume, &TiffOptions::default()),
        Destination::Nrrd(dest) => write_nrrd(dest, volume, &NrrdOptions::default()),
        Destination::Nifti(dest) => write_nifti(dest, volume, &NiftiOptions::default()),
    }
}

/// Options for [`write_tiff_sequence_with_manifest`].
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    /// Name of the sequence sub-directory, `sub` by default.
    pub subdir_name: String,
    /// File-name prefix for the planes, `image` by default.
    pub tiff_prefix: String,
}

impl Default for ManifestOptions {
    fn default() -> ManifestOptions {
        ManifestOptions {
            subdir_name: "sub".to_string(),
            tiff_prefix: SEQUENCE_PREFIX.to_string(),
        }
    }
}

impl ManifestOptions {
    /// Options with the default sub-directory and prefix.
    pub fn new() -> ManifestOptions {
        ManifestOptions::default()
    }

    /// Write the sequence into a sub-directory of this name.
    pub fn subdir_name<S: Into<String>>(mut self, name: S) -> ManifestOptions {
        self.subdir_name = name.into();
        self
    }

    /// Prefix each plane file name with this text.
    pub fn tiff_prefix<S: Into<String>>(mut self, prefix: S) -> ManifestOptions {
        self.tiff_prefix = prefix.into();
        self
    }
}

/// Write the volume as a TIFF sequence plus a text manifest of its files.
///
/// The sequence goes into a sub-directory next to the manifest file. The
/// manifest lists the sequence's paths one per line, newline-joined with no
/// trailing newline, in lexicographic (= plane-index) order. The
/// sub-directory must not exist yet: a pre-existing one is an error, never a
/// merge target.
pub fn write_tiff_sequence_with_manifest<P, S, A>(
    txt_path: P,
    volume: &ArrayBase<S, Ix3>,
    options: &ManifestOptions,
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
    let txt_path = txt_path.as_ref();
    let sub_dir = match txt_path.parent() {
        Some(parent) => parent.join(&options.subdir_name),
        None => PathBuf::from(&options.subdir_name),
    };
    fs::create_dir(&sub_dir)?;
    write_tiff_sequence(
        sub_dir.join(&options.tiff_prefix),
        volume,
        &SequenceOptions::default(),
    )?;

    let mut paths: Vec<PathBuf> = fs::read_dir(&sub_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    paths.sort();
    let manifest = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(txt_path, manifest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Destination;
    use crate::error::VolumeError;
    use tempfile::tempdir;

    #[test]
    fn classify_extensions() {
        assert!(matches!(
            Destination::classify("brain.txt"),
            Ok(Destination::TiffSequenceManifest(_))
        ));
        assert!(matches!(
            Destination::classify("brain.tif"),
            Ok(Destination::Tiff(_))
        ));
        assert!(matches!(
            Destination::classify("brain.tiff"),
            Ok(Destination::Tiff(_))
        ));
        assert!(matches!(
            Destination::classify("brain.nrrd"),
            Ok(Destination::Nrrd(_))
        ));
        assert!(matches!(
            Destination::classify("brain.nii"),
            Ok(Destination::Nifti(_))
        ));
    }

    #[test]
    fn classify_existing_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Destination::classify(dir.path()),
            Ok(Destination::Directory(_))
        ));
    }

    #[test]
    fn extension_matching_is_exact() {
        // A compound `.nii.gz` suffix and uppercase extensions are not
        // recognized, exactly like unrelated extensions.
        for name in &["brain.nii.gz", "brain.TIF", "brain.xyz", "brain"] {
            match Destination::classify(*name) {
                Err(VolumeError::UnsupportedDestination(path)) => {
                    assert!(path.ends_with(*name));
                }
                other => panic!("expected UnsupportedDestination, got {:?}", other),
            }
        }
    }
}
