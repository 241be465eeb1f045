//! Error types for the volume writers and readers.

use std::io;
use std::path::PathBuf;

use quick_error::quick_error;
use tiff::TiffError;

use crate::tiff::Photometric;

quick_error! {
    /// The error type for saving and loading volumes.
    #[derive(Debug)]
    pub enum VolumeError {
        /// The destination is neither an existing directory nor a path with
        /// a recognized extension.
        UnsupportedDestination(path: PathBuf) {
            display("could not guess data type for path {}", path.display())
        }
        /// A file's contents did not match what the reader expected.
        InvalidFormat(reason: String) {
            display("invalid image file: {}", reason)
        }
        /// The photometric interpretation cannot represent the sample type.
        Photometric(photometric: Photometric, samples: &'static str) {
            display("{:?} photometric is not supported for {} samples", photometric, samples)
        }
        /// Error reported by the TIFF codec.
        Tiff(err: TiffError) {
            from()
            display("{}", err)
        }
        /// I/O error.
        Io(err: io::Error) {
            from()
            display("{}", err)
        }
    }
}

/// Alias for a `Result` with the error type [`VolumeError`].
pub type Result<T> = ::std::result::Result<T, VolumeError>;
