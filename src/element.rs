//! Sample element traits, binding the supported numeric types to the
//! on-disk formats.
//!
//! [`DataElement`] covers everything the NIfTI and NRRD writers can
//! serialize. [`TiffElement`] is the subset the TIFF encoder accepts, with
//! the per-type mapping to a color type.

use std::io::{self, Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_traits::AsPrimitive;
use tiff::decoder::DecodingResult;
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::{Result, VolumeError};
use crate::tiff::Photometric;

/// Interface for types that can be used as volume samples.
///
/// The trait carries the format codes for the sample type and knows how to
/// serialize a slice of samples in little-endian order, which is the byte
/// order this crate emits and re-reads.
pub trait DataElement: Copy + PartialEq + 'static
where
    u8: AsPrimitive<Self>,
    i8: AsPrimitive<Self>,
    u16: AsPrimitive<Self>,
    i16: AsPrimitive<Self>,
    u32: AsPrimitive<Self>,
    i32: AsPrimitive<Self>,
    u64: AsPrimitive<Self>,
    i64: AsPrimitive<Self>,
    f32: AsPrimitive<Self>,
    f64: AsPrimitive<Self>,
{
    /// NIfTI-1 `datatype` code for this sample type.
    const NIFTI_CODE: i16;

    /// NRRD `type:` field name for this sample type.
    const NRRD_TYPE: &'static str;

    /// Write all samples to `writer` in little-endian order.
    fn write_slice<W: Write>(writer: W, data: &[Self]) -> io::Result<()>;

    /// Read `len` little-endian samples from `reader`.
    fn read_vec<R: Read>(reader: R, len: usize) -> io::Result<Vec<Self>>;

    /// Convert a decoded TIFF buffer into samples of this type, casting
    /// numerically when the stored sample type differs.
    fn from_decoded(decoded: DecodingResult) -> Vec<Self> {
        match decoded {
            DecodingResult::U8(v) => cast_vec(v),
            DecodingResult::U16(v) => cast_vec(v),
            DecodingResult::U32(v) => cast_vec(v),
            DecodingResult::U64(v) => cast_vec(v),
            DecodingResult::I8(v) => cast_vec(v),
            DecodingResult::I16(v) => cast_vec(v),
            DecodingResult::I32(v) => cast_vec(v),
            DecodingResult::I64(v) => cast_vec(v),
            DecodingResult::F32(v) => cast_vec(v),
            DecodingResult::F64(v) => cast_vec(v),
        }
    }

    /// Read `len` samples stored with the given NIfTI-1 datatype code,
    /// casting them into this type.
    fn read_nifti_typed<R: Read>(mut reader: R, code: i16, len: usize) -> Result<Vec<Self>> {
        Ok(match code {
            2 => cast_vec(<u8>::read_vec(&mut reader, len)?),
            4 => cast_vec(<i16>::read_vec(&mut reader, len)?),
            8 => cast_vec(<i32>::read_vec(&mut reader, len)?),
            16 => cast_vec(<f32>::read_vec(&mut reader, len)?),
            64 => cast_vec(<f64>::read_vec(&mut reader, len)?),
            256 => cast_vec(<i8>::read_vec(&mut reader, len)?),
            512 => cast_vec(<u16>::read_vec(&mut reader, len)?),
            768 => cast_vec(<u32>::read_vec(&mut reader, len)?),
            other => {
                return Err(VolumeError::InvalidFormat(format!(
                    "unsupported datatype code {}",
                    other
                )))
            }
        })
    }

    /// Read `len` samples stored with the given NRRD type name, casting
    /// them into this type.
    fn read_nrrd_typed<R: Read>(mut reader: R, type_name: &str, len: usize) -> Result<Vec<Self>> {
        Ok(match type_name {
            "uint8" => cast_vec(<u8>::read_vec(&mut reader, len)?),
            "int8" => cast_vec(<i8>::read_vec(&mut reader, len)?),
            "uint16" => cast_vec(<u16>::read_vec(&mut reader, len)?),
            "int16" => cast_vec(<i16>::read_vec(&mut reader, len)?),
            "uint32" => cast_vec(<u32>::read_vec(&mut reader, len)?),
            "int32" => cast_vec(<i32>::read_vec(&mut reader, len)?),
            "float" => cast_vec(<f32>::read_vec(&mut reader, len)?),
            "double" => cast_vec(<f64>::read_vec(&mut reader, len)?),
            other => {
                return Err(VolumeError::InvalidFormat(format!(
                    "unsupported sample type {:?}",
                    other
                )))
            }
        })
    }
}

/// Cast every value in the vector with `as`-style numeric conversion.
fn cast_vec<S, T>(values: Vec<S>) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: Copy + 'static,
{
    values.iter().map(|v| v.as_()).collect()
}

impl DataElement for u8 {
    const NIFTI_CODE: i16 = 2;
    const NRRD_TYPE: &'static str = "uint8";

    fn write_slice<W: Write>(mut writer: W, data: &[Self]) -> io::Result<()> {
        writer.write_all(data)
    }

    fn read_vec<R: Read>(mut reader: R, len: usize) -> io::Result<Vec<Self>> {
        let mut out = vec![0; len];
        reader.read_exact(&mut out)?;
        Ok(out)
    }
}

impl DataElement for i8 {
    const NIFTI_CODE: i16 = 256;
    const NRRD_TYPE: &'static str = "int8";

    fn write_slice<W: Write>(mut writer: W, data: &[Self]) -> io::Result<()> {
        for v in data {
            writer.write_i8(*v)?;
        }
        Ok(())
    }

    fn read_vec<R: Read>(mut reader: R, len: usize) -> io::Result<Vec<Self>> {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(reader.read_i8()?);
        }
        Ok(out)
    }
}

macro_rules! impl_data_element {
    ($t:ty, $code:expr, $nrrd:expr, $write:ident, $read:ident) => {
        impl DataElement for $t {
            const NIFTI_CODE: i16 = $code;
            const NRRD_TYPE: &'static str = $nrrd;

            fn write_slice<W: Write>(mut writer: W, data: &[Self]) -> io::Result<()> {
                for v in data {
                    writer.$write::<LittleEndian>(*v)?;
                }
                Ok(())
            }

            fn read_vec<R: Read>(mut reader: R, len: usize) -> io::Result<Vec<Self>> {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(reader.$read::<LittleEndian>()?);
                }
                Ok(out)
            }
        }
    };
}

impl_data_element!(u16, 512, "uint16", write_u16, read_u16);
impl_data_element!(i16, 4, "int16", write_i16, read_i16);
impl_data_element!(u32, 768, "uint32", write_u32, read_u32);
impl_data_element!(i32, 8, "int32", write_i32, read_i32);
impl_data_element!(f32, 16, "float", write_f32, read_f32);
impl_data_element!(f64, 64, "double", write_f64, read_f64);

/// A [`DataElement`] that the TIFF encoder accepts as a plane sample.
///
/// All implementors support grayscale ("minisblack") planes; `u8` and `u16`
/// additionally support interleaved RGB planes.
pub trait TiffElement: DataElement
where
    u8: AsPrimitive<Self>,
    i8: AsPrimitive<Self>,
    u16: AsPrimitive<Self>,
    i16: AsPrimitive<Self>,
    u32: AsPrimitive<Self>,
    i32: AsPrimitive<Self>,
    u64: AsPrimitive<Self>,
    i64: AsPrimitive<Self>,
    f32: AsPrimitive<Self>,
    f64: AsPrimitive<Self>,
{
    /// Encode one plane of samples as the next TIFF image.
    ///
    /// For RGB planes, `data` holds `width * height * 3` interleaved samples.
    fn write_plane<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        photometric: Photometric,
        data: &[Self],
    ) -> Result<()>;
}

macro_rules! impl_tiff_gray {
    ($t:ty, $gray:ty) => {
        impl TiffElement for $t {
            fn write_plane<W: Write + Seek>(
                encoder: &mut TiffEncoder<W>,
                width: u32,
                height: u32,
                photometric: Photometric,
                data: &[Self],
            ) -> Result<()> {
                match photometric {
                    Photometric::MiniSBlack => {
                        encoder.write_image::<$gray>(width, height, data)?;
                        Ok(())
                    }
                    Photometric::Rgb => {
                        Err(VolumeError::Photometric(photometric, Self::NRRD_TYPE))
                    }
                }
            }
        }
    };
}

macro_rules! impl_tiff_color {
    ($t:ty, $gray:ty, $rgb:ty) => {
        impl TiffElement for $t {
            fn write_plane<W: Write + Seek>(
                encoder: &mut TiffEncoder<W>,
                width: u32,
                height: u32,
                photometric: Photometric,
                data: &[Self],
            ) -> Result<()> {
                match photometric {
                    Photometric::MiniSBlack => encoder.write_image::<$gray>(width, height, data)?,
                    Photometric::Rgb => encoder.write_image::<$rgb>(width, height, data)?,
                }
                Ok(())
            }
        }
    };
}

impl_tiff_color!(u8, colortype::Gray8, colortype::RGB8);
impl_tiff_color!(u16, colortype::Gray16, colortype::RGB16);
impl_tiff_gray!(u32, colortype::Gray32);
impl_tiff_gray!(f32, colortype::Gray32Float);
impl_tiff_gray!(f64, colortype::Gray64Float);
