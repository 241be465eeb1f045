//! The NIfTI-1 header type and its little-endian serialization.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, VolumeError};

/// Magic code for NIfTI-1 header files (extension ".hdr[.gz]").
pub const MAGIC_CODE_NI1: &[u8; 4] = b"ni1\0";
/// Magic code for full NIfTI-1 files (extension ".nii[.gz]").
pub const MAGIC_CODE_NIP1: &[u8; 4] = b"n+1\0";

/// The NIfTI-1 header.
///
/// All fields are public and named after the specification's header file.
/// The default value is a plausible empty single-file header: `sizeof_hdr`
/// 348, unit dimensions and grid spacings, identity scaling and the "n+1"
/// magic code. The writer recomputes `dim`, `datatype` and `bitpix` from the
/// volume, so a header used as a reference only contributes the remaining
/// metadata fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Unused in NIFTI-1
    pub data_type: [u8; 10],
    /// Unused in NIFTI-1
    pub db_name: [u8; 18],
    /// Unused in NIFTI-1
    pub extents: i32,
    /// Unused in NIFTI-1
    pub session_error: i16,
    /// Unused in NIFTI-1
    pub regular: u8,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions
    pub dim: [u16; 8],
    /// 1st intent parameter
    pub intent_p1: f32,
    /// 2nd intent parameter
    pub intent_p2: f32,
    /// 3rd intent parameter
    pub intent_p3: f32,
    /// NIFTI_INTENT_* code
    pub intent_code: i16,
    /// Defines the data type
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i16,
    /// Grid spacings
    pub pixdim: [f32; 8],
    /// Offset into the .nii file to reach the volume
    pub vox_offset: f32,
    /// Data scaling: slope
    pub scl_slope: f32,
    /// Data scaling: offset
    pub scl_inter: f32,
    /// Last slice index
    pub slice_end: i16,
    /// Slice timing order
    pub slice_code: u8,
    /// Units of pixdim[1..4]
    pub xyzt_units: u8,
    /// Max display intensity
    pub cal_max: f32,
    /// Min display intensity
    pub cal_min: f32,
    /// Time for one slice
    pub slice_duration: f32,
    /// Time axis shift
    pub toffset: f32,
    /// Unused in NIFTI-1
    pub glmax: i32,
    /// Unused in NIFTI-1
    pub glmin: i32,
    /// Any text you like
    pub descrip: [u8; 80],
    /// Auxiliary filename
    pub aux_file: [u8; 24],
    /// NIFTI_XFORM_* code
    pub qform_code: i16,
    /// NIFTI_XFORM_* code
    pub sform_code: i16,
    /// Quaternion b parameter
    pub quatern_b: f32,
    /// Quaternion c parameter
    pub quatern_c: f32,
    /// Quaternion d parameter
    pub quatern_d: f32,
    /// Quaternion x shift
    pub quatern_x: f32,
    /// Quaternion y shift
    pub quatern_y: f32,
    /// Quaternion z shift
    pub quatern_z: f32,
    /// 1st row affine transform
    pub srow_x: [f32; 4],
    /// 2nd row affine transform
    pub srow_y: [f32; 4],
    /// 3rd row affine transform
    pub srow_z: [f32; 4],
    /// Name or meaning of the data
    pub intent_name: [u8; 16],
    /// Magic code
    pub magic: [u8; 4],
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            sizeof_hdr: 348,
            data_type: [0; 10],
            db_name: [0; 18],
            extents: 0,
            session_error: 0,
            regular: b'r',
            dim_info: 0,
            dim: [1; 8],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [1.; 8],
            vox_offset: 352.,
            scl_slope: 1.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            glmax: 0,
            glmin: 0,
            descrip: [0; 80],
            aux_file: [0; 24],
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,
            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],
            intent_name: [0; 16],
            magic: *MAGIC_CODE_NIP1,
        }
    }
}

type B = LittleEndian;

impl NiftiHeader {
    /// Serialize the 348 header bytes in little-endian order.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_i32::<B>(self.sizeof_hdr)?;
        writer.write_all(&self.data_type)?;
        writer.write_all(&self.db_name)?;
        writer.write_i32::<B>(self.extents)?;
        writer.write_i16::<B>(self.session_error)?;
        writer.write_u8(self.regular)?;
        writer.write_u8(self.dim_info)?;
        for d in &self.dim {
            writer.write_u16::<B>(*d)?;
        }
        writer.write_f32::<B>(self.intent_p1)?;
        writer.write_f32::<B>(self.intent_p2)?;
        writer.write_f32::<B>(self.intent_p3)?;
        writer.write_i16::<B>(self.intent_code)?;
        writer.write_i16::<B>(self.datatype)?;
        writer.write_i16::<B>(self.bitpix)?;
        writer.write_i16::<B>(self.slice_start)?;
        for f in &self.pixdim {
            writer.write_f32::<B>(*f)?;
        }
        writer.write_f32::<B>(self.vox_offset)?;
        writer.write_f32::<B>(self.scl_slope)?;
        writer.write_f32::<B>(self.scl_inter)?;
        writer.write_i16::<B>(self.slice_end)?;
        writer.write_u8(self.slice_code)?;
        writer.write_u8(self.xyzt_units)?;
        writer.write_f32::<B>(self.cal_max)?;
        writer.write_f32::<B>(self.cal_min)?;
        writer.write_f32::<B>(self.slice_duration)?;
        writer.write_f32::<B>(self.toffset)?;
        writer.write_i32::<B>(self.glmax)?;
        writer.write_i32::<B>(self.glmin)?;
        writer.write_all(&self.descrip)?;
        writer.write_all(&self.aux_file)?;
        writer.write_i16::<B>(self.qform_code)?;
        writer.write_i16::<B>(self.sform_code)?;
        for f in &[
            self.quatern_b,
            self.quatern_c,
            self.quatern_d,
            self.quatern_x,
            self.quatern_y,
            self.quatern_z,
        ] {
            writer.write_f32::<B>(*f)?;
        }
        for f in self.srow_x.iter().chain(&self.srow_y).chain(&self.srow_z) {
            writer.write_f32::<B>(*f)?;
        }
        writer.write_all(&self.intent_name)?;
        writer.write_all(&self.magic)?;
        Ok(())
    }

    /// Deserialize the 348 header bytes, validating the size field and the
    /// magic code.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<NiftiHeader> {
        let mut header = NiftiHeader::default();
        header.sizeof_hdr = reader.read_i32::<B>()?;
        if header.sizeof_hdr != 348 {
            return Err(VolumeError::InvalidFormat(format!(
                "header size field is {}, expected 348",
                header.sizeof_hdr
            )));
        }
        reader.read_exact(&mut header.data_type)?;
        reader.read_exact(&mut header.db_name)?;
        header.extents = reader.read_i32::<B>()?;
        header.session_error = reader.read_i16::<B>()?;
        header.regular = reader.read_u8()?;
        header.dim_info = reader.read_u8()?;
        for d in header.dim.iter_mut() {
            *d = reader.read_u16::<B>()?;
        }
        header.intent_p1 = reader.read_f32::<B>()?;
        header.intent_p2 = reader.read_f32::<B>()?;
        header.intent_p3 = reader.read_f32::<B>()?;
        header.intent_code = reader.read_i16::<B>()?;
        header.datatype = reader.read_i16::<B>()?;
        header.bitpix = reader.read_i16::<B>()?;
        header.slice_start = reader.read_i16::<B>()?;
        for f in header.pixdim.iter_mut() {
            *f = reader.read_f32::<B>()?;
        }
        header.vox_offset = reader.read_f32::<B>()?;
        header.scl_slope = reader.read_f32::<B>()?;
        header.scl_inter = reader.read_f32::<B>()?;
        header.slice_end = reader.read_i16::<B>()?;
        header.slice_code = reader.read_u8()?;
        header.xyzt_units = reader.read_u8()?;
        header.cal_max = reader.read_f32::<B>()?;
        header.cal_min = reader.read_f32::<B>()?;
        header.slice_duration = reader.read_f32::<B>()?;
        header.toffset = reader.read_f32::<B>()?;
        header.glmax = reader.read_i32::<B>()?;
        header.glmin = reader.read_i32::<B>()?;
        reader.read_exact(&mut header.descrip)?;
        reader.read_exact(&mut header.aux_file)?;
        header.qform_code = reader.read_i16::<B>()?;
        header.sform_code = reader.read_i16::<B>()?;
        header.quatern_b = reader.read_f32::<B>()?;
        header.quatern_c = reader.read_f32::<B>()?;
        header.quatern_d = reader.read_f32::<B>()?;
        header.quatern_x = reader.read_f32::<B>()?;
        header.quatern_y = reader.read_f32::<B>()?;
        header.quatern_z = reader.read_f32::<B>()?;
        for f in header.srow_x.iter_mut() {
            *f = reader.read_f32::<B>()?;
        }
        for f in header.srow_y.iter_mut() {
            *f = reader.read_f32::<B>()?;
        }
        for f in header.srow_z.iter_mut() {
            *f = reader.read_f32::<B>()?;
        }
        reader.read_exact(&mut header.intent_name)?;
        reader.read_exact(&mut header.magic)?;
        if &header.magic != MAGIC_CODE_NIP1 && &header.magic != MAGIC_CODE_NI1 {
            return Err(VolumeError::InvalidFormat(format!(
                "unrecognized magic code {:?}",
                header.magic
            )));
        }
        Ok(header)
    }
}
