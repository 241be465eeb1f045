//! Write/read round-trips for the individual format writers.

use std::fs;

use approx::assert_abs_diff_eq;
use ndarray::{Array3, Axis};
use tempfile::tempdir;

use brainstack::{
    read_nifti, read_nrrd, read_tiff, read_tiff_sequence, write_nifti, write_nrrd, write_tiff,
    write_tiff_sequence, NiftiHeader, NiftiOptions, NrrdEncoding, NrrdOptions, Photometric,
    SequenceOptions, TiffOptions, VolumeError,
};

fn gradient_volume(z: usize, y: usize, x: usize) -> Array3<f32> {
    Array3::from_shape_fn((z, y, x), |(i, j, k)| {
        i as f32 * 0.5 + j as f32 * 0.25 + k as f32 * 0.125
    })
}

#[test]
fn tiff_stack_preserves_u16_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stack.tif");
    let volume = Array3::from_shape_fn((6, 5, 4), |(i, j, k)| (i * 1000 + j * 10 + k) as u16);

    write_tiff(&path, &volume, &TiffOptions::new()).unwrap();
    let back: Array3<u16> = read_tiff(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn tiff_stack_preserves_f32_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stack.tif");
    let volume = gradient_volume(3, 4, 4);

    write_tiff(&path, &volume, &TiffOptions::new()).unwrap();
    let back: Array3<f32> = read_tiff(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn tiff_sequence_reassembles_in_name_order() {
    let dir = tempdir().unwrap();
    let volume = Array3::from_shape_fn((15, 4, 3), |(i, j, k)| (i * 12 + j * 3 + k) as u8);

    write_tiff_sequence(dir.path().join("plane"), &volume, &SequenceOptions::new()).unwrap();

    let back: Array3<u8> = read_tiff_sequence(dir.path()).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn tiff_sequence_honors_suffix_and_extension() {
    let dir = tempdir().unwrap();
    let volume = Array3::<u8>::zeros((2, 2, 2));
    let options = SequenceOptions::new().suffix("_ch0").extension(".tiff");

    write_tiff_sequence(dir.path().join("plane"), &volume, &options).unwrap();

    assert!(dir.path().join("plane_0_ch0.tiff").is_file());
    assert!(dir.path().join("plane_1_ch0.tiff").is_file());
}

#[test]
fn rgb_planes_round_trip_interleaved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("color.tif");
    // Two 4x2 RGB planes, stored as 6 interleaved samples along X.
    let volume = Array3::from_shape_fn((2, 4, 6), |(i, j, k)| (i * 64 + j * 8 + k) as u8);
    let options = TiffOptions::new().photometric(Photometric::Rgb);

    write_tiff(&path, &volume, &options).unwrap();
    let back: Array3<u8> = read_tiff(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn rgb_rejects_float_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("color.tif");
    let volume = gradient_volume(1, 2, 6);
    let options = TiffOptions::new().photometric(Photometric::Rgb);

    let err = write_tiff(&path, &volume, &options).unwrap_err();
    assert!(matches!(err, VolumeError::Photometric(..)));
}

#[test]
fn nifti_preserves_data_and_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii");
    let volume = gradient_volume(4, 3, 5);

    write_nifti(&path, &volume, &NiftiOptions::new()).unwrap();

    let (header, back) = read_nifti::<_, f32>(&path).unwrap();
    assert_eq!(back, volume);
    assert_eq!(header.dim[..4], [3, 4, 3, 5]);
    assert_eq!(header.datatype, 16);
    assert_eq!(header.bitpix, 32);
    assert_eq!(header.sform_code, 1);
    // Identity affine in the sform rows.
    assert_eq!(header.srow_x, [1., 0., 0., 0.]);
    assert_eq!(header.srow_y, [0., 1., 0., 0.]);
    assert_eq!(header.srow_z, [0., 0., 1., 0.]);
}

#[test]
fn nifti_preserves_voxel_sizes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii");
    let volume = gradient_volume(3, 3, 3);
    let options = NiftiOptions::new().scale([1.5, 0.75, 0.6]);

    write_nifti(&path, &volume, &options).unwrap();

    let (header, _) = read_nifti::<_, f32>(&path).unwrap();
    assert_abs_diff_eq!(header.pixdim[1], 1.5);
    assert_abs_diff_eq!(header.pixdim[2], 0.75);
    assert_abs_diff_eq!(header.pixdim[3], 0.6);
}

#[test]
fn nifti_preserves_affine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii");
    let volume = gradient_volume(2, 2, 2);
    let affine = [
        [1., 0.1, 0.2, 10.],
        [0.3, 2., 0.4, 20.],
        [0.5, 0.6, 3., 30.],
        [0., 0., 0., 1.],
    ];
    let options = NiftiOptions::new().affine(affine);

    write_nifti(&path, &volume, &options).unwrap();

    let (header, _) = read_nifti::<_, f32>(&path).unwrap();
    assert_eq!(header.srow_x, affine[0]);
    assert_eq!(header.srow_y, affine[1]);
    assert_eq!(header.srow_z, affine[2]);
}

#[test]
fn nifti_reference_header_keeps_metadata_but_not_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii");
    let volume = gradient_volume(4, 4, 4);
    let reference = NiftiHeader {
        // Shape and type fields that must be recomputed from the data.
        dim: [3, 9, 9, 9, 1, 1, 1, 1],
        datatype: 4,
        bitpix: 16,
        cal_max: 42.,
        ..NiftiHeader::default()
    };
    let options = NiftiOptions::new().reference(reference);

    write_nifti(&path, &volume, &options).unwrap();

    let (header, back) = read_nifti::<_, f32>(&path).unwrap();
    assert_eq!(back, volume);
    assert_eq!(header.dim[..4], [3, 4, 4, 4]);
    assert_eq!(header.datatype, 16);
    assert_eq!(header.bitpix, 32);
    assert_abs_diff_eq!(header.cal_max, 42.);
}

#[test]
fn nifti_gz_is_gzip_framed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii.gz");
    let volume = gradient_volume(3, 2, 2);

    write_nifti(&path, &volume, &NiftiOptions::new()).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let (_, back) = read_nifti::<_, f32>(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn nifti_casts_stored_samples_on_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nii");
    let volume = Array3::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 12 + j * 4 + k) as u8);

    write_nifti(&path, &volume, &NiftiOptions::new()).unwrap();

    let (header, back) = read_nifti::<_, f32>(&path).unwrap();
    assert_eq!(header.datatype, 2);
    assert_abs_diff_eq!(back, volume.mapv(f32::from));
}

#[test]
fn nrrd_preserves_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nrrd");
    let volume = Array3::from_shape_fn((4, 5, 6), |(i, j, k)| (i * 30 + j * 6 + k) as i16);

    write_nrrd(&path, &volume, &NrrdOptions::new()).unwrap();
    let back: Array3<i16> = read_nrrd(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn nrrd_gzip_encoding_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.nrrd");
    let volume = gradient_volume(5, 4, 3);
    let options = NrrdOptions::new().encoding(NrrdEncoding::Gzip);

    write_nrrd(&path, &volume, &options).unwrap();

    let contents = fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&contents);
    assert!(text.contains("encoding: gzip"));

    let back: Array3<f32> = read_nrrd(&path).unwrap();
    assert_eq!(back, volume);
}

#[test]
fn empty_volume_writes_an_empty_sequence() {
    let dir = tempdir().unwrap();
    let volume = Array3::<u16>::zeros((0, 4, 4));

    write_tiff_sequence(dir.path().join("plane"), &volume, &SequenceOptions::new()).unwrap();

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(volume.len_of(Axis(0)), 0);
}
