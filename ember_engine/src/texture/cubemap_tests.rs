//! Unit tests for cubemap.rs

use crate::device::mock_device::{MockCallLog, MockDevice};
use crate::device::RenderContext;
use crate::texture::{Cubemap, ImageData, ImageFormat, TextureDesc, TextureResource};

fn make_context() -> (RenderContext, MockCallLog) {
    let device = MockDevice::new();
    let log = device.call_log();
    (RenderContext::new(Box::new(device)), log)
}

fn face(size: u32) -> ImageData {
    let format = ImageFormat::Rgb888;
    ImageData {
        width: size,
        height: size,
        format,
        pixels: vec![0x55; size as usize * size as usize * format.bytes_per_pixel()],
    }
}

fn faces(size: u32) -> [ImageData; 6] {
    std::array::from_fn(|_| face(size))
}

// ============================================================================
// BUILD TESTS
// ============================================================================

#[test]
fn test_build_uploads_six_faces_in_order() {
    let (mut ctx, log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    cubemap.build(&mut ctx, &faces(4)).unwrap();

    assert!(cubemap.is_built());
    assert_eq!(cubemap.face_size(), 4);
    assert_eq!(log.count("upload_image"), 6);

    // Face order is +X, -X, +Y, -Y, +Z, -Z
    let uploads: Vec<String> = log
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("upload_image"))
        .collect();
    for (upload, name) in uploads.iter().zip([
        "PositiveX",
        "NegativeX",
        "PositiveY",
        "NegativeY",
        "PositiveZ",
        "NegativeZ",
    ]) {
        assert!(upload.contains(name), "{} missing {}", upload, name);
    }
    cubemap.reset(&mut ctx);
}

#[test]
fn test_build_rejects_non_square_faces() {
    let (mut ctx, _log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    let mut bad = faces(4);
    for image in &mut bad {
        image.height = 2;
        image.pixels.truncate(image.expected_len());
    }
    assert!(cubemap.build(&mut ctx, &bad).is_err());
    assert!(!cubemap.is_built());
}

#[test]
fn test_build_rejects_mismatched_face_sizes() {
    let (mut ctx, _log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    let mut bad = faces(4);
    bad[3] = face(8);
    assert!(cubemap.build(&mut ctx, &bad).is_err());
}

#[test]
fn test_build_rejects_mismatched_formats() {
    let (mut ctx, _log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    let mut bad = faces(4);
    bad[5].format = ImageFormat::Lum8;
    bad[5].pixels.truncate(bad[5].expected_len());
    assert!(cubemap.build(&mut ctx, &bad).is_err());
}

// ============================================================================
// BIND / LIFECYCLE TESTS
// ============================================================================

#[test]
fn test_rebind_same_unit_is_noop() {
    let (mut ctx, log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    cubemap.build(&mut ctx, &faces(2)).unwrap();
    log.clear();

    cubemap.bind(&mut ctx, 3).unwrap();
    cubemap.bind(&mut ctx, 3).unwrap();
    assert_eq!(log.count("bind_texture"), 1);
    cubemap.reset(&mut ctx);
}

#[test]
fn test_reset_then_rebuild() {
    let (mut ctx, log) = make_context();
    let mut cubemap = Cubemap::new(TextureDesc::default());
    cubemap.build(&mut ctx, &faces(2)).unwrap();

    cubemap.reset(&mut ctx);
    assert!(!cubemap.is_built());
    assert_eq!(cubemap.face_size(), 0);
    assert_eq!(log.count("destroy_texture"), 1);

    cubemap.build(&mut ctx, &faces(8)).unwrap();
    assert_eq!(cubemap.face_size(), 8);
    cubemap.reset(&mut ctx);
}
