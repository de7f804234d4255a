use std::io::Cursor;
use std::path::PathBuf;

use super::*;

fn png_bytes(rgba: Vec<u8>, w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(vec![100u8, 50u8, 200u8, 128u8], 1, 1);
    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn overlay_load_reads_file_and_keeps_bounds() {
    let dir = PathBuf::from("target").join("unit_overlay");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("compass.png");
    std::fs::write(&path, png_bytes(vec![255u8; 2 * 2 * 4], 2, 2)).unwrap();

    let bounds = GeoBounds::new(-30.0, -20.0, 40.0, 50.0).unwrap();
    let overlay = ImageOverlay::load(&path, bounds, 0.8).unwrap();
    assert_eq!(overlay.name, "compass");
    assert_eq!(overlay.bounds, bounds);
    assert_eq!(overlay.image.width, 2);
}

#[test]
fn overlay_missing_file_is_load_error() {
    let bounds = GeoBounds::new(0.0, 1.0, 0.0, 1.0).unwrap();
    let err = ImageOverlay::load(Path::new("target/nope/ship.png"), bounds, 1.0).unwrap_err();
    assert_eq!(err.stage(), "load");
}

#[test]
fn overlay_rejects_bad_opacity() {
    let bounds = GeoBounds::new(0.0, 1.0, 0.0, 1.0).unwrap();
    let err = ImageOverlay::load(Path::new("whatever.png"), bounds, 1.5).unwrap_err();
    assert_eq!(err.stage(), "validation");
}
