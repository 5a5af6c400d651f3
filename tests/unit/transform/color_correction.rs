use super::*;

#[test]
fn lab_round_trip_is_close() {
    for rgb in [
        [0u8, 0, 0],
        [255, 255, 255],
        [255, 0, 0],
        [0, 128, 255],
        [37, 200, 90],
    ] {
        let back = lab_to_rgb(rgb_to_lab(rgb));
        for c in 0..3 {
            assert!(
                (i32::from(back[c]) - i32::from(rgb[c])).abs() <= 6,
                "{rgb:?} -> {back:?}"
            );
        }
    }
    assert_eq!(rgb_to_lab([255, 255, 255])[0], 255);
    assert_eq!(rgb_to_lab([0, 0, 0]), [0, 128, 128]);
}

#[test]
fn matching_against_itself_is_near_identity() {
    let img = RgbaImage::from_fn(16, 16, |x, y| image::Rgba([(x * 16) as u8, (y * 16) as u8, 90, 255]));
    let reference = ColorReference::capture(&img);
    let out = reference.apply(&img, None);
    for (a, b) in out.pixels().zip(img.pixels()) {
        for c in 0..3 {
            assert!((i32::from(a.0[c]) - i32::from(b.0[c])).abs() <= 8);
        }
        assert_eq!(a.0[3], 255);
    }
}

#[test]
fn drifted_frame_is_pulled_back_to_reference() {
    let reference = ColorReference::capture(&RgbaImage::from_pixel(8, 8, image::Rgba([200, 60, 60, 255])));
    let drifted = RgbaImage::from_pixel(8, 8, image::Rgba([90, 90, 200, 255]));
    let out = reference.apply(&drifted, None);
    let p = out.get_pixel(3, 3).0;
    assert!(p[0] > 150 && p[2] < 110, "{p:?}");
}

#[test]
fn mask_keeps_original_where_black() {
    let reference = ColorReference::capture(&RgbaImage::from_pixel(4, 4, image::Rgba([200, 60, 60, 255])));
    let drifted = RgbaImage::from_pixel(4, 4, image::Rgba([90, 90, 200, 255]));
    let mut mask = GrayImage::new(4, 4);
    mask.put_pixel(0, 0, image::Luma([255]));
    let out = reference.apply(&drifted, Some(&mask));
    assert_eq!(out.get_pixel(3, 3).0, [90, 90, 200, 255]);
    assert_ne!(out.get_pixel(0, 0).0, [90, 90, 200, 255]);
}
