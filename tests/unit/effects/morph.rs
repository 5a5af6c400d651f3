use super::*;

fn solid(px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(6, 4, image::Rgba(px))
}

#[test]
fn zero_steps_is_empty() {
    let a = solid([0, 0, 0, 255]);
    assert!(morph(&a, &a, 0).unwrap().is_empty());
}

#[test]
fn ycbcr_round_trip_is_close() {
    for rgb in [[0, 0, 0], [255, 255, 255], [200, 30, 90], [12, 250, 7]] {
        let back = ycbcr_to_rgb(rgb_to_ycbcr(rgb));
        for c in 0..3 {
            assert!(
                (i16::from(back[c]) - i16::from(rgb[c])).abs() <= 3,
                "{rgb:?} -> {back:?}"
            );
        }
    }
}

#[test]
fn gray_maps_to_neutral_chroma() {
    assert_eq!(rgb_to_ycbcr([100, 100, 100]), [100, 128, 128]);
}

#[test]
fn identical_endpoints_yield_copies() {
    let a = solid([40, 120, 200, 255]);
    let frames = morph(&a, &a, 4).unwrap();
    assert_eq!(frames.len(), 4);
    for f in &frames {
        for (p, q) in f.pixels().zip(a.pixels()) {
            for c in 0..4 {
                assert!((i16::from(p.0[c]) - i16::from(q.0[c])).abs() <= 3);
            }
        }
    }
}

#[test]
fn gray_ramp_progresses_linearly() {
    let a = solid([0, 0, 0, 255]);
    let b = solid([200, 200, 200, 255]);
    let frames = morph(&a, &b, 3).unwrap();
    let lumas = frames
        .iter()
        .map(|f| f.get_pixel(0, 0).0[0])
        .collect::<Vec<_>>();
    assert_eq!(lumas, vec![50, 100, 150]);
}

#[test]
fn alpha_is_interpolated() {
    let a = solid([0, 0, 0, 0]);
    let b = solid([0, 0, 0, 200]);
    let frames = morph(&a, &b, 1).unwrap();
    assert_eq!(frames[0].get_pixel(2, 2).0[3], 100);
}

#[test]
fn mismatched_sizes_are_rejected() {
    let a = RgbaImage::new(2, 2);
    let b = RgbaImage::new(3, 2);
    assert!(morph(&a, &b, 2).is_err());
}
