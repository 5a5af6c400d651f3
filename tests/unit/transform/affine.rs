use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn split_image(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    })
}

fn is_red(p: [u8; 4]) -> bool {
    p[0] > 200 && p[2] < 50
}

fn is_blue(p: [u8; 4]) -> bool {
    p[2] > 200 && p[0] < 50
}

#[test]
fn identity_transform_keeps_content() {
    let img = split_image(32, 16);
    let out = transform_frame(&img, 0.0, 0, 0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(out.dimensions(), (32, 16));
    assert!(is_red(out.get_pixel(4, 8).0));
    assert!(is_blue(out.get_pixel(28, 8).0));
}

#[test]
fn shift_moves_content_right() {
    let img = split_image(32, 16);
    let out = transform_frame(&img, 0.0, 8, 0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    // Pixel 20 now shows what was at 12 (red half).
    assert!(is_red(out.get_pixel(20, 8).0));
    assert_eq!(out.dimensions(), (32, 16));
}

#[test]
fn half_turn_swaps_halves() {
    let img = split_image(32, 16);
    let out = transform_frame(&img, 180.0, 0, 0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    assert!(is_blue(out.get_pixel(4, 8).0));
    assert!(is_red(out.get_pixel(28, 8).0));
}

#[test]
fn zoom_out_reveals_background_at_edges() {
    let img = RgbaImage::from_pixel(40, 40, image::Rgba([255, 255, 255, 255]));
    let out = transform_frame(&img, 0.0, 0, 0, 0.5, &mut StdRng::seed_from_u64(9)).unwrap();
    assert!(out.get_pixel(20, 20).0[..3].iter().all(|&c| c > 250));
    assert!(out.pixels().all(|p| p.0[3] == 255));
}
