use super::*;

#[test]
fn homography_maps_the_given_corners() {
    let from = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
    let to = [(1.0, 2.0), (12.0, 0.0), (9.0, 11.0), (-1.0, 8.0)];
    let hm = Homography::from_points(from, to).unwrap();
    for (f, t) in from.iter().zip(to.iter()) {
        let (u, v) = hm.apply(f.0, f.1).unwrap();
        assert!((u - t.0).abs() < 1e-9 && (v - t.1).abs() < 1e-9);
    }
}

#[test]
fn degenerate_corners_are_an_error() {
    let from = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
    let collapsed = [(0.0, 0.0); 4];
    assert!(Homography::from_points(from, collapsed).is_err());
}

#[test]
fn all_zero_deltas_skip_the_warp() {
    let img = RgbaImage::from_fn(8, 8, |x, y| image::Rgba([x as u8 * 30, y as u8 * 30, 0, 255]));
    let out = perspective_warp(&img, [(0.0, 0.0); 4], 100.0).unwrap();
    assert_eq!(out, img);
}

#[test]
fn pulling_a_corner_inward_fills_with_black() {
    let img = RgbaImage::from_pixel(20, 20, image::Rgba([200, 200, 200, 255]));
    // Sampling from beyond the top-left corner leaves the output's top-left uncovered.
    let out = perspective_warp(&img, [(-10.0, -10.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)], 0.0)
        .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(out.get_pixel(15, 15).0, [200, 200, 200, 255]);
}

#[test]
fn unsharp_mask_increases_edge_contrast() {
    let img = RgbaImage::from_fn(20, 4, |x, _| {
        if x < 10 {
            image::Rgba([100, 100, 100, 255])
        } else {
            image::Rgba([150, 150, 150, 255])
        }
    });
    let out = unsharp_mask(&img, 100.0).unwrap();
    assert!(out.get_pixel(9, 1).0[0] < 100);
    assert!(out.get_pixel(10, 1).0[0] > 150);
    // flat regions far from the edge are untouched
    assert_eq!(out.get_pixel(0, 1).0[0], 100);
    assert_eq!(unsharp_mask(&img, 0.0).unwrap(), img);
}
