use super::*;

#[test]
fn linear_fill_interpolates_and_holds_edges() {
    let col = [None, Some(1.0), None, None, Some(4.0), None];
    assert_eq!(fill_linear(&col, 9.0), vec![1.0, 1.0, 2.0, 3.0, 4.0, 4.0]);
}

#[test]
fn linear_fill_uses_fallback_only_when_empty() {
    assert_eq!(fill_linear(&[None, None], 0.5), vec![0.5, 0.5]);
    assert_eq!(fill_linear(&[None, Some(2.0)], 0.5), vec![2.0, 2.0]);
    assert!(fill_linear(&[], 1.0).is_empty());
}

#[test]
fn polynomial_fill_is_linear_below_four_points() {
    let col = [Some(0.0), None, Some(2.0), None, Some(0.0)];
    assert_eq!(
        fill_polynomial_then_linear(&col, 0.0),
        fill_linear(&col, 0.0)
    );
}

#[test]
fn polynomial_fill_reproduces_a_parabola() {
    // y = x^2 sampled at 0, 2, 4, 6
    let mut col = vec![None; 8];
    for x in [0usize, 2, 4, 6] {
        col[x] = Some((x * x) as f64);
    }
    let out = fill_polynomial_then_linear(&col, 0.0);
    for x in 0..=6 {
        assert!((out[x] - (x * x) as f64).abs() < 1e-9, "x={x} -> {}", out[x]);
    }
    // past the last point the value is held
    assert_eq!(out[7], 36.0);
}

#[test]
fn forward_fill_carries_and_backfills_leading_gap() {
    let col = [None, Some("a"), None, Some("b"), None];
    assert_eq!(
        forward_fill(&col),
        vec![Some("a"), Some("a"), Some("a"), Some("b"), Some("b")]
    );
    assert_eq!(forward_fill::<u8>(&[None, None]), vec![None, None]);
}

#[test]
fn axis_keeps_dense_prefix_and_sorted_unique_anchors() {
    let axis = FrameAxis::with_anchors(3, [90, 2, 40, 90]);
    assert_eq!(axis.frames(), &[0, 1, 2, 3, 40, 90]);
    assert_eq!(axis.row_of(40), Some(4));
    assert_eq!(axis.row_of(39), None);
    assert_eq!(axis.frame(5), 90);
}

#[test]
fn fill_on_axis_interpolates_by_frame_position() {
    let axis = FrameAxis::with_anchors(2, [10]);
    let col = [Some(0.0), None, None, Some(1.0)];
    assert_eq!(fill_linear_on(&axis, &col, 0.0), vec![0.0, 0.1, 0.2, 1.0]);
    assert_eq!(fill_linear(&col, 0.0)[1], 1.0 / 3.0);
}

#[test]
fn polynomial_fill_on_axis_uses_frame_positions() {
    // y = x^2 sampled at frames 0, 1, 2 and 6
    let axis = FrameAxis::with_anchors(4, [6]);
    let col = [Some(0.0), Some(1.0), Some(4.0), None, None, Some(36.0)];
    let out = fill_polynomial_on(&axis, &col, 0.0);
    assert!((out[3] - 9.0).abs() < 1e-9);
    assert!((out[4] - 16.0).abs() < 1e-9);
}
