use super::*;
use crate::timeline::column::FrameAxis;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn single_seed_is_constant_without_subseed() {
    let cols = build_seed_columns(&FrameAxis::dense(11), &[], 1234, true, &mut rng());
    assert!(cols.start.iter().all(|&s| s == 1234));
    assert!(cols.end.iter().all(Option::is_none));
    assert!(cols.strength.iter().all(|&s| s == 0.0));
}

#[test]
fn random_base_seed_is_drawn_once() {
    let cols = build_seed_columns(&FrameAxis::dense(5), &[], -1, false, &mut rng());
    assert!(cols.start[0] < RANDOM_SEED_BOUND);
    assert!(cols.start.iter().all(|&s| s == cols.start[0]));

    let again = build_seed_columns(&FrameAxis::dense(5), &[], -1, false, &mut rng());
    assert_eq!(cols, again);
}

#[test]
fn plain_mode_interpolates_and_truncates() {
    let cols = build_seed_columns(
        &FrameAxis::dense(11),
        &[(4, SeedValue::Fixed(20))],
        10,
        false,
        &mut rng(),
    );
    assert_eq!(
        cols.start,
        vec![10, 12, 15, 17, 20, 20, 20, 20, 20, 20, 20]
    );
    assert!(cols.end.iter().all(Option::is_none));
}

#[test]
fn travel_mode_ramps_each_segment() {
    // checkpoints at rows 0 (base), 4 and 8 over 11 rows
    let cols = build_seed_columns(
        &FrameAxis::dense(11),
        &[(4, SeedValue::Fixed(200)), (8, SeedValue::Fixed(300))],
        100,
        true,
        &mut rng(),
    );
    assert_eq!(&cols.start[0..4], &[100; 4]);
    assert_eq!(&cols.start[4..], &[200; 7]);
    assert_eq!(&cols.end[0..4], &[Some(200); 4]);
    assert_eq!(&cols.end[4..], &[Some(300); 7]);

    assert_eq!(cols.strength[0], 0.0);
    assert_eq!(cols.strength[3], 1.0);
    assert_eq!(cols.strength[4], 0.0);
    assert_eq!(cols.strength[7], 1.0);
    assert_eq!(cols.strength[10], 1.0);
    assert!((cols.strength[1] - 1.0 / 3.0).abs() < 1e-12);
    assert!(cols.strength[4..=7].windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn checkpoint_at_row_zero_replaces_base_seed() {
    let cols = build_seed_columns(
        &FrameAxis::dense(3),
        &[(0, SeedValue::Fixed(5)), (0, SeedValue::Fixed(6))],
        100,
        true,
        &mut rng(),
    );
    assert!(cols.start.iter().all(|&s| s == 6));
}
