use super::*;

#[test]
fn interrupt_is_shared_between_clones() {
    let flag = InterruptFlag::new();
    let other = flag.clone();
    assert!(!flag.is_requested());
    other.request();
    assert!(flag.is_requested());
}

#[test]
fn fractional_shifts_accumulate() {
    let mut st = RunState::default();
    let applied = (0..4).map(|_| st.take_shift(0.3, -0.6)).collect::<Vec<_>>();
    assert_eq!(applied, vec![(0, 0), (0, -1), (0, 0), (1, -1)]);
}

#[test]
fn whole_shifts_apply_immediately() {
    let mut st = RunState::default();
    assert_eq!(st.take_shift(2.0, -3.0), (2, -3));
    assert_eq!(st.take_shift(0.0, 0.0), (0, 0));
}

#[test]
fn frame_indices_are_sequential() {
    let mut st = RunState::default();
    assert_eq!(st.next_frame_index(), 0);
    assert_eq!(st.next_frame_index(), 1);
    assert_eq!(st.frame_save, 2);
    assert!(st.color_correction);
}
