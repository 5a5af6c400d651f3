use super::*;

#[test]
fn frame_count_rounds_up() {
    let fps = Fps::new(10.0).unwrap();
    assert_eq!(fps.frame_count(1.0), 10);
    assert_eq!(fps.frame_count(1.01), 11);
    assert_eq!(Fps::new(12.5).unwrap().frame_count(2.0), 25);
    assert_eq!(fps.frame_count(0.0), 0);
}

#[test]
fn keyframe_times_truncate_to_frames() {
    let fps = Fps::new(10.0).unwrap();
    assert_eq!(fps.secs_to_frame(0.0), Some(FrameIndex(0)));
    assert_eq!(fps.secs_to_frame(1.0), Some(FrameIndex(10)));
    assert_eq!(fps.secs_to_frame(0.19), Some(FrameIndex(1)));
    assert_eq!(fps.secs_to_frame(-0.5), None);
    assert_eq!(fps.secs_to_frame(f64::NAN), None);
}

#[test]
fn fps_rejects_non_positive() {
    assert!(Fps::new(0.0).is_err());
    assert!(Fps::new(-3.0).is_err());
    assert!(Fps::new(f64::INFINITY).is_err());
}

#[test]
fn preview_stride_is_at_least_one() {
    assert_eq!(Fps::new(0.5).unwrap().preview_stride(), 1);
    assert_eq!(Fps::new(15.9).unwrap().preview_stride(), 15);
}

#[test]
fn frame_names_are_zero_padded() {
    assert_eq!(frame_file_name(0), "frame_00000.png");
    assert_eq!(frame_file_name(1234), "frame_01234.png");
    assert_eq!(debug_file_name(7, 'a'), "frame_00007_a.png");
}
