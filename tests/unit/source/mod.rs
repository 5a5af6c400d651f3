use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_frames(dir: &std::path::Path, colors: &[[u8; 4]], size: u32) -> Vec<PathBuf> {
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let p = dir.join(format!("src_{i:03}.png"));
            RgbaImage::from_pixel(size, size, image::Rgba(*c))
                .save(&p)
                .unwrap();
            p
        })
        .collect()
}

#[test]
fn image_sequence_holds_last_frame() {
    let dir = scratch("source_hold_last");
    let paths = write_frames(&dir, &[[255, 0, 0, 255], [0, 255, 0, 255]], 8);
    let canvas = Canvas::new(8, 8).unwrap();
    let mut src = FrameSource::open(&SourceSpec::Images(paths), canvas).unwrap();
    assert_eq!(src.len_hint(), Some(2));

    assert_eq!(src.frame(FrameIndex(0)).unwrap().get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(src.frame(FrameIndex(1)).unwrap().get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(src.exhausted_at(), None);
    for f in 2..5 {
        assert_eq!(src.frame(FrameIndex(f)).unwrap().get_pixel(4, 4).0, [0, 255, 0, 255]);
    }
    assert_eq!(src.exhausted_at(), Some(FrameIndex(2)));
}

#[test]
fn frames_are_resized_to_canvas() {
    let dir = scratch("source_resize");
    let paths = write_frames(&dir, &[[9, 9, 9, 255]], 4);
    let canvas = Canvas::new(10, 6).unwrap();
    let mut src = FrameSource::open(&SourceSpec::Images(paths), canvas).unwrap();
    assert_eq!(src.frame(FrameIndex(0)).unwrap().dimensions(), (10, 6));
}

#[test]
fn empty_image_list_is_rejected() {
    let canvas = Canvas::new(4, 4).unwrap();
    let err = FrameSource::open(&SourceSpec::Images(Vec::new()), canvas).unwrap_err();
    assert!(matches!(err, AnimatorError::Validation(_)));
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn video_requires_feature() {
    let canvas = Canvas::new(4, 4).unwrap();
    let err = FrameSource::open(&SourceSpec::Video("clip.mp4".into()), canvas).unwrap_err();
    assert!(err.to_string().contains("media-ffmpeg"));
}
