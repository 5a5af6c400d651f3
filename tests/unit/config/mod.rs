use super::*;

#[test]
fn defaults_validate() {
    RunConfig::default().validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: RunConfig =
        serde_json::from_str(r#"{ "fps": 10, "total_time": 1.0, "loopback": false }"#).unwrap();
    assert_eq!(cfg.fps, 10.0);
    assert!(!cfg.loopback);
    assert_eq!(cfg.steps, 20);
    assert_eq!(cfg.frame_count().unwrap(), 10);
}

#[test]
fn validation_rejects_bad_values() {
    let bad = [
        RunConfig {
            fps: 0.0,
            ..RunConfig::default()
        },
        RunConfig {
            total_time: f64::NAN,
            ..RunConfig::default()
        },
        RunConfig {
            width: 0,
            ..RunConfig::default()
        },
        RunConfig {
            steps: 0,
            ..RunConfig::default()
        },
        RunConfig {
            seed: -7,
            ..RunConfig::default()
        },
        RunConfig {
            mask: Some("mask.png".into()),
            ..RunConfig::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().starts_with("validation error:"), "{err}");
    }
}

#[test]
fn settings_round_trip_through_disk() {
    let dir = std::path::PathBuf::from("target/config_settings_round_trip");
    let _ = std::fs::remove_dir_all(&dir);
    let cfg = RunConfig {
        keyframes: "0|prompt|cat|blurry".to_owned(),
        ..RunConfig::default()
    };
    let path = cfg.save_settings(&dir).unwrap();
    let back = RunConfig::from_path(&path).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn empty_mask_is_dropped_and_image_is_flattened() {
    let img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 0]));
    let prepared = InitialImage::prepare(img, Some(GrayImage::new(4, 4)));
    assert!(prepared.mask.is_none());
    assert!(prepared.image.pixels().all(|p| p.0 == [10, 20, 30, 255]));
}

#[test]
fn transparent_pixels_join_the_mask() {
    let mut img = RgbaImage::from_pixel(2, 1, image::Rgba([0, 0, 0, 255]));
    img.put_pixel(1, 0, image::Rgba([0, 0, 0, 100]));
    let mut mask = GrayImage::new(2, 1);
    mask.put_pixel(0, 0, image::Luma([40]));
    let prepared = InitialImage::prepare(img, Some(mask));
    let m = prepared.mask.unwrap();
    assert_eq!(m.get_pixel(0, 0).0[0], 40);
    assert_eq!(m.get_pixel(1, 0).0[0], 255);
}
