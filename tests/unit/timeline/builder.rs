use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config(keyframes: &str) -> RunConfig {
    RunConfig {
        fps: 10.0,
        total_time: 1.0,
        seed: 1000,
        denoising_strength: 0.4,
        cfg_scale: 7.5,
        noise_strength: 0.1,
        keyframes: keyframes.to_owned(),
        ..RunConfig::default()
    }
}

fn build(keyframes: &str) -> Timeline {
    Timeline::from_config(&config(keyframes), &mut StdRng::seed_from_u64(1)).unwrap()
}

#[test]
fn empty_timeline_uses_run_defaults() {
    let t = build("");
    assert_eq!(t.frame_count, 10);
    assert_eq!(t.rows.len(), 11);
    assert_eq!(t.rendered_rows().len(), 10);
    for row in &t.rows {
        assert_eq!(row.zoom, 1.0);
        assert_eq!(row.x_shift, 0.0);
        assert_eq!(row.denoise, 0.4);
        assert_eq!(row.cfg_scale, 7.5);
        assert_eq!(row.noise, 0.1);
        assert_eq!(row.seed_start, 1000);
        assert_eq!(row.seed_end, None);
        assert!(!row.has_affine());
        assert!(!row.has_perspective());
        assert_eq!(row.positive_prompt, ":1.0 AND :0.0");
    }
}

#[test]
fn frame_zero_events_override_defaults() {
    let t = build("0|denoise|0.9\n0|cfg_scale|3\n");
    assert!(t.rows.iter().all(|r| r.denoise == 0.9 && r.cfg_scale == 3.0));
}

#[test]
fn transform_rates_become_per_frame_deltas() {
    let t = build("0|transform|4|20|-10|5\n");
    let row = &t.rows[3];
    assert!((row.zoom - 4f64.powf(0.1)).abs() < 1e-12);
    assert_eq!(row.x_shift, 2.0);
    assert_eq!(row.y_shift, -1.0);
    assert_eq!(row.rotation, 0.5);
    assert!(row.has_affine());
}

#[test]
fn scalar_columns_interpolate_between_events() {
    let t = build("0|denoise|0.2\n0.5|denoise|0.7\n");
    assert!((t.rows[1].denoise - 0.3).abs() < 1e-12);
    assert_eq!(t.rows[5].denoise, 0.7);
    assert_eq!(t.rows[10].denoise, 0.7);
}

#[test]
fn perspective_fills_all_eight_columns() {
    let t = build("0.5|perspective|10|0|0|0|0|0|0|20|40\n");
    assert!((t.rows[1].perspective[0] - 2.0).abs() < 1e-12);
    assert!((t.rows[1].perspective[7] - 4.0).abs() < 1e-12);
    assert_eq!(t.rows[7].unsharpen, 40.0);
    assert_eq!(t.rows[0].perspective, [0.0; 8]);
    assert_eq!(t.rows[9].perspective_corners()[3], (0.0, 20.0));
}

#[test]
fn template_prefixes_each_term() {
    let t = build("0|template|masterpiece|lowres\n0|prompt|cat|blurry\n");
    assert_eq!(t.rows[0].positive_prompt, "masterpiece, cat:1.0 AND masterpiece, cat:0.0");
    assert_eq!(t.rows[0].negative_prompt, "lowres, blurry:1.0 AND lowres, blurry:0.0");
}

#[test]
fn without_interpolation_only_first_prompt_is_used() {
    let mut cfg = config("0|prompt|cat|blurry\n0.5|prompt|dog|\n");
    cfg.prompt_interpolation = false;
    let t = Timeline::from_config(&cfg, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(t.rows[2].positive_prompt, "cat");
    assert_eq!(t.rows[7].positive_prompt, "dog");
}

#[test]
fn persists_json() {
    let dir = std::path::PathBuf::from("target/timeline_persists_json");
    std::fs::create_dir_all(&dir).unwrap();
    let t = build("0|prompt|cat|blurry\n");
    let path = t.persist(&dir).unwrap();
    let back: Timeline = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(back, t);
}
