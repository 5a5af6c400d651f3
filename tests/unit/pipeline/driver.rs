use super::*;
use crate::backend::{StubBackend, StubCall};
use rand::rngs::StdRng;

fn config(name: &str) -> RunConfig {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    RunConfig {
        width: 32,
        height: 24,
        fps: 4.0,
        total_time: 1.0,
        seed: 11,
        output_dir: dir,
        ..RunConfig::default()
    }
}

fn run_stub(cfg: &RunConfig, backend: &mut StubBackend) -> RunReport {
    run_with_rng(
        cfg,
        backend,
        &InterruptFlag::new(),
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap()
}

fn conditioned_flags(backend: &StubBackend) -> Vec<bool> {
    backend
        .calls()
        .iter()
        .filter_map(|c| match c {
            StubCall::Generate { conditioned, .. } => Some(*conditioned),
            StubCall::LoadCheckpoint(_) => None,
        })
        .collect()
}

#[test]
fn loopback_bootstraps_then_feeds_back() {
    let cfg = config("driver_loopback_calls");
    let mut backend = StubBackend::default();
    let report = run_stub(&cfg, &mut backend);

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.frame_count, 4);
    assert_eq!(report.frames_rendered, 4);
    // One unconditioned bootstrap generation, then one conditioned call per frame.
    assert_eq!(conditioned_flags(&backend), vec![false, true, true, true, true]);
    for i in 0..4 {
        assert!(cfg.output_dir.join(frame_file_name(i)).exists());
    }
}

#[test]
fn sequential_never_conditions() {
    let cfg = RunConfig {
        loopback: false,
        ..config("driver_sequential_calls")
    };
    let mut backend = StubBackend::default();
    run_stub(&cfg, &mut backend);
    assert_eq!(conditioned_flags(&backend), vec![false; 4]);
}

#[test]
fn smoothing_frames_sort_before_their_frame() {
    let cfg = RunConfig {
        smoothing: 2,
        loopback: false,
        ..config("driver_smoothing_numbering")
    };
    let mut backend = StubBackend::default();
    let report = run_stub(&cfg, &mut backend);
    // 4 frames plus 2 intermediates in each of the 3 gaps.
    assert_eq!(report.files_written.len(), 4 + 3 * 2);
    let last = cfg.output_dir.join(frame_file_name(9));
    assert_eq!(report.files_written.last(), Some(&last));
    assert!(!cfg.output_dir.join(frame_file_name(10)).exists());
}

#[test]
fn film_interpolation_skips_morphing() {
    let cfg = RunConfig {
        smoothing: 2,
        film_interpolation: true,
        loopback: false,
        ..config("driver_film_interpolation")
    };
    let mut backend = StubBackend::default();
    let report = run_stub(&cfg, &mut backend);
    assert_eq!(report.files_written.len(), 4);
}

#[test]
fn debug_writes_conditioning_and_raw_output() {
    let cfg = RunConfig {
        keyframes: "0|debug|true".to_owned(),
        ..config("driver_debug_files")
    };
    let mut backend = StubBackend::default();
    run_stub(&cfg, &mut backend);
    for tag in ['a', 'b'] {
        assert!(cfg.output_dir.join(debug_file_name(0, tag)).exists());
        assert!(cfg.output_dir.join(debug_file_name(3, tag)).exists());
    }
    assert!(cfg.output_dir.join(frame_file_name(3)).exists());
}

#[test]
fn previews_follow_whole_second_stride() {
    let cfg = RunConfig {
        total_time: 2.0,
        loopback: false,
        ..config("driver_previews")
    };
    let mut backend = StubBackend::default();
    let report = run_stub(&cfg, &mut backend);
    let frames = report.previews.iter().map(|(f, _)| f.0).collect::<Vec<_>>();
    assert_eq!(frames, vec![0, 4]);
}

#[test]
fn initial_image_replaces_bootstrap_generation() {
    let mut cfg = config("driver_initial_image");
    std::fs::create_dir_all(&cfg.output_dir).unwrap();
    let init_path = cfg.output_dir.join("init.png");
    RgbaImage::from_pixel(16, 16, image::Rgba([10, 200, 10, 255]))
        .save(&init_path)
        .unwrap();
    cfg.initial_image = Some(init_path);
    let mut backend = StubBackend::default();
    run_stub(&cfg, &mut backend);
    assert_eq!(conditioned_flags(&backend), vec![true; 4]);
}

#[test]
fn fit_initial_resizes_image_and_mask() {
    let initial = InitialImage {
        image: RgbaImage::new(8, 8),
        mask: Some(GrayImage::new(8, 8)),
    };
    let fitted = fit_initial(initial, Canvas::new(4, 6).unwrap());
    assert_eq!(fitted.image.dimensions(), (4, 6));
    assert_eq!(fitted.mask.map(|m| m.dimensions()), Some((4, 6)));
}
