use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimatorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AnimatorError::keyframe("x")
            .to_string()
            .contains("keyframe error:")
    );
    assert!(AnimatorError::asset("x").to_string().contains("asset error:"));
    assert!(
        AnimatorError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        AnimatorError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(
        AnimatorError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn unknown_checkpoint_names_the_model() {
    let err = AnimatorError::unknown_checkpoint("dreamlike-v2");
    assert_eq!(err.to_string(), "unknown checkpoint: dreamlike-v2");
    assert!(!err.is_missing_asset());
}

#[test]
fn only_asset_errors_count_as_missing_assets() {
    assert!(AnimatorError::asset("props/cat.png").is_missing_asset());
    assert!(!AnimatorError::keyframe("bad header").is_missing_asset());
    assert!(!AnimatorError::validation("fps").is_missing_asset());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimatorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
