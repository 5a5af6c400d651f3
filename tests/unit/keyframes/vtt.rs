use super::*;

fn fps10() -> Fps {
    Fps::new(10.0).unwrap()
}

#[test]
fn cues_become_prompts_at_their_start_frame() {
    let text = "WEBVTT\n\n1\n00:00.000 --> 00:01.000\n- a cat | blurry\n\n2\n00:00:01.510 --> 00:00:03.000\nsome caption\ndog, running | lowres\n";
    let cues = parse_vtt(text, fps10(), 10.0).unwrap();
    assert_eq!(
        cues,
        vec![
            PromptCue {
                frame: FrameIndex(0),
                positive: "a cat".to_owned(),
                negative: "blurry".to_owned(),
            },
            PromptCue {
                frame: FrameIndex(15),
                positive: "dog, running".to_owned(),
                negative: "lowres".to_owned(),
            },
        ]
    );
}

#[test]
fn only_first_piped_line_of_a_cue_counts() {
    let text = "WEBVTT\n00:01.000 --> 00:02.000\na | b\nc | d\n";
    let cues = parse_vtt(text, fps10(), 10.0).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].positive, "a");
}

#[test]
fn cues_past_the_end_and_malformed_timings_are_dropped() {
    let text = "WEBVTT\n1:2:3:4 --> x\nbad | cue\n00:05.000 --> 00:06.000\nlate | cue\n00:00.500 --> 1\nok | cue\n";
    let cues = parse_vtt(text, fps10(), 2.0).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].frame, FrameIndex(5));
    assert_eq!(cues[0].positive, "ok");
}

#[test]
fn missing_header_is_a_keyframe_error_and_missing_file_an_asset_error() {
    let err = parse_vtt("00:00.000 --> 00:01.000\na | b\n", fps10(), 1.0).unwrap_err();
    assert!(matches!(err, AnimatorError::Keyframe(_)));
    assert!(!err.is_missing_asset());
    let err = read_vtt(Path::new("target/does/not/exist.vtt"), fps10(), 1.0).unwrap_err();
    assert!(err.to_string().starts_with("asset error:"));
}
