use super::*;
use crate::timeline::column::FrameAxis;

fn key(row: usize, pos: &str, neg: &str) -> PromptKey {
    PromptKey {
        row,
        positive: pos.to_owned(),
        negative: neg.to_owned(),
    }
}

#[test]
fn no_prompts_is_empty_at_full_weight() {
    let cols = build_prompt_columns(&FrameAxis::dense(3), &[]);
    assert_eq!(cols.pos1, vec![String::new(); 3]);
    assert_eq!(cols.weight, vec![1.0; 3]);
}

#[test]
fn single_prompt_is_constant() {
    let cols = build_prompt_columns(&FrameAxis::dense(4), &[key(2, "cat", "blurry")]);
    assert!(cols.pos1.iter().all(|p| p == "cat"));
    assert!(cols.pos2.iter().all(|p| p == "cat"));
    assert!(cols.neg1.iter().all(|p| p == "blurry"));
    assert_eq!(cols.weight, vec![1.0; 4]);
}

#[test]
fn two_prompts_decay_across_the_window() {
    let cols = build_prompt_columns(
        &FrameAxis::dense(11),
        &[key(5, "dog", "ugly"), key(0, "cat", "blurry")],
    );
    assert_eq!(cols.weight[0], 1.0);
    assert_eq!(cols.weight[4], 0.0);
    assert_eq!(cols.weight[5], 1.0);
    assert_eq!(cols.weight[10], 0.0);
    assert!(cols.weight[0..5].windows(2).all(|w| w[0] >= w[1]));

    assert_eq!(&cols.pos1[0..5], &["cat"; 5]);
    assert_eq!(&cols.pos2[0..5], &["dog"; 5]);
    assert_eq!(&cols.pos1[5..], &["dog"; 6]);
    assert_eq!(&cols.pos2[5..], &["dog"; 6]);
    assert_eq!(cols.neg2[0], "ugly");
}

#[test]
fn rows_before_first_prompt_take_its_values() {
    let cols = build_prompt_columns(&FrameAxis::dense(10), &[key(3, "a", ""), key(6, "b", "")]);
    assert_eq!(&cols.pos1[0..3], &["a"; 3]);
    assert_eq!(&cols.weight[0..4], &[1.0; 4]);
}

#[test]
fn last_prompt_on_a_row_wins() {
    let cols = build_prompt_columns(
        &FrameAxis::dense(6),
        &[key(0, "first", ""), key(0, "second", ""), key(4, "third", "")],
    );
    assert_eq!(cols.pos1[0], "second");
    assert_eq!(cols.pos2[0], "third");
}

#[test]
fn composition_with_and_without_interpolation() {
    assert_eq!(
        compose_prompt("", "cat", "dog", 1.0, true),
        "cat:1.0 AND dog:0.0"
    );
    assert_eq!(
        compose_prompt("best quality", "cat", "dog", 0.25, true),
        "best quality, cat:0.25 AND best quality, dog:0.75"
    );
    assert_eq!(compose_prompt("", "cat", "dog", 0.25, false), "cat");
    assert_eq!(
        compose_prompt("best quality", "cat", "dog", 0.25, false),
        "best quality, cat"
    );
}
