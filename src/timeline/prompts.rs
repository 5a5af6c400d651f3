use crate::timeline::column::{FrameAxis, fill_linear_on, forward_fill};

/// A positive/negative prompt pair anchored at a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptKey {
    pub row: usize,
    pub positive: String,
    pub negative: String,
}

/// Dense prompt columns: the pair blended from (`pos1`/`neg1`) and the pair blended
/// towards (`pos2`/`neg2`), with `weight` the share of the first pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptColumns {
    pub pos1: Vec<String>,
    pub neg1: Vec<String>,
    pub pos2: Vec<String>,
    pub neg2: Vec<String>,
    pub weight: Vec<f64>,
}

/// Resolve prompt keys into per-row prompt columns over `axis`.
///
/// A key's row must be preceded by the row of the frame before it (`FrameAxis` anchors
/// include both), so the previous window ends at weight 0 on the right frame.
pub fn build_prompt_columns(axis: &FrameAxis, keys: &[PromptKey]) -> PromptColumns {
    let rows = axis.len();
    let mut keys = keys.iter().filter(|k| k.row < rows).collect::<Vec<_>>();
    keys.sort_by_key(|k| k.row);
    // Last prompt on a row wins.
    let mut deduped: Vec<&PromptKey> = Vec::with_capacity(keys.len());
    for k in keys {
        match deduped.last_mut() {
            Some(prev) if prev.row == k.row => *prev = k,
            _ => deduped.push(k),
        }
    }

    if deduped.len() <= 1 {
        let (pos, neg) = deduped
            .first()
            .map(|k| (k.positive.clone(), k.negative.clone()))
            .unwrap_or_default();
        return PromptColumns {
            pos1: vec![pos.clone(); rows],
            neg1: vec![neg.clone(); rows],
            pos2: vec![pos; rows],
            neg2: vec![neg; rows],
            weight: vec![1.0; rows],
        };
    }

    let mut pairs = vec![None; rows];
    let mut weight = vec![None; rows];
    for (x, &key) in deduped.iter().enumerate() {
        let next = deduped.get(x + 1).copied().unwrap_or(key);
        pairs[key.row] = Some((
            key.positive.clone(),
            key.negative.clone(),
            next.positive.clone(),
            next.negative.clone(),
        ));
        weight[key.row] = Some(1.0);
        if x > 0 {
            weight[key.row - 1] = Some(0.0);
        }
    }
    if let Some(last) = weight.last_mut() {
        *last = Some(0.0);
    }

    let mut out = PromptColumns {
        pos1: Vec::with_capacity(rows),
        neg1: Vec::with_capacity(rows),
        pos2: Vec::with_capacity(rows),
        neg2: Vec::with_capacity(rows),
        weight: fill_linear_on(axis, &weight, 1.0),
    };
    for (p1, n1, p2, n2) in forward_fill(&pairs).into_iter().flatten() {
        out.pos1.push(p1);
        out.neg1.push(n1);
        out.pos2.push(p2);
        out.neg2.push(n2);
    }
    out
}

/// Compose the prompt text sent to the backend for one row.
///
/// With interpolation the two pairs are combined as a weighted `A:w AND B:1-w` expression;
/// without it only the first prompt is used. A non-empty template is prefixed to each term.
pub fn compose_prompt(
    template: &str,
    first: &str,
    second: &str,
    weight: f64,
    interpolate: bool,
) -> String {
    let term = |p: &str| {
        if template.is_empty() {
            p.to_owned()
        } else {
            format!("{template}, {p}")
        }
    };
    if interpolate {
        format!(
            "{}:{:?} AND {}:{:?}",
            term(first),
            weight,
            term(second),
            1.0 - weight
        )
    } else {
        term(first)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/prompts.rs"]
mod tests;
