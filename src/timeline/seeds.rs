use std::collections::BTreeMap;

use rand::Rng;

use crate::keyframes::SeedValue;
use crate::timeline::column::{FrameAxis, fill_linear_on, forward_fill};

/// Exclusive upper bound for randomly drawn seeds.
pub const RANDOM_SEED_BOUND: u64 = 4_294_967_294;

/// Dense seed columns.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedColumns {
    pub start: Vec<u64>,
    /// Sub-seed; `None` disables seed blending for the row.
    pub end: Vec<Option<u64>>,
    pub strength: Vec<f64>,
}

pub fn resolve_seed(value: SeedValue, rng: &mut impl Rng) -> u64 {
    match value {
        SeedValue::Fixed(s) => s,
        SeedValue::Random => rng.gen_range(0..RANDOM_SEED_BOUND),
    }
}

/// Resolve seed checkpoints into per-row seed columns over `axis`.
///
/// `checkpoints` are `(row, seed)` in event order; a later checkpoint on the same row
/// replaces an earlier one. `base_seed` (`-1` = random) is used at row 0 unless a checkpoint
/// sits there.
pub fn build_seed_columns(
    axis: &FrameAxis,
    checkpoints: &[(usize, SeedValue)],
    base_seed: i64,
    seed_travel: bool,
    rng: &mut impl Rng,
) -> SeedColumns {
    let rows = axis.len();
    let mut by_row = BTreeMap::<usize, SeedValue>::new();
    for &(row, value) in checkpoints.iter().filter(|(row, _)| *row < rows.max(1)) {
        by_row.insert(row, value);
    }
    let mut seeds = by_row
        .into_iter()
        .map(|(row, value)| (row, resolve_seed(value, rng)))
        .collect::<BTreeMap<usize, u64>>();
    seeds.entry(0).or_insert_with(|| {
        let base = u64::try_from(base_seed).map_or(SeedValue::Random, SeedValue::Fixed);
        resolve_seed(base, rng)
    });
    let points = seeds.into_iter().collect::<Vec<_>>();

    if points.len() == 1 || rows == 0 {
        let seed = points[0].1;
        return SeedColumns {
            start: vec![seed; rows],
            end: vec![None; rows],
            strength: vec![0.0; rows],
        };
    }

    if !seed_travel {
        let mut col = vec![None; rows];
        for &(row, seed) in &points {
            col[row] = Some(seed as f64);
        }
        return SeedColumns {
            start: fill_linear_on(axis, &col, 0.0)
                .into_iter()
                .map(|v| v.trunc() as u64)
                .collect(),
            end: vec![None; rows],
            strength: vec![0.0; rows],
        };
    }

    let mut start = vec![None; rows];
    let mut end = vec![None; rows];
    let mut strength = vec![None; rows];
    let n = points.len();
    for (idx, &(row, seed)) in points.iter().enumerate() {
        if idx + 1 < n {
            start[row] = Some(seed);
            end[row] = Some(points[idx + 1].1);
            strength[row] = Some(0.0);
        }
        if idx + 2 == n {
            strength[rows - 1] = Some(1.0);
        }
        if idx > 0 && row > 0 {
            strength[row - 1] = Some(1.0);
        }
    }

    let first_seed = points[0].1;
    SeedColumns {
        start: forward_fill(&start)
            .into_iter()
            .map(|s| s.unwrap_or(first_seed))
            .collect(),
        end: forward_fill(&end),
        strength: fill_linear_on(axis, &strength, 0.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/seeds.rs"]
mod tests;
