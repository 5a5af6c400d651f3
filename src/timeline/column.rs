//! Fill strategies that turn a sparse column (`None` = undefined) into a dense one.

/// Frame positions of a table's rows: every frame of `0..=dense_end`, then sparse anchor
/// frames past it. Interpolation runs over frame positions, so anchors far past the end
/// shape the dense prefix without a row per frame in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameAxis {
    frames: Vec<u64>,
}

impl FrameAxis {
    /// `rows` consecutive frames starting at 0.
    pub fn dense(rows: usize) -> Self {
        Self {
            frames: (0..rows as u64).collect(),
        }
    }

    pub fn with_anchors(dense_end: u64, anchors: impl IntoIterator<Item = u64>) -> Self {
        let mut tail = anchors
            .into_iter()
            .filter(|&f| f > dense_end)
            .collect::<Vec<_>>();
        tail.sort_unstable();
        tail.dedup();
        let mut frames = (0..=dense_end).collect::<Vec<_>>();
        frames.extend(tail);
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, row: usize) -> u64 {
        self.frames[row]
    }

    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    /// Row holding `frame`, if the axis has one.
    pub fn row_of(&self, frame: u64) -> Option<usize> {
        self.frames.binary_search(&frame).ok()
    }

    fn position(&self, row: usize) -> f64 {
        self.frames[row] as f64
    }
}

/// Linear interpolation between defined points; values outside the first/last defined
/// point are held. A column with no defined point becomes `fallback`.
pub fn fill_linear(values: &[Option<f64>], fallback: f64) -> Vec<f64> {
    fill_linear_by(values, fallback, |i| i as f64)
}

/// [`fill_linear`] with rows placed at the frames of `axis`.
pub fn fill_linear_on(axis: &FrameAxis, values: &[Option<f64>], fallback: f64) -> Vec<f64> {
    fill_linear_by(values, fallback, |i| axis.position(i))
}

fn fill_linear_by(values: &[Option<f64>], fallback: f64, x: impl Fn(usize) -> f64) -> Vec<f64> {
    let known = known_points(values);
    let Some(&(first_i, first_v)) = known.first() else {
        return vec![fallback; values.len()];
    };
    let (last_i, last_v) = known[known.len() - 1];

    let mut out = Vec::with_capacity(values.len());
    let mut seg = 0usize;
    for i in 0..values.len() {
        if let Some(v) = values[i] {
            out.push(v);
            continue;
        }
        if i < first_i {
            out.push(first_v);
            continue;
        }
        if i > last_i {
            out.push(last_v);
            continue;
        }
        while known[seg + 1].0 < i {
            seg += 1;
        }
        let (i0, y0) = known[seg];
        let (i1, y1) = known[seg + 1];
        let t = (x(i) - x(i0)) / (x(i1) - x(i0));
        out.push(y0 + (y1 - y0) * t);
    }
    out
}

/// Quadratic interpolation inside each gap using three neighbouring defined points,
/// followed by [`fill_linear`] for whatever is left. Falls back to plain linear fill when
/// the column has three or fewer defined points.
pub fn fill_polynomial_then_linear(values: &[Option<f64>], fallback: f64) -> Vec<f64> {
    fill_polynomial_by(values, fallback, |i| i as f64)
}

/// [`fill_polynomial_then_linear`] with rows placed at the frames of `axis`.
pub fn fill_polynomial_on(axis: &FrameAxis, values: &[Option<f64>], fallback: f64) -> Vec<f64> {
    fill_polynomial_by(values, fallback, |i| axis.position(i))
}

fn fill_polynomial_by(
    values: &[Option<f64>],
    fallback: f64,
    x: impl Fn(usize) -> f64 + Copy,
) -> Vec<f64> {
    let known = known_points(values);
    if known.len() <= 3 {
        return fill_linear_by(values, fallback, x);
    }

    let mut partial = values.to_vec();
    for gap in 0..known.len() - 1 {
        let (a, b) = (known[gap].0, known[gap + 1].0);
        if b - a < 2 {
            continue;
        }
        let at = |(i, v): (usize, f64)| (x(i), v);
        let (p0, p1, p2) = if gap + 2 < known.len() {
            (at(known[gap]), at(known[gap + 1]), at(known[gap + 2]))
        } else {
            (at(known[gap - 1]), at(known[gap]), at(known[gap + 1]))
        };
        for (i, slot) in partial.iter_mut().enumerate().take(b).skip(a + 1) {
            *slot = Some(lagrange3(p0, p1, p2, x(i)));
        }
    }
    fill_linear_by(&partial, fallback, x)
}

/// Carry the last defined value forward; leading gaps take the first defined value.
pub fn forward_fill<T: Clone>(values: &[Option<T>]) -> Vec<Option<T>> {
    let first = values.iter().find_map(|v| v.clone());
    let mut current = first;
    values
        .iter()
        .map(|v| {
            if let Some(v) = v {
                current = Some(v.clone());
            }
            current.clone()
        })
        .collect()
}

fn known_points(values: &[Option<f64>]) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect()
}

fn lagrange3(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), x: f64) -> f64 {
    let (x0, y0) = p0;
    let (x1, y1) = p1;
    let (x2, y2) = p2;
    let l0 = (x - x1) * (x - x2) / ((x0 - x1) * (x0 - x2));
    let l1 = (x - x0) * (x - x2) / ((x1 - x0) * (x1 - x2));
    let l2 = (x - x0) * (x - x1) / ((x2 - x0) * (x2 - x1));
    y0 * l0 + y1 * l1 + y2 * l2
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/column.rs"]
mod tests;
