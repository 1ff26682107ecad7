//! Karnik–Mendel type reduction of a sampled interval type-2 set.

use crate::math::weighted_mean;

/// The type-reduced set `[left, right]` of an interval type-2 output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentroidInterval {
    pub left: f64,
    pub right: f64,
}

impl CentroidInterval {
    /// The crisp output.
    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) / 2.
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeReduction {
    pub centroid: CentroidInterval,
    /// The larger of the two endpoint searches; never more than the sample count.
    pub iterations: usize,
}

#[derive(Clone, Copy, Debug)]
enum Endpoint {
    Left,
    Right,
}

/// Computes the centroid interval of the set whose lower and upper memberships
/// at `samples[i]` are `lower[i]` and `upper[i]`.
///
/// Samples need not be sorted. Returns `None` when the set is empty
/// everywhere.
pub fn karnik_mendel(samples: &[f64], lower: &[f64], upper: &[f64]) -> Option<TypeReduction> {
    let mut points: Vec<(f64, f64, f64)> = samples
        .iter()
        .zip(lower)
        .zip(upper)
        .map(|((&y, &l), &u)| (y, l, u))
        .collect();

    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let start = weighted_mean(points.iter().map(|&(y, l, u)| (y, (l + u) / 2.)))?;
    let (left, left_iterations) = switch_point(&points, start, Endpoint::Left);
    let (right, right_iterations) = switch_point(&points, start, Endpoint::Right);
    // Rounding can invert a degenerate interval
    let (left, right) = if left <= right { (left, right) } else { (right, left) };

    tracing::trace!(left, right, left_iterations, right_iterations, "type reduction converged");

    Some(TypeReduction {
        centroid: CentroidInterval { left, right },
        iterations: left_iterations.max(right_iterations),
    })
}

/// Index k with `y_k <= centroid < y_(k+1)`, clamped to the first sample.
fn switch_index(points: &[(f64, f64, f64)], centroid: f64) -> usize {
    points.partition_point(|&(y, _, _)| y <= centroid).saturating_sub(1)
}

/// Iterates the switch index until it stops moving. The left endpoint weighs
/// samples up to the switch with their upper membership and the rest with
/// their lower membership; the right endpoint does the opposite.
fn switch_point(points: &[(f64, f64, f64)], start: f64, endpoint: Endpoint) -> (f64, usize) {
    let mut centroid = start;
    let mut k = switch_index(points, centroid);

    for iteration in 1..=points.len() {
        let weighted = points.iter().enumerate().map(|(i, &(y, l, u))| {
            let weight = match endpoint {
                Endpoint::Left if i <= k => u,
                Endpoint::Left => l,
                Endpoint::Right if i <= k => l,
                Endpoint::Right => u,
            };

            (y, weight)
        });

        let Some(next) = weighted_mean(weighted) else {
            return (centroid, iteration);
        };

        centroid = next;

        let next_k = switch_index(points, centroid);

        if next_k == k {
            return (centroid, iteration);
        }

        k = next_k;
    }

    (centroid, points.len())
}
