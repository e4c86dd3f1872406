//! Candidate generation and reanneal perturbation.

use super::types::Bounds;
use crate::error::{AnnealError, Result};
use rand::Rng;

/// Draws one step `y` from the ASA generating distribution at temperature `t`.
///
/// `y = sign(u - 1/2) * t * ((1 + 1/t)^|2u - 1| - 1)`, `u ~ U[0, 1)`.
/// The result lies in `[-1, 1]` and concentrates around 0 as `t` falls.
pub fn asa_step<R: Rng>(t: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.random();
    let u2 = (2.0 * u - 1.0).abs();
    let sign = if u < 0.5 {
        -1.0
    } else if u > 0.5 {
        1.0
    } else {
        0.0
    };
    sign * t * ((1.0 + 1.0 / t).powf(u2) - 1.0)
}

/// Generates a candidate around `current`.
///
/// The whole vector is redrawn until every coordinate is inside `bounds`;
/// clamping would distort the distribution. Degenerate dimensions are
/// pinned to their only value.
pub fn generate_candidate<R: Rng>(
    current: &[f64],
    t_k: &[f64],
    bounds: &Bounds,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let mut x_new = vec![0.0; current.len()];
    for _ in 0..max_attempts {
        let mut inside = true;
        for (i, xi) in x_new.iter_mut().enumerate() {
            if bounds.is_degenerate(i) {
                *xi = bounds.min()[i];
                continue;
            }
            *xi = current[i] + asa_step(t_k[i], rng);
            inside &= bounds.contains_at(i, *xi);
        }
        if inside {
            return Ok(x_new);
        }
    }
    Err(AnnealError::GenerationExhausted {
        attempts: max_attempts,
    })
}

/// Perturbs `x` by the relative factor `delta` for tangent estimation.
///
/// Each coordinate becomes `x_i (1 + delta)`, or `x_i (1 - delta)` when the
/// former leaves the bounds. If neither fits, the clamped value is used.
pub fn delta_point(x: &[f64], delta: f64, bounds: &Bounds) -> Vec<f64> {
    x.iter()
        .enumerate()
        .map(|(i, &xi)| {
            let up = xi * (1.0 + delta);
            if bounds.contains_at(i, up) {
                return up;
            }
            let down = xi * (1.0 - delta);
            if bounds.contains_at(i, down) {
                down
            } else {
                bounds.clamp_at(i, up)
            }
        })
        .collect()
}
