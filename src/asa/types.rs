//! Core types for the ASA engine.

use crate::error::{AnnealError, Result};

/// What the client must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnealState {
    /// Not yet constructed.
    Unknown,
    /// Call [`Anneal::init`](super::Anneal::init).
    NeedToInit,
    /// Call [`Anneal::step`](super::Anneal::step).
    NeedToStep,
    /// Evaluate the objective at the candidate and supply it with
    /// [`Anneal::set_candidate_objective`](super::Anneal::set_candidate_objective).
    NeedToCompute,
    /// Evaluate the objective at the current point and at the delta point and
    /// supply both with
    /// [`Anneal::set_reanneal_objectives`](super::Anneal::set_reanneal_objectives).
    NeedToComputeSet,
    /// The run has finished.
    ReadyToStop,
}

impl AnnealState {
    /// True once the run has finished.
    pub fn is_terminal(self) -> bool {
        self == AnnealState::ReadyToStop
    }
}

/// Why the engine moved to [`AnnealState::ReadyToStop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// `exit_at_t_f` is set and every `T_k` dropped below `T_f`.
    FinalTemperature,
    /// `T_k[0]` reached machine epsilon.
    GeneratingTemperatureExhausted,
    /// `T_cost[0]` reached machine epsilon.
    AcceptanceTemperatureExhausted,
    /// The best objective was matched `f_x_best_repeat_max` times.
    BestRepeated,
}

/// Closed per-dimension search box `[min_i, max_i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Builds bounds from `(min, max)` pairs.
    ///
    /// Fails if there are no pairs, a limit is not finite, or `min > max`.
    pub fn new(pairs: &[(f64, f64)]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(AnnealError::EmptyParameters);
        }
        for (index, &(min, max)) in pairs.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(AnnealError::InvalidBounds { index, min, max });
            }
        }
        Ok(Self {
            min: pairs.iter().map(|p| p.0).collect(),
            max: pairs.iter().map(|p| p.1).collect(),
        })
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Checks one coordinate.
    pub fn contains_at(&self, i: usize, value: f64) -> bool {
        value >= self.min[i] && value <= self.max[i]
    }

    /// Checks a whole vector. Vectors of the wrong length are never contained.
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim() && x.iter().enumerate().all(|(i, &v)| self.contains_at(i, v))
    }

    /// Clamps one coordinate into its interval.
    pub fn clamp_at(&self, i: usize, value: f64) -> f64 {
        value.clamp(self.min[i], self.max[i])
    }

    /// True when dimension `i` admits a single value.
    pub fn is_degenerate(&self, i: usize) -> bool {
        self.min[i] == self.max[i]
    }
}

/// Running counters of an engine, as returned by
/// [`Anneal::stats`](super::Anneal::stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealStats {
    /// Calls to `step()` that did work.
    pub steps: u64,
    /// Annealing time `k` used by the cooling schedule.
    pub k: u64,
    /// Expected final value of `k`.
    pub k_f: u64,
    /// Steps since the last completed reanneal.
    pub k_r: u64,
    /// Candidates that improved on the current point.
    pub num_improved: u64,
    /// Candidates that did not.
    pub num_worse: u64,
    /// Worse candidates that were accepted anyway.
    pub num_worse_accepted: u64,
    /// Accepted candidates since the last reanneal (`k_cost`).
    pub num_accepted: u64,
    /// Completed reanneals.
    pub reanneals: u64,
    /// Times the current best objective has been matched.
    pub best_repeats: u32,
}

/// An objective function evaluated by [`AsaRunner`](super::AsaRunner).
///
/// The engine itself never evaluates anything; this trait only serves the
/// convenience driver. Any `Fn(&[f64]) -> f64` implements it.
pub trait Objective: Sync {
    /// Evaluates the objective at `x`.
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(&[(-1.0, 1.0), (0.0, 0.0)]).unwrap();
        assert_eq!(b.dim(), 2);
        assert!(b.contains(&[0.5, 0.0]));
        assert!(b.contains(&[-1.0, 0.0]));
        assert!(!b.contains(&[1.5, 0.0]));
        assert!(!b.contains(&[0.0]));
        assert!(b.is_degenerate(1));
        assert!(!b.is_degenerate(0));
    }

    #[test]
    fn test_bounds_rejects_inverted_pair() {
        let err = Bounds::new(&[(0.0, 1.0), (2.0, 1.0)]).unwrap_err();
        assert!(matches!(err, AnnealError::InvalidBounds { index: 1, .. }));
    }

    #[test]
    fn test_bounds_rejects_nan_and_empty() {
        assert!(Bounds::new(&[(f64::NAN, 1.0)]).is_err());
        assert!(matches!(
            Bounds::new(&[]),
            Err(AnnealError::EmptyParameters)
        ));
    }

    #[test]
    fn test_closure_is_objective() {
        let f = |x: &[f64]| x.iter().sum::<f64>();
        assert!((f.evaluate(&[1.0, 2.0]) - 3.0).abs() < 1e-12);
    }
}
