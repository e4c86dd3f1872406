//! Convenience driver for in-process objectives.
//!
//! [`AsaRunner`] plays the client side of the [`Anneal`] protocol: it
//! evaluates whatever the engine asks for and steps until the engine stops,
//! the step budget runs out, or the cancel flag is raised.

use super::config::AsaConfig;
use super::engine::Anneal;
use super::types::{AnnealState, Objective, StopReason};
use crate::error::{AnnealError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info_span;

/// Steps between two samples of the best objective in
/// [`AsaResult::objective_history`].
const HISTORY_INTERVAL: usize = 100;

/// Result of an ASA run.
#[derive(Debug, Clone)]
pub struct AsaResult {
    /// The best point found.
    pub best: Vec<f64>,

    /// Objective at `best`.
    pub best_objective: f64,

    /// Steps taken by this run.
    pub steps: usize,

    /// Objective evaluations made by this run.
    pub evaluations: usize,

    /// Completed reanneals.
    pub reanneals: u64,

    /// Why the engine stopped, if it did.
    pub stop_reason: Option<StopReason>,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best objective sampled at regular intervals.
    pub objective_history: Vec<f64>,
}

/// Drives [`Anneal`] engines against an [`Objective`].
pub struct AsaRunner;

impl AsaRunner {
    /// Builds an engine and runs it to completion.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_anneal::asa::{AsaConfig, AsaRunner};
    ///
    /// let result = AsaRunner::run(
    ///     &|x: &[f64]| (x[0] - 0.5).powi(2),
    ///     &[2.0],
    ///     &[(-3.0, 3.0)],
    ///     AsaConfig::default().with_seed(11).with_max_steps(3000),
    /// )
    /// .unwrap();
    /// assert!(result.best_objective < 0.1);
    /// ```
    pub fn run<O: Objective>(
        objective: &O,
        initial: &[f64],
        bounds: &[(f64, f64)],
        config: AsaConfig,
    ) -> Result<AsaResult> {
        Self::run_with_cancel(objective, initial, bounds, config, None)
    }

    /// Runs with an optional cancellation token.
    pub fn run_with_cancel<O: Objective>(
        objective: &O,
        initial: &[f64],
        bounds: &[(f64, f64)],
        config: AsaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AsaResult> {
        let mut engine = Anneal::new(initial, bounds, config)?;
        Self::drive(&mut engine, objective, cancel)
    }

    /// Runs an existing engine, calling `init()` first if needed.
    ///
    /// An engine stopped by the step budget can be driven again and
    /// continues where it left off.
    pub fn drive<O: Objective>(
        engine: &mut Anneal,
        objective: &O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AsaResult> {
        if engine.state() == AnnealState::NeedToInit {
            engine.init()?;
        }
        let max_steps = engine.config().max_steps;
        let _span = info_span!(
            "asa_run",
            dim = engine.dim(),
            downhill = engine.config().downhill,
            max_steps
        )
        .entered();

        let mut steps = 0usize;
        let mut evaluations = 0usize;
        let mut cancelled = false;
        let mut objective_history = Vec::new();

        loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if max_steps > 0 && steps >= max_steps {
                break;
            }

            match engine.state() {
                AnnealState::NeedToCompute => {
                    let f = objective.evaluate(engine.candidate());
                    evaluations += 1;
                    engine.set_candidate_objective(f)?;
                }
                AnnealState::NeedToComputeSet => {
                    let f_x = objective.evaluate(engine.current());
                    let f_plusdelta = objective.evaluate(engine.plus_delta());
                    evaluations += 2;
                    engine.set_reanneal_objectives(f_x, f_plusdelta)?;
                }
                AnnealState::NeedToStep => {}
                AnnealState::ReadyToStop => break,
                state @ (AnnealState::Unknown | AnnealState::NeedToInit) => {
                    return Err(AnnealError::InvalidState {
                        operation: "drive",
                        state,
                    });
                }
            }

            engine.step()?;
            steps += 1;

            if steps.is_multiple_of(HISTORY_INTERVAL) {
                objective_history.push(engine.f_best());
            }
        }

        if objective_history
            .last()
            .is_none_or(|&last| last != engine.f_best())
        {
            objective_history.push(engine.f_best());
        }

        Ok(AsaResult {
            best: engine.best().to_vec(),
            best_objective: engine.f_best(),
            steps,
            evaluations,
            reanneals: engine.stats().reanneals,
            stop_reason: engine.stop_reason(),
            cancelled,
            objective_history,
        })
    }

    /// Runs independent engines against one objective.
    ///
    /// With the `parallel` feature the engines run on the rayon pool;
    /// otherwise one after another. Results keep the order of `engines`.
    pub fn run_many<O: Objective>(objective: &O, engines: Vec<Anneal>) -> Vec<Result<AsaResult>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            engines
                .into_par_iter()
                .map(|mut engine| Self::drive(&mut engine, objective, None))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            engines
                .into_iter()
                .map(|mut engine| Self::drive(&mut engine, objective, None))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_asa_sphere_2d() {
        let config = AsaConfig::default().with_seed(42).with_max_steps(5000);
        let result = AsaRunner::run(
            &sphere,
            &[4.0, 4.0],
            &[(-5.0, 5.0), (-5.0, 5.0)],
            config,
        )
        .unwrap();

        assert!(
            result.best_objective < 0.1,
            "expected near-zero objective, got {}",
            result.best_objective
        );
        let dist = sphere(&result.best).sqrt();
        assert!(dist < 0.5, "best point {:?} too far from origin", result.best);
        assert!(result.evaluations >= result.steps);
    }

    #[test]
    fn test_asa_uphill_concave() {
        let f = |x: &[f64]| -(x[0] - 0.3).powi(2);
        let config = AsaConfig::default()
            .with_downhill(false)
            .with_seed(7)
            .with_max_steps(5000);
        let result = AsaRunner::run(&f, &[0.9], &[(-1.0, 1.0)], config).unwrap();

        assert!(
            (result.best[0] - 0.3).abs() < 0.1,
            "expected maximum near 0.3, got {}",
            result.best[0]
        );
        assert!(result.best_objective <= 0.0);
        assert!(result.best_objective > -0.01);
    }

    #[test]
    fn test_asa_max_steps_limit() {
        let config = AsaConfig::default().with_seed(1).with_max_steps(25);
        let result =
            AsaRunner::run(&sphere, &[1.0, 1.0], &[(-2.0, 2.0), (-2.0, 2.0)], config).unwrap();
        assert_eq!(result.steps, 25);
        assert!(result.stop_reason.is_none());
    }

    #[test]
    fn test_asa_cancellation() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result = AsaRunner::run_with_cancel(
            &sphere,
            &[1.0],
            &[(-2.0, 2.0)],
            AsaConfig::default().with_seed(1),
            Some(cancel),
        )
        .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.steps, 0);
    }

    #[test]
    fn test_asa_runs_until_stopping_condition() {
        let result = AsaRunner::run(
            &|_: &[f64]| 1.0,
            &[0.0],
            &[(-1.0, 1.0)],
            AsaConfig::default().with_seed(5),
        )
        .unwrap();
        assert_eq!(result.stop_reason, Some(StopReason::BestRepeated));
        assert!(!result.cancelled);
    }

    #[test]
    fn test_objective_history_non_increasing() {
        let config = AsaConfig::default().with_seed(42).with_max_steps(2000);
        let result =
            AsaRunner::run(&sphere, &[3.0, -3.0], &[(-5.0, 5.0), (-5.0, 5.0)], config).unwrap();
        for window in result.objective_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best objective history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_drive_resumes_after_budget() {
        let mut engine = Anneal::new(
            &[2.0, 2.0],
            &[(-5.0, 5.0), (-5.0, 5.0)],
            AsaConfig::default().with_seed(9).with_max_steps(10),
        )
        .unwrap();
        let first = AsaRunner::drive(&mut engine, &sphere, None).unwrap();
        assert_eq!(first.steps, 10);
        let second = AsaRunner::drive(&mut engine, &sphere, None).unwrap();
        assert!(second.best_objective <= first.best_objective);
        assert_eq!(engine.stats().steps, 20);
    }

    #[test]
    fn test_run_many_keeps_order() {
        let engines: Vec<Anneal> = (0..4)
            .map(|seed| {
                Anneal::new(
                    &[1.0],
                    &[(-2.0, 2.0)],
                    AsaConfig::default().with_seed(seed).with_max_steps(50 + seed as usize),
                )
                .unwrap()
            })
            .collect();
        let results = AsaRunner::run_many(&sphere, engines);
        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            let result = result.as_ref().unwrap();
            assert!(result.steps <= 50 + i);
        }
    }
}
