//! The ASA state machine.
//!
//! # Protocol
//!
//! 1. [`Anneal::new`] with an initial point and bounds (`NeedToInit`).
//! 2. [`Anneal::init`] derives the schedule (`NeedToCompute`).
//! 3. Loop on [`Anneal::state`]:
//!    - `NeedToCompute`: evaluate [`Anneal::candidate`], pass the value to
//!      [`Anneal::set_candidate_objective`].
//!    - `NeedToComputeSet`: evaluate [`Anneal::current`] and
//!      [`Anneal::plus_delta`], pass both to [`Anneal::set_reanneal_objectives`].
//!    - `NeedToStep`: call [`Anneal::step`].
//!    - `ReadyToStop`: done; read [`Anneal::best`].
//!
//! Calling an operation in a state where it is not listed returns
//! [`AnnealError::InvalidState`] and changes nothing. A fatal numeric error
//! from `step()` leaves the engine in `ReadyToStop` without a stop reason.
//!
//! # Example
//!
//! ```
//! use u_anneal::asa::{Anneal, AnnealState, AsaConfig};
//!
//! let f = |x: &[f64]| (x[0] - 1.0).powi(2);
//! let mut engine = Anneal::new(&[3.0], &[(-5.0, 5.0)], AsaConfig::default().with_seed(1))?;
//! engine.init()?;
//! for _ in 0..2000 {
//!     match engine.state() {
//!         AnnealState::NeedToCompute => {
//!             let fx = f(engine.candidate());
//!             engine.set_candidate_objective(fx)?;
//!         }
//!         AnnealState::NeedToComputeSet => {
//!             let (fc, fd) = (f(engine.current()), f(engine.plus_delta()));
//!             engine.set_reanneal_objectives(fc, fd)?;
//!         }
//!         AnnealState::ReadyToStop => break,
//!         _ => {}
//!     }
//!     engine.step()?;
//! }
//! assert!(engine.f_best() < 1.0);
//! # Ok::<(), u_anneal::AnnealError>(())
//! ```
//!
//! # Reference
//!
//! Ingber, L. (1989). "Very fast simulated re-annealing",
//! *Mathematical and Computer Modelling* 12, 967-973.

use super::config::AsaConfig;
use super::generation::{delta_point, generate_candidate};
use super::history::History;
use super::observer::{AnnealEvent, AnnealObserver, BoxedObserver};
use super::schedule::Schedule;
use super::types::{AnnealState, AnnealStats, Bounds, StopReason};
use crate::error::{AnnealError, Result};
use crate::store::RecordStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Minimum number of steps between two reanneals.
const MIN_STEPS_BETWEEN_REANNEALS: u64 = 10;

/// Adaptive Simulated Annealing engine.
///
/// The engine never evaluates the objective; see the [module docs](self)
/// for the protocol the caller follows.
pub struct Anneal {
    config: AsaConfig,
    dim: usize,
    bounds: Bounds,
    param_names: Vec<String>,
    schedule: Schedule,

    x: Vec<f64>,
    f_x: f64,
    x_cand: Vec<f64>,
    f_x_cand: f64,
    x_best: Vec<f64>,
    f_x_best: f64,
    x_plusdelta: Vec<f64>,
    f_x_plusdelta: f64,
    best_repeats: u32,
    delta_param: f64,

    t_k: Vec<f64>,
    t_cost: Vec<f64>,
    tangents: Vec<f64>,

    k: u64,
    k_r: u64,
    steps: u64,
    last_reanneal_steps: u64,
    num_improved: u64,
    num_worse: u64,
    num_worse_accepted: u64,
    num_accepted: u64,
    reanneals: u64,
    reanneal_pending: bool,

    history: History,
    state: AnnealState,
    stop_reason: Option<StopReason>,
    rng: StdRng,
    observer: Option<BoxedObserver>,
}

impl fmt::Debug for Anneal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anneal")
            .field("state", &self.state)
            .field("dim", &self.dim)
            .field("k", &self.k)
            .field("steps", &self.steps)
            .field("f_x_best", &self.f_x_best)
            .field("x_best", &self.x_best)
            .finish_non_exhaustive()
    }
}

impl Anneal {
    /// Creates an engine at `initial` searching inside `bounds`.
    ///
    /// Fails with an InvalidArgument-class error if the config is invalid,
    /// `initial` is empty, the bounds count differs from the dimension, a
    /// bound is inverted or non-finite, or `initial` lies outside the bounds.
    pub fn new(initial: &[f64], bounds: &[(f64, f64)], config: AsaConfig) -> Result<Self> {
        config.validate()?;
        if initial.is_empty() {
            return Err(AnnealError::EmptyParameters);
        }
        let dim = initial.len();
        if bounds.len() != dim {
            return Err(AnnealError::DimensionMismatch {
                what: "bounds",
                expected: dim,
                got: bounds.len(),
            });
        }
        let bounds = Bounds::new(bounds)?;
        for (index, &value) in initial.iter().enumerate() {
            if !bounds.contains_at(index, value) {
                return Err(AnnealError::OutOfBounds {
                    index,
                    value,
                    min: bounds.min()[index],
                    max: bounds.max()[index],
                });
            }
        }

        let rng = seeded_rng(config.seed);
        let schedule = Schedule::new(&config, dim);
        let delta_param = config.delta_param;

        Ok(Self {
            dim,
            bounds,
            param_names: Vec::new(),
            schedule,
            x: initial.to_vec(),
            f_x: 0.0,
            x_cand: initial.to_vec(),
            f_x_cand: 0.0,
            x_best: initial.to_vec(),
            f_x_best: 0.0,
            x_plusdelta: initial.to_vec(),
            f_x_plusdelta: 0.0,
            best_repeats: 0,
            delta_param,
            t_k: Vec::new(),
            t_cost: Vec::new(),
            tangents: Vec::new(),
            k: 1,
            k_r: 0,
            steps: 0,
            last_reanneal_steps: 0,
            num_improved: 0,
            num_worse: 0,
            num_worse_accepted: 0,
            num_accepted: 0,
            reanneals: 0,
            reanneal_pending: false,
            history: History::default(),
            state: AnnealState::NeedToInit,
            stop_reason: None,
            rng,
            observer: None,
            config,
        })
    }

    /// Names the parameters; written out by [`save`](Self::save).
    pub fn with_param_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.dim {
            return Err(AnnealError::DimensionMismatch {
                what: "param_names",
                expected: self.dim,
                got: names.len(),
            });
        }
        self.param_names = names;
        Ok(self)
    }

    /// Installs an observer, replacing any previous one.
    pub fn with_observer(mut self, observer: impl AnnealObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Mutable access to the configuration before `init()`.
    pub fn config_mut(&mut self) -> Result<&mut AsaConfig> {
        self.expect_state(AnnealState::NeedToInit, "config_mut")?;
        Ok(&mut self.config)
    }

    /// Derives the schedule and asks for the first evaluation.
    ///
    /// The first candidate is the initial point.
    pub fn init(&mut self) -> Result<()> {
        self.expect_state(AnnealState::NeedToInit, "init")?;
        self.config.validate()?;
        self.rng = seeded_rng(self.config.seed);

        let worst = self.worst_objective();
        self.f_x_best = worst;
        self.f_x = worst;
        self.f_x_cand = worst;
        self.f_x_plusdelta = worst;
        self.best_repeats = 0;
        self.delta_param = self.config.delta_param;

        self.schedule = Schedule::new(&self.config, self.dim);
        self.t_k = self.schedule.t_0.clone();
        self.t_cost = self.schedule.t_cost_0.clone();
        self.tangents = vec![1.0; self.dim];

        self.k = 1;
        self.steps = 0;
        self.last_reanneal_steps = 0;
        self.reanneals = 0;
        self.reanneal_pending = false;
        self.reset_stats();
        self.history.clear();
        self.stop_reason = None;

        debug!(
            dim = self.dim,
            downhill = self.config.downhill,
            k_f = self.schedule.k_f,
            t_f = self.schedule.t_f[0],
            c = self.schedule.c[0],
            "annealing initialised"
        );
        self.state = AnnealState::NeedToCompute;
        Ok(())
    }

    /// Supplies the objective value of [`candidate`](Self::candidate).
    pub fn set_candidate_objective(&mut self, f_x_cand: f64) -> Result<()> {
        self.expect_state(AnnealState::NeedToCompute, "set_candidate_objective")?;
        self.f_x_cand = f_x_cand;
        self.state = AnnealState::NeedToStep;
        Ok(())
    }

    /// Supplies the objective values of [`current`](Self::current) and
    /// [`plus_delta`](Self::plus_delta) so the next `step()` can finish the
    /// reanneal.
    pub fn set_reanneal_objectives(&mut self, f_x: f64, f_x_plusdelta: f64) -> Result<()> {
        self.expect_state(AnnealState::NeedToComputeSet, "set_reanneal_objectives")?;
        self.f_x = f_x;
        self.f_x_plusdelta = f_x_plusdelta;
        self.reanneal_pending = true;
        self.state = AnnealState::NeedToStep;
        Ok(())
    }

    /// Advances the algorithm by one step and returns the new state.
    ///
    /// # Errors
    ///
    /// [`AnnealError::InvalidState`] unless the state is `NeedToStep`.
    /// Fatal errors (non-finite tangent, invalid rescaled temperature,
    /// exhausted candidate generation) end the run.
    pub fn step(&mut self) -> Result<AnnealState> {
        self.expect_state(AnnealState::NeedToStep, "step")?;
        match self.advance() {
            Ok(()) => Ok(self.state),
            Err(err) => {
                warn!(error = %err, steps = self.steps, "annealing aborted");
                self.state = AnnealState::ReadyToStop;
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<()> {
        if let Some(reason) = self.stop_check() {
            info!(
                ?reason,
                steps = self.steps,
                f_x_best = self.f_x_best,
                "annealing finished"
            );
            self.stop_reason = Some(reason);
            self.state = AnnealState::ReadyToStop;
            self.notify(AnnealEvent::Stopped {
                reason,
                steps: self.steps,
            });
            return Ok(());
        }

        let reannealing = std::mem::take(&mut self.reanneal_pending);
        if reannealing {
            self.complete_reanneal()?;
        }

        self.cooling_schedule();
        // The candidate was discarded when the reanneal began, so this step
        // records no decision but still counts in `k`, `k_r` and `steps`.
        if !reannealing {
            self.acceptance_check();
        }
        self.generate_next()?;
        self.k = self.k.saturating_add(1);
        self.k_r = self.k_r.saturating_add(1);
        self.steps = self.steps.saturating_add(1);

        if self.config.enable_reanneal && self.reanneal_test() {
            self.begin_reanneal();
            self.state = AnnealState::NeedToComputeSet;
        } else {
            self.state = AnnealState::NeedToCompute;
        }
        Ok(())
    }

    /// Writes the run record to `store`.
    ///
    /// Keys: `/param_hist_accepted`, `/f_param_hist_accepted`,
    /// `/param_hist_rejected`, `/f_param_hist_rejected`, `/x_best`,
    /// `/f_x_best` and `/param_name_<i>` (1-based) per named parameter.
    pub fn save<S: RecordStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.put_matrix("/param_hist_accepted", self.history.accepted.params())?;
        store.put_vector("/f_param_hist_accepted", self.history.accepted.objectives())?;
        store.put_matrix("/param_hist_rejected", self.history.rejected.params())?;
        store.put_vector("/f_param_hist_rejected", self.history.rejected.objectives())?;
        store.put_vector("/x_best", &self.x_best)?;
        for (i, name) in self.param_names.iter().enumerate() {
            store.put_string(&format!("/param_name_{}", i + 1), name)?;
        }
        store.put_value("/f_x_best", self.f_x_best)?;
        Ok(())
    }

    // ---- accessors ----

    pub fn state(&self) -> AnnealState {
        self.state
    }

    /// Set once the run ended through a stopping condition.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn config(&self) -> &AsaConfig {
        &self.config
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The point awaiting evaluation.
    pub fn candidate(&self) -> &[f64] {
        &self.x_cand
    }

    pub fn f_candidate(&self) -> f64 {
        self.f_x_cand
    }

    /// The currently accepted point.
    pub fn current(&self) -> &[f64] {
        &self.x
    }

    pub fn f_current(&self) -> f64 {
        self.f_x
    }

    /// The best point accepted so far.
    pub fn best(&self) -> &[f64] {
        &self.x_best
    }

    /// Objective at [`best`](Self::best). Before anything is accepted this
    /// is `f64::MAX` when descending and `f64::MIN` when ascending.
    pub fn f_best(&self) -> f64 {
        self.f_x_best
    }

    /// The perturbed point requested while reannealing.
    pub fn plus_delta(&self) -> &[f64] {
        &self.x_plusdelta
    }

    /// Current relative perturbation used for tangent estimation.
    pub fn delta_param(&self) -> f64 {
        self.delta_param
    }

    /// Generating temperatures `T_i(k)`.
    pub fn generating_temperatures(&self) -> &[f64] {
        &self.t_k
    }

    /// Acceptance temperatures.
    pub fn acceptance_temperatures(&self) -> &[f64] {
        &self.t_cost
    }

    /// Expected final generating temperatures `T_f`.
    pub fn final_temperatures(&self) -> &[f64] {
        &self.schedule.t_f
    }

    /// Tangents estimated by the last reanneal attempt.
    pub fn tangents(&self) -> &[f64] {
        &self.tangents
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn stats(&self) -> AnnealStats {
        AnnealStats {
            steps: self.steps,
            k: self.k,
            k_f: self.schedule.k_f,
            k_r: self.k_r,
            num_improved: self.num_improved,
            num_worse: self.num_worse,
            num_worse_accepted: self.num_worse_accepted,
            num_accepted: self.num_accepted,
            reanneals: self.reanneals,
            best_repeats: self.best_repeats,
        }
    }

    // ---- algorithm ----

    fn cooling_schedule(&mut self) {
        self.t_k = self.schedule.generating_temperatures(self.k);
        self.t_cost = self.schedule.acceptance_temperatures(self.num_accepted);
        trace!(
            k = self.k,
            k_f = self.schedule.k_f,
            t_k = self.t_k[0],
            t_f = self.schedule.t_f[0],
            num_accepted = self.num_accepted,
            t_cost = self.t_cost[0],
            "cooled"
        );
        self.notify(AnnealEvent::Cooled {
            k: self.k,
            k_f: self.schedule.k_f,
            num_accepted: self.num_accepted,
            t_k: self.t_k[0],
            t_f: self.schedule.t_f[0],
            t_cost: self.t_cost[0],
        });
    }

    fn acceptance_check(&mut self) {
        let downhill = self.config.downhill;
        let improved = self.is_better(self.f_x_cand, self.f_x);
        if improved {
            self.num_improved += 1;
        } else {
            self.num_worse += 1;
        }

        // Signed so that an improvement in either direction gives p >= 1.
        let delta = if downhill {
            self.f_x_cand - self.f_x
        } else {
            self.f_x - self.f_x_cand
        };
        let p = (-delta / (f64::EPSILON + mean(&self.t_cost))).exp();
        let u: f64 = self.rng.random();
        let accepted = p > u;

        if !improved && accepted {
            self.num_worse_accepted += 1;
        }

        if accepted {
            self.x.clone_from(&self.x_cand);
            self.f_x = self.f_x_cand;
            if self.config.record_history {
                self.history.accepted.push(&self.x, self.f_x);
            }
            if self.f_x_cand == self.f_x_best {
                self.best_repeats += 1;
            }
            if self.is_better(self.f_x_cand, self.f_x_best) {
                self.x_best.clone_from(&self.x_cand);
                self.f_x_best = self.f_x_cand;
                self.best_repeats = 0;
            }
            self.num_accepted += 1;
        } else if self.config.record_history {
            self.history.rejected.push(&self.x, self.f_x);
        }
    }

    fn generate_next(&mut self) -> Result<()> {
        self.x_cand = generate_candidate(
            &self.x,
            &self.t_k,
            &self.bounds,
            self.config.max_generation_attempts,
            &mut self.rng,
        )?;
        Ok(())
    }

    fn reanneal_test(&self) -> bool {
        if self.steps.saturating_sub(self.last_reanneal_steps) < MIN_STEPS_BETWEEN_REANNEALS {
            return false;
        }
        // NaN (nothing generated yet) compares false and so reanneals.
        !(self.k_r < self.config.reanneal_after_steps
            && self.accepted_vs_generated() >= self.config.acc_gen_reanneal_ratio)
    }

    fn begin_reanneal(&mut self) {
        self.x.clone_from(&self.x_best);
        self.f_x = self.f_x_best;
        self.x_cand.clone_from(&self.x);
        self.f_x_cand = self.f_x;
        self.x_plusdelta = delta_point(&self.x, self.delta_param, &self.bounds);
        debug!(
            steps = self.steps,
            k_r = self.k_r,
            acc_gen = self.accepted_vs_generated(),
            "reannealing"
        );
    }

    fn complete_reanneal(&mut self) -> Result<()> {
        self.last_reanneal_steps = self.steps;

        let df = self.f_x_plusdelta - self.f_x;
        self.tangents = self
            .x_plusdelta
            .iter()
            .zip(&self.x)
            .map(|(&xd, &xi)| df / (xd - xi + f64::EPSILON))
            .collect();

        if let Some((index, &value)) = self
            .tangents
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite())
        {
            return Err(AnnealError::NonFiniteTangent { index, value });
        }

        if self.tangents.iter().any(|&t| t == 0.0) {
            let from = self.delta_param;
            self.delta_param *= 2.0;
            debug!(from, to = self.delta_param, "zero tangent, widening delta_param");
            self.notify(AnnealEvent::DeltaWidened {
                from,
                to: self.delta_param,
            });
            return Ok(());
        }

        let max_tangent = self.tangents.iter().fold(0.0f64, |m, t| m.max(t.abs()));
        let t_re: Vec<f64> = self
            .t_k
            .iter()
            .zip(&self.tangents)
            .map(|(&t, &tangent)| {
                // Flat dimensions keep their temperature.
                let tangent = if tangent.abs() < f64::EPSILON {
                    max_tangent
                } else {
                    tangent
                };
                (t * max_tangent / tangent).abs()
            })
            .collect();

        if let Some((index, &value)) = t_re
            .iter()
            .enumerate()
            .find(|&(_, &t)| !(t > 0.0 && t.is_finite()))
        {
            return Err(AnnealError::InvalidRescaledTemperature { index, value });
        }

        let k_re = self.schedule.equivalent_step(&t_re);
        let event = AnnealEvent::Reannealed {
            k_before: self.k,
            k_after: k_re,
            mean_t_before: mean(&self.t_k),
            mean_t_after: mean(&t_re),
        };
        debug!(
            k_before = self.k,
            k_after = k_re,
            t_before = mean(&self.t_k),
            t_after = mean(&t_re),
            "reanneal complete"
        );
        self.k = k_re;
        self.t_k = t_re;
        self.reanneals += 1;
        self.reset_stats();
        self.notify(event);
        Ok(())
    }

    fn stop_check(&self) -> Option<StopReason> {
        if self.config.exit_at_t_f
            && self
                .t_k
                .iter()
                .zip(&self.schedule.t_f)
                .all(|(t, t_f)| t < t_f)
        {
            return Some(StopReason::FinalTemperature);
        }
        if self.t_k[0] <= f64::EPSILON {
            return Some(StopReason::GeneratingTemperatureExhausted);
        }
        if self.t_cost[0] <= f64::EPSILON {
            return Some(StopReason::AcceptanceTemperatureExhausted);
        }
        if self.best_repeats >= self.config.f_x_best_repeat_max {
            return Some(StopReason::BestRepeated);
        }
        None
    }

    fn accepted_vs_generated(&self) -> f64 {
        self.num_accepted as f64 / (self.num_improved + self.num_worse) as f64
    }

    fn reset_stats(&mut self) {
        self.num_improved = 0;
        self.num_worse = 0;
        self.num_worse_accepted = 0;
        self.num_accepted = 0;
        self.k_r = 0;
    }

    fn is_better(&self, a: f64, b: f64) -> bool {
        if self.config.downhill {
            a < b
        } else {
            a > b
        }
    }

    fn worst_objective(&self) -> f64 {
        if self.config.downhill {
            f64::MAX
        } else {
            f64::MIN
        }
    }

    fn expect_state(&self, expected: AnnealState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AnnealError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn notify(&mut self, event: AnnealEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}
