//! Adaptive Simulated Annealing (ASA).
//!
//! Ingber's very fast simulated re-annealing, exposed as a client-driven
//! state machine: [`Anneal`] says what it needs evaluated, the caller
//! evaluates it wherever it likes and steps the engine. Per-dimension
//! generating temperatures follow `T_i(k) = T_0 exp(-c k^(1/D))`, new points
//! come from ASA's heavy-tailed generating distribution, and a reanneal
//! periodically rescales the temperatures from finite-difference tangents
//! of the objective.
//!
//! [`AsaRunner`] drives the protocol for objectives that are plain functions.
//!
//! # References
//!
//! - Ingber, L. (1989). "Very fast simulated re-annealing",
//!   *Mathematical and Computer Modelling* 12, 967-973.
//! - Ingber, L. (1993). "Simulated annealing: Practice versus theory",
//!   *Mathematical and Computer Modelling* 18(11), 29-57.

mod config;
mod engine;
mod generation;
mod history;
mod observer;
mod runner;
mod schedule;
mod types;

pub use config::AsaConfig;
pub use engine::Anneal;
pub use generation::{asa_step, delta_point, generate_candidate};
pub use history::{History, Trajectory};
pub use observer::{AnnealEvent, AnnealObserver, BoxedObserver};
pub use runner::{AsaResult, AsaRunner};
pub use schedule::Schedule;
pub use types::{AnnealState, AnnealStats, Bounds, Objective, StopReason};
