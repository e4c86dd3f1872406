//! Adaptive Simulated Annealing as a client-driven state machine.
//!
//! - **ASA engine** ([`asa::Anneal`]): Ingber's adaptive simulated annealing
//!   with per-dimension temperature schedules, a heavy-tailed generating
//!   distribution, and tangent-based reannealing. The engine never calls the
//!   objective; it tells the caller what to evaluate next, so expensive,
//!   remote or asynchronous objectives plug in without adapters.
//! - **Runner** ([`asa::AsaRunner`]): drives the protocol for in-process
//!   objectives, with step budgets, cancellation and independent restarts.
//! - **Record stores** ([`store`]): the persistence boundary. The engine
//!   writes its accepted/rejected history and best point to any
//!   [`store::RecordStore`].
//!
//! # Features
//!
//! | Feature | Enables | Default |
//! |---------|---------|---------|
//! | `serde` | `Serialize`/`Deserialize` on config and records, [`store::JsonStore`] | on |
//! | `parallel` | [`asa::AsaRunner::run_many`] on the rayon pool | off |
//!
//! Log events go through [`tracing`]; install a subscriber to see them.

pub mod asa;
pub mod error;
pub mod store;

pub use error::{AnnealError, ErrorKind, Result};
