//! Observer hooks for watching an engine from the outside.
//!
//! The engine calls [`AnnealObserver::notify`] after the cooling schedule
//! runs, when a reanneal completes or is deferred, and when the run stops.
//! Closures work directly:
//!
//! ```
//! use u_anneal::asa::{Anneal, AnnealEvent, AsaConfig};
//!
//! let mut engine = Anneal::new(&[0.5], &[(0.0, 1.0)], AsaConfig::default())
//!     .unwrap()
//!     .with_observer(|event: &AnnealEvent| {
//!         if let AnnealEvent::Reannealed { k_before, k_after, .. } = event {
//!             println!("reannealed: k {k_before} -> {k_after}");
//!         }
//!     });
//! engine.init().unwrap();
//! ```

use super::types::StopReason;

/// Something the engine reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnealEvent {
    /// Temperatures were recomputed at the start of a step.
    Cooled {
        k: u64,
        k_f: u64,
        num_accepted: u64,
        /// `T_k[0]`.
        t_k: f64,
        /// `T_f[0]`.
        t_f: f64,
        /// `T_cost[0]`.
        t_cost: f64,
    },
    /// A reanneal rescaled the generating temperatures.
    Reannealed {
        k_before: u64,
        k_after: u64,
        mean_t_before: f64,
        mean_t_after: f64,
    },
    /// A tangent came out exactly zero, so the reanneal was abandoned and
    /// the perturbation widened.
    DeltaWidened { from: f64, to: f64 },
    /// The engine reached `ReadyToStop`.
    Stopped { reason: StopReason, steps: u64 },
}

/// Receives [`AnnealEvent`]s from an engine.
pub trait AnnealObserver: Send {
    fn notify(&mut self, event: &AnnealEvent);
}

impl<F> AnnealObserver for F
where
    F: FnMut(&AnnealEvent) + Send,
{
    fn notify(&mut self, event: &AnnealEvent) {
        self(event)
    }
}

/// Boxed observer as stored by the engine.
pub type BoxedObserver = Box<dyn AnnealObserver>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_receives_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &AnnealEvent| seen.push(event.clone());
            observer.notify(&AnnealEvent::DeltaWidened { from: 0.01, to: 0.02 });
        }
        assert_eq!(seen.len(), 1);
    }
}
