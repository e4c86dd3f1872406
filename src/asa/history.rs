//! Accepted/rejected trajectories kept for diagnostics.
//!
//! The engine only appends; nothing in the algorithm reads these back.

/// An append-only sequence of `(parameters, objective)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    params: Vec<Vec<f64>>,
    objectives: Vec<f64>,
}

impl Trajectory {
    pub fn push(&mut self, params: &[f64], objective: f64) {
        self.params.push(params.to_vec());
        self.objectives.push(objective);
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Parameter vectors in insertion order.
    pub fn params(&self) -> &[Vec<f64>] {
        &self.params
    }

    /// Objective values, parallel to [`params`](Self::params).
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.params
            .iter()
            .map(Vec::as_slice)
            .zip(self.objectives.iter().copied())
    }
}

/// Both streams of an annealing run.
///
/// On rejection the *current* point is recorded, not the rejected
/// candidate, so both streams describe where the walk stood.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    pub accepted: Trajectory,
    pub rejected: Trajectory,
}

impl History {
    /// Total number of acceptance decisions recorded.
    pub fn decisions(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_push_and_iter() {
        let mut t = Trajectory::default();
        assert!(t.is_empty());
        t.push(&[1.0, 2.0], 5.0);
        t.push(&[0.0, 1.0], 1.0);
        assert_eq!(t.len(), 2);
        let collected: Vec<_> = t.iter().collect();
        assert_eq!(collected[1], (&[0.0, 1.0][..], 1.0));
        assert_eq!(t.objectives(), &[5.0, 1.0]);
    }

    #[test]
    fn test_history_decisions() {
        let mut h = History::default();
        h.accepted.push(&[1.0], 1.0);
        h.rejected.push(&[1.0], 1.0);
        h.rejected.push(&[1.0], 1.0);
        assert_eq!(h.decisions(), 3);
        h.clear();
        assert_eq!(h.decisions(), 0);
    }
}
