//! ASA temperature schedule.
//!
//! Both schedules decay as `T(k) = T_0 exp(-c k^(1/D))`. The generating
//! temperatures follow the annealing time `k`; the acceptance temperatures
//! follow the number of accepted points.
//!
//! # Reference
//!
//! Ingber, L. (1989). "Very fast simulated re-annealing",
//! *Mathematical and Computer Modelling* 12, 967-973.

use super::config::AsaConfig;

/// Largest annealing time a reanneal may set.
///
/// Hot dimensions (`T_re > T_0`) raised to an even `D` can push the
/// equivalent step far past `u64::MAX`; the cap leaves room for the
/// counters to keep advancing.
pub const MAX_ANNEALING_TIME: u64 = u64::MAX / 2;

/// Constants derived once by `init()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    dim: usize,
    /// Initial generating temperatures, all 1.
    pub t_0: Vec<f64>,
    /// Expected final generating temperatures.
    pub t_f: Vec<f64>,
    /// `m = -ln(temperature_ratio_scale)`.
    pub m: Vec<f64>,
    /// `n = ln(temperature_anneal_scale)`.
    pub n: Vec<f64>,
    /// Generating control parameter `c = m exp(-n / D)`.
    pub c: Vec<f64>,
    /// Acceptance control parameter.
    pub c_cost: Vec<f64>,
    /// Initial acceptance temperatures.
    pub t_cost_0: Vec<f64>,
    /// Expected final annealing time.
    pub k_f: u64,
}

impl Schedule {
    /// Derives the schedule for `dim` dimensions.
    ///
    /// `m` and `n` are the same for every dimension.
    pub fn new(config: &AsaConfig, dim: usize) -> Self {
        let d = dim as f64;
        let t_0 = vec![1.0; dim];
        let m = vec![-config.temperature_ratio_scale.ln(); dim];
        let n = vec![config.temperature_anneal_scale.ln(); dim];
        let c: Vec<f64> = m
            .iter()
            .zip(&n)
            .map(|(&mi, &ni)| mi * (-ni / d).exp())
            .collect();
        let t_f = t_0
            .iter()
            .zip(&m)
            .map(|(&t, &mi)| t * (-mi).exp())
            .collect();
        let k_f = (n.iter().map(|ni| ni.exp()).sum::<f64>() / d) as u64;
        let c_cost: Vec<f64> = c
            .iter()
            .map(|ci| ci * config.cost_parameter_scale_ratio)
            .collect();
        let t_cost_0 = c_cost.clone();

        Self {
            dim,
            t_0,
            t_f,
            m,
            n,
            c,
            c_cost,
            t_cost_0,
            k_f,
        }
    }

    /// Generating temperatures `T_i(k)`.
    pub fn generating_temperatures(&self, k: u64) -> Vec<f64> {
        decay(&self.t_0, &self.c, k, self.dim)
    }

    /// Acceptance temperatures `T_cost(k_cost)`, with `k_cost` the number
    /// of accepted points.
    pub fn acceptance_temperatures(&self, num_accepted: u64) -> Vec<f64> {
        decay(&self.t_cost_0, &self.c_cost, num_accepted, self.dim)
    }

    /// Annealing time at which the schedule would reach `t_re`:
    /// `mean((ln(T_0 / T_re) / c)^D)`.
    ///
    /// A negative or NaN mean saturates to 0, a huge one to
    /// [`MAX_ANNEALING_TIME`].
    pub fn equivalent_step(&self, t_re: &[f64]) -> u64 {
        let d = self.dim as f64;
        let total: f64 = t_re
            .iter()
            .zip(&self.t_0)
            .zip(&self.c)
            .map(|((&tr, &t0), &ci)| ((t0 / tr).ln() / ci).powf(d))
            .sum();
        let k = total / d;
        if k >= MAX_ANNEALING_TIME as f64 {
            MAX_ANNEALING_TIME
        } else {
            k as u64
        }
    }
}

fn decay(t_start: &[f64], c: &[f64], count: u64, dim: usize) -> Vec<f64> {
    let root = (count as f64).powf(1.0 / dim as f64);
    t_start
        .iter()
        .zip(c)
        .map(|(&t, &ci)| t * (-ci * root).exp())
        .collect()
}
