//! ASA configuration.

use crate::error::{AnnealError, Result};

/// Configuration for the Adaptive Simulated Annealing engine.
///
/// Field names follow Ingber's ASA C code where one exists
/// (`Temperature_Ratio_Scale`, `Temperature_Anneal_Scale`,
/// `Cost_Parameter_Scale_Ratio`).
///
/// # Examples
///
/// ```
/// use u_anneal::asa::AsaConfig;
///
/// let config = AsaConfig::default()
///     .with_downhill(false)
///     .with_reanneal_after_steps(50)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsaConfig {
    /// Minimise the objective when true, maximise when false.
    pub downhill: bool,

    /// Ratio of final to initial generating temperature.
    ///
    /// `m = -ln(temperature_ratio_scale)`. Must lie in (0, 1).
    pub temperature_ratio_scale: f64,

    /// Expected number of steps to reach the final temperature.
    ///
    /// `n = ln(temperature_anneal_scale)`. Must be greater than 1.
    pub temperature_anneal_scale: f64,

    /// Scales the acceptance-temperature decay rate relative to the
    /// generating-temperature decay rate.
    pub cost_parameter_scale_ratio: f64,

    /// Reanneal once accepted/generated drops below this ratio.
    pub acc_gen_reanneal_ratio: f64,

    /// Relative perturbation used to estimate tangents when reannealing.
    ///
    /// Doubled automatically whenever a perturbation produces no change
    /// in the objective.
    pub delta_param: f64,

    /// Stop after the best objective has been matched this many times.
    pub f_x_best_repeat_max: u32,

    /// Enables reannealing.
    pub enable_reanneal: bool,

    /// Force a reanneal after this many steps without one.
    pub reanneal_after_steps: u64,

    /// Stop once every generating temperature is below its expected final value.
    pub exit_at_t_f: bool,

    /// Keep the accepted/rejected trajectories for [`Anneal::save`](super::Anneal::save).
    pub record_history: bool,

    /// Upper limit on whole-vector redraws when generating one candidate.
    pub max_generation_attempts: usize,

    /// Maximum number of steps taken by [`AsaRunner`](super::AsaRunner). 0 = no limit.
    pub max_steps: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AsaConfig {
    fn default() -> Self {
        Self {
            downhill: true,
            temperature_ratio_scale: 1e-5,
            temperature_anneal_scale: 100.0,
            cost_parameter_scale_ratio: 1.0,
            acc_gen_reanneal_ratio: 1e-6,
            delta_param: 0.01,
            f_x_best_repeat_max: 10,
            enable_reanneal: true,
            reanneal_after_steps: 100,
            exit_at_t_f: false,
            record_history: true,
            max_generation_attempts: 1_000_000,
            max_steps: 0,
            seed: None,
        }
    }
}

impl AsaConfig {
    pub fn with_downhill(mut self, downhill: bool) -> Self {
        self.downhill = downhill;
        self
    }

    pub fn with_temperature_ratio_scale(mut self, scale: f64) -> Self {
        self.temperature_ratio_scale = scale;
        self
    }

    pub fn with_temperature_anneal_scale(mut self, scale: f64) -> Self {
        self.temperature_anneal_scale = scale;
        self
    }

    pub fn with_cost_parameter_scale_ratio(mut self, ratio: f64) -> Self {
        self.cost_parameter_scale_ratio = ratio;
        self
    }

    pub fn with_acc_gen_reanneal_ratio(mut self, ratio: f64) -> Self {
        self.acc_gen_reanneal_ratio = ratio;
        self
    }

    pub fn with_delta_param(mut self, delta: f64) -> Self {
        self.delta_param = delta;
        self
    }

    pub fn with_best_repeat_max(mut self, n: u32) -> Self {
        self.f_x_best_repeat_max = n;
        self
    }

    pub fn with_reanneal(mut self, enable: bool) -> Self {
        self.enable_reanneal = enable;
        self
    }

    pub fn with_reanneal_after_steps(mut self, n: u64) -> Self {
        self.reanneal_after_steps = n;
        self
    }

    pub fn with_exit_at_t_f(mut self, exit: bool) -> Self {
        self.exit_at_t_f = exit;
        self
    }

    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn with_max_generation_attempts(mut self, n: usize) -> Self {
        self.max_generation_attempts = n;
        self
    }

    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AnnealError::InvalidConfig(msg));

        if !(self.temperature_ratio_scale > 0.0 && self.temperature_ratio_scale < 1.0) {
            return invalid(format!(
                "temperature_ratio_scale must be in (0, 1), got {}",
                self.temperature_ratio_scale
            ));
        }
        if !(self.temperature_anneal_scale > 1.0) || !self.temperature_anneal_scale.is_finite() {
            return invalid(format!(
                "temperature_anneal_scale must be finite and greater than 1, got {}",
                self.temperature_anneal_scale
            ));
        }
        if !(self.cost_parameter_scale_ratio > 0.0) || !self.cost_parameter_scale_ratio.is_finite() {
            return invalid(format!(
                "cost_parameter_scale_ratio must be positive, got {}",
                self.cost_parameter_scale_ratio
            ));
        }
        if !(self.acc_gen_reanneal_ratio >= 0.0) {
            return invalid(format!(
                "acc_gen_reanneal_ratio must be non-negative, got {}",
                self.acc_gen_reanneal_ratio
            ));
        }
        if !(self.delta_param > 0.0) || !self.delta_param.is_finite() {
            return invalid(format!(
                "delta_param must be positive, got {}",
                self.delta_param
            ));
        }
        if self.f_x_best_repeat_max == 0 {
            return invalid("f_x_best_repeat_max must be positive".into());
        }
        if self.max_generation_attempts == 0 {
            return invalid("max_generation_attempts must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AsaConfig::default();
        assert!(config.downhill);
        assert!((config.temperature_ratio_scale - 1e-5).abs() < 1e-15);
        assert!((config.temperature_anneal_scale - 100.0).abs() < 1e-10);
        assert!((config.delta_param - 0.01).abs() < 1e-15);
        assert_eq!(config.f_x_best_repeat_max, 10);
        assert_eq!(config.reanneal_after_steps, 100);
        assert!(config.enable_reanneal);
        assert!(!config.exit_at_t_f);
    }

    #[test]
    fn test_validate_ok() {
        assert!(AsaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_ratio_scale() {
        for bad in [0.0, 1.0, -0.5, f64::NAN] {
            let config = AsaConfig::default().with_temperature_ratio_scale(bad);
            assert!(config.validate().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_validate_bad_anneal_scale() {
        let config = AsaConfig::default().with_temperature_anneal_scale(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_delta() {
        let config = AsaConfig::default().with_delta_param(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_repeat_max() {
        let config = AsaConfig::default().with_best_repeat_max(0);
        assert!(matches!(
            config.validate(),
            Err(AnnealError::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AsaConfig =
            serde_json::from_str(r#"{ "downhill": false, "delta_param": 0.05 }"#).unwrap();
        assert!(!config.downhill);
        assert!((config.delta_param - 0.05).abs() < 1e-15);
        assert_eq!(config.reanneal_after_steps, 100);
    }
}
