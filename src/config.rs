//! Simulation configuration parameters
//!
//! Every physical constant, limit and alert threshold used by the engine
//! simulation lives here. Values can be overridden from a JSON file; any
//! field left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // --- Fuel ---
    /// Full tank quantity
    pub fuel_capacity: f64,
    /// Rated maximum fuel flow
    pub fuel_flow_max: f64,
    /// Fuel-flow base change per thrust step
    pub fuel_flow_step: f64,
    /// Reserve below which a LOW FUEL caution is raised
    pub low_fuel_threshold: f64,

    // --- Engine ratings ---
    /// Ambient temperature; EGT rests here when the engine is off
    pub ambient_temp: f64,
    /// Rated maximum N1 (100 %)
    pub n1_rated_max: f64,
    /// Highest plausible N1 reading, as a fraction of rated
    pub n1_valid_max_ratio: f64,
    /// Highest plausible EGT reading; also the EGT clamp
    pub egt_max: f64,
    /// Lowest plausible EGT reading
    pub egt_valid_min: f64,
    /// Fraction of rated N1 both engines must reach to become stable
    pub stable_threshold_ratio: f64,

    // --- Lifecycle timing ---
    /// Fixed simulation step (seconds)
    pub step_secs: f64,
    /// Duration of the linear part of the start ramp (seconds)
    pub start_linear_secs: f64,
    /// Maximum duration of the shutdown decay (seconds)
    pub stop_duration_secs: f64,
    /// N1 at or below which a stopping engine counts as spun down
    pub stop_n1_floor: f64,

    // --- Noise ---
    /// Relative measurement noise on each sensor channel
    pub sensor_noise: f64,
    /// Relative oscillation of true values while stable
    pub stable_jitter: f64,
    /// Smallest relative response to a thrust step
    pub thrust_step_min: f64,
    /// Largest relative response to a thrust step
    pub thrust_step_max: f64,

    // --- Alert thresholds ---
    /// N1 percent above which an overspeed caution is raised
    pub n1_caution_pct: f64,
    /// N1 percent above which the engines are shut down
    pub n1_warning_pct: f64,
    /// EGT caution while starting
    pub start_egt_caution: f64,
    /// EGT shutdown limit while starting
    pub start_egt_warning: f64,
    /// EGT caution while stable
    pub stable_egt_caution: f64,
    /// EGT shutdown limit while stable
    pub stable_egt_warning: f64,

    // --- Driver ---
    /// Longest wall-clock frame fed into the step accumulator (seconds)
    pub max_frame_secs: f64,
    /// How long an alert stays on the master annunciator (seconds)
    pub alert_hold_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Fuel
            fuel_capacity: 20_000.0,
            fuel_flow_max: 50.0,
            fuel_flow_step: 1.0,
            low_fuel_threshold: 1_000.0,

            // Engine ratings
            ambient_temp: 20.0,
            n1_rated_max: 40_000.0,
            n1_valid_max_ratio: 1.25,
            egt_max: 1_200.0,
            egt_valid_min: -5.0,
            stable_threshold_ratio: 0.95,

            // Lifecycle timing
            step_secs: 0.005, // 200 Hz
            start_linear_secs: 2.0,
            stop_duration_secs: 8.0,
            stop_n1_floor: 0.5,

            // Noise
            sensor_noise: 0.01,
            stable_jitter: 0.03,
            thrust_step_min: 0.03,
            thrust_step_max: 0.05,

            // Alert thresholds
            n1_caution_pct: 105.0,
            n1_warning_pct: 120.0,
            start_egt_caution: 850.0,
            start_egt_warning: 1_000.0,
            stable_egt_caution: 950.0,
            stable_egt_warning: 1_100.0,

            // Driver
            max_frame_secs: 0.05,
            alert_hold_secs: 5.0,
        }
    }
}

impl SimConfig {
    /// N1 both engines must reach before the start sequence completes.
    pub fn stable_n1_threshold(&self) -> f64 {
        self.stable_threshold_ratio * self.n1_rated_max
    }

    /// Highest plausible N1 reading in absolute units.
    pub fn n1_valid_max(&self) -> f64 {
        self.n1_rated_max * self.n1_valid_max_ratio
    }

    /// Parse a JSON document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets the simulation cannot run with.
    ///
    /// Values are never silently clamped; the first offending field is
    /// reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (self.fuel_capacity, "fuel_capacity: must be positive"),
            (self.fuel_flow_max, "fuel_flow_max: must be positive"),
            (self.n1_rated_max, "n1_rated_max: must be positive"),
            (self.egt_max, "egt_max: must be positive"),
            (self.step_secs, "step_secs: must be positive"),
            (self.start_linear_secs, "start_linear_secs: must be positive"),
            (self.stop_duration_secs, "stop_duration_secs: must be positive"),
            (self.max_frame_secs, "max_frame_secs: must be positive"),
            (self.alert_hold_secs, "alert_hold_secs: must be positive"),
        ];
        for (value, reason) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::ValidationFailed(reason));
            }
        }

        if !(0.0..=1.0).contains(&self.stable_threshold_ratio) {
            return Err(ConfigError::ValidationFailed(
                "stable_threshold_ratio: must be within 0..=1",
            ));
        }
        if self.n1_valid_max_ratio < 1.0 {
            return Err(ConfigError::ValidationFailed(
                "n1_valid_max_ratio: must not be below rated",
            ));
        }
        if self.egt_valid_min > self.ambient_temp || self.ambient_temp > self.egt_max {
            return Err(ConfigError::ValidationFailed(
                "ambient_temp: must lie inside the valid EGT range",
            ));
        }
        if self.step_secs > self.max_frame_secs {
            return Err(ConfigError::ValidationFailed(
                "step_secs: must not exceed max_frame_secs",
            ));
        }
        if !(0.0..1.0).contains(&self.sensor_noise) || !(0.0..1.0).contains(&self.stable_jitter) {
            return Err(ConfigError::ValidationFailed(
                "noise: relative amplitudes must be within 0..1",
            ));
        }
        if self.thrust_step_min < 0.0 || self.thrust_step_min > self.thrust_step_max {
            return Err(ConfigError::ValidationFailed(
                "thrust_step_min: must be non-negative and not above thrust_step_max",
            ));
        }
        if self.n1_caution_pct >= self.n1_warning_pct {
            return Err(ConfigError::ValidationFailed(
                "n1_caution_pct: must be below n1_warning_pct",
            ));
        }
        if self.start_egt_caution >= self.start_egt_warning {
            return Err(ConfigError::ValidationFailed(
                "start_egt_caution: must be below start_egt_warning",
            ));
        }
        if self.stable_egt_caution >= self.stable_egt_warning {
            return Err(ConfigError::ValidationFailed(
                "stable_egt_caution: must be below stable_egt_warning",
            ));
        }
        if self.low_fuel_threshold < 0.0 || self.low_fuel_threshold > self.fuel_capacity {
            return Err(ConfigError::ValidationFailed(
                "low_fuel_threshold: must be within 0..=fuel_capacity",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SimConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.stable_n1_threshold(), 38_000.0);
        assert_eq!(c.n1_valid_max(), 50_000.0);
        assert!(c.step_secs < c.max_frame_secs);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SimConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SimConfig::from_json(r#"{ "fuel_capacity": 5000.0 }"#).unwrap();
        assert_eq!(c.fuel_capacity, 5_000.0);
        assert_eq!(c.n1_rated_max, SimConfig::default().n1_rated_max);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert_eq!(SimConfig::from_json("{ not json"), Err(ConfigError::Parse));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let c = SimConfig {
            n1_caution_pct: 125.0,
            ..SimConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));

        let c = SimConfig {
            stable_egt_caution: 1_200.0,
            ..SimConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let c = SimConfig {
            step_secs: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ValidationFailed("step_secs: must be positive"))
        );
    }

    #[test]
    fn nan_capacity_is_rejected() {
        let c = SimConfig {
            fuel_capacity: f64::NAN,
            ..SimConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
