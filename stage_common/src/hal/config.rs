//! Per-axis settings.
//!
//! One `[[axes]]` table per axis in `fleet.toml`:
//!
//! ```toml
//! [[axes]]
//! id = 1
//! name = "x"
//! min_limit = -5.0
//! max_limit = 250.0
//! velocity = 400.0      # optional, simulated move timing
//! log_capacity = 8192   # optional
//! ```

use crate::config::ConfigError;
use crate::hal::consts::DEFAULT_LOG_CAPACITY;
use crate::hal::types::AxisId;
use serde::{Deserialize, Serialize};

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

/// Settings for a single axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSettings {
    /// Controller axis id.
    pub id: AxisId,

    /// Axis name (unique within a fleet).
    pub name: String,

    /// Lowest commandable position in engineering units.
    pub min_limit: f64,

    /// Highest commandable position in engineering units.
    pub max_limit: f64,

    /// Travel speed in engineering units per second.
    /// Backends without real kinematics use it to time blocking moves.
    #[serde(default)]
    pub velocity: Option<f64>,

    /// Datalog buffer capacity in samples.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl AxisSettings {
    /// Settings with the given travel and defaults elsewhere.
    pub fn new(id: u8, name: impl Into<String>, min_limit: f64, max_limit: f64) -> Self {
        Self {
            id: AxisId(id),
            name: name.into(),
            min_limit,
            max_limit,
            velocity: None,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `name` not empty
    /// 2. limits finite and `min_limit < max_limit`
    /// 3. `velocity` > 0 when set
    /// 4. `log_capacity` > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Axis {} has empty name",
                self.id
            )));
        }

        if !self.min_limit.is_finite() || !self.max_limit.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "Axis '{}': travel limits must be finite",
                self.name
            )));
        }

        if self.min_limit >= self.max_limit {
            return Err(ConfigError::ValidationError(format!(
                "Axis '{}': min_limit ({}) must be < max_limit ({})",
                self.name, self.min_limit, self.max_limit
            )));
        }

        if let Some(velocity) = self.velocity {
            if !(velocity > 0.0 && velocity.is_finite()) {
                return Err(ConfigError::ValidationError(format!(
                    "Axis '{}': velocity must be > 0 (got {})",
                    self.name, velocity
                )));
            }
        }

        if self.log_capacity == 0 {
            return Err(ConfigError::ValidationError(format!(
                "Axis '{}': log_capacity must be > 0",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_settings() {
        assert!(AxisSettings::new(1, "x", -5.0, 250.0).validate().is_ok());
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let settings = AxisSettings::new(1, "x", 10.0, 10.0);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_velocity_rejected() {
        let mut settings = AxisSettings::new(1, "x", 0.0, 10.0);
        settings.velocity = Some(0.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(AxisSettings::new(4, "", 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let settings: AxisSettings = toml::from_str(
            r#"
id = 3
name = "z"
min_limit = 0.0
max_limit = 40.0
"#,
        )
        .unwrap();
        assert_eq!(settings.id, AxisId(3));
        assert_eq!(settings.velocity, None);
        assert_eq!(settings.log_capacity, DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<AxisSettings>(
            r#"
id = 3
name = "z"
min_limit = 0.0
max_limit = 40.0
gear_ratio = 2.0
"#,
        );
        assert!(result.is_err());
    }
}
