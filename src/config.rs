//! Engine configuration
//!
//! Policy constants for capture and analysis, held in memory for the
//! lifetime of the engine. Nothing here touches files or the environment;
//! the fingerprint is ephemeral telemetry and its tuning travels with the
//! code that wires up the engine.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Default keystroke buffer capacity; the pause buffer shares this bound.
pub const DEFAULT_KEYSTROKE_CAPACITY: usize = 60;

/// Default pointer sample buffer capacity.
pub const DEFAULT_POINTER_CAPACITY: usize = 120;

/// Default click buffer capacity.
pub const DEFAULT_CLICK_CAPACITY: usize = 50;

/// Default scroll buffer capacity.
pub const DEFAULT_SCROLL_CAPACITY: usize = 50;

/// Default minimum spacing between stored pointer samples (ms).
pub const DEFAULT_POINTER_SAMPLE_INTERVAL_MS: i64 = 100;

/// Default rolling window for the typing-speed estimate (keystrokes).
pub const DEFAULT_TYPING_SPEED_WINDOW: usize = 10;

/// Default assumed attention cost of one tab switch (ms).
///
/// An acknowledged approximation of lost focus, kept as a named tunable
/// rather than treated as validated ground truth.
pub const DEFAULT_TAB_SWITCH_COST_MS: f64 = 5000.0;

/// Tunables for a [`BehaviorEngine`](crate::engine::BehaviorEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Keystroke buffer capacity; inter-keystroke pauses use the same bound
    pub keystroke_capacity: usize,
    /// Pointer sample buffer capacity
    pub pointer_capacity: usize,
    /// Click buffer capacity
    pub click_capacity: usize,
    /// Scroll buffer capacity
    pub scroll_capacity: usize,
    /// Minimum spacing between stored pointer samples (ms)
    pub pointer_sample_interval_ms: i64,
    /// Number of most-recent keystrokes in the typing-speed window
    pub typing_speed_window: usize,
    /// Assumed attention cost per tab switch (ms)
    pub tab_switch_cost_ms: f64,
    /// User-agent string of the hosting page, for device classification
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keystroke_capacity: DEFAULT_KEYSTROKE_CAPACITY,
            pointer_capacity: DEFAULT_POINTER_CAPACITY,
            click_capacity: DEFAULT_CLICK_CAPACITY,
            scroll_capacity: DEFAULT_SCROLL_CAPACITY,
            pointer_sample_interval_ms: DEFAULT_POINTER_SAMPLE_INTERVAL_MS,
            typing_speed_window: DEFAULT_TYPING_SPEED_WINDOW,
            tab_switch_cost_ms: DEFAULT_TAB_SWITCH_COST_MS,
            user_agent: String::new(),
        }
    }
}

impl EngineConfig {
    /// Check that the configuration is usable by an engine.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.keystroke_capacity < 2
            || self.pointer_capacity < 2
            || self.click_capacity < 2
            || self.scroll_capacity < 2
        {
            return Err(EngineError::InvalidConfig(
                "buffer capacities must be at least 2".to_string(),
            ));
        }

        if self.typing_speed_window < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "typing speed window must be at least 2 keystrokes, got {}",
                self.typing_speed_window
            )));
        }

        if self.pointer_sample_interval_ms < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "pointer sample interval must be non-negative, got {}",
                self.pointer_sample_interval_ms
            )));
        }

        if !self.tab_switch_cost_ms.is_finite() || self.tab_switch_cost_ms < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "tab switch cost must be a non-negative finite value, got {}",
                self.tab_switch_cost_ms
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keystroke_capacity, DEFAULT_KEYSTROKE_CAPACITY);
        assert_eq!(config.pointer_sample_interval_ms, 100);
        assert_eq!(config.tab_switch_cost_ms, 5000.0);
    }

    #[test]
    fn test_rejects_degenerate_capacities() {
        let config = EngineConfig {
            keystroke_capacity: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_sample_interval() {
        let config = EngineConfig {
            pointer_sample_interval_ms: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_tab_switch_cost() {
        let config = EngineConfig {
            tab_switch_cost_ms: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EngineConfig {
            user_agent: "Mozilla/5.0 (iPhone)".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let loaded: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.user_agent, config.user_agent);
        assert_eq!(loaded.pointer_capacity, config.pointer_capacity);
    }
}
