use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::planner::CostMode;

/// Dwell presets, in milliseconds per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseSpeed {
    Insta,
    Fast,
    Medium,
    Slow,
}

impl MouseSpeed {
    pub fn step_delay(self) -> Duration {
        Duration::from_millis(match self {
            MouseSpeed::Insta => 0,
            MouseSpeed::Fast => 10,
            MouseSpeed::Medium => 100,
            MouseSpeed::Slow => 500,
        })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "insta" | "instant" => Some(MouseSpeed::Insta),
            "fast" => Some(MouseSpeed::Fast),
            "medium" => Some(MouseSpeed::Medium),
            "slow" => Some(MouseSpeed::Slow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Pause before every exploration step and every routed move.
    pub step_delay: Duration,
    /// Pause between first reaching the goal and mapping the rest.
    pub solved_pause: Duration,
    /// Keep exploring after the goal so later routing knows every wall.
    pub auto_continue: bool,
    /// Cost mode for going home; `goto` overwrites it with the mode it was given.
    pub cost_mode: CostMode,
    /// Route back to the start cell once the map is finished.
    pub return_home: bool,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            step_delay: MouseSpeed::Fast.step_delay(),
            solved_pause: Duration::from_millis(1000),
            auto_continue: true,
            cost_mode: CostMode::Time,
            return_home: true,
        }
    }
}

impl MouseConfig {
    pub const MAX_DELAY: Duration = Duration::from_secs(60);

    /// Config for tests and batch runs: no dwell, no pauses.
    pub fn instant() -> Self {
        Self::default()
            .with_speed(MouseSpeed::Insta)
            .with_solved_pause(Duration::ZERO)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.step_delay > Self::MAX_DELAY {
            return Err("step_delay must be at most 60s");
        }
        if self.solved_pause > Self::MAX_DELAY {
            return Err("solved_pause must be at most 60s");
        }
        Ok(())
    }

    pub fn with_speed(mut self, speed: MouseSpeed) -> Self {
        self.step_delay = speed.step_delay();
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_solved_pause(mut self, pause: Duration) -> Self {
        self.solved_pause = pause;
        self
    }

    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    pub fn with_cost_mode(mut self, mode: CostMode) -> Self {
        self.cost_mode = mode;
        self
    }

    pub fn with_return_home(mut self, enabled: bool) -> Self {
        self.return_home = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_presets_map_to_delays() {
        assert_eq!(MouseSpeed::Insta.step_delay(), Duration::ZERO);
        assert_eq!(MouseSpeed::Slow.step_delay(), Duration::from_millis(500));
        assert_eq!(MouseSpeed::from_name(" Medium "), Some(MouseSpeed::Medium));
        assert_eq!(MouseSpeed::from_name("warp"), None);
    }

    #[test]
    fn validate_rejects_long_delays() {
        assert!(MouseConfig::default().validate().is_ok());
        let cfg = MouseConfig::default().with_step_delay(Duration::from_secs(61));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: MouseConfig =
            serde_json::from_str(r#"{"auto_continue": false, "cost_mode": "distance"}"#).unwrap();
        assert!(!cfg.auto_continue);
        assert_eq!(cfg.cost_mode, CostMode::Distance);
        assert_eq!(cfg.step_delay, MouseSpeed::Fast.step_delay());
        assert!(cfg.return_home);
    }
}
