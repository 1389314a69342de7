use common::{Result, SessionError, Ticks};
use serde::{Deserialize, Serialize};

/// Scripted non-linear playback: skip ahead once, then speed up once.
///
/// Thresholds are fractions of the stream duration expressed as divisors, so
/// the defaults read as "skip inside `(D/6, D/3)` to `D/3`, speed up past `D/2`".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptedPolicy {
    pub enabled: bool,
    pub skip_window_divisor: u64,
    pub skip_target_divisor: u64,
    pub speedup_divisor: u64,
    pub speedup_rate: f64,
}

impl Default for ScriptedPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_window_divisor: 6,
            skip_target_divisor: 3,
            speedup_divisor: 2,
            speedup_rate: 2.0,
        }
    }
}

/// One-shot guards of the policy, kept on the session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyProgress {
    pub skip_ahead_fired: bool,
    pub rate_change_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyAction {
    SkipAhead { target: Ticks },
    SpeedUp { rate: f64 },
}

impl ScriptedPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.skip_window_divisor == 0 || self.skip_target_divisor == 0 || self.speedup_divisor == 0 {
            return Err(SessionError::Configuration {
                message: "Policy divisors must be greater than 0".to_string(),
            });
        }

        // D/window < D/target, otherwise the skip window is empty
        if self.skip_window_divisor <= self.skip_target_divisor {
            return Err(SessionError::Configuration {
                message: "Skip window divisor must be greater than skip target divisor".to_string(),
            });
        }

        if !self.speedup_rate.is_finite() || self.speedup_rate == 0.0 {
            return Err(SessionError::Configuration {
                message: format!("Invalid speed-up rate: {}", self.speedup_rate),
            });
        }

        Ok(())
    }

    pub fn skip_target(&self, duration: Ticks) -> Ticks {
        duration / self.skip_target_divisor
    }

    /// Decides what, if anything, the monitor should do at `position`.
    pub fn evaluate(&self, position: Ticks, duration: Ticks, progress: PolicyProgress) -> Option<PolicyAction> {
        if !self.enabled {
            return None;
        }

        let window_start = duration / self.skip_window_divisor;
        let target = self.skip_target(duration);
        if !progress.skip_ahead_fired && position > window_start && position < target {
            return Some(PolicyAction::SkipAhead { target });
        }

        if progress.skip_ahead_fired
            && !progress.rate_change_applied
            && position > duration / self.speedup_divisor
        {
            return Some(PolicyAction::SpeedUp {
                rate: self.speedup_rate,
            });
        }

        None
    }
}
