use std::time::Duration;

use crate::error::CfgError;

/// Tuning knobs for the detection arbitrator.
///
/// Missing keys in a config file fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArbiterCfg {
    /// Consecutive identical reads required before a code is confirmed.
    pub confirmation_threshold: u32,
    /// Max gap between reads of one run, and min gap between re-confirmations
    /// of the same code.
    pub reset_window_ms: u64,
}

impl Default for ArbiterCfg {
    fn default() -> Self {
        Self {
            confirmation_threshold: 3,
            reset_window_ms: 2500,
        }
    }
}

impl ArbiterCfg {
    pub fn new(confirmation_threshold: u32, reset_window_ms: u64) -> Self {
        Self {
            confirmation_threshold,
            reset_window_ms,
        }
    }

    pub fn validate(&self) -> Result<(), CfgError> {
        if self.confirmation_threshold == 0 {
            return Err(CfgError::ZeroThreshold);
        }
        Ok(())
    }

    /// Parse and validate a TOML document, e.g.
    ///
    /// ```toml
    /// confirmation_threshold = 4
    /// reset_window_ms = 2000
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, CfgError> {
        let cfg: ArbiterCfg = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[inline]
    pub fn reset_window(&self) -> Duration {
        Duration::from_millis(self.reset_window_ms)
    }
}
