use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Reference starting value of the trading account, in USD.
pub const DEFAULT_BASELINE: f64 = 5000.0;

/// The fixed reference value profit/loss and the chart's vertical domain are
/// framed against.
///
/// Validated once at construction (finite and strictly positive), so stat and
/// chart code may divide by it without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Baseline(f64);

impl Baseline {
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidBaseline(format!(
                "{value} (must be finite and greater than zero)"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self(DEFAULT_BASELINE)
    }
}

impl<'de> Deserialize<'de> for Baseline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Baseline::new(value).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
