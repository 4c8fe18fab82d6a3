//! Trim range for the first transform stage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Start/end bounds in seconds, passed to the engine as `-ss`/`-to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    /// Create a validated range.
    pub fn new(start: f64, end: f64) -> ModelResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Range covering a whole clip of the given duration.
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration.max(0.0),
        }
    }

    /// Check bounds are finite, non-negative and ordered.
    pub fn validate(&self) -> ModelResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ModelError::invalid_trim("bounds must be finite"));
        }
        if self.start < 0.0 {
            return Err(ModelError::invalid_trim(format!(
                "start {} is negative",
                self.start
            )));
        }
        if self.start > self.end {
            return Err(ModelError::invalid_trim(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Engine arguments for this range.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-ss".to_string(),
            self.start.to_string(),
            "-to".to_string(),
            self.end.to_string(),
        ]
    }
}
