//! Blend configuration.
//!
//! Weights are held as exact decimals so that range validation is not
//! subject to binary rounding (`0.8` is exactly `0.8`). The engine converts
//! them to `f64` once validated.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::types::Rate;
use crate::CompareResult;

/// Conventional starting value of every cumulative series.
pub const DEFAULT_BASE_VALUE: f64 = 100.0;

/// Weights and base value for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    /// ETF weight of the fixed ("LifeStrategy") blend.
    #[serde(default = "default_fixed_weight")]
    pub fixed_weight: Rate,
    /// ETF weight of the glide path at the first aligned period.
    #[serde(default = "default_glide_start")]
    pub glide_start: Rate,
    /// ETF weight of the glide path at the last aligned period.
    #[serde(default = "default_glide_end")]
    pub glide_end: Rate,
    /// Starting value of every cumulative series.
    #[serde(default = "default_base_value")]
    pub base_value: f64,
}

fn default_fixed_weight() -> Rate {
    dec!(0.80)
}

fn default_glide_start() -> Rate {
    dec!(0.90)
}

fn default_glide_end() -> Rate {
    dec!(0.60)
}

fn default_base_value() -> f64 {
    DEFAULT_BASE_VALUE
}

impl Default for BlendConfig {
    fn default() -> Self {
        BlendConfig {
            fixed_weight: default_fixed_weight(),
            glide_start: default_glide_start(),
            glide_end: default_glide_end(),
            base_value: default_base_value(),
        }
    }
}

impl BlendConfig {
    pub fn new(fixed_weight: Rate, glide_start: Rate, glide_end: Rate) -> Self {
        BlendConfig {
            fixed_weight,
            glide_start,
            glide_end,
            base_value: DEFAULT_BASE_VALUE,
        }
    }

    /// Check every weight lies in [0, 1] and the base value is positive.
    pub fn validate(&self) -> CompareResult<()> {
        validate_weight("fixed_weight", self.fixed_weight)?;
        validate_weight("glide_start", self.glide_start)?;
        validate_weight("glide_end", self.glide_end)?;
        if !self.base_value.is_finite() || self.base_value <= 0.0 {
            return Err(CompareError::InvalidInput {
                field: "base_value".into(),
                reason: format!("must be a positive finite number (got {})", self.base_value),
            });
        }
        Ok(())
    }

    pub fn fixed_weight_f64(&self) -> f64 {
        rate_to_f64(self.fixed_weight)
    }

    pub fn glide_start_f64(&self) -> f64 {
        rate_to_f64(self.glide_start)
    }

    pub fn glide_end_f64(&self) -> f64 {
        rate_to_f64(self.glide_end)
    }
}

/// Reject a weight outside the closed unit interval.
pub fn validate_weight(field: &str, value: Rate) -> CompareResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(CompareError::InvalidWeight {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn rate_to_f64(value: Rate) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
