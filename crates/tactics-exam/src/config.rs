//! Point values used by the scoring engine.

use serde::Serialize;
use std::env;
use tracing::debug;

use crate::error::ExamError;

/// NAG `$3`, rendered as "!!".
pub const BRILLIANT_NAG: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Credit for an ordinary solution move
    pub default_move_value: f64,

    /// Credit for a move carrying `bonus_nag`
    pub bonus_glyph_value: f64,

    /// Credit for the first move of an accepted alternate variation
    pub alternate_variation_value: f64,

    /// Glyph that marks a bonus move
    pub bonus_nag: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_move_value: 1.0,
            bonus_glyph_value: 2.0,
            alternate_variation_value: 0.5,
            bonus_nag: BRILLIANT_NAG,
        }
    }
}

impl ScoringConfig {
    /// Load from environment variables, falling back to the defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Result<Self, ExamError> {
        let defaults = Self::default();

        let config = Self {
            default_move_value: env_or("TACTICS_DEFAULT_MOVE_VALUE", defaults.default_move_value),
            bonus_glyph_value: env_or("TACTICS_BONUS_GLYPH_VALUE", defaults.bonus_glyph_value),
            alternate_variation_value: env_or(
                "TACTICS_ALTERNATE_VALUE",
                defaults.alternate_variation_value,
            ),
            bonus_nag: env_or("TACTICS_BONUS_NAG", defaults.bonus_nag),
        };

        config.validate()?;
        debug!(?config, "Scoring config loaded");
        Ok(config)
    }

    /// Every value must be a finite, non-negative number.
    pub fn validate(&self) -> Result<(), ExamError> {
        let values = [
            ("default_move_value", self.default_move_value),
            ("bonus_glyph_value", self.bonus_glyph_value),
            ("alternate_variation_value", self.alternate_variation_value),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ExamError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
