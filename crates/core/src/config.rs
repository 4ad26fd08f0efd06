//! Reveal effect configuration.
//!
//! Every field is optional when deserializing; missing keys take the defaults
//! below. The camelCase option names used by the browser API are accepted as
//! aliases so the same JSON works on both sides of the wasm boundary.

use crate::color::Rgb;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default clock multiplier.
pub const DEFAULT_ANIMATION_SPEED: f64 = 0.4;
/// Default opacity levels: three low, three mid, three high, one full.
pub const DEFAULT_OPACITIES: [f64; 10] = [0.3, 0.3, 0.3, 0.5, 0.5, 0.5, 0.8, 0.8, 0.8, 1.0];
/// Default dot radius in CSS pixels.
pub const DEFAULT_DOT_SIZE: f64 = 3.0;

/// Configuration for a reveal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Multiplier applied to the nominal per-frame clock advance.
    #[serde(alias = "animationSpeed")]
    pub animation_speed: f64,
    /// Opacity levels a dot may draw at, each in [0, 1].
    pub opacities: Vec<f64>,
    /// Draw colors.
    pub colors: Vec<Rgb>,
    /// Rendered radius of every dot.
    #[serde(alias = "dotSize")]
    pub dot_size: f64,
    /// Reserved; carried through but not used when drawing.
    #[serde(alias = "showGradient")]
    pub show_gradient: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            animation_speed: DEFAULT_ANIMATION_SPEED,
            opacities: DEFAULT_OPACITIES.to_vec(),
            colors: vec![Rgb::CYAN],
            dot_size: DEFAULT_DOT_SIZE,
            show_gradient: true,
        }
    }
}

impl RevealConfig {
    /// Parses a JSON object, filling missing fields with defaults, and validates it.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        let config: RevealConfig = serde_json::from_value(value.clone())
            .map_err(|e| EngineError::config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would fault or misbehave at render time.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.colors.is_empty() {
            return Err(EngineError::config("colors", "palette must not be empty"));
        }
        if self.opacities.is_empty() {
            return Err(EngineError::config("opacities", "palette must not be empty"));
        }
        if let Some((i, o)) = self
            .opacities
            .iter()
            .enumerate()
            .find(|(_, o)| !(0.0..=1.0).contains(*o))
        {
            return Err(EngineError::config(
                "opacities",
                format!("level {i} is {o}, expected a value in [0, 1]"),
            ));
        }
        if !self.animation_speed.is_finite() || self.animation_speed <= 0.0 {
            return Err(EngineError::config(
                "animation_speed",
                format!("must be finite and positive, got {}", self.animation_speed),
            ));
        }
        if !self.dot_size.is_finite() || self.dot_size < 0.0 {
            return Err(EngineError::config(
                "dot_size",
                format!("must be finite and non-negative, got {}", self.dot_size),
            ));
        }
        Ok(())
    }

    /// Schema describing every field: type, default, range and description.
    pub fn schema() -> Value {
        json!({
            "animation_speed": {
                "type": "number",
                "default": DEFAULT_ANIMATION_SPEED,
                "min": 0.0,
                "exclusive_min": true,
                "description": "Multiplier on the per-frame clock advance of 0.016"
            },
            "opacities": {
                "type": "array",
                "items": { "type": "number", "min": 0.0, "max": 1.0 },
                "min_items": 1,
                "default": DEFAULT_OPACITIES,
                "description": "Opacity levels; each dot draws at one level for its lifetime"
            },
            "colors": {
                "type": "array",
                "items": { "type": "rgb", "description": "[r, g, b] or \"#rrggbb\"" },
                "min_items": 1,
                "default": [Rgb::CYAN],
                "description": "Draw colors; each dot draws in one color for its lifetime"
            },
            "dot_size": {
                "type": "number",
                "default": DEFAULT_DOT_SIZE,
                "min": 0.0,
                "description": "Dot radius in CSS pixels"
            },
            "show_gradient": {
                "type": "boolean",
                "default": true,
                "description": "Reserved"
            }
        })
    }
}
