//! Canvas-level options shared by every object on the canvas.
//!
//! Defaults match what an editor expects out of the box: proportional corner
//! scaling with Shift to release it, Alt for centered transforms, and Shift
//! on a side control to skew instead of scale. Options come from
//! `CanvasConfig::default()`, from `CANVAS_*` environment variables, or from
//! a JSON options object.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CURSOR, MOVE_CURSOR};
use crate::input::ModifierKey;

/// Error raised while building a [`CanvasConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("unknown modifier key: {0:?}")]
    UnknownModifier(String),
    #[error("invalid canvas options: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    /// Corner controls scale proportionally unless `uni_scale_key` is held.
    pub uniform_scaling: bool,
    /// Flips `uniform_scaling` while held. `None` disables the toggle.
    pub uni_scale_key: Option<ModifierKey>,
    /// Scale around the center instead of the opposite corner.
    pub centered_scaling: bool,
    /// Rotate around the center instead of the object origin.
    pub centered_rotation: bool,
    /// Flips the centered options while held.
    pub centered_key: Option<ModifierKey>,
    /// Turns side scaling into skewing while held.
    pub alt_action_key: Option<ModifierKey>,
    /// Whether clicking objects selects them.
    pub selection: bool,
    /// Ask the pixel probe before accepting a hit inside an object's box.
    pub per_pixel_target_find: bool,
    /// Probe radius in pixels for per-pixel hits.
    pub target_find_tolerance: f64,
    /// Keep the active object at its stacking position for hit-testing.
    pub preserve_object_stacking: bool,
    /// Ignore the pointer entirely.
    pub skip_target_find: bool,
    pub hover_cursor: String,
    pub move_cursor: String,
    pub default_cursor: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            uniform_scaling: true,
            uni_scale_key: Some(ModifierKey::Shift),
            centered_scaling: false,
            centered_rotation: false,
            centered_key: Some(ModifierKey::Alt),
            alt_action_key: Some(ModifierKey::Shift),
            selection: true,
            per_pixel_target_find: false,
            target_find_tolerance: 0.0,
            preserve_object_stacking: true,
            skip_target_find: false,
            hover_cursor: MOVE_CURSOR.to_string(),
            move_cursor: MOVE_CURSOR.to_string(),
            default_cursor: DEFAULT_CURSOR.to_string(),
        }
    }
}

impl CanvasConfig {
    /// Defaults overridden by `CANVAS_*` environment variables.
    ///
    /// Flags and numbers that fail to parse keep their default. Modifier keys
    /// accept `shift`, `ctrl`, `alt`, `meta` or `none`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownModifier`] for an unrecognized key name
    /// and [`ConfigError::InvalidValue`] for a negative tolerance.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            uniform_scaling: env_parse("CANVAS_UNIFORM_SCALING", d.uniform_scaling),
            uni_scale_key: env_key("CANVAS_UNI_SCALE_KEY", d.uni_scale_key)?,
            centered_scaling: env_parse("CANVAS_CENTERED_SCALING", d.centered_scaling),
            centered_rotation: env_parse("CANVAS_CENTERED_ROTATION", d.centered_rotation),
            centered_key: env_key("CANVAS_CENTERED_KEY", d.centered_key)?,
            alt_action_key: env_key("CANVAS_ALT_ACTION_KEY", d.alt_action_key)?,
            selection: env_parse("CANVAS_SELECTION", d.selection),
            per_pixel_target_find: env_parse("CANVAS_PER_PIXEL_TARGET_FIND", d.per_pixel_target_find),
            target_find_tolerance: env_parse("CANVAS_TARGET_FIND_TOLERANCE", d.target_find_tolerance),
            preserve_object_stacking: env_parse("CANVAS_PRESERVE_OBJECT_STACKING", d.preserve_object_stacking),
            skip_target_find: env_parse("CANVAS_SKIP_TARGET_FIND", d.skip_target_find),
            hover_cursor: env_string("CANVAS_HOVER_CURSOR", d.hover_cursor),
            move_cursor: env_string("CANVAS_MOVE_CURSOR", d.move_cursor),
            default_cursor: env_string("CANVAS_DEFAULT_CURSOR", d.default_cursor),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON options object. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown key names
    /// and [`ConfigError::InvalidValue`] for a negative tolerance.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_find_tolerance.is_finite() || self.target_find_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "targetFindTolerance".into(),
                value: self.target_find_tolerance.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_key(key: &str, default: Option<ModifierKey>) -> Result<Option<ModifierKey>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() || v.trim().eq_ignore_ascii_case("none") => Ok(None),
        Ok(v) => v.parse().map(Some),
        Err(_) => Ok(default),
    }
}
