//! Shared numeric constants for the engine.

// ── Math ────────────────────────────────────────────────────────

/// π / 2, the angle step at which `cos`/`sin` return exact values.
pub const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;

/// Full turn in radians.
pub const TWO_PI: f64 = std::f64::consts::TAU;

// ── Scaling ─────────────────────────────────────────────────────

/// Scale value substituted for an exact zero scale.
pub const MIN_SCALE: f64 = 0.0001;

// ── Skewing ─────────────────────────────────────────────────────

/// Extra extent (screen pixels) below which a skew snaps back to zero.
pub const SKEW_SNAP_PX: f64 = 2.0;

// ── Controls ────────────────────────────────────────────────────

/// Default edge length of a control hit box, in screen pixels.
pub const CORNER_SIZE_PX: f64 = 13.0;

/// Default edge length of a control hit box for touch input, in screen pixels.
pub const TOUCH_CORNER_SIZE_PX: f64 = 24.0;

/// Distance from the top edge to the rotation control, in screen pixels.
pub const ROTATE_CONTROL_OFFSET_PX: f64 = -40.0;

/// Cursor shown when the hovered control's action is locked.
pub const NOT_ALLOWED_CURSOR: &str = "not-allowed";

/// Cursor shown over a control with no specific style.
pub const DEFAULT_CONTROL_CURSOR: &str = "crosshair";

/// Cursor shown while dragging or hovering a movable object body.
pub const MOVE_CURSOR: &str = "move";

/// Cursor shown over empty canvas.
pub const DEFAULT_CURSOR: &str = "default";
