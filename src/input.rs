//! Input model: modifier keys, pointer kinds, action names, and the state of
//! an in-progress transform.
//!
//! A [`TransformSession`] is created on pointer-down over an active object and
//! lives until pointer-up or cancel. It carries everything a control's action
//! handler needs between moves: the snapshot to revert to, the transform
//! origin, the pointer at the start of the gesture, and the running flip
//! signs.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actions::drag_handler;
use crate::config::ConfigError;
use crate::control::ActionHandler;
use crate::object::{ObjectId, OriginX, OriginY, SceneObject};
use crate::point::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// A single modifier, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    #[serde(rename = "shiftKey", alias = "shift")]
    Shift,
    #[serde(rename = "ctrlKey", alias = "ctrl")]
    Ctrl,
    #[serde(rename = "altKey", alias = "alt")]
    Alt,
    #[serde(rename = "metaKey", alias = "meta")]
    Meta,
}

impl ModifierKey {
    /// Whether this key is held in `modifiers`.
    #[must_use]
    pub fn is_pressed(self, modifiers: Modifiers) -> bool {
        match self {
            Self::Shift => modifiers.shift,
            Self::Ctrl => modifiers.ctrl,
            Self::Alt => modifiers.alt,
            Self::Meta => modifiers.meta,
        }
    }
}

impl FromStr for ModifierKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shift" | "shiftkey" => Ok(Self::Shift),
            "ctrl" | "ctrlkey" | "control" => Ok(Self::Ctrl),
            "alt" | "altkey" | "option" => Ok(Self::Alt),
            "meta" | "metakey" | "cmd" => Ok(Self::Meta),
            _ => Err(ConfigError::UnknownModifier(s.to_string())),
        }
    }
}

/// Whether an optional configured key is held. An unset key never is.
#[must_use]
pub fn is_key_pressed(key: Option<ModifierKey>, modifiers: Modifiers) -> bool {
    key.is_some_and(|k| k.is_pressed(modifiers))
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// What produced a pointer event. Touch uses the larger control hit boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

impl PointerKind {
    #[must_use]
    pub fn is_touch(self) -> bool {
        self == Self::Touch
    }
}

/// A keyboard key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

// =============================================================
// Actions
// =============================================================

/// The kind of transform a gesture performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionName {
    #[default]
    Drag,
    Rotate,
    Scale,
    ScaleX,
    ScaleY,
    SkewX,
    SkewY,
    Resizing,
}

impl ActionName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
            Self::Resizing => "resizing",
        }
    }

    /// Scaling in any direction.
    #[must_use]
    pub fn is_scale(self) -> bool {
        matches!(self, Self::Scale | Self::ScaleX | Self::ScaleY)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress notification pushed by a handler each time it changes the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformEventKind {
    Moving,
    Scaling,
    Rotating,
    Skewing,
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformEvent {
    pub kind: TransformEventKind,
    pub target: ObjectId,
    /// Pointer in the target's parent plane.
    pub pointer: Point,
}

// =============================================================
// Session
// =============================================================

/// Transform properties captured when a gesture starts, used to revert on
/// cancel and to report the before/after state on completion.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformSnapshot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Transform origin of the session at capture time.
    pub origin_x: OriginX,
    pub origin_y: OriginY,
}

impl TransformSnapshot {
    #[must_use]
    pub fn capture(obj: &SceneObject, origin_x: OriginX, origin_y: OriginY) -> Self {
        Self {
            left: obj.left,
            top: obj.top,
            width: obj.width,
            height: obj.height,
            scale_x: obj.scale_x,
            scale_y: obj.scale_y,
            skew_x: obj.skew_x,
            skew_y: obj.skew_y,
            angle: obj.angle,
            flip_x: obj.flip_x,
            flip_y: obj.flip_y,
            origin_x,
            origin_y,
        }
    }

    /// Write the captured transform back onto `obj`.
    pub fn restore(&self, obj: &mut SceneObject) {
        obj.left = self.left;
        obj.top = self.top;
        obj.width = self.width;
        obj.height = self.height;
        obj.scale_x = self.scale_x;
        obj.scale_y = self.scale_y;
        obj.skew_x = self.skew_x;
        obj.skew_y = self.skew_y;
        obj.angle = self.angle;
        obj.flip_x = self.flip_x;
        obj.flip_y = self.flip_y;
    }
}

/// State of the gesture between pointer-down and pointer-up.
#[derive(Debug, Clone)]
pub struct TransformSession {
    /// Object being transformed.
    pub target: ObjectId,
    /// Key of the grabbed control, `None` for a body drag.
    pub corner: Option<String>,
    pub action: ActionName,
    /// Handler invoked on every move; `None` makes moves a no-op.
    pub action_handler: Option<ActionHandler>,
    /// Target state at pointer-down.
    pub original: TransformSnapshot,
    /// Current transform origin. Scaling past the anchor inverts it.
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    /// Pointer at pointer-down, in the target's parent plane.
    pub ex: f64,
    pub ey: f64,
    /// Pointer at the previous move, in the target's parent plane.
    pub last_pointer: Point,
    /// Target angle at pointer-down, in radians.
    pub theta: f64,
    /// Which side of the origin the pointer was on last move; `0` until known.
    pub sign_x: f64,
    pub sign_y: f64,
    /// Pointer minus the target's `left`/`top` at pointer-down.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Modifiers held at pointer-down.
    pub modifiers: Modifiers,
    /// Set once any move changed the target.
    pub action_performed: bool,
    /// Progress events not yet drained by the engine.
    pub events: Vec<TransformEvent>,
}

impl TransformSession {
    /// Start a gesture on `target` with the pointer at `pointer` (parent
    /// plane). A grabbed `corner` uses that control's handler; no corner
    /// means a body drag.
    #[must_use]
    pub fn new(
        target: &SceneObject,
        corner: Option<String>,
        action: ActionName,
        origin: (OriginX, OriginY),
        pointer: Point,
        modifiers: Modifiers,
    ) -> Self {
        let control = corner.as_deref().and_then(|key| target.controls.get(key));
        let action_handler = match control {
            Some(c) => c.action_handler,
            None => Some(drag_handler as ActionHandler),
        };
        let initial_sign = |v: f64| if v == 0.0 { 0.0 } else { v.signum() };
        let (sign_x, sign_y) = control.map_or((0.0, 0.0), |c| (initial_sign(c.x), initial_sign(c.y)));
        Self {
            target: target.id,
            corner,
            action,
            action_handler,
            original: TransformSnapshot::capture(target, origin.0, origin.1),
            origin_x: origin.0,
            origin_y: origin.1,
            ex: pointer.x,
            ey: pointer.y,
            last_pointer: pointer,
            theta: target.angle.to_radians(),
            sign_x,
            sign_y,
            offset_x: pointer.x - target.left,
            offset_y: pointer.y - target.top,
            modifiers,
            action_performed: false,
            events: Vec::new(),
        }
    }

    /// Whether the gesture transforms around the center on both axes.
    #[must_use]
    pub fn is_centered(&self) -> bool {
        self.origin_x == OriginX::Center && self.origin_y == OriginY::Center
    }
}
