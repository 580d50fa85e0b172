#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, trace};

use crate::actions::HandlerEnv;
use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::control::Control;
use crate::input::{
    ActionName, Button, Key, Modifiers, PointerKind, TransformEvent, TransformSession, TransformSnapshot,
};
use crate::object::{ObjectId, OriginX, OriginY, SceneObject};
use crate::point::Point;
use crate::scene::{Scene, SceneError};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A gesture grabbed `id`.
    TransformStarted { id: ObjectId, action: ActionName, corner: Option<String> },
    /// A move changed the target.
    Transforming(TransformEvent),
    /// A gesture that changed its target ended.
    ObjectModified { id: ObjectId, action: ActionName, before: TransformSnapshot, after: TransformSnapshot },
    /// A gesture was abandoned and its target reverted.
    TransformCancelled { id: ObjectId },
    SelectionChanged(Option<ObjectId>),
    SetCursor(String),
    RenderNeeded,
}

/// Answers whether an object has visible pixels near a viewport point.
/// Hosts that rasterize objects plug one in for per-pixel target finding.
pub trait PixelProbe {
    fn is_opaque_at(&self, id: ObjectId, point: Point, tolerance: f64) -> bool;
}

/// Engine state and input handling with no dependency on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub scene: Scene,
    pub camera: Camera,
    pub config: CanvasConfig,
    /// The selected object, if any. Only its controls can be grabbed.
    pub active: Option<ObjectId>,
    /// The gesture in progress, if any.
    pub session: Option<TransformSession>,
    pub cursor: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pixel_probe: Option<Box<dyn PixelProbe>>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(CanvasConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            cursor: config.default_cursor.clone(),
            config,
            active: None,
            session: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            pixel_probe: None,
        }
    }

    pub fn set_pixel_probe(&mut self, probe: Box<dyn PixelProbe>) {
        self.pixel_probe = Some(probe);
    }

    // --- Data inputs ---

    /// Replace the scene. Any selection or gesture is dropped.
    pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) {
        self.session = None;
        self.active = None;
        self.scene.load_snapshot(objects);
        self.scene.set_viewport(self.camera.viewport_matrix());
    }

    /// Add an object to the scene.
    ///
    /// # Errors
    ///
    /// Whatever [`Scene::insert`] rejects.
    pub fn insert(&mut self, object: SceneObject) -> Result<ObjectId, SceneError> {
        self.scene.insert(object)
    }

    /// Remove an object and its descendants, ending any gesture on it.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.scene.remove(id)?;
        if self.session.as_ref().is_some_and(|s| !self.scene.contains(s.target)) {
            self.session = None;
        }
        if self.active.is_some_and(|a| !self.scene.contains(a)) {
            self.active = None;
        }
        Some(removed)
    }

    // --- Selection ---

    /// Make `id` the active object. Emits nothing when unchanged.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> Vec<Action> {
        if self.active == id {
            return Vec::new();
        }
        self.active = id;
        debug!(active = ?id, "selection changed");
        vec![Action::SelectionChanged(id), Action::RenderNeeded]
    }

    // --- Viewport ---

    /// Update viewport dimensions in CSS pixels.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Zoom keeping the scene point under `screen` fixed.
    pub fn zoom_to_point(&mut self, screen: Point, zoom: f64) -> Vec<Action> {
        self.camera.zoom_to_point(screen, zoom);
        self.sync_viewport()
    }

    /// Pan by `offset` viewport pixels.
    pub fn relative_pan(&mut self, offset: Point) -> Vec<Action> {
        self.camera.relative_pan(offset);
        self.sync_viewport()
    }

    fn sync_viewport(&mut self) -> Vec<Action> {
        self.scene.set_viewport(self.camera.viewport_matrix());
        vec![Action::RenderNeeded]
    }

    // --- Hit-testing ---

    /// Key of the active object's control under `screen`, if any. Later
    /// controls win over earlier ones.
    #[must_use]
    pub fn find_control(&self, screen: Point, kind: PointerKind) -> Option<String> {
        let obj = self.scene.get(self.active?)?;
        if !obj.visible || !obj.has_controls {
            return None;
        }
        obj.controls.iter().rev().find_map(|(key, control)| {
            let coords = obj.coords().o_coords.get(key)?;
            let corners = if kind.is_touch() { &coords.touch_corner } else { &coords.corner };
            control.should_activate(key, obj, true, screen, corners).then(|| key.to_string())
        })
    }

    /// The object under `screen` and the control grabbed on it.
    ///
    /// The active object's controls are tried first, then its box unless
    /// `preserve_object_stacking` is set, then every top-level object from
    /// the top of the stack down.
    #[must_use]
    pub fn find_target(&self, screen: Point, kind: PointerKind) -> Option<(ObjectId, Option<String>)> {
        if self.config.skip_target_find {
            return None;
        }
        if let Some(active) = self.active {
            if let Some(corner) = self.find_control(screen, kind) {
                return Some((active, Some(corner)));
            }
            if !self.config.preserve_object_stacking && self.is_hit(active, screen) {
                return Some((active, None));
            }
        }
        self.scene.root_ids().iter().rev().find(|id| self.is_hit(**id, screen)).map(|id| (*id, None))
    }

    fn is_hit(&self, id: ObjectId, screen: Point) -> bool {
        let Some(obj) = self.scene.get(id) else {
            return false;
        };
        if !obj.visible || !obj.evented || !obj.contains_point(screen, false) {
            return false;
        }
        if !(self.config.per_pixel_target_find || obj.per_pixel_target_find) {
            return true;
        }
        self.pixel_probe
            .as_ref()
            .is_none_or(|probe| probe.is_opaque_at(id, screen, self.config.target_find_tolerance))
    }

    /// Top-level objects at least partly inside the viewport.
    #[must_use]
    pub fn objects_on_screen(&self) -> Vec<ObjectId> {
        let corners = self.camera.viewport_corners(self.viewport_width, self.viewport_height);
        self.scene
            .root_ids()
            .iter()
            .copied()
            .filter(|id| self.scene.get(*id).is_some_and(|obj| obj.is_on_screen(corners.tl, corners.br)))
            .collect()
    }

    // --- Input events ---

    /// Select the object under the pointer and start a gesture on it.
    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        button: Button,
        modifiers: Modifiers,
        kind: PointerKind,
    ) -> Vec<Action> {
        if button != Button::Primary || self.session.is_some() {
            return Vec::new();
        }
        let Some((id, corner)) = self.find_target(screen, kind) else {
            return self.set_active(None);
        };
        let selectable = self.scene.get(id).is_some_and(|obj| obj.selectable);
        if !self.config.selection || !selectable {
            return self.set_active(None);
        }
        let mut actions = self.set_active(Some(id));
        actions.extend(self.start_transform(id, corner, screen, modifiers));
        actions
    }

    fn start_transform(
        &mut self,
        id: ObjectId,
        corner: Option<String>,
        screen: Point,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        let pointer = self.scene.to_parent_plane(id, self.camera.screen_to_scene(screen));
        let env = HandlerEnv { modifiers, config: &self.config, zoom: self.camera.zoom };
        let Some(obj) = self.scene.get(id) else {
            return Vec::new();
        };
        let control = corner.as_deref().and_then(|key| obj.controls.get(key));
        let action = control.map_or(ActionName::Drag, |c| c.action_name(&env, obj));
        let origin = if should_center_transform(&env, obj, action) {
            (OriginX::Center, OriginY::Center)
        } else {
            origin_from_corner(obj, corner.as_deref())
        };
        let mouse_down = control.and_then(|c| c.mouse_down_handler);
        let mut session = TransformSession::new(obj, corner, action, origin, pointer, modifiers);

        if let (Some(handler), Some(obj)) = (mouse_down, self.scene.get_mut(id)) {
            if handler(&env, &mut session, obj, pointer) {
                session.action_performed = true;
                self.scene.set_coords(id);
            }
        }

        debug!(%id, action = %action, corner = ?session.corner, "transform started");
        let actions = vec![Action::TransformStarted { id, action, corner: session.corner.clone() }];
        self.session = Some(session);
        actions
    }

    /// Apply the gesture in progress, or update the hover cursor.
    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers, kind: PointerKind) -> Vec<Action> {
        let Some(mut session) = self.session.take() else {
            let cursor = self.hover_cursor(screen, modifiers, kind);
            return self.set_cursor(cursor).into_iter().collect();
        };
        let id = session.target;
        let pointer = self.scene.to_parent_plane(id, self.camera.screen_to_scene(screen));
        let env = HandlerEnv { modifiers, config: &self.config, zoom: self.camera.zoom };
        let Some(obj) = self.scene.get_mut(id) else {
            return Vec::new();
        };
        let handler = session.action_handler;
        let changed = handler.is_some_and(|handler| handler(&env, &mut session, obj, pointer));
        session.last_pointer = pointer;

        let mut actions = Vec::new();
        if changed {
            self.scene.set_coords(id);
            session.action_performed = true;
            actions.extend(session.events.drain(..).map(Action::Transforming));
            actions.push(Action::RenderNeeded);
            if let Some(obj) = self.scene.get(id) {
                trace!(
                    %id,
                    action = %session.action,
                    left = obj.left,
                    top = obj.top,
                    angle = obj.angle,
                    "transform applied"
                );
            }
        }
        if session.action == ActionName::Drag {
            let cursor = self.move_cursor(id);
            actions.extend(self.set_cursor(cursor));
        }
        self.session = Some(session);
        actions
    }

    /// Finish the gesture in progress.
    pub fn on_pointer_up(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let Some(mut session) = self.session.take() else {
            return Vec::new();
        };
        let id = session.target;
        let pointer = self.scene.to_parent_plane(id, self.camera.screen_to_scene(screen));
        let env = HandlerEnv { modifiers, config: &self.config, zoom: self.camera.zoom };
        let mouse_up = self
            .scene
            .get(id)
            .and_then(|obj| session.corner.as_deref().and_then(|key| obj.controls.get(key)))
            .and_then(|c| c.mouse_up_handler);

        let mut actions = Vec::new();
        if let (Some(handler), Some(obj)) = (mouse_up, self.scene.get_mut(id)) {
            if handler(&env, &mut session, obj, pointer) {
                session.action_performed = true;
                self.scene.set_coords(id);
                actions.extend(session.events.drain(..).map(Action::Transforming));
            }
        }

        if session.action_performed {
            if let Some(obj) = self.scene.get(id) {
                let after = TransformSnapshot::capture(obj, session.origin_x, session.origin_y);
                actions.push(Action::ObjectModified { id, action: session.action, before: session.original, after });
            }
            actions.push(Action::RenderNeeded);
        }
        debug!(%id, action = %session.action, performed = session.action_performed, "transform ended");
        actions
    }

    /// Abandon the gesture in progress and revert its target.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let id = session.target;
        if let Some(obj) = self.scene.get_mut(id) {
            session.original.restore(obj);
        }
        self.scene.set_coords(id);
        debug!(%id, action = %session.action, "transform cancelled");
        vec![Action::TransformCancelled { id }, Action::RenderNeeded]
    }

    /// Escape cancels the gesture in progress.
    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.0 == "Escape" { self.cancel_gesture() } else { Vec::new() }
    }

    // --- Cursor ---

    fn set_cursor(&mut self, cursor: String) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor.clone_from(&cursor);
        Some(Action::SetCursor(cursor))
    }

    fn move_cursor(&self, id: ObjectId) -> String {
        self.scene
            .get(id)
            .and_then(|obj| obj.move_cursor.clone())
            .unwrap_or_else(|| self.config.move_cursor.clone())
    }

    fn hover_cursor(&self, screen: Point, modifiers: Modifiers, kind: PointerKind) -> String {
        let env = HandlerEnv { modifiers, config: &self.config, zoom: self.camera.zoom };
        let hit = self.find_target(screen, kind).and_then(|(id, corner)| Some((self.scene.get(id)?, corner)));
        match hit {
            None => self.config.default_cursor.clone(),
            Some((obj, Some(corner))) => obj
                .controls
                .get(&corner)
                .map_or_else(|| self.config.default_cursor.clone(), |c: &Control| c.cursor_style(&env, obj)),
            Some((obj, None)) => obj.hover_cursor.clone().unwrap_or_else(|| self.config.hover_cursor.clone()),
        }
    }

    // --- Queries ---

    /// The currently selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.active
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }
}

/// Whether the gesture should run around the object's center: the canvas
/// or object setting for the action, flipped while the centered key is held.
fn should_center_transform(env: &HandlerEnv<'_>, obj: &SceneObject, action: ActionName) -> bool {
    let centered = match action {
        ActionName::Scale | ActionName::ScaleX | ActionName::ScaleY | ActionName::Resizing => {
            env.config.centered_scaling || obj.centered_scaling
        }
        ActionName::Rotate => env.config.centered_rotation || obj.centered_rotation,
        _ => false,
    };
    centered != env.is_centered_toggled()
}

/// The point that stays put while a control is dragged: the opposite side or
/// corner, or the object's own origin for controls on neither side.
fn origin_from_corner(obj: &SceneObject, corner: Option<&str>) -> (OriginX, OriginY) {
    let Some(corner) = corner else {
        return (obj.origin_x, obj.origin_y);
    };
    let x = match corner {
        "ml" | "tl" | "bl" => OriginX::Right,
        "mr" | "tr" | "br" => OriginX::Left,
        _ => obj.origin_x,
    };
    let y = match corner {
        "tl" | "mt" | "tr" => OriginY::Bottom,
        "bl" | "mb" | "br" => OriginY::Top,
        _ => obj.origin_y,
    };
    (x, y)
}

// =============================================================
// Browser engine
// =============================================================

#[cfg(feature = "web")]
pub use web::Engine;

#[cfg(feature = "web")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    use super::{Action, EngineCore};
    use crate::input::{Button, Key, Modifiers, PointerKind};
    use crate::object::{ObjectId, SceneObject};
    use crate::point::Point;
    use crate::render;

    /// The full canvas engine. Wraps `EngineCore` and owns the overlay canvas
    /// the selection chrome is drawn on.
    pub struct Engine {
        canvas: HtmlCanvasElement,
        pub core: EngineCore,
    }

    impl Engine {
        /// Create a new engine bound to the given canvas element.
        #[must_use]
        pub fn new(canvas: HtmlCanvasElement) -> Self {
            Self { canvas, core: EngineCore::new() }
        }

        pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) {
            self.core.load_snapshot(objects);
        }

        pub fn set_viewport(&mut self, width_css: f64, height_css: f64) {
            self.core.set_viewport_size(width_css, height_css);
        }

        // --- Input events ---

        pub fn on_pointer_down(
            &mut self,
            screen: Point,
            button: Button,
            modifiers: Modifiers,
            kind: PointerKind,
        ) -> Vec<Action> {
            self.core.on_pointer_down(screen, button, modifiers, kind)
        }

        pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers, kind: PointerKind) -> Vec<Action> {
            self.core.on_pointer_move(screen, modifiers, kind)
        }

        pub fn on_pointer_up(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_pointer_up(screen, modifiers)
        }

        pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_key_down(key, modifiers)
        }

        // --- Render ---

        /// Clear the overlay and draw the active object's borders and
        /// controls.
        ///
        /// # Errors
        ///
        /// Fails when the canvas has no 2D context or a draw call throws.
        pub fn render(&self) -> Result<(), JsValue> {
            let mut ctx = self
                .canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from(js_sys::Error::new("2d context unavailable")))?
                .dyn_into::<CanvasRenderingContext2d>()?;
            ctx.clear_rect(0.0, 0.0, f64::from(self.canvas.width()), f64::from(self.canvas.height()));
            match self.core.selection() {
                Some(id) => render::draw_selection(&mut ctx, &self.core.scene, id),
                None => Ok(()),
            }
        }

        // --- Delegated queries ---

        #[must_use]
        pub fn selection(&self) -> Option<ObjectId> {
            self.core.selection()
        }

        #[must_use]
        pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
            self.core.object(id)
        }
    }
}
