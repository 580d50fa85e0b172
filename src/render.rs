//! Rendering of selection chrome: borders, connecting lines and control
//! handles.
//!
//! Everything draws in viewport pixels through the [`DrawContext`] trait, so
//! the same code paints into a browser canvas (behind the `web` feature) or a
//! recording context in tests. Object fills and strokes are the host's
//! business; this module only draws what an active object needs for editing.
//!
//! Fallible context calls propagate through `Result<(), C::Error>`.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::TWO_PI;
use crate::control::Control;
use crate::object::{CornerStyle, ObjectId, SceneObject};
use crate::point::Point;
use crate::scene::Scene;

/// Border stroke width in viewport pixels.
const BORDER_LINE_WIDTH_PX: f64 = 1.0;

/// The subset of the Canvas 2D API the renderer needs.
pub trait DrawContext {
    type Error;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, radians: f64) -> Result<(), Self::Error>;
    fn scale(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

// =============================================================
// Controls
// =============================================================

/// Per-call overrides for how handles look. Unset fields fall back to the
/// object's own corner settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlStyle {
    pub corner_size: Option<f64>,
    pub corner_style: Option<CornerStyle>,
    pub corner_color: Option<String>,
    pub corner_stroke_color: Option<String>,
    pub transparent_corners: Option<bool>,
}

struct HandleStyle {
    size_x: f64,
    size_y: f64,
    transparent: bool,
    fill: String,
    stroke: String,
    /// Stroke an outline over the opaque handle.
    outlined: bool,
}

fn handle_style(control: &Control, obj: &SceneObject, overrides: &ControlStyle) -> HandleStyle {
    let corner_size = overrides.corner_size.unwrap_or(obj.corner_size);
    let transparent = overrides.transparent_corners.unwrap_or(obj.transparent_corners);
    let fill = overrides.corner_color.clone().unwrap_or_else(|| obj.corner_color.clone());
    let stroke_color = overrides.corner_stroke_color.as_deref().unwrap_or(&obj.corner_stroke_color);
    let outlined = !transparent && !stroke_color.is_empty();
    HandleStyle {
        size_x: control.size_x.unwrap_or(corner_size),
        size_y: control.size_y.unwrap_or(corner_size),
        transparent,
        stroke: if outlined { stroke_color.to_string() } else { fill.clone() },
        fill,
        outlined,
    }
}

fn set_handle_colors<C: DrawContext>(ctx: &mut C, style: &HandleStyle) {
    ctx.set_fill_style(&style.fill);
    ctx.set_stroke_style(&style.stroke);
}

/// Round handle centered at `left, top`. Unequal sizes draw an ellipse.
///
/// # Errors
///
/// Propagates any failure from the drawing context.
pub fn render_circle_control<C: DrawContext>(
    ctx: &mut C,
    left: f64,
    top: f64,
    control: &Control,
    obj: &SceneObject,
    overrides: &ControlStyle,
) -> Result<(), C::Error> {
    let style = handle_style(control, obj, overrides);
    ctx.save();
    set_handle_colors(ctx, &style);

    let (mut x, mut y) = (left, top);
    let size = if style.size_x > style.size_y {
        ctx.scale(1.0, style.size_y / style.size_x)?;
        y = top * style.size_x / style.size_y;
        style.size_x
    } else if style.size_y > style.size_x {
        ctx.scale(style.size_x / style.size_y, 1.0)?;
        x = left * style.size_y / style.size_x;
        style.size_y
    } else {
        style.size_x
    };

    ctx.begin_path();
    ctx.arc(x, y, size / 2.0, 0.0, TWO_PI)?;
    if style.transparent {
        ctx.stroke();
    } else {
        ctx.fill();
    }
    if style.outlined {
        ctx.stroke();
    }
    ctx.restore();
    Ok(())
}

/// Square handle centered at `left, top`, turned with the object.
///
/// # Errors
///
/// Propagates any failure from the drawing context.
pub fn render_square_control<C: DrawContext>(
    ctx: &mut C,
    left: f64,
    top: f64,
    control: &Control,
    obj: &SceneObject,
    overrides: &ControlStyle,
) -> Result<(), C::Error> {
    let style = handle_style(control, obj, overrides);
    let (half_x, half_y) = (style.size_x / 2.0, style.size_y / 2.0);
    ctx.save();
    set_handle_colors(ctx, &style);
    ctx.translate(left, top)?;
    ctx.rotate((obj.coords().total_angle + control.angle).to_radians())?;
    if style.transparent {
        ctx.stroke_rect(-half_x, -half_y, style.size_x, style.size_y);
    } else {
        ctx.fill_rect(-half_x, -half_y, style.size_x, style.size_y);
    }
    if style.outlined {
        ctx.stroke_rect(-half_x, -half_y, style.size_x, style.size_y);
    }
    ctx.restore();
    Ok(())
}

/// Every visible control of `obj` at its cached position, in the object's
/// own corner style.
///
/// # Errors
///
/// Propagates any failure from the drawing context.
pub fn draw_controls<C: DrawContext>(ctx: &mut C, obj: &SceneObject) -> Result<(), C::Error> {
    for (key, control) in obj.controls.iter() {
        if !control.visibility(obj, key) {
            continue;
        }
        if let Some(coords) = obj.coords().o_coords.get(key) {
            control.render(ctx, coords.position.x, coords.position.y, &ControlStyle::default(), obj)?;
        }
    }
    Ok(())
}

// =============================================================
// Borders
// =============================================================

/// Box outline of `size` centered at `center`, rotated by `angle` degrees,
/// plus the lines out to any connected controls.
///
/// # Errors
///
/// Propagates any failure from the drawing context.
pub fn draw_borders<C: DrawContext>(
    ctx: &mut C,
    obj: &SceneObject,
    center: Point,
    angle: f64,
    size: Point,
) -> Result<(), C::Error> {
    ctx.save();
    ctx.set_stroke_style(&obj.border_color);
    ctx.set_line_width(BORDER_LINE_WIDTH_PX);
    ctx.translate(center.x, center.y)?;
    ctx.rotate(angle.to_radians())?;
    ctx.stroke_rect(-size.x / 2.0, -size.y / 2.0, size.x, size.y);
    if obj.has_controls {
        draw_connecting_lines(ctx, obj, size);
    }
    ctx.restore();
    Ok(())
}

fn draw_connecting_lines<C: DrawContext>(ctx: &mut C, obj: &SceneObject, size: Point) {
    let mut any = false;
    ctx.begin_path();
    for (key, control) in obj.controls.iter() {
        if control.with_connection && control.visibility(obj, key) {
            any = true;
            let from = Point::new(control.x * size.x, control.y * size.y);
            ctx.move_to(from.x, from.y);
            ctx.line_to(from.x + control.offset_x, from.y + control.offset_y);
        }
    }
    if any {
        ctx.stroke();
    }
}

/// Borders and controls for the object `id`, as configured on the object.
/// Does nothing for an unknown id.
///
/// # Errors
///
/// Propagates any failure from the drawing context.
pub fn draw_selection<C: DrawContext>(ctx: &mut C, scene: &Scene, id: ObjectId) -> Result<(), C::Error> {
    let Some(obj) = scene.get(id) else {
        return Ok(());
    };
    let parent = scene.parent_matrix(id);
    let viewport = scene.viewport();
    if obj.has_borders {
        let center = obj.center_point(parent.as_ref()).transform(&viewport, false);
        let size = obj.current_dimensions(parent.as_ref(), &viewport);
        draw_borders(ctx, obj, center, obj.coords().total_angle, size)?;
    }
    if obj.has_controls {
        draw_controls(ctx, obj)?;
    }
    Ok(())
}

// =============================================================
// Browser canvas
// =============================================================

#[cfg(feature = "web")]
mod web {
    use wasm_bindgen::JsValue;
    use web_sys::CanvasRenderingContext2d;

    use super::DrawContext;

    impl DrawContext for CanvasRenderingContext2d {
        type Error = JsValue;

        fn save(&mut self) {
            CanvasRenderingContext2d::save(self);
        }

        fn restore(&mut self) {
            CanvasRenderingContext2d::restore(self);
        }

        fn translate(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
            CanvasRenderingContext2d::translate(self, x, y)
        }

        fn rotate(&mut self, radians: f64) -> Result<(), JsValue> {
            CanvasRenderingContext2d::rotate(self, radians)
        }

        fn scale(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
            CanvasRenderingContext2d::scale(self, x, y)
        }

        fn set_fill_style(&mut self, color: &str) {
            self.set_fill_style_str(color);
        }

        fn set_stroke_style(&mut self, color: &str) {
            self.set_stroke_style_str(color);
        }

        fn set_line_width(&mut self, width: f64) {
            CanvasRenderingContext2d::set_line_width(self, width);
        }

        fn begin_path(&mut self) {
            CanvasRenderingContext2d::begin_path(self);
        }

        fn move_to(&mut self, x: f64, y: f64) {
            CanvasRenderingContext2d::move_to(self, x, y);
        }

        fn line_to(&mut self, x: f64, y: f64) {
            CanvasRenderingContext2d::line_to(self, x, y);
        }

        fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), JsValue> {
            CanvasRenderingContext2d::arc(self, x, y, radius, start, end)
        }

        fn fill(&mut self) {
            CanvasRenderingContext2d::fill(self);
        }

        fn stroke(&mut self) {
            CanvasRenderingContext2d::stroke(self);
        }

        fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
            CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
        }

        fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
            CanvasRenderingContext2d::stroke_rect(self, x, y, width, height);
        }
    }
}
