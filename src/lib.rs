//! Affine geometry and interactive transform engine for canvas editors.
//!
//! The crate models scene objects as boxes placed by an affine transform,
//! keeps their corner and control coordinates cached in scene and viewport
//! space, and turns pointer gestures on the selection handles into drags,
//! rotations, scales, skews and resizes. With the `web` feature it draws the
//! selection chrome onto an HTML canvas; without it everything runs headless
//! and is driven through [`engine::EngineCore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Object store, group tree and nested transform chains |
//! | [`object`] | Scene object properties, origins and dimensions |
//! | [`coords`] | Cached corner and control coordinates, geometry queries |
//! | [`control`] | Selection handles, their hit boxes and cursors |
//! | [`actions`] | What dragging each kind of handle does to the object |
//! | [`input`] | Input event types, transform sessions and snapshots |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`config`] | Canvas-level options from defaults, env or JSON |
//! | [`render`] | Drawing borders and handles through a [`render::DrawContext`] |
//! | [`point`] | 2D points and vectors |
//! | [`matrix`] | 2D affine matrices: compose, invert, decompose |
//! | [`intersection`] | Segment and polygon intersection tests |
//! | [`consts`] | Shared numeric constants (handle sizes, minimum scale, etc.) |

pub mod actions;
pub mod camera;
pub mod config;
pub mod consts;
pub mod control;
pub mod coords;
pub mod engine;
pub mod input;
pub mod intersection;
pub mod matrix;
pub mod object;
pub mod point;
pub mod render;
pub mod scene;
