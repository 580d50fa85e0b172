//! Scene store: every live object, the group tree, and the viewport.
//!
//! The store owns all objects. A child names its parent through
//! `SceneObject::parent`, and a group lists its children in stacking order.
//! Top-level objects are kept in `root_ids`, bottom first.
//!
//! Anything that needs the ancestor chain lives here: cumulative matrices,
//! the parent plane of a pointer, and refreshing the coordinate cache.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::control::ControlSet;
use crate::coords::TransformKey;
use crate::matrix::Matrix;
use crate::object::{ObjectId, SceneObject};
use crate::point::Point;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("object not found: {0}")]
    UnknownObject(ObjectId),
    #[error("object is not a group: {0}")]
    NotAGroup(ObjectId),
    #[error("moving {child} into {group} would make it its own ancestor")]
    Cycle { child: ObjectId, group: ObjectId },
    #[error("singular transform on {0}")]
    Degenerate(ObjectId),
}

fn rejected<T>(err: SceneError) -> Result<T, SceneError> {
    warn!(error = %err, "scene edit rejected");
    Err(err)
}

/// In-memory store of scene objects.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    viewport: Matrix,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with an identity viewport.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new(), roots: Vec::new(), viewport: Matrix::IDENTITY }
    }

    // --- Store ---

    /// Insert an object on top of its parent's children, or of the scene when
    /// it has no parent, and compute its coordinates.
    ///
    /// An object with the same `id` is replaced and moves to the top. Children
    /// lists are managed by the scene: a replaced object keeps its children
    /// and a new object starts with none.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] if `parent` names a missing object,
    /// [`SceneError::NotAGroup`] if it names a non-group, and
    /// [`SceneError::Cycle`] if the object would parent itself.
    pub fn insert(&mut self, mut obj: SceneObject) -> Result<ObjectId, SceneError> {
        let id = obj.id;
        if let Some(parent) = obj.parent {
            if parent == id || self.is_ancestor(id, parent) {
                return rejected(SceneError::Cycle { child: id, group: parent });
            }
            match self.objects.get(&parent) {
                None => return rejected(SceneError::UnknownObject(parent)),
                Some(p) if !p.is_group() => return rejected(SceneError::NotAGroup(parent)),
                Some(_) => {}
            }
        }
        obj.children = match self.objects.get(&id) {
            Some(old) => old.children.clone(),
            None => Vec::new(),
        };
        if self.objects.contains_key(&id) {
            self.detach(id);
        }
        self.attach(id, obj.parent);
        self.objects.insert(id, obj);
        self.set_coords(id);
        Ok(id)
    }

    /// Remove an object and all of its descendants, returning the object.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        if !self.objects.contains_key(&id) {
            return None;
        }
        self.detach(id);
        self.remove_subtree(id)
    }

    fn remove_subtree(&mut self, id: ObjectId) -> Option<SceneObject> {
        let obj = self.objects.remove(&id)?;
        for child in &obj.children {
            self.remove_subtree(*child);
        }
        Some(obj)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Mutable access. Call [`set_coords`](Self::set_coords) after changing
    /// geometry; the tree fields (`parent`, `children`) must not be edited
    /// here.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Top-level objects, bottom of the stack first.
    #[must_use]
    pub fn root_ids(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Children of a group, bottom first. Empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.objects.get(&id).map(|obj| obj.children.as_slice()).unwrap_or_default()
    }

    /// Number of objects, nested ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn attach(&mut self, id: ObjectId, parent: Option<ObjectId>) {
        match parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(group) => group.children.push(id),
            None => self.roots.push(id),
        }
    }

    fn detach(&mut self, id: ObjectId) {
        let parent = self.objects.get(&id).and_then(|obj| obj.parent);
        match parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(group) => group.children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
    }

    /// Whether `ancestor` is on the parent chain of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        self.chain(id).iter().rev().skip(1).any(|obj| obj.id == ancestor)
    }

    /// `id` and its ancestors, outermost first. Stops early on a broken or
    /// cyclic parent link.
    fn chain(&self, id: ObjectId) -> Vec<&SceneObject> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(cur) = next {
            let Some(obj) = self.objects.get(&cur) else {
                break;
            };
            if chain.len() > self.objects.len() {
                break;
            }
            chain.push(obj);
            next = obj.parent;
        }
        chain.reverse();
        chain
    }

    // --- Matrices ---

    /// Transform from the object's plane into the scene plane, or into its
    /// parent's plane when `skip_parent` is set.
    ///
    /// The cumulative matrix is memoized on the object under the chain of
    /// ancestor keys, so a change anywhere up the chain is picked up on the
    /// next read.
    #[must_use]
    pub fn transform_matrix(&self, id: ObjectId, skip_parent: bool) -> Option<Matrix> {
        let obj = self.objects.get(&id)?;
        if skip_parent || obj.parent.is_none() {
            return Some(obj.own_matrix());
        }
        let chain = self.chain(id);
        let keys: Vec<TransformKey> = chain.iter().map(|o| o.transform_key()).collect();
        Some(obj.matrix_cache.get_or_compute(TransformKey::chain(&keys), || {
            chain.iter().fold(Matrix::IDENTITY, |acc, o| acc.multiply(&o.own_matrix()))
        }))
    }

    /// Cumulative matrix of the parent. `None` for top-level or unknown objects.
    #[must_use]
    pub fn parent_matrix(&self, id: ObjectId) -> Option<Matrix> {
        let parent = self.objects.get(&id)?.parent?;
        self.transform_matrix(parent, false)
    }

    /// Rotation of the object in the scene plane.
    #[must_use]
    pub fn total_angle(&self, id: ObjectId) -> Option<f64> {
        let obj = self.objects.get(&id)?;
        Some(obj.total_angle(self.parent_matrix(id).as_ref()))
    }

    /// Express a scene-plane point in the plane the object is positioned in.
    /// Top-level objects, and objects under a singular parent, get the point
    /// back unchanged.
    #[must_use]
    pub fn to_parent_plane(&self, id: ObjectId, point: Point) -> Point {
        match self.parent_matrix(id).and_then(|m| m.try_invert()) {
            Some(inverse) => point.transform(&inverse, false),
            None => point,
        }
    }

    // --- Coordinates ---

    /// Recompute the coordinate cache of `id` and its descendants.
    pub fn set_coords(&mut self, id: ObjectId) {
        self.set_coords_with(id, false);
    }

    /// [`set_coords`](Self::set_coords), optionally leaving control
    /// positions empty.
    pub fn set_coords_with(&mut self, id: ObjectId, skip_controls: bool) {
        let parent = self.parent_matrix(id);
        let viewport = self.viewport;
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        obj.coords = obj.calc_coords(parent.as_ref(), &viewport, skip_controls);
        let children = obj.children.clone();
        for child in children {
            self.set_coords_with(child, skip_controls);
        }
    }

    /// Refresh every object.
    pub fn set_all_coords(&mut self) {
        for id in self.roots.clone() {
            self.set_coords(id);
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Matrix {
        self.viewport
    }

    /// Replace the viewport matrix and refresh every object.
    pub fn set_viewport(&mut self, viewport: Matrix) {
        self.viewport = viewport;
        self.set_all_coords();
    }

    // --- Groups ---

    /// Re-express the object's own transform, currently relative to plane
    /// `from`, relative to plane `to`. Its scene-plane appearance is unchanged.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] for a missing object and
    /// [`SceneError::Degenerate`] when `to` cannot be inverted.
    pub fn send_object_to_plane(&mut self, id: ObjectId, from: &Matrix, to: &Matrix) -> Result<(), SceneError> {
        let Some(inverse) = to.try_invert() else {
            return rejected(SceneError::Degenerate(id));
        };
        let Some(obj) = self.objects.get_mut(&id) else {
            return rejected(SceneError::UnknownObject(id));
        };
        let m = inverse.multiply(from).multiply(&obj.own_matrix());
        obj.apply_transform_matrix(&m);
        Ok(())
    }

    /// Move `child` into `group` on top of its children, keeping its
    /// on-screen appearance.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`], [`SceneError::NotAGroup`],
    /// [`SceneError::Cycle`] when `group` is `child` or one of its
    /// descendants, and [`SceneError::Degenerate`] for a singular group.
    pub fn add_to_group(&mut self, child: ObjectId, group: ObjectId) -> Result<(), SceneError> {
        if !self.objects.contains_key(&child) {
            return rejected(SceneError::UnknownObject(child));
        }
        match self.objects.get(&group) {
            None => return rejected(SceneError::UnknownObject(group)),
            Some(g) if !g.is_group() => return rejected(SceneError::NotAGroup(group)),
            Some(_) => {}
        }
        if child == group || self.is_ancestor(child, group) {
            return rejected(SceneError::Cycle { child, group });
        }
        let from = self.parent_matrix(child).unwrap_or(Matrix::IDENTITY);
        let to = self.transform_matrix(group, false).unwrap_or(Matrix::IDENTITY);
        self.send_object_to_plane(child, &from, &to)?;
        self.reparent(child, Some(group));
        debug!(%child, %group, "object added to group");
        Ok(())
    }

    /// Move `child` out of its group to the top of the scene, keeping its
    /// on-screen appearance. Top-level objects are left alone.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] for a missing object.
    pub fn remove_from_group(&mut self, child: ObjectId) -> Result<(), SceneError> {
        let Some(obj) = self.objects.get(&child) else {
            return rejected(SceneError::UnknownObject(child));
        };
        if obj.parent.is_none() {
            return Ok(());
        }
        let from = self.parent_matrix(child).unwrap_or(Matrix::IDENTITY);
        self.send_object_to_plane(child, &from, &Matrix::IDENTITY)?;
        self.reparent(child, None);
        debug!(%child, "object removed from group");
        Ok(())
    }

    fn reparent(&mut self, id: ObjectId, parent: Option<ObjectId>) {
        self.detach(id);
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.parent = parent;
        }
        self.attach(id, parent);
        self.set_coords(id);
    }

    // --- Sizing ---

    /// Scale uniformly so the scene-plane bounding box is `width` wide.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] for a missing object.
    pub fn scale_to_width(&mut self, id: ObjectId, width: f64) -> Result<(), SceneError> {
        self.scale_to(id, width, |obj| (obj.bounding_rect(true).width, obj.scaled_width(), obj.width))
    }

    /// Scale uniformly so the scene-plane bounding box is `height` tall.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] for a missing object.
    pub fn scale_to_height(&mut self, id: ObjectId, height: f64) -> Result<(), SceneError> {
        self.scale_to(id, height, |obj| (obj.bounding_rect(true).height, obj.scaled_height(), obj.height))
    }

    /// `measure` returns the bounding extent, the scaled extent and the
    /// unscaled extent along one axis.
    fn scale_to(
        &mut self,
        id: ObjectId,
        value: f64,
        measure: impl Fn(&SceneObject) -> (f64, f64, f64),
    ) -> Result<(), SceneError> {
        self.set_coords_with(id, true);
        let Some(obj) = self.objects.get_mut(&id) else {
            return rejected(SceneError::UnknownObject(id));
        };
        let (bounding, scaled, base) = measure(obj);
        let factor = if scaled == 0.0 { 1.0 } else { bounding / scaled };
        obj.scale_uniform(value / base / factor);
        self.set_coords(id);
        Ok(())
    }

    // --- Snapshots ---

    /// Every object, parents before children, in stacking order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SceneObject> {
        let mut out = Vec::with_capacity(self.objects.len());
        let mut stack: Vec<ObjectId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(obj) = self.objects.get(&id) {
                out.push(obj.clone());
                stack.extend(obj.children.iter().rev().copied());
            }
        }
        out
    }

    /// Replace the whole scene.
    ///
    /// Stacking follows input order. Controls are reset to each kind's
    /// defaults. A parent link naming a missing object, a non-group, or
    /// closing a cycle is dropped and the object becomes top-level.
    pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) {
        self.objects.clear();
        self.roots.clear();

        let mut order = Vec::with_capacity(objects.len());
        let mut seen = HashSet::new();
        for mut obj in objects {
            obj.controls = ControlSet::for_kind(&obj.kind);
            obj.children.clear();
            if seen.insert(obj.id) {
                order.push(obj.id);
            }
            self.objects.insert(obj.id, obj);
        }

        for id in &order {
            let Some(parent) = self.objects.get(id).and_then(|obj| obj.parent) else {
                continue;
            };
            let valid = parent != *id && self.objects.get(&parent).is_some_and(SceneObject::is_group);
            if !valid || self.closes_cycle(*id) {
                warn!(%id, %parent, "dropping invalid parent link");
                if let Some(obj) = self.objects.get_mut(id) {
                    obj.parent = None;
                }
            }
        }

        for id in order {
            let parent = self.objects.get(&id).and_then(|obj| obj.parent);
            self.attach(id, parent);
        }
        self.set_all_coords();
        debug!(objects = self.objects.len(), "scene loaded");
    }

    /// Whether following parent links from `id` leads back to `id`.
    fn closes_cycle(&self, id: ObjectId) -> bool {
        let mut next = self.objects.get(&id).and_then(|obj| obj.parent);
        let mut steps = 0;
        while let Some(cur) = next {
            if cur == id {
                return true;
            }
            steps += 1;
            if steps > self.objects.len() {
                return false;
            }
            next = self.objects.get(&cur).and_then(|obj| obj.parent);
        }
        false
    }
}
