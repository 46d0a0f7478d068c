//! # Transform — Local and World Matrices
//!
//! A [`Transform`] holds position, scale, rotation, skew and a pivot, plus the
//! cached local and world matrices derived from them.
//!
//! ```text
//! local = T(position + pivot) · R(rotation) · K(skew) · S(scale) · T(-pivot)
//! world = parent.world · local          (identity above top-level nodes)
//! ```
//!
//! The pivot is the local origin for rotation, skew and scale, so a rect with
//! pivot `(w/2, h/2)` spins about its centre.
//!
//! ## Dirty Chaining
//!
//! Every setter raises the transform's dirty flag. [`propagate`] walks the
//! display list top-down and recomputes an entity only when its own flag is
//! set, its parent was recomputed this pass, or it was re-parented since the
//! last pass. Everything else reuses last frame's matrix, so an unchanged
//! subtree costs a lookup per node and nothing more. A recomputed entity also
//! marks its bounding box dirty for the following bounds pass.
//!
//! Entities without a `Transform` pass their parent's world matrix through
//! unchanged.

use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::error::EcsError;
use crate::math::{Affine2, Mat2, Vec2};

#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec2,
    scale: Vec2,
    rotation: f32,
    skew: Vec2,
    pivot: Vec2,
    local: Affine2,
    world: Affine2,
    dirty: bool,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
        skew: Vec2::ZERO,
        pivot: Vec2::ZERO,
        local: Affine2::IDENTITY,
        world: Affine2::IDENTITY,
        dirty: true,
    };

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.set_scale(scale);
        self
    }

    /// Rotation in radians, clockwise in a y-down surface.
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.set_rotation(radians);
        self
    }

    /// Skew angles in radians along x and y.
    pub fn with_skew(mut self, skew: Vec2) -> Self {
        self.set_skew(skew);
        self
    }

    pub fn with_pivot(mut self, pivot: Vec2) -> Self {
        self.set_pivot(pivot);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.dirty = true;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty = true;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.dirty = true;
    }

    pub fn skew(&self) -> Vec2 {
        self.skew
    }

    pub fn set_skew(&mut self, skew: Vec2) {
        self.skew = skew;
        self.dirty = true;
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
        self.dirty = true;
    }

    /// Whether an input changed since the last transform pass.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Local matrix as of the last transform pass.
    pub fn local_matrix(&self) -> Affine2 {
        self.local
    }

    /// World matrix as of the last transform pass.
    pub fn world_matrix(&self) -> Affine2 {
        self.world
    }

    /// The world matrix as the six canvas `setTransform` values
    /// `[a, b, c, d, e, f]`.
    pub fn canvas_transform(&self) -> [f32; 6] {
        self.world.to_cols_array()
    }

    /// Build the local matrix from the current fields.
    pub fn compute_local(&self) -> Affine2 {
        let skew = if self.skew == Vec2::ZERO {
            Mat2::IDENTITY
        } else {
            Mat2::from_cols(
                Vec2::new(1.0, self.skew.y.tan()),
                Vec2::new(self.skew.x.tan(), 1.0),
            )
        };
        let linear = Mat2::from_angle(self.rotation) * skew * Mat2::from_diagonal(self.scale);
        Affine2::from_translation(self.position + self.pivot)
            * Affine2::from_mat2(linear)
            * Affine2::from_translation(-self.pivot)
    }

    /// Refresh both matrices against `parent` and clear the dirty flag.
    pub(crate) fn recompute(&mut self, parent: &Affine2) {
        self.local = self.compute_local();
        self.world = *parent * self.local;
        self.dirty = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Top-down transform pass. Returns how many entities were recomputed.
pub fn propagate(world: &mut World) -> Result<usize, EcsError> {
    let World {
        scene,
        store,
        spatial,
        ..
    } = world;
    let mut recomputed = 0usize;

    scene.for_each(
        (Affine2::IDENTITY, false),
        false,
        |entity, _parent, &(parent_world, parent_dirty)| {
            let forced = spatial.is_forced(entity);
            match store.get_mut::<Transform>(entity) {
                Some(transform) => {
                    let dirty = transform.dirty || parent_dirty || forced;
                    if dirty {
                        transform.recompute(&parent_world);
                        spatial.set_matrix(entity, transform.world);
                        recomputed += 1;
                    }
                    (transform.world, dirty)
                }
                None => {
                    let dirty = parent_dirty || forced || spatial.matrix(entity).is_none();
                    if dirty {
                        spatial.set_matrix(entity, parent_world);
                        recomputed += 1;
                    }
                    (parent_world, dirty)
                }
            }
        },
    )?;

    spatial.clear_forced();
    if recomputed > 0 {
        log::trace!("transform pass: {recomputed} entities recomputed");
    }
    Ok(recomputed)
}

/// The built-in transform pass as a [`System`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformSystem;

impl System for TransformSystem {
    fn run(&mut self, world: &mut World) -> Result<(), EcsError> {
        propagate(world).map(|_| ())
    }
}
