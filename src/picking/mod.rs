//! Pointer picking: screen point to world ray to nearest registered node.

pub mod mutator;
pub mod ray;
pub mod registry;

use crate::objects::Point;
use crate::objects::camera::Camera;
use crate::picking::ray::{Ray, intersect_mesh};
use crate::scene::{NodeId, Scene};
use nalgebra::Vector2;

/// Distances closer than this count as a tie; ties keep the earlier pickable.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Pointer position in the same pixel space as [`ViewportRect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// Bounding rectangle of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> PointerEvent {
        PointerEvent {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub point: Point,
    pub distance: f64,
}

/// Maps a pointer to `[-1, 1]` on both axes with +y up. `None` for an empty viewport.
pub fn pointer_to_ndc(pointer: PointerEvent, rect: &ViewportRect) -> Option<Vector2<f64>> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    Some(Vector2::new(
        (pointer.x - rect.left) / rect.width * 2.0 - 1.0,
        -((pointer.y - rect.top) / rect.height) * 2.0 + 1.0,
    ))
}

/// Nearest pickable under the pointer, or `None`.
pub fn pick(
    pointer: PointerEvent,
    rect: &ViewportRect,
    camera: &Camera,
    scene: &Scene,
    pickables: &[NodeId],
) -> Option<PickHit> {
    let ndc = pointer_to_ndc(pointer, rect)?;
    let ray = Ray::from_camera(camera, ndc)?;
    pick_ray(&ray, scene, pickables)
}

pub fn pick_ray(ray: &Ray, scene: &Scene, pickables: &[NodeId]) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for &id in pickables {
        let Some(mesh) = scene.node(id).and_then(|node| node.mesh.as_ref()) else {
            continue;
        };
        let world = scene.world_matrix(id);
        let Some(hit) = intersect_mesh(ray, mesh, &world) else {
            continue;
        };
        let closer = best
            .as_ref()
            .is_none_or(|current| hit.distance < current.distance - TIE_TOLERANCE);
        if closer {
            best = Some(PickHit {
                node: id,
                point: hit.point,
                distance: hit.distance,
            });
        }
    }
    best
}
