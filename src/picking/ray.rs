use crate::objects::Point;
use crate::objects::camera::Camera;
use crate::objects::triangle_mesh::TriangleMesh;
use crate::utils::bounds::BoundingSphere;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point,
    /// Always unit length.
    pub direction: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub point: Point,
}

impl Ray {
    /// `None` if `direction` is zero or not finite.
    pub fn new(origin: Point, direction: Vector3<f64>) -> Option<Self> {
        let direction = direction.try_normalize(EPSILON)?;
        direction.iter().all(|c| c.is_finite()).then_some(Self { origin, direction })
    }

    /// Ray from the camera position through `ndc`, using the camera's
    /// matrices as they are right now.
    pub fn from_camera(camera: &Camera, ndc: Vector2<f64>) -> Option<Self> {
        let inverse = camera.camera_matrix().try_inverse()?;
        let target = inverse.transform_point(&Point3::new(ndc.x, ndc.y, 0.5));
        Self::new(camera.pos, target - camera.pos)
    }

    pub fn at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Distance to the first point of `sphere` ahead of the origin; zero if
    /// the origin is inside.
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> Option<f64> {
        let to_center = sphere.center - self.origin;
        let along = to_center.dot(&self.direction);
        let closest_sq = to_center.norm_squared() - along * along;
        let radius_sq = sphere.radius * sphere.radius;
        if closest_sq > radius_sq {
            return None;
        }
        let half_chord = (radius_sq - closest_sq).sqrt();
        let (near, far) = (along - half_chord, along + half_chord);
        if far < 0.0 {
            None
        } else {
            Some(near.max(0.0))
        }
    }
}

/// Möller–Trumbore, hitting both faces. Returns the ray parameter, which is
/// a distance only when `direction` is unit length.
pub fn intersect_triangle(
    origin: &Point,
    direction: &Vector3<f64>,
    [a, b, c]: [Point; 3],
) -> Option<f64> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(&edge2);
    let det = edge1.dot(&p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&edge1);
    let v = direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(&q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Nearest hit of `ray` against `mesh` placed by `world`.
pub fn intersect_mesh(ray: &Ray, mesh: &TriangleMesh, world: &Matrix4<f64>) -> Option<RayHit> {
    ray.intersect_sphere(&mesh.bounding_sphere().transform(world))?;

    let inverse = world.try_inverse()?;
    let local_origin = inverse.transform_point(&ray.origin);
    let local_direction = inverse.transform_vector(&ray.direction);

    // Affine maps keep the ray parameter, so the local `t` is the world distance.
    let t = mesh
        .triangles()
        .iter()
        .filter_map(|tri| {
            intersect_triangle(&local_origin, &local_direction, mesh.triangle_points(tri))
        })
        .fold(None, |best: Option<f64>, t| match best {
            Some(best) if best <= t => Some(best),
            _ => Some(t),
        })?;

    Some(RayHit {
        distance: t,
        point: ray.at(t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::primitives::ShapeKind;

    fn camera() -> Camera {
        Camera::new(
            Point3::new(0.0, 5.0, 10.0),
            Point3::origin(),
            Vector3::y(),
            75f64.to_radians(),
            1.0,
            0.1,
            1000.0,
        )
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = camera();
        let ray = Ray::from_camera(&camera, Vector2::zeros()).unwrap();
        let expected = (Point3::origin() - camera.pos).normalize();
        assert!((ray.direction - expected).norm() < 1e-9);
        assert_eq!(ray.origin, camera.pos);
    }

    #[test]
    fn triangle_hit_from_both_sides() {
        let triangle = [
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let front = intersect_triangle(&Point::new(0.0, 0.0, 3.0), &-Vector3::z(), triangle);
        let back = intersect_triangle(&Point::new(0.0, 0.0, -2.0), &Vector3::z(), triangle);
        assert_eq!(front, Some(3.0));
        assert_eq!(back, Some(2.0));
        let miss = intersect_triangle(&Point::new(5.0, 0.0, 3.0), &-Vector3::z(), triangle);
        assert_eq!(miss, None);
    }

    #[test]
    fn sphere_behind_origin_is_missed() {
        let ray = Ray::new(Point::origin(), Vector3::z()).unwrap();
        let behind = BoundingSphere {
            center: Point::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        let ahead = BoundingSphere {
            center: Point::new(0.0, 0.0, 5.0),
            radius: 1.0,
        };
        assert_eq!(ray.intersect_sphere(&behind), None);
        assert!((ray.intersect_sphere(&ahead).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mesh_hit_accounts_for_world_transform() {
        let mesh = ShapeKind::Box.build();
        let world = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -10.0))
            * Matrix4::new_scaling(2.0);
        let ray = Ray::new(Point::new(0.3, 0.1, 0.0), -Vector3::z()).unwrap();

        let hit = intersect_mesh(&ray, &mesh, &world).unwrap();
        // scaled box front face sits at z = -9
        assert!((hit.distance - 9.0).abs() < 1e-9);
        assert!((hit.point - Point::new(0.3, 0.1, -9.0)).norm() < 1e-9);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Point::origin(), Vector3::zeros()).is_none());
    }
}
