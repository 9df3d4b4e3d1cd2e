//! Procedural geometry for the shape grid.
//!
//! Vertex layouts follow the usual lat/long conventions: `u` runs around the
//! shape, `v` from top to bottom, and every seam vertex is duplicated so UVs
//! stay continuous.

use crate::objects::Point;
use crate::objects::triangle_mesh::{Triangle, TriangleMesh};
use nalgebra::Vector3;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Cylinder,
        ShapeKind::Cone,
        ShapeKind::Torus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Cone => "cone",
            ShapeKind::Torus => "torus",
        }
    }

    /// Unit-sized geometry for this kind.
    pub fn build(self) -> TriangleMesh {
        match self {
            ShapeKind::Box => cuboid(1.0, 1.0, 1.0),
            ShapeKind::Sphere => sphere(0.5, 32, 32),
            ShapeKind::Cylinder => cylinder(0.5, 0.5, 1.0, 32),
            ShapeKind::Cone => cylinder(0.0, 0.5, 1.0, 32),
            ShapeKind::Torus => torus(0.5, 0.2, 16, 100),
        }
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Point>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<[f64; 2]>,
    triangles: Vec<Triangle>,
}

impl MeshBuilder {
    fn push(&mut self, position: Point, normal: Vector3<f64>, uv: [f64; 2]) -> usize {
        self.vertices.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.vertices.len() - 1
    }

    /// Two triangles over the quad `a b c d` (counter-clockwise).
    fn quad(&mut self, a: usize, b: usize, c: usize, d: usize) {
        self.triangles.push((a, b, d));
        self.triangles.push((b, c, d));
    }

    fn build(self) -> TriangleMesh {
        TriangleMesh::new(self.vertices, self.normals, self.uvs, self.triangles)
    }
}

pub fn cuboid(width: f64, height: f64, depth: f64) -> TriangleMesh {
    let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
    // (normal, u axis, v axis) per face
    let faces = [
        (Vector3::x(), -Vector3::z(), Vector3::y()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::x(), -Vector3::z()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), -Vector3::x(), Vector3::y()),
    ];

    let mut builder = MeshBuilder::default();
    for (normal, u_axis, v_axis) in faces {
        let center = normal.component_mul(&half);
        let u_extent = u_axis.component_mul(&half);
        let v_extent = v_axis.component_mul(&half);
        let corner = |su: f64, sv: f64| Point::from(center + u_extent * su + v_extent * sv);

        let a = builder.push(corner(-1.0, -1.0), normal, [0.0, 0.0]);
        let b = builder.push(corner(1.0, -1.0), normal, [1.0, 0.0]);
        let c = builder.push(corner(1.0, 1.0), normal, [1.0, 1.0]);
        let d = builder.push(corner(-1.0, 1.0), normal, [0.0, 1.0]);
        builder.triangles.push((a, b, c));
        builder.triangles.push((a, c, d));
    }
    builder.build()
}

pub fn sphere(radius: f64, width_segments: usize, height_segments: usize) -> TriangleMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut builder = MeshBuilder::default();
    let mut grid = Vec::with_capacity(height_segments + 1);

    for iy in 0..=height_segments {
        let v = iy as f64 / height_segments as f64;
        let mut row = Vec::with_capacity(width_segments + 1);
        for ix in 0..=width_segments {
            let u = ix as f64 / width_segments as f64;
            let direction = Vector3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            row.push(builder.push(Point::from(direction * radius), direction, [u, 1.0 - v]));
        }
        grid.push(row);
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                builder.triangles.push((a, b, d));
            }
            if iy != height_segments - 1 {
                builder.triangles.push((b, c, d));
            }
        }
    }
    builder.build()
}

/// Tube with flat caps; a zero top radius gives a cone.
pub fn cylinder(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: usize,
) -> TriangleMesh {
    let radial_segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let mut builder = MeshBuilder::default();

    let mut rows: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (y, row) in rows.iter_mut().enumerate() {
        let v = y as f64;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for x in 0..=radial_segments {
            let u = x as f64 / radial_segments as f64;
            let (sin, cos) = (u * TAU).sin_cos();
            let position = Point::new(radius * sin, -v * height + half_height, radius * cos);
            let normal = Vector3::new(sin, slope, cos).normalize();
            row.push(builder.push(position, normal, [u, 1.0 - v]));
        }
    }
    for x in 0..radial_segments {
        builder.quad(rows[0][x], rows[1][x], rows[1][x + 1], rows[0][x + 1]);
    }

    if radius_top > 0.0 {
        cap(&mut builder, radius_top, half_height, radial_segments);
    }
    if radius_bottom > 0.0 {
        cap(&mut builder, radius_bottom, -half_height, radial_segments);
    }
    builder.build()
}

fn cap(builder: &mut MeshBuilder, radius: f64, y: f64, radial_segments: usize) {
    let sign = y.signum();
    let normal = Vector3::new(0.0, sign, 0.0);
    let center = builder.push(Point::new(0.0, y, 0.0), normal, [0.5, 0.5]);
    let ring: Vec<usize> = (0..=radial_segments)
        .map(|x| {
            let theta = x as f64 / radial_segments as f64 * TAU;
            let (sin, cos) = theta.sin_cos();
            builder.push(
                Point::new(radius * sin, y, radius * cos),
                normal,
                [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
            )
        })
        .collect();
    for window in ring.windows(2) {
        if sign > 0.0 {
            builder.triangles.push((window[0], window[1], center));
        } else {
            builder.triangles.push((window[1], window[0], center));
        }
    }
}

pub fn torus(
    radius: f64,
    tube: f64,
    radial_segments: usize,
    tubular_segments: usize,
) -> TriangleMesh {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut builder = MeshBuilder::default();

    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f64 / tubular_segments as f64 * TAU;
            let v = j as f64 / radial_segments as f64 * TAU;
            let position = Point::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Point::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize();
            builder.push(
                position,
                normal,
                [
                    i as f64 / tubular_segments as f64,
                    j as f64 / radial_segments as f64,
                ],
            );
        }
    }

    let stride = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            builder.quad(a, b, c, d);
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &TriangleMesh) {
        assert!(!mesh.is_empty());
        let count = mesh.vertices().len();
        for &(a, b, c) in mesh.triangles() {
            assert!(a < count && b < count && c < count);
        }
        for n in mesh.normals() {
            assert!((n.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn every_shape_kind_builds() {
        for kind in ShapeKind::ALL {
            assert_well_formed(&kind.build());
        }
    }

    #[test]
    fn cuboid_spans_its_extent() {
        let mesh = cuboid(1.0, 2.0, 3.0);
        assert_eq!(mesh.vertices().len(), 24);
        assert_eq!(mesh.triangles().len(), 12);
        let max_y = mesh.vertices().iter().map(|v| v.y).fold(f64::MIN, f64::max);
        let min_z = mesh.vertices().iter().map(|v| v.z).fold(f64::MAX, f64::min);
        assert!((max_y - 1.0).abs() < 1e-12);
        assert!((min_z + 1.5).abs() < 1e-12);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere(0.5, 8, 6);
        for v in mesh.vertices() {
            assert!((v.coords.norm() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn cone_has_single_cap() {
        let cone = cylinder(0.0, 0.5, 1.0, 8);
        let tube = cylinder(0.5, 0.5, 1.0, 8);
        // one cap = centre vertex + ring of segments + 1
        assert_eq!(tube.vertices().len() - cone.vertices().len(), 10);
    }
}
