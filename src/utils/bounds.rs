use nalgebra::{Matrix4, Point3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.0,
        }
    }
}

impl BoundingSphere {
    /// Sphere centered on the AABB of `points`, large enough to hold all of them.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let (min, max) = points.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        let center = nalgebra::center(&min, &max);
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max);

        Self { center, radius }
    }

    pub fn transform(&self, matrix: &Matrix4<f64>) -> BoundingSphere {
        let center = matrix.transform_point(&self.center);
        let max_scale = (0..3)
            .map(|column| matrix.fixed_view::<3, 1>(0, column).norm())
            .fold(0.0, f64::max);

        BoundingSphere {
            center,
            radius: self.radius * max_scale,
        }
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (point - self.center).norm() <= self.radius + 1e-9
    }
}
