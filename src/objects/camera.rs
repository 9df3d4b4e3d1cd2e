use nalgebra::{Matrix4, Point3, Vector3};

/// Perspective camera. Matrices are derived from the current fields on every
/// call, so readers always see the latest orientation and aspect ratio.
#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: Point3<f64>,
    pub look_at: Point3<f64>,
    up: Vector3<f64>,
    fov_radians: f64,
    aspect_ratio: f64,
    near_plane: f64,
    far_plane: f64,
}

impl Camera {
    pub fn new(
        pos: Point3<f64>,
        look_at: Point3<f64>,
        up: Vector3<f64>,
        fov_radians: f64,
        aspect_ratio: f64,
        near_plane: f64,
        far_plane: f64,
    ) -> Self {
        Camera {
            pos,
            look_at,
            up,
            fov_radians,
            aspect_ratio,
            near_plane,
            far_plane,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Non-positive or non-finite ratios are ignored.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    pub fn near_plane(&self) -> f64 {
        self.near_plane
    }

    pub fn perspective_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(
            self.aspect_ratio,
            self.fov_radians,
            self.near_plane,
            self.far_plane,
        )
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.pos, &self.look_at, &self.up)
    }

    pub fn camera_matrix(&self) -> Matrix4<f64> {
        self.perspective_matrix() * self.view_matrix()
    }
}
