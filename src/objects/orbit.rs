use crate::config::{
    ORBIT_DAMPING_FACTOR, ORBIT_MAX_DISTANCE, ORBIT_MAX_POLAR_ANGLE, ORBIT_MIN_DISTANCE,
    ORBIT_ROTATE_SPEED, ORBIT_ZOOM_SPEED,
};
use crate::objects::camera::Camera;
use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};

const POLAR_EPSILON: f64 = 1e-6;
const CONVERGED: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Spherical {
    radius: f64,
    /// Polar angle from +Y.
    phi: f64,
    /// Azimuth around +Y, measured from +Z.
    theta: f64,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f64>) -> Self {
        let radius = offset.norm();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f64> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Damped orbit around a target point: drags queue angular deltas, the
/// wheel queues a dolly factor, and [`OrbitControls::update`] eases the
/// camera toward them once per frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f64>,
    pub damping_factor: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_polar_angle: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pending_theta: f64,
    pending_phi: f64,
    pending_scale: f64,
}

impl OrbitControls {
    pub fn new(target: Point3<f64>) -> Self {
        Self {
            target,
            damping_factor: ORBIT_DAMPING_FACTOR,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            max_polar_angle: ORBIT_MAX_POLAR_ANGLE,
            rotate_speed: ORBIT_ROTATE_SPEED,
            zoom_speed: ORBIT_ZOOM_SPEED,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.pending_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.pending_phi -= angle;
    }

    /// A drag across the full viewport height turns the camera one revolution
    /// (scaled by `rotate_speed`).
    pub fn rotate_by_pixels(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        if viewport_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * dx / viewport_height * self.rotate_speed);
        self.rotate_up(TAU * dy / viewport_height * self.rotate_speed);
    }

    fn zoom_scale(&self, steps: f64) -> f64 {
        0.95f64.powf(self.zoom_speed * steps)
    }

    /// Moves toward the target by `steps` wheel notches.
    pub fn dolly_in(&mut self, steps: f64) {
        self.pending_scale *= self.zoom_scale(steps);
    }

    pub fn dolly_out(&mut self, steps: f64) {
        self.pending_scale /= self.zoom_scale(steps);
    }

    pub fn is_settled(&self) -> bool {
        self.pending_theta.abs() < CONVERGED
            && self.pending_phi.abs() < CONVERGED
            && (self.pending_scale - 1.0).abs() < CONVERGED
    }

    /// Applies one damped step to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.pos - self.target;
        let mut spherical = Spherical::from_offset(&offset);

        spherical.theta += self.pending_theta * self.damping_factor;
        spherical.phi += self.pending_phi * self.damping_factor;
        spherical.phi = spherical
            .phi
            .clamp(0.0, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius =
            (spherical.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        let new_pos = self.target + spherical.to_offset();
        let moved = (new_pos - camera.pos).norm() > CONVERGED;
        camera.pos = new_pos;
        camera.look_at = self.target;

        self.pending_theta *= 1.0 - self.damping_factor;
        self.pending_phi *= 1.0 - self.damping_factor;
        self.pending_scale = 1.0;

        moved
    }
}
