pub mod z_buffer;

use crate::objects::light::{Light, LightRig};
use crate::objects::material::Color;
use crate::scene::context::SceneContext;
use crate::utils::math::lerp;
use image::RgbImage;
use nalgebra::{Point3, Vector3};

/// Strength of the specular highlight, as a gray specular color.
const SPECULAR_STRENGTH: f32 = 0.067;

/// Light arriving at one vertex, split so the diffuse part can be tinted by
/// the surface color and the specular part added on top.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexLight {
    pub diffuse: Color,
    pub specular: Color,
}

impl VertexLight {
    pub const UNLIT: VertexLight = VertexLight {
        diffuse: Color::WHITE,
        specular: Color::BLACK,
    };

    fn add(&mut self, other: VertexLight) {
        self.diffuse = self.diffuse + other.diffuse;
        self.specular = self.specular + other.specular;
    }

    pub fn apply(&self, albedo: Color) -> Color {
        albedo.modulate(self.diffuse) + self.specular
    }

    /// Barycentric blend of three vertex lights.
    pub fn blend(lights: &[VertexLight; 3], weights: [f32; 3]) -> VertexLight {
        let mix = |pick: fn(&VertexLight) -> Color| {
            pick(&lights[0]) * weights[0]
                + pick(&lights[1]) * weights[1]
                + pick(&lights[2]) * weights[2]
        };
        VertexLight {
            diffuse: mix(|l| l.diffuse),
            specular: mix(|l| l.specular),
        }
    }
}

/// Phong-style lighting of a surface point by the whole rig.
///
/// `shininess` of `None` means the material is unlit. The normal is flipped
/// toward the eye so inner faces are lit like outer ones.
pub fn shade_vertex(
    shininess: Option<f32>,
    normal: &Vector3<f64>,
    point: &Point3<f64>,
    eye: &Point3<f64>,
    lights: &LightRig,
) -> VertexLight {
    let Some(shininess) = shininess else {
        return VertexLight::UNLIT;
    };
    let view = (eye - point).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
    let normal = if normal.dot(&view) < 0.0 { -normal } else { *normal };

    let directional = |color: Color, strength: f64, to_light: Vector3<f64>| {
        let lambert = normal.dot(&to_light).max(0.0);
        if lambert <= 0.0 {
            return VertexLight::default();
        }
        let half = (to_light + view).try_normalize(f64::EPSILON).unwrap_or(normal);
        let highlight = normal.dot(&half).max(0.0).powf(shininess as f64);
        VertexLight {
            diffuse: color * (strength * lambert) as f32,
            specular: color * (strength * highlight) as f32 * SPECULAR_STRENGTH,
        }
    };

    let mut light = VertexLight::default();
    for source in lights.lights() {
        match source {
            Light::Ambient { color, intensity } => {
                light.diffuse = light.diffuse + *color * *intensity as f32;
            }
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => {
                let weight = (0.5 * normal.y + 0.5) as f32;
                light.diffuse = light.diffuse + lerp(*ground, *sky, weight) * *intensity as f32;
            }
            Light::Directional {
                color,
                intensity,
                position,
            } => {
                if let Some(to_light) = position.try_normalize(f64::EPSILON) {
                    light.add(directional(*color, *intensity, to_light));
                }
            }
            Light::Point {
                color,
                intensity,
                position,
                distance,
            } => {
                let offset = Point3::from(*position) - point;
                let d = offset.norm();
                let attenuation = if *distance > 0.0 {
                    (1.0 - d / distance).clamp(0.0, 1.0).powi(2)
                } else {
                    1.0
                };
                if let Some(to_light) = offset.try_normalize(f64::EPSILON) {
                    light.add(directional(*color, intensity * attenuation, to_light));
                }
            }
        }
    }
    light
}

pub trait Renderer {
    fn create_frame(&mut self, width: u32, height: u32, ctx: &SceneContext) -> RgbImage {
        let mut image = RgbImage::new(width, height);
        self.create_frame_mut(&mut image, ctx);
        image
    }
    fn create_frame_mut(&mut self, image: &mut RgbImage, ctx: &SceneContext);
}
