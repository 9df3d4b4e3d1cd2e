use crate::assets::LoadError;
use crate::utils::math::hsl_to_rgb;
use image::{Rgb, RgbImage};
use std::fmt;
use std::ops::{Add, Mul};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_SHININESS: f32 = 30.0;

/// sRGB-encoded color with components nominally in `[0, 1]`. Shading multiplies
/// these values directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
        )
    }

    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let [r, g, b] = hsl_to_rgb(h, s, l);
        Self::new(r, g, b)
    }

    pub fn from_rgb8(rgb: Rgb<u8>) -> Self {
        Self::new(
            rgb.0[0] as f32 / 255.0,
            rgb.0[1] as f32 / 255.0,
            rgb.0[2] as f32 / 255.0,
        )
    }

    pub fn to_rgb8(self) -> Rgb<u8> {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb([channel(self.r), channel(self.g), channel(self.b)])
    }

    /// True when every component lies in `[0, 1]`.
    pub fn is_unit(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    pub fn modulate(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, k: f32) -> Color {
        Color::new(self.r * k, self.g * k, self.b * k)
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

/// Decoded image sampled with wrap-around UVs.
pub struct Texture {
    name: String,
    image: RgbImage,
}

pub type TextureRef = Arc<Texture>;

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("name", &self.name)
            .field("size", &self.image.dimensions())
            .finish()
    }
}

impl Texture {
    pub fn new(name: impl Into<String>, image: RgbImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn solid(name: impl Into<String>, color: Color) -> Self {
        Self::new(name, RgbImage::from_pixel(1, 1, color.to_rgb8()))
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let image = image::open(path)
            .map_err(|source| LoadError::Texture {
                path: path.display().to_string(),
                source,
            })?
            .to_rgb8();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, image))
    }

    /// Loads `path`, falling back to a 1x1 texture of `fallback` when it cannot be decoded.
    pub fn load_or_solid(path: &Path, fallback: Color) -> TextureRef {
        match Self::load(path) {
            Ok(texture) => {
                log::info!("Loaded texture {}", path.display());
                Arc::new(texture)
            }
            Err(e) => {
                log::error!("Error loading texture: {e}");
                Arc::new(Self::solid(path.display().to_string(), fallback))
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample(&self, u: f64, v: f64) -> Color {
        let (width, height) = self.image.dimensions();
        let u = u.rem_euclid(1.0);
        // Image rows run top to bottom, UV v runs bottom to top.
        let v = 1.0 - v.rem_euclid(1.0);
        let x = ((u * width as f64) as u32).min(width - 1);
        let y = ((v * height as f64) as u32).min(height - 1);
        Color::from_rgb8(*self.image.get_pixel(x, y))
    }
}

/// Discriminant of [`Material`], used to key the mutation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialTag {
    Untextured,
    Textured,
    BasicColor,
    BasicTextured,
    Other,
}

impl MaterialTag {
    pub const ALL: [MaterialTag; 5] = [
        MaterialTag::Untextured,
        MaterialTag::Textured,
        MaterialTag::BasicColor,
        MaterialTag::BasicTextured,
        MaterialTag::Other,
    ];

    pub fn has_texture(self) -> bool {
        matches!(self, MaterialTag::Textured | MaterialTag::BasicTextured)
    }
}

/// Surface description bound to a node's geometry.
///
/// `Untextured` and `Textured` are lit with specular highlights, the `Basic*`
/// variants are unlit. `Other` stands in for anything the mutator does not
/// know how to recolor beyond an optional flat color.
#[derive(Debug, Clone)]
pub enum Material {
    Untextured { color: Color, shininess: f32 },
    Textured { texture: TextureRef, shininess: f32 },
    BasicColor { color: Color },
    BasicTextured { texture: TextureRef },
    Other { color: Option<Color> },
}

impl Material {
    pub fn phong(color: Color) -> Self {
        Material::Untextured {
            color,
            shininess: DEFAULT_SHININESS,
        }
    }

    pub fn phong_textured(texture: TextureRef) -> Self {
        Material::Textured {
            texture,
            shininess: DEFAULT_SHININESS,
        }
    }

    pub fn tag(&self) -> MaterialTag {
        match self {
            Material::Untextured { .. } => MaterialTag::Untextured,
            Material::Textured { .. } => MaterialTag::Textured,
            Material::BasicColor { .. } => MaterialTag::BasicColor,
            Material::BasicTextured { .. } => MaterialTag::BasicTextured,
            Material::Other { .. } => MaterialTag::Other,
        }
    }

    pub fn texture(&self) -> Option<&TextureRef> {
        match self {
            Material::Textured { texture, .. } | Material::BasicTextured { texture } => {
                Some(texture)
            }
            _ => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Material::Untextured { color, .. } | Material::BasicColor { color } => Some(*color),
            Material::Other { color } => *color,
            Material::Textured { .. } | Material::BasicTextured { .. } => None,
        }
    }

    pub fn color_mut(&mut self) -> Option<&mut Color> {
        match self {
            Material::Untextured { color, .. } | Material::BasicColor { color } => Some(color),
            Material::Other { color } => color.as_mut(),
            Material::Textured { .. } | Material::BasicTextured { .. } => None,
        }
    }

    pub fn shininess(&self) -> Option<f32> {
        match self {
            Material::Untextured { shininess, .. } | Material::Textured { shininess, .. } => {
                Some(*shininess)
            }
            _ => None,
        }
    }

    /// Whether the renderer applies the light rig to this material.
    pub fn is_lit(&self) -> bool {
        matches!(
            self,
            Material::Untextured { .. } | Material::Textured { .. }
        )
    }

    /// Base color at the given UV coordinate, before lighting.
    pub fn albedo(&self, uv: Option<[f64; 2]>) -> Color {
        match (self.texture(), uv) {
            (Some(texture), Some([u, v])) => texture.sample(u, v),
            (Some(_), None) => Color::WHITE,
            (None, _) => self.color().unwrap_or(Color::WHITE),
        }
    }
}
