use image::Rgb;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BACKGROUND_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

// Camera settings
pub const FOV_DEGREES: f64 = 75.0;
pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 1000.0;

// Orbit controls
pub const ORBIT_DAMPING_FACTOR: f64 = 0.05;
pub const ORBIT_MIN_DISTANCE: f64 = 3.0;
pub const ORBIT_MAX_DISTANCE: f64 = 30.0;
pub const ORBIT_MAX_POLAR_ANGLE: f64 = FRAC_PI_2;
pub const ORBIT_ROTATE_SPEED: f64 = 0.7;
pub const ORBIT_ZOOM_SPEED: f64 = 1.0;

// User interaction settings
/// Wheel notches per point of egui scroll delta.
pub const SCROLL_SENSITIVITY_FACTOR: f32 = 0.02;

// Grid animation
pub const TUMBLE_BASE_SPEED: f64 = 1.0;
pub const TUMBLE_SPEED_STEP: f64 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Scene setup read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub textures: TextureConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Seed for the recolor RNG; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    /// Shapes are placed from `-half_extent` to `half_extent` on X and Z.
    #[serde(default = "default_half_extent")]
    pub half_extent: i32,
    #[serde(default = "default_spacing")]
    pub spacing: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f64; 3],
    #[serde(default)]
    pub target: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Load a model at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_obj_path")]
    pub obj: PathBuf,
    /// Defaults to the OBJ's own `mtllib`.
    #[serde(default = "default_mtl_path")]
    pub mtl: Option<PathBuf>,
    #[serde(default = "default_model_scale")]
    pub scale: f64,
    #[serde(default = "default_model_position")]
    pub position: [f64; 3],
    #[serde(default = "default_model_yaw")]
    pub yaw: f64,
    #[serde(default = "default_model_spin")]
    pub spin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureConfig {
    #[serde(default = "default_gray_texture")]
    pub gray: PathBuf,
    #[serde(default = "default_blue_texture")]
    pub blue: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_size")]
    pub width: u32,
    #[serde(default = "default_viewport_size")]
    pub height: u32,
}

fn default_half_extent() -> i32 {
    5
}

fn default_spacing() -> i32 {
    2
}

fn default_camera_position() -> [f64; 3] {
    [0.0, 5.0, 10.0]
}

fn default_true() -> bool {
    true
}

fn default_obj_path() -> PathBuf {
    PathBuf::from("obj/Goldfish_01.obj")
}

fn default_mtl_path() -> Option<PathBuf> {
    Some(PathBuf::from("obj/Goldfish_01.mtl"))
}

fn default_model_scale() -> f64 {
    50.0
}

fn default_model_position() -> [f64; 3] {
    [0.0, 0.0, -5.0]
}

fn default_model_yaw() -> f64 {
    FRAC_PI_4
}

fn default_model_spin() -> f64 {
    0.5
}

fn default_gray_texture() -> PathBuf {
    PathBuf::from("img/gray-texture.jpg")
}

fn default_blue_texture() -> PathBuf {
    PathBuf::from("img/blue-texture.jpg")
}

fn default_viewport_size() -> u32 {
    800
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_extent: default_half_extent(),
            spacing: default_spacing(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: [0.0; 3],
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            obj: default_obj_path(),
            mtl: default_mtl_path(),
            scale: default_model_scale(),
            position: default_model_position(),
            yaw: default_model_yaw(),
            spin: default_model_spin(),
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            gray: default_gray_texture(),
            blue: default_blue_texture(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_size(),
            height: default_viewport_size(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            camera: CameraConfig::default(),
            model: ModelConfig::default(),
            textures: TextureConfig::default(),
            viewport: ViewportConfig::default(),
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// X/Z coordinates of the grid, X outer, Z inner.
    pub fn grid_axis(&self) -> Vec<f64> {
        let spacing = self.grid.spacing.max(1) as usize;
        (-self.grid.half_extent..=self.grid.half_extent)
            .step_by(spacing)
            .map(f64::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config: SceneConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.model.scale, 50.0);
        assert_eq!(config.camera.position, [0.0, 5.0, 10.0]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{"grid": {"spacing": 5}, "seed": 9}"#).unwrap();
        assert_eq!(config.grid.spacing, 5);
        assert_eq!(config.grid.half_extent, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.grid_axis(), vec![-5.0, 0.0, 5.0]);
    }

    #[test]
    fn default_grid_has_six_columns() {
        let axis = SceneConfig::default().grid_axis();
        assert_eq!(axis, vec![-5.0, -3.0, -1.0, 1.0, 3.0, 5.0]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SceneConfig::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
