//! Binds UI inputs to light parameters and echoes the applied value back.

use crate::objects::light::{LightField, LightKind, LightParam, LightRig};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("no input control registered for `{0}`")]
    MissingControl(ControlKey),
    #[error("no display registered for `{0}`")]
    MissingDisplay(ControlKey),
    #[error("light rig has no {kind:?} light for `{key}`")]
    MissingLight { key: ControlKey, kind: LightKind },
    #[error("`{key}` is not bound to a light")]
    Unbound { key: ControlKey },
    #[error("`{raw}` is not a valid value for `{key}`")]
    InvalidInput { key: ControlKey, raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKey {
    AmbientIntensity,
    DirectionalIntensity,
    DirectionalX,
    DirectionalY,
    DirectionalZ,
    PointIntensity,
    HemisphereIntensity,
}

impl ControlKey {
    pub const ALL: [ControlKey; 7] = [
        ControlKey::AmbientIntensity,
        ControlKey::DirectionalIntensity,
        ControlKey::DirectionalX,
        ControlKey::DirectionalY,
        ControlKey::DirectionalZ,
        ControlKey::PointIntensity,
        ControlKey::HemisphereIntensity,
    ];

    /// Stable identifier, also used as the egui id salt.
    pub fn id(self) -> &'static str {
        match self {
            ControlKey::AmbientIntensity => "ambient-intensity",
            ControlKey::DirectionalIntensity => "directional-intensity",
            ControlKey::DirectionalX => "directional-x",
            ControlKey::DirectionalY => "directional-y",
            ControlKey::DirectionalZ => "directional-z",
            ControlKey::PointIntensity => "point-intensity",
            ControlKey::HemisphereIntensity => "hemisphere-intensity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlKey::AmbientIntensity => "Ambient intensity",
            ControlKey::DirectionalIntensity => "Directional intensity",
            ControlKey::DirectionalX => "Directional X",
            ControlKey::DirectionalY => "Directional Y",
            ControlKey::DirectionalZ => "Directional Z",
            ControlKey::PointIntensity => "Point intensity",
            ControlKey::HemisphereIntensity => "Hemisphere intensity",
        }
    }

    fn target(self) -> (LightKind, LightField) {
        match self {
            ControlKey::AmbientIntensity => (LightKind::Ambient, LightField::Intensity),
            ControlKey::DirectionalIntensity => (LightKind::Directional, LightField::Intensity),
            ControlKey::DirectionalX => (LightKind::Directional, LightField::PositionX),
            ControlKey::DirectionalY => (LightKind::Directional, LightField::PositionY),
            ControlKey::DirectionalZ => (LightKind::Directional, LightField::PositionZ),
            ControlKey::PointIntensity => (LightKind::Point, LightField::Intensity),
            ControlKey::HemisphereIntensity => (LightKind::Hemisphere, LightField::Intensity),
        }
    }

    pub fn limits(self) -> ControlLimits {
        match self {
            ControlKey::AmbientIntensity
            | ControlKey::PointIntensity
            | ControlKey::HemisphereIntensity => ControlLimits::BOUNDED_INTENSITY,
            ControlKey::DirectionalIntensity => ControlLimits::INTENSITY,
            ControlKey::DirectionalX | ControlKey::DirectionalY | ControlKey::DirectionalZ => {
                ControlLimits::POSITION
            }
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Accepted range and display format of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    pub min: f64,
    pub max: f64,
    pub decimals: usize,
    /// Range offered by the slider; `min..=max` may be wider.
    pub slider_min: f64,
    pub slider_max: f64,
    pub step: f64,
}

impl ControlLimits {
    pub const BOUNDED_INTENSITY: ControlLimits = ControlLimits {
        min: 0.0,
        max: 2.0,
        decimals: 2,
        slider_min: 0.0,
        slider_max: 2.0,
        step: 0.01,
    };

    pub const INTENSITY: ControlLimits = ControlLimits {
        min: 0.0,
        max: f64::INFINITY,
        decimals: 2,
        slider_min: 0.0,
        slider_max: 2.0,
        step: 0.01,
    };

    pub const POSITION: ControlLimits = ControlLimits {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
        decimals: 1,
        slider_min: -10.0,
        slider_max: 10.0,
        step: 0.1,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn format(&self, value: f64) -> String {
        format!("{value:.*}", self.decimals)
    }

    pub fn slider_range(&self) -> RangeInclusive<f64> {
        self.slider_min..=self.slider_max
    }
}

/// Where raw input comes from and where the display text goes.
pub trait ControlSurface {
    /// Current value of the input control for `key`.
    fn input_mut(&mut self, key: ControlKey) -> Option<&mut f64>;
    /// Read-only text shown next to the control.
    fn display_mut(&mut self, key: ControlKey) -> Option<&mut String>;
}

/// In-memory control surface; the egui panel draws from it.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    inputs: BTreeMap<ControlKey, f64>,
    displays: BTreeMap<ControlKey, String>,
}

impl ControlPanel {
    /// A panel with an input and a display for every [`ControlKey`].
    pub fn with_all_controls() -> Self {
        let mut panel = Self::default();
        for key in ControlKey::ALL {
            panel.add_control(key);
        }
        panel
    }

    pub fn add_control(&mut self, key: ControlKey) {
        self.inputs.insert(key, 0.0);
        self.displays.insert(key, String::new());
    }

    pub fn remove_input(&mut self, key: ControlKey) {
        self.inputs.remove(&key);
    }

    pub fn remove_display(&mut self, key: ControlKey) {
        self.displays.remove(&key);
    }

    pub fn input(&self, key: ControlKey) -> Option<f64> {
        self.inputs.get(&key).copied()
    }

    pub fn display(&self, key: ControlKey) -> Option<&str> {
        self.displays.get(&key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = ControlKey> + '_ {
        self.inputs.keys().copied()
    }
}

impl ControlSurface for ControlPanel {
    fn input_mut(&mut self, key: ControlKey) -> Option<&mut f64> {
        self.inputs.get_mut(&key)
    }

    fn display_mut(&mut self, key: ControlKey) -> Option<&mut String> {
        self.displays.get_mut(&key)
    }
}

/// Keeps each bound light parameter, its input and its display in step.
#[derive(Debug, Clone)]
pub struct LightRigController {
    bindings: BTreeMap<ControlKey, LightParam>,
}

impl LightRigController {
    /// Binds every [`ControlKey`] and seeds inputs and displays from the rig.
    /// Fails on the first control, display or light that is missing.
    pub fn bind(rig: &LightRig, surface: &mut impl ControlSurface) -> Result<Self, ControlError> {
        let mut bindings = BTreeMap::new();
        for key in ControlKey::ALL {
            let (kind, field) = key.target();
            let light = rig
                .find(kind)
                .ok_or(ControlError::MissingLight { key, kind })?;
            let param = LightParam { light, field };
            let value = rig
                .param(param)
                .ok_or(ControlError::MissingLight { key, kind })?;

            *surface
                .input_mut(key)
                .ok_or(ControlError::MissingControl(key))? = value;
            *surface
                .display_mut(key)
                .ok_or(ControlError::MissingDisplay(key))? = key.limits().format(value);
            bindings.insert(key, param);
        }
        log::debug!("Bound {} light controls", bindings.len());
        Ok(Self { bindings })
    }

    /// Handles one input event. On success the light, the input and the
    /// display all hold the clamped value, which is returned.
    pub fn on_input(
        &self,
        rig: &mut LightRig,
        surface: &mut impl ControlSurface,
        key: ControlKey,
        raw: &str,
    ) -> Result<f64, ControlError> {
        let param = *self.bindings.get(&key).ok_or(ControlError::Unbound { key })?;
        let parsed = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| !value.is_nan())
            .ok_or_else(|| ControlError::InvalidInput {
                key,
                raw: raw.to_string(),
            })?;

        let limits = key.limits();
        let value = limits.clamp(parsed);
        if !value.is_finite() {
            return Err(ControlError::InvalidInput {
                key,
                raw: raw.to_string(),
            });
        }
        // nothing is written unless the display can follow
        if surface.display_mut(key).is_none() {
            return Err(ControlError::MissingDisplay(key));
        }
        let applied = rig
            .set_param(param, value)
            .ok_or(ControlError::Unbound { key })?;

        if let Some(input) = surface.input_mut(key) {
            *input = applied;
        }
        if let Some(display) = surface.display_mut(key) {
            *display = limits.format(applied);
        }
        Ok(applied)
    }

    pub fn param(&self, key: ControlKey) -> Option<LightParam> {
        self.bindings.get(&key).copied()
    }
}
