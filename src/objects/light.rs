use crate::objects::material::Color;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Ambient,
    Directional,
    Hemisphere,
    Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f64,
    },
    /// Shines from `position` toward the origin.
    Directional {
        color: Color,
        intensity: f64,
        position: Vector3<f64>,
    },
    /// Blends from `ground` (facing down) to `sky` (facing up).
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f64,
    },
    /// Falls off to zero at `distance`; a zero distance means no falloff.
    Point {
        color: Color,
        intensity: f64,
        position: Vector3<f64>,
        distance: f64,
    },
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Light::Ambient { .. } => LightKind::Ambient,
            Light::Directional { .. } => LightKind::Directional,
            Light::Hemisphere { .. } => LightKind::Hemisphere,
            Light::Point { .. } => LightKind::Point,
        }
    }

    pub fn intensity(&self) -> f64 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Hemisphere { intensity, .. }
            | Light::Point { intensity, .. } => *intensity,
        }
    }

    fn intensity_mut(&mut self) -> &mut f64 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Hemisphere { intensity, .. }
            | Light::Point { intensity, .. } => intensity,
        }
    }

    pub fn position(&self) -> Option<&Vector3<f64>> {
        match self {
            Light::Directional { position, .. } | Light::Point { position, .. } => Some(position),
            Light::Ambient { .. } | Light::Hemisphere { .. } => None,
        }
    }

    fn position_mut(&mut self) -> Option<&mut Vector3<f64>> {
        match self {
            Light::Directional { position, .. } | Light::Point { position, .. } => Some(position),
            Light::Ambient { .. } | Light::Hemisphere { .. } => None,
        }
    }
}

/// Index of a light inside its [`LightRig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Intensity,
    PositionX,
    PositionY,
    PositionZ,
}

/// One scalar parameter of one light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightParam {
    pub light: LightId,
    pub field: LightField,
}

#[derive(Debug, Clone, Default)]
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ambient, directional, point and hemisphere lights at their start values.
    pub fn standard() -> Self {
        let mut rig = Self::new();
        rig.add(Light::Ambient {
            color: Color::from_hex(0x404040),
            intensity: 1.0,
        });
        rig.add(Light::Directional {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vector3::new(5.0, 5.0, 5.0),
        });
        rig.add(Light::Point {
            color: Color::from_hex(0xff0000),
            intensity: 1.0,
            position: Vector3::new(-5.0, 5.0, -5.0),
            distance: 100.0,
        });
        rig.add(Light::Hemisphere {
            sky: Color::from_hex(0xffffbb),
            ground: Color::from_hex(0x080820),
            intensity: 1.0,
        });
        rig
    }

    pub fn add(&mut self, light: Light) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn get(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    /// First light of the given kind.
    pub fn find(&self, kind: LightKind) -> Option<LightId> {
        self.lights
            .iter()
            .position(|light| light.kind() == kind)
            .map(LightId)
    }

    pub fn param(&self, param: LightParam) -> Option<f64> {
        let light = self.get(param.light)?;
        match param.field {
            LightField::Intensity => Some(light.intensity()),
            LightField::PositionX => light.position().map(|p| p.x),
            LightField::PositionY => light.position().map(|p| p.y),
            LightField::PositionZ => light.position().map(|p| p.z),
        }
    }

    /// Writes `value` into the parameter. Intensities never go below zero.
    /// Returns the stored value, or `None` if the light lacks that field.
    pub fn set_param(&mut self, param: LightParam, value: f64) -> Option<f64> {
        let light = self.lights.get_mut(param.light.0)?;
        let slot = match param.field {
            LightField::Intensity => {
                let intensity = light.intensity_mut();
                *intensity = value.max(0.0);
                return Some(*intensity);
            }
            LightField::PositionX => &mut light.position_mut()?.x,
            LightField::PositionY => &mut light.position_mut()?.y,
            LightField::PositionZ => &mut light.position_mut()?.z,
        };
        *slot = value;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rig_has_one_of_each() {
        let rig = LightRig::standard();
        for kind in [
            LightKind::Ambient,
            LightKind::Directional,
            LightKind::Hemisphere,
            LightKind::Point,
        ] {
            assert!(rig.find(kind).is_some(), "{kind:?} missing");
        }
        assert_eq!(rig.lights().len(), 4);
    }

    #[test]
    fn intensity_is_floored_at_zero() {
        let mut rig = LightRig::standard();
        let ambient = rig.find(LightKind::Ambient).unwrap();
        let param = LightParam {
            light: ambient,
            field: LightField::Intensity,
        };
        assert_eq!(rig.set_param(param, -3.0), Some(0.0));
        assert_eq!(rig.param(param), Some(0.0));
    }

    #[test]
    fn position_fields_only_exist_on_positioned_lights() {
        let mut rig = LightRig::standard();
        let directional = rig.find(LightKind::Directional).unwrap();
        let hemisphere = rig.find(LightKind::Hemisphere).unwrap();

        let x = LightParam {
            light: directional,
            field: LightField::PositionX,
        };
        assert_eq!(rig.param(x), Some(5.0));
        assert_eq!(rig.set_param(x, -12.5), Some(-12.5));
        assert_eq!(rig.get(directional).unwrap().position().unwrap().x, -12.5);

        let missing = LightParam {
            light: hemisphere,
            field: LightField::PositionY,
        };
        assert_eq!(rig.param(missing), None);
        assert_eq!(rig.set_param(missing, 1.0), None);
    }
}
