use serde::Deserialize;

/// Lighting switches from the client profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LightSettings {
    /// Conventional lights, derived each frame from [`LightLevels::use_lights`].
    #[serde(skip)]
    pub use_lights: bool,
    #[serde(default)]
    pub use_alt_lights: bool,
    #[serde(default)]
    pub colored_lights: bool,
    #[serde(default)]
    pub dark_nights: bool,
}

impl LightSettings {
    #[inline]
    pub fn active(&self) -> bool {
        self.use_lights || self.use_alt_lights
    }
}

/// Server light levels. 0 is full daylight, 31 is pitch dark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightLevels {
    pub server_personal: u8,
    pub server_overall: u8,
    /// Client override of the overall level.
    pub custom_overall: Option<u8>,
}

impl LightLevels {
    pub const DARKEST: u8 = 0x1F;

    #[inline]
    pub fn personal(&self) -> u8 {
        self.server_personal.min(Self::DARKEST)
    }

    #[inline]
    pub fn overall(&self) -> u8 {
        self.custom_overall
            .unwrap_or(self.server_overall)
            .min(Self::DARKEST)
    }

    /// Lights only matter when the personal level is brighter than the world.
    pub fn use_lights(&self) -> bool {
        match self.custom_overall {
            Some(_) => self.personal() < self.overall(),
            None => self.server_personal < self.server_overall,
        }
    }

    /// Ambient intensity the light target is cleared to, in `[0, 1]`.
    pub fn isometric_level(&self) -> f32 {
        (32.0 - f32::from(self.overall())) / 32.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daylight_disables_lights() {
        let l = LightLevels::default();
        assert!(!l.use_lights());
        assert_eq!(l.isometric_level(), 1.0);
    }

    #[test]
    fn night_enables_lights() {
        let l = LightLevels {
            server_personal: 0,
            server_overall: 24,
            custom_overall: None,
        };
        assert!(l.use_lights());
        assert_eq!(l.isometric_level(), 0.25);
    }

    #[test]
    fn custom_level_overrides_server() {
        let l = LightLevels {
            server_personal: 2,
            server_overall: 30,
            custom_overall: Some(0),
        };
        assert!(!l.use_lights());
        assert_eq!(l.overall(), 0);
    }
}
