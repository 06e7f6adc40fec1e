use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::map::{LandTile, MapSource, StaticTile};

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub water: Water,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub lamps: Lamps,
}

fn default_width() -> i32 {
    896
}
fn default_height() -> i32 {
    512
}
fn default_seed() -> i32 {
    1337
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            terrain: Terrain::default(),
            water: Water::default(),
            trees: Trees::default(),
            lamps: Lamps::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Peak elevation above sea level in z units.
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_grass")]
    pub grass: u16,
    #[serde(default = "default_sand")]
    pub sand: u16,
}
fn default_frequency() -> f32 {
    0.02
}
fn default_amplitude() -> f32 {
    20.0
}
fn default_grass() -> u16 {
    0x0003
}
fn default_sand() -> u16 {
    0x0016
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            grass: default_grass(),
            sand: default_sand(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Water {
    /// Noise value in `[-1, 1]` below which land is flooded.
    #[serde(default = "default_water_level")]
    pub level: f32,
    #[serde(default = "default_water_graphic")]
    pub graphic: u16,
}
fn default_water_level() -> f32 {
    -0.35
}
fn default_water_graphic() -> u16 {
    0x00A8
}
impl Default for Water {
    fn default() -> Self {
        Self {
            level: default_water_level(),
            graphic: default_water_graphic(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_tree_probability")]
    pub probability: f32,
    #[serde(default = "default_trunk")]
    pub trunk: u16,
    #[serde(default = "default_leaves")]
    pub leaves: u16,
    /// Elevation of the canopy above the trunk base.
    #[serde(default = "default_canopy")]
    pub canopy_z: i8,
}
fn default_tree_probability() -> f32 {
    0.04
}
fn default_trunk() -> u16 {
    0x0CCA
}
fn default_leaves() -> u16 {
    0x0CCB
}
fn default_canopy() -> i8 {
    20
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            probability: default_tree_probability(),
            trunk: default_trunk(),
            leaves: default_leaves(),
            canopy_z: default_canopy(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lamps {
    #[serde(default = "default_lamp_probability")]
    pub probability: f32,
    #[serde(default = "default_lamp")]
    pub graphic: u16,
}
fn default_lamp_probability() -> f32 {
    0.004
}
fn default_lamp() -> u16 {
    0x0B24
}
impl Default for Lamps {
    fn default() -> Self {
        Self {
            probability: default_lamp_probability(),
            graphic: default_lamp(),
        }
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(cfg)
}

/// Noise-driven terrain with scattered trees and lamp posts.
pub struct ProceduralMap {
    cfg: WorldGenConfig,
    terrain: FastNoiseLite,
}

impl ProceduralMap {
    pub fn new(cfg: WorldGenConfig) -> Self {
        let mut terrain = FastNoiseLite::with_seed(cfg.seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(cfg.terrain.frequency));
        Self { cfg, terrain }
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.cfg
    }

    #[inline]
    fn sample(&self, x: i32, y: i32) -> f32 {
        self.terrain.get_noise_2d(x as f32, y as f32)
    }

    #[inline]
    fn is_water(&self, h: f32) -> bool {
        h < self.cfg.water.level
    }

    fn elevation(&self, h: f32) -> i8 {
        if self.is_water(h) {
            return -5;
        }
        let above = (h - self.cfg.water.level) / (1.0 - self.cfg.water.level);
        (above.clamp(0.0, 1.0) * self.cfg.terrain.amplitude).round() as i8
    }

    fn rand01(&self, x: i32, y: i32, salt: u32) -> f32 {
        let mut h = (x as u32).wrapping_mul(0x85eb_ca6b)
            ^ (y as u32).wrapping_mul(0xc2b2_ae35)
            ^ (self.cfg.seed as u32 ^ salt).wrapping_mul(0x27d4_eb2d);
        h ^= h >> 16;
        h = h.wrapping_mul(0x7feb_352d);
        h ^= h >> 15;
        h = h.wrapping_mul(0x846c_a68b);
        h ^= h >> 16;
        (h & 0x00ff_ffff) as f32 / 16_777_216.0
    }
}

impl MapSource for ProceduralMap {
    fn size(&self) -> (i32, i32) {
        (self.cfg.width, self.cfg.height)
    }

    fn land(&self, x: i32, y: i32) -> Option<LandTile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let h = self.sample(x, y);
        let z = self.elevation(h);
        let graphic = if self.is_water(h) {
            self.cfg.water.graphic
        } else if h < self.cfg.water.level + 0.08 {
            self.cfg.terrain.sand
        } else {
            self.cfg.terrain.grass
        };
        Some(LandTile { graphic, z })
    }

    fn statics(&self, x: i32, y: i32, out: &mut Vec<StaticTile>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let h = self.sample(x, y);
        if self.is_water(h) {
            return;
        }
        let z = self.elevation(h);
        if self.rand01(x, y, 0x7EE5) < self.cfg.trees.probability {
            out.push(StaticTile {
                graphic: self.cfg.trees.trunk,
                z,
                hue: 0,
            });
            out.push(StaticTile {
                graphic: self.cfg.trees.leaves,
                z: z.saturating_add(self.cfg.trees.canopy_z),
                hue: 0,
            });
        } else if self.rand01(x, y, 0x1A3F) < self.cfg.lamps.probability {
            out.push(StaticTile {
                graphic: self.cfg.lamps.graphic,
                z,
                hue: 0,
            });
        }
    }
}
