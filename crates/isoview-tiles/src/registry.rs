use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use hashbrown::HashMap;

use super::config::{TileDefConfig, TilesConfig};
use super::light_colors::LightColorTable;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileDef {
    pub graphic: u16,
    pub name: String,
    pub transparent: bool,
    pub wet: bool,
    pub foliage: bool,
    pub roof: bool,
    pub animated: bool,
    pub light: Option<u8>,
    pub height: u8,
}

impl TileDef {
    #[inline]
    pub fn is_light_source(&self) -> bool {
        self.light.is_some()
    }

    /// Light profile index, `0` when the tile declares none.
    #[inline]
    pub fn light_index(&self) -> u8 {
        self.light.unwrap_or(0)
    }
}

impl From<TileDefConfig> for TileDef {
    fn from(c: TileDefConfig) -> Self {
        Self {
            graphic: c.graphic,
            name: c.name,
            transparent: c.transparent,
            wet: c.wet,
            foliage: c.foliage,
            roof: c.roof,
            animated: c.animated,
            light: c.light,
            height: c.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TilesError {
    DuplicateGraphic(u16),
    EmptyName(u16),
}

impl fmt::Display for TilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TilesError::DuplicateGraphic(g) => write!(f, "tile graphic 0x{g:04X} defined twice"),
            TilesError::EmptyName(g) => write!(f, "tile graphic 0x{g:04X} has an empty name"),
        }
    }
}

impl Error for TilesError {}

/// Graphic id → tile definition. Unknown graphics resolve to an opaque, unlit default.
#[derive(Clone, Debug, Default)]
pub struct TileRegistry {
    defs: HashMap<u16, TileDef>,
    unknown: TileDef,
    pub light_colors: LightColorTable,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self {
            defs: HashMap::new(),
            unknown: TileDef {
                name: "unknown".into(),
                ..TileDef::default()
            },
            light_colors: LightColorTable::new(),
        }
    }

    #[inline]
    pub fn get(&self, graphic: u16) -> &TileDef {
        self.defs.get(&graphic).unwrap_or(&self.unknown)
    }

    #[inline]
    pub fn contains(&self, graphic: u16) -> bool {
        self.defs.contains_key(&graphic)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Replaces any previous definition for the same graphic.
    pub fn insert(&mut self, def: TileDef) {
        self.defs.insert(def.graphic, def);
    }

    pub fn from_configs(cfg: TilesConfig) -> Result<Self, TilesError> {
        let mut reg = TileRegistry::new();
        for def in cfg.tiles {
            if def.name.trim().is_empty() {
                return Err(TilesError::EmptyName(def.graphic));
            }
            if reg.defs.contains_key(&def.graphic) {
                return Err(TilesError::DuplicateGraphic(def.graphic));
            }
            reg.insert(def.into());
        }
        for c in cfg.light_colors {
            reg.light_colors.insert(c.graphic, c.color, c.is_hue);
        }
        Ok(reg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TilesConfig = toml::from_str(toml_str)?;
        Ok(Self::from_configs(cfg)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
