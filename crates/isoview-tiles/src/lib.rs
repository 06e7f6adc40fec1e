//! Static tile definitions and light color overrides.
#![forbid(unsafe_code)]

pub mod config;
pub mod light_colors;
pub mod registry;

pub use light_colors::{LightColor, LightColorTable};
pub use registry::{TileDef, TileRegistry, TilesError};
