//! Per-frame dynamic light collection with tile-stack occlusion.
#![forbid(unsafe_code)]

mod accumulator;
mod levels;
mod profiles;

pub use accumulator::{LightAccumulator, LightContext, LightEntry, LightSkip, is_fire_graphic};
pub use levels::{LightLevels, LightSettings};
pub use profiles::{LightProfile, LightProfileTable};

/// Capacity of the per-frame light buffer. Sources past this are dropped.
pub const MAX_LIGHTS_PER_FRAME: usize = 100;
/// Number of known light shapes; resolved indices at or above it are invalid.
pub const LIGHT_PROFILE_COUNT: u8 = 100;
/// Shape used by mobiles glowing without an explicit source.
pub const DEFAULT_MOBILE_PROFILE: u8 = 1;
/// Shape forced onto fire graphics.
pub const FIRE_PROFILE: u8 = 2;
/// Elevation band above a subject in which an opaque neighbour blocks its light.
pub const OCCLUSION_BAND: i8 = 5;

#[cfg(test)]
mod tests;
