//! World model: objects, facing, chunk coordinates, and map sources.
#![forbid(unsafe_code)]

pub mod coords;
pub mod direction;
pub mod map;
pub mod object;
pub mod worldgen;

pub use coords::{CHUNK_CELLS, CHUNK_SHIFT, CHUNK_SIZE, ChunkCoord};
pub use direction::Direction;
pub use map::{LandTile, MapSource, StaticTile, TileMap};
pub use object::{
    GameObject, ItemState, MobileState, MultiPart, ObjectKind, OverheadText, CORPSE_GRAPHIC,
};
pub use worldgen::{ProceduralMap, WorldGenConfig};
