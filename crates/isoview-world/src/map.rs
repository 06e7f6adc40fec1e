use hashbrown::HashMap;

use crate::coords::{CHUNK_SIZE, ChunkCoord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandTile {
    pub graphic: u16,
    pub z: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticTile {
    pub graphic: u16,
    pub z: i8,
    pub hue: u16,
}

/// Read-only terrain/static source the chunk store materializes from.
pub trait MapSource {
    /// Map size in tiles `(width, height)`.
    fn size(&self) -> (i32, i32);

    fn land(&self, x: i32, y: i32) -> Option<LandTile>;

    /// Appends the statics placed on `(x, y)` to `out`.
    fn statics(&self, x: i32, y: i32, out: &mut Vec<StaticTile>);

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let (w, h) = self.size();
        x >= 0 && y >= 0 && x < w && y < h
    }

    fn chunk_in_bounds(&self, coord: ChunkCoord) -> bool {
        let (w, h) = self.size();
        let max_cx = (w + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let max_cy = (h + CHUNK_SIZE - 1) / CHUNK_SIZE;
        coord.cx >= 0 && coord.cy >= 0 && coord.cx < max_cx && coord.cy < max_cy
    }
}

/// In-memory map: uniform land with per-tile overrides and statics.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: i32,
    height: i32,
    default_land: LandTile,
    land: HashMap<(i32, i32), LandTile>,
    statics: HashMap<(i32, i32), Vec<StaticTile>>,
}

impl TileMap {
    pub fn new(width: i32, height: i32, default_land: LandTile) -> Self {
        Self {
            width,
            height,
            default_land,
            land: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    pub fn set_land(&mut self, x: i32, y: i32, tile: LandTile) {
        self.land.insert((x, y), tile);
    }

    pub fn add_static(&mut self, x: i32, y: i32, tile: StaticTile) {
        self.statics.entry((x, y)).or_default().push(tile);
    }

    pub fn clear_statics(&mut self, x: i32, y: i32) {
        self.statics.remove(&(x, y));
    }
}

impl MapSource for TileMap {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn land(&self, x: i32, y: i32) -> Option<LandTile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.land.get(&(x, y)).copied().unwrap_or(self.default_land))
    }

    fn statics(&self, x: i32, y: i32, out: &mut Vec<StaticTile>) {
        if let Some(list) = self.statics.get(&(x, y)) {
            out.extend_from_slice(list);
        }
    }
}
