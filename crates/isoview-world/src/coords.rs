use serde::{Deserialize, Serialize};

/// Tiles per chunk edge.
pub const CHUNK_SIZE: i32 = 8;
pub const CHUNK_SHIFT: u32 = 3;
pub const CHUNK_CELLS: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Arithmetic shift, so negative tiles land in negative chunks.
    #[inline]
    pub const fn from_tile(x: i32, y: i32) -> Self {
        Self {
            cx: x >> CHUNK_SHIFT,
            cy: y >> CHUNK_SHIFT,
        }
    }

    #[inline]
    pub const fn origin_tile(self) -> (i32, i32) {
        (self.cx << CHUNK_SHIFT, self.cy << CHUNK_SHIFT)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
        }
    }

    #[inline]
    pub fn contains_tile(self, x: i32, y: i32) -> bool {
        Self::from_tile(x, y) == self
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        dx * dx + dy * dy
    }
}

/// Cell index inside a chunk. Cells are stored X-major so iterating
/// `0..CHUNK_CELLS` visits X outer, Y inner.
#[inline]
pub const fn cell_index(x: i32, y: i32) -> usize {
    let lx = x & (CHUNK_SIZE - 1);
    let ly = y & (CHUNK_SIZE - 1);
    (lx * CHUNK_SIZE + ly) as usize
}

/// Inverse of [`cell_index`]: local `(x, y)` inside the chunk.
#[inline]
pub const fn cell_local(idx: usize) -> (i32, i32) {
    let i = idx as i32;
    (i / CHUNK_SIZE, i % CHUNK_SIZE)
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_tiles_shift_down() {
        assert_eq!(ChunkCoord::from_tile(-1, -8), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_tile(-9, 0), ChunkCoord::new(-2, 0));
        assert_eq!(ChunkCoord::from_tile(101, 100), ChunkCoord::new(12, 12));
    }

    #[test]
    fn cell_index_roundtrip() {
        for idx in 0..CHUNK_CELLS {
            let (lx, ly) = cell_local(idx);
            assert_eq!(cell_index(lx, ly), idx);
        }
        assert_eq!(cell_index(-1, -1), CHUNK_CELLS - 1);
    }
}
