use isoview_world::coords::{cell_index, cell_local};
use isoview_world::{CHUNK_CELLS, ChunkCoord, GameObject};
use slotmap::SlotMap;

use crate::ObjectId;

/// A fully materialized 8x8 block of cells. Each cell is an ordered
/// sequence of object handles, lowest elevation first.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    cells: Vec<Vec<ObjectId>>,
    pub(crate) last_access: u64,
}

impl Chunk {
    pub(crate) fn new(coord: ChunkCoord, now: u64) -> Self {
        Self {
            coord,
            cells: vec![Vec::new(); CHUNK_CELLS],
            last_access: now,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn last_access(&self) -> u64 {
        self.last_access
    }

    /// Objects of the cell holding world tile `(x, y)`. The tile must lie in this chunk.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> &[ObjectId] {
        &self.cells[cell_index(x, y)]
    }

    /// Cells in scan order (X outer, Y inner) with their world tile.
    pub fn cells(&self) -> impl Iterator<Item = ((i32, i32), &[ObjectId])> + '_ {
        let (ox, oy) = self.coord.origin_tile();
        self.cells.iter().enumerate().map(move |(i, c)| {
            let (lx, ly) = cell_local(i);
            ((ox + lx, oy + ly), c.as_slice())
        })
    }

    pub fn object_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Inserts after every entry whose sort key is not greater, so equal keys keep arrival order.
    pub(crate) fn insert_sorted(
        &mut self,
        id: ObjectId,
        objects: &SlotMap<ObjectId, GameObject>,
    ) {
        let Some(obj) = objects.get(id) else { return };
        let key = obj.sort_key();
        let cell = &mut self.cells[cell_index(obj.x, obj.y)];
        let pos = cell
            .iter()
            .position(|other| objects.get(*other).is_some_and(|o| o.sort_key() > key))
            .unwrap_or(cell.len());
        cell.insert(pos, id);
    }

    pub(crate) fn remove(&mut self, id: ObjectId, x: i32, y: i32) -> bool {
        let cell = &mut self.cells[cell_index(x, y)];
        match cell.iter().position(|o| *o == id) {
            Some(pos) => {
                cell.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = ObjectId> + '_ {
        self.cells.iter_mut().flat_map(|c| c.drain(..))
    }
}
