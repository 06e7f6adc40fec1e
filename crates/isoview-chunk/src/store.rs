use hashbrown::HashMap;
use isoview_world::{ChunkCoord, GameObject, MapSource, ObjectKind, StaticTile};
use slotmap::SlotMap;

use crate::ObjectId;
use crate::chunk::Chunk;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkStoreStats {
    pub resident: usize,
    pub materialized: u64,
    pub evicted: u64,
    pub objects: usize,
}

/// Where a client-owned object currently lives. Objects materialized from
/// map data have no placement entry and are freed with their chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Cell,
    /// Waiting for its chunk to become resident.
    Pending,
    /// Never placed in a cell (equipped items).
    Equipped,
}

pub struct ChunkStore {
    map: Box<dyn MapSource>,
    chunks: HashMap<ChunkCoord, Chunk>,
    objects: SlotMap<ObjectId, GameObject>,
    placements: HashMap<ObjectId, Placement>,
    serials: HashMap<u32, ObjectId>,
    last_sweep: Option<u64>,
    materialized: u64,
    evicted: u64,
    scratch: Vec<StaticTile>,
}

impl ChunkStore {
    pub fn new(map: Box<dyn MapSource>) -> Self {
        Self {
            map,
            chunks: HashMap::new(),
            objects: SlotMap::with_key(),
            placements: HashMap::new(),
            serials: HashMap::new(),
            last_sweep: None,
            materialized: 0,
            evicted: 0,
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn map(&self) -> &dyn MapSource {
        self.map.as_ref()
    }

    /// Resident chunk lookup that touches the chunk. With `create`, a missing
    /// in-bounds chunk is materialized first; out-of-map chunks stay `None`.
    pub fn get_chunk(&mut self, cx: i32, cy: i32, create: bool, now: u64) -> Option<&Chunk> {
        let coord = ChunkCoord::new(cx, cy);
        if !self.chunks.contains_key(&coord) {
            if !create || !self.map.chunk_in_bounds(coord) {
                return None;
            }
            self.materialize(coord, now);
        }
        let chunk = self.chunks.get_mut(&coord)?;
        chunk.last_access = now;
        Some(chunk)
    }

    /// Read-only lookup; does not touch or create.
    #[inline]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    fn materialize(&mut self, coord: ChunkCoord, now: u64) {
        let mut chunk = Chunk::new(coord, now);
        let (ox, oy) = coord.origin_tile();
        for lx in 0..isoview_world::CHUNK_SIZE {
            for ly in 0..isoview_world::CHUNK_SIZE {
                let (x, y) = (ox + lx, oy + ly);
                if let Some(land) = self.map.land(x, y) {
                    let id = self.objects.insert(GameObject::land(x, y, land.z, land.graphic));
                    chunk.insert_sorted(id, &self.objects);
                }
                self.scratch.clear();
                self.map.statics(x, y, &mut self.scratch);
                for s in self.scratch.drain(..) {
                    let obj = GameObject::static_tile(x, y, s.z, s.graphic).with_hue(s.hue);
                    let id = self.objects.insert(obj);
                    chunk.insert_sorted(id, &self.objects);
                }
            }
        }
        let mut reattached = 0usize;
        for (id, placement) in self.placements.iter_mut() {
            if *placement != Placement::Pending {
                continue;
            }
            let Some(obj) = self.objects.get(*id) else { continue };
            if coord.contains_tile(obj.x, obj.y) {
                chunk.insert_sorted(*id, &self.objects);
                *placement = Placement::Cell;
                reattached += 1;
            }
        }
        self.materialized += 1;
        log::trace!(
            target: "chunks",
            "materialized ({}, {}) objects={} reattached={}",
            coord.cx,
            coord.cy,
            chunk.object_count(),
            reattached
        );
        self.chunks.insert(coord, chunk);
    }

    /// Evicts every chunk not touched since the previous sweep. Map objects
    /// are freed; client-owned objects wait for their chunk to return.
    pub fn clear_unused_blocks(&mut self, now: u64) -> usize {
        let Some(cutoff) = self.last_sweep.replace(now) else {
            return 0;
        };
        let stale: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(_, c)| c.last_access < cutoff)
            .map(|(coord, _)| *coord)
            .collect();
        for coord in &stale {
            let Some(mut chunk) = self.chunks.remove(coord) else { continue };
            for id in chunk.drain() {
                match self.placements.get_mut(&id) {
                    Some(p) => *p = Placement::Pending,
                    None => {
                        self.objects.remove(id);
                    }
                }
            }
        }
        self.evicted += stale.len() as u64;
        if !stale.is_empty() {
            log::debug!(
                target: "chunks",
                "evicted {} chunks, {} resident",
                stale.len(),
                self.chunks.len()
            );
        }
        stale.len()
    }

    /// Handles on tile `(x, y)` in cell order, if its chunk is resident.
    pub fn tile(&self, x: i32, y: i32) -> Option<&[ObjectId]> {
        self.chunks
            .get(&ChunkCoord::from_tile(x, y))
            .map(|c| c.cell(x, y))
    }

    pub fn tile_objects(&self, x: i32, y: i32) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.tile(x, y)
            .unwrap_or(&[])
            .iter()
            .filter_map(move |id| self.objects.get(*id).map(|o| (*id, o)))
    }

    /// Ground elevation of `(x, y)` from the map source.
    pub fn map_z(&self, x: i32, y: i32) -> Option<i8> {
        self.map.land(x, y).map(|l| l.z)
    }

    #[inline]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    #[inline]
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    #[inline]
    pub fn entity_by_serial(&self, serial: u32) -> Option<ObjectId> {
        self.serials.get(&serial).copied()
    }

    pub fn entity(&self, serial: u32) -> Option<&GameObject> {
        self.entity_by_serial(serial).and_then(|id| self.objects.get(id))
    }

    /// Places a client-owned object: into its cell when the chunk is
    /// resident, otherwise parked until the chunk materializes.
    pub fn spawn(&mut self, obj: GameObject) -> ObjectId {
        let serial = obj.serial;
        let id = self.objects.insert(obj);
        if let Some(s) = serial {
            if let Some(old) = self.serials.insert(s, id) {
                self.despawn(old);
            }
        }
        self.attach(id);
        id
    }

    /// Registers an object that is never drawn from a cell (equipped items).
    pub fn spawn_equipped(&mut self, obj: GameObject) -> ObjectId {
        let serial = obj.serial;
        let id = self.objects.insert(obj);
        if let Some(s) = serial {
            if let Some(old) = self.serials.insert(s, id) {
                self.despawn(old);
            }
        }
        self.placements.insert(id, Placement::Equipped);
        id
    }

    /// Inserts or updates a server entity keyed by serial. Position changes
    /// move it between cells; screen state and overhead text survive updates.
    pub fn upsert_entity(&mut self, obj: GameObject) -> Option<ObjectId> {
        let serial = obj.serial?;
        let Some(id) = self.entity_by_serial(serial) else {
            return Some(self.spawn(obj));
        };
        let (x, y, z) = (obj.x, obj.y, obj.z);
        if let Some(cur) = self.objects.get_mut(id) {
            cur.graphic = obj.graphic;
            cur.hue = obj.hue;
            cur.kind = obj.kind;
            cur.allowed_to_draw = obj.allowed_to_draw;
        }
        self.move_object(id, x, y, z);
        Some(id)
    }

    /// Moves an object, re-sorting it into the destination cell.
    pub fn move_object(&mut self, id: ObjectId, x: i32, y: i32, z: i8) -> bool {
        let Some(obj) = self.objects.get(id) else {
            return false;
        };
        if (obj.x, obj.y, obj.z) == (x, y, z) {
            return true;
        }
        self.detach(id);
        if let Some(obj) = self.objects.get_mut(id) {
            obj.x = x;
            obj.y = y;
            obj.z = z;
        }
        self.attach(id);
        true
    }

    pub fn remove_entity(&mut self, serial: u32) -> Option<GameObject> {
        let id = self.serials.remove(&serial)?;
        self.despawn(id)
    }

    /// Frees any object. Map objects come back when their chunk is rebuilt.
    pub fn despawn(&mut self, id: ObjectId) -> Option<GameObject> {
        self.detach(id);
        self.placements.remove(&id);
        let obj = self.objects.remove(id)?;
        if let Some(s) = obj.serial {
            if self.serials.get(&s) == Some(&id) {
                self.serials.remove(&s);
            }
        }
        Some(obj)
    }

    fn detach(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get(id) else { return };
        let (x, y) = (obj.x, obj.y);
        if let Some(chunk) = self.chunks.get_mut(&ChunkCoord::from_tile(x, y)) {
            chunk.remove(id, x, y);
        }
        if let Some(p) = self.placements.get_mut(&id) {
            if *p == Placement::Cell {
                *p = Placement::Pending;
            }
        }
    }

    fn attach(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get(id) else { return };
        if self.placements.get(&id) == Some(&Placement::Equipped) {
            return;
        }
        let coord = ChunkCoord::from_tile(obj.x, obj.y);
        let placement = match self.chunks.get_mut(&coord) {
            Some(chunk) => {
                chunk.insert_sorted(id, &self.objects);
                Placement::Cell
            }
            None => Placement::Pending,
        };
        self.placements.insert(id, placement);
    }

    /// Visits every object of a resident chunk in scan order with mutable access.
    pub fn for_each_in_chunk(
        &mut self,
        coord: ChunkCoord,
        mut f: impl FnMut(ObjectId, &mut GameObject),
    ) {
        let Some(chunk) = self.chunks.get(&coord) else { return };
        for (_, cell) in chunk.cells() {
            for id in cell {
                if let Some(obj) = self.objects.get_mut(*id) {
                    f(*id, obj);
                }
            }
        }
    }

    /// Server entities (anything with a serial), resident or not.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut GameObject)> + '_ {
        self.objects.iter_mut().filter(|(_, o)| o.serial.is_some())
    }

    pub fn entities(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.objects.iter().filter(|(_, o)| o.serial.is_some())
    }

    /// Multi components belonging to the multi with `parent` serial.
    pub fn multi_components(&self, parent: u32) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, o)| matches!(o.kind, ObjectKind::Multi(m) if m.parent == Some(parent)))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn resident_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn stats(&self) -> ChunkStoreStats {
        ChunkStoreStats {
            resident: self.chunks.len(),
            materialized: self.materialized,
            evicted: self.evicted,
            objects: self.objects.len(),
        }
    }
}
