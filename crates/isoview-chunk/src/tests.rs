use super::*;
use isoview_world::{ChunkCoord, GameObject, LandTile, StaticTile, TileMap};

fn store_with(map: TileMap) -> ChunkStore {
    ChunkStore::new(Box::new(map))
}

fn flat(w: i32, h: i32) -> TileMap {
    TileMap::new(w, h, LandTile { graphic: 3, z: 0 })
}

#[test]
fn lookup_without_create_has_no_side_effects() {
    let mut s = store_with(flat(64, 64));
    assert!(s.get_chunk(1, 1, false, 0).is_none());
    assert_eq!(s.resident_chunks(), 0);
    assert_eq!(s.stats().materialized, 0);
}

#[test]
fn create_materializes_all_cells() {
    let mut m = flat(64, 64);
    m.add_static(9, 10, StaticTile { graphic: 0x10, z: 0, hue: 0 });
    let mut s = store_with(m);
    let chunk = s.get_chunk(1, 1, true, 0).expect("chunk");
    assert_eq!(chunk.object_count(), 65);
    assert_eq!(chunk.cell(9, 10).len(), 2);
    assert_eq!(s.stats().materialized, 1);
}

#[test]
fn out_of_map_chunk_is_absent_even_with_create() {
    let mut s = store_with(flat(16, 16));
    assert!(s.get_chunk(5, 5, true, 0).is_none());
    assert!(s.get_chunk(-1, 0, true, 0).is_none());
    assert_eq!(s.resident_chunks(), 0);
}

#[test]
fn cell_sorted_by_elevation_then_arrival() {
    let mut m = flat(16, 16);
    m.add_static(2, 2, StaticTile { graphic: 0x20, z: 10, hue: 0 });
    m.add_static(2, 2, StaticTile { graphic: 0x21, z: 5, hue: 0 });
    m.add_static(2, 2, StaticTile { graphic: 0x22, z: 5, hue: 0 });
    let mut s = store_with(m);
    s.get_chunk(0, 0, true, 0);
    let graphics: Vec<u16> = s.tile_objects(2, 2).map(|(_, o)| o.graphic).collect();
    assert_eq!(graphics, vec![3, 0x21, 0x22, 0x20]);
}

#[test]
fn sweep_evicts_only_untouched_chunks() {
    let mut s = store_with(flat(64, 64));
    s.get_chunk(0, 0, true, 0);
    s.get_chunk(1, 0, true, 0);
    // First sweep only records the cutoff.
    assert_eq!(s.clear_unused_blocks(100), 0);
    s.get_chunk(0, 0, false, 150);
    assert_eq!(s.clear_unused_blocks(200), 1);
    assert!(s.chunk(ChunkCoord::new(0, 0)).is_some());
    assert!(s.chunk(ChunkCoord::new(1, 0)).is_none());
    assert_eq!(s.stats().evicted, 1);
}

#[test]
fn evicted_entities_return_with_their_chunk() {
    let mut s = store_with(flat(64, 64));
    s.get_chunk(0, 0, true, 0);
    let id = s.spawn(GameObject::mobile(42, 3, 3, 0, 0x190));
    assert_eq!(s.tile(3, 3).map(|t| t.len()), Some(2));
    s.clear_unused_blocks(10);
    assert_eq!(s.clear_unused_blocks(20), 1);
    assert!(s.tile(3, 3).is_none());
    assert!(s.object(id).is_some());
    s.get_chunk(0, 0, true, 30);
    assert!(s.tile(3, 3).unwrap().contains(&id));
}

#[test]
fn entity_spawned_before_chunk_attaches_later() {
    let mut s = store_with(flat(64, 64));
    let id = s.spawn(GameObject::mobile(7, 20, 20, 0, 0x190));
    assert!(s.tile(20, 20).is_none());
    s.get_chunk(2, 2, true, 0);
    assert!(s.tile(20, 20).unwrap().contains(&id));
}

#[test]
fn upsert_moves_between_chunks_and_keeps_text() {
    let mut s = store_with(flat(64, 64));
    s.get_chunk(0, 0, true, 0);
    s.get_chunk(1, 0, true, 0);
    let id = s.upsert_entity(GameObject::mobile(1, 7, 0, 0, 0x190)).unwrap();
    s.object_mut(id).unwrap().overhead = Some(isoview_world::OverheadText {
        text: "hi".into(),
        hue: 0,
        expires_at: 10,
        anchor: isoview_geom::Vec2::ZERO,
    });
    let again = s.upsert_entity(GameObject::mobile(1, 8, 0, 0, 0x191)).unwrap();
    assert_eq!(id, again);
    assert!(!s.tile(7, 0).unwrap().contains(&id));
    assert!(s.tile(8, 0).unwrap().contains(&id));
    let obj = s.object(id).unwrap();
    assert_eq!(obj.graphic, 0x191);
    assert!(obj.overhead.is_some());
}

#[test]
fn remove_entity_clears_cell_and_serial() {
    let mut s = store_with(flat(64, 64));
    s.get_chunk(0, 0, true, 0);
    let id = s.spawn(GameObject::item(9, 1, 1, 0, 0x0A0F, 3));
    assert!(s.remove_entity(9).is_some());
    assert!(s.entity_by_serial(9).is_none());
    assert!(!s.tile(1, 1).unwrap().contains(&id));
    assert!(s.object(id).is_none());
}

#[test]
fn equipped_items_never_enter_cells() {
    let mut s = store_with(flat(64, 64));
    s.get_chunk(0, 0, true, 0);
    let id = s.spawn_equipped(GameObject::item(11, 1, 1, 0, 0x0A15, 0));
    assert!(!s.tile(1, 1).unwrap().contains(&id));
    assert_eq!(s.entity_by_serial(11), Some(id));
}
