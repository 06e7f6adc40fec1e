use super::*;
use isoview_chunk::{ChunkStore, ObjectId};
use isoview_tiles::{TileDef, TileRegistry};
use isoview_world::{Direction, GameObject, LandTile, StaticTile, TileMap};

const LAMP: u16 = 0x0B24;
const WALL: u16 = 0x0080;
const GLASS: u16 = 0x0081;
const TORCH: u16 = 0x0A15;
const BRAZIER: u16 = 0x0E31;

fn registry() -> TileRegistry {
    let mut reg = TileRegistry::new();
    reg.insert(TileDef {
        graphic: LAMP,
        name: "lamp post".into(),
        light: Some(4),
        ..TileDef::default()
    });
    reg.insert(TileDef {
        graphic: WALL,
        name: "stone wall".into(),
        ..TileDef::default()
    });
    reg.insert(TileDef {
        graphic: GLASS,
        name: "window".into(),
        transparent: true,
        ..TileDef::default()
    });
    reg.insert(TileDef {
        graphic: TORCH,
        name: "torch".into(),
        light: Some(6),
        ..TileDef::default()
    });
    reg.insert(TileDef {
        graphic: BRAZIER,
        name: "colored brazier".into(),
        light: Some(205),
        ..TileDef::default()
    });
    reg
}

fn settings() -> LightSettings {
    LightSettings {
        use_lights: true,
        use_alt_lights: false,
        colored_lights: true,
        dark_nights: false,
    }
}

struct Fixture {
    store: ChunkStore,
    tiles: TileRegistry,
    settings: LightSettings,
}

impl Fixture {
    fn new(map: TileMap) -> Self {
        let mut store = ChunkStore::new(Box::new(map));
        for cx in 0..4 {
            for cy in 0..4 {
                store.get_chunk(cx, cy, true, 0);
            }
        }
        Self {
            store,
            tiles: registry(),
            settings: settings(),
        }
    }

    fn ctx(&self, max_z: i8) -> LightContext<'_> {
        LightContext {
            store: &self.store,
            tiles: &self.tiles,
            settings: &self.settings,
            max_z,
            zoom: 1.0,
        }
    }

    fn static_at(&self, x: i32, y: i32, graphic: u16) -> ObjectId {
        self.store
            .tile_objects(x, y)
            .find(|(_, o)| o.graphic == graphic)
            .map(|(id, _)| id)
            .unwrap()
    }
}

fn flat() -> TileMap {
    TileMap::new(32, 32, LandTile { graphic: 3, z: 0 })
}

fn lamp_with_occluder(occluder_z: i8, graphic: u16) -> Fixture {
    let mut m = flat();
    m.add_static(10, 10, StaticTile { graphic: LAMP, z: 0, hue: 0 });
    m.add_static(11, 11, StaticTile { graphic, z: occluder_z, hue: 0 });
    Fixture::new(m)
}

#[test]
fn opaque_neighbour_in_band_occludes() {
    let f = lamp_with_occluder(3, WALL);
    let lamp = f.static_at(10, 10, LAMP);
    let mut acc = LightAccumulator::new();
    let r = acc.add_light(&f.ctx(3), Some(lamp), Some(lamp), 100.0, 100.0);
    assert_eq!(r, Err(LightSkip::Occluded));
    assert!(acc.is_empty());
}

#[test]
fn occluder_above_band_lets_light_through() {
    let f = lamp_with_occluder(10, WALL);
    let lamp = f.static_at(10, 10, LAMP);
    let mut acc = LightAccumulator::new();
    let r = acc.add_light(&f.ctx(127), Some(lamp), Some(lamp), 100.0, 100.0);
    assert_eq!(r, Ok(0));
    assert_eq!(acc.entries()[0].id, 4);
}

#[test]
fn transparent_neighbour_never_occludes() {
    let f = lamp_with_occluder(3, GLASS);
    let lamp = f.static_at(10, 10, LAMP);
    let mut acc = LightAccumulator::new();
    assert!(acc.add_light(&f.ctx(127), Some(lamp), Some(lamp), 0.0, 0.0).is_ok());
}

#[test]
fn occluder_above_roof_cutoff_ignored() {
    let f = lamp_with_occluder(3, WALL);
    let lamp = f.static_at(10, 10, LAMP);
    let mut acc = LightAccumulator::new();
    assert!(acc.add_light(&f.ctx(2), Some(lamp), Some(lamp), 0.0, 0.0).is_ok());
}

#[test]
fn profile_above_200_becomes_colored_profile_one() {
    let mut m = flat();
    m.add_static(5, 5, StaticTile { graphic: BRAZIER, z: 0, hue: 0 });
    let f = Fixture::new(m);
    let b = f.static_at(5, 5, BRAZIER);
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(b), Some(b), 1.0, 2.0).unwrap();
    let e = acc.entries()[0];
    assert_eq!(e.id, 1);
    assert_eq!(e.color, 6);
    assert!(!e.is_hue);
}

#[test]
fn profile_above_200_discarded_without_colored_lights() {
    let mut m = flat();
    m.add_static(5, 5, StaticTile { graphic: BRAZIER, z: 0, hue: 0 });
    let mut f = Fixture::new(m);
    f.settings.colored_lights = false;
    let b = f.static_at(5, 5, BRAZIER);
    let mut acc = LightAccumulator::new();
    assert_eq!(
        acc.add_light(&f.ctx(127), Some(b), Some(b), 0.0, 0.0),
        Err(LightSkip::InvalidProfile)
    );
}

#[test]
fn color_table_overrides_by_source_graphic() {
    let mut m = flat();
    m.add_static(5, 5, StaticTile { graphic: LAMP, z: 0, hue: 0 });
    let mut f = Fixture::new(m);
    f.tiles.light_colors.insert(LAMP, 31, true);
    let lamp = f.static_at(5, 5, LAMP);
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(lamp), Some(lamp), 0.0, 0.0).unwrap();
    let e = acc.entries()[0];
    assert_eq!((e.id, e.color, e.is_hue), (4, 32, true));
}

#[test]
fn fire_graphics_use_fire_profile() {
    let mut m = flat();
    m.add_static(5, 5, StaticTile { graphic: 0x3E05, z: 0, hue: 0 });
    let f = Fixture::new(m);
    let fire = f.static_at(5, 5, 0x3E05);
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(fire), Some(fire), 0.0, 0.0).unwrap();
    assert_eq!(acc.entries()[0].id, FIRE_PROFILE);
    assert!(is_fire_graphic(0x0B1D));
    assert!(!is_fire_graphic(0x3E0C));
}

#[test]
fn self_lit_item_uses_declared_light_id() {
    let mut f = Fixture::new(flat());
    let torch = f.store.spawn(GameObject::item(50, 6, 6, 0, 0x0EED, 9));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(torch), Some(torch), 0.0, 0.0).unwrap();
    assert_eq!(acc.entries()[0].id, 9);
}

#[test]
fn held_light_offsets_by_facing() {
    let mut f = Fixture::new(flat());
    let mut mob = GameObject::mobile(1, 8, 8, 0, 0x190);
    mob.mobile_state_mut().unwrap().direction = Direction::East;
    let m = f.store.spawn(mob);
    let held = f.store.spawn_equipped(GameObject::item(2, 8, 8, 0, TORCH, 0));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(m), Some(held), 100.0, 200.0).unwrap();
    let e = acc.entries()[0];
    assert_eq!(e.id, 6);
    assert_eq!((e.draw_x, e.draw_y), (122.0, 255.0));
}

#[test]
fn north_facing_holder_has_no_offset() {
    let mut f = Fixture::new(flat());
    let m = f.store.spawn(GameObject::mobile(1, 8, 8, 0, 0x190));
    let held = f.store.spawn_equipped(GameObject::item(2, 8, 8, 0, TORCH, 0));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(m), Some(held), 100.0, 200.0).unwrap();
    let e = acc.entries()[0];
    assert_eq!((e.draw_x, e.draw_y), (100.0, 200.0));
}

#[test]
fn held_fire_item_uses_fire_profile() {
    let mut f = Fixture::new(flat());
    let m = f.store.spawn(GameObject::mobile(1, 8, 8, 0, 0x190));
    let held = f.store.spawn_equipped(GameObject::item(2, 8, 8, 0, 0x0B1D, 7));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(m), Some(held), 0.0, 0.0).unwrap();
    assert_eq!(acc.entries()[0].id, FIRE_PROFILE);
}

#[test]
fn bare_mobile_gets_default_profile() {
    let mut f = Fixture::new(flat());
    let m = f.store.spawn(GameObject::mobile(1, 8, 8, 0, 0x190));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0).unwrap();
    assert_eq!(acc.entries()[0].id, DEFAULT_MOBILE_PROFILE);
}

#[test]
fn short_circuits_report_reason() {
    let mut f = Fixture::new(flat());
    let m = f.store.spawn(GameObject::mobile(1, 8, 8, 0, 0x190));
    let mut acc = LightAccumulator::with_capacity(1);
    assert_eq!(
        acc.add_light(&f.ctx(127), None, None, 0.0, 0.0),
        Err(LightSkip::NoSubject)
    );
    acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0).unwrap();
    assert_eq!(
        acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0),
        Err(LightSkip::BufferFull)
    );
    acc.clear();
    f.settings.use_lights = false;
    assert_eq!(
        acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0),
        Err(LightSkip::LightingDisabled)
    );
    f.settings.use_alt_lights = true;
    assert!(acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0).is_ok());
}

#[test]
fn take_empties_the_buffer() {
    let mut f = Fixture::new(flat());
    let m = f.store.spawn(GameObject::mobile(1, 8, 8, 0, 0x190));
    let mut acc = LightAccumulator::new();
    acc.add_light(&f.ctx(127), Some(m), None, 0.0, 0.0).unwrap();
    let taken = acc.take();
    assert_eq!(taken.len(), 1);
    assert!(acc.is_empty());
}

#[test]
fn profile_table_has_no_shape_for_zero() {
    let t = LightProfileTable::standard();
    assert!(t.get(0).is_none());
    assert!(t.get(1).is_some());
    assert!(t.get(LIGHT_PROFILE_COUNT).is_none());
}
