use isoview_chunk::{ChunkStore, ObjectId};
use isoview_tiles::TileRegistry;
use isoview_world::{GameObject, ItemState, MultiPart, ObjectKind};

use crate::messages::MultiTemplate;

/// Ghost of a structure following the cursor during multi placement.
#[derive(Debug)]
pub struct MultiPreview {
    template: MultiTemplate,
    anchor: Option<ObjectId>,
    parts: Vec<ObjectId>,
    position: Option<(i32, i32, i8)>,
}

impl MultiPreview {
    pub fn new(template: MultiTemplate) -> Self {
        Self {
            template,
            anchor: None,
            parts: Vec::new(),
            position: None,
        }
    }

    pub fn template(&self) -> &MultiTemplate {
        &self.template
    }

    pub fn anchor(&self) -> Option<ObjectId> {
        self.anchor
    }

    pub fn parts(&self) -> &[ObjectId] {
        &self.parts
    }

    /// Anchor tile of the last placement.
    pub fn position(&self) -> Option<(i32, i32, i8)> {
        self.position
    }

    /// Repositions the preview under `hovered`. Without a hovered object the
    /// preview stays where it was.
    pub fn update(
        &mut self,
        store: &mut ChunkStore,
        tiles: &TileRegistry,
        hovered: Option<ObjectId>,
    ) -> Option<(i32, i32, i8)> {
        let target = hovered.and_then(|h| anchor_for(store, tiles, h, &self.template))?;
        if self.position == Some(target) {
            return self.position;
        }
        let (x, y, z) = target;
        match self.anchor {
            Some(id) => {
                store.move_object(id, x, y, z);
            }
            None => {
                let state = ItemState {
                    is_multi: true,
                    ..ItemState::default()
                };
                let obj = GameObject::new(ObjectKind::Item(state), x, y, z, self.template.graphic)
                    .with_hue(self.template.hue);
                self.anchor = Some(store.spawn(obj));
                for p in &self.template.parts {
                    let part = MultiPart {
                        dx: p.dx,
                        dy: p.dy,
                        dz: p.dz,
                        parent: None,
                        is_preview: true,
                    };
                    let obj = GameObject::new(ObjectKind::Multi(part), x, y, z, p.graphic)
                        .with_hue(self.template.hue);
                    self.parts.push(store.spawn(obj));
                }
            }
        }
        for id in &self.parts {
            let Some(part) = store.object(*id).and_then(|o| o.multi_part().copied()) else {
                continue;
            };
            store.move_object(*id, x + part.dx, y + part.dy, z.saturating_add(part.dz));
        }
        self.position = Some(target);
        log::trace!("multi preview at ({}, {}, {})", x, y, z);
        self.position
    }

    /// Frees the anchor and every component.
    pub fn teardown(self, store: &mut ChunkStore) {
        if let Some(a) = self.anchor {
            store.despawn(a);
        }
        for id in self.parts {
            store.despawn(id);
        }
    }
}

/// Anchor tile for a placement over `hovered`: the head of its cell, snapped
/// to the ground unless the hovered object is water, minus the template pivot.
pub fn anchor_for(
    store: &ChunkStore,
    tiles: &TileRegistry,
    hovered: ObjectId,
    template: &MultiTemplate,
) -> Option<(i32, i32, i8)> {
    let h = store.object(hovered)?;
    let head = store
        .tile(h.x, h.y)
        .and_then(|cell| cell.first())
        .and_then(|id| store.object(*id));
    let (x, y, z) = match head {
        Some(o) => (o.x, o.y, o.z),
        None => (h.x, h.y, h.z),
    };
    let wet = matches!(h.kind, ObjectKind::Static) && tiles.get(h.graphic).wet;
    let ground = if wet {
        h.z
    } else {
        store.map_z(x, y).unwrap_or(z)
    };
    let (px, py, pz) = template.pivot;
    Some((x - px, y - py, ground.saturating_sub(pz)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::TemplatePart;
    use isoview_tiles::TileDef;
    use isoview_world::{LandTile, StaticTile, TileMap};

    const WATER: u16 = 0x1797;

    fn setup() -> (ChunkStore, TileRegistry) {
        let mut map = TileMap::new(64, 64, LandTile { graphic: 3, z: 0 });
        map.set_land(20, 20, LandTile { graphic: 3, z: 7 });
        map.add_static(30, 30, StaticTile { graphic: WATER, z: -5, hue: 0 });
        let mut store = ChunkStore::new(Box::new(map));
        for cx in 0..8 {
            for cy in 0..8 {
                store.get_chunk(cx, cy, true, 0);
            }
        }
        let mut tiles = TileRegistry::new();
        tiles.insert(TileDef {
            graphic: WATER,
            name: "water".into(),
            wet: true,
            ..TileDef::default()
        });
        (store, tiles)
    }

    fn template() -> MultiTemplate {
        MultiTemplate {
            graphic: 0x0064,
            hue: 0,
            pivot: (1, 2, 0),
            parts: vec![
                TemplatePart { graphic: 0x0066, dx: 0, dy: 0, dz: 0 },
                TemplatePart { graphic: 0x0067, dx: 1, dy: 0, dz: 7 },
            ],
        }
    }

    #[test]
    fn anchor_snaps_to_ground_minus_pivot() {
        let (store, tiles) = setup();
        let hovered = store.tile(20, 20).and_then(|c| c.first().copied()).unwrap();
        assert_eq!(anchor_for(&store, &tiles, hovered, &template()), Some((19, 18, 7)));
    }

    #[test]
    fn wet_statics_keep_their_own_elevation() {
        let (store, tiles) = setup();
        let water = store
            .tile_objects(30, 30)
            .find(|(_, o)| o.graphic == WATER)
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(anchor_for(&store, &tiles, water, &template()), Some((29, 28, -5)));
    }

    #[test]
    fn components_follow_the_anchor_and_teardown_frees_them() {
        let (mut store, tiles) = setup();
        let before = store.stats().objects;
        let mut p = MultiPreview::new(template());
        let h1 = store.tile(20, 20).and_then(|c| c.first().copied()).unwrap();
        assert_eq!(p.update(&mut store, &tiles, Some(h1)), Some((19, 18, 7)));
        let second = store.object(p.parts()[1]).unwrap();
        assert_eq!((second.x, second.y, second.z), (20, 18, 14));
        assert!(second.multi_part().unwrap().is_preview);

        let h2 = store.tile(10, 10).and_then(|c| c.first().copied()).unwrap();
        p.update(&mut store, &tiles, Some(h2));
        let first = store.object(p.parts()[0]).unwrap();
        assert_eq!((first.x, first.y, first.z), (9, 8, 0));
        // No hover: stays put.
        assert_eq!(p.update(&mut store, &tiles, None), None);
        assert_eq!(p.position(), Some((9, 8, 0)));

        p.teardown(&mut store);
        assert_eq!(store.stats().objects, before);
    }
}
