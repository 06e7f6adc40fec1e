use isoview_chunk::ChunkStore;
use isoview_world::{ChunkCoord, GameObject, LandTile, TileMap};
use proptest::prelude::*;

fn store() -> ChunkStore {
    ChunkStore::new(Box::new(TileMap::new(64, 64, LandTile { graphic: 3, z: 0 })))
}

fn arb_tile() -> impl Strategy<Value = (i32, i32, i8)> {
    (0i32..64, 0i32..64, -20i8..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Every resident chunk is either fully built (64 land cells) or absent
    #[test]
    fn resident_chunks_are_complete(reqs in prop::collection::vec((-2i32..10, -2i32..10, any::<bool>()), 1..40)) {
        let mut s = store();
        for (i, (cx, cy, create)) in reqs.into_iter().enumerate() {
            let got = s.get_chunk(cx, cy, create, i as u64).map(|c| c.object_count());
            if let Some(n) = got {
                prop_assert_eq!(n, 64);
            }
            if !create && !s.is_resident(ChunkCoord::new(cx, cy)) {
                prop_assert!(got.is_none());
            }
        }
    }

    // After arbitrary moves an entity sits in exactly the cell matching its position
    #[test]
    fn moves_keep_cells_consistent(moves in prop::collection::vec(arb_tile(), 1..30)) {
        let mut s = store();
        for cx in 0..8 {
            for cy in 0..8 {
                s.get_chunk(cx, cy, true, 0);
            }
        }
        let id = s.spawn(GameObject::mobile(1, 0, 0, 0, 0x190));
        for (x, y, z) in moves {
            prop_assert!(s.move_object(id, x, y, z));
            let obj = s.object(id).unwrap();
            prop_assert_eq!((obj.x, obj.y, obj.z), (x, y, z));
            prop_assert!(s.tile(x, y).unwrap().contains(&id));
            let copies: usize = (0..64)
                .flat_map(|tx| (0..64).map(move |ty| (tx, ty)))
                .map(|(tx, ty)| s.tile(tx, ty).unwrap().iter().filter(|o| **o == id).count())
                .sum();
            prop_assert_eq!(copies, 1);
        }
    }

    // Cells stay sorted by elevation no matter the arrival order
    #[test]
    fn cells_sorted_by_elevation(zs in prop::collection::vec(-50i8..50, 1..12)) {
        let mut s = store();
        s.get_chunk(0, 0, true, 0);
        for (i, z) in zs.iter().enumerate() {
            s.spawn(GameObject::item(100 + i as u32, 4, 4, *z, 0x0EED, 0));
        }
        let keys: Vec<(i8, u8)> = s.tile_objects(4, 4).map(|(_, o)| o.sort_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}
