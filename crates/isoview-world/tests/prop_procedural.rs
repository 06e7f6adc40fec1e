use isoview_world::{ChunkCoord, MapSource, ProceduralMap, WorldGenConfig};
use proptest::prelude::*;

fn small_map(seed: i32) -> ProceduralMap {
    let cfg = WorldGenConfig {
        width: 128,
        height: 96,
        seed,
        ..WorldGenConfig::default()
    };
    ProceduralMap::new(cfg)
}

#[test]
fn config_defaults_parse_from_empty_toml() {
    let cfg: WorldGenConfig = toml::from_str("").expect("defaults");
    assert_eq!(cfg.width, 896);
    assert!(cfg.trees.probability > 0.0);
}

#[test]
fn partial_toml_overrides_one_section() {
    let cfg: WorldGenConfig = toml::from_str("seed = 7\n[trees]\nprobability = 0.5\n").expect("cfg");
    assert_eq!(cfg.seed, 7);
    assert_eq!(cfg.trees.probability, 0.5);
    assert_eq!(cfg.water.graphic, 0x00A8);
}

proptest! {
    // Sampling the same tile twice yields the same land and statics
    #[test]
    fn sampling_is_deterministic(seed in any::<i32>(), x in 0i32..128, y in 0i32..96) {
        let map = small_map(seed);
        prop_assert_eq!(map.land(x, y), map.land(x, y));
        let mut a = Vec::new();
        let mut b = Vec::new();
        map.statics(x, y, &mut a);
        map.statics(x, y, &mut b);
        prop_assert_eq!(a, b);
    }

    // Inside bounds there is always land; outside there is none
    #[test]
    fn land_matches_bounds(seed in any::<i32>(), x in -20i32..150, y in -20i32..120) {
        let map = small_map(seed);
        prop_assert_eq!(map.land(x, y).is_some(), map.in_bounds(x, y));
        if map.in_bounds(x, y) {
            prop_assert!(map.chunk_in_bounds(ChunkCoord::from_tile(x, y)));
        }
    }

    // Statics never sit below their tile's land
    #[test]
    fn statics_rest_on_land(seed in any::<i32>(), x in 0i32..128, y in 0i32..96) {
        let map = small_map(seed);
        let land = map.land(x, y).unwrap();
        let mut out = Vec::new();
        map.statics(x, y, &mut out);
        for s in out {
            prop_assert!(s.z >= land.z);
        }
    }
}
