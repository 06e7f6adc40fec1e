use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};

use isoview_chunk::ChunkStore;
use isoview_geom::Rect;
use isoview_render::{Camera, RenderListBuilder};
use isoview_tiles::{TileDef, TileRegistry};
use isoview_world::{ProceduralMap, WorldGenConfig};

fn registry(cfg: &WorldGenConfig) -> TileRegistry {
    let mut reg = TileRegistry::new();
    reg.insert(TileDef {
        graphic: cfg.trees.leaves,
        name: "leaves".into(),
        foliage: true,
        ..TileDef::default()
    });
    reg.insert(TileDef {
        graphic: cfg.lamps.graphic,
        name: "lamp".into(),
        light: Some(4),
        ..TileDef::default()
    });
    reg
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_list_build");
    group.measurement_time(Duration::from_secs(5));
    let cfg = WorldGenConfig::default();
    let tiles = registry(&cfg);
    let mut store = ChunkStore::new(Box::new(ProceduralMap::new(cfg)));
    let mut cam = Camera::new(Rect::new(0, 0, 1280, 720));
    cam.set_focus(300, 300, 0);
    let mut builder = RenderListBuilder::new();
    // Warm: materialize the visible chunks once.
    builder.build(&mut store, &tiles, &cam, None, 0);
    let mut now = 0u64;
    group.bench_function("procedural_1280x720", |b| {
        b.iter(|| {
            now += 16;
            let stats = builder.build(&mut store, &tiles, &cam, None, now);
            black_box(stats.objects)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
