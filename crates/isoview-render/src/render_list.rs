use isoview_chunk::{ChunkStore, ObjectId};
use isoview_geom::{Rect, Vec2};
use isoview_lighting::{LightAccumulator, LightContext, LightSkip};
use isoview_tiles::TileRegistry;
use isoview_world::{CORPSE_GRAPHIC, GameObject, ObjectKind};

use crate::camera::{Camera, TILE_HALF, Z_STEP};

/// Milliseconds between foliage alpha steps.
pub const ALPHA_TIME_MS: u64 = 50;
/// Alpha foliage fades to while it covers the player.
pub const FOLIAGE_ALPHA: u8 = 76;
pub const ALPHA_STEP: u8 = 25;
/// Foliage index cycles through `1..FOLIAGE_INDEX_WRAP`.
pub const FOLIAGE_INDEX_WRAP: u8 = 100;
pub const MAX_TRACKED_FOLIAGE: usize = 1024;
/// Roofs at least this far above the player hide everything over them.
pub const ROOF_CLEARANCE: i8 = 16;
/// Foliage this far above the player may hide them.
pub const FOLIAGE_COVER_Z: i8 = 5;
pub const MAX_ELEVATION: i8 = 127;
/// Overhead text sits this many world pixels above the entity.
const OVERHEAD_LIFT: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderListEntry {
    pub id: ObjectId,
    pub depth: f64,
    pub z: i8,
}

/// The four per-frame draw lists.
#[derive(Clone, Debug, Default)]
pub struct RenderLists {
    pub statics: Vec<RenderListEntry>,
    pub animated: Vec<RenderListEntry>,
    pub effects: Vec<RenderListEntry>,
    pub transparent: Vec<RenderListEntry>,
}

impl RenderLists {
    pub fn clear(&mut self) {
        self.statics.clear();
        self.animated.clear();
        self.effects.clear();
        self.transparent.clear();
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.animated.len() + self.effects.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries, list by list, each in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderListEntry> + '_ {
        self.statics
            .iter()
            .chain(self.animated.iter())
            .chain(self.effects.iter())
            .chain(self.transparent.iter())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.iter().any(|e| e.id == id)
    }
}

/// Roof cut-offs for the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElevationLimits {
    /// Objects above this are not drawn at all.
    pub max_z: i8,
    /// Draw pass cut-off; entries above it are skipped by the compositor.
    pub max_ground_z: i8,
}

impl Default for ElevationLimits {
    fn default() -> Self {
        Self {
            max_z: MAX_ELEVATION,
            max_ground_z: MAX_ELEVATION,
        }
    }
}

impl ElevationLimits {
    /// Looks for an opaque cover on the player's tile or the one in front
    /// of it, at least [`ROOF_CLEARANCE`] above the player.
    pub fn compute(store: &ChunkStore, tiles: &TileRegistry, player: Option<&GameObject>) -> Self {
        let Some(p) = player else {
            return Self::default();
        };
        let clearance = p.z.saturating_add(ROOF_CLEARANCE);
        let mut roof: Option<i8> = None;
        for (tx, ty) in [(p.x, p.y), (p.x + 1, p.y + 1)] {
            for (_, o) in store.tile_objects(tx, ty) {
                if !matches!(o.kind, ObjectKind::Static | ObjectKind::Multi(_)) {
                    continue;
                }
                let def = tiles.get(o.graphic);
                if def.foliage || def.transparent || o.z < clearance {
                    continue;
                }
                roof = Some(roof.map_or(o.z, |r| r.min(o.z)));
            }
        }
        match roof {
            Some(max_z) => Self {
                max_z,
                max_ground_z: (clearance - 1).min(max_z - 1),
            },
            None => Self::default(),
        }
    }
}

/// Where a queued light gets its source from once the scan is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingSource {
    Itself,
    Serial(u32),
    None,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingLight {
    pub subject: ObjectId,
    pub source: PendingSource,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub chunks: usize,
    pub objects: usize,
    pub foliage: usize,
    pub lights: usize,
    pub alpha_advanced: bool,
}

/// Rebuilds the draw lists from the visible chunks every frame.
#[derive(Debug)]
pub struct RenderListBuilder {
    lists: RenderLists,
    foliage: Vec<ObjectId>,
    pending_lights: Vec<PendingLight>,
    foliage_index: u8,
    alpha_timer: u64,
    limits: ElevationLimits,
}

impl Default for RenderListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderListBuilder {
    pub fn new() -> Self {
        Self {
            lists: RenderLists::default(),
            foliage: Vec::with_capacity(MAX_TRACKED_FOLIAGE),
            pending_lights: Vec::new(),
            foliage_index: 1,
            alpha_timer: 0,
            limits: ElevationLimits::default(),
        }
    }

    #[inline]
    pub fn lists(&self) -> &RenderLists {
        &self.lists
    }

    #[inline]
    pub fn limits(&self) -> ElevationLimits {
        self.limits
    }

    #[inline]
    pub fn foliage_index(&self) -> u8 {
        self.foliage_index
    }

    pub fn pending_lights(&self) -> &[PendingLight] {
        &self.pending_lights
    }

    pub fn tracked_foliage(&self) -> &[ObjectId] {
        &self.foliage
    }

    /// Advances the alpha timer; returns whether foliage alpha steps this frame.
    fn tick_alpha(&mut self, now: u64) -> bool {
        if self.alpha_timer > now {
            return false;
        }
        self.alpha_timer = now + ALPHA_TIME_MS;
        self.foliage_index += 1;
        if self.foliage_index >= FOLIAGE_INDEX_WRAP {
            self.foliage_index = 1;
        }
        true
    }

    pub fn build(
        &mut self,
        store: &mut ChunkStore,
        tiles: &TileRegistry,
        camera: &Camera,
        player: Option<ObjectId>,
        now: u64,
    ) -> BuildStats {
        self.lists.clear();
        self.foliage.clear();
        self.pending_lights.clear();
        let alpha_advanced = self.tick_alpha(now);

        let player_obj = player.and_then(|id| store.object(id)).cloned().map(|mut p| {
            p.screen = camera.project(p.x, p.y, p.z);
            p
        });
        self.limits = ElevationLimits::compute(store, tiles, player_obj.as_ref());
        let limits = self.limits;
        let player_rect = player_obj.as_ref().map(|p| sprite_rect(camera, tiles, p));
        let cover_z = player_obj
            .as_ref()
            .map(|p| p.z.saturating_add(FOLIAGE_COVER_Z));
        let viewport = camera.bounds.at_origin();
        let zoom = camera.zoom();
        let foliage_index = self.foliage_index;

        let mut stats = BuildStats {
            alpha_advanced,
            ..BuildStats::default()
        };
        let lists = &mut self.lists;
        let foliage = &mut self.foliage;
        let lights = &mut self.pending_lights;

        for coord in camera.chunk_rect().iter() {
            if store.get_chunk(coord.cx, coord.cy, true, now).is_none() {
                continue;
            }
            stats.chunks += 1;
            store.for_each_in_chunk(coord, |id, obj| {
                if !obj.allowed_to_draw || obj.z > limits.max_z {
                    return;
                }
                obj.screen = camera.project(obj.x, obj.y, obj.z);
                let rect = sprite_rect(camera, tiles, obj);
                if !rect.intersects(&viewport) {
                    return;
                }
                let def = tiles.get(obj.graphic);
                let entry = RenderListEntry {
                    id,
                    depth: obj.depth_key(),
                    z: obj.z,
                };
                let light_at = (obj.screen.x, obj.screen.y);
                match obj.kind {
                    ObjectKind::Land => lists.statics.push(entry),
                    ObjectKind::Static | ObjectKind::Multi(_) => {
                        if def.foliage {
                            if foliage.len() < MAX_TRACKED_FOLIAGE {
                                foliage.push(id);
                            }
                            let covers = match (player_rect, cover_z) {
                                (Some(pr), Some(cz)) => obj.z >= cz && rect.intersects(&pr),
                                _ => false,
                            };
                            if covers {
                                obj.foliage_index = foliage_index;
                            }
                        }
                        if def.is_light_source() {
                            lights.push(PendingLight {
                                subject: id,
                                source: PendingSource::Itself,
                                x: light_at.0,
                                y: light_at.1,
                            });
                        }
                        let preview = obj.multi_part().is_some_and(|m| m.is_preview);
                        if !obj.is_opaque() || preview {
                            lists.transparent.push(entry);
                        } else if def.animated {
                            lists.animated.push(entry);
                        } else {
                            lists.statics.push(entry);
                        }
                    }
                    ObjectKind::Item(item) => {
                        if item.light_id != 0 || def.is_light_source() {
                            lights.push(PendingLight {
                                subject: id,
                                source: PendingSource::Itself,
                                x: light_at.0,
                                y: light_at.1,
                            });
                        }
                        if obj.is_opaque() {
                            lists.statics.push(entry);
                        } else {
                            lists.transparent.push(entry);
                        }
                    }
                    ObjectKind::Mobile(m) => {
                        let source = match (m.held_light, m.self_lit) {
                            (Some(serial), _) => Some(PendingSource::Serial(serial)),
                            (None, true) => Some(PendingSource::None),
                            (None, false) => None,
                        };
                        if let Some(source) = source {
                            lights.push(PendingLight {
                                subject: id,
                                source,
                                x: light_at.0,
                                y: light_at.1,
                            });
                        }
                        if m.is_hidden || !obj.is_opaque() {
                            lists.transparent.push(entry);
                        } else {
                            lists.animated.push(entry);
                        }
                    }
                    ObjectKind::Effect { .. } => lists.effects.push(entry),
                }
                stats.objects += 1;
            });
        }

        if alpha_advanced {
            for id in &self.foliage {
                let Some(f) = store.object_mut(*id) else { continue };
                if f.foliage_index == self.foliage_index {
                    f.alpha = step_alpha(f.alpha, FOLIAGE_ALPHA);
                } else if f.z < limits.max_z {
                    f.alpha = step_alpha(f.alpha, u8::MAX);
                }
            }
        }

        update_overhead_anchors(store, camera, zoom);

        stats.foliage = self.foliage.len();
        stats.lights = self.pending_lights.len();
        log::trace!(
            target: "frame",
            "render list: chunks={} objects={} foliage={} lights={}",
            stats.chunks,
            stats.objects,
            stats.foliage,
            stats.lights
        );
        stats
    }

    /// Feeds the queued light requests, in scan order, to the accumulator.
    /// Returns how many made it into the buffer.
    pub fn collect_lights(&self, acc: &mut LightAccumulator, ctx: &LightContext<'_>) -> usize {
        let mut added = 0;
        for req in &self.pending_lights {
            let source = match req.source {
                PendingSource::Itself => Some(req.subject),
                PendingSource::Serial(s) => ctx.store.entity_by_serial(s),
                PendingSource::None => None,
            };
            match acc.add_light(ctx, Some(req.subject), source, req.x, req.y) {
                Ok(_) => added += 1,
                Err(LightSkip::BufferFull) => {
                    log::trace!(target: "lights", "light buffer full, dropping the rest");
                    break;
                }
                Err(reason) => log::trace!(target: "lights", "light skipped: {:?}", reason),
            }
        }
        added
    }
}

/// Moves `alpha` one step toward `target`.
pub fn step_alpha(alpha: u8, target: u8) -> u8 {
    if alpha < target {
        alpha.saturating_add(ALPHA_STEP).min(target)
    } else if alpha > target {
        alpha.saturating_sub(ALPHA_STEP).max(target)
    } else {
        alpha
    }
}

/// Conservative screen footprint of an object's sprite.
pub fn sprite_rect(camera: &Camera, tiles: &TileRegistry, obj: &GameObject) -> Rect {
    let zoom = camera.zoom();
    let height = f32::from(tiles.get(obj.graphic).height) * Z_STEP + 2.0 * TILE_HALF;
    let half = TILE_HALF * zoom;
    let top = obj.screen.y - half - height * zoom;
    Rect::new(
        (obj.screen.x - half).floor() as i32,
        top.floor() as i32,
        (2.0 * half).ceil() as i32,
        (obj.screen.y + half - top).ceil() as i32,
    )
}

/// Re-anchors overhead text: mobiles always, items only when they are corpses.
fn update_overhead_anchors(store: &mut ChunkStore, camera: &Camera, zoom: f32) {
    for (_, e) in store.entities_mut() {
        if !(e.is_mobile() || e.graphic == CORPSE_GRAPHIC) {
            continue;
        }
        let (x, y, z) = (e.x, e.y, e.z);
        if let Some(text) = e.overhead.as_mut() {
            text.anchor = camera.project(x, y, z) - Vec2::new(0.0, OVERHEAD_LIFT * zoom);
        }
    }
}

/// Topmost drawn entry whose sprite covers `p` (render-target pixels).
pub fn pick(
    store: &ChunkStore,
    tiles: &TileRegistry,
    camera: &Camera,
    lists: &RenderLists,
    p: Vec2,
) -> Option<ObjectId> {
    let point = p.floor();
    lists
        .iter()
        .filter_map(|e| store.object(e.id).map(|o| (e, o)))
        .filter(|(_, o)| !matches!(o.kind, ObjectKind::Land))
        .filter(|(_, o)| sprite_rect(camera, tiles, o).contains(point))
        .max_by(|a, b| a.0.depth.total_cmp(&b.0.depth))
        .map(|(e, _)| e.id)
}
