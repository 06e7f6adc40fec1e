use isoview_chunk::{ChunkStore, ObjectId};
use isoview_tiles::TileRegistry;
use isoview_world::{GameObject, ObjectKind};

use crate::levels::LightSettings;
use crate::{
    DEFAULT_MOBILE_PROFILE, FIRE_PROFILE, LIGHT_PROFILE_COUNT, MAX_LIGHTS_PER_FRAME, OCCLUSION_BAND,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightEntry {
    pub id: u8,
    /// Recolor index, `0` for none. Stored with a +1 bias.
    pub color: u16,
    pub is_hue: bool,
    pub draw_x: f32,
    pub draw_y: f32,
}

/// Why a light request produced no entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightSkip {
    BufferFull,
    LightingDisabled,
    NoSubject,
    Occluded,
    InvalidProfile,
}

/// Read-only frame state a light request is resolved against.
pub struct LightContext<'a> {
    pub store: &'a ChunkStore,
    pub tiles: &'a TileRegistry,
    pub settings: &'a LightSettings,
    /// Roof cut-off for the frame; occluders above it don't count.
    pub max_z: i8,
    /// Screen pixels per world pixel, applied to facing offsets.
    pub zoom: f32,
}

#[inline]
pub fn is_fire_graphic(graphic: u16) -> bool {
    matches!(graphic, 0x3E02..=0x3E0B | 0x3914..=0x3929 | 0x0B1D)
}

/// Fixed-capacity light buffer filled in scan order, first come first served.
#[derive(Debug)]
pub struct LightAccumulator {
    entries: Vec<LightEntry>,
    capacity: usize,
}

impl Default for LightAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl LightAccumulator {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIGHTS_PER_FRAME)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn entries(&self) -> &[LightEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Hands the frame's entries to the compositor and resets the buffer.
    pub fn take(&mut self) -> Vec<LightEntry> {
        let mut out = Vec::with_capacity(self.capacity);
        std::mem::swap(&mut out, &mut self.entries);
        out
    }

    /// Resolves one light request. `subject` is the object being lit
    /// (a mobile, a lamp), `source` the object emitting (the same lamp, or
    /// the item a mobile holds). Returns the entry index on success.
    pub fn add_light(
        &mut self,
        ctx: &LightContext<'_>,
        subject: Option<ObjectId>,
        source: Option<ObjectId>,
        x: f32,
        y: f32,
    ) -> Result<usize, LightSkip> {
        if self.is_full() {
            return Err(LightSkip::BufferFull);
        }
        if !ctx.settings.active() {
            return Err(LightSkip::LightingDisabled);
        }
        let subject_id = subject.ok_or(LightSkip::NoSubject)?;
        let obj = ctx.store.object(subject_id).ok_or(LightSkip::NoSubject)?;
        let light_obj = source.and_then(|id| ctx.store.object(id));
        let graphic = light_obj.unwrap_or(obj).graphic;

        if is_occluded(ctx, obj) {
            return Err(LightSkip::Occluded);
        }

        let mut draw_x = x;
        let mut draw_y = y;
        let mut id = if is_fire_graphic(graphic) {
            FIRE_PROFILE
        } else if source == subject && obj.is_item() {
            obj.item_state().map(|i| i.light_id).unwrap_or(0)
        } else if let Some(held) = light_obj.filter(|o| o.is_item()) {
            if let Some(m) = obj.mobile_state() {
                let (dx, dy) = m.direction.light_offset();
                draw_x += dx * ctx.zoom;
                draw_y += dy * ctx.zoom;
            }
            let def = ctx.tiles.get(held.graphic);
            match def.light {
                Some(l) => l,
                None => held.item_state().map(|i| i.light_id).unwrap_or(0),
            }
        } else if obj.is_mobile() {
            DEFAULT_MOBILE_PROFILE
        } else {
            ctx.tiles.get(obj.graphic).light_index()
        };

        let mut color: u16 = 0;
        let mut is_hue = false;
        if ctx.settings.colored_lights {
            if id > 200 {
                color = u16::from(id - 200);
                id = 1;
            }
            if let Some(c) = ctx.tiles.light_colors.get(graphic) {
                color = c.color;
                is_hue = c.is_hue;
            }
        }

        if id >= LIGHT_PROFILE_COUNT {
            log::trace!(target: "lights", "discarding profile {} from 0x{:04X}", id, obj.graphic);
            return Err(LightSkip::InvalidProfile);
        }
        if color != 0 {
            color += 1;
        }

        self.entries.push(LightEntry {
            id,
            color,
            is_hue,
            draw_x,
            draw_y,
        });
        Ok(self.entries.len() - 1)
    }
}

/// Opaque statics or multi parts on the tile diagonally in front of the
/// subject, inside the elevation band and under the roof cut-off.
fn is_occluded(ctx: &LightContext<'_>, subject: &GameObject) -> bool {
    let top = subject.z.saturating_add(OCCLUSION_BAND);
    ctx.store
        .tile_objects(subject.x + 1, subject.y + 1)
        .any(|(_, o)| {
            matches!(o.kind, ObjectKind::Static | ObjectKind::Multi(_))
                && o.allowed_to_draw
                && !ctx.tiles.get(o.graphic).transparent
                && o.z >= subject.z
                && o.z <= top
                && o.z <= ctx.max_z
        })
}
