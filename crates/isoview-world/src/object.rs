use isoview_geom::Vec2;

use crate::direction::Direction;

/// Graphic shared by every corpse item.
pub const CORPSE_GRAPHIC: u16 = 0x2006;

#[derive(Clone, Debug, PartialEq)]
pub struct OverheadText {
    pub text: String,
    pub hue: u16,
    pub expires_at: u64,
    /// Screen anchor, recomputed by the render list after each scan.
    pub anchor: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MultiPart {
    pub dx: i32,
    pub dy: i32,
    pub dz: i8,
    /// Serial of the owning multi, resolved through the store.
    pub parent: Option<u32>,
    pub is_preview: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileState {
    pub direction: Direction,
    pub is_dead: bool,
    pub is_hidden: bool,
    pub is_running: bool,
    /// Serial of an equipped light-emitting item.
    pub held_light: Option<u32>,
    /// Emits the default glow without a held source.
    pub self_lit: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemState {
    pub light_id: u8,
    pub is_corpse: bool,
    pub is_multi: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Land,
    Static,
    Multi(MultiPart),
    Mobile(MobileState),
    Item(ItemState),
    Effect { frame: u16 },
}

impl ObjectKind {
    /// Draw priority inside one elevation; later kinds paint over earlier ones.
    #[inline]
    pub fn priority(&self) -> u8 {
        match self {
            ObjectKind::Land => 0,
            ObjectKind::Static | ObjectKind::Multi(_) => 1,
            ObjectKind::Item(_) => 2,
            ObjectKind::Effect { .. } => 3,
            ObjectKind::Mobile(_) => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    pub x: i32,
    pub y: i32,
    pub z: i8,
    pub graphic: u16,
    pub hue: u16,
    pub kind: ObjectKind,
    pub screen: Vec2,
    pub alpha: u8,
    pub foliage_index: u8,
    pub allowed_to_draw: bool,
    /// Server entities carry a serial; land and statics don't.
    pub serial: Option<u32>,
    pub overhead: Option<OverheadText>,
}

impl GameObject {
    pub fn new(kind: ObjectKind, x: i32, y: i32, z: i8, graphic: u16) -> Self {
        Self {
            x,
            y,
            z,
            graphic,
            hue: 0,
            kind,
            screen: Vec2::ZERO,
            alpha: u8::MAX,
            foliage_index: 0,
            allowed_to_draw: true,
            serial: None,
            overhead: None,
        }
    }

    pub fn land(x: i32, y: i32, z: i8, graphic: u16) -> Self {
        Self::new(ObjectKind::Land, x, y, z, graphic)
    }

    pub fn static_tile(x: i32, y: i32, z: i8, graphic: u16) -> Self {
        Self::new(ObjectKind::Static, x, y, z, graphic)
    }

    pub fn mobile(serial: u32, x: i32, y: i32, z: i8, graphic: u16) -> Self {
        let mut o = Self::new(ObjectKind::Mobile(MobileState::default()), x, y, z, graphic);
        o.serial = Some(serial);
        o
    }

    pub fn item(serial: u32, x: i32, y: i32, z: i8, graphic: u16, light_id: u8) -> Self {
        let state = ItemState {
            light_id,
            is_corpse: graphic == CORPSE_GRAPHIC,
            is_multi: false,
        };
        let mut o = Self::new(ObjectKind::Item(state), x, y, z, graphic);
        o.serial = Some(serial);
        o
    }

    pub fn with_hue(mut self, hue: u16) -> Self {
        self.hue = hue;
        self
    }

    #[inline]
    pub fn is_mobile(&self) -> bool {
        matches!(self.kind, ObjectKind::Mobile(_))
    }

    #[inline]
    pub fn is_item(&self) -> bool {
        matches!(self.kind, ObjectKind::Item(_))
    }

    #[inline]
    pub fn mobile_state(&self) -> Option<&MobileState> {
        match &self.kind {
            ObjectKind::Mobile(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn mobile_state_mut(&mut self) -> Option<&mut MobileState> {
        match &mut self.kind {
            ObjectKind::Mobile(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn item_state(&self) -> Option<&ItemState> {
        match &self.kind {
            ObjectKind::Item(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    pub fn multi_part(&self) -> Option<&MultiPart> {
        match &self.kind {
            ObjectKind::Multi(m) => Some(m),
            _ => None,
        }
    }

    /// Cell ordering key: elevation first, then kind priority.
    #[inline]
    pub fn sort_key(&self) -> (i8, u8) {
        (self.z, self.kind.priority())
    }

    /// Continuous painter's-order key. `x + y` dominates (rows nearer the
    /// bottom of the screen paint later), then elevation, then kind priority.
    /// The fractional part stays below 1.0 for every `(z, priority)` pair.
    pub fn depth_key(&self) -> f64 {
        let row = f64::from(self.x + self.y);
        let elev = (i32::from(self.z) + 128) * 8 + i32::from(self.kind.priority());
        row + f64::from(elev) / 4096.0
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.alpha == u8::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_elevation_sorts_later() {
        let low = GameObject::static_tile(10, 10, 0, 1);
        let high = GameObject::static_tile(10, 10, 5, 1);
        assert!(low.depth_key() < high.depth_key());
    }

    #[test]
    fn next_row_beats_any_elevation() {
        let tall = GameObject::mobile(1, 10, 10, 127, 1);
        let next = GameObject::land(11, 10, -128, 1);
        assert!(tall.depth_key() < next.depth_key());
    }

    #[test]
    fn kind_priority_survives_far_rows() {
        let item = GameObject::item(5, 6000, 6000, 0, 0x0E75, 0);
        let mobile = GameObject::mobile(1, 6000, 6000, 0, 1);
        assert!(item.depth_key() < mobile.depth_key());
        let low = GameObject::mobile(1, 6000, 6000, 0, 1);
        let high = GameObject::static_tile(6000, 6000, 1, 1);
        assert!(low.depth_key() < high.depth_key());
    }

    #[test]
    fn corpse_graphic_marks_item() {
        let c = GameObject::item(5, 0, 0, 0, CORPSE_GRAPHIC, 0);
        assert!(c.item_state().unwrap().is_corpse);
    }
}
