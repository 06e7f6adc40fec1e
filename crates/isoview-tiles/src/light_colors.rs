use hashbrown::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightColor {
    pub color: u16,
    pub is_hue: bool,
}

/// Per-graphic color overrides applied when colored lighting is on.
#[derive(Clone, Debug, Default)]
pub struct LightColorTable {
    by_graphic: HashMap<u16, LightColor>,
}

impl LightColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, graphic: u16, color: u16, is_hue: bool) {
        self.by_graphic.insert(graphic, LightColor { color, is_hue });
    }

    #[inline]
    pub fn get(&self, graphic: u16) -> Option<LightColor> {
        self.by_graphic.get(&graphic).copied()
    }

    pub fn len(&self) -> usize {
        self.by_graphic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_graphic.is_empty()
    }
}
