use crate::LIGHT_PROFILE_COUNT;

/// Pixel size of a light shape sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightProfile {
    pub width: u16,
    pub height: u16,
}

/// Shape sizes indexed by light profile id. Id 0 has no shape.
#[derive(Clone, Debug)]
pub struct LightProfileTable {
    profiles: Vec<Option<LightProfile>>,
}

impl Default for LightProfileTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl LightProfileTable {
    pub fn empty() -> Self {
        Self {
            profiles: vec![None; LIGHT_PROFILE_COUNT as usize],
        }
    }

    /// Round glows growing with the id, capped at 256 px.
    pub fn standard() -> Self {
        let mut t = Self::empty();
        for id in 1..LIGHT_PROFILE_COUNT {
            let side = (64 + u16::from(id) * 8).min(256);
            t.set(id, LightProfile {
                width: side,
                height: side,
            });
        }
        t
    }

    pub fn set(&mut self, id: u8, profile: LightProfile) {
        if let Some(slot) = self.profiles.get_mut(id as usize) {
            *slot = Some(profile);
        }
    }

    #[inline]
    pub fn get(&self, id: u8) -> Option<LightProfile> {
        self.profiles.get(id as usize).copied().flatten()
    }
}
