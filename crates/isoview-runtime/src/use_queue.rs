use std::collections::VecDeque;

use isoview_chunk::ChunkStore;

/// Double-clicks queued by the player, released one per delay.
#[derive(Debug, Default)]
pub struct UseQueue {
    queue: VecDeque<u32>,
    next_at: u64,
}

impl UseQueue {
    pub fn push(&mut self, serial: u32) {
        self.queue.push_back(serial);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Drops queued corpses. Serials no longer in the world are kept; the
    /// server rejects them.
    pub fn clear_corpses(&mut self, store: &ChunkStore) -> usize {
        let before = self.queue.len();
        self.queue.retain(|s| {
            !store
                .entity(*s)
                .and_then(|o| o.item_state())
                .is_some_and(|i| i.is_corpse)
        });
        before - self.queue.len()
    }

    /// Serial to use this frame, at most one per `delay_ms`.
    pub fn update(&mut self, now: u64, delay_ms: u64) -> Option<u32> {
        if now < self.next_at {
            return None;
        }
        let serial = self.queue.pop_front()?;
        self.next_at = now + delay_ms;
        Some(serial)
    }
}
