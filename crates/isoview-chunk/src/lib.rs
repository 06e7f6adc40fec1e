//! Chunked world storage: an object arena plus 8x8-cell chunks of handles.
#![forbid(unsafe_code)]

mod chunk;
mod store;

pub use chunk::Chunk;
pub use store::{ChunkStore, ChunkStoreStats};

slotmap::new_key_type! {
    /// Arena handle for a [`isoview_world::GameObject`]; stale handles resolve to `None`.
    pub struct ObjectId;
}

#[cfg(test)]
mod tests;
