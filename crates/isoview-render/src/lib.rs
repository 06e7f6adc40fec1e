//! Backend-agnostic frame pipeline: projection, render lists, compositing.
#![forbid(unsafe_code)]

pub mod camera;
pub mod compositor;
pub mod render_list;

pub use camera::{Camera, ChunkRect, TileRect};
pub use compositor::{
    BlendMode, CommandRecorder, Compositor, CompositorSettings, DrawCommand, FrameOutcome,
    FrameView, Overlay, RenderBackend, SkipReason, TargetError, TargetId,
};
pub use render_list::{
    BuildStats, ElevationLimits, RenderListBuilder, RenderListEntry, RenderLists, pick,
};
