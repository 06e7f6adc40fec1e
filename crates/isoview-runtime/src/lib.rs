//! Per-frame game scene: collaborator channels, input handling and the
//! update-then-draw loop over the chunk store and render pipeline.
#![forbid(unsafe_code)]

pub mod config;
pub mod input;
pub mod journal;
pub mod messages;
pub mod movement;
pub mod placement;
pub mod scene;
pub mod sim;
pub mod use_queue;

pub use config::{ClientConfig, CorpseOpenPolicy};
pub use input::{Arrows, InputState};
pub use journal::{Journal, JournalEntry};
pub use messages::{
    ChatMessage, ClientCommand, MessageType, MultiTemplate, Targeting, TemplatePart,
    WorldMutation,
};
pub use scene::{GameScene, SceneChannels, UpdateOutcome};
