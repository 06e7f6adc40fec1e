use isoview_world::{Direction, GameObject};

/// Chat categories as the server tags them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    Regular,
    System,
    Emote,
    Label,
    Spell,
    Party,
    Alliance,
    Guild,
    Command,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub kind: MessageType,
    pub name: String,
    pub text: String,
    pub hue: u16,
    /// Speaking entity, if any.
    pub parent: Option<u32>,
}

/// One piece of a placeable structure, relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplatePart {
    pub graphic: u16,
    pub dx: i32,
    pub dy: i32,
    pub dz: i8,
}

/// Structure being placed under the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiTemplate {
    pub graphic: u16,
    pub hue: u16,
    /// Offset from the hovered tile to the anchor.
    pub pivot: (i32, i32, i8),
    pub parts: Vec<TemplatePart>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Targeting {
    #[default]
    None,
    Object,
    MultiPlacement(MultiTemplate),
}

impl Targeting {
    pub fn is_targeting(&self) -> bool {
        !matches!(self, Targeting::None)
    }
}

/// World-state changes, applied between frames.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldMutation {
    UpsertEntity(GameObject),
    /// Item worn or held by a mobile; never drawn from a cell.
    EquipItem(GameObject),
    RemoveEntity(u32),
    OverheadText {
        serial: u32,
        text: String,
        hue: u16,
        duration_ms: u64,
    },
    Chat(ChatMessage),
    LightLevels { personal: u8, overall: u8 },
    Targeting(Targeting),
    PlayerDead(bool),
    Weather { intensity: u8 },
    BoatMotion {
        serial: u32,
        direction: Option<Direction>,
        step_interval_ms: u64,
    },
    Disconnect,
}

/// Intents sent back to the world-state collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientCommand {
    Walk { direction: Direction, run: bool },
    PathWalk { x: i32, y: i32, z: i8, distance: i32 },
    StopAutoWalk,
    PickUp { serial: u32 },
    DoubleClick { serial: u32 },
    Ping,
    SystemMessage { text: String },
}
