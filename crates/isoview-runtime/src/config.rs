use isoview_geom::Rect;
use isoview_lighting::LightSettings;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Client profile: everything the frame loop reads from the user's settings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub death: DeathConfig,
    #[serde(default)]
    pub hues: HuesConfig,
}

impl ClientConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Light switches; `use_lights` is left for the frame loop to derive.
    pub fn light_settings(&self) -> LightSettings {
        LightSettings {
            use_lights: false,
            use_alt_lights: self.lighting.alt_lights,
            colored_lights: self.lighting.colored_lights,
            dark_nights: self.lighting.dark_nights,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LightingConfig {
    #[serde(default)]
    pub alt_lights: bool,
    #[serde(default = "default_true")]
    pub colored_lights: bool,
    #[serde(default)]
    pub dark_nights: bool,
    /// Overrides the server's overall light level (0 bright .. 31 dark).
    #[serde(default)]
    pub custom_level: Option<u8>,
    /// Length of the local day when the server sends no light levels.
    #[serde(default = "default_day_length_ms")]
    pub day_length_ms: u64,
}
fn default_true() -> bool {
    true
}
fn default_day_length_ms() -> u64 {
    10 * 60 * 1000
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            alt_lights: false,
            colored_lights: default_true(),
            dark_nights: false,
            custom_level: None,
            day_length_ms: default_day_length_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_elevation_margin")]
    pub elevation_margin: i32,
    #[serde(default = "default_sprite_margin")]
    pub sprite_margin: f32,
}
fn default_zoom() -> f32 {
    1.0
}
fn default_width() -> i32 {
    1280
}
fn default_height() -> i32 {
    720
}
fn default_elevation_margin() -> i32 {
    40
}
fn default_sprite_margin() -> f32 {
    88.0
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            x: 0,
            y: 0,
            width: default_width(),
            height: default_height(),
            elevation_margin: default_elevation_margin(),
            sprite_margin: default_sprite_margin(),
        }
    }
}
impl CameraConfig {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovementConfig {
    #[serde(default)]
    pub disable_arrows: bool,
    #[serde(default)]
    pub always_run: bool,
    #[serde(default = "default_true")]
    pub joystick_cancels_follow: bool,
    /// Analog stick deflection above which the player runs.
    #[serde(default = "default_run_threshold")]
    pub run_threshold: f32,
    /// Mouse distance from the viewport center above which drag-walking runs.
    #[serde(default = "default_drag_run_distance")]
    pub drag_run_distance: f32,
    #[serde(default = "default_walk_delay_ms")]
    pub walk_delay_ms: u64,
    #[serde(default = "default_run_delay_ms")]
    pub run_delay_ms: u64,
}
fn default_run_threshold() -> f32 {
    0.75
}
fn default_drag_run_distance() -> f32 {
    190.0
}
fn default_walk_delay_ms() -> u64 {
    400
}
fn default_run_delay_ms() -> u64 {
    200
}
impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            disable_arrows: false,
            always_run: false,
            joystick_cancels_follow: default_true(),
            run_threshold: default_run_threshold(),
            drag_run_distance: default_drag_run_distance(),
            walk_delay_ms: default_walk_delay_ms(),
            run_delay_ms: default_run_delay_ms(),
        }
    }
}

/// Which states suppress queued corpse opening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpseOpenPolicy {
    #[default]
    Always,
    NotTargeting,
    NotHidden,
    Both,
}

impl CorpseOpenPolicy {
    pub fn prune_while_targeting(self) -> bool {
        matches!(self, CorpseOpenPolicy::NotTargeting | CorpseOpenPolicy::Both)
    }

    pub fn prune_while_hidden(self) -> bool {
        matches!(self, CorpseOpenPolicy::NotHidden | CorpseOpenPolicy::Both)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InteractionConfig {
    #[serde(default)]
    pub corpse_open: CorpseOpenPolicy,
    #[serde(default = "default_dwell_ms")]
    pub pick_up_dwell_ms: u64,
    #[serde(default = "default_use_delay_ms")]
    pub use_delay_ms: u64,
    /// Tiles beyond which a followed mobile is dropped.
    #[serde(default = "default_view_range")]
    pub view_range: i32,
}
fn default_dwell_ms() -> u64 {
    1000
}
fn default_use_delay_ms() -> u64 {
    1000
}
fn default_view_range() -> i32 {
    18
}
impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            corpse_open: CorpseOpenPolicy::default(),
            pick_up_dwell_ms: default_dwell_ms(),
            use_delay_ms: default_use_delay_ms(),
            view_range: default_view_range(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_first_cleanup_ms")]
    pub first_cleanup_ms: u64,
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
}
fn default_first_cleanup_ms() -> u64 {
    5000
}
fn default_cleanup_interval_ms() -> u64 {
    500
}
fn default_ping_interval_ms() -> u64 {
    1000
}
impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            first_cleanup_ms: default_first_cleanup_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            ping_interval_ms: default_ping_interval_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DeathConfig {
    #[serde(default = "default_true")]
    pub screen: bool,
    #[serde(default = "default_true")]
    pub black_white: bool,
    #[serde(default = "default_death_timer_ms")]
    pub timer_ms: u64,
}
fn default_death_timer_ms() -> u64 {
    1500
}
impl Default for DeathConfig {
    fn default() -> Self {
        Self {
            screen: default_true(),
            black_white: default_true(),
            timer_ms: default_death_timer_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HuesConfig {
    #[serde(default = "default_emote_hue")]
    pub emote: u16,
    #[serde(default = "default_party_hue")]
    pub party: u16,
    #[serde(default = "default_guild_hue")]
    pub guild: u16,
    #[serde(default = "default_alliance_hue")]
    pub alliance: u16,
    #[serde(default = "default_system_hue")]
    pub system: u16,
}
fn default_emote_hue() -> u16 {
    0x0021
}
fn default_party_hue() -> u16 {
    0x0044
}
fn default_guild_hue() -> u16 {
    0x0044
}
fn default_alliance_hue() -> u16 {
    0x0057
}
fn default_system_hue() -> u16 {
    0x03B2
}
impl Default for HuesConfig {
    fn default() -> Self {
        Self {
            emote: default_emote_hue(),
            party: default_party_hue(),
            guild: default_guild_hue(),
            alliance: default_alliance_hue(),
            system: default_system_hue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.timing.first_cleanup_ms, 5000);
        assert_eq!(cfg.interaction.use_delay_ms, 1000);
        assert!(cfg.lighting.colored_lights);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = ClientConfig::from_toml_str(
            r#"
            [lighting]
            alt_lights = true
            custom_level = 12

            [interaction]
            corpse_open = "both"
            "#,
        )
        .unwrap();
        assert!(cfg.lighting.alt_lights);
        assert_eq!(cfg.lighting.custom_level, Some(12));
        assert!(cfg.lighting.colored_lights);
        assert_eq!(cfg.interaction.corpse_open, CorpseOpenPolicy::Both);
        assert_eq!(cfg.interaction.view_range, 18);
        let ls = cfg.light_settings();
        assert!(ls.use_alt_lights && ls.colored_lights && !ls.use_lights);
    }

    #[test]
    fn corpse_policy_flags() {
        assert!(!CorpseOpenPolicy::Always.prune_while_targeting());
        assert!(CorpseOpenPolicy::NotTargeting.prune_while_targeting());
        assert!(!CorpseOpenPolicy::NotTargeting.prune_while_hidden());
        assert!(CorpseOpenPolicy::NotHidden.prune_while_hidden());
        assert!(CorpseOpenPolicy::Both.prune_while_targeting());
        assert!(CorpseOpenPolicy::Both.prune_while_hidden());
    }
}
