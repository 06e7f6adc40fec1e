use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TilesConfig {
    #[serde(default)]
    pub tiles: Vec<TileDefConfig>,
    #[serde(default)]
    pub light_colors: Vec<LightColorConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TileDefConfig {
    pub graphic: u16,
    pub name: String,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub wet: bool,
    #[serde(default)]
    pub foliage: bool,
    #[serde(default)]
    pub roof: bool,
    #[serde(default)]
    pub animated: bool,
    /// Light profile index for light-emitting tiles (`layer` in tile data terms).
    #[serde(default)]
    pub light: Option<u8>,
    #[serde(default = "default_height")]
    pub height: u8,
}

fn default_height() -> u8 {
    0
}

#[derive(Clone, Debug, Deserialize)]
pub struct LightColorConfig {
    pub graphic: u16,
    pub color: u16,
    #[serde(default)]
    pub is_hue: bool,
}
