pub mod feed;
pub mod headless;
pub mod watch;
#[cfg(feature = "window")]
pub mod window;

use std::path::PathBuf;

use crossbeam_channel::unbounded;
use isoview_runtime::{ClientConfig, GameScene, SceneChannels};
use isoview_tiles::TileRegistry;
use isoview_world::worldgen::load_params_from_path;
use isoview_world::{ProceduralMap, WorldGenConfig};

use feed::WorldFeed;

pub struct SessionPaths {
    pub config: PathBuf,
    pub tiles: PathBuf,
    pub worldgen: PathBuf,
}

/// A game scene plus the feed thread playing the server side.
pub struct Session {
    pub scene: GameScene,
    feed: Option<WorldFeed>,
    config: ClientConfig,
    tiles: TileRegistry,
    worldgen: WorldGenConfig,
}

impl Session {
    /// Missing or malformed profiles fall back to defaults.
    pub fn load(paths: &SessionPaths, seed: Option<i32>) -> Self {
        let config = match ClientConfig::load_from_path(&paths.config) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("client config {:?}: {}; using defaults", paths.config, e);
                ClientConfig::default()
            }
        };
        let tiles = match TileRegistry::from_path(&paths.tiles) {
            Ok(t) => {
                log::info!("loaded {} tile definitions from {:?}", t.len(), paths.tiles);
                t
            }
            Err(e) => {
                log::warn!("tiles {:?}: {}; every graphic draws opaque", paths.tiles, e);
                TileRegistry::new()
            }
        };
        let mut worldgen = match load_params_from_path(&paths.worldgen) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("worldgen {:?}: {}; using defaults", paths.worldgen, e);
                WorldGenConfig::default()
            }
        };
        if let Some(seed) = seed {
            worldgen.seed = seed;
        }
        let (scene, feed) = connect(&config, &tiles, &worldgen, 0);
        Self {
            scene,
            feed: Some(feed),
            config,
            tiles,
            worldgen,
        }
    }

    /// Replaces the scene and feed after a disconnect. The live camera and
    /// any reloaded profile carry over.
    pub fn reconnect(&mut self, now: u64) {
        let camera = self.scene.camera_snapshot();
        self.config = self.scene.config().clone();
        self.config.camera = camera;
        if let Some(feed) = self.feed.take() {
            feed.stop();
        }
        let (scene, feed) = connect(&self.config, &self.tiles, &self.worldgen, now);
        self.scene = scene;
        self.feed = Some(feed);
        log::info!("reconnected at {} ms", now);
    }

    pub fn shutdown(self) {
        let Session { scene, feed, .. } = self;
        drop(scene);
        if let Some(feed) = feed {
            feed.stop();
        }
    }
}

fn connect(
    config: &ClientConfig,
    tiles: &TileRegistry,
    worldgen: &WorldGenConfig,
    now: u64,
) -> (GameScene, WorldFeed) {
    let (mutations_tx, mutations) = unbounded();
    let (commands, commands_rx) = unbounded();
    let feed = WorldFeed::start(worldgen.clone(), mutations_tx, commands_rx);
    let scene = GameScene::new(
        config.clone(),
        tiles.clone(),
        Box::new(ProceduralMap::new(worldgen.clone())),
        feed.player_serial(),
        SceneChannels {
            mutations,
            commands,
        },
        now,
    );
    (scene, feed)
}
