use crossbeam_channel::{Receiver, Sender};
use isoview_chunk::{ChunkStore, ObjectId};
use isoview_geom::{Point, Rect};
use isoview_lighting::{
    LightAccumulator, LightContext, LightLevels, LightProfileTable, LightSettings,
};
use isoview_render::{
    BuildStats, Camera, Compositor, CompositorSettings, FrameOutcome, FrameView, Overlay,
    RenderBackend, RenderListBuilder, RenderLists, pick,
};
use isoview_tiles::TileRegistry;
use isoview_world::{Direction, GameObject, MapSource, OverheadText};

use crate::config::{CameraConfig, ClientConfig};
use crate::input::InputState;
use crate::journal::{self, Journal, JournalEntry};
use crate::messages::{ClientCommand, MessageType, Targeting, WorldMutation};
use crate::movement::{
    AutoWalk, Follow, FollowAction, WalkTarget, Walker, analog, follow_action, keyboard_or_drag,
};
use crate::placement::MultiPreview;
use crate::sim::{AnimationClock, Boats, LightCycle, Weather, advance_effects};
use crate::use_queue::UseQueue;

pub const STOPPED_FOLLOWING: &str = "Stopped following";
const OVERHEAD_BASE_MS: u64 = 4000;
const OVERHEAD_PER_CHAR_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Continue,
    /// Connection lost: the caller tears the scene down and reconnects.
    Reconnect,
}

/// Collaborator endpoints the scene talks through.
pub struct SceneChannels {
    pub mutations: Receiver<WorldMutation>,
    pub commands: Sender<ClientCommand>,
}

/// The in-game scene: world state, per-frame update and draw.
pub struct GameScene {
    config: ClientConfig,
    tiles: TileRegistry,
    store: ChunkStore,
    camera: Camera,
    builder: RenderListBuilder,
    lights: LightAccumulator,
    profiles: LightProfileTable,
    compositor: Compositor,
    channels: SceneChannels,
    player_serial: u32,

    levels: LightLevels,
    server_levels: bool,
    light_settings: LightSettings,
    light_cycle: LightCycle,
    animation: AnimationClock,
    weather: Weather,
    boats: Boats,

    now: u64,
    last_update: Option<u64>,
    next_cleanup: u64,
    next_ping: u64,
    disconnected: bool,

    walker: Walker,
    auto_walk: AutoWalk,
    follow: Follow,
    use_queue: UseQueue,
    targeting: Targeting,
    preview: Option<MultiPreview>,
    player_dead: bool,
    death_until: u64,
    journal: Journal,

    hovered: Option<ObjectId>,
    dwell_since: Option<u64>,
    was_left_down: bool,
    selection: Option<Rect>,
    overlays: Vec<Overlay>,
    stats: BuildStats,
}

impl GameScene {
    pub fn new(
        config: ClientConfig,
        tiles: TileRegistry,
        map: Box<dyn MapSource>,
        player_serial: u32,
        channels: SceneChannels,
        now: u64,
    ) -> Self {
        let camera = camera_from_config(&config.camera);
        let light_cycle = LightCycle::new(config.lighting.day_length_ms);
        let next_cleanup = now + config.timing.first_cleanup_ms;
        log::info!(
            "game scene loaded: player {:#x}, viewport {}x{}",
            player_serial,
            camera.bounds.width,
            camera.bounds.height
        );
        Self {
            light_settings: config.light_settings(),
            config,
            tiles,
            store: ChunkStore::new(map),
            camera,
            builder: RenderListBuilder::new(),
            lights: LightAccumulator::new(),
            profiles: LightProfileTable::standard(),
            compositor: Compositor::new(),
            channels,
            player_serial,
            levels: LightLevels::default(),
            server_levels: false,
            light_cycle,
            animation: AnimationClock::default(),
            weather: Weather::default(),
            boats: Boats::default(),
            now,
            last_update: None,
            next_cleanup,
            next_ping: now,
            disconnected: false,
            walker: Walker::default(),
            auto_walk: AutoWalk::default(),
            follow: Follow::default(),
            use_queue: UseQueue::default(),
            targeting: Targeting::None,
            preview: None,
            player_dead: false,
            death_until: 0,
            journal: Journal::default(),
            hovered: None,
            dwell_since: None,
            was_left_down: false,
            selection: None,
            overlays: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Swaps in a reloaded profile. Camera zoom and viewport follow it.
    pub fn apply_config(&mut self, config: ClientConfig) {
        let offset = self.camera.offset;
        let (fx, fy, fz) = (self.camera.focus_x, self.camera.focus_y, self.camera.focus_z);
        self.camera = camera_from_config(&config.camera);
        self.camera.offset = offset;
        self.camera.set_focus(fx, fy, fz);
        self.light_cycle.set_day_length(config.lighting.day_length_ms);
        self.config = config;
        log::info!("client config applied");
    }

    /// Writes the live zoom and viewport back into the profile.
    pub fn camera_snapshot(&mut self) -> CameraConfig {
        let b = self.camera.bounds;
        let cam = &mut self.config.camera;
        cam.zoom = self.camera.zoom();
        cam.x = b.x;
        cam.y = b.y;
        cam.width = b.width;
        cam.height = b.height;
        cam.clone()
    }

    pub fn resize(&mut self, bounds: Rect) {
        self.camera.bounds = bounds;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    pub fn render_lists(&self) -> &RenderLists {
        self.builder.lists()
    }

    pub fn lights(&self) -> &LightAccumulator {
        &self.lights
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn animation_frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn light_levels(&self) -> LightLevels {
        self.levels
    }

    pub fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }

    pub fn preview(&self) -> Option<&MultiPreview> {
        self.preview.as_ref()
    }

    pub fn is_following(&self) -> bool {
        self.follow.target().is_some()
    }

    pub fn is_auto_walking(&self) -> bool {
        self.auto_walk.is_active()
    }

    pub fn player_id(&self) -> Option<ObjectId> {
        self.store.entity_by_serial(self.player_serial)
    }

    fn player(&self) -> Option<&GameObject> {
        self.store.entity(self.player_serial)
    }

    fn player_tile(&self) -> Option<Point> {
        self.player().map(|p| Point::new(p.x, p.y))
    }

    pub fn follow(&mut self, serial: u32) {
        self.follow.start(serial);
        log::debug!("following {:#x}", serial);
    }

    /// Queues a double-click, released at the use cadence.
    pub fn double_click_delayed(&mut self, serial: u32) {
        self.use_queue.push(serial);
    }

    pub fn walk_to(&mut self, x: i32, y: i32, z: i8, distance: i32) {
        self.auto_walk.start(WalkTarget { x, y, z, distance });
        self.send(ClientCommand::PathWalk { x, y, z, distance });
    }

    fn send(&self, cmd: ClientCommand) {
        log::trace!(target: "commands", "{:?}", cmd);
        if self.channels.commands.send(cmd).is_err() {
            log::debug!(target: "commands", "command channel closed");
        }
    }

    /// One frame of game logic. Mutations queued since the last frame are
    /// applied first, then the frame's render list and lights are rebuilt.
    pub fn update(&mut self, now: u64, input: &InputState) -> UpdateOutcome {
        let dt = self.last_update.map_or(0, |t| now.saturating_sub(t));
        self.last_update = Some(now);
        self.now = now;
        self.apply_mutations(now);

        self.hovered = if input.mouse_over_world {
            pick(&self.store, &self.tiles, &self.camera, self.builder.lists(), input.mouse)
        } else {
            None
        };

        if now >= self.next_cleanup {
            let evicted = self.store.clear_unused_blocks(now);
            if evicted > 0 {
                log::debug!(target: "chunks", "evicted {} chunks", evicted);
            }
            self.next_cleanup = now + self.config.timing.cleanup_interval_ms;
        }

        if now >= self.next_ping {
            self.send(ClientCommand::Ping);
            self.next_ping = now + self.config.timing.ping_interval_ms;
        }

        if self.disconnected {
            self.teardown_preview();
            self.auto_walk.stop();
            self.follow.stop();
            self.use_queue.clear();
            log::info!("disconnected, leaving game scene");
            return UpdateOutcome::Reconnect;
        }

        self.simulate(now, dt);
        self.process_auto_walk(now);
        self.process_movement(now, input);
        self.process_follow();
        self.process_use_queue(now);
        self.process_placement();
        self.process_dwell(now, input);

        self.selection = input.selection;
        self.prepare_frame(now);
        UpdateOutcome::Continue
    }

    /// Composites the frame prepared by the last [`update`](Self::update).
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) -> FrameOutcome {
        let settings = CompositorSettings {
            alt_lights: self.light_settings.use_alt_lights,
            dark_nights: self.light_settings.dark_nights,
            lighting_active: self.light_settings.active(),
            isometric_level: self.levels.isometric_level(),
            death_screen: self.config.death.screen,
            black_white_death: self.config.death.black_white,
        };
        let view = FrameView {
            store: &self.store,
            lists: self.builder.lists(),
            limits: self.builder.limits(),
            camera: &self.camera,
            profiles: &self.profiles,
            settings,
            preview: self.preview.as_ref().and_then(|p| p.anchor()),
            player_dead: self.player_dead,
            death_timer_active: self.now < self.death_until,
            overlays: &self.overlays,
            selection: self.selection,
        };
        self.compositor.draw(backend, &view, &mut self.lights)
    }

    fn apply_mutations(&mut self, now: u64) {
        let pending: Vec<WorldMutation> = self.channels.mutations.try_iter().collect();
        for m in pending {
            self.apply(m, now);
        }
    }

    fn apply(&mut self, m: WorldMutation, now: u64) {
        match m {
            WorldMutation::UpsertEntity(obj) => {
                if self.store.upsert_entity(obj).is_none() {
                    log::warn!("entity update without a serial ignored");
                }
            }
            WorldMutation::EquipItem(obj) => {
                self.store.spawn_equipped(obj);
            }
            WorldMutation::RemoveEntity(serial) => {
                self.store.remove_entity(serial);
            }
            WorldMutation::OverheadText {
                serial,
                text,
                hue,
                duration_ms,
            } => self.set_overhead(serial, text, hue, now + duration_ms),
            WorldMutation::Chat(msg) => {
                let Some(entry) = journal::route(&msg, &self.config.hues) else {
                    return;
                };
                if let Some(parent) = msg.parent {
                    let expires = now
                        + OVERHEAD_BASE_MS
                        + OVERHEAD_PER_CHAR_MS * msg.text.chars().count() as u64;
                    self.set_overhead(parent, msg.text.clone(), entry.hue, expires);
                }
                self.journal.push(entry);
            }
            WorldMutation::LightLevels { personal, overall } => {
                self.levels.server_personal = personal;
                self.levels.server_overall = overall;
                self.server_levels = true;
                log::debug!(target: "lights", "light levels personal={} overall={}", personal, overall);
            }
            WorldMutation::Targeting(t) => self.targeting = t,
            WorldMutation::PlayerDead(dead) => {
                self.player_dead = dead;
                self.death_until = if dead {
                    now + self.config.death.timer_ms
                } else {
                    0
                };
            }
            WorldMutation::Weather { intensity } => self.weather.set_target(intensity),
            WorldMutation::BoatMotion {
                serial,
                direction,
                step_interval_ms,
            } => self.boats.set_motion(serial, direction, step_interval_ms, now),
            WorldMutation::Disconnect => self.disconnected = true,
        }
    }

    fn set_overhead(&mut self, serial: u32, text: String, hue: u16, expires_at: u64) {
        let Some(id) = self.store.entity_by_serial(serial) else {
            return;
        };
        if let Some(obj) = self.store.object_mut(id) {
            let anchor = obj.screen;
            obj.overhead = Some(OverheadText {
                text,
                hue,
                expires_at,
                anchor,
            });
        }
    }

    fn simulate(&mut self, now: u64, dt: u64) {
        if self.animation.tick(now) {
            advance_effects(&mut self.store);
        }
        self.weather.tick(now);
        self.boats.tick(&mut self.store, now);
        let cycle_level = self.light_cycle.advance(dt);
        if !self.server_levels {
            self.levels.server_overall = cycle_level;
        }
        self.levels.custom_overall = self.config.lighting.custom_level;
    }

    fn walk(&mut self, now: u64, direction: Direction, run: bool) -> bool {
        if !self.walker.step(now, direction, run, &self.config.movement) {
            return false;
        }
        if let Some(id) = self.player_id() {
            if let Some(m) = self.store.object_mut(id).and_then(|o| o.mobile_state_mut()) {
                m.direction = direction;
                m.is_running = run;
            }
        }
        self.send(ClientCommand::Walk { direction, run });
        true
    }

    fn process_auto_walk(&mut self, now: u64) {
        if !self.auto_walk.is_active() || !self.walker.can_step(now) {
            return;
        }
        let Some(from) = self.player_tile() else {
            return;
        };
        if let Some(dir) = self.auto_walk.next_step(from) {
            self.walk(now, dir, self.config.movement.always_run);
        }
    }

    fn process_movement(&mut self, now: u64, input: &InputState) {
        let center = self.camera.bounds.at_origin().center();
        let intent = keyboard_or_drag(
            input,
            center,
            &self.config.movement,
            self.auto_walk.is_active(),
        );
        if let Some(intent) = intent {
            let (dir, run) = intent.direction();
            self.walk(now, dir, run);
        } else if let Some(intent) = analog(input, &self.config.movement) {
            if self.config.movement.joystick_cancels_follow {
                self.stop_following();
            }
            // An auto-walk that survived the cancel keeps the walker.
            if !self.auto_walk.is_active() {
                let (dir, run) = intent.direction();
                self.walk(now, dir, run);
            }
        }
    }

    fn process_follow(&mut self) {
        let Some(serial) = self.follow.target() else {
            return;
        };
        if self.auto_walk.is_active() {
            return;
        }
        let target = self
            .store
            .entity(serial)
            .filter(|o| o.is_mobile())
            .map(|o| (o.x, o.y, o.z));
        let distance = match (target, self.player_tile()) {
            (Some((x, y, _)), Some(p)) => Some(p.chebyshev(Point::new(x, y))),
            _ => None,
        };
        match follow_action(distance, self.config.interaction.view_range) {
            FollowAction::Stop => self.stop_following(),
            FollowAction::PathWalk => {
                if let Some((x, y, z)) = target {
                    self.walk_to(x, y, z, 1);
                }
            }
            FollowAction::Hold => {}
        }
    }

    fn stop_following(&mut self) {
        if !self.follow.stop() {
            return;
        }
        self.auto_walk.stop();
        self.send(ClientCommand::StopAutoWalk);
        self.journal.push(JournalEntry {
            name: String::new(),
            text: STOPPED_FOLLOWING.to_string(),
            hue: self.config.hues.system,
            kind: MessageType::Regular,
        });
        self.send(ClientCommand::SystemMessage {
            text: STOPPED_FOLLOWING.to_string(),
        });
    }

    fn process_use_queue(&mut self, now: u64) {
        let policy = self.config.interaction.corpse_open;
        let hidden = self
            .player()
            .and_then(|p| p.mobile_state())
            .is_some_and(|m| m.is_hidden);
        if (policy.prune_while_targeting() && self.targeting.is_targeting())
            || (policy.prune_while_hidden() && hidden)
        {
            let pruned = self.use_queue.clear_corpses(&self.store);
            if pruned > 0 {
                log::debug!("dropped {} queued corpse uses", pruned);
            }
        }
        if let Some(serial) = self
            .use_queue
            .update(now, self.config.interaction.use_delay_ms)
        {
            self.send(ClientCommand::DoubleClick { serial });
        }
    }

    fn process_placement(&mut self) {
        if let Targeting::MultiPlacement(template) = &self.targeting {
            if self
                .preview
                .as_ref()
                .is_some_and(|p| p.template() != template)
            {
                if let Some(old) = self.preview.take() {
                    old.teardown(&mut self.store);
                }
            }
            let preview = self
                .preview
                .get_or_insert_with(|| MultiPreview::new(template.clone()));
            preview.update(&mut self.store, &self.tiles, self.hovered);
            return;
        }
        self.teardown_preview();
    }

    fn teardown_preview(&mut self) {
        if let Some(p) = self.preview.take() {
            p.teardown(&mut self.store);
            log::debug!("multi preview removed");
        }
    }

    fn process_dwell(&mut self, now: u64, input: &InputState) {
        let pressed = input.left_down && !self.was_left_down;
        self.was_left_down = input.left_down;
        if pressed && input.mouse_over_world {
            self.dwell_since = Some(now);
        }
        if !input.left_down || input.is_dragging() {
            self.dwell_since = None;
            return;
        }
        let Some(since) = self.dwell_since else {
            return;
        };
        if now.saturating_sub(since) < self.config.interaction.pick_up_dwell_ms {
            return;
        }
        let serial = self
            .hovered
            .and_then(|id| self.store.object(id))
            .filter(|o| o.is_item())
            .and_then(|o| o.serial);
        if let Some(serial) = serial {
            self.send(ClientCommand::PickUp { serial });
            self.dwell_since = None;
        }
    }

    fn prepare_frame(&mut self, now: u64) {
        if let Some((x, y, z)) = self.player().map(|p| (p.x, p.y, p.z)) {
            self.camera.set_focus(x, y, z);
        }
        for (_, e) in self.store.entities_mut() {
            if e.overhead.as_ref().is_some_and(|t| t.expires_at <= now) {
                e.overhead = None;
            }
        }

        let player = self.player_id();
        self.stats = self
            .builder
            .build(&mut self.store, &self.tiles, &self.camera, player, now);

        self.light_settings = LightSettings {
            use_lights: self.levels.use_lights(),
            ..self.config.light_settings()
        };
        self.lights.clear();
        let ctx = LightContext {
            store: &self.store,
            tiles: &self.tiles,
            settings: &self.light_settings,
            max_z: self.builder.limits().max_z,
            zoom: self.camera.zoom(),
        };
        self.builder.collect_lights(&mut self.lights, &ctx);

        self.overlays.clear();
        for (_, e) in self.store.entities() {
            if let Some(t) = &e.overhead {
                self.overlays.push(Overlay {
                    text: t.text.clone(),
                    pos: t.anchor,
                    hue: t.hue,
                });
            }
        }
    }
}

fn camera_from_config(cfg: &CameraConfig) -> Camera {
    let mut camera = Camera::new(cfg.bounds());
    camera.set_zoom(cfg.zoom);
    camera.elevation_margin = cfg.elevation_margin;
    camera.sprite_margin = cfg.sprite_margin;
    camera
}
