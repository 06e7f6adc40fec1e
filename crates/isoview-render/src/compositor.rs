use std::error::Error;
use std::fmt;

use isoview_chunk::{ChunkStore, ObjectId};
use isoview_geom::{Point, Rect, Vec2, Vec3};
use isoview_lighting::{LightAccumulator, LightProfileTable};

use crate::camera::Camera;
use crate::render_list::{ElevationLimits, RenderLists};

/// Shader modes carried in the `y` slot of a tint vector.
pub const HUE_MODE_NONE: f32 = 0.0;
pub const HUE_MODE_HUED: f32 = 1.0;
pub const HUE_MODE_LIGHTS: f32 = 2.0;

pub const DEATH_TEXT: &str = "You are dead";
const DARK_NIGHTS_BIAS: f32 = 0.04;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    World,
    Lights,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    Additive,
    /// Destination multiplied by the source: shadows.
    Darkness,
    /// Source scaled by destination, added: brighter, additive-leaning.
    AltLights,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    BindTarget(TargetId),
    UnbindTarget,
    Clear { color: [f32; 4], depth_stencil: bool },
    SetBlend(BlendMode),
    Sprite {
        id: ObjectId,
        graphic: u16,
        pos: Vec2,
        tint: Vec3,
        depth: f64,
    },
    Light {
        profile: u8,
        pos: Vec2,
        size: (u16, u16),
        tint: Vec3,
    },
    Composite {
        source: TargetId,
        dest: Rect,
        tint: Vec3,
    },
    Text {
        text: String,
        pos: Vec2,
        hue: u16,
        centered: bool,
    },
    SelectionRect {
        rect: Rect,
        fill_alpha: f32,
        border_alpha: f32,
    },
}

impl DrawCommand {
    /// Commands that put pixels on screen (as opposed to state changes, clears and composites).
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            DrawCommand::Sprite { .. }
                | DrawCommand::Light { .. }
                | DrawCommand::Text { .. }
                | DrawCommand::SelectionRect { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetError {
    InvalidSize(i32, i32),
    DeviceLost,
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::InvalidSize(w, h) => write!(f, "cannot create {w}x{h} render target"),
            TargetError::DeviceLost => write!(f, "graphics device lost"),
        }
    }
}

impl Error for TargetError {}

/// Graphics collaborator: owns the two offscreen targets and the visible frame.
pub trait RenderBackend {
    /// (Re)creates the world and light targets at `size`.
    fn recreate_targets(&mut self, size: Point) -> Result<(), TargetError>;
    fn submit(&mut self, cmd: DrawCommand);
}

/// Backend that records the command stream; headless runs and tests use it.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
    /// Number of upcoming `recreate_targets` calls that fail.
    pub failing_recreates: u32,
    pub recreated: u32,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    pub fn sprites(&self) -> impl Iterator<Item = (ObjectId, f64)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Sprite { id, depth, .. } => Some((*id, *depth)),
            _ => None,
        })
    }
}

impl RenderBackend for CommandRecorder {
    fn recreate_targets(&mut self, size: Point) -> Result<(), TargetError> {
        if self.failing_recreates > 0 {
            self.failing_recreates -= 1;
            return Err(TargetError::DeviceLost);
        }
        if size.x <= 0 || size.y <= 0 {
            return Err(TargetError::InvalidSize(size.x, size.y));
        }
        self.recreated += 1;
        Ok(())
    }

    fn submit(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompositorSettings {
    pub alt_lights: bool,
    pub dark_nights: bool,
    pub lighting_active: bool,
    /// Ambient intensity of the light target, `[0, 1]`.
    pub isometric_level: f32,
    pub death_screen: bool,
    pub black_white_death: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub text: String,
    pub pos: Vec2,
    pub hue: u16,
}

/// Everything one draw call reads.
pub struct FrameView<'a> {
    pub store: &'a ChunkStore,
    pub lists: &'a RenderLists,
    pub limits: ElevationLimits,
    pub camera: &'a Camera,
    pub profiles: &'a LightProfileTable,
    pub settings: CompositorSettings,
    /// Anchor of the active multi placement preview.
    pub preview: Option<ObjectId>,
    pub player_dead: bool,
    /// Player is dead and the death timer has not run out.
    pub death_timer_active: bool,
    pub overlays: &'a [Overlay],
    pub selection: Option<Rect>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    EmptyViewport,
    TargetsUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn { sprites: usize, lights: usize },
    DeathScreen,
    Skipped(SkipReason),
}

/// Paints the render list back to front into the world target, the lights
/// into the light target, then blends both into the visible frame.
#[derive(Debug, Default)]
pub struct Compositor {
    target_size: Option<Point>,
    order: Vec<(f64, ObjectId)>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the live offscreen targets, if any.
    pub fn target_size(&self) -> Option<Point> {
        self.target_size
    }

    /// Forces target recreation before the next frame (device reset).
    pub fn invalidate_targets(&mut self) {
        self.target_size = None;
    }

    pub fn draw(
        &mut self,
        backend: &mut dyn RenderBackend,
        frame: &FrameView<'_>,
        lights: &mut LightAccumulator,
    ) -> FrameOutcome {
        let bounds = frame.camera.bounds;
        if frame.settings.death_screen && frame.player_dead && frame.death_timer_active {
            lights.clear();
            backend.submit(DrawCommand::Text {
                text: DEATH_TEXT.to_string(),
                pos: bounds.center(),
                hue: 0,
                centered: true,
            });
            return FrameOutcome::DeathScreen;
        }
        if bounds.is_empty() {
            lights.clear();
            return FrameOutcome::Skipped(SkipReason::EmptyViewport);
        }
        if !self.ensure_targets(backend, bounds.size()) {
            lights.clear();
            return FrameOutcome::Skipped(SkipReason::TargetsUnavailable);
        }

        backend.submit(DrawCommand::BindTarget(TargetId::World));
        backend.submit(DrawCommand::Clear {
            color: [0.0, 0.0, 0.0, 1.0],
            depth_stencil: true,
        });
        backend.submit(DrawCommand::SetBlend(BlendMode::Alpha));
        let sprites = self.draw_world(backend, frame);
        if let Some(preview) = frame.preview {
            if let Some(obj) = frame.store.object(preview) {
                backend.submit(sprite_command(preview, obj));
            }
        }
        backend.submit(DrawCommand::UnbindTarget);

        let light_pass = frame.settings.lighting_active
            && !(frame.player_dead && frame.settings.black_white_death);
        let mut light_count = 0;
        if light_pass {
            light_count = self.draw_lights(backend, frame, lights);
        }
        lights.clear();

        backend.submit(DrawCommand::Composite {
            source: TargetId::World,
            dest: bounds,
            tint: Vec3::new(0.0, 0.0, 1.0),
        });
        if light_pass {
            let (blend, intensity) = if frame.settings.alt_lights {
                (BlendMode::AltLights, 0.5)
            } else {
                (BlendMode::Darkness, 1.0)
            };
            backend.submit(DrawCommand::SetBlend(blend));
            backend.submit(DrawCommand::Composite {
                source: TargetId::Lights,
                dest: bounds,
                tint: Vec3::new(0.0, 0.0, intensity),
            });
            backend.submit(DrawCommand::SetBlend(BlendMode::Alpha));
        }

        for o in frame.overlays {
            backend.submit(DrawCommand::Text {
                text: o.text.clone(),
                pos: o.pos,
                hue: o.hue,
                centered: true,
            });
        }
        if let Some(rect) = frame.selection {
            backend.submit(DrawCommand::SelectionRect {
                rect,
                fill_alpha: 0.7,
                border_alpha: 0.3,
            });
        }

        FrameOutcome::Drawn {
            sprites,
            lights: light_count,
        }
    }

    fn ensure_targets(&mut self, backend: &mut dyn RenderBackend, size: Point) -> bool {
        if self.target_size == Some(size) {
            return true;
        }
        match backend.recreate_targets(size) {
            Ok(()) => {
                log::debug!(target: "frame", "render targets recreated at {}x{}", size.x, size.y);
                self.target_size = Some(size);
                true
            }
            Err(e) => {
                log::warn!(target: "frame", "skipping frame: {}", e);
                self.target_size = None;
                false
            }
        }
    }

    /// Back-to-front: every member of a depth group before the next group.
    fn draw_world(&mut self, backend: &mut dyn RenderBackend, frame: &FrameView<'_>) -> usize {
        self.order.clear();
        self.order.extend(
            frame
                .lists
                .iter()
                .filter(|e| e.z <= frame.limits.max_ground_z)
                .map(|e| (e.depth, e.id)),
        );
        // Stable: equal keys keep list order.
        self.order.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut drawn = 0;
        for (_, id) in &self.order {
            if Some(*id) == frame.preview {
                continue;
            }
            let Some(obj) = frame.store.object(*id) else { continue };
            backend.submit(sprite_command(*id, obj));
            drawn += 1;
        }
        drawn
    }

    fn draw_lights(
        &mut self,
        backend: &mut dyn RenderBackend,
        frame: &FrameView<'_>,
        lights: &LightAccumulator,
    ) -> usize {
        backend.submit(DrawCommand::BindTarget(TargetId::Lights));
        let ambient = if frame.settings.alt_lights {
            0.0
        } else if frame.settings.dark_nights {
            (frame.settings.isometric_level - DARK_NIGHTS_BIAS).max(0.0)
        } else {
            frame.settings.isometric_level
        };
        backend.submit(DrawCommand::Clear {
            color: [ambient, ambient, ambient, 1.0],
            depth_stencil: false,
        });
        backend.submit(DrawCommand::SetBlend(BlendMode::Additive));
        let mut drawn = 0;
        for l in lights.entries() {
            let Some(profile) = frame.profiles.get(l.id) else { continue };
            let mode = if l.color > 1 {
                if l.is_hue { HUE_MODE_HUED } else { HUE_MODE_LIGHTS }
            } else {
                HUE_MODE_NONE
            };
            let (w, h) = (f32::from(profile.width), f32::from(profile.height));
            backend.submit(DrawCommand::Light {
                profile: l.id,
                pos: Vec2::new(l.draw_x - w * 0.5, l.draw_y - h * 0.5),
                size: (profile.width, profile.height),
                tint: Vec3::new(f32::from(l.color), mode, 1.0),
            });
            drawn += 1;
        }
        backend.submit(DrawCommand::SetBlend(BlendMode::Alpha));
        backend.submit(DrawCommand::UnbindTarget);
        drawn
    }
}

fn sprite_command(id: ObjectId, obj: &isoview_world::GameObject) -> DrawCommand {
    let mode = if obj.hue != 0 { HUE_MODE_HUED } else { HUE_MODE_NONE };
    DrawCommand::Sprite {
        id,
        graphic: obj.graphic,
        pos: obj.screen,
        tint: Vec3::new(f32::from(obj.hue), mode, f32::from(obj.alpha) / 255.0),
        depth: obj.depth_key(),
    }
}
