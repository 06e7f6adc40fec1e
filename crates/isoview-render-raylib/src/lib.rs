//! Raylib presentation of the compositor's command stream.
//!
//! Commands are queued while the scene draws and replayed in [`FrameSink::present`]:
//! first into the world and light render textures, then onto the window.
#![forbid(unsafe_code)]

use isoview_geom::{Point, Rect, Vec2, Vec3};
use isoview_render::{BlendMode, DrawCommand, RenderBackend, TargetError, TargetId};
use raylib::prelude::*;

pub mod conv {
    use isoview_geom::{Rect, Vec2};

    pub fn vec2_to_rl(v: Vec2) -> raylib::prelude::Vector2 {
        raylib::prelude::Vector2::new(v.x, v.y)
    }

    pub fn rect_to_rl(r: Rect) -> raylib::prelude::Rectangle {
        raylib::prelude::Rectangle::new(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
    }

    pub fn blend_to_rl(b: super::BlendMode) -> raylib::consts::BlendMode {
        use raylib::consts::BlendMode as Rl;
        match b {
            super::BlendMode::Alpha => Rl::BLEND_ALPHA,
            super::BlendMode::Additive => Rl::BLEND_ADDITIVE,
            super::BlendMode::Darkness => Rl::BLEND_MULTIPLIED,
            super::BlendMode::AltLights => Rl::BLEND_ADD_COLORS,
        }
    }
}

const TILE_HALF: f32 = 22.0;
const TEXT_SIZE: i32 = 18;

/// Owns the offscreen targets across frames.
#[derive(Default)]
pub struct RaylibBackend {
    world: Option<RenderTexture2D>,
    lights: Option<RenderTexture2D>,
    queue: Vec<DrawCommand>,
}

impl RaylibBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the window handle for one frame.
    pub fn frame<'a>(
        &'a mut self,
        rl: &'a mut RaylibHandle,
        thread: &'a RaylibThread,
    ) -> FrameSink<'a> {
        self.queue.clear();
        FrameSink {
            backend: self,
            rl,
            thread,
        }
    }
}

pub struct FrameSink<'a> {
    backend: &'a mut RaylibBackend,
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
}

impl RenderBackend for FrameSink<'_> {
    fn recreate_targets(&mut self, size: Point) -> Result<(), TargetError> {
        if size.x <= 0 || size.y <= 0 {
            return Err(TargetError::InvalidSize(size.x, size.y));
        }
        let (w, h) = (size.x as u32, size.y as u32);
        let world = self.rl.load_render_texture(self.thread, w, h);
        let lights = self.rl.load_render_texture(self.thread, w, h);
        match (world, lights) {
            (Ok(world), Ok(lights)) => {
                self.backend.world = Some(world);
                self.backend.lights = Some(lights);
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Failed to allocate render texture: {}", e);
                self.backend.world = None;
                self.backend.lights = None;
                Err(TargetError::DeviceLost)
            }
        }
    }

    fn submit(&mut self, cmd: DrawCommand) {
        self.backend.queue.push(cmd);
    }
}

/// Commands split by the target they land on.
#[derive(Default)]
struct Passes {
    world: Vec<DrawCommand>,
    lights: Vec<DrawCommand>,
    screen: Vec<DrawCommand>,
}

fn split_passes(queue: Vec<DrawCommand>) -> Passes {
    let mut passes = Passes::default();
    let mut bound = None;
    for cmd in queue {
        match cmd {
            DrawCommand::BindTarget(t) => bound = Some(t),
            DrawCommand::UnbindTarget => bound = None,
            other => match bound {
                Some(TargetId::World) => passes.world.push(other),
                Some(TargetId::Lights) => passes.lights.push(other),
                None => passes.screen.push(other),
            },
        }
    }
    passes
}

impl FrameSink<'_> {
    /// Replays the queued frame and swaps buffers.
    pub fn present(self) {
        let FrameSink {
            backend,
            rl,
            thread,
        } = self;
        let passes = split_passes(std::mem::take(&mut backend.queue));
        let widths: Vec<i32> = passes
            .screen
            .iter()
            .map(|c| match c {
                DrawCommand::Text { text, .. } => rl.measure_text(text, TEXT_SIZE),
                _ => 0,
            })
            .collect();

        if let Some(rt) = backend.world.as_mut() {
            let mut td = rl.begin_texture_mode(thread, rt);
            replay(&mut td, &passes.world);
        }
        if let Some(rt) = backend.lights.as_mut() {
            let mut td = rl.begin_texture_mode(thread, rt);
            replay(&mut td, &passes.lights);
        }

        let world = backend.world.as_ref();
        let lights = backend.lights.as_ref();
        let mut d = rl.begin_drawing(thread);
        d.clear_background(Color::BLACK);
        let mut blend = BlendMode::Alpha;
        for (i, cmd) in passes.screen.iter().enumerate() {
            match cmd {
                DrawCommand::SetBlend(b) => blend = *b,
                DrawCommand::Composite { source, dest, tint } => {
                    let rt = match source {
                        TargetId::World => world,
                        TargetId::Lights => lights,
                    };
                    let Some(rt) = rt else { continue };
                    let tex = rt.texture().clone();
                    let src = Rectangle::new(0.0, 0.0, tex.width() as f32, -(tex.height() as f32));
                    let a = (tint.z.clamp(0.0, 1.0) * 255.0) as u8;
                    let mut b = d.begin_blend_mode(conv::blend_to_rl(blend));
                    b.draw_texture_pro(
                        tex,
                        src,
                        conv::rect_to_rl(*dest),
                        Vector2::new(0.0, 0.0),
                        0.0,
                        Color::new(255, 255, 255, a),
                    );
                }
                other => {
                    let width = widths.get(i).copied().unwrap_or(0);
                    let mut b = d.begin_blend_mode(conv::blend_to_rl(blend));
                    draw_one(&mut b, other, width);
                }
            }
        }
    }
}

/// Replays an offscreen pass; text only ever lands on screen.
fn replay<D: RaylibDraw>(d: &mut D, cmds: &[DrawCommand]) {
    let mut blend = BlendMode::Alpha;
    for cmd in cmds {
        match cmd {
            DrawCommand::SetBlend(b) => blend = *b,
            DrawCommand::Clear { color, .. } => d.clear_background(float_color(*color)),
            other => {
                let mut b = d.begin_blend_mode(conv::blend_to_rl(blend));
                draw_one(&mut b, other, 0);
            }
        }
    }
}

fn draw_one<D: RaylibDraw>(d: &mut D, cmd: &DrawCommand, text_width: i32) {
    match cmd {
        DrawCommand::Sprite {
            graphic, pos, tint, ..
        } => draw_tile(d, *graphic, *pos, *tint),
        DrawCommand::Light {
            pos, size, tint, ..
        } => {
            let r = f32::from(size.0.max(size.1)) * 0.5;
            let center = Vec2::new(pos.x + f32::from(size.0) * 0.5, pos.y + f32::from(size.1) * 0.5);
            let inner = light_color(*tint);
            d.draw_circle_gradient(
                center.x as i32,
                center.y as i32,
                r,
                inner,
                Color::new(0, 0, 0, 0),
            );
        }
        DrawCommand::Text {
            text,
            pos,
            hue,
            centered,
        } => {
            let x = if *centered {
                pos.x as i32 - text_width / 2
            } else {
                pos.x as i32
            };
            let color = if *hue == 0 {
                Color::WHITE
            } else {
                hue_color(*hue, 255)
            };
            d.draw_text(text, x, pos.y as i32, TEXT_SIZE, color);
        }
        DrawCommand::SelectionRect {
            rect,
            fill_alpha,
            border_alpha,
        } => {
            let fill = Color::new(0, 0, 0, (fill_alpha * 255.0) as u8);
            let border = Color::new(255, 255, 255, (border_alpha * 255.0) as u8);
            d.draw_rectangle_rec(conv::rect_to_rl(*rect), fill);
            d.draw_rectangle_lines_ex(conv::rect_to_rl(*rect), 1.0, border);
        }
        _ => {}
    }
}

/// Flat diamond in place of the art: the color is derived from the graphic.
fn draw_tile<D: RaylibDraw>(d: &mut D, graphic: u16, pos: Vec2, tint: Vec3) {
    let alpha = (tint.z.clamp(0.0, 1.0) * 255.0) as u8;
    let color = if tint.y > 0.0 {
        hue_color(tint.x as u16, alpha)
    } else {
        hue_color(graphic, alpha)
    };
    let top = conv::vec2_to_rl(Vec2::new(pos.x, pos.y - TILE_HALF));
    let left = conv::vec2_to_rl(Vec2::new(pos.x - TILE_HALF, pos.y));
    let bottom = conv::vec2_to_rl(Vec2::new(pos.x, pos.y + TILE_HALF));
    let right = conv::vec2_to_rl(Vec2::new(pos.x + TILE_HALF, pos.y));
    // Counter-clockwise winding.
    d.draw_triangle(top, left, bottom, color);
    d.draw_triangle(top, bottom, right, color);
}

fn float_color(c: [f32; 4]) -> Color {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::new(q(c[0]), q(c[1]), q(c[2]), q(c[3]))
}

fn light_color(tint: Vec3) -> Color {
    if tint.y > 0.0 {
        hue_color(tint.x as u16, 255)
    } else {
        Color::new(255, 255, 255, 255)
    }
}

fn hue_color(id: u16, alpha: u8) -> Color {
    let mut h = u32::from(id).wrapping_mul(0x9E37_79B1);
    h ^= h >> 15;
    Color::new(
        64 + (h & 0x7F) as u8,
        64 + ((h >> 8) & 0x7F) as u8,
        64 + ((h >> 16) & 0x7F) as u8,
        alpha,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_split_on_bind_pairs() {
        let cmds = vec![
            DrawCommand::BindTarget(TargetId::World),
            DrawCommand::Clear {
                color: [0.0; 4],
                depth_stencil: true,
            },
            DrawCommand::UnbindTarget,
            DrawCommand::BindTarget(TargetId::Lights),
            DrawCommand::SetBlend(BlendMode::Additive),
            DrawCommand::UnbindTarget,
            DrawCommand::Composite {
                source: TargetId::World,
                dest: Rect::new(0, 0, 4, 4),
                tint: Vec3::new(0.0, 0.0, 1.0),
            },
        ];
        let p = split_passes(cmds);
        assert_eq!(p.world.len(), 1);
        assert_eq!(p.lights.len(), 1);
        assert_eq!(p.screen.len(), 1);
    }

    #[test]
    fn float_colors_saturate() {
        let c = float_color([2.0, -1.0, 0.5, 1.0]);
        assert_eq!((c.r, c.g, c.b, c.a), (255, 0, 128, 255));
    }
}
