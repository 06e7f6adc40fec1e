use std::time::Instant;

use crossbeam_channel::Receiver;
use isoview_geom::{Rect, Vec2};
use isoview_render::FrameOutcome;
use isoview_render_raylib::RaylibBackend;
use isoview_runtime::{Arrows, ClientConfig, InputState, UpdateOutcome};
use raylib::prelude::*;

use super::Session;

const ZOOM_STEP: f32 = 0.1;
const STICK_DEADZONE: f32 = 0.15;

/// Mouse-button bookkeeping across frames.
#[derive(Default)]
struct PointerTracker {
    press_origin: Option<Vec2>,
}

impl PointerTracker {
    fn sample(&mut self, rl: &RaylibHandle, world: Rect) -> InputState {
        let m = rl.get_mouse_position();
        let mouse = Vec2::new(m.x, m.y);
        let left_down = rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT);
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            self.press_origin = Some(mouse);
        }
        if !left_down {
            self.press_origin = None;
        }
        let drag_distance = self
            .press_origin
            .map_or(0.0, |o| Vec2::new(mouse.x - o.x, mouse.y - o.y).length());
        let selection = match self.press_origin {
            Some(o) if rl.is_key_down(KeyboardKey::KEY_LEFT_SHIFT) => Some(Rect::new(
                o.x.min(mouse.x) as i32,
                o.y.min(mouse.y) as i32,
                (o.x - mouse.x).abs() as i32,
                (o.y - mouse.y).abs() as i32,
            )),
            _ => None,
        };
        let over_world = mouse.x >= world.x as f32
            && mouse.y >= world.y as f32
            && mouse.x < world.right() as f32
            && mouse.y < world.bottom() as f32;

        InputState {
            mouse,
            mouse_over_world: over_world && rl.is_window_focused(),
            left_down,
            right_down: rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_RIGHT),
            arrows: Arrows {
                up: rl.is_key_down(KeyboardKey::KEY_UP),
                down: rl.is_key_down(KeyboardKey::KEY_DOWN),
                left: rl.is_key_down(KeyboardKey::KEY_LEFT),
                right: rl.is_key_down(KeyboardKey::KEY_RIGHT),
            },
            analog: stick(rl),
            drag_distance,
            selection,
        }
    }
}

fn stick(rl: &RaylibHandle) -> Vec2 {
    if !rl.is_gamepad_available(0) {
        return Vec2::ZERO;
    }
    let v = Vec2::new(
        rl.get_gamepad_axis_movement(0, GamepadAxis::GAMEPAD_AXIS_LEFT_X),
        rl.get_gamepad_axis_movement(0, GamepadAxis::GAMEPAD_AXIS_LEFT_Y),
    );
    if v.length() < STICK_DEADZONE {
        Vec2::ZERO
    } else {
        v
    }
}

pub fn run(session: &mut Session, reloads: Option<&Receiver<ClientConfig>>) {
    let bounds = session.scene.camera().bounds;
    let (mut rl, thread) = raylib::init()
        .size(bounds.right(), bounds.bottom())
        .title("isoview")
        .resizable()
        .build();
    rl.set_target_fps(60);

    let mut backend = RaylibBackend::new();
    let mut pointer = PointerTracker::default();
    let start = Instant::now();

    while !rl.window_should_close() {
        if let Some(rx) = reloads {
            for cfg in rx.try_iter() {
                session.scene.apply_config(cfg);
            }
        }
        if rl.is_window_resized() {
            let b = session.scene.camera().bounds;
            session.scene.resize(Rect::new(
                b.x,
                b.y,
                rl.get_screen_width() - b.x,
                rl.get_screen_height() - b.y,
            ));
        }
        let wheel = rl.get_mouse_wheel_move();
        if wheel != 0.0 {
            let zoom = session.scene.camera().zoom();
            session.scene.camera_mut().set_zoom(zoom + wheel * ZOOM_STEP);
        }
        if let (Some(id), true) = (
            session.scene.hovered(),
            rl.is_key_pressed(KeyboardKey::KEY_F),
        ) {
            if let Some(serial) = session.scene.store().object(id).and_then(|o| o.serial) {
                session.scene.follow(serial);
            }
        }

        let input = pointer.sample(&rl, session.scene.camera().bounds);
        let now = start.elapsed().as_millis() as u64;
        if session.scene.update(now, &input) == UpdateOutcome::Reconnect {
            session.reconnect(now);
            continue;
        }

        let mut sink = backend.frame(&mut rl, &thread);
        if let FrameOutcome::Skipped(reason) = session.scene.draw(&mut sink) {
            log::debug!("frame skipped: {:?}", reason);
        }
        sink.present();
    }
    let camera = session.scene.camera_snapshot();
    log::info!(
        "window closed at zoom {:.2}, viewport {}x{}",
        camera.zoom,
        camera.width,
        camera.height
    );
}
