use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use isoview_geom::Vec2;
use isoview_render::{CommandRecorder, FrameOutcome};
use isoview_runtime::{Arrows, ClientConfig, InputState, UpdateOutcome};

use super::Session;

/// Frames per leg of the scripted walk.
const WALK_LEG: u32 = 90;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub frames: u32,
    pub drawn: u32,
    pub skipped: u32,
    pub peak_lights: usize,
    pub journal_lines: usize,
}

/// Drives the scene without a window, pacing frames in real time so the
/// feed thread keeps up. The player walks a square with the arrow keys.
pub fn run(
    session: &mut Session,
    reloads: Option<&Receiver<ClientConfig>>,
    frames: u32,
    frame_ms: u64,
) -> RunReport {
    let mut backend = CommandRecorder::new();
    let mut report = RunReport::default();
    let start = Instant::now();
    let frame_time = Duration::from_millis(frame_ms);

    for frame in 0..frames {
        if let Some(rx) = reloads {
            for cfg in rx.try_iter() {
                session.scene.apply_config(cfg);
            }
        }
        let now = start.elapsed().as_millis() as u64;
        let input = scripted_input(session, frame);
        if session.scene.update(now, &input) == UpdateOutcome::Reconnect {
            session.reconnect(now);
            continue;
        }

        backend.commands.clear();
        match session.scene.draw(&mut backend) {
            FrameOutcome::Drawn { lights, .. } => {
                report.drawn += 1;
                report.peak_lights = report.peak_lights.max(lights);
            }
            FrameOutcome::DeathScreen => report.drawn += 1,
            FrameOutcome::Skipped(reason) => {
                log::debug!("frame {} skipped: {:?}", frame, reason);
                report.skipped += 1;
            }
        }
        report.frames += 1;

        if frame % 120 == 0 {
            let stats = session.scene.stats();
            let chunks = session.scene.store().stats();
            log::info!(
                "frame {}: {} objects in {} chunks, {} lights, {} resident chunks",
                frame,
                stats.objects,
                stats.chunks,
                stats.lights,
                chunks.resident
            );
        }

        let deadline = frame_time * (frame + 1);
        if let Some(wait) = deadline.checked_sub(start.elapsed()) {
            std::thread::sleep(wait);
        }
    }
    report.journal_lines = session.scene.journal().len();
    report
}

fn scripted_input(session: &Session, frame: u32) -> InputState {
    let bounds = session.scene.camera().bounds;
    let center = Vec2::new(
        (bounds.x + bounds.width / 2) as f32,
        (bounds.y + bounds.height / 2) as f32,
    );
    let mut arrows = Arrows::default();
    match (frame / WALK_LEG) % 5 {
        1 => arrows.right = true,
        2 => arrows.down = true,
        3 => arrows.left = true,
        4 => arrows.up = true,
        _ => {}
    }
    InputState {
        mouse: center,
        mouse_over_world: true,
        arrows,
        ..InputState::default()
    }
}
