//! Timed world simulation advanced once per update.

use std::f32::consts::TAU;

use hashbrown::HashMap;
use isoview_chunk::ChunkStore;
use isoview_lighting::LightLevels;
use isoview_world::{Direction, ObjectKind};

pub const ANIMATION_INTERVAL_MS: u64 = 100;
pub const WEATHER_STEP_MS: u64 = 50;

/// Frame counter for animated statics and effects.
#[derive(Debug, Default)]
pub struct AnimationClock {
    next_at: u64,
    frame: u32,
}

impl AnimationClock {
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Advances at most one frame; returns whether it did.
    pub fn tick(&mut self, now: u64) -> bool {
        if now < self.next_at {
            return false;
        }
        self.next_at = now + ANIMATION_INTERVAL_MS;
        self.frame = self.frame.wrapping_add(1);
        true
    }
}

/// Steps every effect one animation frame.
pub fn advance_effects(store: &mut ChunkStore) -> usize {
    let mut n = 0;
    for (_, obj) in store.entities_mut() {
        if let ObjectKind::Effect { frame } = &mut obj.kind {
            *frame = frame.wrapping_add(1);
            n += 1;
        }
    }
    n
}

/// Precipitation intensity easing toward the server's target.
#[derive(Debug, Default)]
pub struct Weather {
    pub intensity: u8,
    pub target: u8,
    next_at: u64,
}

impl Weather {
    pub fn set_target(&mut self, target: u8) {
        self.target = target;
    }

    pub fn tick(&mut self, now: u64) {
        if now < self.next_at || self.intensity == self.target {
            return;
        }
        self.next_at = now + WEATHER_STEP_MS;
        if self.intensity < self.target {
            self.intensity += 1;
        } else {
            self.intensity -= 1;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BoatState {
    direction: Direction,
    interval_ms: u64,
    next_at: u64,
}

/// Moving multis, stepped one tile at a time with their components.
#[derive(Debug, Default)]
pub struct Boats {
    moving: HashMap<u32, BoatState>,
}

impl Boats {
    /// Starts, redirects or (with `None`) stops a boat.
    pub fn set_motion(&mut self, serial: u32, direction: Option<Direction>, interval_ms: u64, now: u64) {
        match direction {
            Some(direction) => {
                self.moving.insert(
                    serial,
                    BoatState {
                        direction,
                        interval_ms: interval_ms.max(1),
                        next_at: now + interval_ms.max(1),
                    },
                );
            }
            None => {
                self.moving.remove(&serial);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.moving.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moving.is_empty()
    }

    /// Returns the number of tile steps taken.
    pub fn tick(&mut self, store: &mut ChunkStore, now: u64) -> usize {
        let mut steps = 0;
        self.moving.retain(|serial, boat| {
            let Some(hull) = store.entity_by_serial(*serial) else {
                log::debug!("boat {:#x} gone, stopping", serial);
                return false;
            };
            while now >= boat.next_at {
                boat.next_at += boat.interval_ms;
                let (dx, dy) = boat.direction.delta();
                let Some((x, y, z)) = store.object(hull).map(|o| (o.x + dx, o.y + dy, o.z)) else {
                    return false;
                };
                store.move_object(hull, x, y, z);
                for part in store.multi_components(*serial) {
                    let Some((px, py, pz)) = store.object(part).map(|o| (o.x + dx, o.y + dy, o.z))
                    else {
                        continue;
                    };
                    store.move_object(part, px, py, pz);
                }
                steps += 1;
            }
            true
        });
        steps
    }
}

/// Local day/night cycle used while the server has not sent light levels.
pub struct LightCycle {
    time_ms: u64,
    day_length_ms: u64,
}

impl LightCycle {
    pub fn new(day_length_ms: u64) -> Self {
        Self {
            time_ms: 0,
            day_length_ms: day_length_ms.max(1),
        }
    }

    pub fn set_day_length(&mut self, day_length_ms: u64) {
        self.day_length_ms = day_length_ms.max(1);
    }

    pub fn advance(&mut self, dt_ms: u64) -> u8 {
        self.time_ms = (self.time_ms + dt_ms) % self.day_length_ms;
        self.overall_level()
    }

    /// Overall light level for the current time of day: 0 at noon, darkest at midnight.
    pub fn overall_level(&self) -> u8 {
        let frac = self.time_ms as f32 / self.day_length_ms as f32;
        let phase = frac * TAU;
        let sky_scale = 0.5 * (1.0 + phase.sin());
        let brightness = sky_scale.powf(1.5);
        ((1.0 - brightness) * f32::from(LightLevels::DARKEST)).round() as u8
    }
}
