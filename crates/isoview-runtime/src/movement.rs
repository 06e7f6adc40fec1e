use isoview_geom::{Point, Vec2};
use isoview_world::Direction;

use crate::config::MovementConfig;
use crate::input::InputState;

/// Tiles a followed mobile may lead before a path-walk is requested.
pub const FOLLOW_SLACK: i32 = 3;

/// Throttles step requests to the walk/run cadence.
#[derive(Debug, Default)]
pub struct Walker {
    next_step_at: u64,
    pub last: Option<(Direction, bool)>,
}

impl Walker {
    pub fn can_step(&self, now: u64) -> bool {
        now >= self.next_step_at
    }

    /// Records a step if the cadence allows one.
    pub fn step(&mut self, now: u64, direction: Direction, run: bool, cfg: &MovementConfig) -> bool {
        if !self.can_step(now) {
            return false;
        }
        let delay = if run { cfg.run_delay_ms } else { cfg.walk_delay_ms };
        self.next_step_at = now + delay;
        self.last = Some((direction, run));
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkTarget {
    pub x: i32,
    pub y: i32,
    pub z: i8,
    /// Stop once within this many tiles.
    pub distance: i32,
}

/// Client-side auto-walk toward a tile, one straight-line step at a time.
#[derive(Debug, Default)]
pub struct AutoWalk {
    target: Option<WalkTarget>,
}

impl AutoWalk {
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<WalkTarget> {
        self.target
    }

    pub fn start(&mut self, target: WalkTarget) {
        self.target = Some(target);
    }

    /// Returns whether a walk was in progress.
    pub fn stop(&mut self) -> bool {
        self.target.take().is_some()
    }

    /// Next step from `from`, finishing the walk once inside the target distance.
    pub fn next_step(&mut self, from: Point) -> Option<Direction> {
        let t = self.target?;
        if from.chebyshev(Point::new(t.x, t.y)) <= t.distance {
            self.target = None;
            return None;
        }
        Direction::towards(from.x, from.y, t.x, t.y)
    }
}

#[derive(Debug, Default)]
pub struct Follow {
    target: Option<u32>,
}

impl Follow {
    pub fn start(&mut self, serial: u32) {
        self.target = Some(serial);
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    pub fn stop(&mut self) -> bool {
        self.target.take().is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowAction {
    Stop,
    PathWalk,
    Hold,
}

/// Decides what following a mobile at `distance` tiles calls for.
pub fn follow_action(distance: Option<i32>, view_range: i32) -> FollowAction {
    match distance {
        None => FollowAction::Stop,
        Some(d) if d > view_range => FollowAction::Stop,
        Some(d) if d > FOLLOW_SLACK => FollowAction::PathWalk,
        Some(_) => FollowAction::Hold,
    }
}

/// Where the movement intent of this frame came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveIntent {
    Drag(Direction, bool),
    Arrows(Direction, bool),
    Analog(Direction, bool),
}

impl MoveIntent {
    pub fn direction(self) -> (Direction, bool) {
        match self {
            MoveIntent::Drag(d, r) | MoveIntent::Arrows(d, r) | MoveIntent::Analog(d, r) => (d, r),
        }
    }
}

/// Mouse drag first, then arrow keys. Both yield to an active auto-walk.
pub fn keyboard_or_drag(
    input: &InputState,
    viewport_center: Vec2,
    cfg: &MovementConfig,
    auto_walking: bool,
) -> Option<MoveIntent> {
    if auto_walking {
        return None;
    }
    if input.right_down {
        let v = input.mouse - viewport_center;
        let dir = Direction::from_vector(v)?;
        let run = cfg.always_run || v.length() >= cfg.drag_run_distance;
        return Some(MoveIntent::Drag(dir, run));
    }
    if cfg.disable_arrows {
        return None;
    }
    let a = input.arrows;
    Direction::from_arrows(a.up, a.down, a.left, a.right)
        .map(|d| MoveIntent::Arrows(d, cfg.always_run))
}

pub fn analog(input: &InputState, cfg: &MovementConfig) -> Option<MoveIntent> {
    if input.analog == Vec2::ZERO {
        return None;
    }
    let dir = Direction::from_vector(input.analog)?;
    let run = cfg.always_run || input.analog.length() > cfg.run_threshold;
    Some(MoveIntent::Analog(dir, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Arrows;

    #[test]
    fn walker_respects_cadence() {
        let cfg = MovementConfig::default();
        let mut w = Walker::default();
        assert!(w.step(0, Direction::East, false, &cfg));
        assert!(!w.step(399, Direction::East, false, &cfg));
        assert!(w.step(400, Direction::East, true, &cfg));
        assert!(!w.can_step(599));
        assert!(w.can_step(600));
    }

    #[test]
    fn auto_walk_finishes_inside_distance() {
        let mut a = AutoWalk::default();
        a.start(WalkTarget { x: 10, y: 10, z: 0, distance: 1 });
        assert_eq!(a.next_step(Point::new(5, 10)), Some(Direction::East));
        assert_eq!(a.next_step(Point::new(8, 8)), Some(Direction::Down));
        assert_eq!(a.next_step(Point::new(9, 10)), None);
        assert!(!a.is_active());
    }

    #[test]
    fn follow_thresholds() {
        assert_eq!(follow_action(None, 18), FollowAction::Stop);
        assert_eq!(follow_action(Some(19), 18), FollowAction::Stop);
        assert_eq!(follow_action(Some(4), 18), FollowAction::PathWalk);
        assert_eq!(follow_action(Some(3), 18), FollowAction::Hold);
    }

    #[test]
    fn drag_beats_arrows_and_auto_walk_beats_both() {
        let cfg = MovementConfig::default();
        let mut input = InputState {
            right_down: true,
            mouse: Vec2::new(100.0, 0.0),
            arrows: Arrows { up: true, ..Arrows::default() },
            ..InputState::default()
        };
        let center = Vec2::new(0.0, 0.0);
        assert!(matches!(keyboard_or_drag(&input, center, &cfg, false), Some(MoveIntent::Drag(_, false))));
        input.right_down = false;
        assert_eq!(
            keyboard_or_drag(&input, center, &cfg, false),
            Some(MoveIntent::Arrows(Direction::Up, false))
        );
        assert_eq!(keyboard_or_drag(&input, center, &cfg, true), None);
        let no_arrows = MovementConfig { disable_arrows: true, ..MovementConfig::default() };
        assert_eq!(keyboard_or_drag(&input, center, &no_arrows, false), None);
    }

    #[test]
    fn analog_runs_past_threshold() {
        let cfg = MovementConfig::default();
        let mut input = InputState { analog: Vec2::new(0.0, -0.5), ..InputState::default() };
        assert_eq!(analog(&input, &cfg), Some(MoveIntent::Analog(Direction::Up, false)));
        input.analog = Vec2::new(0.0, -1.0);
        assert_eq!(analog(&input, &cfg), Some(MoveIntent::Analog(Direction::Up, true)));
    }
}
