use isoview_geom::Vec2;
use serde::{Deserialize, Serialize};

/// Eight-way facing on the tile grid. Names follow the screen-space
/// convention: `Up` is screen-up (world north-west), `Right` is screen-right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    #[default]
    North = 0,
    Right = 1,
    East = 2,
    Down = 3,
    South = 4,
    Left = 5,
    West = 6,
    Up = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Right,
        Direction::East,
        Direction::Down,
        Direction::South,
        Direction::Left,
        Direction::West,
        Direction::Up,
    ];

    #[inline]
    pub fn from_index(i: u8) -> Direction {
        Self::ALL[(i & 7) as usize]
    }

    /// Tile delta of one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::Right => (1, -1),
            Direction::East => (1, 0),
            Direction::Down => (1, 1),
            Direction::South => (0, 1),
            Direction::Left => (-1, 1),
            Direction::West => (-1, 0),
            Direction::Up => (-1, -1),
        }
    }

    /// Direction of the single step from `(x, y)` towards `(tx, ty)`, or `None` when equal.
    pub fn towards(x: i32, y: i32, tx: i32, ty: i32) -> Option<Direction> {
        let d = ((tx - x).signum(), (ty - y).signum());
        Self::ALL.into_iter().find(|dir| dir.delta() == d)
    }

    /// Decodes held arrow keys into a direction. Opposite keys do not cancel:
    /// vertical keys take precedence the way the classic client reads them.
    pub fn from_arrows(up: bool, down: bool, left: bool, right: bool) -> Option<Direction> {
        if up {
            if left {
                Some(Direction::West)
            } else if right {
                Some(Direction::North)
            } else {
                Some(Direction::Up)
            }
        } else if down {
            if left {
                Some(Direction::South)
            } else if right {
                Some(Direction::East)
            } else {
                Some(Direction::Down)
            }
        } else if left {
            Some(Direction::Left)
        } else if right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Snaps an analog stick vector (screen space, y down) to the nearest octant.
    pub fn from_vector(v: Vec2) -> Option<Direction> {
        if v.x == 0.0 && v.y == 0.0 {
            return None;
        }
        // 0 rad points screen-up, growing clockwise.
        let angle = v.x.atan2(-v.y);
        let octant = (angle / core::f32::consts::FRAC_PI_4).round() as i32;
        const CLOCKWISE_FROM_UP: [Direction; 8] = [
            Direction::Up,
            Direction::North,
            Direction::Right,
            Direction::East,
            Direction::Down,
            Direction::South,
            Direction::Left,
            Direction::West,
        ];
        Some(CLOCKWISE_FROM_UP[octant.rem_euclid(8) as usize])
    }

    /// Screen offset of a held light relative to the mobile's anchor.
    pub fn light_offset(self) -> (f32, f32) {
        match self {
            Direction::Right => (22.0, 33.0),
            Direction::Left => (-22.0, 33.0),
            Direction::East => (22.0, 55.0),
            Direction::Down => (0.0, 55.0),
            Direction::South => (-22.0, 55.0),
            Direction::North | Direction::West | Direction::Up => (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_decode_eight_ways() {
        assert_eq!(Direction::from_arrows(true, false, false, false), Some(Direction::Up));
        assert_eq!(Direction::from_arrows(true, false, true, false), Some(Direction::West));
        assert_eq!(Direction::from_arrows(true, false, false, true), Some(Direction::North));
        assert_eq!(Direction::from_arrows(false, true, false, false), Some(Direction::Down));
        assert_eq!(Direction::from_arrows(false, true, true, false), Some(Direction::South));
        assert_eq!(Direction::from_arrows(false, true, false, true), Some(Direction::East));
        assert_eq!(Direction::from_arrows(false, false, true, false), Some(Direction::Left));
        assert_eq!(Direction::from_arrows(false, false, false, true), Some(Direction::Right));
        assert_eq!(Direction::from_arrows(false, false, false, false), None);
    }

    #[test]
    fn stick_matches_arrows() {
        assert_eq!(Direction::from_vector(Vec2::new(0.0, -1.0)), Some(Direction::Up));
        assert_eq!(Direction::from_vector(Vec2::new(1.0, 0.0)), Some(Direction::Right));
        assert_eq!(Direction::from_vector(Vec2::new(0.0, 1.0)), Some(Direction::Down));
        assert_eq!(Direction::from_vector(Vec2::new(-1.0, 0.0)), Some(Direction::Left));
        assert_eq!(Direction::from_vector(Vec2::new(0.7, 0.7)), Some(Direction::East));
        assert_eq!(Direction::from_vector(Vec2::new(-0.7, -0.7)), Some(Direction::West));
        assert_eq!(Direction::from_vector(Vec2::ZERO), None);
    }

    #[test]
    fn towards_steps_diagonally() {
        assert_eq!(Direction::towards(0, 0, 5, 5), Some(Direction::Down));
        assert_eq!(Direction::towards(0, 0, -3, 0), Some(Direction::West));
        assert_eq!(Direction::towards(2, 2, 2, 2), None);
    }
}
