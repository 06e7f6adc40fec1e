use isoview_geom::Point;
use isoview_runtime::movement::{AutoWalk, WalkTarget};
use proptest::prelude::*;

proptest! {
    // Straight-line auto-walk arrives within the stop distance in at most
    // Chebyshev-distance steps.
    #[test]
    fn auto_walk_arrives(
        sx in -200i32..200, sy in -200i32..200,
        tx in -200i32..200, ty in -200i32..200,
        distance in 0i32..4,
    ) {
        let mut walk = AutoWalk::default();
        walk.start(WalkTarget { x: tx, y: ty, z: 0, distance });
        let mut at = Point::new(sx, sy);
        let target = Point::new(tx, ty);
        let budget = at.chebyshev(target);
        let mut steps = 0;
        while let Some(dir) = walk.next_step(at) {
            let (dx, dy) = dir.delta();
            at = Point::new(at.x + dx, at.y + dy);
            steps += 1;
            prop_assert!(steps <= budget);
        }
        prop_assert!(!walk.is_active());
        prop_assert!(at.chebyshev(target) <= distance);
    }
}
