use isoview_geom::{Point, Rect, Transform2D, Vec2};
use proptest::prelude::*;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-1000i32..1000, -1000i32..1000, 0i32..500, 0i32..500)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn arb_point() -> impl Strategy<Value = Point> {
    (-2000i32..2000, -2000i32..2000).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    // Intersection is symmetric
    #[test]
    fn intersects_symmetric(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    // A non-empty rect intersects itself and contains its own origin
    #[test]
    fn nonempty_self_intersects(r in arb_rect()) {
        prop_assume!(!r.is_empty());
        prop_assert!(r.intersects(&r));
        prop_assert!(r.contains(Point::new(r.x, r.y)));
    }

    // Inflating never loses points
    #[test]
    fn inflate_keeps_points(r in arb_rect(), p in arb_point(), d in 0i32..50) {
        if r.contains(p) {
            prop_assert!(r.inflate(d, d).contains(p));
        }
    }

    // Chebyshev distance is symmetric and zero only on equal points
    #[test]
    fn chebyshev_symmetric(a in arb_point(), b in arb_point()) {
        prop_assert_eq!(a.chebyshev(b), b.chebyshev(a));
        prop_assert_eq!(a.chebyshev(b) == 0, a == b);
    }

    // min/max bracket both inputs
    #[test]
    fn min_max_bracket(a in arb_point(), b in arb_point()) {
        let lo = a.min(b);
        let hi = a.max(b);
        prop_assert!(lo.x <= hi.x && lo.y <= hi.y);
        prop_assert!(lo.x <= a.x && a.x <= hi.x);
        prop_assert!(lo.y <= b.y && b.y <= hi.y);
    }

    // Applying a transform and then its inverse returns (approximately) the input
    #[test]
    fn transform_inverse(scale in 0.25f32..4.0, ox in -500f32..500.0, oy in -500f32..500.0,
                         px in -500f32..500.0, py in -500f32..500.0) {
        let t = Transform2D::new(scale, Vec2::new(ox, oy));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(px, py);
        let back = inv.apply(t.apply(p));
        prop_assert!((back.x - p.x).abs() <= 1e-2);
        prop_assert!((back.y - p.y).abs() <= 1e-2);
    }
}
