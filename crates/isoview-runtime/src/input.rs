use isoview_geom::{Rect, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Arrows {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Input snapshot for one update, in render-target pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub mouse: Vec2,
    pub mouse_over_world: bool,
    pub left_down: bool,
    /// Held right button walks toward the cursor.
    pub right_down: bool,
    pub arrows: Arrows,
    /// Stick deflection, unit-length at full tilt.
    pub analog: Vec2,
    /// Cursor travel since the left button went down.
    pub drag_distance: f32,
    pub selection: Option<Rect>,
}

/// Cursor travel that turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 5.0;

impl InputState {
    pub fn is_dragging(&self) -> bool {
        self.left_down && self.drag_distance > DRAG_THRESHOLD
    }
}
