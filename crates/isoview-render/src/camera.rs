use isoview_geom::{Point, Rect, Transform2D, Vec2};
use isoview_world::{CHUNK_SHIFT, ChunkCoord};

/// Half the width of a tile diamond in world pixels.
pub const TILE_HALF: f32 = 22.0;
/// Vertical pixels per elevation unit.
pub const Z_STEP: f32 = 4.0;
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.5;

/// Inclusive tile rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub min: Point,
    pub max: Point,
}

impl TileRect {
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Arithmetic shift of both corners; stays inclusive.
    pub fn to_chunks(&self) -> ChunkRect {
        ChunkRect {
            min: ChunkCoord::new(self.min.x >> CHUNK_SHIFT, self.min.y >> CHUNK_SHIFT),
            max: ChunkCoord::new(self.max.x >> CHUNK_SHIFT, self.max.y >> CHUNK_SHIFT),
        }
    }
}

/// Inclusive chunk rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRect {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl ChunkRect {
    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        c.cx >= self.min.cx && c.cx <= self.max.cx && c.cy >= self.min.cy && c.cy <= self.max.cy
    }

    /// Scan order: X outer, Y inner.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (self.min.cx..=self.max.cx)
            .flat_map(move |cx| (self.min.cy..=self.max.cy).map(move |cy| ChunkCoord::new(cx, cy)))
    }

    pub fn len(&self) -> usize {
        let w = (self.max.cx - self.min.cx + 1).max(0) as usize;
        let h = (self.max.cy - self.min.cy + 1).max(0) as usize;
        w * h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Camera focus, zoom and viewport. Projected positions are in
/// render-target space: origin at the viewport's top-left, focus at its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub focus_x: i32,
    pub focus_y: i32,
    pub focus_z: i8,
    /// Sub-tile pixel offset (walking animation), in world pixels.
    pub offset: Vec2,
    zoom: f32,
    pub bounds: Rect,
    /// Extra elevation (z units) above and below the focus to keep in range.
    pub elevation_margin: i32,
    /// Tallest sprite, in world pixels.
    pub sprite_margin: f32,
}

impl Camera {
    pub fn new(bounds: Rect) -> Self {
        Self {
            focus_x: 0,
            focus_y: 0,
            focus_z: 0,
            offset: Vec2::ZERO,
            zoom: 1.0,
            bounds,
            elevation_margin: 40,
            sprite_margin: 88.0,
        }
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn set_focus(&mut self, x: i32, y: i32, z: i8) {
        self.focus_x = x;
        self.focus_y = y;
        self.focus_z = z;
    }

    /// Unzoomed world pixel of the center of tile `(x, y)` at elevation `z`.
    #[inline]
    pub fn world_px(x: i32, y: i32, z: i8) -> Vec2 {
        Vec2::new(
            (x - y) as f32 * TILE_HALF,
            (x + y) as f32 * TILE_HALF - f32::from(z) * Z_STEP,
        )
    }

    /// World pixels → render-target pixels.
    pub fn transform(&self) -> Transform2D {
        let focus = Self::world_px(self.focus_x, self.focus_y, self.focus_z) + self.offset;
        let center = self.bounds.at_origin().center();
        Transform2D::new(self.zoom, center - focus * self.zoom)
    }

    #[inline]
    pub fn project(&self, x: i32, y: i32, z: i8) -> Vec2 {
        self.transform().apply(Self::world_px(x, y, z))
    }

    /// Render-target pixel → world pixel; `None` only for a degenerate zoom.
    pub fn unproject(&self, p: Vec2) -> Option<Vec2> {
        self.transform().inverse().map(|t| t.apply(p))
    }

    /// Tile under a render-target pixel, assuming elevation `z`.
    pub fn screen_to_tile(&self, p: Vec2, z: i8) -> Option<Point> {
        let w = self.unproject(p)?;
        let a = w.x / TILE_HALF;
        let b = (w.y + f32::from(z) * Z_STEP) / TILE_HALF;
        Some(Point::new(
            ((a + b) * 0.5).round() as i32,
            ((b - a) * 0.5).round() as i32,
        ))
    }

    /// Every tile whose sprite could reach the viewport, elevation included.
    pub fn tile_rect(&self) -> TileRect {
        let view = self.bounds.at_origin();
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(view.width as f32, 0.0),
            Vec2::new(0.0, view.height as f32),
            Vec2::new(view.width as f32, view.height as f32),
        ];
        let inv = self.transform().inverse().unwrap_or(Transform2D::IDENTITY);
        let mut lo = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut hi = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for c in corners {
            let w = inv.apply(c);
            // Continuous tile coordinates at the focus elevation.
            let b = w.y + f32::from(self.focus_z) * Z_STEP;
            let tx = (w.x + b) / (2.0 * TILE_HALF);
            let ty = (b - w.x) / (2.0 * TILE_HALF);
            lo = Vec2::new(lo.x.min(tx), lo.y.min(ty));
            hi = Vec2::new(hi.x.max(tx), hi.y.max(ty));
        }
        let margin_px = self.elevation_margin as f32 * Z_STEP + self.sprite_margin;
        let margin = (margin_px / TILE_HALF).ceil() as i32 + 1;
        let min = Point::new(lo.x.floor() as i32 - margin, lo.y.floor() as i32 - margin);
        let max = Point::new(hi.x.ceil() as i32 + margin, hi.y.ceil() as i32 + margin);
        TileRect {
            min: min.min(max),
            max: max.max(min),
        }
    }

    #[inline]
    pub fn chunk_rect(&self) -> ChunkRect {
        self.tile_rect().to_chunks()
    }
}
