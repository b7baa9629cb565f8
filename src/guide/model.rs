pub const MIN_GHOST_RADIUS: f32 = 4.0;
pub const DEFAULT_GHOST_RADIUS: f32 = 16.0;
pub const MIN_HALF_WIDTH: f32 = 10.0;
pub const MAX_HALF_WIDTH: f32 = 300.0;
pub const DEFAULT_GRAB_RADIUS: f32 = 10.0;

const CORNER_INSET: f32 = 120.0;
const SIDE_INSET: f32 = 100.0;
const CORNER_HALF_WIDTH: f32 = 60.0;
const SIDE_HALF_WIDTH: f32 = 55.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketKind {
    Side,
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pocket {
    pub center: Point,
    pub half_width: f32,
    pub kind: PocketKind,
}

impl Pocket {
    pub fn new(center: Point, half_width: f32, kind: PocketKind) -> Self {
        Self {
            center,
            half_width: clamp_half_width(half_width),
            kind,
        }
    }

    /// Endpoints of the pocket opening. `midline_x` is the horizontal center of
    /// the surface; corner mouths extend from the center toward it.
    pub fn mouth_segment(&self, midline_x: f32) -> (Point, Point) {
        let Point { x, y } = self.center;
        match self.kind {
            PocketKind::Side => (
                Point::new(x - self.half_width, y),
                Point::new(x + self.half_width, y),
            ),
            PocketKind::Corner => {
                let dir = if x < midline_x { 1.0 } else { -1.0 };
                (self.center, Point::new(x + dir * self.half_width, y))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueMarker {
    pub position: Point,
    pub ghost_radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuideModel {
    cue: CueMarker,
    pockets: Vec<Pocket>,
}

impl GuideModel {
    pub fn new(cue: CueMarker, pockets: Vec<Pocket>) -> Self {
        Self {
            cue: CueMarker {
                position: cue.position,
                ghost_radius: cue.ghost_radius.max(MIN_GHOST_RADIUS),
            },
            pockets,
        }
    }

    /// Four corner and two side pockets laid out against the screen edges, cue
    /// at screen center.
    pub fn default_layout(screen: ScreenSize, ghost_radius: f32) -> Self {
        let w = screen.width as f32;
        let h = screen.height as f32;
        let mid_x = w * 0.5;

        let pockets = vec![
            Pocket::new(
                Point::new(CORNER_INSET, CORNER_INSET),
                CORNER_HALF_WIDTH,
                PocketKind::Corner,
            ),
            Pocket::new(Point::new(mid_x, SIDE_INSET), SIDE_HALF_WIDTH, PocketKind::Side),
            Pocket::new(
                Point::new(w - CORNER_INSET, CORNER_INSET),
                CORNER_HALF_WIDTH,
                PocketKind::Corner,
            ),
            Pocket::new(
                Point::new(CORNER_INSET, h - CORNER_INSET),
                CORNER_HALF_WIDTH,
                PocketKind::Corner,
            ),
            Pocket::new(
                Point::new(mid_x, h - SIDE_INSET),
                SIDE_HALF_WIDTH,
                PocketKind::Side,
            ),
            Pocket::new(
                Point::new(w - CORNER_INSET, h - CORNER_INSET),
                CORNER_HALF_WIDTH,
                PocketKind::Corner,
            ),
        ];

        Self::new(
            CueMarker {
                position: Point::new(mid_x, h * 0.5),
                ghost_radius,
            },
            pockets,
        )
    }

    pub fn cue(&self) -> CueMarker {
        self.cue
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn set_cue_position(&mut self, position: Point) {
        self.cue.position = position;
    }

    /// Returns `false` and leaves the model untouched when `index` is out of
    /// range.
    pub fn set_pocket_center(&mut self, index: usize, center: Point) -> bool {
        match self.pockets.get_mut(index) {
            Some(pocket) => {
                pocket.center = center;
                true
            }
            None => false,
        }
    }

    pub fn adjust_ghost_radius(&mut self, delta: f32) {
        self.cue.ghost_radius = (self.cue.ghost_radius + delta).max(MIN_GHOST_RADIUS);
    }

    pub fn adjust_all_pocket_half_widths(&mut self, delta: f32) {
        for pocket in &mut self.pockets {
            pocket.half_width = clamp_half_width(pocket.half_width + delta);
        }
    }
}

fn clamp_half_width(value: f32) -> f32 {
    value.clamp(MIN_HALF_WIDTH, MAX_HALF_WIDTH)
}
