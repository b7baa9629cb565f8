use crate::guide::model::{GuideModel, Point};

/// Pixels of this color are fully transparent on the layered overlay window.
pub const TRANSPARENCY_COLORKEY: Color = Color::rgba(255, 0, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn matches_rgb(self, other: Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub width: u32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleStyle {
    pub color: Color,
    pub filled: bool,
    pub stroke_width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideStyle {
    pub guide_line: StrokeStyle,
    pub mouth: StrokeStyle,
    pub marker: CircleStyle,
    pub marker_radius: f32,
    pub ghost: CircleStyle,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            guide_line: StrokeStyle {
                width: 2,
                color: Color::rgba(0, 255, 0, 255),
            },
            mouth: StrokeStyle {
                width: 2,
                color: Color::rgba(0, 140, 255, 255),
            },
            marker: CircleStyle {
                color: Color::rgba(255, 255, 255, 255),
                filled: true,
                stroke_width: 1,
            },
            marker_radius: 5.0,
            ghost: CircleStyle {
                color: Color::rgba(255, 255, 255, 255),
                filled: true,
                stroke_width: 2,
            },
        }
    }
}

/// Widest stroke the raster helpers draw; wider requests are clamped.
pub const MAX_STROKE_WIDTH: u32 = 64;

/// Drawing target for one frame. A zero-sized surface is treated as not ready.
pub trait GuideSurface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self);
    fn draw_line(&mut self, start: Point, end: Point, style: StrokeStyle);
    fn draw_circle(&mut self, center: Point, radius: f32, style: CircleStyle);
}

/// Draws the full guide. Returns `false` without touching the surface when it
/// has no area.
pub fn render_guide<S: GuideSurface + ?Sized>(
    model: &GuideModel,
    style: &GuideStyle,
    surface: &mut S,
) -> bool {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return false;
    }

    surface.clear();
    let midline_x = width as f32 * 0.5;
    let cue = model.cue();

    for pocket in model.pockets() {
        let (a, b) = pocket.mouth_segment(midline_x);
        surface.draw_line(cue.position, pocket.center, style.guide_line);
        surface.draw_line(a, b, style.mouth);
        surface.draw_circle(pocket.center, style.marker_radius, style.marker);
    }

    surface.draw_circle(cue.position, cue.ghost_radius, style.ghost);
    true
}

/// Off-screen RGBA canvas the guide is composed into before it is presented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self::default();
        buffer.ensure_size(width, height);
        buffer
    }

    /// Reallocates when the size changes. Returns whether it did.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> bool {
        let target_len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if self.width == width && self.height == height && self.rgba.len() == target_len {
            return false;
        }
        self.width = width;
        self.height = height;
        self.rgba = vec![0; target_len];
        clear_rgba_pixels(&mut self.rgba, TRANSPARENCY_COLORKEY);
        true
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some(Color::rgba(
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ))
    }

    /// Copies the frame into a BGRA device bitmap of the same size. Returns
    /// `false` and leaves `dib_bgra` alone on a size mismatch.
    pub fn copy_to_bgra(&self, dib_bgra: &mut [u8]) -> bool {
        if self.rgba.is_empty() || dib_bgra.len() != self.rgba.len() {
            return false;
        }
        convert_rgba_to_dib_bgra(&self.rgba, dib_bgra);
        true
    }
}

impl GuideSurface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        clear_rgba_pixels(&mut self.rgba, TRANSPARENCY_COLORKEY);
    }

    fn draw_line(&mut self, start: Point, end: Point, style: StrokeStyle) {
        draw_segment(
            start.to_pixel(),
            end.to_pixel(),
            style.color,
            style.width.max(1),
            &mut self.rgba,
            self.width,
            self.height,
        );
    }

    fn draw_circle(&mut self, center: Point, radius: f32, style: CircleStyle) {
        if style.filled {
            fill_disc(center, radius, style.color, &mut self.rgba, self.width, self.height);
        } else {
            draw_circle_outline(
                center,
                radius,
                style.color,
                style.stroke_width.max(1),
                &mut self.rgba,
                self.width,
                self.height,
            );
        }
    }
}

pub fn convert_rgba_to_dib_bgra(rgba: &[u8], dib_bgra: &mut [u8]) {
    assert_eq!(rgba.len(), dib_bgra.len());
    for (src, dst) in rgba.chunks_exact(4).zip(dib_bgra.chunks_exact_mut(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }
}

fn clear_rgba_pixels(pixels: &mut [u8], clear: Color) {
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&[clear.r, clear.g, clear.b, clear.a]);
    }
}

fn draw_segment(
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let mut x0 = start.0;
    let mut y0 = start.1;
    let (x1, y1) = end;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush((x0, y0), color, stroke_width, pixels, width, height);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Round brush exactly `stroke_width` pixels across. Even widths extend one
/// pixel further up and left of `center`.
fn draw_brush(
    center: (i32, i32),
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let w = i64::from(stroke_width.clamp(1, MAX_STROKE_WIDTH));
    let lo = -(w / 2);
    let hi = (w - 1) / 2;
    // Offsets are doubled so the half-pixel center of even brushes stays integral.
    let span_center = lo + hi;
    let (cx, cy) = (i64::from(center.0), i64::from(center.1));

    let y_start = (cy + lo).max(0);
    let y_end = (cy + hi).min(i64::from(height) - 1);
    let x_start = (cx + lo).max(0);
    let x_end = (cx + hi).min(i64::from(width) - 1);

    for y in y_start..=y_end {
        let dy = 2 * (y - cy) - span_center;
        for x in x_start..=x_end {
            let dx = 2 * (x - cx) - span_center;
            if dx * dx + dy * dy <= w * w {
                set_pixel_rgba(pixels, width, height, x as i32, y as i32, color);
            }
        }
    }
}

fn fill_disc(center: Point, radius: f32, color: Color, pixels: &mut [u8], width: u32, height: u32) {
    if radius <= 0.0 {
        return;
    }
    let radius_sq = radius * radius;
    let y0 = (center.y - radius).floor() as i32;
    let y1 = (center.y + radius).ceil() as i32;
    let x0 = (center.x - radius).floor() as i32;
    let x1 = (center.x + radius).ceil() as i32;

    for y in y0.max(0)..=y1.min(height as i32 - 1) {
        let dy = y as f32 - center.y;
        for x in x0.max(0)..=x1.min(width as i32 - 1) {
            let dx = x as f32 - center.x;
            if dx * dx + dy * dy <= radius_sq {
                set_pixel_rgba(pixels, width, height, x, y, color);
            }
        }
    }
}

fn draw_circle_outline(
    center: Point,
    radius: f32,
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    if !radius.is_finite() || radius <= 0.0 || width == 0 || height == 0 {
        return;
    }

    let reach = radius + stroke_width as f32;
    let (w, h) = (width as f32, height as f32);
    if center.x + reach < 0.0 || center.y + reach < 0.0 || center.x - reach > w || center.y - reach > h {
        return;
    }
    let far_x = center.x.abs().max((w - center.x).abs());
    let far_y = center.y.abs().max((h - center.y).abs());
    if (far_x * far_x + far_y * far_y).sqrt() < radius - stroke_width as f32 {
        // the whole surface lies inside the ring
        return;
    }

    let circumference = std::f32::consts::TAU * radius.max(1.0);
    let max_steps = 4.0 * (w + h);
    let steps = circumference.clamp(12.0, max_steps.max(12.0)) as usize;

    for step in 0..=steps {
        let t = (step as f32 / steps as f32) * std::f32::consts::TAU;
        let x = (center.x + radius * t.cos()).round() as i32;
        let y = (center.y + radius * t.sin()).round() as i32;
        draw_brush((x, y), color, stroke_width, pixels, width, height);
    }
}

fn set_pixel_rgba(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }

    let idx = ((y as u32 * width + x as u32) * 4) as usize;
    if idx + 3 >= pixels.len() {
        return;
    }

    pixels[idx] = color.r;
    pixels[idx + 1] = color.g;
    pixels[idx + 2] = color.b;
    pixels[idx + 3] = color.a;
}
