//! Software canvas — the `0x00RRGGBB` frame buffer that is finally pushed to
//! the window, and the blend modes used to layer fields onto it.

use crate::grid::{ColorField, ScalarField, VectorField};
use crate::{Resolution, Rgba};

// ════════════════════════════════════════════════════════════════════════════
// BlendMode
// ════════════════════════════════════════════════════════════════════════════

/// How a source color combines with what is already there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Pure overwrite; source alpha is ignored.
    #[default]
    Disabled,
    /// `dst + src * src.a`.
    Add,
    /// `src * src.a + dst * (1 - src.a)`.
    Alpha,
}

impl BlendMode {
    pub fn apply(self, dst: Rgba, src: Rgba) -> Rgba {
        match self {
            BlendMode::Disabled => src,
            BlendMode::Add => Rgba::new(
                dst.r + src.r * src.a,
                dst.g + src.g * src.a,
                dst.b + src.b * src.a,
                (dst.a + src.a).min(1.0),
            ),
            BlendMode::Alpha => {
                let a = src.a.clamp(0.0, 1.0);
                Rgba::new(
                    src.r * a + dst.r * (1.0 - a),
                    src.g * a + dst.g * (1.0 - a),
                    src.b * a + dst.b * (1.0 - a),
                    a + dst.a * (1.0 - a),
                )
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rect
// ════════════════════════════════════════════════════════════════════════════

/// Destination rectangle in canvas pixels.  May extend past the canvas;
/// drawing is clipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self { Rect { x, y, w, h } }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// Frame buffer in the pixel layout `minifb` expects.
#[derive(Clone, Debug)]
pub struct Canvas {
    res:    Resolution,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(res: Resolution) -> Self {
        Canvas { res, pixels: vec![0; res.len()] }
    }

    pub fn resolution(&self) -> Resolution { self.res }
    pub fn pixels(&self)     -> &[u32]     { &self.pixels }

    /// The whole canvas as a [`Rect`].
    pub fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.res.width as u32, self.res.height as u32)
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color & 0x00FF_FFFF);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.res.width && y < self.res.height).then(|| self.pixels[y * self.res.width + x])
    }

    /// Blend one color into one pixel; off-canvas writes are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, blend: BlendMode) {
        if x < 0 || y < 0 || x as usize >= self.res.width || y as usize >= self.res.height {
            return;
        }
        let i = y as usize * self.res.width + x as usize;
        let dst = Rgba::from_rgb_u32(self.pixels[i]);
        self.pixels[i] = blend.apply(dst, color).to_rgb_u32();
    }

    /// Visit every on-canvas pixel of `rect` with its normalised (u, v).
    fn for_each_in(&mut self, rect: Rect, mut f: impl FnMut(&mut u32, f32, f32)) {
        if rect.w == 0 || rect.h == 0 { return; }
        let x0 = rect.x.max(0) as usize;
        let y0 = rect.y.max(0) as usize;
        let x1 = ((rect.x + rect.w as i32).max(0) as usize).min(self.res.width);
        let y1 = ((rect.y + rect.h as i32).max(0) as usize).min(self.res.height);
        for y in y0..y1 {
            let v = (y as f32 - rect.y as f32 + 0.5) / rect.h as f32;
            for x in x0..x1 {
                let u = (x as f32 - rect.x as f32 + 0.5) / rect.w as f32;
                f(&mut self.pixels[y * self.res.width + x], u, v);
            }
        }
    }

    // ── fields ────────────────────────────────────────────────────────────

    /// Stretch a color field over `rect`.
    pub fn draw_color_field(&mut self, field: &ColorField, rect: Rect, blend: BlendMode) {
        self.for_each_in(rect, |px, u, v| {
            let dst = Rgba::from_rgb_u32(*px);
            *px = blend.apply(dst, field.sample(u, v)).to_rgb_u32();
        });
    }

    /// Stretch a signed scalar field over `rect`: positive values warm,
    /// negative values cool, magnitude drives alpha.
    pub fn draw_scalar_field(&mut self, field: &ScalarField, rect: Rect, blend: BlendMode) {
        self.for_each_in(rect, |px, u, v| {
            let s = field.sample_bilinear(u, v);
            let dst = Rgba::from_rgb_u32(*px);
            *px = blend.apply(dst, scalar_color(s)).to_rgb_u32();
        });
    }

    /// One line segment per cell, from the cell centre along its velocity.
    /// `scale` converts field units into cell widths.
    pub fn draw_vector_field(
        &mut self,
        field: &VectorField,
        rect:  Rect,
        scale: f32,
        blend: BlendMode,
    ) {
        let res = field.resolution();
        let cw = rect.w as f32 / res.width.max(1) as f32;
        let ch = rect.h as f32 / res.height.max(1) as f32;
        for y in 0..res.height {
            for x in 0..res.width {
                let vel = field.get(x, y);
                let mag = vel.length();
                if mag <= f32::EPSILON { continue; }
                let cx = rect.x as f32 + (x as f32 + 0.5) * cw;
                let cy = rect.y as f32 + (y as f32 + 0.5) * ch;
                let ex = cx + vel.x * scale * cw;
                let ey = cy + vel.y * scale * ch;
                let t = (mag * scale).min(1.0);
                let color = Rgba::new(1.0, 1.0 - 0.5 * t, 1.0 - t, 0.5 + 0.5 * t);
                self.draw_line(cx as i32, cy as i32, ex as i32, ey as i32, color, blend);
            }
        }
    }

    // ── primitives ────────────────────────────────────────────────────────

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba, blend: BlendMode) {
        let r2 = r * r;
        let (x0, x1) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
        let (y0, y1) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color, blend);
                }
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        let (x1, y1) = (rect.x + rect.w as i32 - 1, rect.y + rect.h as i32 - 1);
        for x in rect.x..=x1 {
            self.blend_pixel(x, rect.y, color, BlendMode::Disabled);
            self.blend_pixel(x, y1,     color, BlendMode::Disabled);
        }
        for y in rect.y..=y1 {
            self.blend_pixel(rect.x, y, color, BlendMode::Disabled);
            self.blend_pixel(x1,     y, color, BlendMode::Disabled);
        }
    }

    pub fn draw_cross(&mut self, cx: i32, cy: i32, arm: i32, color: Rgba) {
        for d in -arm..=arm {
            self.blend_pixel(cx + d, cy, color, BlendMode::Disabled);
            self.blend_pixel(cx, cy + d, color, BlendMode::Disabled);
        }
    }

    /// Bresenham line.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba, blend: BlendMode) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.blend_pixel(x, y, color, blend);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal 3×5 bitmap text, 4 px advance per character.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgba) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3i32 {
                    if bits & (1u8 << (2 - col)) != 0 {
                        self.blend_pixel(cx + col, y + row as i32, color, BlendMode::Disabled);
                    }
                }
            }
            cx += 4;
            if cx >= self.res.width as i32 { break; }
        }
    }
}

/// Two-tone ramp for signed scalars.
fn scalar_color(s: f32) -> Rgba {
    let m = s.abs().min(1.0);
    if s >= 0.0 {
        Rgba::new(1.0, 0.55, 0.1, m)
    } else {
        Rgba::new(0.1, 0.55, 1.0, m)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
