//! # flow_field
//!
//! The payloads that travel between the collaborators of the fluid rig:
//! scalar, vector and color grids at a fixed [`Resolution`], plus a software
//! [`Canvas`] that composites them with a [`BlendMode`].
//!
//! Grids play the part GPU textures play in a shader pipeline.  They are
//! row-major, allocated once, and overwritten in place.
//!
//! ## Quick start
//!
//! ```rust
//! use flow_field::{Resolution, ScalarField, VectorField, Vec2};
//!
//! let draw = Resolution::new(1280, 720);
//! let flow = draw.divided(8);
//! assert_eq!((flow.width, flow.height), (160, 90));
//!
//! let mut velocity = VectorField::zeros(flow);
//! velocity.set(3, 4, Vec2::new(1.0, -0.5));
//!
//! let mut temperature = ScalarField::zeros(flow.divided(4));
//! temperature.fill(0.25);
//! assert_eq!(temperature.get(0, 0), 0.25);
//! ```

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num_traits::Zero;

pub mod canvas;
pub mod grid;

pub use canvas::{BlendMode, Canvas, Rect};
pub use grid::{Blit, ColorField, FieldValue, Grid, ScalarField, VectorField};

// ════════════════════════════════════════════════════════════════════════════
// Resolution
// ════════════════════════════════════════════════════════════════════════════

/// Width × height of a grid or canvas, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width:  usize,
    pub height: usize,
}

impl Resolution {
    pub const fn new(width: usize, height: usize) -> Self {
        Resolution { width, height }
    }

    /// Integer-divide both axes by `divisor`, keeping each axis at least 1.
    ///
    /// ```rust
    /// use flow_field::Resolution;
    /// assert_eq!(Resolution::new(160, 90).divided(4), Resolution::new(40, 22));
    /// assert_eq!(Resolution::new(3, 3).divided(8), Resolution::new(1, 1));
    /// ```
    pub fn divided(self, divisor: usize) -> Self {
        let d = divisor.max(1);
        Resolution {
            width:  (self.width / d).max(1),
            height: (self.height / d).max(1),
        }
    }

    /// Number of cells.
    pub fn len(self) -> usize { self.width * self.height }

    pub fn is_empty(self) -> bool { self.width == 0 || self.height == 0 }

    /// Width over height.
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Vec2
// ════════════════════════════════════════════════════════════════════════════

/// A 2-D velocity sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self { Vec2 { x, y } }

    pub fn length(self) -> f32 { (self.x * self.x + self.y * self.y).sqrt() }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 { Vec2::new(self.x + o.x, self.y + o.y) }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) { self.x += o.x; self.y += o.y; }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 { Vec2::new(self.x - o.x, self.y - o.y) }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 { Vec2::new(-self.x, -self.y) }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 { Vec2::new(self.x * s, self.y * s) }
}

impl Zero for Vec2 {
    fn zero() -> Self { Vec2::new(0.0, 0.0) }
    fn is_zero(&self) -> bool { self.x == 0.0 && self.y == 0.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Rgba
// ════════════════════════════════════════════════════════════════════════════

/// Linear color with alpha, each channel nominally 0.0–1.0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    /// Unpack a `0x00RRGGBB` pixel (alpha = 1).
    pub fn from_rgb_u32(px: u32) -> Self {
        Rgba::new(
            ((px >> 16) & 0xFF) as f32 / 255.0,
            ((px >>  8) & 0xFF) as f32 / 255.0,
            ( px        & 0xFF) as f32 / 255.0,
            1.0,
        )
    }

    /// Pack into `0x00RRGGBB`, clamping each channel.  Alpha is dropped.
    pub fn to_rgb_u32(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }

    /// Rec. 601 luma of the color channels.
    pub fn luminance(self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// Scale every channel, alpha included.
    pub fn scale(self, s: f32) -> Self { self * s }
}

impl Add for Rgba {
    type Output = Rgba;
    fn add(self, o: Rgba) -> Rgba {
        Rgba::new(self.r + o.r, self.g + o.g, self.b + o.b, self.a + o.a)
    }
}

impl Sub for Rgba {
    type Output = Rgba;
    fn sub(self, o: Rgba) -> Rgba {
        Rgba::new(self.r - o.r, self.g - o.g, self.b - o.b, self.a - o.a)
    }
}

impl Mul<f32> for Rgba {
    type Output = Rgba;
    fn mul(self, s: f32) -> Rgba {
        Rgba::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

impl Zero for Rgba {
    fn zero() -> Self { Rgba::new(0.0, 0.0, 0.0, 0.0) }
    fn is_zero(&self) -> bool { *self == Rgba::zero() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
