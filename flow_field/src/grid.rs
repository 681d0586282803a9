//! Row-major grids — the scalar, vector and color fields handed between
//! collaborators.

use std::ops::{Mul, Sub};

use num_traits::Zero;

use crate::canvas::BlendMode;
use crate::{Resolution, Rgba, Vec2};

/// Anything a grid can hold and interpolate: `f32`, [`Vec2`], [`Rgba`].
pub trait FieldValue: Copy + Zero + Sub<Output = Self> + Mul<f32, Output = Self> {}

impl<T> FieldValue for T where T: Copy + Zero + Sub<Output = T> + Mul<f32, Output = T> {}

/// Temperature, pressure, luminance, obstacle masks.
pub type ScalarField = Grid<f32>;
/// Optical flow and fluid velocity.
pub type VectorField = Grid<Vec2>;
/// Density and camera images.
pub type ColorField  = Grid<Rgba>;

// ════════════════════════════════════════════════════════════════════════════
// Grid
// ════════════════════════════════════════════════════════════════════════════

/// A fixed-size grid of cells.  The resolution never changes after
/// allocation; every write is an in-place overwrite.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    res:  Resolution,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn filled(res: Resolution, value: T) -> Self {
        Grid { res, data: vec![value; res.len()] }
    }

    pub fn resolution(&self) -> Resolution { self.res }
    pub fn width(&self)      -> usize      { self.res.width }
    pub fn height(&self)     -> usize      { self.res.height }
    pub fn data(&self)       -> &[T]       { &self.data }
    pub fn data_mut(&mut self) -> &mut [T] { &mut self.data }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize { y * self.res.width + x }

    /// Cell value.  Out-of-range coordinates are clamped to the edge.
    pub fn get(&self, x: usize, y: usize) -> T {
        let x = x.min(self.res.width.saturating_sub(1));
        let y = y.min(self.res.height.saturating_sub(1));
        self.data[self.index(x, y)]
    }

    /// Set one cell; out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.res.width && y < self.res.height {
            let i = self.index(x, y);
            self.data[i] = value;
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Nearest-cell lookup at normalised coordinates (`0.0..=1.0` on each
    /// axis, clamped).
    pub fn sample(&self, u: f32, v: f32) -> T {
        let x = (u.clamp(0.0, 1.0) * self.res.width as f32) as usize;
        let y = (v.clamp(0.0, 1.0) * self.res.height as f32) as usize;
        self.get(x, y)
    }

    /// Overwrite every cell with the nearest cell of `src`, whatever its size.
    pub fn resample_from(&mut self, src: &Grid<T>) {
        if src.res == self.res {
            self.data.copy_from_slice(&src.data);
            return;
        }
        let (w, h) = (self.res.width as f32, self.res.height as f32);
        for y in 0..self.res.height {
            let v = (y as f32 + 0.5) / h;
            for x in 0..self.res.width {
                let u = (x as f32 + 0.5) / w;
                let i = self.index(x, y);
                self.data[i] = src.sample(u, v);
            }
        }
    }

    /// Cell-wise transform into a new grid of the same resolution.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid { res: self.res, data: self.data.iter().map(|&v| f(v)).collect() }
    }
}

impl<T: FieldValue> Grid<T> {
    pub fn zeros(res: Resolution) -> Self {
        Grid::filled(res, T::zero())
    }

    pub fn clear(&mut self) {
        self.fill(T::zero());
    }

    /// Bilinear lookup at normalised coordinates, cell centres at
    /// `(i + 0.5) / width`.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> T {
        let fx = (u * self.res.width as f32 - 0.5)
            .clamp(0.0, self.res.width.saturating_sub(1) as f32);
        let fy = (v * self.res.height as f32 - 0.5)
            .clamp(0.0, self.res.height.saturating_sub(1) as f32);
        let (x0, y0) = (fx as usize, fy as usize);
        let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);

        let lerp = |a: T, b: T, t: f32| a + (b - a) * t;
        let top    = lerp(self.get(x0, y0),     self.get(x0 + 1, y0),     tx);
        let bottom = lerp(self.get(x0, y0 + 1), self.get(x0 + 1, y0 + 1), tx);
        lerp(top, bottom, ty)
    }

    /// `self += src * strength`, bilinearly resampling `src` when the
    /// resolutions differ.
    pub fn add_scaled(&mut self, src: &Grid<T>, strength: f32) {
        if src.res == self.res {
            for (d, &s) in self.data.iter_mut().zip(&src.data) {
                *d = *d + s * strength;
            }
            return;
        }
        let (w, h) = (self.res.width as f32, self.res.height as f32);
        for y in 0..self.res.height {
            let v = (y as f32 + 0.5) / h;
            for x in 0..self.res.width {
                let u = (x as f32 + 0.5) / w;
                let i = self.index(x, y);
                self.data[i] = self.data[i] + src.sample_bilinear(u, v) * strength;
            }
        }
    }

    /// Multiply every cell by `factor`.
    pub fn scale_in_place(&mut self, factor: f32) {
        for d in &mut self.data {
            *d = *d * factor;
        }
    }

    /// True when every cell is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| v.is_zero())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Blit — copying one color field into another
// ════════════════════════════════════════════════════════════════════════════

/// How [`ColorField::blit`] writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blit {
    /// Flip horizontally.
    pub mirror: bool,
    pub blend:  BlendMode,
}

impl Default for Blit {
    fn default() -> Self {
        Blit { mirror: false, blend: BlendMode::Disabled }
    }
}

impl Grid<Rgba> {
    /// Draw `src` over the whole of `self`, stretched to fit.
    ///
    /// With [`BlendMode::Disabled`] every cell is a pure overwrite.
    pub fn blit(&mut self, src: &ColorField, opts: Blit) {
        let (w, h) = (self.res.width as f32, self.res.height as f32);
        for y in 0..self.res.height {
            let v = (y as f32 + 0.5) / h;
            for x in 0..self.res.width {
                let mut u = (x as f32 + 0.5) / w;
                if opts.mirror { u = 1.0 - u; }
                let i = self.index(x, y);
                self.data[i] = opts.blend.apply(self.data[i], src.sample(u, v));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
