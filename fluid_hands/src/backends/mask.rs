//! Velocity mask: camera color gated by how fast each pixel moves.
//!
//! `color = density * min(|v| * gain, 1)`, alpha included, and the
//! luminance mask is the Rec. 601 luma of that color.

use flow_field::{ColorField, Resolution, ScalarField, VectorField};

use crate::collab::VelocityMask;
use crate::error::{Error, Result};

pub struct CpuVelocityMask {
    density:   ColorField,
    velocity:  VectorField,
    color:     ColorField,
    luminance: ScalarField,
    /// Speed at which the mask saturates is `1 / gain`.
    pub gain:  f32,
}

impl CpuVelocityMask {
    pub fn new() -> Self {
        let one = Resolution::new(1, 1);
        CpuVelocityMask {
            density:   ColorField::zeros(one),
            velocity:  VectorField::zeros(one),
            color:     ColorField::zeros(one),
            luminance: ScalarField::zeros(one),
            gain:      4.0,
        }
    }
}

impl Default for CpuVelocityMask {
    fn default() -> Self { CpuVelocityMask::new() }
}

impl VelocityMask for CpuVelocityMask {
    fn setup(&mut self, res: Resolution) -> Result<()> {
        if res.is_empty() {
            return Err(Error::Setup { stage: "velocity mask", reason: format!("empty resolution {res}") });
        }
        self.density   = ColorField::zeros(res);
        self.velocity  = VectorField::zeros(res);
        self.color     = ColorField::zeros(res);
        self.luminance = ScalarField::zeros(res);
        Ok(())
    }

    fn set_density(&mut self, frame: &ColorField) { self.density.resample_from(frame); }

    fn set_velocity(&mut self, flow: &VectorField) { self.velocity.resample_from(flow); }

    fn update(&mut self) {
        let cells = self.density.data().iter().zip(self.velocity.data());
        for ((out, lum), (&d, v)) in self.color.data_mut().iter_mut()
            .zip(self.luminance.data_mut().iter_mut())
            .zip(cells)
        {
            let m = (v.length() * self.gain).min(1.0);
            *out = d * m;
            *lum = out.luminance();
        }
    }

    fn color_mask(&self) -> &ColorField { &self.color }

    fn luminance_mask(&self) -> &ScalarField { &self.luminance }
}
