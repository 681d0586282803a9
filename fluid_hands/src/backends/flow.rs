//! Optical flow that reports a still scene.
//!
//! No motion is estimated: the instantaneous flow is always zero.  The
//! decayed flow still follows its contract (`decay = decay * k + flow`), so
//! anything written into the instantaneous field by [`NullFlow::inject`]
//! fades out over the following updates.
//!
//! With this backend wired in, camera motion does not move the fluid.

use flow_field::{ColorField, Resolution, VectorField};

use crate::collab::OpticalFlow;
use crate::error::{Error, Result};

pub struct NullFlow {
    source: ColorField,
    flow:   VectorField,
    decay:  VectorField,
    /// Fraction of the decayed flow kept per second.
    pub keep_per_second: f32,
}

impl NullFlow {
    pub fn new() -> Self {
        let one = Resolution::new(1, 1);
        NullFlow {
            source: ColorField::zeros(one),
            flow:   VectorField::zeros(one),
            decay:  VectorField::zeros(one),
            keep_per_second: 0.1,
        }
    }

    /// Overwrite the instantaneous flow; it is folded into the decayed flow
    /// on the next update and then cleared.
    pub fn inject(&mut self, flow: &VectorField) {
        self.flow.resample_from(flow);
    }

    /// The last source image, at flow resolution.
    pub fn source(&self) -> &ColorField { &self.source }
}

impl Default for NullFlow {
    fn default() -> Self { NullFlow::new() }
}

impl OpticalFlow for NullFlow {
    fn setup(&mut self, res: Resolution) -> Result<()> {
        if res.is_empty() {
            return Err(Error::Setup { stage: "optical flow", reason: format!("empty resolution {res}") });
        }
        self.source = ColorField::zeros(res);
        self.flow   = VectorField::zeros(res);
        self.decay  = VectorField::zeros(res);
        Ok(())
    }

    fn set_source(&mut self, frame: &ColorField) {
        self.source.resample_from(frame);
    }

    fn update(&mut self, dt: f32) {
        self.decay.scale_in_place(self.keep_per_second.clamp(0.0, 1.0).powf(dt));
        self.decay.add_scaled(&self.flow, 1.0);
        self.flow.clear();
    }

    fn optical_flow(&self) -> &VectorField { &self.flow }

    fn optical_flow_decay(&self) -> &VectorField { &self.decay }
}
