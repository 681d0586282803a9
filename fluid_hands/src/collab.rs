//! Call-level contracts of the opaque collaborators the orchestrator drives.
//!
//! Setup calls may fail; per-tick calls never do.  Every field a collaborator
//! hands out is borrowed for the duration of one call and stays valid until
//! that collaborator's next `update`.

use flow_field::{BlendMode, Canvas, ColorField, Rect, Resolution, ScalarField, VectorField};

use crate::error::Result;

/// Webcam-like frame source.
pub trait CameraSource {
    /// Open the device and request frames of `res` (the actual size may differ).
    fn init_grabber(&mut self, res: Resolution) -> Result<()>;

    /// Pull whatever the device has produced since the last call.
    fn update(&mut self);

    /// True when `update` delivered a frame not seen before.
    fn is_frame_new(&self) -> bool;

    /// The most recent frame.
    fn frame(&self) -> &ColorField;
}

/// Dense optical-flow estimator.
pub trait OpticalFlow {
    fn setup(&mut self, res: Resolution) -> Result<()>;

    /// Image whose motion is measured on the next `update`.
    fn set_source(&mut self, frame: &ColorField);

    fn update(&mut self, dt: f32);

    /// Flow of the latest pair of frames.
    fn optical_flow(&self) -> &VectorField;

    /// Flow with temporal decay; non-zero for a while after motion stops.
    fn optical_flow_decay(&self) -> &VectorField;
}

/// Combines camera color with flow speed into density and heat masks.
pub trait VelocityMask {
    fn setup(&mut self, res: Resolution) -> Result<()>;

    fn set_density(&mut self, frame: &ColorField);

    fn set_velocity(&mut self, flow: &VectorField);

    fn update(&mut self);

    fn color_mask(&self) -> &ColorField;

    fn luminance_mask(&self) -> &ScalarField;
}

/// The fluid solver.
pub trait FluidSimulation {
    fn setup(&mut self, flow: Resolution, draw: Resolution, reduced_precision: bool) -> Result<()>;

    fn add_velocity(&mut self, field: &VectorField, strength: f32);
    fn add_density(&mut self, field: &ColorField, strength: f32);
    fn add_temperature(&mut self, field: &ScalarField, strength: f32);
    fn add_pressure(&mut self, field: &ScalarField, strength: f32);

    /// Obstacle for the next `update` only.
    fn add_temp_obstacle(&mut self, field: &ScalarField);

    fn update(&mut self, dt: f32);

    fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode);

    fn velocity(&self)    -> &VectorField;
    fn pressure(&self)    -> &ScalarField;
    fn temperature(&self) -> &ScalarField;
    fn divergence(&self)  -> &ScalarField;
    fn obstacle(&self)    -> &ScalarField;
    fn density(&self)     -> &ColorField;

    /// Simulation speed multiplier.
    fn speed(&self) -> f32;

    /// Size of one simulation cell, in normalised units.
    fn cell_size(&self) -> f32;

    fn reset(&mut self);
}

/// Particles carried by the fluid.
pub trait ParticleSystem {
    fn setup(&mut self, flow: Resolution, draw: Resolution, reduced_precision: bool) -> Result<()>;

    fn is_active(&self) -> bool;

    fn set_speed(&mut self, speed: f32);
    fn set_cell_size(&mut self, size: f32);

    fn add_flow_velocity(&mut self, field: &VectorField, strength: f32);
    fn add_fluid_velocity(&mut self, field: &VectorField);
    fn set_obstacle(&mut self, field: &ScalarField);

    fn update(&mut self, dt: f32);

    fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode);
}
