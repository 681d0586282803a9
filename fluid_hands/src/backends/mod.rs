//! Collaborators shipped with the binary.
//!
//! * [`camera`] — synthetic camera, plus a nokhwa webcam (`--features webcam`).
//! * [`flow`] — a still-scene optical flow.
//! * [`mask`] — CPU velocity mask.
//! * [`fluid`] — forcing-only fluid: integrates inputs and dissipates them.
//! * [`particles`] — CPU particles advected by flow and fluid velocity.

pub mod camera;
pub mod flow;
pub mod fluid;
pub mod mask;
pub mod particles;

pub use camera::{FallbackCamera, SimCamera};
#[cfg(feature = "webcam")]
pub use camera::Webcam;
pub use flow::NullFlow;
pub use fluid::ForcingFluid;
pub use mask::CpuVelocityMask;
pub use particles::CpuParticles;
