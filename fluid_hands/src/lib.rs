//! # fluid_hands
//!
//! Hands and camera motion stir a simulated fluid rendered full screen.
//!
//! The [`orchestrator::FrameOrchestrator`] owns a hand tracker, a camera,
//! an optical-flow estimator, a velocity mask, a fluid simulation, a particle
//! system and a pointer-force injector, and runs them through one fixed
//! sequence per tick:
//!
//! 1. advance the tracker (hand lifecycle events are delivered here)
//! 2. take one clock reading and derive the elapsed time
//! 3. on a new camera frame: copy it (mirrored), feed optical flow and mask
//! 4. push decayed flow, color mask and luminance mask into the fluid
//! 5. push every pointer force that changed this tick
//! 6. step the fluid
//! 7. feed and step the particles
//!
//! ## Render modes
//!
//! | Mode | Shows |
//! |---|---|
//! | `composite` (default) | camera, fluid, particles, tracker overlay, a marker per hand |
//! | `mouse-forces` | only the pointer forces that fired this tick |
//!
//! ## Feature flags
//!
//! * (default) — simulated hands (hold `H` / `J`) and a synthetic camera.
//! * `leap` — real LeapMotion hardware via LeapC.
//! * `webcam` — real webcam via nokhwa, falling back to the synthetic camera.
//!
//! The shipped optical flow is [`backends::NullFlow`], which reports a still
//! scene.  Camera motion therefore leaves the fluid untouched until a real
//! flow estimator is plugged in through [`collab::OpticalFlow`]; the camera
//! image itself is still drawn.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | left drag | density, velocity and heat |
//! | right hold | density, velocity and an obstacle |
//! | `H` / `J` held | simulated hand 1 / 2 at the pointer |
//! | `M` | toggle render mode |
//! | `R` | reset fluid and forces |
//! | `Esc` / `Q` | quit |

pub mod app;
pub mod backends;
pub mod collab;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod views;
pub mod visualizer;

pub use config::{AppConfig, Cli, RenderMode};
pub use context::{Clock, FrameContext, Resolutions, SystemClock};
pub use error::{Error, Result};
pub use orchestrator::{Collaborators, FrameOrchestrator};
