//! Building the collaborators and running the window loop.

use std::sync::mpsc;

use flow_field::{Canvas, Resolution};
use hand_tracker::{LogHandEvents, SimHandInput, TrackerDevice};
use pointer_forces::{ForceSpec, PointerEvent, PointerForces};

use crate::backends::{CpuParticles, CpuVelocityMask, ForcingFluid, NullFlow, SimCamera};
use crate::collab::CameraSource;
use crate::config::AppConfig;
use crate::context::{Clock, SystemClock};
use crate::error::Result;
use crate::orchestrator::{Collaborators, FrameOrchestrator};
use crate::visualizer::{Command, Visualizer};

/// Fixed particle seed so runs are repeatable.
const PARTICLE_SEED: u64 = 0x5eed;

fn build_tracker(space: Resolution, sim_rx: mpsc::Receiver<SimHandInput>) -> Box<dyn TrackerDevice> {
    #[cfg(feature = "leap")]
    {
        drop(sim_rx);
        Box::new(hand_tracker::LeapTracker::new(space))
    }
    #[cfg(not(feature = "leap"))]
    {
        Box::new(hand_tracker::SimTracker::new(sim_rx, space))
    }
}

fn build_camera(cfg: &AppConfig) -> Box<dyn CameraSource> {
    let synthetic = SimCamera::new(cfg.sim_camera_fps);
    #[cfg(feature = "webcam")]
    {
        if !cfg.sim_camera {
            return Box::new(crate::backends::FallbackCamera::new(
                Box::new(crate::backends::Webcam::new(0)),
                synthetic,
            ));
        }
    }
    Box::new(synthetic)
}

/// The stock collaborator set for `cfg`.
pub fn default_collaborators(
    cfg:        &AppConfig,
    sim_rx:     mpsc::Receiver<SimHandInput>,
    pointer_rx: mpsc::Receiver<PointerEvent>,
) -> Collaborators {
    let space = cfg.resolutions().draw;
    Collaborators {
        tracker:   build_tracker(space, sim_rx),
        camera:    build_camera(cfg),
        flow:      Box::new(NullFlow::new()),
        mask:      Box::new(CpuVelocityMask::new()),
        fluid:     Box::new(ForcingFluid::default()),
        particles: Box::new(CpuParticles::new(cfg.particles, PARTICLE_SEED)),
        forces:    Box::new(PointerForces::new(ForceSpec::default_set()).with_input(pointer_rx)),
    }
}

/// Apply one window command.  Returns `false` when the loop should stop.
pub fn apply_command<C: Clock>(orch: &mut FrameOrchestrator<C>, cmd: Command) -> bool {
    match cmd {
        Command::Quit             => return false,
        Command::ToggleRenderMode => orch.toggle_render_mode(),
        Command::Reset            => orch.reset(),
    }
    true
}

fn status_line<C: Clock>(orch: &FrameOrchestrator<C>) -> String {
    let ctx = orch.context();
    let fps = if ctx.delta_time > 0.0 { 1.0 / ctx.delta_time } else { 0.0 };
    format!(
        "{}  fps {:.0}  hands {}",
        orch.render_mode().name(),
        fps,
        orch.tracked_hands().count(),
    )
}

/// Run until the window closes.
pub fn run(cfg: AppConfig) -> Result<()> {
    let res = cfg.resolutions();

    let (sim_tx, sim_rx) = mpsc::channel::<SimHandInput>();
    let (pointer_tx, pointer_rx) = mpsc::channel::<PointerEvent>();

    let mut vis = Visualizer::new(res.draw, cfg.target_fps, pointer_tx, sim_tx)?;

    let parts = default_collaborators(&cfg, sim_rx, pointer_rx);
    let mut orch = FrameOrchestrator::setup(parts, SystemClock::new(), &cfg, Box::new(LogHandEvents))?;
    let mut canvas = Canvas::new(res.draw);

    let mut result = Ok(());
    'frames: while vis.is_open() {
        for cmd in vis.poll_input() {
            if !apply_command(&mut orch, cmd) { break 'frames; }
        }

        orch.update();
        orch.draw(&mut canvas);

        let status = status_line(&orch);
        if let Err(e) = vis.present(&mut canvas, &status) {
            result = Err(e);
            break;
        }
    }

    orch.exit();
    result
}
