//! The frame orchestrator: owns every collaborator and drives them through
//! one fixed sequence per tick.
//!
//! ```text
//! tracker.update ─► dt ─► camera ─┬─(new frame)─► buffer ─► flow ─► mask
//!                                 └──────────────────────────────────┐
//!   fluid ◄── flow decay, color mask, luminance mask ◄───────────────┘
//!   fluid ◄── pointer forces that changed (velocity also ─► particles)
//!   fluid.update ─► particles (fed from fluid + flow when active) ─► particles.update
//! ```
//!
//! Everything runs on the calling thread.  Lifecycle events from the tracker
//! reach the registered sink from inside `tracker.update()`.

use flow_field::{Blit, BlendMode, Canvas, ColorField, Rgba};
use hand_tracker::{HandEventSink, TrackedHand, TrackerDevice, TrackerFeature};
use pointer_forces::{Force, ForceInjector};

use crate::collab::{CameraSource, FluidSimulation, OpticalFlow, ParticleSystem, VelocityMask};
use crate::config::{AppConfig, RenderMode};
use crate::context::{Clock, FrameContext, SystemClock};
use crate::error::Result;
use crate::views::FieldViews;

/// Radius of the marker drawn at every tracked hand, in pixels.
pub const HAND_MARKER_RADIUS: f32 = 20.0;

/// Every collaborator the orchestrator drives.
pub struct Collaborators {
    pub tracker:   Box<dyn TrackerDevice>,
    pub camera:    Box<dyn CameraSource>,
    pub flow:      Box<dyn OpticalFlow>,
    pub mask:      Box<dyn VelocityMask>,
    pub fluid:     Box<dyn FluidSimulation>,
    pub particles: Box<dyn ParticleSystem>,
    pub forces:    Box<dyn ForceInjector>,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameOrchestrator
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameOrchestrator<C: Clock = SystemClock> {
    parts:         Collaborators,
    clock:         C,
    ctx:           FrameContext,
    /// Mirrored copy of the latest camera frame; never resized.
    camera_buffer: ColorField,
    views:         FieldViews,
    flip_camera:   bool,
    render_mode:   RenderMode,
}

impl<C: Clock> FrameOrchestrator<C> {
    /// Initialise every collaborator once, in dependency order, and return
    /// the ready orchestrator.  The first failure aborts setup.
    pub fn setup(
        mut parts: Collaborators,
        clock:     C,
        cfg:       &AppConfig,
        sink:      Box<dyn HandEventSink>,
    ) -> Result<Self> {
        let res = cfg.resolutions();

        log::debug!("setup: tracker");
        let tracker = &mut parts.tracker;
        tracker.setup()?;
        tracker.enable(TrackerFeature::Depth)?;
        if cfg.tracker.registration { tracker.enable(TrackerFeature::Registration)?; }
        if cfg.tracker.mirror       { tracker.enable(TrackerFeature::Mirror)?; }
        tracker.enable(TrackerFeature::Hands)?;
        tracker.enable(TrackerFeature::HandFocusGestures)?;
        tracker.set_max_hands(cfg.tracker.max_hands);
        tracker.set_event_sink(sink);
        tracker.start()?;

        log::debug!("setup: optical flow {}", res.flow);
        parts.flow.setup(res.flow)?;
        log::debug!("setup: velocity mask {}", res.draw);
        parts.mask.setup(res.draw)?;
        log::debug!("setup: fluid + particles {} / {}", res.flow, res.draw);
        parts.fluid.setup(res.flow, res.draw, cfg.reduced_precision)?;
        parts.particles.setup(res.flow, res.draw, cfg.reduced_precision)?;

        let views = FieldViews::new(res.field);
        parts.forces.setup(res.flow, res.draw);

        log::debug!("setup: camera {}", res.camera);
        parts.camera.init_grabber(res.camera)?;
        let camera_buffer = ColorField::zeros(res.camera);

        let ctx = FrameContext::new(res, clock.now());
        log::info!(
            "ready: draw {} flow {} field {} camera {}",
            res.draw, res.flow, res.field, res.camera
        );

        Ok(FrameOrchestrator {
            parts,
            clock,
            ctx,
            camera_buffer,
            views,
            flip_camera: cfg.flip_camera,
            render_mode: cfg.render_mode,
        })
    }

    // ── update ────────────────────────────────────────────────────────────

    /// Advance one tick.
    pub fn update(&mut self) {
        let Collaborators { tracker, camera, flow, mask, fluid, particles, forces } = &mut self.parts;

        tracker.update();

        let dt = self.ctx.advance(self.clock.now());

        camera.update();
        if camera.is_frame_new() {
            self.camera_buffer.blit(
                camera.frame(),
                Blit { mirror: self.flip_camera, blend: BlendMode::Disabled },
            );
            flow.set_source(&self.camera_buffer);
            flow.update(dt);
            mask.set_density(&self.camera_buffer);
            mask.set_velocity(flow.optical_flow());
            mask.update();
        }

        fluid.add_velocity(flow.optical_flow_decay(), 1.0);
        fluid.add_density(mask.color_mask(), 1.0);
        fluid.add_temperature(mask.luminance_mask(), 1.0);

        forces.update(dt);
        for i in 0..forces.force_count() {
            if !forces.did_change(i) { continue; }
            let strength = forces.strength(i);
            match forces.force(i) {
                Some(Force::Density(f))     => fluid.add_density(f, strength),
                Some(Force::Velocity(f))    => {
                    fluid.add_velocity(f, strength);
                    particles.add_flow_velocity(f, strength);
                }
                Some(Force::Temperature(f)) => fluid.add_temperature(f, strength),
                Some(Force::Pressure(f))    => fluid.add_pressure(f, strength),
                Some(Force::Obstacle(f))    => fluid.add_temp_obstacle(f),
                _ => {}
            }
        }

        fluid.update(dt);

        if particles.is_active() {
            particles.set_speed(fluid.speed());
            particles.set_cell_size(fluid.cell_size());
            particles.add_flow_velocity(flow.optical_flow(), 1.0);
            particles.add_fluid_velocity(fluid.velocity());
            particles.set_obstacle(fluid.obstacle());
        }
        particles.update(dt);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    pub fn draw(&mut self, canvas: &mut Canvas) {
        match self.render_mode {
            RenderMode::Composite   => self.draw_composite(canvas),
            RenderMode::MouseForces => self.draw_mouse_forces(canvas),
        }
    }

    fn draw_composite(&self, canvas: &mut Canvas) {
        let rect = canvas.full_rect();
        canvas.draw_color_field(&self.camera_buffer, rect, BlendMode::Disabled);

        self.parts.fluid.draw(canvas, rect, BlendMode::Add);
        if self.parts.particles.is_active() {
            self.parts.particles.draw(canvas, rect, BlendMode::Add);
        }

        self.parts.tracker.draw_debug(canvas, rect);

        let sx = rect.w as f32 / self.ctx.res.draw.width.max(1) as f32;
        let sy = rect.h as f32 / self.ctx.res.draw.height.max(1) as f32;
        for hand in self.tracked_hands() {
            canvas.fill_circle(
                hand.position.x * sx,
                hand.position.y * sy,
                HAND_MARKER_RADIUS,
                Rgba::WHITE,
                BlendMode::Disabled,
            );
        }
    }

    fn draw_mouse_forces(&mut self, canvas: &mut Canvas) {
        let rect = canvas.full_rect();
        canvas.clear(0);
        let forces = &self.parts.forces;

        for i in 0..forces.force_count() {
            if !forces.did_change(i) { continue; }
            if let Some(Force::Density(f)) = forces.force(i) {
                canvas.draw_color_field(f, rect, BlendMode::Add);
            }
        }

        for i in 0..forces.force_count() {
            if !forces.did_change(i) { continue; }
            match forces.force(i) {
                Some(Force::Velocity(f)) => {
                    self.views.velocity.set_velocity(f);
                    self.views.velocity.draw(canvas, rect, BlendMode::Alpha);
                }
                Some(Force::Temperature(f)) => {
                    self.views.temperature.set_scalar(f);
                    self.views.temperature.draw(canvas, rect, BlendMode::Alpha);
                }
                Some(Force::Pressure(f)) => {
                    self.views.pressure.set_scalar(f);
                    self.views.pressure.draw(canvas, rect, BlendMode::Alpha);
                }
                _ => {}
            }
        }
    }

    // ── controls ──────────────────────────────────────────────────────────

    /// Clear the fluid and all pointer forces.
    pub fn reset(&mut self) {
        self.parts.fluid.reset();
        self.parts.forces.reset();
        log::info!("fluid and forces reset");
    }

    pub fn render_mode(&self) -> RenderMode { self.render_mode }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode != self.render_mode {
            log::info!("render mode: {}", mode.name());
        }
        self.render_mode = mode;
    }

    pub fn toggle_render_mode(&mut self) {
        self.set_render_mode(self.render_mode.toggled());
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn context(&self) -> &FrameContext { &self.ctx }

    pub fn camera_buffer(&self) -> &ColorField { &self.camera_buffer }

    pub fn tracked_hands(&self) -> impl Iterator<Item = &TrackedHand> + '_ {
        let tracker = &self.parts.tracker;
        (0..tracker.hand_count()).filter_map(move |i| tracker.hand(i))
    }

    // ── exit ──────────────────────────────────────────────────────────────

    /// Tear down: stop the tracker.
    pub fn exit(mut self) {
        self.parts.tracker.stop();
        log::info!("stopped after {} frames", self.ctx.frame);
    }
}
