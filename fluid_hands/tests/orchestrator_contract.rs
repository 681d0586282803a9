//! Orchestration contract, checked against recording fakes.
//!
//! Every fake appends to one shared call log, so tests can assert both what
//! was called and in which order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use flow_field::{
    BlendMode, Canvas, ColorField, Rect, Resolution, Rgba, ScalarField, Vec2, VectorField,
};
use fluid_hands::collab::{CameraSource, FluidSimulation, OpticalFlow, ParticleSystem, VelocityMask};
use fluid_hands::views::{ScalarView, VelocityView};
use fluid_hands::{AppConfig, Clock, Collaborators, Error, FrameOrchestrator, RenderMode, Result};
use hand_tracker::{
    HandEvent, HandEventSink, HandStatus, Point3, TrackedHand, TrackerDevice, TrackerError,
    TrackerFeature,
};
use pointer_forces::{Force, ForceInjector, ForceKind};

// ════════════════════════════════════════════════════════════════════════════
// Call log
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
enum Call {
    TrackerSetup,
    TrackerEnable(TrackerFeature),
    TrackerMaxHands(usize),
    TrackerSink,
    TrackerStart,
    TrackerUpdate,
    TrackerDraw,
    TrackerStop,
    Hand(HandStatus, i32),
    ClockRead,
    CameraInit(Resolution),
    CameraUpdate,
    FlowSetup(Resolution),
    FlowSource,
    FlowUpdate(f32),
    MaskSetup(Resolution),
    MaskDensity,
    MaskVelocity,
    MaskUpdate,
    FluidSetup(Resolution, Resolution, bool),
    FluidVelocity(f32),
    FluidDensity(f32),
    FluidTemperature(f32),
    FluidPressure(f32),
    FluidObstacle,
    FluidUpdate(f32),
    FluidDraw(BlendMode),
    FluidReset,
    ParticlesSetup,
    ParticlesSpeed(f32),
    ParticlesCellSize(f32),
    ParticlesFlowVelocity(f32),
    ParticlesFluidVelocity,
    ParticlesObstacle,
    ParticlesUpdate(f32),
    ParticlesDraw(BlendMode),
    ForcesSetup(Resolution, Resolution),
    ForcesUpdate(f32),
    ForcesReset,
}

type Log = Rc<RefCell<Vec<Call>>>;

fn record(log: &Log, call: Call) { log.borrow_mut().push(call); }

// ════════════════════════════════════════════════════════════════════════════
// Fakes
// ════════════════════════════════════════════════════════════════════════════

struct ScriptedClock {
    readings: RefCell<VecDeque<f64>>,
    last:     RefCell<f64>,
    log:      Log,
}

impl Clock for ScriptedClock {
    fn now(&self) -> f64 {
        record(&self.log, Call::ClockRead);
        if let Some(t) = self.readings.borrow_mut().pop_front() {
            *self.last.borrow_mut() = t;
        }
        *self.last.borrow()
    }
}

struct FakeTracker {
    log:     Log,
    sink:    Option<Box<dyn HandEventSink>>,
    hands:   Vec<TrackedHand>,
    pending: VecDeque<Vec<TrackedHand>>,
}

impl TrackerDevice for FakeTracker {
    fn setup(&mut self) -> Result<(), TrackerError> { record(&self.log, Call::TrackerSetup); Ok(()) }
    fn enable(&mut self, f: TrackerFeature) -> Result<(), TrackerError> {
        record(&self.log, Call::TrackerEnable(f));
        Ok(())
    }
    fn set_max_hands(&mut self, n: usize) { record(&self.log, Call::TrackerMaxHands(n)); }
    fn set_event_sink(&mut self, sink: Box<dyn HandEventSink>) {
        record(&self.log, Call::TrackerSink);
        self.sink = Some(sink);
    }
    fn start(&mut self) -> Result<(), TrackerError> { record(&self.log, Call::TrackerStart); Ok(()) }
    fn update(&mut self) {
        record(&self.log, Call::TrackerUpdate);
        if let Some(hands) = self.pending.pop_front() {
            for h in &hands {
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_hand_event(HandEvent { status: h.status, hand_id: h.id, device_id: 0 });
                }
            }
            self.hands = hands;
        }
    }
    fn hand_count(&self) -> usize { self.hands.len() }
    fn hand(&self, i: usize) -> Option<&TrackedHand> { self.hands.get(i) }
    fn draw_debug(&self, _canvas: &mut Canvas, _rect: Rect) { record(&self.log, Call::TrackerDraw); }
    fn stop(&mut self) { record(&self.log, Call::TrackerStop); }
}

struct FakeCamera {
    log:    Log,
    /// One entry per update: `Some(frame)` delivers a new frame.
    script: VecDeque<Option<ColorField>>,
    frame:  ColorField,
    new:    bool,
}

impl CameraSource for FakeCamera {
    fn init_grabber(&mut self, res: Resolution) -> Result<()> {
        record(&self.log, Call::CameraInit(res));
        self.frame = ColorField::zeros(res);
        Ok(())
    }
    fn update(&mut self) {
        record(&self.log, Call::CameraUpdate);
        self.new = false;
        if let Some(Some(f)) = self.script.pop_front() {
            self.frame = f;
            self.new = true;
        }
    }
    fn is_frame_new(&self) -> bool { self.new }
    fn frame(&self) -> &ColorField { &self.frame }
}

struct FakeFlow {
    log:   Log,
    flow:  VectorField,
    fail:  bool,
}

impl OpticalFlow for FakeFlow {
    fn setup(&mut self, res: Resolution) -> Result<()> {
        record(&self.log, Call::FlowSetup(res));
        if self.fail {
            return Err(Error::Setup { stage: "optical flow", reason: "test".into() });
        }
        self.flow = VectorField::zeros(res);
        Ok(())
    }
    fn set_source(&mut self, _f: &ColorField) { record(&self.log, Call::FlowSource); }
    fn update(&mut self, dt: f32) { record(&self.log, Call::FlowUpdate(dt)); }
    fn optical_flow(&self) -> &VectorField { &self.flow }
    fn optical_flow_decay(&self) -> &VectorField { &self.flow }
}

struct FakeMask {
    log:   Log,
    color: ColorField,
    lum:   ScalarField,
}

impl VelocityMask for FakeMask {
    fn setup(&mut self, res: Resolution) -> Result<()> {
        record(&self.log, Call::MaskSetup(res));
        Ok(())
    }
    fn set_density(&mut self, _f: &ColorField) { record(&self.log, Call::MaskDensity); }
    fn set_velocity(&mut self, _f: &VectorField) { record(&self.log, Call::MaskVelocity); }
    fn update(&mut self) { record(&self.log, Call::MaskUpdate); }
    fn color_mask(&self) -> &ColorField { &self.color }
    fn luminance_mask(&self) -> &ScalarField { &self.lum }
}

struct FakeFluid {
    log:      Log,
    velocity: VectorField,
    scalar:   ScalarField,
    density:  ColorField,
}

impl FluidSimulation for FakeFluid {
    fn setup(&mut self, flow: Resolution, draw: Resolution, rp: bool) -> Result<()> {
        record(&self.log, Call::FluidSetup(flow, draw, rp));
        Ok(())
    }
    fn add_velocity(&mut self, _f: &VectorField, s: f32)    { record(&self.log, Call::FluidVelocity(s)); }
    fn add_density(&mut self, _f: &ColorField, s: f32)      { record(&self.log, Call::FluidDensity(s)); }
    fn add_temperature(&mut self, _f: &ScalarField, s: f32) { record(&self.log, Call::FluidTemperature(s)); }
    fn add_pressure(&mut self, _f: &ScalarField, s: f32)    { record(&self.log, Call::FluidPressure(s)); }
    fn add_temp_obstacle(&mut self, _f: &ScalarField)       { record(&self.log, Call::FluidObstacle); }
    fn update(&mut self, dt: f32) { record(&self.log, Call::FluidUpdate(dt)); }
    fn draw(&self, _c: &mut Canvas, _r: Rect, blend: BlendMode) { record(&self.log, Call::FluidDraw(blend)); }
    fn velocity(&self)    -> &VectorField { &self.velocity }
    fn pressure(&self)    -> &ScalarField { &self.scalar }
    fn temperature(&self) -> &ScalarField { &self.scalar }
    fn divergence(&self)  -> &ScalarField { &self.scalar }
    fn obstacle(&self)    -> &ScalarField { &self.scalar }
    fn density(&self)     -> &ColorField  { &self.density }
    fn speed(&self) -> f32 { 0.25 }
    fn cell_size(&self) -> f32 { 1.5 }
    fn reset(&mut self) { record(&self.log, Call::FluidReset); }
}

struct FakeParticles {
    log:    Log,
    active: bool,
}

impl ParticleSystem for FakeParticles {
    fn setup(&mut self, _f: Resolution, _d: Resolution, _rp: bool) -> Result<()> {
        record(&self.log, Call::ParticlesSetup);
        Ok(())
    }
    fn is_active(&self) -> bool { self.active }
    fn set_speed(&mut self, s: f32) { record(&self.log, Call::ParticlesSpeed(s)); }
    fn set_cell_size(&mut self, s: f32) { record(&self.log, Call::ParticlesCellSize(s)); }
    fn add_flow_velocity(&mut self, _f: &VectorField, s: f32) {
        record(&self.log, Call::ParticlesFlowVelocity(s));
    }
    fn add_fluid_velocity(&mut self, _f: &VectorField) { record(&self.log, Call::ParticlesFluidVelocity); }
    fn set_obstacle(&mut self, _f: &ScalarField) { record(&self.log, Call::ParticlesObstacle); }
    fn update(&mut self, dt: f32) { record(&self.log, Call::ParticlesUpdate(dt)); }
    fn draw(&self, _c: &mut Canvas, _r: Rect, blend: BlendMode) {
        record(&self.log, Call::ParticlesDraw(blend));
    }
}

struct FakeForce {
    kind:     ForceKind,
    changed:  bool,
    strength: f32,
}

struct FakeForces {
    log:    Log,
    forces: Vec<FakeForce>,
    color:  ColorField,
    vector: VectorField,
    warm:   ScalarField,
    cool:   ScalarField,
}

impl ForceInjector for FakeForces {
    fn setup(&mut self, flow: Resolution, draw: Resolution) {
        record(&self.log, Call::ForcesSetup(flow, draw));
    }
    fn update(&mut self, dt: f32) { record(&self.log, Call::ForcesUpdate(dt)); }
    fn force_count(&self) -> usize { self.forces.len() }
    fn did_change(&self, i: usize) -> bool { self.forces.get(i).is_some_and(|f| f.changed) }
    fn strength(&self, i: usize) -> f32 { self.forces.get(i).map_or(0.0, |f| f.strength) }
    fn force(&self, i: usize) -> Option<Force<'_>> {
        Some(match self.forces.get(i)?.kind {
            ForceKind::Density     => Force::Density(&self.color),
            ForceKind::Velocity    => Force::Velocity(&self.vector),
            ForceKind::Temperature => Force::Temperature(&self.warm),
            ForceKind::Pressure    => Force::Pressure(&self.cool),
            ForceKind::Obstacle    => Force::Obstacle(&self.warm),
        })
    }
    fn reset(&mut self) { record(&self.log, Call::ForcesReset); }
}

// ════════════════════════════════════════════════════════════════════════════
// Rig
// ════════════════════════════════════════════════════════════════════════════

struct Rig {
    log:            Log,
    clock:          Vec<f64>,
    frames:         Vec<Option<ColorField>>,
    hands:          Vec<Vec<TrackedHand>>,
    forces:         Vec<FakeForce>,
    particles:      bool,
    fail_flow:      bool,
    cfg:            AppConfig,
}

impl Rig {
    fn new() -> Self {
        let cfg = AppConfig {
            width:         64,
            height:        32,
            camera_width:  8,
            camera_height: 6,
            ..AppConfig::default()
        };
        Rig {
            log:       Rc::new(RefCell::new(Vec::new())),
            clock:     vec![0.0],
            frames:    Vec::new(),
            hands:     Vec::new(),
            forces:    Vec::new(),
            particles: true,
            fail_flow: false,
            cfg,
        }
    }

    fn camera_res(&self) -> Resolution { self.cfg.resolutions().camera }

    fn build(self) -> (Log, Result<FrameOrchestrator<ScriptedClock>>) {
        let res = self.cfg.resolutions();
        let log = self.log;
        let parts = Collaborators {
            tracker: Box::new(FakeTracker {
                log:     Rc::clone(&log),
                sink:    None,
                hands:   Vec::new(),
                pending: self.hands.into(),
            }),
            camera: Box::new(FakeCamera {
                log:    Rc::clone(&log),
                script: self.frames.into(),
                frame:  ColorField::zeros(Resolution::new(1, 1)),
                new:    false,
            }),
            flow: Box::new(FakeFlow {
                log:  Rc::clone(&log),
                flow: VectorField::zeros(res.flow),
                fail: self.fail_flow,
            }),
            mask: Box::new(FakeMask {
                log:   Rc::clone(&log),
                color: ColorField::zeros(res.draw),
                lum:   ScalarField::zeros(res.draw),
            }),
            fluid: Box::new(FakeFluid {
                log:      Rc::clone(&log),
                velocity: VectorField::zeros(res.flow),
                scalar:   ScalarField::zeros(res.flow),
                density:  ColorField::zeros(res.draw),
            }),
            particles: Box::new(FakeParticles { log: Rc::clone(&log), active: self.particles }),
            forces: Box::new(FakeForces {
                log:    Rc::clone(&log),
                forces: self.forces,
                color:  ColorField::filled(res.draw, Rgba::new(1.0, 0.0, 0.0, 1.0)),
                vector: VectorField::filled(res.flow, Vec2::new(1.0, 0.0)),
                warm:   ScalarField::filled(res.flow, 1.0),
                cool:   ScalarField::filled(res.flow, -1.0),
            }),
        };
        let clock = ScriptedClock {
            readings: RefCell::new(self.clock.into()),
            last:     RefCell::new(0.0),
            log:      Rc::clone(&log),
        };
        let sink_log = Rc::clone(&log);
        let sink = Box::new(move |e: HandEvent| record(&sink_log, Call::Hand(e.status, e.hand_id)));
        let orch = FrameOrchestrator::setup(parts, clock, &self.cfg, sink);
        (log, orch)
    }
}

fn frame_of(res: Resolution, v: f32) -> ColorField {
    ColorField::filled(res, Rgba::new(v, v, v, 1.0))
}

/// Calls recorded since the last `take`.
fn take(log: &Log) -> Vec<Call> {
    std::mem::take(&mut *log.borrow_mut())
}

fn count(calls: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
    calls.iter().filter(|c| pred(c)).count()
}

fn position(calls: &[Call], target: &Call) -> usize {
    calls.iter().position(|c| c == target).unwrap_or_else(|| panic!("{target:?} not in {calls:?}"))
}

fn hand(id: i32, status: HandStatus, x: f32, y: f32) -> TrackedHand {
    TrackedHand { id, position: Vec2::new(x, y), world: Point3::default(), status }
}

// ════════════════════════════════════════════════════════════════════════════
// Setup and exit
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn setup_runs_in_dependency_order() {
    let rig = Rig::new();
    let res = rig.cfg.resolutions();
    let (log, orch) = rig.build();
    let orch = orch.unwrap();
    let calls = take(&log);

    assert_eq!(&calls[..10], &[
        Call::TrackerSetup,
        Call::TrackerEnable(TrackerFeature::Depth),
        Call::TrackerEnable(TrackerFeature::Registration),
        Call::TrackerEnable(TrackerFeature::Mirror),
        Call::TrackerEnable(TrackerFeature::Hands),
        Call::TrackerEnable(TrackerFeature::HandFocusGestures),
        Call::TrackerMaxHands(2),
        Call::TrackerSink,
        Call::TrackerStart,
        Call::FlowSetup(res.flow),
    ]);
    assert_eq!(&calls[10..], &[
        Call::MaskSetup(res.draw),
        Call::FluidSetup(res.flow, res.draw, false),
        Call::ParticlesSetup,
        Call::ForcesSetup(res.flow, res.draw),
        Call::CameraInit(res.camera),
        Call::ClockRead,
    ]);
    assert_eq!(orch.camera_buffer().resolution(), res.camera);
    assert_eq!(orch.context().frame, 0);
}

#[test]
fn setup_failure_stops_later_stages() {
    let mut rig = Rig::new();
    rig.fail_flow = true;
    let (log, orch) = rig.build();
    assert!(matches!(orch, Err(Error::Setup { stage: "optical flow", .. })));
    let calls = take(&log);
    assert!(!calls.iter().any(|c| matches!(c, Call::CameraInit(_) | Call::MaskSetup(_))));
}

#[test]
fn exit_stops_the_tracker_once() {
    let (log, orch) = Rig::new().build();
    let mut orch = orch.unwrap();
    orch.update();
    take(&log);
    orch.exit();
    assert_eq!(take(&log), vec![Call::TrackerStop]);
}

// ════════════════════════════════════════════════════════════════════════════
// Tick sequence
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn elapsed_time_is_read_once_between_tracker_and_flow() {
    let mut rig = Rig::new();
    rig.clock = vec![0.0, 0.25];
    rig.frames = vec![Some(frame_of(rig.camera_res(), 0.5))];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    assert_eq!(count(&calls, |c| *c == Call::ClockRead), 1);
    let clock = position(&calls, &Call::ClockRead);
    assert!(position(&calls, &Call::TrackerUpdate) < clock);
    assert!(clock < position(&calls, &Call::CameraUpdate));
    assert!(clock < position(&calls, &Call::FlowSource));
    assert!(clock < position(&calls, &Call::MaskDensity));
}

#[test]
fn full_tick_order() {
    let mut rig = Rig::new();
    rig.clock = vec![0.0, 0.5];
    rig.frames = vec![Some(frame_of(rig.camera_res(), 0.5))];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    assert_eq!(take(&log), vec![
        Call::TrackerUpdate,
        Call::ClockRead,
        Call::CameraUpdate,
        Call::FlowSource,
        Call::FlowUpdate(0.5),
        Call::MaskDensity,
        Call::MaskVelocity,
        Call::MaskUpdate,
        Call::FluidVelocity(1.0),
        Call::FluidDensity(1.0),
        Call::FluidTemperature(1.0),
        Call::ForcesUpdate(0.5),
        Call::FluidUpdate(0.5),
        Call::ParticlesSpeed(0.25),
        Call::ParticlesCellSize(1.5),
        Call::ParticlesFlowVelocity(1.0),
        Call::ParticlesFluidVelocity,
        Call::ParticlesObstacle,
        Call::ParticlesUpdate(0.5),
    ]);
}

#[test]
fn no_new_frame_still_forces_the_fluid_once() {
    let (log, orch) = Rig::new().build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    assert_eq!(count(&calls, |c| matches!(c, Call::FlowSource | Call::FlowUpdate(_))), 0);
    assert_eq!(count(&calls, |c| matches!(c, Call::MaskDensity | Call::MaskVelocity | Call::MaskUpdate)), 0);
    assert_eq!(count(&calls, |c| matches!(c, Call::FluidVelocity(_))), 1);
    assert_eq!(count(&calls, |c| matches!(c, Call::FluidDensity(_))), 1);
    assert_eq!(count(&calls, |c| matches!(c, Call::FluidTemperature(_))), 1);
}

#[test]
fn camera_buffer_only_changes_on_new_frames() {
    let mut rig = Rig::new();
    let cres = rig.camera_res();
    rig.frames = vec![Some(frame_of(cres, 0.2)), None, Some(frame_of(cres, 0.8))];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    assert_eq!(orch.camera_buffer().get(0, 0).r, 0.2);
    orch.update();
    assert_eq!(orch.camera_buffer().get(0, 0).r, 0.2);
    orch.update();
    assert_eq!(orch.camera_buffer().get(0, 0).r, 0.8);
    assert_eq!(orch.camera_buffer().resolution(), cres);

    let calls = take(&log);
    assert_eq!(count(&calls, |c| matches!(c, Call::FlowUpdate(_))), 2);
}

#[test]
fn camera_buffer_is_mirrored() {
    let mut rig = Rig::new();
    let cres = rig.camera_res();
    let mut frame = ColorField::zeros(cres);
    for y in 0..cres.height { frame.set(0, y, Rgba::WHITE); }
    rig.frames = vec![Some(frame.clone()), Some(frame)];
    rig.cfg.flip_camera = true;
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();

    orch.update();
    assert_eq!(orch.camera_buffer().get(cres.width - 1, 0), Rgba::WHITE);
    assert_eq!(orch.camera_buffer().get(0, 0), Rgba::default());
}

#[test]
fn camera_buffer_is_not_mirrored_when_disabled() {
    let mut rig = Rig::new();
    let cres = rig.camera_res();
    let mut frame = ColorField::zeros(cres);
    frame.set(0, 0, Rgba::WHITE);
    rig.frames = vec![Some(frame)];
    rig.cfg.flip_camera = false;
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();

    orch.update();
    assert_eq!(orch.camera_buffer().get(0, 0), Rgba::WHITE);
}

#[test]
fn delta_times_follow_the_clock() {
    let mut rig = Rig::new();
    rig.clock = vec![0.0, 0.5, 1.2];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    assert!((orch.context().delta_time - 0.5).abs() < 1e-6);
    orch.update();
    assert!((orch.context().delta_time - 0.7).abs() < 1e-6);

    let updates: Vec<f32> = take(&log).into_iter()
        .filter_map(|c| if let Call::FluidUpdate(dt) = c { Some(dt) } else { None })
        .collect();
    assert_eq!(updates.len(), 2);
    assert!((updates[0] - 0.5).abs() < 1e-6);
    assert!((updates[1] - 0.7).abs() < 1e-6);
}

#[test]
fn backwards_clock_gives_zero_delta() {
    let mut rig = Rig::new();
    rig.clock = vec![2.0, 1.0];
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();
    orch.update();
    assert_eq!(orch.context().delta_time, 0.0);
}

// ════════════════════════════════════════════════════════════════════════════
// Forces and particles
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn only_changed_forces_reach_the_fluid() {
    let mut rig = Rig::new();
    rig.forces = vec![
        FakeForce { kind: ForceKind::Density,     changed: false, strength: 9.0 },
        FakeForce { kind: ForceKind::Velocity,    changed: true,  strength: 3.0 },
        FakeForce { kind: ForceKind::Temperature, changed: true,  strength: 2.0 },
        FakeForce { kind: ForceKind::Pressure,    changed: true,  strength: 4.0 },
        FakeForce { kind: ForceKind::Obstacle,    changed: true,  strength: 7.0 },
        FakeForce { kind: ForceKind::Pressure,    changed: false, strength: 8.0 },
    ];
    rig.particles = false;
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    assert_eq!(count(&calls, |c| *c == Call::FluidDensity(9.0)), 0);
    assert_eq!(count(&calls, |c| *c == Call::FluidVelocity(3.0)), 1);
    assert_eq!(count(&calls, |c| *c == Call::ParticlesFlowVelocity(3.0)), 1);
    assert_eq!(count(&calls, |c| *c == Call::FluidTemperature(2.0)), 1);
    assert_eq!(count(&calls, |c| *c == Call::FluidPressure(4.0)), 1);
    assert_eq!(count(&calls, |c| *c == Call::FluidPressure(8.0)), 0);
    assert_eq!(count(&calls, |c| *c == Call::FluidObstacle), 1);

    // Forces land after the injector update and before the fluid step.
    let forces = position(&calls, &Call::ForcesUpdate(0.0));
    let step = position(&calls, &Call::FluidUpdate(0.0));
    let applied = position(&calls, &Call::FluidVelocity(3.0));
    assert!(forces < applied && applied < step);
}

#[test]
fn unchanged_forces_produce_no_forcing() {
    let mut rig = Rig::new();
    rig.forces = vec![
        FakeForce { kind: ForceKind::Velocity, changed: false, strength: 3.0 },
        FakeForce { kind: ForceKind::Obstacle, changed: false, strength: 1.0 },
    ];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    assert_eq!(count(&calls, |c| matches!(c, Call::FluidVelocity(_))), 1);
    assert_eq!(count(&calls, |c| *c == Call::FluidObstacle), 0);
    assert_eq!(count(&calls, |c| *c == Call::ParticlesFlowVelocity(3.0)), 0);
}

#[test]
fn inactive_particles_are_updated_but_not_fed() {
    let mut rig = Rig::new();
    rig.particles = false;
    rig.clock = vec![0.0, 0.1];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    assert_eq!(count(&calls, |c| matches!(
        c,
        Call::ParticlesSpeed(_) | Call::ParticlesCellSize(_) | Call::ParticlesFlowVelocity(_)
            | Call::ParticlesFluidVelocity | Call::ParticlesObstacle
    )), 0);
    assert_eq!(count(&calls, |c| matches!(c, Call::ParticlesUpdate(_))), 1);
}

// ════════════════════════════════════════════════════════════════════════════
// Hands
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn hand_events_arrive_inside_the_tracker_update() {
    let mut rig = Rig::new();
    rig.hands = vec![vec![hand(4, HandStatus::Appeared, 10.0, 10.0)]];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    orch.update();
    let calls = take(&log);
    let ev = position(&calls, &Call::Hand(HandStatus::Appeared, 4));
    assert!(position(&calls, &Call::TrackerUpdate) < ev);
    assert!(ev < position(&calls, &Call::ClockRead));
    assert_eq!(orch.tracked_hands().map(|h| h.id).collect::<Vec<_>>(), vec![4]);
}

// ════════════════════════════════════════════════════════════════════════════
// Draw
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn composite_draw_layers_in_order() {
    let mut rig = Rig::new();
    rig.hands = vec![vec![hand(1, HandStatus::Appeared, 32.0, 16.0)]];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    orch.update();
    take(&log);

    let mut canvas = Canvas::new(Resolution::new(64, 32));
    orch.draw(&mut canvas);
    assert_eq!(take(&log), vec![
        Call::FluidDraw(BlendMode::Add),
        Call::ParticlesDraw(BlendMode::Add),
        Call::TrackerDraw,
    ]);
    assert_eq!(canvas.pixel(32, 16), Some(0x00FF_FFFF));
}

#[test]
fn composite_skips_inactive_particles() {
    let mut rig = Rig::new();
    rig.particles = false;
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    let mut canvas = Canvas::new(Resolution::new(64, 32));
    orch.draw(&mut canvas);
    assert_eq!(take(&log), vec![Call::FluidDraw(BlendMode::Add), Call::TrackerDraw]);
}

#[test]
fn mouse_forces_mode_draws_only_changed_forces() {
    let mut rig = Rig::new();
    rig.cfg.render_mode = RenderMode::MouseForces;
    rig.forces = vec![FakeForce { kind: ForceKind::Density, changed: true, strength: 1.0 }];
    let (log, orch) = rig.build();
    let mut orch = orch.unwrap();
    take(&log);

    let mut canvas = Canvas::new(Resolution::new(64, 32));
    canvas.clear(0x0000_FF00);
    orch.draw(&mut canvas);
    assert!(take(&log).is_empty());
    assert_eq!(canvas.pixel(5, 5), Some(0x00FF_0000));
}

#[test]
fn mouse_forces_mode_is_blank_without_changes() {
    let mut rig = Rig::new();
    rig.cfg.render_mode = RenderMode::MouseForces;
    rig.forces = vec![FakeForce { kind: ForceKind::Density, changed: false, strength: 1.0 }];
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();

    let mut canvas = Canvas::new(Resolution::new(64, 32));
    canvas.clear(0x00FF_FFFF);
    orch.draw(&mut canvas);
    assert!(canvas.pixels().iter().all(|&p| p == 0));
}

#[test]
fn mouse_forces_mode_draws_changed_fields_through_views() {
    let mut rig = Rig::new();
    rig.cfg.render_mode = RenderMode::MouseForces;
    rig.forces = vec![
        FakeForce { kind: ForceKind::Density,     changed: false, strength: 1.0 },
        FakeForce { kind: ForceKind::Temperature, changed: true,  strength: 1.0 },
        FakeForce { kind: ForceKind::Velocity,    changed: true,  strength: 1.0 },
        FakeForce { kind: ForceKind::Pressure,    changed: false, strength: 1.0 },
    ];
    let res = rig.cfg.resolutions();
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();

    let mut canvas = Canvas::new(res.draw);
    canvas.clear(0x00FF_FFFF);
    orch.draw(&mut canvas);

    // Warm plot then arrows, nothing from the unchanged density or pressure.
    let mut expected = Canvas::new(res.draw);
    expected.clear(0);
    let rect = expected.full_rect();
    let mut warm = ScalarView::new(res.field);
    warm.set_scalar(&ScalarField::filled(res.flow, 1.0));
    warm.draw(&mut expected, rect, BlendMode::Alpha);
    let mut arrows = VelocityView::new(res.field);
    arrows.set_velocity(&VectorField::filled(res.flow, Vec2::new(1.0, 0.0)));
    arrows.draw(&mut expected, rect, BlendMode::Alpha);

    assert!(canvas.pixels().iter().any(|&p| p != 0));
    assert_eq!(canvas.pixels(), expected.pixels());
}

#[test]
fn mouse_forces_mode_draws_velocity_arrows_alone() {
    let mut rig = Rig::new();
    rig.cfg.render_mode = RenderMode::MouseForces;
    rig.forces = vec![
        FakeForce { kind: ForceKind::Velocity, changed: true,  strength: 1.0 },
        FakeForce { kind: ForceKind::Pressure, changed: false, strength: 1.0 },
    ];
    let res = rig.cfg.resolutions();
    let (_log, orch) = rig.build();
    let mut orch = orch.unwrap();

    let mut canvas = Canvas::new(res.draw);
    orch.draw(&mut canvas);

    let lit = canvas.pixels().iter().filter(|&&p| p != 0).count();
    assert!(lit > 0);
    assert!(lit < canvas.pixels().len());
}

#[test]
fn toggle_and_reset() {
    let (log, orch) = Rig::new().build();
    let mut orch = orch.unwrap();
    take(&log);

    assert_eq!(orch.render_mode(), RenderMode::Composite);
    orch.toggle_render_mode();
    assert_eq!(orch.render_mode(), RenderMode::MouseForces);

    orch.reset();
    assert_eq!(take(&log), vec![Call::FluidReset, Call::ForcesReset]);
}
