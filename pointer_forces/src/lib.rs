//! # pointer_forces
//!
//! Turn pointer drags into typed, timed forcing impulses for a fluid
//! simulation.
//!
//! Each configured force owns a payload field (color for density, vector for
//! velocity, scalar for temperature / pressure / obstacle).  Every
//! [`ForceInjector::update`] re-renders the payloads from the pointer state
//! and raises a per-force `changed` flag; consumers apply only the forces
//! whose flag is set.
//!
//! ## Quick start
//!
//! ```rust
//! use flow_field::{Resolution, Vec2};
//! use pointer_forces::{ForceInjector, PointerButton, PointerEvent, PointerForces};
//!
//! let mut forces = PointerForces::default();
//! forces.setup(Resolution::new(160, 90), Resolution::new(1280, 720));
//!
//! forces.push_event(PointerEvent::Down { button: PointerButton::Primary, position: Vec2::new(0.5, 0.5) });
//! forces.push_event(PointerEvent::Drag { button: PointerButton::Primary, position: Vec2::new(0.6, 0.5) });
//! forces.update(1.0 / 60.0);
//!
//! let changed = (0..forces.force_count()).filter(|&i| forces.did_change(i)).count();
//! assert_eq!(changed, 3); // density, velocity, temperature
//! ```

use std::sync::mpsc::{Receiver, TryRecvError};

use flow_field::{ColorField, Resolution, Rgba, ScalarField, Vec2, VectorField};

// ════════════════════════════════════════════════════════════════════════════
// ForceKind / Force
// ════════════════════════════════════════════════════════════════════════════

/// Which fluid input a force drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceKind {
    Density,
    Velocity,
    Temperature,
    Pressure,
    Obstacle,
}

impl ForceKind {
    pub fn name(self) -> &'static str {
        match self {
            ForceKind::Density     => "density",
            ForceKind::Velocity    => "velocity",
            ForceKind::Temperature => "temperature",
            ForceKind::Pressure    => "pressure",
            ForceKind::Obstacle    => "obstacle",
        }
    }
}

/// A force payload, tagged by what it drives.
///
/// New kinds may be added; matches need a wildcard arm.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Force<'a> {
    Density(&'a ColorField),
    Velocity(&'a VectorField),
    Temperature(&'a ScalarField),
    Pressure(&'a ScalarField),
    Obstacle(&'a ScalarField),
}

impl Force<'_> {
    pub fn kind(&self) -> ForceKind {
        match self {
            Force::Density(_)     => ForceKind::Density,
            Force::Velocity(_)    => ForceKind::Velocity,
            Force::Temperature(_) => ForceKind::Temperature,
            Force::Pressure(_)    => ForceKind::Pressure,
            Force::Obstacle(_)    => ForceKind::Obstacle,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ForceInjector — what the frame loop consumes
// ════════════════════════════════════════════════════════════════════════════

/// A source of per-tick forcing impulses.
pub trait ForceInjector {
    /// Allocate payloads: density forces at `draw` (when full resolution),
    /// everything else at `flow`.
    fn setup(&mut self, flow: Resolution, draw: Resolution);

    /// Re-render payloads for this tick; `dt` is the elapsed time in seconds.
    fn update(&mut self, dt: f32);

    fn force_count(&self) -> usize;

    /// True when force `index` carries a fresh impulse this tick.
    fn did_change(&self, index: usize) -> bool;

    fn strength(&self, index: usize) -> f32;

    fn force(&self, index: usize) -> Option<Force<'_>>;

    /// Drop all payloads and pointer state.
    fn reset(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Pointer input
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton { Primary, Secondary }

/// Pointer input in normalised screen coordinates (`0.0..=1.0`, origin top
/// left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, position: Vec2 },
    Drag { button: PointerButton, position: Vec2 },
    Up   { button: PointerButton },
}

#[derive(Clone, Copy, Debug, Default)]
struct ButtonState {
    down:     bool,
    moved:    bool,
    position: Vec2,
    previous: Option<Vec2>,
    /// Last non-zero drag velocity, normalised units per second.
    velocity: Vec2,
}

// ════════════════════════════════════════════════════════════════════════════
// ForceSpec — one configured force
// ════════════════════════════════════════════════════════════════════════════

/// Static description of one force.
///
/// # Example
/// ```rust
/// use pointer_forces::{ForceKind, ForceSpec, PointerButton};
///
/// let spec = ForceSpec::velocity(PointerButton::Primary).strength(4.0).radius(0.05);
/// assert_eq!(spec.kind, ForceKind::Velocity);
/// assert!(spec.temporary);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSpec {
    pub kind:            ForceKind,
    pub button:          PointerButton,
    pub strength:        f32,
    /// Splat radius as a fraction of the payload width.
    pub radius:          f32,
    /// Temporary forces only fire while the pointer moves; persistent ones
    /// fire for as long as the button is held.
    pub temporary:       bool,
    /// Density color.
    pub color:           Rgba,
    /// Temperature / pressure value at the splat centre.
    pub value:           f32,
    /// Render at draw resolution instead of flow resolution.
    pub full_resolution: bool,
}

impl ForceSpec {
    fn new(kind: ForceKind, button: PointerButton) -> Self {
        ForceSpec {
            kind,
            button,
            strength:        1.0,
            radius:          0.035,
            temporary:       true,
            color:           Rgba::WHITE,
            value:           1.0,
            full_resolution: false,
        }
    }

    /// Colored density at draw resolution.
    pub fn density(button: PointerButton, color: Rgba) -> Self {
        ForceSpec { color, full_resolution: true, ..ForceSpec::new(ForceKind::Density, button) }
    }
    /// Drag velocity.
    pub fn velocity(button: PointerButton) -> Self {
        ForceSpec { radius: 0.02, ..ForceSpec::new(ForceKind::Velocity, button) }
    }
    /// Heat source (negative `value` cools).
    pub fn temperature(button: PointerButton, value: f32) -> Self {
        ForceSpec { value, radius: 0.05, ..ForceSpec::new(ForceKind::Temperature, button) }
    }
    /// Pressure impulse.
    pub fn pressure(button: PointerButton, value: f32) -> Self {
        ForceSpec { value, ..ForceSpec::new(ForceKind::Pressure, button) }
    }
    /// Hard-edged temporary obstacle.
    pub fn obstacle(button: PointerButton) -> Self {
        ForceSpec { radius: 0.02, ..ForceSpec::new(ForceKind::Obstacle, button) }
    }

    pub fn strength(mut self, s: f32) -> Self { self.strength = s; self }
    pub fn radius(mut self, r: f32) -> Self { self.radius = r; self }
    pub fn persistent(mut self) -> Self { self.temporary = false; self }

    /// Default mouse-draw set: primary drag paints density, velocity and
    /// heat; secondary hold emits density and velocity and blocks the flow.
    pub fn default_set() -> Vec<ForceSpec> {
        use PointerButton::*;
        vec![
            ForceSpec::density(Primary, Rgba::new(1.0, 0.55, 0.2, 1.0)),
            ForceSpec::velocity(Primary).strength(2.0),
            ForceSpec::temperature(Primary, 1.0),
            ForceSpec::density(Secondary, Rgba::new(0.2, 0.6, 1.0, 1.0)).persistent(),
            ForceSpec::velocity(Secondary).strength(2.0).persistent(),
            ForceSpec::obstacle(Secondary).persistent(),
        ]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrawForce — a spec plus its rendered payload
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
enum Payload {
    Color(ColorField),
    Vector(VectorField),
    Scalar(ScalarField),
}

impl Payload {
    fn for_spec(spec: &ForceSpec, res: Resolution) -> Self {
        match spec.kind {
            ForceKind::Density  => Payload::Color(ColorField::zeros(res)),
            ForceKind::Velocity => Payload::Vector(VectorField::zeros(res)),
            ForceKind::Temperature | ForceKind::Pressure | ForceKind::Obstacle =>
                Payload::Scalar(ScalarField::zeros(res)),
        }
    }

    fn clear(&mut self) {
        match self {
            Payload::Color(f)  => f.clear(),
            Payload::Vector(f) => f.clear(),
            Payload::Scalar(f) => f.clear(),
        }
    }
}

#[derive(Clone, Debug)]
struct DrawForce {
    spec:    ForceSpec,
    payload: Payload,
    changed: bool,
}

impl DrawForce {
    /// Clear the payload and splat one dab centred on `at`.
    fn render(&mut self, at: Vec2, velocity: Vec2) {
        self.payload.clear();
        let spec = &self.spec;
        match &mut self.payload {
            Payload::Color(f)  => splat(f, at, spec.radius, |w| spec.color * w),
            Payload::Vector(f) => splat(f, at, spec.radius, |w| velocity * w),
            Payload::Scalar(f) if spec.kind == ForceKind::Obstacle =>
                splat(f, at, spec.radius, |w| if w > 0.0 { 1.0 } else { 0.0 }),
            Payload::Scalar(f) => splat(f, at, spec.radius, |w| spec.value * w),
        }
    }
}

/// Write `value(weight)` into every cell within `radius` of `at`, where
/// `weight` falls smoothly from 1 at the centre to 0 at the rim.
fn splat<T: Copy>(field: &mut flow_field::Grid<T>, at: Vec2, radius: f32, value: impl Fn(f32) -> T) {
    let res = field.resolution();
    let (w, h) = (res.width as f32, res.height as f32);
    let r_cells = (radius * w).max(0.5);

    let cx = at.x * w;
    let cy = at.y * h;
    let x0 = (cx - r_cells).floor().max(0.0) as usize;
    let y0 = (cy - r_cells).floor().max(0.0) as usize;
    let x1 = ((cx + r_cells).ceil() as usize).min(res.width);
    let y1 = ((cy + r_cells).ceil() as usize).min(res.height);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt() / r_cells;
            if d < 1.0 {
                let t = 1.0 - d;
                field.set(x, y, value(t * t * (3.0 - 2.0 * t)));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointerForces
// ════════════════════════════════════════════════════════════════════════════

/// The pointer-driven [`ForceInjector`].
pub struct PointerForces {
    specs:     Vec<ForceSpec>,
    forces:    Vec<DrawForce>,
    rx:        Option<Receiver<PointerEvent>>,
    primary:   ButtonState,
    secondary: ButtonState,
}

impl Default for PointerForces {
    fn default() -> Self { PointerForces::new(ForceSpec::default_set()) }
}

impl PointerForces {
    pub fn new(specs: Vec<ForceSpec>) -> Self {
        PointerForces {
            specs,
            forces:    Vec::new(),
            rx:        None,
            primary:   ButtonState::default(),
            secondary: ButtonState::default(),
        }
    }

    /// Receive pointer events from a channel, drained on every `update`.
    pub fn with_input(mut self, rx: Receiver<PointerEvent>) -> Self {
        self.rx = Some(rx);
        self
    }

    pub fn specs(&self) -> &[ForceSpec] { &self.specs }

    fn button_mut(&mut self, b: PointerButton) -> &mut ButtonState {
        match b {
            PointerButton::Primary   => &mut self.primary,
            PointerButton::Secondary => &mut self.secondary,
        }
    }

    /// Feed one pointer event; it takes effect on the next `update`.
    pub fn push_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { button, position } => {
                let b = self.button_mut(button);
                b.down = true;
                b.moved = true;
                b.position = position;
                b.previous = None;
            }
            PointerEvent::Drag { button, position } => {
                let b = self.button_mut(button);
                if !b.down { return; }
                if b.previous.is_none() { b.previous = Some(b.position); }
                b.position = position;
                b.moved = true;
            }
            PointerEvent::Up { button } => {
                let b = self.button_mut(button);
                b.down = false;
                b.moved = false;
                b.previous = None;
            }
        }
    }

    fn drain_input(&mut self) {
        let Some(rx) = self.rx.take() else { return };
        loop {
            match rx.try_recv() {
                Ok(event) => self.push_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("pointer input channel closed");
                    return;
                }
            }
        }
        self.rx = Some(rx);
    }
}

impl ForceInjector for PointerForces {
    fn setup(&mut self, flow: Resolution, draw: Resolution) {
        self.forces = self.specs.iter()
            .map(|spec| {
                let res = if spec.full_resolution { draw } else { flow };
                DrawForce { spec: spec.clone(), payload: Payload::for_spec(spec, res), changed: false }
            })
            .collect();
        log::debug!("pointer forces: {} configured", self.forces.len());
    }

    fn update(&mut self, dt: f32) {
        self.drain_input();

        for b in [&mut self.primary, &mut self.secondary] {
            if let (true, Some(prev)) = (b.moved, b.previous) {
                let d = b.position - prev;
                if dt > 0.0 && (d.x != 0.0 || d.y != 0.0) {
                    b.velocity = d * (1.0 / dt);
                }
            }
            if !b.down { b.velocity = Vec2::default(); }
        }

        for force in &mut self.forces {
            let b = match force.spec.button {
                PointerButton::Primary   => self.primary,
                PointerButton::Secondary => self.secondary,
            };
            let fire = b.down && (b.moved || !force.spec.temporary);
            if fire {
                force.render(b.position, b.velocity);
                force.changed = true;
            } else if force.changed {
                force.payload.clear();
                force.changed = false;
            }
        }

        for b in [&mut self.primary, &mut self.secondary] {
            b.previous = if b.down { Some(b.position) } else { None };
            b.moved = false;
        }
    }

    fn force_count(&self) -> usize { self.forces.len() }

    fn did_change(&self, index: usize) -> bool {
        self.forces.get(index).is_some_and(|f| f.changed)
    }

    fn strength(&self, index: usize) -> f32 {
        self.forces.get(index).map_or(0.0, |f| f.spec.strength)
    }

    fn force(&self, index: usize) -> Option<Force<'_>> {
        let f = self.forces.get(index)?;
        Some(match (&f.payload, f.spec.kind) {
            (Payload::Color(c),  _)                      => Force::Density(c),
            (Payload::Vector(v), _)                      => Force::Velocity(v),
            (Payload::Scalar(s), ForceKind::Temperature) => Force::Temperature(s),
            (Payload::Scalar(s), ForceKind::Pressure)    => Force::Pressure(s),
            (Payload::Scalar(s), _)                      => Force::Obstacle(s),
        })
    }

    fn reset(&mut self) {
        for f in &mut self.forces {
            f.payload.clear();
            f.changed = false;
        }
        self.primary   = ButtonState::default();
        self.secondary = ButtonState::default();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
