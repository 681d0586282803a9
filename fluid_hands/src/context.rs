//! Per-tick state handed to every update and draw call.

use std::time::Instant;

use flow_field::Resolution;

// ════════════════════════════════════════════════════════════════════════════
// Clock
// ════════════════════════════════════════════════════════════════════════════

/// Monotonic-ish time source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Seconds since construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self { SystemClock { start: Instant::now() } }
}

impl Default for SystemClock {
    fn default() -> Self { SystemClock::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 { self.start.elapsed().as_secs_f64() }
}

// ════════════════════════════════════════════════════════════════════════════
// Resolutions
// ════════════════════════════════════════════════════════════════════════════

/// The four working resolutions, fixed at setup.
///
/// ```rust
/// use flow_field::Resolution;
/// use fluid_hands::context::Resolutions;
///
/// let r = Resolutions::derive(Resolution::new(1280, 720), 8, 4, Resolution::new(640, 480));
/// assert_eq!(r.flow,  Resolution::new(160, 90));
/// assert_eq!(r.field, Resolution::new(40, 22));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolutions {
    /// Window / composited output.
    pub draw:   Resolution,
    /// Optical flow, fluid and particles.
    pub flow:   Resolution,
    /// Diagnostic field views.
    pub field:  Resolution,
    /// Camera grabber and its buffer.
    pub camera: Resolution,
}

impl Resolutions {
    pub fn derive(draw: Resolution, flow_divisor: usize, field_divisor: usize, camera: Resolution) -> Self {
        let flow = draw.divided(flow_divisor);
        Resolutions { draw, flow, field: flow.divided(field_divisor), camera }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameContext
// ════════════════════════════════════════════════════════════════════════════

/// Timing for the current tick plus the fixed resolutions.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    /// Seconds since the previous tick; never negative.
    pub delta_time: f32,
    /// Clock reading taken at the start of this tick.
    pub last_time:  f64,
    /// Ticks completed so far.
    pub frame:      u64,
    pub res:        Resolutions,
}

impl FrameContext {
    /// Context at setup: `last_time` seeded from a single clock reading.
    pub fn new(res: Resolutions, now: f64) -> Self {
        FrameContext { delta_time: 0.0, last_time: now, frame: 0, res }
    }

    /// Fold one clock reading into the context.  A reading older than the
    /// last one yields a zero step.
    pub fn advance(&mut self, now: f64) -> f32 {
        self.delta_time = (now - self.last_time).max(0.0) as f32;
        self.last_time = now;
        self.frame += 1;
        self.delta_time
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
