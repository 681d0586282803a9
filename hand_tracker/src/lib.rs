//! # hand_tracker
//!
//! The depth/hand tracker as the frame loop sees it: a device that is set up
//! once, has features switched on, is advanced once per tick, and exposes the
//! hands it currently tracks.
//!
//! Lifecycle notifications ([`HandEvent`]) are pushed into a single
//! [`HandEventSink`] registered before `start`.  Delivery is synchronous,
//! from inside [`TrackerDevice::update`], so no thread ever calls back into
//! the consumer.
//!
//! ## Backends
//!
//! * [`SimTracker`] — **Simulation mode**: hands follow the pointer while a
//!   key is held.  Always available.
//! * `LeapTracker` — **Hardware mode** (`--features leap`): polls a real
//!   LeapMotion controller via LeapC.

use std::fmt;

use flow_field::{BlendMode, Canvas, Rect, Resolution, Rgba, Vec2};

pub mod roster;
pub mod sim;
#[cfg(feature = "leap")]
pub mod leap;

pub use roster::{HandRoster, Observation};
pub use sim::{SimHandInput, SimTracker};
#[cfg(feature = "leap")]
pub use leap::LeapTracker;

// ════════════════════════════════════════════════════════════════════════════
// Hands and lifecycle events
// ════════════════════════════════════════════════════════════════════════════

/// Where a tracked hand is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandStatus {
    /// First observed this update.
    Appeared,
    /// Observed again.
    Updated,
    /// No longer observed; the hand has been dropped from the list.
    Lost,
}

impl fmt::Display for HandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandStatus::Appeared => "hand tracking started",
            HandStatus::Updated  => "hand tracking updated",
            HandStatus::Lost     => "hand tracking stopped",
        })
    }
}

/// Real-world palm position, millimetres in device space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A hand the device is currently following.  Owned by the tracker; the
/// frame loop only borrows it for the duration of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedHand {
    pub id:       i32,
    /// Projected position in the tracker's screen space.
    pub position: Vec2,
    pub world:    Point3,
    pub status:   HandStatus,
}

/// Notification pushed to the [`HandEventSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandEvent {
    pub status:    HandStatus,
    pub hand_id:   i32,
    pub device_id: i32,
}

impl fmt::Display for HandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for hand {} from device {}", self.status, self.hand_id, self.device_id)
    }
}

/// Receiver of hand lifecycle events.
pub trait HandEventSink {
    fn on_hand_event(&mut self, event: HandEvent);
}

impl<F: FnMut(HandEvent)> HandEventSink for F {
    fn on_hand_event(&mut self, event: HandEvent) { self(event) }
}

/// Sink that writes every event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogHandEvents;

impl LogHandEvents {
    /// Updates arrive every tick, so they go to `debug`.
    pub fn level(status: HandStatus) -> log::Level {
        match status {
            HandStatus::Updated => log::Level::Debug,
            _                   => log::Level::Info,
        }
    }
}

impl HandEventSink for LogHandEvents {
    fn on_hand_event(&mut self, event: HandEvent) {
        log::log!(Self::level(event.status), "{event}");
    }
}

/// Sink used until a real one is registered.
pub(crate) struct NoSink;

impl HandEventSink for NoSink {
    fn on_hand_event(&mut self, _event: HandEvent) {}
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerDevice
// ════════════════════════════════════════════════════════════════════════════

/// Optional capabilities switched on between `setup` and `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackerFeature {
    /// Depth image generator.
    Depth,
    /// Align depth with the color image.
    Registration,
    /// Mirror the device image horizontally.
    Mirror,
    /// Hand tracking.  Without it the hand list stays empty.
    Hands,
    /// The focus gestures that acquire a new hand.  Requires [`Self::Hands`].
    HandFocusGestures,
}

impl TrackerFeature {
    pub fn name(self) -> &'static str {
        match self {
            TrackerFeature::Depth             => "depth",
            TrackerFeature::Registration      => "registration",
            TrackerFeature::Mirror            => "mirror",
            TrackerFeature::Hands             => "hands",
            TrackerFeature::HandFocusGestures => "focus gestures",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("cannot {action} while the tracker is {state}")]
    InvalidState { action: &'static str, state: DeviceState },

    #[error("{feature:?} requires {requires:?} to be enabled first")]
    MissingFeature { feature: TrackerFeature, requires: TrackerFeature },
}

/// Device lifecycle: `Idle → SetUp → Running → Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState { Idle, SetUp, Running, Stopped }

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceState::Idle    => "idle",
            DeviceState::SetUp   => "set up",
            DeviceState::Running => "running",
            DeviceState::Stopped => "stopped",
        })
    }
}

/// A depth/hand tracking device.
///
/// Call order: `setup`, any number of `enable` / `set_max_hands` /
/// `set_event_sink`, `start`, then `update` once per tick, `stop` at exit.
pub trait TrackerDevice {
    fn setup(&mut self) -> Result<(), TrackerError>;

    fn enable(&mut self, feature: TrackerFeature) -> Result<(), TrackerError>;

    /// Cap on simultaneously tracked hands.
    fn set_max_hands(&mut self, max: usize);

    fn set_event_sink(&mut self, sink: Box<dyn HandEventSink>);

    fn start(&mut self) -> Result<(), TrackerError>;

    /// Poll the device, refresh the hand list and deliver lifecycle events.
    fn update(&mut self);

    fn hand_count(&self) -> usize;

    fn hand(&self, index: usize) -> Option<&TrackedHand>;

    /// Raw debug overlay: device frame plus a marker per hand.
    fn draw_debug(&self, canvas: &mut Canvas, rect: Rect);

    fn stop(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Shared debug overlay
// ════════════════════════════════════════════════════════════════════════════

const OVERLAY_COLOR: Rgba = Rgba::new(0.3, 1.0, 0.6, 1.0);

/// Outline, a caption and a labelled cross per hand, mapped from the tracker's
/// `space` into `rect`.
pub fn draw_hand_overlay(
    canvas:  &mut Canvas,
    rect:    Rect,
    space:   Resolution,
    caption: &str,
    hands:   &[TrackedHand],
) {
    canvas.stroke_rect(rect, OVERLAY_COLOR);
    canvas.draw_text(caption, rect.x + 6, rect.y + 6, OVERLAY_COLOR);

    let sx = rect.w as f32 / space.width.max(1) as f32;
    let sy = rect.h as f32 / space.height.max(1) as f32;
    for hand in hands {
        let x = rect.x + (hand.position.x * sx) as i32;
        let y = rect.y + (hand.position.y * sy) as i32;
        canvas.draw_cross(x, y, 8, OVERLAY_COLOR);
        canvas.fill_circle(x as f32, y as f32, 3.0, OVERLAY_COLOR, BlendMode::Disabled);
        canvas.draw_text(&format!("#{}", hand.id), x + 10, y - 10, OVERLAY_COLOR);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
