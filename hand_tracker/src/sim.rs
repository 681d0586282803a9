//! Simulated tracker — hands driven by the window instead of a depth camera.
//!
//! The window sends [`SimHandInput`] messages over an `mpsc` channel; the
//! tracker drains them in [`TrackerDevice::update`], exactly where a real
//! device would poll its hardware.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{Receiver, TryRecvError};

use flow_field::{Canvas, Rect, Resolution, Vec2};

use crate::roster::{HandRoster, Observation};
use crate::{
    draw_hand_overlay, DeviceState, HandEventSink, NoSink, Point3, TrackedHand,
    TrackerDevice, TrackerError, TrackerFeature,
};

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimHandInput {
    /// Hand in `slot` is held at `position` (tracker screen space).
    Place { slot: u8, position: Vec2 },
    /// Hand in `slot` was withdrawn.
    Release { slot: u8 },
}

/// Tracker backed by [`SimHandInput`] messages.  Hand ids are `slot + 1`.
pub struct SimTracker {
    rx:       Receiver<SimHandInput>,
    space:    Resolution,
    state:    DeviceState,
    features: BTreeSet<TrackerFeature>,
    held:     BTreeMap<u8, Vec2>,
    roster:   HandRoster,
    sink:     Option<Box<dyn HandEventSink>>,
}

impl SimTracker {
    pub const DEVICE_ID: i32 = 0;

    /// `space` is the screen space hand positions are reported in.
    pub fn new(rx: Receiver<SimHandInput>, space: Resolution) -> Self {
        SimTracker {
            rx,
            space,
            state:    DeviceState::Idle,
            features: BTreeSet::new(),
            held:     BTreeMap::new(),
            roster:   HandRoster::new(Self::DEVICE_ID, 1),
            sink:     None,
        }
    }

    pub fn state(&self) -> DeviceState { self.state }

    pub fn is_enabled(&self, feature: TrackerFeature) -> bool {
        self.features.contains(&feature)
    }

    fn caption(&self) -> String {
        let names: Vec<&str> = self.features.iter().map(|f| f.name()).collect();
        format!("sim tracker - {}", names.join(" "))
    }

    /// Pseudo depth: slot 0 a little nearer than slot 1.
    fn world_for(&self, slot: u8, p: Vec2) -> Point3 {
        let w = self.space.width.max(1) as f32;
        let h = self.space.height.max(1) as f32;
        Point3 {
            x: (p.x / w - 0.5) * 500.0,
            y: (0.5 - p.y / h) * 400.0 + 250.0,
            z: 600.0 + slot as f32 * 50.0,
        }
    }
}

impl TrackerDevice for SimTracker {
    fn setup(&mut self) -> Result<(), TrackerError> {
        if self.state != DeviceState::Idle {
            return Err(TrackerError::InvalidState { action: "set up", state: self.state });
        }
        self.state = DeviceState::SetUp;
        Ok(())
    }

    fn enable(&mut self, feature: TrackerFeature) -> Result<(), TrackerError> {
        if self.state != DeviceState::SetUp {
            return Err(TrackerError::InvalidState { action: "enable features", state: self.state });
        }
        if feature == TrackerFeature::HandFocusGestures && !self.is_enabled(TrackerFeature::Hands) {
            return Err(TrackerError::MissingFeature { feature, requires: TrackerFeature::Hands });
        }
        self.features.insert(feature);
        Ok(())
    }

    fn set_max_hands(&mut self, max: usize) { self.roster.set_max_hands(max); }

    fn set_event_sink(&mut self, sink: Box<dyn HandEventSink>) { self.sink = Some(sink); }

    fn start(&mut self) -> Result<(), TrackerError> {
        if self.state != DeviceState::SetUp {
            return Err(TrackerError::InvalidState { action: "start", state: self.state });
        }
        self.state = DeviceState::Running;
        log::debug!("sim tracker started ({})", self.caption());
        Ok(())
    }

    fn update(&mut self) {
        if self.state != DeviceState::Running { return; }

        loop {
            match self.rx.try_recv() {
                Ok(SimHandInput::Place { slot, position }) => { self.held.insert(slot, position); }
                Ok(SimHandInput::Release { slot })         => { self.held.remove(&slot); }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        let observed: Vec<Observation> = if self.is_enabled(TrackerFeature::Hands) {
            self.held.iter()
                .map(|(&slot, &position)| Observation {
                    id: slot as i32 + 1,
                    position,
                    world: self.world_for(slot, position),
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut none = NoSink;
        let sink: &mut dyn HandEventSink = match self.sink.as_deref_mut() {
            Some(s) => s,
            None    => &mut none,
        };
        self.roster.observe(&observed, sink);
    }

    fn hand_count(&self) -> usize { self.roster.len() }

    fn hand(&self, index: usize) -> Option<&TrackedHand> { self.roster.get(index) }

    fn draw_debug(&self, canvas: &mut Canvas, rect: Rect) {
        draw_hand_overlay(canvas, rect, self.space, &self.caption(), self.roster.hands());
    }

    fn stop(&mut self) {
        if self.state != DeviceState::Running { return; }
        let mut none = NoSink;
        let sink: &mut dyn HandEventSink = match self.sink.as_deref_mut() {
            Some(s) => s,
            None    => &mut none,
        };
        self.roster.clear(sink);
        self.state = DeviceState::Stopped;
        log::debug!("sim tracker stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
