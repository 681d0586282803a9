//! LeapMotion tracker (feature = "leap").
//!
//! Requires the LeapC shared library installed on the system.  Each
//! [`TrackerDevice::update`] drains whatever tracking frames LeapC has queued
//! and keeps the newest one; palm positions are projected from device
//! millimetres into the tracker's screen space.

use std::collections::BTreeSet;

use flow_field::{Canvas, Rect, Resolution, Vec2};
use leaprs::{Connection, ConnectionConfig, Event};

use crate::roster::{HandRoster, Observation};
use crate::{
    draw_hand_overlay, DeviceState, HandEventSink, NoSink, Point3, TrackedHand,
    TrackerDevice, TrackerError, TrackerFeature,
};

/// Interaction box mapped onto the screen (mm).
const BOX_X:     (f32, f32) = (-250.0, 250.0);
const BOX_Y:     (f32, f32) = (80.0, 480.0);
/// Upper bound on messages drained per update.
const MAX_POLLS: usize = 32;

pub struct LeapTracker {
    connection: Option<Connection>,
    space:      Resolution,
    state:      DeviceState,
    features:   BTreeSet<TrackerFeature>,
    roster:     HandRoster,
    sink:       Option<Box<dyn HandEventSink>>,
}

impl LeapTracker {
    pub const DEVICE_ID: i32 = 0;

    pub fn new(space: Resolution) -> Self {
        LeapTracker {
            connection: None,
            space,
            state:      DeviceState::Idle,
            features:   BTreeSet::new(),
            roster:     HandRoster::new(Self::DEVICE_ID, 2),
            sink:       None,
        }
    }

    fn project(&self, p: Point3) -> Vec2 {
        let mut u = (p.x - BOX_X.0) / (BOX_X.1 - BOX_X.0);
        let v = 1.0 - (p.y - BOX_Y.0) / (BOX_Y.1 - BOX_Y.0);
        if self.features.contains(&TrackerFeature::Mirror) { u = 1.0 - u; }
        Vec2::new(
            u.clamp(0.0, 1.0) * self.space.width as f32,
            v.clamp(0.0, 1.0) * self.space.height as f32,
        )
    }
}

impl TrackerDevice for LeapTracker {
    fn setup(&mut self) -> Result<(), TrackerError> {
        if self.state != DeviceState::Idle {
            return Err(TrackerError::InvalidState { action: "set up", state: self.state });
        }
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackerError::DeviceUnavailable(format!("create LeapC connection: {e:?}")))?;
        connection.open()
            .map_err(|e| TrackerError::DeviceUnavailable(format!("open LeapMotion device: {e:?}")))?;
        self.connection = Some(connection);
        self.state = DeviceState::SetUp;
        Ok(())
    }

    fn enable(&mut self, feature: TrackerFeature) -> Result<(), TrackerError> {
        if self.state != DeviceState::SetUp {
            return Err(TrackerError::InvalidState { action: "enable features", state: self.state });
        }
        if feature == TrackerFeature::HandFocusGestures
            && !self.features.contains(&TrackerFeature::Hands)
        {
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
        log::info!("LeapMotion tracker started");
        Ok(())
    }

    fn update(&mut self) {
        if self.state != DeviceState::Running { return; }
        let hands_on = self.features.contains(&TrackerFeature::Hands);
        let Some(connection) = self.connection.as_mut() else { return };

        // Keep only the newest tracking frame.
        let mut latest: Option<Vec<(i32, Point3)>> = None;
        for _ in 0..MAX_POLLS {
            let msg = match connection.poll(0) {
                Ok(m)  => m,
                Err(_) => break,
            };
            if let Event::Tracking(frame) = msg.event() {
                latest = Some(
                    frame.hands()
                        .map(|h| {
                            let p = h.palm().position();
                            (h.id() as i32, Point3 { x: p.x, y: p.y, z: p.z })
                        })
                        .collect(),
                );
            }
        }
        let Some(raw) = latest else { return };

        let observed: Vec<Observation> = if hands_on {
            raw.into_iter()
                .map(|(id, world)| Observation { id, position: self.project(world), world })
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
        draw_hand_overlay(canvas, rect, self.space, "leap motion", self.roster.hands());
    }

    fn stop(&mut self) {
        if self.state != DeviceState::Running { return; }
        let mut none = NoSink;
        let sink: &mut dyn HandEventSink = match self.sink.as_deref_mut() {
            Some(s) => s,
            None    => &mut none,
        };
        self.roster.clear(sink);
        self.connection = None;
        self.state = DeviceState::Stopped;
        log::info!("LeapMotion tracker stopped");
    }
}
