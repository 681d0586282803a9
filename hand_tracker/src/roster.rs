//! Hand roster — turns per-frame hand observations into a stable tracked list
//! plus `Appeared` / `Updated` / `Lost` events.

use flow_field::Vec2;

use crate::{HandEvent, HandEventSink, HandStatus, Point3, TrackedHand};

/// One hand as reported by the device this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub id:       i32,
    pub position: Vec2,
    pub world:    Point3,
}

/// The list of currently tracked hands for one device.
#[derive(Debug)]
pub struct HandRoster {
    hands:     Vec<TrackedHand>,
    max_hands: usize,
    device_id: i32,
}

impl HandRoster {
    pub fn new(device_id: i32, max_hands: usize) -> Self {
        HandRoster { hands: Vec::new(), max_hands, device_id }
    }

    pub fn set_max_hands(&mut self, max: usize) { self.max_hands = max; }
    pub fn max_hands(&self) -> usize { self.max_hands }

    pub fn hands(&self) -> &[TrackedHand] { &self.hands }
    pub fn len(&self) -> usize { self.hands.len() }
    pub fn is_empty(&self) -> bool { self.hands.is_empty() }
    pub fn get(&self, index: usize) -> Option<&TrackedHand> { self.hands.get(index) }

    /// Reconcile with this frame's observations.
    ///
    /// Hands no longer observed are dropped first (`Lost`), then known ids are
    /// refreshed (`Updated`) and new ids admitted in arrival order while the
    /// cap allows (`Appeared`).  Observations beyond the cap are ignored.
    pub fn observe(&mut self, observed: &[Observation], sink: &mut dyn HandEventSink) {
        let device_id = self.device_id;

        let mut lost = Vec::new();
        self.hands.retain(|h| {
            let keep = observed.iter().any(|o| o.id == h.id);
            if !keep { lost.push(h.id); }
            keep
        });
        for hand_id in lost {
            sink.on_hand_event(HandEvent { status: HandStatus::Lost, hand_id, device_id });
        }

        for obs in observed {
            if let Some(hand) = self.hands.iter_mut().find(|h| h.id == obs.id) {
                hand.position = obs.position;
                hand.world    = obs.world;
                hand.status   = HandStatus::Updated;
                sink.on_hand_event(HandEvent {
                    status: HandStatus::Updated, hand_id: obs.id, device_id,
                });
            } else if self.hands.len() < self.max_hands {
                self.hands.push(TrackedHand {
                    id:       obs.id,
                    position: obs.position,
                    world:    obs.world,
                    status:   HandStatus::Appeared,
                });
                sink.on_hand_event(HandEvent {
                    status: HandStatus::Appeared, hand_id: obs.id, device_id,
                });
            }
        }
    }

    /// Drop every hand, reporting each as `Lost`.
    pub fn clear(&mut self, sink: &mut dyn HandEventSink) {
        let device_id = self.device_id;
        for hand in self.hands.drain(..) {
            sink.on_hand_event(HandEvent { status: HandStatus::Lost, hand_id: hand.id, device_id });
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
