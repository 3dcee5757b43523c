//! Single-slot handoff between the detector thread and the frame loop
//!
//! The detector may publish from any thread. The frame loop takes whatever
//! is in the slot once per tick. Publishing overwrites: intermediate results
//! the loop never saw are dropped, never queued.

use std::sync::{Arc, Mutex};

use super::frame::LandmarkFrame;

/// What the detector saw on one of its ticks
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Hand(LandmarkFrame),
    /// The detector ran and found no hand
    Absent,
}

impl Detection {
    pub fn frame(&self) -> Option<&LandmarkFrame> {
        match self {
            Detection::Hand(frame) => Some(frame),
            Detection::Absent => None,
        }
    }
}

/// Last-writer-wins slot shared between producer and consumer
#[derive(Debug, Clone, Default)]
pub struct LatestFrameSlot {
    inner: Arc<Mutex<Option<Detection>>>,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a detection, replacing any not yet taken
    pub fn publish(&self, detection: Detection) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(detection);
    }

    /// Drain the slot. `None` means nothing new arrived since the last take.
    pub fn take(&self) -> Option<Detection> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::SyntheticHand;
    use std::thread;

    #[test]
    fn test_latest_wins() {
        let slot = LatestFrameSlot::new();
        slot.publish(Detection::Absent);
        slot.publish(Detection::Hand(SyntheticHand::fist().build()));

        let taken = slot.take().unwrap();
        assert!(taken.frame().is_some());
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_publish_from_other_thread() {
        let slot = LatestFrameSlot::new();
        let producer = slot.clone();

        let handle = thread::spawn(move || {
            for _ in 0..10 {
                producer.publish(Detection::Hand(SyntheticHand::open_palm().build()));
            }
            producer.publish(Detection::Absent);
        });
        handle.join().unwrap();

        assert_eq!(slot.take(), Some(Detection::Absent));
        assert_eq!(slot.take(), None);
    }
}
