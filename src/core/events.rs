//! Hunter event queue
//!
//! The agent pushes events while it ticks and the host drains them once the
//! tick returns. This replaces callbacks into audio/UI code: the host decides
//! what a `PlayerHit` sounds like.

use std::collections::VecDeque;

use glam::Vec3;

use crate::ai::HunterMode;
use crate::maze::Cell;

// ============================================================================
// Event Types
// ============================================================================

/// Things the hunter did or suffered during a tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HunterEvent {
    /// The behaviour mode changed.
    ModeChanged {
        from: HunterMode,
        to: HunterMode,
    },

    /// A new exploration target was drawn.
    TargetChosen {
        target: Cell,
        /// Heat score of the target when it was drawn
        score: f32,
        path_length: usize,
    },

    /// An attack started.
    AttackStarted,

    /// The attack landed on the player at its midpoint.
    PlayerHit {
        damage: f32,
        /// Hunter position at the moment of the hit
        position: Vec3,
    },

    /// The attack midpoint passed without a valid hit.
    AttackMissed,

    /// The hunter took damage.
    HunterDamaged {
        amount: f32,
        source: String,
        remaining: f32,
    },

    /// Health reached zero.
    HunterDied {
        source: String,
    },

    /// The agent was respawned after maze regeneration.
    Respawned {
        cell: Cell,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// FIFO of events produced during the current tick.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<HunterEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    #[inline]
    pub fn push(&mut self, event: HunterEvent) {
        log::trace!("event: {event:?}");
        self.events.push_back(event);
    }

    /// Iterate without consuming.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &HunterEvent> {
        self.events.iter()
    }

    /// Take every queued event in order.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = HunterEvent> + '_ {
        self.events.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(HunterEvent::AttackStarted);
        queue.push(HunterEvent::AttackMissed);

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events, vec![HunterEvent::AttackStarted, HunterEvent::AttackMissed]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_queue_clear() {
        let mut queue = EventQueue::new();
        queue.push(HunterEvent::ModeChanged {
            from: HunterMode::Hunt,
            to: HunterMode::Chase,
        });
        assert_eq!(queue.len(), 1);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_player_hit_event() {
        let event = HunterEvent::PlayerHit {
            damage: 25.0,
            position: Vec3::new(1.0, 0.0, 3.0),
        };

        if let HunterEvent::PlayerHit { damage, position } = event {
            assert!((damage - 25.0).abs() < f32::EPSILON);
            assert_eq!(position, Vec3::new(1.0, 0.0, 3.0));
        } else {
            panic!("Wrong event type");
        }
    }
}
