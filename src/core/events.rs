//! Event Queue System for Decoupled Communication
//!
//! This module provides a type-safe, double-buffered event queue that enables
//! loose coupling between gameplay systems. Events are written during one frame
//! and processed in the next, ensuring consistent behavior.
//!
//! # Design Principles
//!
//! - **Type Safety**: All events are strongly typed via the `GameEvent` enum
//! - **Double Buffering**: Events are frame-consistent (no mid-frame mutations)
//! - **Zero Allocation**: Uses pre-allocated `VecDeque` with reuse
//! - **Simplicity**: No complex pub/sub - just push and iterate
//!
//! # Example
//!
//! ```ignore
//! // In the enemy update
//! events.push(GameEvent::ModeChanged {
//!     enemy,
//!     chasing: true,
//!     last_known: Some(player_position),
//! });
//!
//! // In the host, one frame later
//! for event in events.iter() {
//!     if let GameEvent::PlayerCaught { .. } = event {
//!         show_fail_screen();
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;

use crate::ai::navigator::PathRequestId;
use crate::ai::sound::{MusicCue, SoundCue};

// ============================================================================
// Event Types
// ============================================================================

/// Game events for inter-system communication.
///
/// Events represent things that happened in the game world. They flow from
/// producers (gameplay systems) to consumers (audio, UI, host shell) without
/// direct coupling.
///
/// # Extensibility
///
/// The `#[non_exhaustive]` attribute allows adding new variants without
/// breaking downstream code that uses wildcard patterns.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Enemy Events
    // -------------------------------------------------------------------------
    /// The enemy switched between patrolling and chasing.
    ModeChanged {
        /// The enemy whose mode flipped
        enemy: Entity,
        /// True when entering the chase, false when giving up
        chasing: bool,
        /// Last observed player position, present while chasing
        last_known: Option<Vec2>,
    },

    /// A pathfinding request completed and its route was adopted.
    PathAssigned {
        /// The enemy now following the route
        enemy: Entity,
        /// Id of the request that produced the route
        request: PathRequestId,
        /// Number of waypoints in the route
        waypoints: usize,
    },

    /// The enemy made physical contact with the player. Terminal.
    PlayerCaught {
        /// The enemy that made contact
        enemy: Entity,
        /// The player that was caught
        player: Entity,
    },

    // -------------------------------------------------------------------------
    // Audio Events
    // -------------------------------------------------------------------------
    /// The enemy's ambient sound scheduler fired a clip.
    SoundPlayed {
        /// The enemy that produced the sound
        enemy: Entity,
        /// Band, volume, and pitch of the clip
        cue: SoundCue,
    },

    /// The background music layer changed.
    MusicChanged {
        /// The layer now playing
        cue: MusicCue,
    },

    // -------------------------------------------------------------------------
    // Player Events
    // -------------------------------------------------------------------------
    /// The player picked up the exit key.
    KeyPickedUp {
        /// The player holding the key
        player: Entity,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during frame N are available for reading during frame N+1.
/// This prevents issues where event order depends on system update order.
///
/// # Example
///
/// ```ignore
/// let mut queue = EventQueue::new();
///
/// // Frame N: Push events
/// queue.push(GameEvent::MusicChanged { cue: MusicCue::Tense });
///
/// // Frame N+1: Process events (after swap)
/// queue.swap();
/// for event in queue.iter() {
///     handle_event(event);
/// }
/// ```
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<GameEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    ///
    /// Events are not immediately visible to iterators. Call `swap()`
    /// at the frame boundary to make them available.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call this once per frame, typically at the start of the update loop.
    /// After swapping:
    /// - `iter()` returns events from the previous frame
    /// - `push()` writes to the new pending queue
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame.
    ///
    /// Similar to `iter()` but takes ownership of the events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pending for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    ///
    /// Useful for scene transitions or resetting game state.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
