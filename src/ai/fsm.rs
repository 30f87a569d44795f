//! Finite State Machine for the hunter
//!
//! Each behaviour mode is a state object with an enter/update/exit lifecycle.
//! States read the tick's perception and drive the shared [`HunterBody`]
//! through a [`HunterContext`]; they decide their own transitions.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateMachine::new(HuntState::default());
//! let mut ctx = HunterContext { /* world, body, heat, ... */ };
//! fsm.update(&mut ctx); // May transition to ChaseState
//! assert_eq!(fsm.mode(), HunterMode::Chase);
//! ```

use std::fmt;

use glam::Vec2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::body::HunterBody;
use super::heat::HeatMap;
use super::pathfinding::{PathResult, find_path};
use super::perception::Perception;
use super::steering::forward;
use crate::core::{EventQueue, HunterConfig, HunterEvent};
use crate::maze::{Cell, MazeWorld};

// ============================================================================
// Modes
// ============================================================================

/// Behaviour mode of the hunter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HunterMode {
    /// Exploring toward stale cells of the heat map
    Hunt,
    /// Pursuing a visible player
    Chase,
    /// Checking the last place the player was seen
    Search,
    /// Committed to a melee swing
    Attack,
    /// Terminal until the maze regenerates
    Dead,
}

impl HunterMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hunt => "hunt",
            Self::Chase => "chase",
            Self::Search => "search",
            Self::Attack => "attack",
            Self::Dead => "dead",
        }
    }
}

impl fmt::Display for HunterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Context
// ============================================================================

/// Everything a state may read or touch during one tick
pub struct HunterContext<'a> {
    pub world: &'a dyn MazeWorld,
    pub config: &'a HunterConfig,
    pub body: &'a mut HunterBody,
    pub heat: &'a mut HeatMap,
    pub rng: &'a mut StdRng,
    pub events: &'a mut EventQueue,
    /// The player as sensed at the start of this tick
    pub perception: Perception,
    pub dt: f32,
}

impl HunterContext<'_> {
    /// Shortest path from the body's cell to `goal`
    ///
    /// Falls back to staying in place when the goal cannot be snapped onto
    /// the grid.
    #[must_use]
    pub fn path_to(&self, goal: Cell) -> PathResult {
        find_path(
            self.world.maze(),
            self.body.cell,
            goal,
            Some(self.body.cell),
            self.config.snap_radius,
        )
    }

    #[must_use]
    pub fn sprint_speed(&self) -> f32 {
        self.config.walk_speed * self.config.sprint_multiplier
    }

    /// Advance along the active path; returns true once it is exhausted
    pub fn follow_path(&mut self, speed: f32) -> bool {
        self.body.follow_path(
            self.world,
            speed,
            self.config.turn_speed,
            self.config.waypoint_tolerance,
            self.dt,
        )
    }

    /// Walk directly toward a point
    pub fn step_towards(&mut self, target: Vec2, speed: f32, stop_radius: f32) {
        self.body
            .step_towards(self.world, target, speed, self.config.turn_speed, stop_radius, self.dt);
    }

    /// Turn in place toward a point; returns the remaining yaw error
    pub fn face(&mut self, target: Vec2) -> f32 {
        self.body.face(target, self.config.turn_speed, self.dt)
    }

    /// Mark everything in front of the hunter as just seen
    pub fn clear_visible_heat(&mut self) -> usize {
        self.heat
            .clear_visible(self.body.cell, forward(self.body.yaw), self.world.visibility_map())
    }
}

// ============================================================================
// State Trait
// ============================================================================

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when entering this state
/// 2. `update()` - Called each tick while in this state
/// 3. `exit()` - Called once when leaving this state
pub trait State: fmt::Debug {
    /// Mode reported while this state is active.
    fn mode(&self) -> HunterMode;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut HunterContext<'_>) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to indicate whether to stay or change states.
    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut HunterContext<'_>) {}
}

// ============================================================================
// Transition
// ============================================================================

/// Represents a state transition decision.
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(Box<dyn State>),
}

impl Transition {
    /// Create a transition to a new state.
    pub fn to<S: State + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.mode()),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Owns the active state and runs its lifecycle.
pub struct StateMachine {
    /// Current active state
    current: Box<dyn State>,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl StateMachine {
    /// Create a new state machine with an initial state.
    ///
    /// The initial state's `enter()` will be called on the first `update()`.
    pub fn new<S: State + 'static>(initial: S) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
        }
    }

    /// Update the state machine.
    ///
    /// Calls `enter()` on first update, then `update()` each tick. A
    /// transition exits the old state, enters the new one and records a
    /// [`HunterEvent::ModeChanged`]. Returns true when the mode changed.
    pub fn update(&mut self, ctx: &mut HunterContext<'_>) -> bool {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        match self.current.update(ctx) {
            Transition::None => false,
            Transition::To(new_state) => {
                self.swap(ctx, new_state);
                true
            }
        }
    }

    /// Replace the current state without running any hooks.
    ///
    /// The new state's `enter()` runs on the next `update()`. Used for death
    /// and respawn, which happen outside a tick.
    pub fn reset<S: State + 'static>(&mut self, state: S) {
        self.current = Box::new(state);
        self.entered = false;
    }

    fn swap(&mut self, ctx: &mut HunterContext<'_>, mut new_state: Box<dyn State>) {
        let from = self.current.mode();
        if self.entered {
            self.current.exit(ctx);
        }
        new_state.enter(ctx);
        let to = new_state.mode();
        self.current = new_state;
        self.entered = true;

        log::debug!("Hunter mode {from} -> {to}");
        ctx.events.push(HunterEvent::ModeChanged { from, to });
    }

    /// Mode of the current state.
    #[must_use]
    pub fn mode(&self) -> HunterMode {
        self.current.mode()
    }

    /// Check if the FSM is in the given mode.
    #[must_use]
    pub fn is_in_mode(&self, mode: HunterMode) -> bool {
        self.current.mode() == mode
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.mode())
            .field("entered", &self.entered)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
