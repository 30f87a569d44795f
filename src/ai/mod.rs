//! AI and navigation module
//!
//! Provides pathfinding, the exploration heat map, steering, the behaviour
//! state machine and the hunter agent built from them.

mod body;
mod fsm;
mod heat;
mod hunter;
mod pathfinding;
mod perception;
mod states;
mod steering;

pub use body::HunterBody;
pub use fsm::{HunterContext, HunterMode, State, StateMachine, Transition};
pub use heat::HeatMap;
pub use hunter::{
    AgentSnapshot, AnimationRole, DamageOutcome, HunterAgent, PlayerCollisionQuery,
    PlayerCollisionResult, RayQuery, TickInput, TickOutcome,
};
pub use pathfinding::{PathResult, find_path};
pub use perception::Perception;
pub use states::{AttackState, ChaseState, DeadState, HuntState, SearchState};
pub use steering::{
    Arrive, Face, SteeringBehavior, SteeringOutput, angle_delta, forward, turn_towards, wrap_angle,
    yaw_of,
};
