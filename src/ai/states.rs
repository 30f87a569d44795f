//! Hunter behaviour states
//!
//! Hunt explores the heat map, Chase pursues a visible player, Search checks
//! the last sighting and scans, Attack commits to one swing, Dead does
//! nothing until the maze is regenerated.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::fsm::{HunterContext, HunterMode, State, Transition};
use super::pathfinding::{PathResult, find_path};
use super::steering::wrap_angle;
use crate::core::HunterEvent;
use crate::maze::Cell;

/// Fraction of the attack-start range chase keeps when closing in on a
/// player inside the same cell
const CLOSE_IN_RATIO: f32 = 0.75;

/// Where to go once the player is out of sight
fn lost_sight(ctx: &HunterContext<'_>) -> Transition {
    if ctx.body.last_known_player.is_some() {
        Transition::to(SearchState::default())
    } else {
        Transition::to(HuntState)
    }
}

// ============================================================================
// Hunt
// ============================================================================

/// Explore toward cells the hunter has not seen for a while.
#[derive(Debug, Default)]
pub struct HuntState;

/// Draw an exploration target from the hottest reachable cells
///
/// Candidates are weighted by `(score / path_length)^k`; when every weight
/// is zero the draw is uniform.
fn choose_hunt_target(ctx: &mut HunterContext<'_>) {
    let world = ctx.world;
    let from = ctx.body.cell;
    let snap_radius = ctx.config.snap_radius;
    let mut candidates: Vec<(Cell, f32, PathResult)> = ctx
        .heat
        .top_cells(ctx.config.hunt_top_k, Some(from))
        .into_iter()
        .filter_map(|(cell, score)| {
            let path = find_path(world.maze(), from, cell, None, snap_radius);
            (!path.is_trivial() && path.goal() == Some(cell)).then_some((cell, score, path))
        })
        .collect();

    if candidates.is_empty() {
        log::debug!("No reachable exploration target from {from}");
        ctx.body.hunt_target = None;
        ctx.body.clear_path();
        return;
    }

    let exponent = ctx.config.hunt_weight_exponent;
    let weights = candidates
        .iter()
        .map(|(_, score, path)| (score / path.steps() as f32).powf(exponent));
    let index = match WeightedIndex::new(weights) {
        Ok(distribution) => distribution.sample(&mut *ctx.rng),
        Err(_) => ctx.rng.random_range(0..candidates.len()),
    };

    let (target, score, path) = candidates.swap_remove(index);
    log::debug!("Hunting toward {target} (score {score:.3}, {} cells)", path.len());
    ctx.events.push(HunterEvent::TargetChosen {
        target,
        score,
        path_length: path.len(),
    });
    ctx.body.hunt_target = Some(target);
    ctx.body.set_path(path);
}

impl State for HuntState {
    fn mode(&self) -> HunterMode {
        HunterMode::Hunt
    }

    fn enter(&mut self, ctx: &mut HunterContext<'_>) {
        ctx.body.hunt_target = None;
        ctx.body.repath_timer = 0.0;
        ctx.body.sprinting = false;
    }

    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition {
        if ctx.perception.line_of_sight {
            return Transition::to(ChaseState);
        }

        ctx.body.repath_timer -= ctx.dt;
        let arrived = ctx.body.hunt_target.is_some() && ctx.body.path_finished();
        if arrived {
            ctx.clear_visible_heat();
        }

        let stuck = ctx.body.is_stuck(ctx.config.stuck_timeout);
        if arrived || stuck || ctx.body.repath_timer <= 0.0 {
            if stuck {
                log::debug!("Hunter stuck at {}, repathing", ctx.body.cell);
            }
            choose_hunt_target(ctx);
            ctx.body.repath_timer = ctx.config.repath_interval;
        }

        ctx.follow_path(ctx.config.walk_speed);
        Transition::None
    }
}

// ============================================================================
// Chase
// ============================================================================

/// Sprint after a visible player and open an attack once in reach.
#[derive(Debug, Default)]
pub struct ChaseState;

impl State for ChaseState {
    fn mode(&self) -> HunterMode {
        HunterMode::Chase
    }

    fn enter(&mut self, ctx: &mut HunterContext<'_>) {
        ctx.body.hunt_target = None;
        if ctx.perception.line_of_sight {
            ctx.body.last_known_player = Some(ctx.perception.player_position);
        }
    }

    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition {
        let perception = ctx.perception;
        if !perception.line_of_sight {
            return lost_sight(ctx);
        }
        ctx.body.last_known_player = Some(perception.player_position);
        let player = Vec2::new(perception.player_position.x, perception.player_position.z);

        if perception.distance <= ctx.config.attack_start_range {
            ctx.body.halt();
            let error = ctx.face(player);
            if error <= ctx.config.attack_alignment_tolerance && ctx.body.attack_cooldown <= 0.0 {
                return Transition::to(AttackState::default());
            }
            return Transition::None;
        }

        let speed = ctx.sprint_speed();
        let path = ctx.path_to(perception.player_cell);
        ctx.body.set_path(path);
        if ctx.body.path.is_trivial() {
            ctx.step_towards(player, speed, ctx.config.attack_start_range * CLOSE_IN_RATIO);
        } else {
            ctx.follow_path(speed);
        }
        ctx.body.sprinting = ctx.body.moving;
        Transition::None
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchPhase {
    /// Walking to the last sighting
    Travel,
    /// Rotating in place, clearing heat as the view sweeps
    Scan { remaining: f32, direction: f32 },
}

/// Go to where the player was last seen and look around.
#[derive(Debug)]
pub struct SearchState {
    phase: SearchPhase,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            phase: SearchPhase::Travel,
        }
    }
}

impl SearchState {
    fn begin_scan(&mut self, ctx: &mut HunterContext<'_>) {
        let direction = if ctx.rng.random::<bool>() { 1.0 } else { -1.0 };
        self.phase = SearchPhase::Scan {
            remaining: ctx.config.scan_total_angle,
            direction,
        };
        ctx.body.halt();
        ctx.body.clear_path();
    }
}

impl State for SearchState {
    fn mode(&self) -> HunterMode {
        HunterMode::Search
    }

    fn enter(&mut self, ctx: &mut HunterContext<'_>) {
        self.phase = SearchPhase::Travel;
        ctx.body.sprinting = false;
        let goal = ctx
            .body
            .last_known_player
            .map_or(ctx.body.cell, |p| ctx.world.world_to_cell(p.x, p.z));
        let path = ctx.path_to(goal);
        ctx.body.set_path(path);
    }

    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition {
        if ctx.perception.line_of_sight {
            return Transition::to(ChaseState);
        }

        match self.phase {
            SearchPhase::Travel => {
                let finished = ctx.follow_path(ctx.config.walk_speed);
                if finished || ctx.body.is_stuck(ctx.config.stuck_timeout) {
                    self.begin_scan(ctx);
                }
                Transition::None
            }
            SearchPhase::Scan { remaining, direction } => {
                let step = (ctx.config.scan_speed * ctx.dt).min(remaining);
                ctx.body.yaw = wrap_angle(ctx.body.yaw + direction * step);
                ctx.clear_visible_heat();

                let remaining = remaining - step;
                if remaining <= 0.0 {
                    ctx.body.last_known_player = None;
                    return Transition::to(HuntState);
                }
                self.phase = SearchPhase::Scan { remaining, direction };
                Transition::None
            }
        }
    }
}

// ============================================================================
// Attack
// ============================================================================

/// One committed swing: the hit resolves once, at the midpoint.
#[derive(Debug, Default)]
pub struct AttackState {
    elapsed: f32,
    hit_applied: bool,
}

impl State for AttackState {
    fn mode(&self) -> HunterMode {
        HunterMode::Attack
    }

    fn enter(&mut self, ctx: &mut HunterContext<'_>) {
        self.elapsed = 0.0;
        self.hit_applied = false;
        ctx.body.halt();
        ctx.body.clear_path();
        ctx.events.push(HunterEvent::AttackStarted);
    }

    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition {
        ctx.body.halt();
        self.elapsed += ctx.dt;

        let duration = ctx.config.attack_duration;
        if !self.hit_applied && self.elapsed >= duration * 0.5 {
            self.hit_applied = true;
            if ctx.perception.in_hit_window(ctx.config) {
                log::info!("Hunter hit the player for {}", ctx.config.attack_damage);
                ctx.events.push(HunterEvent::PlayerHit {
                    damage: ctx.config.attack_damage,
                    position: ctx.body.position,
                });
            } else {
                ctx.events.push(HunterEvent::AttackMissed);
            }
        }

        if self.elapsed < duration {
            return Transition::None;
        }

        ctx.body.attack_cooldown = ctx.config.attack_cooldown;
        if ctx.perception.line_of_sight {
            Transition::to(ChaseState)
        } else {
            lost_sight(ctx)
        }
    }
}

// ============================================================================
// Dead
// ============================================================================

/// Terminal state; only maze regeneration leaves it.
#[derive(Debug, Default)]
pub struct DeadState;

impl State for DeadState {
    fn mode(&self) -> HunterMode {
        HunterMode::Dead
    }

    fn enter(&mut self, ctx: &mut HunterContext<'_>) {
        ctx.body.halt();
        ctx.body.clear_path();
        ctx.body.line_of_sight = false;
    }

    fn update(&mut self, ctx: &mut HunterContext<'_>) -> Transition {
        ctx.body.halt();
        Transition::None
    }
}
