//! The hunter agent
//!
//! Owns the world it hunts in, its heat map, its state machine and its
//! random source. The host drives it once per frame with [`HunterAgent::update`]
//! and reads back a plain [`AgentSnapshot`]; everything the hunter does that
//! the host may want to react to lands in the event queue.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use super::body::HunterBody;
use super::fsm::{HunterContext, HunterMode, StateMachine};
use super::heat::HeatMap;
use super::perception::Perception;
use super::states::{DeadState, HuntState};
use super::steering::{forward, wrap_angle, yaw_of};
use crate::core::{EventQueue, HunterEvent, SimConfig};
use crate::maze::{Cell, CollisionOptions, MazeWorld};
use crate::physics::{Capsule, RayHit, raycast_capsule, resolve_capsule_pair};

/// Host input for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// False while menus or transitions are up
    pub game_active: bool,
    /// True once the player has escaped
    pub has_won: bool,
    /// Resolved player position from the previous collision pass
    pub player_position: Vec3,
}

impl TickInput {
    /// Input for a running game
    #[must_use]
    pub fn active(player_position: Vec3) -> Self {
        Self {
            game_active: true,
            has_won: false,
            player_position,
        }
    }
}

/// What a tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub mode: HunterMode,
    pub mode_changed: bool,
    /// Damage dealt to the player this tick
    pub player_damage: f32,
}

/// Animation the renderer should be playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnimationRole {
    Idle,
    Walk,
    Run,
    Attack,
    Death,
}

/// Read-only view of the agent for rendering and debugging
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub position: Vec3,
    pub yaw: f32,
    pub cell: Cell,
    pub mode: HunterMode,
    pub path: Vec<Cell>,
    pub path_index: usize,
    pub health: f32,
    pub max_health: f32,
    pub line_of_sight: bool,
    pub moving: bool,
    pub sprinting: bool,
    pub animation: AnimationRole,
    pub hunt_target: Option<Cell>,
    pub last_known_player: Option<Vec3>,
    pub load_failed: bool,
}

/// Result of [`HunterAgent::apply_damage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Whether any damage was taken
    pub applied: bool,
    pub damage_applied: f32,
    /// Whether the hunter is dead after the call
    pub dead: bool,
    /// Whether this call killed it
    pub died_now: bool,
}

/// Player capsule to separate from the hunter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerCollisionQuery {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    /// Height of the player capsule; non-positive uses the configured height
    pub height_offset: f32,
}

/// Resolved player position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerCollisionResult {
    pub x: f32,
    pub z: f32,
    /// Whether the capsules overlapped before resolution
    pub colliding: bool,
}

/// Hit-scan ray against the hunter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

/// Yaw facing the first open neighbour of `cell`
fn spawn_yaw(world: &dyn MazeWorld, cell: Cell) -> f32 {
    world.maze().neighbors(cell).first().map_or(0.0, |next| {
        let step = Vec2::new((next.col - cell.col) as f32, (next.row - cell.row) as f32);
        yaw_of(step, 0.0)
    })
}

/// A hunter roaming a maze
#[derive(Debug)]
pub struct HunterAgent<W: MazeWorld> {
    world: W,
    config: SimConfig,
    body: HunterBody,
    heat: HeatMap,
    fsm: StateMachine,
    rng: StdRng,
    events: EventQueue,
    load_failed: bool,
}

impl<W: MazeWorld> HunterAgent<W> {
    /// Spawn a hunter at the exit of `world`, seeding its random source from the config
    pub fn new(world: W, config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(world, config, rng)
    }

    /// Spawn a hunter with an explicit random source
    pub fn with_rng(world: W, config: SimConfig, rng: StdRng) -> Self {
        let collision = CollisionOptions::new(config.hunter.radius, config.hunter.height)
            .with_base_y(config.collision.ground_clearance)
            .with_max_iterations(config.collision.max_iterations);
        let exit = world.exit_cell();
        let body = HunterBody::new(&world, exit, 0.0, config.hunter.max_health, collision);
        let heat = HeatMap::new(&config.heat, world.maze());

        let mut agent = Self {
            world,
            config,
            body,
            heat,
            fsm: StateMachine::new(HuntState),
            rng,
            events: EventQueue::new(),
            load_failed: false,
        };
        if let Err(err) = agent.config.validate() {
            log::warn!("Hunter disabled: {err}");
            agent.load_failed = true;
        }
        agent.respawn();
        agent
    }

    /// Put the hunter back at the exit with full health and a fresh heat map
    fn respawn(&mut self) {
        let exit = self.world.exit_cell();
        let cell = self
            .world
            .maze()
            .nearest_walkable(exit, self.config.hunter.snap_radius)
            .unwrap_or(exit);
        let yaw = spawn_yaw(&self.world, cell);
        let collision = *self.body.collision();

        self.heat.reseed(self.world.maze());
        self.body = HunterBody::new(&self.world, cell, yaw, self.config.hunter.max_health, collision);
        self.fsm.reset(HuntState);
        self.heat
            .clear_visible(cell, forward(yaw), self.world.visibility_map());

        log::info!("Hunter spawned at {cell}");
        self.events.push(HunterEvent::Respawned { cell });
    }

    /// Re-read the world after the host replaced its maze
    pub fn on_maze_regenerated(&mut self) {
        self.respawn();
    }

    /// Leave the agent inert: invisible to rays, non-colliding, harmless
    pub fn mark_load_failed(&mut self) {
        log::warn!("Hunter assets failed to load, agent disabled");
        self.load_failed = true;
        self.body.halt();
    }

    #[must_use]
    pub fn is_load_failed(&self) -> bool {
        self.load_failed
    }

    #[must_use]
    pub fn mode(&self) -> HunterMode {
        self.fsm.mode()
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.fsm.is_in_mode(HunterMode::Dead)
    }

    /// Advance the hunter by `dt` seconds
    ///
    /// Heat regenerates first, then the current state reads this tick's
    /// perception, decides on a transition and moves the body through the
    /// world's collision.
    pub fn update(&mut self, dt: f32, input: &TickInput) -> TickOutcome {
        let idle = TickOutcome {
            mode: self.fsm.mode(),
            mode_changed: false,
            player_damage: 0.0,
        };
        if self.load_failed {
            return idle;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.heat.regenerate(dt);

        if self.is_dead() {
            self.body.halt();
            return idle;
        }

        self.body.attack_cooldown = (self.body.attack_cooldown - dt).max(0.0);
        if !input.game_active || input.has_won {
            self.body.halt();
            self.body.line_of_sight = false;
            return idle;
        }

        let perception = Perception::sense(
            &self.world,
            &self.config.hunter,
            self.body.position,
            self.body.yaw,
            input.player_position,
        );
        self.body.line_of_sight = perception.line_of_sight;

        let first_event = self.events.len();
        let mut ctx = HunterContext {
            world: &self.world,
            config: &self.config.hunter,
            body: &mut self.body,
            heat: &mut self.heat,
            rng: &mut self.rng,
            events: &mut self.events,
            perception,
            dt,
        };
        let mode_changed = self.fsm.update(&mut ctx);

        self.sync_cell();

        let player_damage = self
            .events
            .iter()
            .skip(first_event)
            .filter_map(|event| match event {
                HunterEvent::PlayerHit { damage, .. } => Some(*damage),
                _ => None,
            })
            .sum();

        TickOutcome {
            mode: self.fsm.mode(),
            mode_changed,
            player_damage,
        }
    }

    /// Plain snapshot of the agent
    #[must_use]
    pub fn state(&self) -> AgentSnapshot {
        let mode = self.fsm.mode();
        let animation = match mode {
            HunterMode::Dead => AnimationRole::Death,
            HunterMode::Attack => AnimationRole::Attack,
            _ if self.body.moving && self.body.sprinting => AnimationRole::Run,
            _ if self.body.moving => AnimationRole::Walk,
            _ => AnimationRole::Idle,
        };

        AgentSnapshot {
            position: self.body.position,
            yaw: self.body.yaw,
            cell: self.body.cell,
            mode,
            path: self.body.path.cells.clone(),
            path_index: self.body.path_index,
            health: self.body.health,
            max_health: self.config.hunter.max_health,
            line_of_sight: self.body.line_of_sight,
            moving: self.body.moving,
            sprinting: self.body.sprinting,
            animation,
            hunt_target: self.body.hunt_target,
            last_known_player: self.body.last_known_player,
            load_failed: self.load_failed,
        }
    }

    /// Take damage from `source`
    ///
    /// Ignored while dead or disabled and for non-positive amounts. Reaching
    /// zero health switches to the dead mode immediately.
    pub fn apply_damage(&mut self, amount: f32, source: &str) -> DamageOutcome {
        let dead = self.is_dead();
        if self.load_failed || dead || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome {
                applied: false,
                damage_applied: 0.0,
                dead,
                died_now: false,
            };
        }

        let damage = amount.min(self.body.health);
        self.body.health -= damage;
        log::debug!("Hunter took {damage} from {source}, {} left", self.body.health);
        self.events.push(HunterEvent::HunterDamaged {
            amount: damage,
            source: source.to_string(),
            remaining: self.body.health,
        });

        let died_now = self.body.health <= 0.0;
        if died_now {
            self.body.health = 0.0;
            let from = self.fsm.mode();
            self.fsm.reset(DeadState);
            self.body.halt();
            self.body.clear_path();
            self.body.line_of_sight = false;

            log::info!("Hunter killed by {source}");
            self.events.push(HunterEvent::ModeChanged {
                from,
                to: HunterMode::Dead,
            });
            self.events.push(HunterEvent::HunterDied {
                source: source.to_string(),
            });
        }

        DamageOutcome {
            applied: true,
            damage_applied: damage,
            dead: died_now,
            died_now,
        }
    }

    /// Separate the player's capsule from the hunter's
    ///
    /// The overlap is split between both bodies and each is then pushed back
    /// out of the static geometry. The returned position is where the player
    /// should stand.
    pub fn resolve_player_capsule_collision(&mut self, query: PlayerCollisionQuery) -> PlayerCollisionResult {
        let untouched = PlayerCollisionResult {
            x: query.x,
            z: query.z,
            colliding: false,
        };
        if self.load_failed || self.is_dead() {
            return untouched;
        }

        let settings = &self.config.collision;
        let height = if query.height_offset > 0.0 {
            query.height_offset
        } else {
            settings.player_height
        };
        let mut player = Capsule::upright(query.x, query.z, settings.ground_clearance, height, query.radius.max(0.0));
        let mut hunter = self.body.capsule();

        let away = player.center_xz() - hunter.center_xz();
        let fallback = if away.length_squared() > f32::EPSILON {
            away
        } else {
            -forward(self.body.yaw)
        };
        let pair = resolve_capsule_pair(&mut player, &mut hunter, settings.player_share, fallback);
        if !pair.colliding {
            return untouched;
        }

        let iterations = settings.max_iterations;
        self.world.resolve_capsule(&mut player, iterations);
        self.world.resolve_capsule(&mut hunter, iterations);
        self.body.set_position_xz(hunter.center_xz());
        if let Some(cell) = self.sync_cell() {
            log::trace!("Hunter shoved into {cell}");
        }

        let resolved = player.center_xz();
        PlayerCollisionResult {
            x: resolved.x,
            z: resolved.y,
            colliding: true,
        }
    }

    /// First intersection of a hit-scan ray with the hunter's capsule
    #[must_use]
    pub fn raycast_capsule(&self, query: RayQuery) -> Option<RayHit> {
        if self.load_failed || self.is_dead() {
            return None;
        }
        raycast_capsule(&self.body.capsule(), query.origin, query.direction, query.max_distance)
    }

    /// Place the hunter at `position` facing `yaw`, keeping its mode
    pub fn teleport(&mut self, position: Vec3, yaw: f32) {
        self.body.position = position;
        self.body.yaw = wrap_angle(yaw);
        self.sync_cell();
        self.body.clear_path();
    }

    /// Re-derive the hunter's cell from its position, clearing the view on entry
    fn sync_cell(&mut self) -> Option<Cell> {
        let cell = self.body.refresh_cell(&self.world)?;
        self.heat
            .clear_visible(cell, forward(self.body.yaw), self.world.visibility_map());
        Some(cell)
    }

    /// Heat score of a cell
    #[must_use]
    pub fn hunt_score_for_cell(&self, cell: Cell) -> f32 {
        self.heat.score(cell)
    }

    #[must_use]
    pub fn path_cells(&self) -> &[Cell] {
        &self.body.path.cells
    }

    #[must_use]
    pub fn path_index(&self) -> usize {
        self.body.path_index
    }

    #[must_use]
    pub fn heat_map(&self) -> &HeatMap {
        &self.heat
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<HunterEvent> {
        self.events.drain().collect()
    }

    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable world access; call [`Self::on_maze_regenerated`] after replacing the maze
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MazeConfig;
    use crate::maze::{Grid, MazeLevel};
    use rand::Rng;

    const DT: f32 = 1.0 / 30.0;

    /// Straight east-west corridor; the hunter spawns at the east end facing west
    fn corridor() -> MazeLevel {
        let grid = Grid::from_rows(&["###########", "#.........#", "###########"], 2.0);
        MazeLevel::from_grid(grid, Cell::new(1, 1), Cell::new(9, 1), 3.0)
    }

    fn agent(level: MazeLevel) -> HunterAgent<MazeLevel> {
        HunterAgent::new(level, SimConfig::default().with_seed(3))
    }

    fn center(agent: &HunterAgent<MazeLevel>, col: i32, row: i32) -> Vec3 {
        agent.world().cell_to_world(Cell::new(col, row))
    }

    fn player_hits(events: &[HunterEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, HunterEvent::PlayerHit { .. }))
            .count()
    }

    #[test]
    fn test_spawns_at_exit_in_hunt() {
        let mut hunter = agent(corridor());
        let snapshot = hunter.state();
        assert_eq!(snapshot.cell, Cell::new(9, 1));
        assert_eq!(snapshot.mode, HunterMode::Hunt);
        assert_eq!(snapshot.health, 100.0);
        assert_eq!(snapshot.animation, AnimationRole::Idle);
        assert!((forward(snapshot.yaw) - Vec2::NEG_X).length() < 1e-5);
        assert_eq!(
            hunter.drain_events(),
            vec![HunterEvent::Respawned { cell: Cell::new(9, 1) }]
        );
        // The spawn view is already cleared
        assert_eq!(hunter.hunt_score_for_cell(Cell::new(5, 1)), 0.0);
    }

    #[test]
    fn test_hunts_toward_heat_when_player_unseen() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let level = MazeLevel::generate(MazeConfig::default(), &mut rng);
        let mut hunter = agent(level);
        let player = hunter.world().cell_to_world(hunter.world().start_cell());
        hunter.drain_events();

        for _ in 0..30 {
            hunter.update(DT, &TickInput::active(player));
        }

        let snapshot = hunter.state();
        assert!(!snapshot.line_of_sight);
        assert_eq!(snapshot.mode, HunterMode::Hunt);
        assert!(snapshot.path.len() > 1);

        let chosen = hunter.drain_events().into_iter().find_map(|e| match e {
            HunterEvent::TargetChosen { target, score, .. } => Some((target, score)),
            _ => None,
        });
        let (target, score) = chosen.expect("a target was drawn");
        assert!(score > 0.0);
        assert!(hunter.world().is_walkable(target));
    }

    #[test]
    fn test_player_in_view_cone_starts_chase_same_tick() {
        let mut hunter = agent(corridor());
        let player = center(&hunter, 7, 1);

        let outcome = hunter.update(DT, &TickInput::active(player));

        assert!(outcome.mode_changed);
        assert_eq!(outcome.mode, HunterMode::Chase);
        let snapshot = hunter.state();
        assert_eq!(snapshot.mode, HunterMode::Chase);
        assert!(snapshot.line_of_sight);
    }

    #[test]
    fn test_player_behind_is_not_seen() {
        let mut hunter = agent(corridor());
        // Facing east with the player 4 cells west
        hunter.teleport(center(&hunter, 5, 1), std::f32::consts::FRAC_PI_2);
        let player = center(&hunter, 1, 1);

        hunter.update(DT, &TickInput::active(player));
        assert!(!hunter.state().line_of_sight);
        assert_eq!(hunter.mode(), HunterMode::Hunt);
    }

    #[test]
    fn test_attack_lands_once_at_midpoint() {
        let mut hunter = agent(corridor());
        let hunter_pos = hunter.state().position;
        let player = hunter_pos - Vec3::X * 1.5;
        let input = TickInput::active(player);

        hunter.update(0.05, &input);
        assert_eq!(hunter.mode(), HunterMode::Chase);
        hunter.update(0.05, &input);
        assert_eq!(hunter.mode(), HunterMode::Attack);
        assert!(hunter.drain_events().contains(&HunterEvent::AttackStarted));

        // 0.3 s ticks straddle the 0.5 s midpoint of a 1 s swing
        let damage: Vec<f32> = (0..4)
            .map(|_| hunter.update(0.3, &input).player_damage)
            .collect();
        assert_eq!(damage, vec![0.0, 25.0, 0.0, 0.0]);
        assert_eq!(player_hits(&hunter.drain_events()), 1);
        assert_eq!(hunter.mode(), HunterMode::Chase);
        assert!(!hunter.state().moving);

        // Cooldown keeps chase from swinging again straight away
        hunter.update(0.05, &input);
        assert_eq!(hunter.mode(), HunterMode::Chase);
    }

    #[test]
    fn test_no_double_damage_with_small_ticks() {
        let mut hunter = agent(corridor());
        let player = hunter.state().position - Vec3::X * 1.2;
        let input = TickInput::active(player);

        let mut attacked = false;
        let mut events = Vec::new();
        for _ in 0..500 {
            hunter.update(0.01, &input);
            events.extend(hunter.drain_events());
            if hunter.mode() == HunterMode::Attack {
                attacked = true;
            } else if attacked {
                break;
            }
        }
        assert!(attacked);
        assert_eq!(player_hits(&events), 1);
    }

    #[test]
    fn test_attack_misses_when_player_steps_out() {
        let mut hunter = agent(corridor());
        let near = TickInput::active(hunter.state().position - Vec3::X * 1.5);
        hunter.update(0.05, &near);
        hunter.update(0.05, &near);
        assert_eq!(hunter.mode(), HunterMode::Attack);

        let far = TickInput::active(hunter.state().position - Vec3::X * 6.0);
        let total: f32 = (0..5).map(|_| hunter.update(0.25, &far).player_damage).sum();
        assert_eq!(total, 0.0);
        let events = hunter.drain_events();
        assert!(events.contains(&HunterEvent::AttackMissed));
        assert_eq!(hunter.mode(), HunterMode::Chase);
    }

    #[test]
    fn test_death_until_regeneration() {
        let mut hunter = agent(corridor());
        let player = center(&hunter, 5, 1);

        let outcome = hunter.apply_damage(30.0, "rifle");
        assert!(outcome.applied && !outcome.dead);
        assert_eq!(outcome.damage_applied, 30.0);

        let outcome = hunter.apply_damage(500.0, "rifle");
        assert!(outcome.applied && outcome.dead && outcome.died_now);
        assert_eq!(outcome.damage_applied, 70.0);
        assert_eq!(hunter.mode(), HunterMode::Dead);

        let before = hunter.state().position;
        for _ in 0..60 {
            let outcome = hunter.update(DT, &TickInput::active(player));
            assert_eq!(outcome.player_damage, 0.0);
        }
        let snapshot = hunter.state();
        assert_eq!(snapshot.mode, HunterMode::Dead);
        assert_eq!(snapshot.animation, AnimationRole::Death);
        assert_eq!(snapshot.position, before);

        let again = hunter.apply_damage(10.0, "rifle");
        assert!(!again.applied && again.dead && !again.died_now);
        let ray = RayQuery {
            origin: center(&hunter, 1, 1) + Vec3::Y,
            direction: Vec3::X,
            max_distance: 100.0,
        };
        assert!(hunter.raycast_capsule(ray).is_none());

        hunter.on_maze_regenerated();
        let snapshot = hunter.state();
        assert_eq!(snapshot.mode, HunterMode::Hunt);
        assert_eq!(snapshot.health, 100.0);
    }

    #[test]
    fn test_search_then_hunt_after_losing_player() {
        let grid = Grid::from_rows(
            &[
                "#########", //
                "#.......#", //
                "#######.#", //
                "#######.#", //
                "#########",
            ],
            2.0,
        );
        let level = MazeLevel::from_grid(grid, Cell::new(7, 3), Cell::new(1, 1), 3.0);
        let mut hunter = agent(level);
        let seen = center(&hunter, 5, 1);
        // Inside solid rock: never visible
        let hidden = center(&hunter, 3, 3);

        hunter.update(DT, &TickInput::active(seen));
        assert_eq!(hunter.mode(), HunterMode::Chase);

        let mut modes = Vec::new();
        for _ in 0..(12.0 / DT) as usize {
            hunter.update(DT, &TickInput::active(hidden));
            for event in hunter.drain_events() {
                if let HunterEvent::ModeChanged { from, to } = event {
                    modes.push((from, to));
                }
            }
        }

        assert!(modes.contains(&(HunterMode::Chase, HunterMode::Search)));
        assert!(modes.contains(&(HunterMode::Search, HunterMode::Hunt)));
        assert_eq!(hunter.state().last_known_player, None);
    }

    #[test]
    fn test_idles_while_game_inactive() {
        let mut hunter = agent(corridor());
        let player = center(&hunter, 7, 1);
        let cleared = Cell::new(7, 1);
        assert_eq!(hunter.hunt_score_for_cell(cleared), 0.0);

        let paused = TickInput {
            game_active: false,
            ..TickInput::active(player)
        };
        hunter.update(10.0, &paused);
        assert_eq!(hunter.mode(), HunterMode::Hunt);
        assert!(!hunter.state().line_of_sight);
        assert!((hunter.hunt_score_for_cell(cleared) - 0.02).abs() < 1e-6);

        let won = TickInput {
            has_won: true,
            ..TickInput::active(player)
        };
        hunter.update(DT, &won);
        assert_eq!(hunter.mode(), HunterMode::Hunt);
    }

    #[test]
    fn test_player_and_hunter_never_overlap_after_resolution() {
        let grid = Grid::from_rows(
            &[
                "#########", //
                "#.......#", //
                "#.......#", //
                "#.......#", //
                "#.......#", //
                "#.......#", //
                "#########",
            ],
            2.0,
        );
        let level = MazeLevel::from_grid(grid, Cell::new(1, 1), Cell::new(4, 3), 3.0);
        let mut hunter = agent(level);
        let home = center(&hunter, 4, 3);
        let mut rng = rand::rngs::StdRng::seed_from_u64(8);

        for _ in 0..200 {
            hunter.teleport(home, 0.0);
            let radius = rng.random_range(0.2..0.5);
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let distance = rng.random_range(0.0..(radius + 0.35));
            let query = PlayerCollisionQuery {
                x: home.x + angle.cos() * distance,
                z: home.z + angle.sin() * distance,
                radius,
                height_offset: 1.7,
            };

            let result = hunter.resolve_player_capsule_collision(query);
            assert!(result.colliding);
            let hunter_xz = hunter.state().position;
            let gap = Vec2::new(result.x - hunter_xz.x, result.z - hunter_xz.z).length();
            assert!(gap >= radius + 0.35 - 1e-4, "gap {gap}");
        }
    }

    #[test]
    fn test_shove_into_new_cell_clears_it() {
        let mut hunter = agent(corridor());
        // East end of cell 9, facing west
        let start = Vec3::new(18.1, 0.0, 3.0);
        hunter.teleport(start, -std::f32::consts::FRAC_PI_2);
        assert_eq!(hunter.state().cell, Cell::new(9, 1));

        let idle = TickInput {
            game_active: false,
            has_won: false,
            player_position: center(&hunter, 1, 1),
        };
        hunter.update(10.0, &idle);
        let entered = Cell::new(8, 1);
        assert!(hunter.hunt_score_for_cell(entered) > 0.0);

        let query = PlayerCollisionQuery {
            x: 18.4,
            z: 3.0,
            radius: 0.5,
            height_offset: 1.7,
        };
        assert!(hunter.resolve_player_capsule_collision(query).colliding);
        assert_eq!(hunter.state().cell, entered);
        assert_eq!(hunter.hunt_score_for_cell(entered), 0.0);

        // The next tick sees no cell change, so the clear must already have happened
        hunter.update(0.0, &idle);
        assert_eq!(hunter.hunt_score_for_cell(entered), 0.0);
    }

    #[test]
    fn test_teleport_clears_destination_cell() {
        let mut hunter = agent(corridor());
        let idle = TickInput {
            game_active: false,
            has_won: false,
            player_position: center(&hunter, 1, 1),
        };
        hunter.update(10.0, &idle);
        let target = Cell::new(3, 1);
        assert!(hunter.hunt_score_for_cell(target) > 0.0);

        hunter.teleport(center(&hunter, 3, 1), 0.0);
        assert_eq!(hunter.hunt_score_for_cell(target), 0.0);
    }

    #[test]
    fn test_far_player_is_untouched() {
        let mut hunter = agent(corridor());
        let far = center(&hunter, 2, 1);
        let query = PlayerCollisionQuery {
            x: far.x,
            z: far.z,
            radius: 0.4,
            height_offset: 0.0,
        };
        let result = hunter.resolve_player_capsule_collision(query);
        assert!(!result.colliding);
        assert_eq!((result.x, result.z), (far.x, far.z));
    }

    #[test]
    fn test_raycast_hits_capsule() {
        let hunter = agent(corridor());
        let body = hunter.state().position;
        let origin = center(&hunter, 1, 1) + Vec3::Y;
        let ray = RayQuery {
            origin,
            direction: Vec3::X,
            max_distance: 100.0,
        };
        let hit = hunter.raycast_capsule(ray).expect("ray crosses the hunter");
        assert!((hit.distance - (body.x - 0.35 - origin.x)).abs() < 1e-3);

        let short = RayQuery {
            max_distance: 2.0,
            ..ray
        };
        assert!(hunter.raycast_capsule(short).is_none());
    }

    #[test]
    fn test_load_failed_is_inert() {
        let mut hunter = agent(corridor());
        hunter.mark_load_failed();
        let position = hunter.state().position;

        assert!(!hunter.apply_damage(50.0, "rifle").applied);
        let ray = RayQuery {
            origin: position - Vec3::X * 4.0 + Vec3::Y,
            direction: Vec3::X,
            max_distance: 100.0,
        };
        assert!(hunter.raycast_capsule(ray).is_none());
        let result = hunter.resolve_player_capsule_collision(PlayerCollisionQuery {
            x: position.x,
            z: position.z,
            radius: 0.4,
            height_offset: 1.7,
        });
        assert!(!result.colliding);

        let outcome = hunter.update(DT, &TickInput::active(position - Vec3::X));
        assert_eq!(outcome.player_damage, 0.0);
        assert!(hunter.state().load_failed);
        assert_eq!(hunter.state().position, position);
    }

    #[test]
    fn test_invalid_config_disables_agent() {
        let mut config = SimConfig::default();
        config.hunter.walk_speed = -1.0;
        let hunter = HunterAgent::new(corridor(), config);
        assert!(hunter.is_load_failed());
    }
}
