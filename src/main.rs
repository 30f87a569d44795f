//! Headless demo: a scripted player runs for the exit while the hunter hunts it

use std::path::Path;
use std::time::Instant;

use hunter::ai::find_path;
use hunter::core::{describe_agent, render_heat_map};
use hunter::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const TICK: f32 = 1.0 / 30.0;
const ROUND_SECONDS: f32 = 120.0;
const ROUNDS: u32 = 3;
const PLAYER_SPEED: f32 = 2.2;
const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_HEALTH: f32 = 100.0;
const SHOT_INTERVAL: f32 = 0.6;
const SHOT_DAMAGE: f32 = 20.0;
const SHOT_RANGE: f32 = 30.0;
const EYE_HEIGHT: f32 = 1.6;
const OVERLAY_INTERVAL: f32 = 15.0;

/// Scripted player walking the shortest route to the exit
struct DemoPlayer {
    position: Vec3,
    health: f32,
    route: Vec<Vec3>,
    next: usize,
    shot_timer: f32,
}

impl DemoPlayer {
    fn spawn(level: &MazeLevel) -> Self {
        let grid = level.maze();
        let route = find_path(grid, level.start_cell(), level.exit_cell(), None, 4).waypoints(grid);
        Self {
            position: level.cell_to_world(level.start_cell()),
            health: PLAYER_HEALTH,
            route,
            next: 1,
            shot_timer: 0.0,
        }
    }

    fn reached_exit(&self) -> bool {
        self.next >= self.route.len()
    }

    fn walk(&mut self, dt: f32) {
        let Some(&waypoint) = self.route.get(self.next) else {
            return;
        };
        let to = waypoint - self.position;
        let step = PLAYER_SPEED * dt;
        if to.length() <= step {
            self.position = waypoint;
            self.next += 1;
        } else {
            self.position += to.normalize_or_zero() * step;
        }
    }
}

/// Demo session driving one hunter through several rounds
struct DemoGame {
    rng: StdRng,
    agent: HunterAgent<MazeLevel>,
    player: DemoPlayer,
    debug: DebugInfo,
    round: u32,
    elapsed: f32,
    overlay_timer: f32,
}

impl DemoGame {
    fn new(config: SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let level = MazeLevel::generate(config.maze.clone(), &mut rng);
        let player = DemoPlayer::spawn(&level);
        let agent = HunterAgent::new(level, config);
        Self {
            rng,
            agent,
            player,
            debug: DebugInfo::new(),
            round: 1,
            elapsed: 0.0,
            overlay_timer: 0.0,
        }
    }

    /// Returns false once every round has been played
    fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.player.walk(dt);

        // Keep the player out of the hunter's capsule
        let resolved = self.agent.resolve_player_capsule_collision(PlayerCollisionQuery {
            x: self.player.position.x,
            z: self.player.position.z,
            radius: PLAYER_RADIUS,
            height_offset: EYE_HEIGHT,
        });
        self.player.position.x = resolved.x;
        self.player.position.z = resolved.z;

        let input = TickInput {
            game_active: true,
            has_won: self.player.reached_exit(),
            player_position: self.player.position,
        };
        let started = Instant::now();
        let outcome = self.agent.update(dt, &input);
        self.debug.record_tick(started.elapsed());
        self.player.health -= outcome.player_damage;

        self.shoot(dt);
        self.report(dt);

        let over = self.player.health <= 0.0 || self.player.reached_exit() || self.elapsed >= ROUND_SECONDS;
        if over {
            self.finish_round();
        }
        self.round <= ROUNDS
    }

    fn shoot(&mut self, dt: f32) {
        self.player.shot_timer -= dt;
        let snapshot = self.agent.state();
        if self.player.shot_timer > 0.0 || !snapshot.line_of_sight {
            return;
        }
        self.player.shot_timer = SHOT_INTERVAL;

        let eye = self.player.position + Vec3::Y * EYE_HEIGHT;
        let aim = snapshot.position + Vec3::Y * 1.0 - eye;
        let ray = RayQuery {
            origin: eye,
            direction: aim,
            max_distance: SHOT_RANGE,
        };
        if let Some(hit) = self.agent.raycast_capsule(ray) {
            let outcome = self.agent.apply_damage(SHOT_DAMAGE, "player");
            log::debug!("Shot hit at {:.1}m, hunter dead: {}", hit.distance, outcome.dead);
        }
    }

    fn report(&mut self, dt: f32) {
        for event in self.agent.drain_events() {
            match event {
                HunterEvent::ModeChanged { from, to } => log::info!("Hunter {from} -> {to}"),
                HunterEvent::PlayerHit { damage, .. } => {
                    log::info!("Player hit for {damage}, {} left", self.player.health.max(0.0));
                }
                HunterEvent::HunterDied { source } => log::info!("Hunter killed by {source}"),
                other => log::trace!("{other:?}"),
            }
        }

        self.overlay_timer += dt;
        if self.overlay_timer >= OVERLAY_INTERVAL {
            self.overlay_timer = 0.0;
            self.print_overlay();
        }
    }

    fn print_overlay(&mut self) {
        let player_cell = self
            .agent
            .world()
            .world_to_cell(self.player.position.x, self.player.position.z);
        self.debug.clear_lines();
        self.debug.add_line(describe_agent(&self.agent.state()));
        for line in render_heat_map(&self.agent, Some(player_cell)) {
            self.debug.add_line(line);
        }
        for line in self.debug.get_all_lines() {
            log::info!("{line}");
        }
    }

    fn finish_round(&mut self) {
        let verdict = if self.player.reached_exit() {
            "escaped"
        } else if self.player.health <= 0.0 {
            "caught"
        } else {
            "timed out"
        };
        log::info!(
            "Round {} over after {:.1}s: player {verdict}, hunter {}",
            self.round,
            self.elapsed,
            self.agent.mode()
        );
        self.print_overlay();

        self.round += 1;
        self.elapsed = 0.0;
        self.overlay_timer = 0.0;
        self.agent.world_mut().regenerate(&mut self.rng);
        self.agent.on_maze_regenerated();
        self.player = DemoPlayer::spawn(self.agent.world());
    }
}

fn load_config(path: &Path) -> Result<SimConfig, hunter::core::ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => SimConfig::load_json(path),
        _ => SimConfig::load_ron(path),
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    log::info!(
        "Simulating {ROUNDS} rounds in a {}x{} maze (seed {})",
        config.maze.cols,
        config.maze.rows,
        config.seed
    );

    let mut game = DemoGame::new(config);
    while game.update(TICK) {}

    log::info!("{}", game.debug.tick_stats.format_stats());
}
