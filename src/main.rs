//! Ember Rounds headless runner
//!
//! Drives the simulation with a fixed-timestep loop and a scripted pilot,
//! logging the run. Usage: `ember-rounds [tuning.json] [seed]`.

use glam::Vec2;

use ember_rounds::Tuning;
use ember_rounds::consts::*;
use ember_rounds::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};

/// Simulated frame length; deliberately not a multiple of the tick length
const FRAME_DT: f32 = 1.0 / 50.0;
/// Stop after this many ticks even if the pilot is still alive
const MAX_TICKS: u64 = 60 * 60 * 20;
/// Below this health fraction the pilot heads for a bonfire
const RETREAT_HEALTH: f32 = 0.5;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {}", e);
            std::process::exit(1);
        }
        None => 0x5EED,
    };

    let mut game = match Game::new(tuning, seed) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Ember Rounds (headless) starting, seed {}", seed);

    while game.state.phase != GamePhase::GameOver && game.state.time_ticks < MAX_TICKS {
        game.update(FRAME_DT);
    }

    let snap = Snapshot::capture(&game.state);
    log::info!(
        "Run finished after {} ticks: phase {:?}, round {}, score {}, money {}, weapons {:?}, passives {}",
        game.state.time_ticks,
        snap.phase,
        snap.round,
        snap.score,
        snap.money,
        snap.player.weapons,
        snap.player.passives.len()
    );
}

fn load_tuning(path: &str) -> Result<Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(Tuning::from_json(&json)?)
}

/// Game instance holding state and the frame accumulator
struct Game {
    state: GameState,
    accumulator: f32,
    kills: u32,
}

impl Game {
    fn new(tuning: Tuning, seed: u64) -> Result<Self, ember_rounds::TuningError> {
        Ok(Self {
            state: GameState::new(tuning, seed)?,
            accumulator: 0.0,
            kills: 0,
        })
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = pilot(&Snapshot::capture(&self.state));
            tick(&mut self.state, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.report_events();
        }
    }

    fn report_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::EnemyKilled { .. } => self.kills += 1,
                GameEvent::ShopOpened { round, .. } => {
                    log::info!("Round {} survived, {} kills so far", round, self.kills);
                }
                GameEvent::BonfireHealed { bonfire, amount } => {
                    log::debug!("Bonfire {} healed {:.1}", bonfire, amount);
                }
                _ => {}
            }
        }
    }
}

/// Scripted player: starts the run, kites enemies, retreats to bonfires
/// when hurt, and buys the cheapest affordable offer in the shop.
fn pilot(snap: &Snapshot) -> TickInput {
    match snap.phase {
        GamePhase::Menu => TickInput {
            start_round: true,
            ..Default::default()
        },
        GamePhase::Playing => TickInput {
            move_dir: steer(snap),
            ..Default::default()
        },
        GamePhase::Shopping => {
            let cheapest = snap
                .offers
                .iter()
                .filter(|o| o.affordable)
                .min_by_key(|o| o.cost);
            TickInput {
                purchase: cheapest.map(|o| o.slot),
                ..Default::default()
            }
        }
        GamePhase::GameOver => TickInput::default(),
    }
}

fn steer(snap: &Snapshot) -> Vec2 {
    let me = snap.player.pos;

    if snap.player.health_fraction < RETREAT_HEALTH {
        let bonfire = snap
            .bonfires
            .iter()
            .filter(|b| b.cooldown_fraction == 0.0)
            .min_by(|a, b| a.pos.distance(me).total_cmp(&b.pos.distance(me)));
        if let Some(b) = bonfire {
            return (b.pos - me).normalize_or_zero();
        }
    }

    // Push away from nearby enemies, weighted by closeness, with a pull back
    // toward the middle so the pilot does not pin itself against a wall.
    let mut away = Vec2::ZERO;
    for enemy in &snap.enemies {
        let delta = me - enemy.pos;
        let dist = delta.length().max(1.0);
        away += delta / (dist * dist);
    }
    let center = ember_rounds::screen_center();
    let home = (center - me) / Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    (away.normalize_or_zero() + home).normalize_or_zero()
}
