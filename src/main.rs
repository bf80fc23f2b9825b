//! Tale Soccer headless server
//!
//! Runs one match between two scripted players on the fixed-step loop and
//! prints a JSON snapshot line at the configured cadence. A network transport
//! would replace the bots with socket messages and forward the same lines.

use std::time::{Duration, Instant};

use glam::Vec2;
use log::{error, info};

use tale_soccer::consts::BASE_SPEED;
use tale_soccer::sim::{MatchEngine, MatchEvent, Side};
use tale_soccer::{Runner, Settings};

/// Scripted stand-in for a connected client
struct Bot {
    id: &'static str,
    name: &'static str,
}

impl Bot {
    /// Chase a point just behind the ball so contact pushes it toward the
    /// opponent's wall
    fn intent(&self, engine: &MatchEngine) -> Option<Vec2> {
        let state = engine.state();
        let player = state.player(self.id)?;
        let half = player.square().size / 2.0;
        let center = player.body.pos + Vec2::splat(half);
        let behind = match player.side {
            Side::Left => -1.0,
            Side::Right => 1.0,
        };
        let target = state.ball.pos + Vec2::new(behind * (half + state.ball.radius), 0.0);
        let to_target = target - center;
        if to_target.length_squared() < 4.0 {
            // Close enough: shove through the ball
            return Some(Vec2::new(-behind, 0.0));
        }
        Some((to_target / BASE_SPEED).clamp(Vec2::splat(-1.0), Vec2::splat(1.0)))
    }
}

fn log_event(event: &MatchEvent) {
    match event {
        MatchEvent::GoalScored { scorer, score } => info!("GOAL by {} ({})", scorer, score),
        other => info!("event: {:?}", other),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load settings, using defaults: {}", e);
        Settings::default()
    });

    let mut runner = Runner::new(&settings);
    let bots = [
        Bot { id: "bot-left", name: "Lefty" },
        Bot { id: "bot-right", name: "Righty" },
    ];

    for bot in &bots {
        let outcome = runner.engine_mut().join(bot.id, bot.name);
        info!("{} joined as {:?}", bot.name, outcome.color);
    }
    for bot in &bots {
        runner.engine_mut().ready_up(bot.id);
    }

    let tick = Duration::from_secs_f32(settings.tick_ms / 1000.0);
    let total_ticks = (settings.duration_ms as f32 / settings.tick_ms).ceil() as u64;
    let mut last = Instant::now();

    while runner.ticks() < total_ticks {
        for bot in &bots {
            if let Some(intent) = bot.intent(runner.engine()) {
                runner.engine_mut().move_player(bot.id, intent.x, intent.y);
            }
        }

        let ran = if settings.realtime {
            std::thread::sleep(tick);
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f32() * 1000.0;
            last = now;
            runner.advance(elapsed)
        } else {
            runner.advance(runner.tick_ms())
        };

        for event in runner.engine_mut().drain_events() {
            log_event(&event);
        }

        if ran > 0 && runner.ticks() % u64::from(settings.snapshot_every) < u64::from(ran) {
            match runner.engine().snapshot().to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize snapshot: {}", e),
            }
        }
    }

    let state = runner.engine().state();
    for player in &state.players {
        info!("final: {} {}", player.name, player.score);
    }
}
