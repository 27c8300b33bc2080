//! Odyssea entry point
//!
//! Headless runner: plays one level on autopilot at the fixed timestep and
//! logs how it went.
//!
//! Usage: `odyssea [settings.json] [seed] [1|2|3|speedrun]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use odyssea::consts::{MAX_SUBSTEPS, SIM_DT};
    use odyssea::sim::{Game, GameEvent, Level, Scene, SessionState, TickInput};
    use odyssea::{AudioBus, JsonFileStore, Settings};

    env_logger::init();
    log::info!("Odyssea (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let level = match args.next().as_deref() {
        Some("2") => Level::Two,
        Some("3") => Level::Three,
        Some("speedrun") => Level::SpeedRun,
        _ => Level::One,
    };
    let max_seconds = settings.countdown.start_seconds + 60.0;

    let mut game = Game::new(settings, seed).with_feedback(Box::new(AudioBus::log_only()));
    match JsonFileStore::open("odyssea_records.json") {
        Ok(store) => game = game.with_store(Box::new(store)),
        Err(e) => log::warn!("{e}; speed-run record will not be kept"),
    }
    game.load_scene(Scene::Level(level));

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    // Simulated 30 Hz frames, stepped at the fixed rate
    let frame_dt = 1.0 / 30.0;
    let mut accumulator = 0.0f32;
    let mut elapsed = 0.0f32;
    let mut catches = 0u32;

    'frames: while elapsed < max_seconds {
        accumulator += frame_dt;
        elapsed += frame_dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            game.tick(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            catches += game
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Captured { .. }))
                .count() as u32;

            if matches!(
                game.session().current_state(),
                SessionState::TimesUp | SessionState::Win
            ) {
                break 'frames;
            }
        }
    }

    let session = game.session();
    log::info!(
        "{} finished: {} with {} points from {catches} catches (target {})",
        session.level().name(),
        session.current_state().as_str(),
        session.score(),
        session.threshold()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
