//! Per-tick game loop
//!
//! Order within a level tick:
//! 1. advance the clock and run expired timers
//! 2. session input (pause, bullet time, end-screen commands)
//! 3. countdown
//! 4. population upkeep
//! 5. rod, then capture settlement
//!
//! Session side effects land before the population and the rod look at the
//! session state.

use super::game::Game;
use super::level::{Level, Scene};
use super::session::{SessionCommand, SessionCtx};
use super::state::SessionState;
use super::timers::Owner;
use crate::hang_direction;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Pause during play; quit from pause and end screens
    pub back: bool,
    pub bullet_time: bool,
    pub cast: bool,
    /// Restart the level from an end screen
    pub reload: bool,
    /// Next level after a win; confirm on menu screens
    pub advance: bool,
    /// Tutorial: start the speed run
    pub speed_run: bool,
    /// Tutorial: forget the speed-run record
    pub reset_record: bool,
    /// Casts and uses bullet time on its own
    pub autopilot: bool,
}

impl Game {
    /// Advance the game by `real_dt` seconds of wall-clock time
    pub fn tick(&mut self, input: &TickInput, real_dt: f32) {
        self.time_ticks += 1;
        self.clock.advance(real_dt);

        match self.scene {
            Scene::Tutorial => self.tick_tutorial(input),
            Scene::Thanks => {
                if input.advance {
                    self.load_scene(Scene::Level(Level::One));
                } else if input.back {
                    self.request_quit();
                }
            }
            Scene::Level(level) => self.tick_level(level, input),
        }

        self.flush();
    }

    fn tick_tutorial(&mut self, input: &TickInput) {
        if input.reset_record {
            let mut ctx = SessionCtx {
                clock: &mut self.clock,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.session.reset_time_attack_record(&mut ctx);
        }

        if input.advance {
            self.load_scene(Scene::Level(Level::One));
        } else if input.speed_run {
            self.load_scene(Scene::Level(Level::SpeedRun));
        } else if input.back {
            self.request_quit();
        }
    }

    fn tick_level(&mut self, level: Level, input: &TickInput) {
        let mut input = input.clone();
        if input.autopilot {
            self.autopilot(&mut input);
        }

        let mut ctx = SessionCtx {
            clock: &mut self.clock,
            timers: &mut self.timers,
            events: &mut self.events,
        };

        let fired = ctx
            .timers
            .advance(ctx.clock.unscaled_elapsed(), ctx.clock.scaled_elapsed());
        for f in fired {
            match f.owner {
                Owner::Session => self.session.on_timer(f.action, &mut ctx),
                Owner::Population => {
                    self.population.on_respawn_due(
                        self.session.current_state(),
                        self.obstacles.as_ref(),
                        ctx.events,
                    );
                }
            }
        }

        match self.session.handle_input(&input, &mut ctx) {
            SessionCommand::None => {}
            SessionCommand::Reload => {
                self.load_scene(Scene::Level(level));
                return;
            }
            SessionCommand::Advance => {
                self.load_scene(level.next());
                return;
            }
            SessionCommand::Quit => {
                self.request_quit();
                return;
            }
        }

        self.session.update(&mut ctx);

        let state = self.session.current_state();
        self.population.maintain(
            self.clock.scaled_elapsed(),
            state,
            self.obstacles.as_ref(),
            &mut self.events,
        );

        if input.cast {
            self.rod.cast(state, &mut self.events);
        }
        let population = &self.population;
        let touched = self.rod.update(
            state,
            self.session.is_bullet_time_active(),
            self.session.swing_factor(),
            &self.clock,
            |p, r| population.overlapping(p, r).map(|c| c.id),
        );

        if let Some(id) = touched {
            if let Some(caught) =
                self.population.report_capture(id, &mut self.timers, &mut self.events)
            {
                self.rod.attach(&caught);
                let mut ctx = SessionCtx {
                    clock: &mut self.clock,
                    timers: &mut self.timers,
                    events: &mut self.events,
                };
                self.session.add_score(caught.kind.score_value(), &mut ctx);
            }
        }
    }

    /// Cast when something sits on the current swing line; bullet time at half time
    fn autopilot(&self, input: &mut TickInput) {
        if self.session.current_state() != SessionState::Play {
            return;
        }

        if !self.rod.is_busy() {
            let tip = self.rod.tip();
            let dir = hang_direction(self.rod.angle());
            let reach = self.settings.rod.max_line_length;
            let lane = self.rod.hook_radius() + self.population.rules().entity_radius;

            input.cast |= self.population.live().iter().any(|c| {
                let to = c.pos - tip;
                let along = to.dot(dir);
                along > 0.0 && along <= reach && (to - dir * along).length() <= lane
            });
        }

        let half_time = self.settings.countdown.start_seconds * 0.5;
        if !self.session.bullet_time().used_this_level
            && self.session.countdown_remaining() <= half_time
        {
            input.bullet_time = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::audio::Feedback;
    use crate::consts::{SIM_DT, TIME_ATTACK_KEY};
    use crate::records::{MemoryStore, ScoreStore};
    use crate::settings::Settings;
    use crate::sim::obstacle::ObstacleQuery;
    use crate::sim::state::GameEvent;

    fn run(game: &mut Game, input: &TickInput, seconds: f32) {
        let ticks = (seconds / SIM_DT).round() as u32;
        for _ in 0..ticks {
            game.tick(input, SIM_DT);
        }
    }

    fn press(game: &mut Game, input: TickInput) {
        game.tick(&input, SIM_DT);
    }

    fn in_level(settings: Settings) -> Game {
        let mut game = Game::new(settings, 12345);
        game.load_scene(Scene::Level(Level::One));
        game
    }

    #[test]
    fn test_menu_confirm_starts_level_one() {
        let mut game = Game::new(Settings::default(), 1);
        assert_eq!(game.scene(), Scene::Tutorial);

        press(
            &mut game,
            TickInput {
                advance: true,
                ..Default::default()
            },
        );
        assert_eq!(game.scene(), Scene::Level(Level::One));
        assert_eq!(game.session().current_state(), SessionState::Play);
        assert_eq!(game.session().threshold(), 200);
        assert!(game.drain_events().contains(&GameEvent::SceneLoaded {
            scene: Scene::Level(Level::One)
        }));
    }

    #[test]
    fn test_speed_run_uses_stored_record() {
        let store = MemoryStore::with_score(TIME_ATTACK_KEY, 120);
        let mut game = Game::new(Settings::default(), 1).with_store(Box::new(store));
        press(
            &mut game,
            TickInput {
                speed_run: true,
                ..Default::default()
            },
        );
        assert_eq!(game.scene(), Scene::Level(Level::SpeedRun));
        assert_eq!(game.session().threshold(), 120);
    }

    #[test]
    fn test_tutorial_reset_record() {
        let store = MemoryStore::with_score(TIME_ATTACK_KEY, 120);
        let mut game = Game::new(Settings::default(), 1).with_store(Box::new(store));
        press(
            &mut game,
            TickInput {
                reset_record: true,
                ..Default::default()
            },
        );
        let best = game
            .session()
            .record_store()
            .map(|s| s.best_score(TIME_ATTACK_KEY));
        assert_eq!(best, Some(0));
    }

    #[test]
    fn test_population_fills_one_per_interval_up_to_cap() {
        let mut game = in_level(Settings::default());
        press(&mut game, TickInput::default());
        assert_eq!(game.population().len(), 1);

        run(&mut game, &TickInput::default(), 2.0);
        assert_eq!(game.population().len(), 7);
    }

    #[test]
    fn test_nothing_spawns_while_paused() {
        let mut game = in_level(Settings::default());
        press(
            &mut game,
            TickInput {
                pause: true,
                ..Default::default()
            },
        );
        run(&mut game, &TickInput::default(), 1.0);
        assert!(game.population().is_empty());
        assert_eq!(game.session().countdown_remaining(), 90.0);
    }

    fn one_slot_settings() -> Settings {
        let mut settings = Settings::default();
        settings.spawner.max_population = 2;
        settings.spawner.check_interval = 1000.0;
        settings
    }

    #[test]
    fn test_respawn_materializes_in_play() {
        let mut game = in_level(one_slot_settings());
        press(&mut game, TickInput::default());
        assert_eq!(game.population().len(), 1);

        game.request_respawn(1, 3.0);
        run(&mut game, &TickInput::default(), 3.5);
        assert_eq!(game.population().len(), 2);
    }

    #[test]
    fn test_respawn_dropped_after_leaving_play() {
        let mut game = in_level(one_slot_settings());
        press(&mut game, TickInput::default());
        game.request_respawn(1, 3.0);

        run(&mut game, &TickInput::default(), 1.0);
        press(
            &mut game,
            TickInput {
                pause: true,
                ..Default::default()
            },
        );
        run(&mut game, &TickInput::default(), 5.0);
        assert_eq!(game.population().len(), 1);
        assert_eq!(game.timers().pending_count(Owner::Population), 0);

        // Resuming does not bring the dropped request back
        press(
            &mut game,
            TickInput {
                pause: true,
                ..Default::default()
            },
        );
        run(&mut game, &TickInput::default(), 5.0);
        assert_eq!(game.population().len(), 1);
    }

    #[test]
    fn test_bullet_time_stretches_respawn_delay() {
        let mut game = in_level(one_slot_settings());
        press(&mut game, TickInput::default());
        assert_eq!(game.population().len(), 1);

        press(
            &mut game,
            TickInput {
                bullet_time: true,
                ..Default::default()
            },
        );
        assert!(game.session().is_bullet_time_active());
        game.request_respawn(1, 3.0);

        // 3.5 real seconds at x0.2 is well short of 3 game seconds
        run(&mut game, &TickInput::default(), 3.5);
        assert_eq!(game.population().len(), 1);
        assert_eq!(game.timers().pending_count(Owner::Population), 1);

        // 10 s of bullet time gives 2 game seconds, the last one runs at full speed
        run(&mut game, &TickInput::default(), 9.0);
        assert!(!game.session().is_bullet_time_active());
        assert_eq!(game.population().len(), 2);
    }

    struct Blocked;

    impl ObstacleQuery for Blocked {
        fn line_clear(&self, _from: Vec2, _to: Vec2) -> bool {
            false
        }

        fn disc_overlaps_obstacle(&self, _p: Vec2, _r: f32) -> bool {
            true
        }
    }

    #[test]
    fn test_injected_obstacles_drive_placement() {
        let mut game = Game::new(Settings::default(), 3).with_obstacles(Box::new(Blocked));
        game.load_scene(Scene::Level(Level::One));
        run(&mut game, &TickInput::default(), 1.0);
        assert!(game.population().is_empty());

        let mut open = in_level(Settings::default());
        run(&mut open, &TickInput::default(), 1.0);
        assert!(!open.population().is_empty());
    }

    #[test]
    fn test_reload_cancels_pending_work() {
        let mut game = in_level(Settings::default());
        run(&mut game, &TickInput::default(), 0.5);
        press(
            &mut game,
            TickInput {
                bullet_time: true,
                ..Default::default()
            },
        );
        game.request_respawn(1, 3.0);
        assert!(game.timers().pending_count(Owner::Session) > 0);

        game.load_scene(Scene::Level(Level::One));
        assert_eq!(game.timers().pending_count(Owner::Session), 0);
        assert_eq!(game.timers().pending_count(Owner::Population), 0);
        assert!(game.population().is_empty());
        assert_eq!(game.clock().scale(), 1.0);
        assert!(!game.session().bullet_time().used_this_level);
    }

    #[test]
    fn test_back_pauses_then_quits() {
        let mut game = in_level(Settings::default());
        let back = TickInput {
            back: true,
            ..Default::default()
        };
        press(&mut game, back.clone());
        assert_eq!(game.session().current_state(), SessionState::Pause);
        assert!(!game.quit_requested());

        press(&mut game, back);
        assert!(game.quit_requested());
        assert!(game.drain_events().contains(&GameEvent::QuitRequested));
    }

    #[test]
    fn test_score_matches_captures() {
        let mut game = in_level(Settings::default());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        run(&mut game, &input, 30.0);

        let captured: u32 = game
            .drain_events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::Captured { kind, .. } => Some(kind.score_value()),
                _ => None,
            })
            .sum();
        assert_eq!(game.session().score(), captured);
        assert!(game.population().len() <= game.population().cap());
    }

    #[test]
    fn test_level_ends_at_countdown() {
        let mut settings = Settings::default();
        settings.countdown.start_seconds = 2.0;
        let mut game = in_level(settings);
        run(&mut game, &TickInput::default(), 2.5);
        assert_eq!(game.session().current_state(), SessionState::TimesUp);

        press(
            &mut game,
            TickInput {
                reload: true,
                ..Default::default()
            },
        );
        assert_eq!(game.session().current_state(), SessionState::Play);
        assert_eq!(game.session().countdown_remaining(), 2.0);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut a = in_level(Settings::default());
        let mut b = in_level(Settings::default());
        run(&mut a, &input, 10.0);
        run(&mut b, &input, 10.0);

        assert_eq!(a.session().score(), b.session().score());
        assert_eq!(a.population().live(), b.population().live());
        assert_eq!(a.rod().angle(), b.rod().angle());
    }

    struct Recorder(Rc<RefCell<Vec<GameEvent>>>);

    impl Feedback for Recorder {
        fn notify(&mut self, event: &GameEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_events_reach_feedback_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut game = Game::new(Settings::default(), 7)
            .with_feedback(Box::new(Recorder(Rc::clone(&seen))));
        game.load_scene(Scene::Level(Level::One));
        run(&mut game, &TickInput::default(), 0.5);

        let drained = game.drain_events();
        assert_eq!(*seen.borrow(), drained);
        assert!(seen.borrow().iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
    }
}
