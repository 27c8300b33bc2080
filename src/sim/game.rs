//! Top-level game
//!
//! Owns the clock, the timer queue and the three gameplay components, and
//! wires them together. Collaborators (record store, feedback sink, obstacle
//! layer) are injected at construction.

use super::clock::GameClock;
use super::level::{Level, Scene};
use super::obstacle::{ObstacleField, ObstacleQuery};
use super::population::PopulationManager;
use super::rod::FishingRod;
use super::session::{Session, SessionCtx};
use super::state::{EntityId, GameEvent};
use super::timers::{TimerId, Timers};
use crate::audio::Feedback;
use crate::records::ScoreStore;
use crate::settings::Settings;

pub struct Game {
    pub(super) scene: Scene,
    pub(super) settings: Settings,
    pub(super) clock: GameClock,
    pub(super) timers: Timers,
    pub(super) session: Session,
    pub(super) population: PopulationManager,
    pub(super) rod: FishingRod,
    pub(super) obstacles: Box<dyn ObstacleQuery>,
    pub(super) events: Vec<GameEvent>,
    /// Events already handed to `feedback`
    pub(super) dispatched: usize,
    pub(super) feedback: Option<Box<dyn Feedback>>,
    pub(super) quit_requested: bool,
    pub(super) time_ticks: u64,
}

impl Game {
    /// New game on the tutorial screen
    pub fn new(settings: Settings, seed: u64) -> Self {
        let session = Session::new(Level::One, settings.bullet_time, &settings.countdown, None);
        let population = PopulationManager::new(&settings.spawner, seed);
        let rod = FishingRod::new(settings.rod);
        let obstacles = Box::new(ObstacleField::new(settings.obstacles.clone()));

        Self {
            scene: Scene::Tutorial,
            settings,
            clock: GameClock::new(),
            timers: Timers::new(),
            session,
            population,
            rod,
            obstacles,
            events: Vec::new(),
            dispatched: 0,
            feedback: None,
            quit_requested: false,
            time_ticks: 0,
        }
    }

    pub fn with_store(mut self, store: Box<dyn ScoreStore>) -> Self {
        self.session.attach_store(store);
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn Feedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Replace the obstacle layer built from settings
    pub fn with_obstacles(mut self, obstacles: Box<dyn ObstacleQuery>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    pub fn rod(&self) -> &FishingRod {
        &self.rod
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.flush();
        self.dispatched = 0;
        std::mem::take(&mut self.events)
    }

    /// Switch scenes. Pending session and population work is cancelled, not run.
    pub fn load_scene(&mut self, scene: Scene) {
        log::info!("Loading scene {}", scene.name());

        let mut ctx = SessionCtx {
            clock: &mut self.clock,
            timers: &mut self.timers,
            events: &mut self.events,
        };
        match scene.level() {
            Some(level) => self.session.load_level(level, &mut ctx),
            None => self.session.unload(&mut ctx),
        }
        self.population.reset(&mut self.timers);
        self.rod.reset();

        self.scene = scene;
        self.events.push(GameEvent::SceneLoaded { scene });
        self.flush();
    }

    /// Schedule one replacement spawn after `delay` seconds of game time
    pub fn request_respawn(&mut self, entity: EntityId, delay: f32) -> TimerId {
        self.population.request_respawn(entity, delay, &mut self.timers)
    }

    pub(super) fn request_quit(&mut self) {
        if !self.quit_requested {
            log::info!("Quit requested from {}", self.scene.name());
            self.quit_requested = true;
            self.events.push(GameEvent::QuitRequested);
        }
    }

    /// Hand undispatched events to the feedback sink
    pub(super) fn flush(&mut self) {
        if let Some(feedback) = self.feedback.as_mut() {
            for event in &self.events[self.dispatched..] {
                feedback.notify(event);
            }
        }
        self.dispatched = self.events.len();
    }
}
