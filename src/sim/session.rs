//! Session state machine
//!
//! Owns score, the win threshold, the level countdown and the one-shot
//! bullet-time ability, and drives the Play/Pause/TimesUp/Win lifecycle.
//!
//! Invariants:
//! - bullet time is never active outside Play; every exit from Play ends it
//!   before anything else observes the new state
//! - bullet time can be used once per level load
//! - the music filter is requested only on an actual change

use super::clock::GameClock;
use super::level::Level;
use super::state::{GameEvent, SessionState};
use super::tick::TickInput;
use super::timers::{ClockDomain, Owner, TimerAction, TimerId, Timers};
use crate::consts::{FLICKER_COUNT, FLICKER_START_FRACTION, NORMAL_TIME_SCALE, TIME_ATTACK_KEY};
use crate::records::ScoreStore;
use crate::settings::{BulletTimeSettings, CountdownSettings};

/// Shared services the session mutates
pub struct SessionCtx<'a> {
    pub clock: &'a mut GameClock,
    pub timers: &'a mut Timers,
    pub events: &'a mut Vec<GameEvent>,
}

/// Requests the session hands back to the game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    None,
    Reload,
    Advance,
    Quit,
}

/// Bullet-time ability state
#[derive(Debug, Clone, Default)]
pub struct BulletTime {
    pub active: bool,
    pub used_this_level: bool,
    /// Freezes the level countdown for the whole effect
    pub timer_paused: bool,
    /// Real seconds left
    pub remaining: f32,
    duration: f32,
    end_timer: Option<TimerId>,
    flicker_timer: Option<TimerId>,
}

/// Level countdown
#[derive(Debug, Clone)]
pub struct Countdown {
    start: f32,
    warning_at: f32,
    remaining: f32,
    warned: bool,
    ended: bool,
}

impl Countdown {
    pub fn new(settings: &CountdownSettings) -> Self {
        Self {
            start: settings.start_seconds,
            warning_at: settings.warning_seconds,
            remaining: settings.start_seconds,
            warned: false,
            ended: false,
        }
    }

    fn reset(&mut self) {
        self.remaining = self.start;
        self.warned = false;
        self.ended = false;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// `MM:SS`, seconds rounded up
    pub fn display(&self) -> String {
        let mut minutes = (self.remaining / 60.0).floor() as u32;
        let mut seconds = (self.remaining % 60.0).ceil() as u32;
        if seconds == 60 {
            seconds = 0;
            minutes += 1;
        }
        format!("{minutes:02}:{seconds:02}")
    }
}

pub struct Session {
    level: Level,
    state: SessionState,
    score: u32,
    threshold: u32,
    score_ratio: f32,
    bullet: BulletTime,
    countdown: Countdown,
    filter_on: bool,
    tuning: BulletTimeSettings,
    store: Option<Box<dyn ScoreStore>>,
}

impl Session {
    pub fn new(
        level: Level,
        bullet_time: BulletTimeSettings,
        countdown: &CountdownSettings,
        store: Option<Box<dyn ScoreStore>>,
    ) -> Self {
        let mut session = Self {
            level,
            state: SessionState::Play,
            score: 0,
            threshold: 0,
            score_ratio: 0.0,
            bullet: BulletTime::default(),
            countdown: Countdown::new(countdown),
            filter_on: false,
            tuning: bullet_time,
            store,
        };
        session.threshold = session.initial_threshold();
        session
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn current_state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// score / threshold clamped to [0, 1], for music intensity
    pub fn score_ratio(&self) -> f32 {
        self.score_ratio
    }

    pub fn bullet_time(&self) -> &BulletTime {
        &self.bullet
    }

    pub fn is_bullet_time_active(&self) -> bool {
        self.bullet.active
    }

    pub fn swing_factor(&self) -> f32 {
        self.tuning.swing_factor
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn countdown_remaining(&self) -> f32 {
        self.countdown.remaining
    }

    pub fn is_filter_on(&self) -> bool {
        self.filter_on
    }

    pub fn record_store(&self) -> Option<&dyn ScoreStore> {
        self.store.as_deref()
    }

    /// Use `store` for the speed-run record from now on
    pub fn attach_store(&mut self, store: Box<dyn ScoreStore>) {
        self.store = Some(store);
        self.threshold = self.initial_threshold();
    }

    fn best_score(&self) -> u32 {
        self.store
            .as_ref()
            .map(|s| s.best_score(TIME_ATTACK_KEY))
            .unwrap_or(0)
    }

    fn initial_threshold(&self) -> u32 {
        self.level
            .fixed_threshold()
            .unwrap_or_else(|| self.best_score())
    }

    /// Apply one tick of player input
    pub fn handle_input(&mut self, input: &TickInput, ctx: &mut SessionCtx) -> SessionCommand {
        match self.state {
            SessionState::Play => {
                if input.pause || input.back {
                    self.set_state(SessionState::Pause, ctx);
                }
                if input.bullet_time {
                    self.activate_bullet_time(self.tuning.duration, ctx);
                }
                SessionCommand::None
            }
            SessionState::Pause => {
                if input.pause {
                    self.set_state(SessionState::Play, ctx);
                    SessionCommand::None
                } else if input.back {
                    SessionCommand::Quit
                } else {
                    SessionCommand::None
                }
            }
            SessionState::TimesUp => {
                if input.reload {
                    SessionCommand::Reload
                } else if input.back {
                    SessionCommand::Quit
                } else {
                    SessionCommand::None
                }
            }
            SessionState::Win => {
                if input.reload {
                    SessionCommand::Reload
                } else if input.advance {
                    SessionCommand::Advance
                } else if input.back {
                    SessionCommand::Quit
                } else {
                    SessionCommand::None
                }
            }
        }
    }

    /// Advance the countdown and bullet-time bookkeeping by this tick
    pub fn update(&mut self, ctx: &mut SessionCtx) {
        if self.bullet.active {
            self.bullet.remaining = (self.bullet.remaining - ctx.clock.unscaled_elapsed()).max(0.0);
        }

        if self.state == SessionState::TimesUp {
            self.recheck_win(ctx);
        }

        if self.bullet.timer_paused || self.state != SessionState::Play || self.countdown.ended {
            return;
        }

        let dt = ctx.clock.scaled_elapsed();
        self.countdown.remaining = (self.countdown.remaining - dt).clamp(0.0, self.countdown.start);

        if !self.countdown.warned && self.countdown.remaining <= self.countdown.warning_at {
            self.countdown.warned = true;
            ctx.events.push(GameEvent::CountdownWarning);
        }

        if self.countdown.remaining <= 0.0 {
            self.countdown.ended = true;
            self.check_end_condition(ctx);
        }
    }

    /// Countdown expired: decide TimesUp or Win
    pub fn check_end_condition(&mut self, ctx: &mut SessionCtx) {
        if self.level.is_time_attack() {
            let previous = self.best_score();
            let beat_record = self.score > previous;

            if beat_record {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.set_best_score(TIME_ATTACK_KEY, self.score) {
                        log::error!("Failed to persist speed-run record: {e}");
                    }
                }
                log::info!("New speed-run record: {} (was {previous})", self.score);
                ctx.events.push(GameEvent::RecordBeaten {
                    previous,
                    score: self.score,
                });
            }

            self.threshold = previous.max(self.score);
            ctx.events.push(GameEvent::ThresholdChanged {
                threshold: self.threshold,
            });

            let next = if beat_record {
                SessionState::Win
            } else {
                SessionState::TimesUp
            };
            self.set_state(next, ctx);
        } else if self.score >= self.threshold {
            self.set_state(SessionState::Win, ctx);
        } else {
            self.set_state(SessionState::TimesUp, ctx);
        }
    }

    /// TimesUp turns into Win once the score meets the displayed threshold
    fn recheck_win(&mut self, ctx: &mut SessionCtx) {
        if self.score >= self.threshold {
            self.set_state(SessionState::Win, ctx);
        }
    }

    pub fn add_score(&mut self, amount: u32, ctx: &mut SessionCtx) {
        self.score = self.score.saturating_add(amount);
        if self.threshold > 0 {
            self.score_ratio = (self.score as f32 / self.threshold as f32).clamp(0.0, 1.0);
        }
        ctx.events.push(GameEvent::ScoreChanged {
            score: self.score,
            ratio: self.score_ratio,
        });

        if self.state == SessionState::TimesUp {
            self.recheck_win(ctx);
        }
    }

    pub fn pause(&mut self, ctx: &mut SessionCtx) {
        if self.state == SessionState::Play {
            self.set_state(SessionState::Pause, ctx);
        }
    }

    pub fn resume(&mut self, ctx: &mut SessionCtx) {
        if self.state == SessionState::Pause {
            self.set_state(SessionState::Play, ctx);
        }
    }

    fn set_state(&mut self, to: SessionState, ctx: &mut SessionCtx) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        log::info!("{}: {} -> {}", self.level.name(), from.as_str(), to.as_str());

        if to != SessionState::Play && self.bullet.active {
            self.force_end_bullet_time(ctx);
        }
        self.apply_filter(ctx);
        ctx.events.push(GameEvent::StateChanged { from, to });
    }

    fn apply_filter(&mut self, ctx: &mut SessionCtx) {
        let want = self.state != SessionState::Play;
        if want == self.filter_on {
            return;
        }
        self.filter_on = want;
        ctx.events.push(if want {
            GameEvent::FilterOn
        } else {
            GameEvent::FilterOff
        });
    }

    /// Start bullet time; a no-op outside Play, while active, or once used
    pub fn activate_bullet_time(&mut self, duration: f32, ctx: &mut SessionCtx) -> bool {
        if self.state != SessionState::Play || self.bullet.active || self.bullet.used_this_level {
            return false;
        }
        let duration = duration.max(0.0);

        self.bullet.used_this_level = true;
        self.bullet.active = true;
        self.bullet.timer_paused = true;
        self.bullet.remaining = duration;
        self.bullet.duration = duration;

        ctx.clock.set_scale(self.tuning.slow_factor);
        self.bullet.end_timer = Some(ctx.timers.schedule(
            Owner::Session,
            ClockDomain::Real,
            duration,
            TimerAction::EndBulletTime,
        ));
        self.bullet.flicker_timer = Some(ctx.timers.schedule(
            Owner::Session,
            ClockDomain::Real,
            duration * FLICKER_START_FRACTION,
            TimerAction::Flicker { step: 0 },
        ));

        log::info!("Bullet time for {duration:.1}s at x{}", self.tuning.slow_factor);
        ctx.events.push(GameEvent::BulletTimeStarted { duration });
        ctx.events.push(GameEvent::BulletTimeHighlight { on: true });
        true
    }

    /// End bullet time now; a no-op when inactive
    pub fn force_end_bullet_time(&mut self, ctx: &mut SessionCtx) {
        if !self.bullet.active {
            return;
        }
        for id in [self.bullet.end_timer.take(), self.bullet.flicker_timer.take()]
            .into_iter()
            .flatten()
        {
            ctx.timers.cancel(id);
        }

        ctx.clock.set_scale(NORMAL_TIME_SCALE);
        self.bullet.timer_paused = false;
        self.bullet.active = false;
        self.bullet.remaining = 0.0;

        log::info!("Bullet time over");
        ctx.events.push(GameEvent::BulletTimeEnded);
        ctx.events.push(GameEvent::BulletTimeHighlight { on: false });
    }

    /// A session-owned timer fired
    pub fn on_timer(&mut self, action: TimerAction, ctx: &mut SessionCtx) {
        match action {
            TimerAction::EndBulletTime => {
                self.bullet.end_timer = None;
                self.force_end_bullet_time(ctx);
            }
            TimerAction::Flicker { step } => {
                self.bullet.flicker_timer = None;
                if !self.bullet.active {
                    return;
                }
                let steps = FLICKER_COUNT * 2;
                if step < steps {
                    ctx.events.push(GameEvent::BulletTimeHighlight { on: step % 2 == 0 });
                    let interval =
                        self.bullet.duration * (1.0 - FLICKER_START_FRACTION) / steps as f32;
                    self.bullet.flicker_timer = Some(ctx.timers.schedule(
                        Owner::Session,
                        ClockDomain::Real,
                        interval,
                        TimerAction::Flicker { step: step + 1 },
                    ));
                } else {
                    ctx.events.push(GameEvent::BulletTimeHighlight { on: true });
                }
            }
            TimerAction::Respawn => {
                log::warn!("Session received a respawn timer, ignoring");
            }
        }
    }

    /// (Re)start `level`: score, threshold, ability and countdown reset
    pub fn load_level(&mut self, level: Level, ctx: &mut SessionCtx) {
        self.unload(ctx);

        self.level = level;
        self.score = 0;
        self.score_ratio = 0.0;
        self.bullet = BulletTime::default();
        self.countdown.reset();
        self.threshold = self.initial_threshold();
        log::info!("Win/target threshold for {}: {}", level.name(), self.threshold);

        let from = self.state;
        self.state = SessionState::Play;
        if from != SessionState::Play {
            ctx.events.push(GameEvent::StateChanged {
                from,
                to: SessionState::Play,
            });
        }
        self.apply_filter(ctx);

        ctx.events.push(GameEvent::ThresholdChanged {
            threshold: self.threshold,
        });
        ctx.events.push(GameEvent::ScoreChanged {
            score: 0,
            ratio: 0.0,
        });
    }

    /// Stop everything the session has in flight (level unload)
    pub fn unload(&mut self, ctx: &mut SessionCtx) {
        self.force_end_bullet_time(ctx);
        let dropped = ctx.timers.cancel_owner(Owner::Session);
        if dropped > 0 {
            log::debug!("Cancelled {dropped} session timer(s)");
        }
        self.bullet.end_timer = None;
        self.bullet.flicker_timer = None;
    }

    /// Forget the speed-run record
    pub fn reset_time_attack_record(&mut self, ctx: &mut SessionCtx) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.clear(TIME_ATTACK_KEY) {
                log::error!("Failed to reset speed-run record: {e}");
                return;
            }
        }
        log::info!("SpeedRun high score reset.");

        if self.level.is_time_attack() {
            self.threshold = 0;
            self.score_ratio = 0.0;
            ctx.events.push(GameEvent::ThresholdChanged { threshold: 0 });
            ctx.events.push(GameEvent::ScoreChanged {
                score: self.score,
                ratio: 0.0,
            });
        }
    }
}
