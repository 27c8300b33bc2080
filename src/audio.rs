//! Audio cue routing
//!
//! The simulation never talks to a sound engine directly. It emits
//! [`GameEvent`]s, and a [`Feedback`] sink turns the ones it cares about into
//! named cues for whatever middleware is attached.

use crate::sim::state::GameEvent;

/// Receiver of fire-and-forget game notifications
pub trait Feedback {
    fn notify(&mut self, event: &GameEvent);
}

/// Named audio events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Line cast
    Cast,
    /// Something was hooked
    Catch,
    /// Last seconds of the countdown
    Countdown,
    /// Muffle the music (any state but Play)
    PauseFilter,
    ResetPauseFilter,
}

impl SoundCue {
    /// Event name as known to the sound bank
    pub fn event_name(&self) -> &'static str {
        match self {
            SoundCue::Cast => "Play_SFX_Cast",
            SoundCue::Catch => "Play_SFX_Catch",
            SoundCue::Countdown => "Play_Countdown",
            SoundCue::PauseFilter => "PauseFilter_MX",
            SoundCue::ResetPauseFilter => "ResetPauseFilter_MX",
        }
    }
}

/// Game parameter driving music intensity
pub const SCORE_RATIO_PARAM: &str = "ScoreRatio";

/// Event-to-cue mapper
///
/// Posted cues are kept until taken so a host (or a test) can forward them,
/// unless the bus was built with [`AudioBus::log_only`].
#[derive(Debug)]
pub struct AudioBus {
    muted: bool,
    filter_on: bool,
    score_ratio: f32,
    keep_posted: bool,
    posted: Vec<SoundCue>,
}

impl Default for AudioBus {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBus {
    pub fn new() -> Self {
        Self {
            muted: false,
            filter_on: false,
            score_ratio: 0.0,
            keep_posted: true,
            posted: Vec::new(),
        }
    }

    /// Bus for hosts with no sound engine: cues are logged, never queued
    pub fn log_only() -> Self {
        Self {
            keep_posted: false,
            ..Self::new()
        }
    }

    /// Mute/unmute cue posting; parameters keep tracking
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_filter_on(&self) -> bool {
        self.filter_on
    }

    /// Current value of [`SCORE_RATIO_PARAM`], 0 - 100
    pub fn score_ratio_param(&self) -> f32 {
        self.score_ratio
    }

    pub fn take_posted(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.posted)
    }

    /// Post a cue
    pub fn post(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        log::debug!("[Audio] {}", cue.event_name());
        if self.keep_posted {
            self.posted.push(cue);
        }
    }

    fn set_filter(&mut self, on: bool) {
        if self.filter_on == on {
            return;
        }
        self.filter_on = on;
        self.post(if on {
            SoundCue::PauseFilter
        } else {
            SoundCue::ResetPauseFilter
        });
    }

    fn set_score_ratio(&mut self, ratio: f32) {
        self.score_ratio = ratio.clamp(0.0, 1.0) * 100.0;
        log::trace!("[Audio] {SCORE_RATIO_PARAM} = {:.1}", self.score_ratio);
    }
}

impl Feedback for AudioBus {
    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Cast => self.post(SoundCue::Cast),
            GameEvent::Captured { .. } => self.post(SoundCue::Catch),
            GameEvent::CountdownWarning => self.post(SoundCue::Countdown),
            GameEvent::FilterOn => self.set_filter(true),
            GameEvent::FilterOff => self.set_filter(false),
            GameEvent::ScoreChanged { ratio, .. } => self.set_score_ratio(*ratio),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CollectibleKind;

    #[test]
    fn test_events_map_to_cues() {
        let mut bus = AudioBus::new();
        bus.notify(&GameEvent::Cast);
        bus.notify(&GameEvent::Captured {
            entity: 1,
            kind: CollectibleKind::Star,
        });
        bus.notify(&GameEvent::CountdownWarning);
        bus.notify(&GameEvent::BulletTimeEnded);
        assert_eq!(
            bus.take_posted(),
            vec![SoundCue::Cast, SoundCue::Catch, SoundCue::Countdown]
        );
        assert_eq!(SoundCue::Catch.event_name(), "Play_SFX_Catch");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut bus = AudioBus::new();
        bus.notify(&GameEvent::FilterOn);
        bus.notify(&GameEvent::FilterOn);
        bus.notify(&GameEvent::FilterOff);
        bus.notify(&GameEvent::FilterOff);
        assert_eq!(
            bus.take_posted(),
            vec![SoundCue::PauseFilter, SoundCue::ResetPauseFilter]
        );
        assert!(!bus.is_filter_on());
    }

    #[test]
    fn test_score_ratio_param() {
        let mut bus = AudioBus::new();
        bus.notify(&GameEvent::ScoreChanged {
            score: 50,
            ratio: 0.25,
        });
        assert_eq!(bus.score_ratio_param(), 25.0);
    }

    #[test]
    fn test_log_only_keeps_nothing() {
        let mut bus = AudioBus::log_only();
        for _ in 0..100 {
            bus.notify(&GameEvent::Cast);
        }
        bus.notify(&GameEvent::FilterOn);
        assert!(bus.take_posted().is_empty());
        assert!(bus.is_filter_on());
    }

    #[test]
    fn test_muted_posts_nothing() {
        let mut bus = AudioBus::new();
        bus.set_muted(true);
        bus.notify(&GameEvent::Cast);
        bus.notify(&GameEvent::FilterOn);
        assert!(bus.take_posted().is_empty());
        assert!(bus.is_filter_on());
    }
}
