//! Delayed continuations
//!
//! Every "wait, then do X" in the game is a pending entry here, advanced
//! once per tick. Entries are tagged with the component that owns them so a
//! level load can drop them all at once.

/// Handle returned by [`Timers::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Which clock a timer counts down on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDomain {
    /// Unaffected by bullet time
    Real,
    /// Stretched by bullet time
    Game,
}

/// Component that scheduled a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Session,
    Population,
}

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    EndBulletTime,
    /// One step of the bullet-time warning flicker
    Flicker { step: u32 },
    Respawn,
}

#[derive(Debug, Clone)]
struct Pending {
    id: TimerId,
    owner: Owner,
    domain: ClockDomain,
    remaining: f32,
    action: TimerAction,
}

/// A fired timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub owner: Owner,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    pending: Vec<Pending>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        owner: Owner,
        domain: ClockDomain,
        delay: f32,
        action: TimerAction,
    ) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(Pending {
            id,
            owner,
            domain,
            remaining: delay.max(0.0),
            action,
        });
        id
    }

    /// Drop a pending timer; false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer of `owner`, returning how many were dropped
    pub fn cancel_owner(&mut self, owner: Owner) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.owner != owner);
        before - self.pending.len()
    }

    /// Count down all timers and return those that expired, in schedule order
    pub fn advance(&mut self, real_dt: f32, game_dt: f32) -> Vec<Fired> {
        let mut fired = Vec::new();
        self.pending.retain_mut(|p| {
            p.remaining -= match p.domain {
                ClockDomain::Real => real_dt,
                ClockDomain::Game => game_dt,
            };
            if p.remaining <= 0.0 {
                fired.push(Fired {
                    id: p.id,
                    owner: p.owner,
                    action: p.action,
                });
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending_count(&self, owner: Owner) -> usize {
        self.pending.iter().filter(|p| p.owner == owner).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut timers = Timers::new();
        let id = timers.schedule(
            Owner::Session,
            ClockDomain::Real,
            1.0,
            TimerAction::EndBulletTime,
        );

        assert!(timers.advance(0.6, 0.0).is_empty());
        let fired = timers.advance(0.6, 0.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].action, TimerAction::EndBulletTime);
        assert!(!timers.is_pending(id));
    }

    #[test]
    fn test_domains_use_their_clock() {
        let mut timers = Timers::new();
        timers.schedule(Owner::Session, ClockDomain::Real, 1.0, TimerAction::EndBulletTime);
        timers.schedule(Owner::Population, ClockDomain::Game, 1.0, TimerAction::Respawn);

        // Slowed game clock: real timer fires, game timer does not
        let fired = timers.advance(1.0, 0.2);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].owner, Owner::Session);
        assert_eq!(timers.pending_count(Owner::Population), 1);
    }

    #[test]
    fn test_cancel_owner_leaves_others() {
        let mut timers = Timers::new();
        timers.schedule(Owner::Session, ClockDomain::Real, 1.0, TimerAction::EndBulletTime);
        timers.schedule(Owner::Population, ClockDomain::Game, 3.0, TimerAction::Respawn);
        timers.schedule(Owner::Population, ClockDomain::Game, 3.0, TimerAction::Respawn);

        assert_eq!(timers.cancel_owner(Owner::Population), 2);
        assert_eq!(timers.pending_count(Owner::Session), 1);
        assert!(timers.advance(5.0, 5.0).iter().all(|f| f.owner == Owner::Session));
    }

    #[test]
    fn test_cancel_single() {
        let mut timers = Timers::new();
        let id = timers.schedule(
            Owner::Session,
            ClockDomain::Real,
            1.0,
            TimerAction::Flicker { step: 0 },
        );
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(2.0, 2.0).is_empty());
    }
}
