//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Caller-supplied time steps, real and scaled clocks
//! - Seeded RNG only
//! - Delayed work goes through the timer queue, never wall-clock waits
//! - No rendering or platform dependencies

pub mod area;
pub mod clock;
pub mod game;
pub mod level;
pub mod obstacle;
pub mod population;
pub mod rod;
pub mod session;
pub mod state;
pub mod tick;
pub mod timers;

pub use area::AreaShape;
pub use clock::GameClock;
pub use game::Game;
pub use level::{Level, Scene};
pub use obstacle::{NoObstacles, Obstacle, ObstacleField, ObstacleQuery};
pub use population::{PopulationManager, SpawnConfigIssue, SpawnEntry, pick_weighted};
pub use rod::{FishingRod, RodPhase};
pub use session::{Session, SessionCommand};
pub use state::{Collectible, CollectibleKind, EntityId, GameEvent, SessionState};
pub use tick::TickInput;
pub use timers::{ClockDomain, Owner, TimerAction, TimerId, Timers};
