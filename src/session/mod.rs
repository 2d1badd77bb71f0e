//! Session layer - clock, scheduler, scoring and the GameSession aggregate
//!
//! Round lifecycle: scheduler opens a round -> scenario drawn -> clock runs
//! -> decision or timeout -> resolver -> scoring -> feedback -> next round.

pub mod clock;
pub mod events;
pub mod game;
pub mod scheduler;
pub mod scoring;
pub mod summary;

pub use clock::DecisionClock;
pub use events::{EventSink, NullSink, SessionEvent};
pub use game::GameSession;
pub use scheduler::{RoundScheduler, RoundStart, SchedulerState};
pub use scoring::{CategoryRatings, CategoryScores, FinalScores, Rank, Rating, ScoreAccumulator};
pub use summary::{award_badges, Badge, FinalSummary, SessionSnapshot};
