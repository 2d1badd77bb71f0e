pub mod config;
pub mod error;
pub mod types;

pub use config::SessionConfig;
pub use error::{GreenshoeError, Result};
pub use types::{Action, MarketPhase, Round, ScenarioKind, SessionId};
