//! Runtime drivers - how a session meets time and players

pub mod autoplay;
pub mod driver;

pub use autoplay::{play_headless, reports_to_json, run_batch, BatchReport, Strategy};
pub use driver::{start_session, start_session_with_source, SessionHandle, DEFAULT_TICK};
