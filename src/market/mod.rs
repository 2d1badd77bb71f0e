//! Market rules - scenarios, resources, price and round resolution
//!
//! Nothing here knows about time or rounds in flight. The session layer
//! decides when a round resolves; this layer decides what happens when it does.

pub mod constants;
pub mod ledger;
pub mod price;
pub mod resolver;
pub mod scenario;

pub use ledger::{Charge, ResourceLedger};
pub use price::{PricePoint, PriceTrack};
pub use resolver::{price_impact, resolve, Classification, RoundOutcome};
pub use scenario::{
    CatalogDraw, Scenario, ScenarioCatalog, ScenarioSource, ScenarioTemplate, ScriptedScenarios,
};
