//! Scenario catalog: market-event templates and per-round draws
//!
//! Templates are authored tables. Randomness only enters when a template is
//! instantiated: its price move is sampled uniformly from the declared range.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{GreenshoeError, Result};
use crate::core::types::{Action, MarketPhase, ScenarioKind};
use crate::market::constants::AFTERMARKET_STABLE_REJECT_CHANCE;

/// A single round's market event with its sampled magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub title: String,
    pub description: String,
    /// Signed natural price move in percent
    pub price_move_percent: f64,
    pub correct_action: Action,
    /// Flavor weights carried from the template. Not used by resolution.
    pub right_reward: f64,
    pub wrong_penalty: f64,
}

impl Scenario {
    pub fn new(
        kind: ScenarioKind,
        title: impl Into<String>,
        description: impl Into<String>,
        price_move_percent: f64,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            price_move_percent,
            correct_action: kind.correct_action(),
            right_reward: 1.0,
            wrong_penalty: 1.0,
        }
    }

    /// Neutral scenario used when no template is available
    pub fn flat() -> Self {
        Self::new(
            ScenarioKind::Stable,
            "Quiet Tape",
            "Nothing on the wires. The book is balanced.",
            0.0,
        )
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Author-defined scenario template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    pub kind: ScenarioKind,
    pub title: String,
    pub description: String,
    /// Inclusive [min, max] range of the signed price move in percent
    pub move_range: [f64; 2],
    #[serde(default = "default_weight")]
    pub right_reward: f64,
    #[serde(default = "default_weight")]
    pub wrong_penalty: f64,
}

impl ScenarioTemplate {
    pub fn new(kind: ScenarioKind, title: &str, description: &str, min: f64, max: f64) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            move_range: [min, max],
            right_reward: 1.0,
            wrong_penalty: 1.0,
        }
    }

    /// Sample a concrete scenario from this template
    pub fn instantiate<R: Rng + ?Sized>(&self, rng: &mut R) -> Scenario {
        let [a, b] = self.move_range;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let price_move_percent = if lo == hi { lo } else { rng.gen_range(lo..=hi) };

        Scenario {
            kind: self.kind,
            title: self.title.clone(),
            description: self.description.clone(),
            price_move_percent,
            correct_action: self.kind.correct_action(),
            right_reward: self.right_reward,
            wrong_penalty: self.wrong_penalty,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let [min, max] = self.move_range;
        if !(min.is_finite() && max.is_finite()) {
            return Err(format!("'{}': move_range must be finite", self.title));
        }
        if min > max {
            return Err(format!(
                "'{}': move_range [{}, {}] is inverted",
                self.title, min, max
            ));
        }
        match self.kind {
            ScenarioKind::Rising if min <= 0.0 => Err(format!(
                "'{}': rising scenarios need a strictly positive move_range",
                self.title
            )),
            ScenarioKind::Falling if max >= 0.0 => Err(format!(
                "'{}': falling scenarios need a strictly negative move_range",
                self.title
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    scenario: Vec<ScenarioTemplate>,
}

/// Fixed table of scenario templates with phase-based filtering
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCatalog {
    templates: Vec<ScenarioTemplate>,
}

impl ScenarioCatalog {
    /// Build a catalog from templates, validating each one
    pub fn from_templates(templates: Vec<ScenarioTemplate>) -> Result<Self> {
        for template in &templates {
            template.validate().map_err(GreenshoeError::InvalidCatalog)?;
        }
        Ok(Self { templates })
    }

    /// Parse `[[scenario]]` tables from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_templates(file.scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The stock catalog: three templates per kind
    pub fn builtin() -> Self {
        use ScenarioKind::*;

        let templates = vec![
            ScenarioTemplate::new(
                Rising,
                "Oversubscribed Book",
                "Orders are 20x covered and hedge funds chase the open.",
                3.0,
                7.0,
            ),
            ScenarioTemplate::new(
                Rising,
                "Momentum Funds Pile In",
                "Trend followers spot the breakout and pile into the tape.",
                4.0,
                8.0,
            ),
            ScenarioTemplate::new(
                Rising,
                "Analyst Upgrade",
                "A bulge-bracket desk initiates coverage with a Buy rating.",
                2.0,
                5.0,
            ),
            ScenarioTemplate::new(
                Falling,
                "Flippers Dump Allocation",
                "Fast-money accounts sell their allocation on the first print.",
                -5.0,
                -2.0,
            ),
            ScenarioTemplate::new(
                Falling,
                "Sector Selloff",
                "A peer misses earnings and the whole sector gaps lower.",
                -8.0,
                -4.0,
            ),
            ScenarioTemplate::new(
                Falling,
                "Lockup Whispers",
                "Rumors spread that insiders want out early.",
                -7.0,
                -3.0,
            ),
            ScenarioTemplate::new(
                Stable,
                "Balanced Book",
                "Buyers and sellers are matched. The price holds its band.",
                -0.8,
                0.8,
            ),
            ScenarioTemplate::new(
                Stable,
                "Lunch Lull",
                "Volume dries up while the desks step away.",
                -0.5,
                0.5,
            ),
            ScenarioTemplate::new(
                Stable,
                "Quiet Tape",
                "Nothing on the wires. Long-only funds hold their positions.",
                -1.0,
                1.0,
            ),
        ];

        Self { templates }
    }

    pub fn templates(&self) -> &[ScenarioTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates eligible in a phase. Falls back to the whole catalog when the
    /// phase filter leaves nothing.
    pub fn pool_for(&self, phase: MarketPhase) -> Vec<&ScenarioTemplate> {
        let pool: Vec<&ScenarioTemplate> = match phase {
            MarketPhase::BookbuildingRush => self
                .templates
                .iter()
                .filter(|t| t.kind != ScenarioKind::Falling)
                .collect(),
            MarketPhase::FirstPrint | MarketPhase::AftermarketWave => {
                self.templates.iter().collect()
            }
        };

        if pool.is_empty() {
            self.templates.iter().collect()
        } else {
            pool
        }
    }

    /// Draw and instantiate a scenario for the given phase
    pub fn pick_scenario<R: Rng + ?Sized>(&self, phase: MarketPhase, rng: &mut R) -> Scenario {
        let pool = self.pool_for(phase);

        let Some(mut template) = pool.choose(rng).copied() else {
            return Scenario::flat();
        };

        if phase == MarketPhase::AftermarketWave
            && template.kind == ScenarioKind::Stable
            && rng.gen_bool(AFTERMARKET_STABLE_REJECT_CHANCE)
        {
            if let Some(redraw) = pool.choose(rng).copied() {
                template = redraw;
            }
        }

        template.instantiate(rng)
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Supplies the scenario for each round
pub trait ScenarioSource: Send {
    fn next_scenario(&mut self, phase: MarketPhase) -> Scenario;
}

/// Random draws from a catalog with a seeded generator
#[derive(Debug, Clone)]
pub struct CatalogDraw {
    catalog: ScenarioCatalog,
    rng: ChaCha8Rng,
}

impl CatalogDraw {
    pub fn new(catalog: ScenarioCatalog, rng: ChaCha8Rng) -> Self {
        Self { catalog, rng }
    }
}

impl ScenarioSource for CatalogDraw {
    fn next_scenario(&mut self, phase: MarketPhase) -> Scenario {
        self.catalog.pick_scenario(phase, &mut self.rng)
    }
}

/// A fixed script of scenarios, played in order. Exhausted scripts yield flat rounds.
#[derive(Debug, Clone, Default)]
pub struct ScriptedScenarios {
    queue: VecDeque<Scenario>,
}

impl ScriptedScenarios {
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            queue: scenarios.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ScenarioSource for ScriptedScenarios {
    fn next_scenario(&mut self, _phase: MarketPhase) -> Scenario {
        self.queue.pop_front().unwrap_or_else(Scenario::flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn kind_counts(catalog: &ScenarioCatalog, phase: MarketPhase, draws: usize) -> [usize; 3] {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut counts = [0; 3];
        for _ in 0..draws {
            match catalog.pick_scenario(phase, &mut rng).kind {
                ScenarioKind::Rising => counts[0] += 1,
                ScenarioKind::Falling => counts[1] += 1,
                ScenarioKind::Stable => counts[2] += 1,
            }
        }
        counts
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = ScenarioCatalog::builtin();
        assert!(ScenarioCatalog::from_templates(catalog.templates().to_vec()).is_ok());
        for kind in [ScenarioKind::Rising, ScenarioKind::Falling, ScenarioKind::Stable] {
            let n = catalog.templates().iter().filter(|t| t.kind == kind).count();
            assert!(n >= 3, "expected at least 3 {:?} templates, got {}", kind, n);
        }
    }

    #[test]
    fn test_bookbuilding_never_draws_falling() {
        let counts = kind_counts(&ScenarioCatalog::builtin(), MarketPhase::BookbuildingRush, 500);
        assert_eq!(counts[1], 0);
        assert!(counts[0] > 0 && counts[2] > 0);
    }

    #[test]
    fn test_aftermarket_favors_moving_markets() {
        let catalog = ScenarioCatalog::builtin();
        let first_print = kind_counts(&catalog, MarketPhase::FirstPrint, 3000);
        let aftermarket = kind_counts(&catalog, MarketPhase::AftermarketWave, 3000);
        assert!(
            aftermarket[2] < first_print[2],
            "aftermarket stable draws {} should be below first print {}",
            aftermarket[2],
            first_print[2]
        );
    }

    #[test]
    fn test_sampled_moves_respect_sign_and_range() {
        let catalog = ScenarioCatalog::builtin();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..500 {
            let scenario = catalog.pick_scenario(MarketPhase::FirstPrint, &mut rng);
            match scenario.kind {
                ScenarioKind::Rising => assert!(scenario.price_move_percent > 0.0),
                ScenarioKind::Falling => assert!(scenario.price_move_percent < 0.0),
                ScenarioKind::Stable => assert!(scenario.price_move_percent.abs() <= 1.0),
            }
            assert_eq!(scenario.correct_action, scenario.kind.correct_action());
        }
    }

    #[test]
    fn test_empty_catalog_degrades_to_flat() {
        let catalog = ScenarioCatalog::from_templates(Vec::new()).expect("empty is allowed");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let scenario = catalog.pick_scenario(MarketPhase::FirstPrint, &mut rng);
        assert_eq!(scenario.kind, ScenarioKind::Stable);
        assert_eq!(scenario.price_move_percent, 0.0);
    }

    #[test]
    fn test_falling_only_catalog_still_serves_bookbuilding() {
        let catalog = ScenarioCatalog::from_templates(vec![ScenarioTemplate::new(
            ScenarioKind::Falling,
            "Drop",
            "",
            -4.0,
            -2.0,
        )])
        .expect("valid template");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let scenario = catalog.pick_scenario(MarketPhase::BookbuildingRush, &mut rng);
        assert_eq!(scenario.kind, ScenarioKind::Falling);
    }

    #[test]
    fn test_toml_catalog_round_trips_fields() {
        let catalog = ScenarioCatalog::from_toml_str(
            r#"
            [[scenario]]
            kind = "rising"
            title = "Roadshow Buzz"
            description = "Every meeting ends with an indication of interest."
            move_range = [2.5, 2.5]
            right_reward = 3.0
            "#,
        )
        .expect("catalog should parse");

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let scenario = catalog.pick_scenario(MarketPhase::FirstPrint, &mut rng);
        assert_eq!(scenario.title, "Roadshow Buzz");
        assert_eq!(scenario.price_move_percent, 2.5);
        assert_eq!(scenario.right_reward, 3.0);
        assert_eq!(scenario.wrong_penalty, 1.0);
    }

    #[test]
    fn test_rejects_mis_signed_templates() {
        let err = ScenarioCatalog::from_toml_str(
            r#"
            [[scenario]]
            kind = "falling"
            title = "Not Really Falling"
            description = ""
            move_range = [-1.0, 2.0]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GreenshoeError::InvalidCatalog(_)));
    }

    #[test]
    fn test_scripted_source_plays_in_order_then_flat() {
        let mut source = ScriptedScenarios::new(vec![
            Scenario::new(ScenarioKind::Rising, "a", "", 4.0),
            Scenario::new(ScenarioKind::Falling, "b", "", -3.0),
        ]);
        assert_eq!(source.next_scenario(MarketPhase::FirstPrint).title, "a");
        assert_eq!(source.next_scenario(MarketPhase::FirstPrint).title, "b");
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next_scenario(MarketPhase::FirstPrint), Scenario::flat());
    }
}
