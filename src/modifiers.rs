use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::InvalidModifierError;
use crate::team_strength::TeamStrength;

/// Hard bounds on each multiplicative factor. These are part of the type's
/// invariant rather than tuning knobs, so they live here and not in
/// `ModelConfig`.
pub const FACTOR_MIN: f64 = 0.5;
pub const FACTOR_MAX: f64 = 1.5;

/// Any factor further than this from 1.0 counts as a real signal.
const MEANINGFUL_DEVIATION: f64 = 0.05;
/// Factors outside this band, or a chaos reading above the cap, flag the
/// modifier set as extreme for the confidence stage.
const EXTREME_LOW: f64 = 0.7;
const EXTREME_HIGH: f64 = 1.3;
const EXTREME_CHAOS: f64 = 0.7;

/// Raw, unvalidated modifier values as supplied by the news layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierParams {
    pub home_attack: f64,
    pub home_defense: f64,
    pub away_attack: f64,
    pub away_defense: f64,
    pub confidence: f64,
    pub chaos: f64,
    pub news_relevance: f64,
}

/// Validated news-impact modifiers. Every factor is inside
/// [`FACTOR_MIN`, `FACTOR_MAX`] and every score inside [0, 1]; the only way
/// to obtain a value is through [`NewsImpactModifiers::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModifierParams", into = "ModifierParams")]
pub struct NewsImpactModifiers {
    params: ModifierParams,
}

impl NewsImpactModifiers {
    pub fn new(params: ModifierParams) -> Result<Self, InvalidModifierError> {
        for (field, value) in [
            ("home_attack", params.home_attack),
            ("home_defense", params.home_defense),
            ("away_attack", params.away_attack),
            ("away_defense", params.away_defense),
        ] {
            check_bounds(field, value, FACTOR_MIN, FACTOR_MAX)?;
        }
        for (field, value) in [
            ("confidence", params.confidence),
            ("chaos", params.chaos),
            ("news_relevance", params.news_relevance),
        ] {
            check_bounds(field, value, 0.0, 1.0)?;
        }
        Ok(Self { params })
    }

    pub fn home_attack(&self) -> f64 {
        self.params.home_attack
    }

    pub fn home_defense(&self) -> f64 {
        self.params.home_defense
    }

    pub fn away_attack(&self) -> f64 {
        self.params.away_attack
    }

    pub fn away_defense(&self) -> f64 {
        self.params.away_defense
    }

    pub fn confidence(&self) -> f64 {
        self.params.confidence
    }

    pub fn chaos(&self) -> f64 {
        self.params.chaos
    }

    pub fn news_relevance(&self) -> f64 {
        self.params.news_relevance
    }

    fn factors(&self) -> [f64; 4] {
        [
            self.params.home_attack,
            self.params.home_defense,
            self.params.away_attack,
            self.params.away_defense,
        ]
    }

    /// Non-trivial deviation from neutral on any factor.
    pub fn is_meaningful(&self) -> bool {
        self.factors()
            .iter()
            .any(|f| (f - 1.0).abs() > MEANINGFUL_DEVIATION)
    }

    pub fn is_extreme(&self) -> bool {
        self.params.chaos > EXTREME_CHAOS
            || self
                .factors()
                .iter()
                .any(|f| *f < EXTREME_LOW || *f > EXTREME_HIGH)
    }
}

impl TryFrom<ModifierParams> for NewsImpactModifiers {
    type Error = InvalidModifierError;

    fn try_from(params: ModifierParams) -> Result<Self, Self::Error> {
        NewsImpactModifiers::new(params)
    }
}

impl From<NewsImpactModifiers> for ModifierParams {
    fn from(m: NewsImpactModifiers) -> Self {
        m.params
    }
}

fn check_bounds(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), InvalidModifierError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InvalidModifierError {
            field,
            value,
            min,
            max,
        })
    }
}

/// Gate and apply news modifiers to the base strengths.
///
/// A modifier set below the confidence floor is discarded outright rather
/// than averaged in: low-confidence external signal is treated as no signal.
/// Returns the adjusted strengths and the modifier set that actually took
/// effect (`None` when gated out).
pub fn apply_modifiers(
    home: TeamStrength,
    away: TeamStrength,
    modifiers: Option<&NewsImpactModifiers>,
    cfg: &ModelConfig,
) -> (TeamStrength, TeamStrength, Option<NewsImpactModifiers>) {
    let Some(m) = modifiers else {
        return (home, away, None);
    };
    if m.confidence() < cfg.modifier_confidence_floor {
        return (home, away, None);
    }

    // Strengths live in log space, so multiplying the linear strength by a
    // factor is adding its log.
    let adjusted_home = TeamStrength {
        attack: home.attack + m.home_attack().ln(),
        defense: home.defense + m.home_defense().ln(),
    };
    let adjusted_away = TeamStrength {
        attack: away.attack + m.away_attack().ln(),
        defense: away.defense + m.away_defense().ln(),
    };
    (adjusted_home, adjusted_away, Some(*m))
}
