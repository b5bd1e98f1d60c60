use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confidence::estimate_confidence;
use crate::config::ModelConfig;
use crate::error::{DataPool, InsufficientDataError};
use crate::fixtures::{ExpectedGoalsData, HistoricalFixture};
use crate::league_baseline::compute_league_baseline;
use crate::modifiers::{NewsImpactModifiers, apply_modifiers};
use crate::outcome::{OutcomeProbs, expected_goals, outcome_probs};
use crate::team_strength::{TeamStrength, estimate_team_strength};

/// Everything one prediction needs, fully materialized by the caller.
/// The engine never blocks on data acquisition.
#[derive(Debug, Clone)]
pub struct PredictionRequest<'a> {
    pub home_id: u32,
    pub away_id: u32,
    pub home_fixtures: &'a [HistoricalFixture],
    pub away_fixtures: &'a [HistoricalFixture],
    pub league_fixtures: &'a [HistoricalFixture],
    pub xg: &'a HashMap<u64, ExpectedGoalsData>,
    pub modifiers: Option<NewsImpactModifiers>,
    pub home_rank: Option<u32>,
    pub away_rank: Option<u32>,
    /// Reference instant for the time-decay weights. Explicit so identical
    /// inputs always produce identical output.
    pub as_of: DateTime<Utc>,
}

/// Final model output, consumed downstream as a plain data object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedPrediction {
    pub probs: OutcomeProbs,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    /// Strengths before any news modifiers were applied.
    pub base_home_strength: TeamStrength,
    pub base_away_strength: TeamStrength,
    /// The modifier set that actually took effect, if any.
    pub modifiers: Option<NewsImpactModifiers>,
    /// Overall confidence in [0.1, 1.0].
    pub confidence: f64,
}

/// Run the full pipeline: baseline, per-team strengths (in parallel), news
/// modifiers, expected goals, outcome probabilities, confidence.
///
/// Pools below the configured minimums return [`InsufficientDataError`]
/// instead of a low-confidence guess; every numeric edge case inside the
/// pipeline degrades to neutral defaults instead of failing.
pub fn predict(
    request: &PredictionRequest<'_>,
    cfg: &ModelConfig,
) -> Result<EnhancedPrediction, InsufficientDataError> {
    check_pool(
        DataPool::HomeTeam,
        usable_count(request.home_fixtures, Some(request.home_id)),
        cfg.min_team_fixtures,
    )?;
    check_pool(
        DataPool::AwayTeam,
        usable_count(request.away_fixtures, Some(request.away_id)),
        cfg.min_team_fixtures,
    )?;
    check_pool(
        DataPool::League,
        usable_count(request.league_fixtures, None),
        cfg.min_league_fixtures,
    )?;

    let baseline = compute_league_baseline(request.league_fixtures, request.xg, cfg);
    debug!(
        home_avg = baseline.home_avg,
        away_avg = baseline.away_avg,
        sample_matches = baseline.sample_matches,
        "league baseline"
    );

    // The two sides are independent; estimate them in parallel.
    let (home_sample, away_sample) = rayon::join(
        || {
            estimate_team_strength(
                request.home_id,
                request.home_fixtures,
                request.xg,
                &baseline,
                request.as_of,
                cfg,
            )
        },
        || {
            estimate_team_strength(
                request.away_id,
                request.away_fixtures,
                request.xg,
                &baseline,
                request.as_of,
                cfg,
            )
        },
    );
    debug!(
        home_attack = home_sample.strength.attack,
        home_defense = home_sample.strength.defense,
        away_attack = away_sample.strength.attack,
        away_defense = away_sample.strength.defense,
        home_half_life = home_sample.half_life_days,
        away_half_life = away_sample.half_life_days,
        "team strengths"
    );

    let (adj_home, adj_away, applied_modifiers) = apply_modifiers(
        home_sample.strength,
        away_sample.strength,
        request.modifiers.as_ref(),
        cfg,
    );

    let rates = expected_goals(
        &adj_home,
        &adj_away,
        &baseline,
        request.home_rank,
        request.away_rank,
        cfg,
    );
    debug!(
        lambda_home = rates.lambda_home,
        lambda_away = rates.lambda_away,
        home_advantage = rates.home_advantage,
        "expected goals"
    );

    let probs = outcome_probs(rates.lambda_home, rates.lambda_away, cfg);

    let confidence = estimate_confidence(
        home_sample.data_quality,
        away_sample.data_quality,
        home_sample.fixtures_used + away_sample.fixtures_used,
        applied_modifiers.as_ref(),
    );

    Ok(EnhancedPrediction {
        probs,
        expected_home_goals: rates.lambda_home,
        expected_away_goals: rates.lambda_away,
        base_home_strength: home_sample.strength,
        base_away_strength: away_sample.strength,
        modifiers: applied_modifiers,
        confidence,
    })
}

fn usable_count(fixtures: &[HistoricalFixture], team_id: Option<u32>) -> usize {
    fixtures
        .iter()
        .filter(|m| m.is_model_eligible())
        .filter(|m| team_id.is_none_or(|id| m.involves(id)))
        .count()
}

fn check_pool(
    pool: DataPool,
    available: usize,
    required: usize,
) -> Result<(), InsufficientDataError> {
    if available < required {
        return Err(InsufficientDataError {
            pool,
            available,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn fixture(id: u64, home_id: u32, away_id: u32, days_ago: i64) -> HistoricalFixture {
        HistoricalFixture {
            id,
            utc_time: as_of() - Duration::days(days_ago),
            league_id: Some(47),
            home_id,
            away_id,
            home_goals: 1,
            away_goals: 1,
            finished: true,
            cancelled: false,
            awarded: false,
            penalty_shootout: false,
        }
    }

    #[test]
    fn empty_histories_are_rejected_before_any_math() {
        let cfg = ModelConfig::default();
        let xg = HashMap::new();
        let request = PredictionRequest {
            home_id: 1,
            away_id: 2,
            home_fixtures: &[],
            away_fixtures: &[],
            league_fixtures: &[],
            xg: &xg,
            modifiers: None,
            home_rank: None,
            away_rank: None,
            as_of: as_of(),
        };
        let err = predict(&request, &cfg).unwrap_err();
        assert_eq!(err.pool, DataPool::HomeTeam);
        assert_eq!(err.available, 0);
        assert_eq!(err.required, cfg.min_team_fixtures);
    }

    #[test]
    fn thin_league_pool_is_rejected_even_with_team_history() {
        let cfg = ModelConfig::default();
        let xg = HashMap::new();
        let home: Vec<_> = (0..12).map(|i| fixture(i, 1, 50 + i as u32, i as i64 * 7)).collect();
        let away: Vec<_> = (0..12)
            .map(|i| fixture(100 + i, 60 + i as u32, 2, i as i64 * 7))
            .collect();
        let league: Vec<_> = (0..5).map(|i| fixture(200 + i, 70, 71, i as i64)).collect();

        let request = PredictionRequest {
            home_id: 1,
            away_id: 2,
            home_fixtures: &home,
            away_fixtures: &away,
            league_fixtures: &league,
            xg: &xg,
            modifiers: None,
            home_rank: None,
            away_rank: None,
            as_of: as_of(),
        };
        let err = predict(&request, &cfg).unwrap_err();
        assert_eq!(err.pool, DataPool::League);
        assert_eq!(err.available, 5);
    }

    #[test]
    fn ineligible_fixtures_do_not_count_toward_the_minimum() {
        let cfg = ModelConfig::default();
        let mut home: Vec<_> = (0..12).map(|i| fixture(i, 1, 50, i as i64)).collect();
        for m in home.iter_mut().take(4) {
            m.cancelled = true;
        }
        assert_eq!(usable_count(&home, Some(1)), 8);
        assert!(usable_count(&home, Some(1)) < cfg.min_team_fixtures);
    }
}
