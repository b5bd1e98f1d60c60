use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::fixtures::{ExpectedGoalsData, HistoricalFixture};

/// League-average goals-equivalent per side, the denominator every strength
/// ratio downstream is taken against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeagueBaseline {
    pub home_avg: f64,
    pub away_avg: f64,
    pub sample_matches: usize,
}

impl LeagueBaseline {
    pub fn global_prior(cfg: &ModelConfig) -> Self {
        Self {
            home_avg: cfg.global_home_avg,
            away_avg: cfg.global_away_avg,
            sample_matches: 0,
        }
    }

    /// Side-agnostic average, used as the shrinkage prior for team
    /// strengths (teams play a mix of home and away fixtures).
    pub fn overall_avg(&self) -> f64 {
        (self.home_avg + self.away_avg) / 2.0
    }
}

/// Mean input score per side across the league pool, xG-preferred.
///
/// Never fails: an empty pool returns the global priors, and a
/// pathologically low average (relegation-battle slugfests, tiny early
/// season samples) is blended 50/50 back toward them so a near-zero
/// denominator cannot poison every downstream ratio.
pub fn compute_league_baseline(
    fixtures: &[HistoricalFixture],
    xg: &HashMap<u64, ExpectedGoalsData>,
    cfg: &ModelConfig,
) -> LeagueBaseline {
    let mut home_sum = 0.0;
    let mut away_sum = 0.0;
    let mut n = 0usize;

    for m in fixtures {
        if !m.is_model_eligible() {
            continue;
        }
        let (home_score, away_score) = match xg.get(&m.id) {
            Some(data) => (
                cfg.xg_blend * data.home_xg + (1.0 - cfg.xg_blend) * m.home_goals as f64,
                cfg.xg_blend * data.away_xg + (1.0 - cfg.xg_blend) * m.away_goals as f64,
            ),
            None => (m.home_goals as f64, m.away_goals as f64),
        };
        home_sum += home_score;
        away_sum += away_score;
        n += 1;
    }

    if n == 0 {
        return LeagueBaseline::global_prior(cfg);
    }

    let home_avg = guard_low_average(home_sum / n as f64, cfg.global_home_avg, cfg);
    let away_avg = guard_low_average(away_sum / n as f64, cfg.global_away_avg, cfg);

    LeagueBaseline {
        home_avg,
        away_avg,
        sample_matches: n,
    }
}

fn guard_low_average(avg: f64, prior: f64, cfg: &ModelConfig) -> f64 {
    if avg < cfg.low_scoring_threshold {
        0.5 * avg + 0.5 * prior
    } else {
        avg
    }
}
