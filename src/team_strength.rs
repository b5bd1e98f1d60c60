use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::fixtures::{
    ExpectedGoalsData, HistoricalFixture, InputSource, WeightedFixtureData, input_scores,
};
use crate::league_baseline::LeagueBaseline;

const LN_2: f64 = std::f64::consts::LN_2;

/// Attack/defense strength in log space, 0.0 = exactly league average.
/// Always finite: the underlying ratio is floored before the log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamStrength {
    pub attack: f64,
    pub defense: f64,
}

impl TeamStrength {
    pub fn neutral() -> Self {
        Self {
            attack: 0.0,
            defense: 0.0,
        }
    }
}

/// A team's estimated strength plus the signals the confidence stage needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamSample {
    pub strength: TeamStrength,
    /// Data-quality score in [0, 1] for the team's full fixture set.
    pub data_quality: f64,
    pub fixtures_used: usize,
    pub half_life_days: f64,
}

/// Estimate one team's attack/defense strengths from its fixture history.
///
/// Each fixture contributes its xG-blended (or raw-goal) input scores under
/// a combined weight of time decay, xG quality and source penalty; the
/// weighted means are then shrunk toward the league average so two good
/// matches cannot buy a team an elite rating.
pub fn estimate_team_strength(
    team_id: u32,
    fixtures: &[HistoricalFixture],
    xg: &HashMap<u64, ExpectedGoalsData>,
    baseline: &LeagueBaseline,
    as_of: DateTime<Utc>,
    cfg: &ModelConfig,
) -> TeamSample {
    let mut rows = collect_rows(team_id, fixtures, xg, as_of, cfg);
    let data_quality = data_quality_score(&rows);
    let half_life = adaptive_half_life(data_quality, rows.len(), cfg);

    for row in &mut rows {
        row.weight = time_decay_weight(row.days_ago, half_life)
            * quality_weight(row.xg_quality)
            * row.source.penalty();
    }

    let league_avg = baseline.overall_avg();
    let attack = shrunk_log_strength(rows.iter().map(|r| (r.scored, r.weight)), league_avg, cfg);
    let defense =
        shrunk_log_strength(rows.iter().map(|r| (r.conceded, r.weight)), league_avg, cfg);

    TeamSample {
        strength: TeamStrength { attack, defense },
        data_quality,
        fixtures_used: rows.len(),
        half_life_days: half_life,
    }
}

fn collect_rows(
    team_id: u32,
    fixtures: &[HistoricalFixture],
    xg: &HashMap<u64, ExpectedGoalsData>,
    as_of: DateTime<Utc>,
    cfg: &ModelConfig,
) -> Vec<WeightedFixtureData> {
    let mut rows = Vec::with_capacity(fixtures.len());
    for m in fixtures {
        if !m.is_model_eligible() || !m.involves(team_id) {
            continue;
        }
        let (scored, conceded, source, xg_quality) = input_scores(m, xg.get(&m.id), team_id, cfg);
        let days_ago = ((as_of - m.utc_time).num_seconds() as f64 / 86_400.0).max(0.0);
        rows.push(WeightedFixtureData {
            fixture_id: m.id,
            scored,
            conceded,
            weight: 0.0,
            source,
            xg_quality,
            days_ago,
        });
    }
    rows
}

/// Weighted blend of xG coverage (40%) and per-fixture quality adjusted by
/// source penalty (60%). Floored so sparse metadata alone cannot zero out a
/// team's influence on the prediction.
fn data_quality_score(rows: &[WeightedFixtureData]) -> f64 {
    let has_any_xg = rows.iter().any(|r| r.source != InputSource::GoalsFallback);
    let floor = if has_any_xg { 0.5 } else { 0.3 };
    if rows.is_empty() {
        return floor;
    }

    let covered = rows
        .iter()
        .filter(|r| r.source != InputSource::GoalsFallback)
        .count();
    let coverage = covered as f64 / rows.len() as f64;

    let adjusted_sum: f64 = rows
        .iter()
        .map(|r| r.xg_quality.unwrap_or(0.0) * r.source.penalty())
        .sum();
    let adjusted_avg = adjusted_sum / rows.len() as f64;

    (0.4 * coverage + 0.6 * adjusted_avg).clamp(floor, 1.0)
}

/// Adaptive half-life: richer, cleaner histories track recent form faster;
/// thin ones smooth harder to avoid overreacting to noise.
fn adaptive_half_life(data_quality: f64, fixture_count: usize, cfg: &ModelConfig) -> f64 {
    let quality_factor = if data_quality >= 0.7 {
        0.6
    } else if data_quality <= 0.4 {
        1.2
    } else {
        1.0
    };

    let count_factor = match fixture_count {
        n if n >= 40 => 0.7,
        n if n >= 20 => 0.85,
        n if n >= 10 => 1.0,
        n if n >= 5 => 1.3,
        _ => 1.8,
    };

    (cfg.base_half_life_days * quality_factor * count_factor)
        .clamp(cfg.half_life_min_days, cfg.half_life_max_days)
}

fn time_decay_weight(days_ago: f64, half_life_days: f64) -> f64 {
    (-LN_2 * days_ago / half_life_days).exp()
}

/// Discretized by the xG record's quality score. Fixtures without a record
/// sit in the lowest band.
fn quality_weight(xg_quality: Option<f64>) -> f64 {
    match xg_quality {
        Some(q) if q >= 0.8 => 1.0,
        Some(q) if q >= 0.5 => 0.8,
        _ => 0.5,
    }
}

/// `(sum(score x w) + C x league_avg) / (sum(w) + C)`, normalized against the
/// league average and stored in log space.
///
/// Zero total weight degrades to exactly the prior, i.e. a neutral 0.0
/// strength, never an error.
fn shrunk_log_strength(
    scores: impl Iterator<Item = (f64, f64)>,
    league_avg: f64,
    cfg: &ModelConfig,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (score, weight) in scores {
        weighted_sum += score * weight;
        weight_sum += weight;
    }

    let smoothed =
        (weighted_sum + cfg.shrinkage_c * league_avg) / (weight_sum + cfg.shrinkage_c);
    let normalized = (smoothed / league_avg).max(cfg.strength_ratio_floor);
    normalized.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::XgSource;
    use chrono::{Duration, TimeZone};

    const TEAM: u32 = 10;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn home_fixture(id: u64, days_ago: i64, goals_for: u8, goals_against: u8) -> HistoricalFixture {
        HistoricalFixture {
            id,
            utc_time: as_of() - Duration::days(days_ago),
            league_id: Some(47),
            home_id: TEAM,
            away_id: 99,
            home_goals: goals_for,
            away_goals: goals_against,
            finished: true,
            cancelled: false,
            awarded: false,
            penalty_shootout: false,
        }
    }

    fn baseline() -> LeagueBaseline {
        LeagueBaseline {
            home_avg: 1.55,
            away_avg: 1.25,
            sample_matches: 100,
        }
    }

    #[test]
    fn no_fixtures_degrades_to_neutral_strength() {
        let cfg = ModelConfig::default();
        let sample =
            estimate_team_strength(TEAM, &[], &HashMap::new(), &baseline(), as_of(), &cfg);
        assert_eq!(sample.strength.attack, 0.0);
        assert_eq!(sample.strength.defense, 0.0);
        assert_eq!(sample.fixtures_used, 0);
        assert_eq!(sample.data_quality, 0.3);
    }

    #[test]
    fn shrinkage_pulls_small_samples_toward_league_average() {
        let cfg = ModelConfig::default();
        // Two recent 2-0 wins: strong raw attack, but far from elite after
        // shrinkage.
        let small: Vec<_> = (0..2).map(|i| home_fixture(i, i as i64 * 7, 2, 0)).collect();
        let large: Vec<_> = (0..40).map(|i| home_fixture(i, i as i64 * 7, 2, 0)).collect();

        let s_small =
            estimate_team_strength(TEAM, &small, &HashMap::new(), &baseline(), as_of(), &cfg);
        let s_large =
            estimate_team_strength(TEAM, &large, &HashMap::new(), &baseline(), as_of(), &cfg);

        let raw = (2.0 / baseline().overall_avg()).ln();
        assert!(s_small.strength.attack > 0.0);
        assert!(s_small.strength.attack < s_large.strength.attack);
        assert!(s_large.strength.attack < raw);
    }

    #[test]
    fn older_fixtures_carry_less_weight() {
        let cfg = ModelConfig::default();
        let hl = adaptive_half_life(0.3, 20, &cfg);
        let recent = time_decay_weight(7.0, hl);
        let old = time_decay_weight(200.0, hl);
        assert!(recent > old);
        assert!(time_decay_weight(0.0, hl) == 1.0);
        // At one half-life the weight is exactly halved.
        let w = time_decay_weight(hl, hl);
        assert!((w - 0.5).abs() < 1e-12);
    }

    #[test]
    fn one_year_old_match_is_negligible_even_at_max_half_life() {
        let cfg = ModelConfig::default();
        let w = time_decay_weight(365.0, cfg.half_life_max_days);
        assert!(w < 0.25);
    }

    #[test]
    fn half_life_widened_for_thin_histories() {
        let cfg = ModelConfig::default();
        let thin = adaptive_half_life(0.5, 3, &cfg);
        let rich = adaptive_half_life(0.5, 40, &cfg);
        assert!(thin > rich);
        assert!(thin <= cfg.half_life_max_days);
        assert!(rich >= cfg.half_life_min_days);
    }

    #[test]
    fn quality_weight_bands() {
        assert_eq!(quality_weight(Some(0.9)), 1.0);
        assert_eq!(quality_weight(Some(0.6)), 0.8);
        assert_eq!(quality_weight(Some(0.2)), 0.5);
        assert_eq!(quality_weight(None), 0.5);
    }

    #[test]
    fn data_quality_floor_rises_with_any_xg() {
        let cfg = ModelConfig::default();
        let fixtures: Vec<_> = (0..10).map(|i| home_fixture(i, i as i64, 1, 1)).collect();

        let without = estimate_team_strength(
            TEAM,
            &fixtures,
            &HashMap::new(),
            &baseline(),
            as_of(),
            &cfg,
        );
        assert_eq!(without.data_quality, 0.3);

        let mut xg = HashMap::new();
        xg.insert(
            0,
            ExpectedGoalsData {
                home_xg: 1.0,
                away_xg: 1.0,
                quality: 0.9,
                source: XgSource::Xg,
            },
        );
        let with =
            estimate_team_strength(TEAM, &fixtures, &xg, &baseline(), as_of(), &cfg);
        assert!(with.data_quality >= 0.5);
    }

    #[test]
    fn strength_is_always_finite() {
        let cfg = ModelConfig::default();
        // A team that never scores: ratio would head to zero without the
        // floor.
        let fixtures: Vec<_> = (0..30).map(|i| home_fixture(i, i as i64 * 3, 0, 5)).collect();
        let sample =
            estimate_team_strength(TEAM, &fixtures, &HashMap::new(), &baseline(), as_of(), &cfg);
        assert!(sample.strength.attack.is_finite());
        assert!(sample.strength.defense.is_finite());
        assert!(sample.strength.attack >= cfg.strength_ratio_floor.ln());
    }
}
