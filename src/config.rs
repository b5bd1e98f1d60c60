use serde::{Deserialize, Serialize};

/// Every tunable constant of the model in one immutable place.
///
/// `Default` carries the production values; tests and calibration runs build
/// alternate sets instead of patching constants in the code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Share of xG in the xG/goals blend for the per-fixture input score.
    pub xg_blend: f64,
    /// Base half-life for the time-decay weight, in days.
    pub base_half_life_days: f64,
    /// Lower bound on the adaptive half-life. Together with the upper bound
    /// this guarantees a one-year-old match never carries more than a
    /// negligible weight.
    pub half_life_min_days: f64,
    pub half_life_max_days: f64,
    /// Virtual sample size pulling small samples toward the league mean.
    pub shrinkage_c: f64,
    /// League averages below this blend 50/50 with the global priors.
    pub low_scoring_threshold: f64,
    pub global_home_avg: f64,
    pub global_away_avg: f64,
    /// Bounds for the home/away goal ratio before taking the log.
    pub home_adv_min: f64,
    pub home_adv_max: f64,
    /// Lambda multiplier per rank position difference.
    pub rank_step: f64,
    pub rank_mult_min: f64,
    pub rank_mult_max: f64,
    /// Lambdas above the threshold are compressed, not clipped.
    pub soft_cap_threshold: f64,
    pub soft_cap_compression: f64,
    /// Dixon-Coles low-score correlation (negative favors low-score draws).
    pub dc_rho: f64,
    /// Scoreline grid covers 0..=max_goals per side.
    pub max_goals: u32,
    /// Hard caps on each final outcome probability.
    pub prob_floor: f64,
    pub prob_ceiling: f64,
    /// Ratio floor before `ln`, keeps strengths finite.
    pub strength_ratio_floor: f64,
    /// Minimum usable fixtures per pool before the engine refuses.
    pub min_team_fixtures: usize,
    pub min_league_fixtures: usize,
    /// News modifiers below this confidence are discarded entirely.
    pub modifier_confidence_floor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            xg_blend: 0.70,
            base_half_life_days: 60.0,
            half_life_min_days: 30.0,
            half_life_max_days: 180.0,
            shrinkage_c: 2.0,
            low_scoring_threshold: 0.80,
            global_home_avg: 1.55,
            global_away_avg: 1.25,
            home_adv_min: 1.05,
            home_adv_max: 1.30,
            rank_step: 0.03,
            rank_mult_min: 0.50,
            rank_mult_max: 1.50,
            soft_cap_threshold: 3.50,
            soft_cap_compression: 0.70,
            dc_rho: -0.13,
            max_goals: 4,
            prob_floor: 0.02,
            prob_ceiling: 0.96,
            strength_ratio_floor: 0.10,
            min_team_fixtures: 10,
            min_league_fixtures: 20,
            modifier_confidence_floor: 0.40,
        }
    }
}
