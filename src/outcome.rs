use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::league_baseline::LeagueBaseline;
use crate::team_strength::TeamStrength;

/// Home/draw/away probability triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbs {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// Expected goals per side for a specific fixture, plus the home-advantage
/// term they were built with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchRates {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub home_advantage: f64,
}

/// Combine strengths, league baseline, home advantage and the optional rank
/// prior into expected goals per side, soft-capped against blowout lambdas.
pub fn expected_goals(
    home: &TeamStrength,
    away: &TeamStrength,
    baseline: &LeagueBaseline,
    home_rank: Option<u32>,
    away_rank: Option<u32>,
    cfg: &ModelConfig,
) -> MatchRates {
    // The ratio bound is deliberately narrow: elite sides away from home in
    // modern leagues keep most of their quality.
    let home_advantage = (baseline.home_avg / baseline.away_avg)
        .clamp(cfg.home_adv_min, cfg.home_adv_max)
        .ln();

    let mut lambda_home =
        home.attack.exp() * away.defense.exp() * baseline.home_avg * home_advantage.exp();
    let mut lambda_away = away.attack.exp() * home.defense.exp() * baseline.away_avg;

    // League position acts as an independent quality prior: a top side in a
    // temporary slump keeps credit the recent-form window alone would erase.
    if let (Some(hr), Some(ar)) = (home_rank, away_rank) {
        lambda_home *= rank_multiplier(hr, ar, cfg);
        lambda_away *= rank_multiplier(ar, hr, cfg);
    }

    MatchRates {
        lambda_home: apply_soft_cap(lambda_home, cfg),
        lambda_away: apply_soft_cap(lambda_away, cfg),
        home_advantage,
    }
}

fn rank_multiplier(my_rank: u32, opponent_rank: u32, cfg: &ModelConfig) -> f64 {
    let diff = opponent_rank as f64 - my_rank as f64;
    (1.0 + diff * cfg.rank_step).clamp(cfg.rank_mult_min, cfg.rank_mult_max)
}

/// Compress lambdas above the threshold instead of clipping them: ordering
/// is preserved, 6-0 fantasies are not.
pub fn apply_soft_cap(lambda: f64, cfg: &ModelConfig) -> f64 {
    if lambda > cfg.soft_cap_threshold {
        cfg.soft_cap_threshold + (lambda - cfg.soft_cap_threshold) * cfg.soft_cap_compression
    } else {
        lambda
    }
}

/// Sum the Dixon-Coles-adjusted scoreline grid into home/draw/away masses,
/// then apply the hard caps and renormalize.
pub fn outcome_probs(lambda_home: f64, lambda_away: f64, cfg: &ModelConfig) -> OutcomeProbs {
    let mut p_home = 0.0_f64;
    let mut p_draw = 0.0_f64;
    let mut p_away = 0.0_f64;

    for h in 0..=cfg.max_goals {
        for a in 0..=cfg.max_goals {
            let base = poisson_pmf(h, lambda_home) * poisson_pmf(a, lambda_away);
            let p = (base * dc_tau(h, a, lambda_home, lambda_away, cfg.dc_rho)).max(0.0);
            if h > a {
                p_home += p;
            } else if h == a {
                p_draw += p;
            } else {
                p_away += p;
            }
        }
    }

    // The grid covers only 0..=max_goals per side, so the mass is < 1.
    let sum = (p_home + p_draw + p_away).max(1e-12);
    cap_and_renormalize(
        OutcomeProbs {
            home: p_home / sum,
            draw: p_draw / sum,
            away: p_away / sum,
        },
        cfg,
    )
}

/// Low-score correlation correction. With negative rho the 0-0 and 1-1
/// cells gain mass at the expense of 1-0 and 0-1.
fn dc_tau(home_goals: u32, away_goals: u32, lambda_home: f64, lambda_away: f64, rho: f64) -> f64 {
    match (home_goals, away_goals) {
        (0, 0) => 1.0 - lambda_home * lambda_away * rho,
        (0, 1) => 1.0 + lambda_home * rho,
        (1, 0) => 1.0 + lambda_away * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

fn poisson_pmf(goals: u32, lambda: f64) -> f64 {
    let numer = lambda.powi(goals as i32) * (-lambda).exp();
    let denom = (1..=goals).fold(1.0_f64, |acc, k| acc * k as f64).max(1.0);
    numer / denom
}

/// No outcome is ever certain or impossible: clamp into
/// `[prob_floor, prob_ceiling]` and redistribute until the triple sums to
/// exactly 1.0. Any final float residue lands on the largest component,
/// where it cannot breach the floor.
fn cap_and_renormalize(probs: OutcomeProbs, cfg: &ModelConfig) -> OutcomeProbs {
    let mut p = [probs.home, probs.draw, probs.away];

    for _ in 0..16 {
        for v in &mut p {
            *v = v.clamp(cfg.prob_floor, cfg.prob_ceiling);
        }
        let sum: f64 = p.iter().sum();
        if (sum - 1.0).abs() < 1e-12 {
            break;
        }
        for v in &mut p {
            *v /= sum;
        }
    }

    for v in &mut p {
        *v = v.clamp(cfg.prob_floor, cfg.prob_ceiling);
    }
    let residue = 1.0 - p.iter().sum::<f64>();
    let largest = p
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(1);
    p[largest] += residue;

    OutcomeProbs {
        home: p[0],
        draw: p[1],
        away: p[2],
    }
}
