use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

/// One finished (or scheduled) match as loaded by the caller.
///
/// Immutable once constructed; the engine never mutates its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalFixture {
    pub id: u64,
    pub utc_time: DateTime<Utc>,
    #[serde(default)]
    pub league_id: Option<u32>,
    pub home_id: u32,
    pub away_id: u32,
    pub home_goals: u8,
    pub away_goals: u8,
    #[serde(default = "default_finished")]
    pub finished: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub awarded: bool,
    #[serde(default)]
    pub penalty_shootout: bool,
}

fn default_finished() -> bool {
    true
}

impl HistoricalFixture {
    /// Whether this row may feed the model. Abandoned, awarded and
    /// shootout-decided matches carry scorelines that say nothing about
    /// open-play strength.
    pub fn is_model_eligible(&self) -> bool {
        self.finished && !self.cancelled && !self.awarded && !self.penalty_shootout
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_id == team_id || self.away_id == team_id
    }
}

/// Where an xG record came from, in decreasing order of reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XgSource {
    /// Full shot-level xG from the primary provider.
    Xg,
    /// xG present for only part of the match or squad.
    XgPartial,
    /// Reconstructed from shot counts.
    Shots,
    /// Provider reported goals only.
    Goals,
}

/// Per-fixture expected-goals record, keyed by fixture id in the caller's
/// map. Absence means "fall back to raw goals".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpectedGoalsData {
    pub home_xg: f64,
    pub away_xg: f64,
    /// Provider data-quality score in [0, 1].
    pub quality: f64,
    pub source: XgSource,
}

/// Label attached to each weighted fixture, recording which input fed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Xg,
    XgPartial,
    Shots,
    Goals,
    /// No xG record existed at all for the fixture.
    GoalsFallback,
}

impl InputSource {
    pub fn from_xg_source(source: XgSource) -> Self {
        match source {
            XgSource::Xg => InputSource::Xg,
            XgSource::XgPartial => InputSource::XgPartial,
            XgSource::Shots => InputSource::Shots,
            XgSource::Goals => InputSource::Goals,
        }
    }

    /// Multiplicative penalty on the fixture weight.
    pub fn penalty(self) -> f64 {
        match self {
            InputSource::Xg => 1.0,
            InputSource::XgPartial => 0.9,
            InputSource::Shots => 0.8,
            InputSource::Goals => 0.6,
            InputSource::GoalsFallback => 0.4,
        }
    }
}

/// One fixture seen from the subject team's perspective, with its chosen
/// input scores and combined weight. Ephemeral: rebuilt on every prediction
/// request, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct WeightedFixtureData {
    pub fixture_id: u64,
    /// Input score for what the team produced (xG-blended or raw goals).
    pub scored: f64,
    /// Input score for what the team conceded.
    pub conceded: f64,
    /// time-decay x quality x source-penalty.
    pub weight: f64,
    pub source: InputSource,
    pub xg_quality: Option<f64>,
    pub days_ago: f64,
}

/// Resolve the input scores for one fixture from `team_id`'s perspective.
///
/// With an xG record the score is a blend of xG and actual goals; without
/// one it degrades to raw goals under the `GoalsFallback` tag.
pub fn input_scores(
    fixture: &HistoricalFixture,
    xg: Option<&ExpectedGoalsData>,
    team_id: u32,
    cfg: &ModelConfig,
) -> (f64, f64, InputSource, Option<f64>) {
    let at_home = fixture.home_id == team_id;
    let (goals_for, goals_against) = if at_home {
        (fixture.home_goals as f64, fixture.away_goals as f64)
    } else {
        (fixture.away_goals as f64, fixture.home_goals as f64)
    };

    match xg {
        Some(data) => {
            let (xg_for, xg_against) = if at_home {
                (data.home_xg, data.away_xg)
            } else {
                (data.away_xg, data.home_xg)
            };
            let scored = cfg.xg_blend * xg_for + (1.0 - cfg.xg_blend) * goals_for;
            let conceded = cfg.xg_blend * xg_against + (1.0 - cfg.xg_blend) * goals_against;
            (
                scored,
                conceded,
                InputSource::from_xg_source(data.source),
                Some(data.quality.clamp(0.0, 1.0)),
            )
        }
        None => (goals_for, goals_against, InputSource::GoalsFallback, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture(home_goals: u8, away_goals: u8) -> HistoricalFixture {
        HistoricalFixture {
            id: 1,
            utc_time: Utc.with_ymd_and_hms(2025, 9, 1, 15, 0, 0).unwrap(),
            league_id: Some(47),
            home_id: 10,
            away_id: 20,
            home_goals,
            away_goals,
            finished: true,
            cancelled: false,
            awarded: false,
            penalty_shootout: false,
        }
    }

    #[test]
    fn eligibility_excludes_shootouts_and_awards() {
        let mut m = fixture(1, 1);
        assert!(m.is_model_eligible());
        m.penalty_shootout = true;
        assert!(!m.is_model_eligible());
        m.penalty_shootout = false;
        m.awarded = true;
        assert!(!m.is_model_eligible());
    }

    #[test]
    fn input_scores_blend_xg_with_goals() {
        let cfg = ModelConfig::default();
        let m = fixture(2, 0);
        let xg = ExpectedGoalsData {
            home_xg: 1.0,
            away_xg: 0.5,
            quality: 0.9,
            source: XgSource::Xg,
        };
        let (scored, conceded, source, quality) = input_scores(&m, Some(&xg), 10, &cfg);
        assert!((scored - (0.7 * 1.0 + 0.3 * 2.0)).abs() < 1e-12);
        assert!((conceded - (0.7 * 0.5)).abs() < 1e-12);
        assert_eq!(source, InputSource::Xg);
        assert_eq!(quality, Some(0.9));
    }

    #[test]
    fn input_scores_swap_sides_for_away_team() {
        let cfg = ModelConfig::default();
        let m = fixture(2, 1);
        let (scored, conceded, source, _) = input_scores(&m, None, 20, &cfg);
        assert_eq!(scored, 1.0);
        assert_eq!(conceded, 2.0);
        assert_eq!(source, InputSource::GoalsFallback);
    }

    #[test]
    fn source_penalties_are_ordered() {
        let penalties = [
            InputSource::Xg.penalty(),
            InputSource::XgPartial.penalty(),
            InputSource::Shots.penalty(),
            InputSource::Goals.penalty(),
            InputSource::GoalsFallback.penalty(),
        ];
        for pair in penalties.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
