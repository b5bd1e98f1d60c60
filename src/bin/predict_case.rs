use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use matchcast::{
    ExpectedGoalsData, HistoricalFixture, ModelConfig, NewsImpactModifiers, PredictionRequest,
    predict,
};

#[derive(Debug, serde::Deserialize)]
struct PredictionCase {
    home_id: u32,
    away_id: u32,
    as_of: DateTime<Utc>,
    home_fixtures: Vec<HistoricalFixture>,
    away_fixtures: Vec<HistoricalFixture>,
    league_fixtures: Vec<HistoricalFixture>,
    #[serde(default)]
    xg: HashMap<u64, ExpectedGoalsData>,
    #[serde(default)]
    modifiers: Option<NewsImpactModifiers>,
    #[serde(default)]
    home_rank: Option<u32>,
    #[serde(default)]
    away_rank: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/derby_case.json"));

    let raw = fs::read_to_string(&path)?;
    let case: PredictionCase = serde_json::from_str(&raw)?;

    let request = PredictionRequest {
        home_id: case.home_id,
        away_id: case.away_id,
        home_fixtures: &case.home_fixtures,
        away_fixtures: &case.away_fixtures,
        league_fixtures: &case.league_fixtures,
        xg: &case.xg,
        modifiers: case.modifiers,
        home_rank: case.home_rank,
        away_rank: case.away_rank,
        as_of: case.as_of,
    };

    // This binary is intentionally simple: it loads one snapshot and prints
    // the model output. No network calls; meant for quick manual
    // calibration/tuning iterations.
    match predict(&request, &ModelConfig::default()) {
        Ok(p) => {
            println!("Home: {:.1}%", p.probs.home * 100.0);
            println!("Draw: {:.1}%", p.probs.draw * 100.0);
            println!("Away: {:.1}%", p.probs.away * 100.0);
            println!(
                "Expected goals: {:.2} - {:.2}",
                p.expected_home_goals, p.expected_away_goals
            );
            println!("Confidence: {:.2}", p.confidence);
        }
        Err(err) => {
            // Not a crash: thin histories are an expected answer.
            println!("No prediction: {err}");
        }
    }

    Ok(())
}
