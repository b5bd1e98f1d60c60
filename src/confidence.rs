use crate::modifiers::NewsImpactModifiers;

const CONFIDENCE_MIN: f64 = 0.1;
const CONFIDENCE_MAX: f64 = 1.0;

/// Weight of the modifier confidence when a meaningful, non-extreme set was
/// applied.
const MODIFIER_BLEND: f64 = 0.3;
/// Haircut applied when the news layer reports extreme factors.
const EXTREME_PENALTY: f64 = 0.8;

/// Overall prediction confidence in [0.1, 1.0].
///
/// Half data quality, half sample size; an applied modifier set then either
/// lends its own confidence (meaningful, non-extreme) or taxes the result
/// (extreme). `total_fixtures` is the combined usable count of both teams.
pub fn estimate_confidence(
    home_quality: f64,
    away_quality: f64,
    total_fixtures: usize,
    modifiers: Option<&NewsImpactModifiers>,
) -> f64 {
    let base = (home_quality + away_quality) / 2.0;
    let mut confidence = 0.5 * base + 0.5 * sample_size_score(total_fixtures);

    if let Some(m) = modifiers {
        if m.is_extreme() {
            confidence *= EXTREME_PENALTY;
        } else if m.is_meaningful() {
            confidence = (1.0 - MODIFIER_BLEND) * confidence + MODIFIER_BLEND * m.confidence();
        }
    }

    confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

fn sample_size_score(total_fixtures: usize) -> f64 {
    match total_fixtures {
        n if n >= 50 => 0.9,
        n if n >= 30 => 0.7,
        n if n >= 15 => 0.5,
        n if n >= 5 => 0.3,
        _ => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::ModifierParams;

    fn modifier(home_attack: f64, confidence: f64, chaos: f64) -> NewsImpactModifiers {
        NewsImpactModifiers::new(ModifierParams {
            home_attack,
            home_defense: 1.0,
            away_attack: 1.0,
            away_defense: 1.0,
            confidence,
            chaos,
            news_relevance: 0.5,
        })
        .unwrap()
    }

    #[test]
    fn sample_size_buckets() {
        assert_eq!(sample_size_score(60), 0.9);
        assert_eq!(sample_size_score(35), 0.7);
        assert_eq!(sample_size_score(20), 0.5);
        assert_eq!(sample_size_score(8), 0.3);
        assert_eq!(sample_size_score(2), 0.1);
    }

    #[test]
    fn more_data_means_more_confidence() {
        let thin = estimate_confidence(0.5, 0.5, 10, None);
        let rich = estimate_confidence(0.9, 0.9, 60, None);
        assert!(rich > thin);
    }

    #[test]
    fn floor_applies_to_hopeless_inputs() {
        let c = estimate_confidence(0.0, 0.0, 0, None);
        assert_eq!(c, CONFIDENCE_MIN);
    }

    #[test]
    fn meaningful_modifier_blends_its_confidence() {
        let without = estimate_confidence(0.6, 0.6, 40, None);
        let confident_news = estimate_confidence(0.6, 0.6, 40, Some(&modifier(1.2, 0.95, 0.1)));
        let doubtful_news = estimate_confidence(0.6, 0.6, 40, Some(&modifier(1.2, 0.45, 0.1)));
        assert!(confident_news > without);
        assert!(doubtful_news < without);
    }

    #[test]
    fn neutral_modifier_changes_nothing() {
        let without = estimate_confidence(0.6, 0.6, 40, None);
        let with = estimate_confidence(0.6, 0.6, 40, Some(&modifier(1.0, 0.9, 0.1)));
        assert_eq!(with, without);
    }

    #[test]
    fn extreme_modifier_taxes_confidence() {
        let without = estimate_confidence(0.8, 0.8, 60, None);
        let with = estimate_confidence(0.8, 0.8, 60, Some(&modifier(0.55, 0.9, 0.1)));
        assert!((with - without * EXTREME_PENALTY).abs() < 1e-12);
    }
}
