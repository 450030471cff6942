use super::common::*;
use crate::workflows::leads::scoring::{
    classify, compute_score, total_weight, PillarScorer, RatingSheet, RawRatings, Tier,
    TierThresholds, PILLARS, PILLAR_COUNT,
};
use crate::workflows::leads::validation::ValidationError;

fn ratings(entries: &[(i64, i64)]) -> RawRatings {
    entries.iter().copied().collect()
}

#[test]
fn pillar_weights_sum_to_one_hundred() {
    assert_eq!(PILLARS.len(), PILLAR_COUNT);
    assert_eq!(total_weight(), 100);
    for (index, pillar) in PILLARS.iter().enumerate() {
        assert_eq!(usize::from(pillar.id), index + 1);
    }
}

#[test]
fn perfect_ratings_score_elite() {
    let outcome = PillarScorer::default()
        .compute_score(&uniform_ratings(100))
        .expect("valid ratings");

    assert_eq!(outcome.score, 100);
    assert_eq!(outcome.tier, Tier::Elite);
    assert_eq!(outcome.contributions.len(), PILLAR_COUNT);
}

#[test]
fn unrated_prospect_scores_zero_explorer() {
    let outcome = PillarScorer::default()
        .compute_score(&RawRatings::new())
        .expect("empty ratings are valid");

    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.tier, Tier::Explorer);
    assert!(outcome
        .contributions
        .iter()
        .all(|contribution| contribution.rating == 0 && contribution.points == 0.0));

    assert_eq!(compute_score(&uniform_ratings(0)), Ok(0));
}

#[test]
fn uniform_ratings_score_their_own_value() {
    for value in [0, 1, 39, 40, 64, 65, 84, 85, 99, 100] {
        assert_eq!(compute_score(&uniform_ratings(value)), Ok(value as u8));
    }
}

#[test]
fn missing_pillars_count_as_zero() {
    let outcome = PillarScorer::default()
        .compute_score(&ratings(&[(3, 100), (2, 100)]))
        .expect("valid ratings");

    assert_eq!(outcome.score, 22);
    assert_eq!(outcome.tier, Tier::Explorer);
    let financial = outcome
        .contributions
        .iter()
        .find(|contribution| contribution.pillar_id == 3)
        .expect("financial reality listed");
    assert_eq!(financial.points, 12.0);
}

#[test]
fn rounds_half_up() {
    // 5 x 10% = 0.5 point
    assert_eq!(compute_score(&ratings(&[(2, 5)])), Ok(1));
    // 12 x 4% = 0.48 point
    assert_eq!(compute_score(&ratings(&[(9, 12)])), Ok(0));
    // 75 x 10% + 50 x 12% = 13.5 points
    assert_eq!(compute_score(&ratings(&[(2, 75), (3, 50)])), Ok(14));
}

#[test]
fn scoring_is_idempotent() {
    let input = ratings(&[(1, 70), (2, 90), (3, 55), (6, 40), (13, 80), (15, 100)]);
    let scorer = PillarScorer::default();

    let first = scorer.compute_score(&input).expect("valid ratings");
    let second = scorer.compute_score(&input).expect("valid ratings");

    assert_eq!(first, second);
}

#[test]
fn rejects_ratings_outside_range() {
    for value in [150, -5, 101] {
        match compute_score(&ratings(&[(4, value)])) {
            Err(ValidationError::RatingOutOfRange {
                pillar_id: 4,
                value: rejected,
            }) => assert_eq!(rejected, value),
            other => panic!("expected range error for {value}, got {other:?}"),
        }
    }
}

#[test]
fn rejects_unknown_pillar_ids() {
    for pillar_id in [0, 16, -1, 300] {
        assert_eq!(
            compute_score(&ratings(&[(pillar_id, 50)])),
            Err(ValidationError::UnknownPillar(pillar_id))
        );
    }
}

#[test]
fn classify_partitions_every_score() {
    let mut counts = [0usize; 4];
    for score in 0..=100u8 {
        let tier = classify(score);
        let index = Tier::ordered()
            .iter()
            .position(|candidate| *candidate == tier)
            .expect("tier listed");
        counts[index] += 1;
    }

    // Elite 85-100, Qualified 65-84, To-Mature 40-64, Explorer 0-39
    assert_eq!(counts, [16, 20, 25, 40]);
}

#[test]
fn classify_respects_boundaries() {
    assert_eq!(classify(39), Tier::Explorer);
    assert_eq!(classify(40), Tier::ToMature);
    assert_eq!(classify(64), Tier::ToMature);
    assert_eq!(classify(65), Tier::Qualified);
    assert_eq!(classify(84), Tier::Qualified);
    assert_eq!(classify(85), Tier::Elite);
    assert_eq!(Tier::ToMature.label(), "To-Mature");
}

#[test]
fn custom_thresholds_shift_tiers() {
    let scorer = PillarScorer::new(TierThresholds {
        elite: 90,
        qualified: 70,
        to_mature: 50,
    });

    assert_eq!(scorer.classify(88), Tier::Qualified);
    assert_eq!(scorer.classify(45), Tier::Explorer);
}

#[test]
fn rating_sheet_overwrites_and_defaults_to_zero() {
    let mut sheet = RatingSheet::new();
    sheet.rate(7, 30).expect("valid rating");
    sheet.rate(7, 60).expect("overwrite allowed");

    assert_eq!(sheet.value(7), 60);
    assert_eq!(sheet.value(8), 0);
    assert_eq!(sheet.rated_count(), 1);
    assert_eq!(sheet.iter().count(), PILLAR_COUNT);
}

#[test]
fn rating_sheet_deserialization_validates() {
    let sheet: RatingSheet = serde_json::from_str(r#"{"1": 80, "15": 20}"#).expect("valid");
    assert_eq!(sheet.value(1), 80);
    assert_eq!(sheet.value(15), 20);

    assert!(serde_json::from_str::<RatingSheet>(r#"{"16": 80}"#).is_err());
    assert!(serde_json::from_str::<RatingSheet>(r#"{"2": 120}"#).is_err());
}
