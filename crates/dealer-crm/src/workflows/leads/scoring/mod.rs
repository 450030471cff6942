//! SPPC pillar scoring: fifteen weighted ratings folded into one 0-100 score and a tier.

mod catalog;
mod ratings;
mod tier;

pub use catalog::{pillar, total_weight, Pillar, PillarPhase, PILLARS, PILLAR_COUNT};
pub use ratings::{RatingSheet, RawRatings, MAX_RATING};
pub use tier::{Tier, TierThresholds};

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Stateless scorer applying the pillar weights and tier thresholds.
#[derive(Debug, Clone, Default)]
pub struct PillarScorer {
    thresholds: TierThresholds,
}

impl PillarScorer {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds
    }

    /// Validates raw ratings and scores them.
    pub fn compute_score(&self, ratings: &RawRatings) -> Result<ProspectScore, ValidationError> {
        let sheet = RatingSheet::from_raw(ratings)?;
        Ok(self.score(&sheet))
    }

    pub fn score(&self, sheet: &RatingSheet) -> ProspectScore {
        let contributions: Vec<PillarContribution> = sheet
            .iter()
            .filter_map(|(pillar_id, rating)| pillar(pillar_id).map(|pillar| (pillar, rating)))
            .map(|(pillar, rating)| {
                let weighted = u32::from(rating) * u32::from(pillar.weight);
                PillarContribution {
                    pillar_id: pillar.id,
                    pillar_name: pillar.name.to_string(),
                    weight: pillar.weight,
                    rating,
                    points: f64::from(weighted) / 100.0,
                }
            })
            .collect();

        let weighted_total: u32 = contributions
            .iter()
            .map(|contribution| u32::from(contribution.rating) * u32::from(contribution.weight))
            .sum();
        let score = round_half_up(weighted_total);
        ProspectScore {
            score,
            tier: self.thresholds.classify(score),
            contributions,
        }
    }

    pub fn classify(&self, score: u8) -> Tier {
        self.thresholds.classify(score)
    }
}

/// Rounds `total / 100` half up. Ratings cap at 100 and weights sum to 100, so the
/// result never exceeds 100.
fn round_half_up(weighted_total: u32) -> u8 {
    let rounded = (weighted_total + 50) / 100;
    rounded.min(u32::from(MAX_RATING)) as u8
}

/// Scores raw ratings with the default tier thresholds.
pub fn compute_score(ratings: &RawRatings) -> Result<u8, ValidationError> {
    PillarScorer::default()
        .compute_score(ratings)
        .map(|outcome| outcome.score)
}

/// Classifies a score with the default tier thresholds.
pub fn classify(score: u8) -> Tier {
    TierThresholds::default().classify(score)
}

/// Weighted share of one pillar in a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarContribution {
    pub pillar_id: u8,
    pub pillar_name: String,
    pub weight: u8,
    pub rating: u8,
    pub points: f64,
}

/// Score and tier computed together from one rating sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProspectScore {
    pub score: u8,
    pub tier: Tier,
    pub contributions: Vec<PillarContribution>,
}

impl ProspectScore {
    pub fn summary(&self) -> String {
        format!("{} ({}/100)", self.tier.label(), self.score)
    }
}
