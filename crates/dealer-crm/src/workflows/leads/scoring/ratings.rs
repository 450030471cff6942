use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::validation::ValidationError;
use super::catalog::{pillar, PILLARS};

/// Ratings as they arrive from a form or request body, before validation.
pub type RawRatings = BTreeMap<i64, i64>;

pub const MAX_RATING: u8 = 100;

/// Validated pillar ratings for one prospect.
///
/// Unrated pillars are absent and count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRatings", into = "RawRatings")]
pub struct RatingSheet {
    values: BTreeMap<u8, u8>,
}

impl RatingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: &RawRatings) -> Result<Self, ValidationError> {
        let mut sheet = Self::new();
        for (&pillar_id, &value) in raw {
            sheet.rate(pillar_id, value)?;
        }
        Ok(sheet)
    }

    /// Sets or overwrites one pillar rating.
    pub fn rate(&mut self, pillar_id: i64, value: i64) -> Result<(), ValidationError> {
        let id = validate_pillar_id(pillar_id)?;
        if !(0..=i64::from(MAX_RATING)).contains(&value) {
            return Err(ValidationError::RatingOutOfRange {
                pillar_id: id,
                value,
            });
        }
        self.values.insert(id, value as u8);
        Ok(())
    }

    pub fn value(&self, pillar_id: u8) -> u8 {
        self.values.get(&pillar_id).copied().unwrap_or(0)
    }

    pub fn rated_count(&self) -> usize {
        self.values.len()
    }

    /// Every catalog pillar with its rating, unrated ones as zero.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        PILLARS
            .iter()
            .map(move |pillar| (pillar.id, self.value(pillar.id)))
    }
}

fn validate_pillar_id(pillar_id: i64) -> Result<u8, ValidationError> {
    u8::try_from(pillar_id)
        .ok()
        .filter(|id| pillar(*id).is_some())
        .ok_or(ValidationError::UnknownPillar(pillar_id))
}

impl TryFrom<RawRatings> for RatingSheet {
    type Error = ValidationError;

    fn try_from(raw: RawRatings) -> Result<Self, Self::Error> {
        Self::from_raw(&raw)
    }
}

impl From<RatingSheet> for RawRatings {
    fn from(sheet: RatingSheet) -> Self {
        sheet
            .values
            .into_iter()
            .map(|(id, value)| (i64::from(id), i64::from(value)))
            .collect()
    }
}
