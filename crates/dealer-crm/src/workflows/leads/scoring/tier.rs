use serde::{Deserialize, Serialize};

/// Prospect classification derived from a pillar score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Elite,
    Qualified,
    ToMature,
    Explorer,
}

impl Tier {
    pub const fn ordered() -> [Self; 4] {
        [Self::Elite, Self::Qualified, Self::ToMature, Self::Explorer]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Elite => "Elite",
            Self::Qualified => "Qualified",
            Self::ToMature => "To-Mature",
            Self::Explorer => "Explorer",
        }
    }

    pub const fn follow_up(self) -> &'static str {
        match self {
            Self::Elite => "close this week: propose order and delivery date",
            Self::Qualified => "book a second visit with the decision makers",
            Self::ToMature => "nurture with a dated follow-up and financing simulation",
            Self::Explorer => "keep in the newsletter cycle",
        }
    }
}

/// Lower bounds of each tier, checked from the highest tier down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub elite: u8,
    pub qualified: u8,
    pub to_mature: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            elite: 85,
            qualified: 65,
            to_mature: 40,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, score: u8) -> Tier {
        if score >= self.elite {
            Tier::Elite
        } else if score >= self.qualified {
            Tier::Qualified
        } else if score >= self.to_mature {
            Tier::ToMature
        } else {
            Tier::Explorer
        }
    }
}
