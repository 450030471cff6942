use serde::Serialize;

/// Sales lifecycle phase a pillar is usually rated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarPhase {
    Discovery,
    Qualification,
    Commitment,
}

impl PillarPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Qualification => "Qualification",
            Self::Commitment => "Commitment",
        }
    }
}

/// One of the fifteen weighted SPPC criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pillar {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub weight: u8,
    pub phase: PillarPhase,
}

pub const PILLAR_COUNT: usize = 15;

/// Weights are percentages and sum to 100.
pub const PILLARS: [Pillar; PILLAR_COUNT] = [
    Pillar {
        id: 1,
        name: "Project clarity",
        description: "The prospect can describe the vehicle project in concrete terms.",
        weight: 8,
        phase: PillarPhase::Discovery,
    },
    Pillar {
        id: 2,
        name: "Purchase urgency",
        description: "A dated reason to buy: lease end, breakdown, family change.",
        weight: 10,
        phase: PillarPhase::Discovery,
    },
    Pillar {
        id: 3,
        name: "Financial reality",
        description: "Income, down payment and monthly budget match the target vehicle.",
        weight: 12,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 4,
        name: "Financing readiness",
        description: "Credit pre-approval or cash purchase confirmed.",
        weight: 8,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 5,
        name: "Trade-in situation",
        description: "Trade-in appraised and its payoff known.",
        weight: 5,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 6,
        name: "Decision-making circle",
        description: "Every person who signs or influences the purchase has been met.",
        weight: 8,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 7,
        name: "Vehicle fit",
        description: "Stock or order options cover the stated needs.",
        weight: 7,
        phase: PillarPhase::Discovery,
    },
    Pillar {
        id: 8,
        name: "Test drive experience",
        description: "Test drive done and feedback positive.",
        weight: 6,
        phase: PillarPhase::Commitment,
    },
    Pillar {
        id: 9,
        name: "Brand attachment",
        description: "Loyalty or preference for the brand sold in the showroom.",
        weight: 4,
        phase: PillarPhase::Discovery,
    },
    Pillar {
        id: 10,
        name: "Competitive shopping",
        description: "How little the prospect is shopping competing dealers.",
        weight: 5,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 11,
        name: "Engagement",
        description: "Answers calls, keeps appointments, replies to follow-ups.",
        weight: 6,
        phase: PillarPhase::Discovery,
    },
    Pillar {
        id: 12,
        name: "Objections handled",
        description: "Price, delivery and option objections answered.",
        weight: 6,
        phase: PillarPhase::Commitment,
    },
    Pillar {
        id: 13,
        name: "Budget alignment",
        description: "Quoted price sits inside the budget the prospect stated.",
        weight: 7,
        phase: PillarPhase::Qualification,
    },
    Pillar {
        id: 14,
        name: "Emotional commitment",
        description: "The prospect already projects themselves owning the vehicle.",
        weight: 4,
        phase: PillarPhase::Commitment,
    },
    Pillar {
        id: 15,
        name: "Next-step commitment",
        description: "A dated next step (signature, deposit, delivery) is agreed.",
        weight: 4,
        phase: PillarPhase::Commitment,
    },
];

/// Looks up a pillar by its 1-based id.
pub fn pillar(id: u8) -> Option<&'static Pillar> {
    PILLARS.iter().find(|pillar| pillar.id == id)
}

pub fn total_weight() -> u32 {
    PILLARS.iter().map(|pillar| u32::from(pillar.weight)).sum()
}
