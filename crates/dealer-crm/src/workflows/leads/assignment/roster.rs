use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::validation::ValidationError;

/// Identifier wrapper for salespeople on the guard-duty roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalespersonId(pub String);

impl SalespersonId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for SalespersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A salesperson's position on today's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalespersonLoad {
    pub salesperson_id: SalespersonId,
    #[serde(default)]
    pub name: String,
    pub current_load: u32,
    pub daily_target: u32,
    pub on_duty: bool,
}

impl SalespersonLoad {
    /// `current_load / daily_target` as a percentage, rounded half up.
    pub fn load_percentage(&self) -> u32 {
        if self.daily_target == 0 {
            return 0;
        }
        let load = u64::from(self.current_load);
        let target = u64::from(self.daily_target);
        let rounded = (load * 200 + target) / (target * 2);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }

    pub(crate) fn with_assignment(&self) -> Self {
        Self {
            current_load: self.current_load.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn snapshot(&self) -> LoadSnapshot {
        LoadSnapshot {
            salesperson_id: self.salesperson_id.clone(),
            name: self.name.clone(),
            current_load: self.current_load,
            daily_target: self.daily_target,
            load_percentage: self.load_percentage(),
            on_duty: self.on_duty,
        }
    }
}

/// Read-only view of one roster member with the derived percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    pub salesperson_id: SalespersonId,
    pub name: String,
    pub current_load: u32,
    pub daily_target: u32,
    pub load_percentage: u32,
    pub on_duty: bool,
}

/// Aggregate load across the on-duty members of a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterStatistics {
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub difference: u32,
    pub has_imbalance: bool,
}

impl RosterStatistics {
    /// Returns `None` when no member is on duty.
    pub fn from_members<'a, I>(members: I, imbalance_threshold: u32) -> Option<Self>
    where
        I: IntoIterator<Item = &'a SalespersonLoad>,
    {
        let loads: Vec<u32> = members
            .into_iter()
            .filter(|member| member.on_duty)
            .map(|member| member.current_load)
            .collect();

        let min = loads.iter().copied().min()?;
        let max = loads.iter().copied().max()?;
        let total: u64 = loads.iter().map(|load| u64::from(*load)).sum();
        let difference = max - min;

        Some(Self {
            average: total as f64 / loads.len() as f64,
            min,
            max,
            difference,
            has_imbalance: difference > imbalance_threshold,
        })
    }
}

/// Rejects rosters the balancer cannot reason about.
pub fn validate_roster(roster: &[SalespersonLoad]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for member in roster {
        if member.daily_target == 0 {
            return Err(ValidationError::InvalidDailyTarget(
                member.salesperson_id.clone(),
            ));
        }
        if !seen.insert(&member.salesperson_id) {
            return Err(ValidationError::DuplicateSalesperson(
                member.salesperson_id.clone(),
            ));
        }
    }
    Ok(())
}
