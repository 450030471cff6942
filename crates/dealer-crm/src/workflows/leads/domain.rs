use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assignment::{AssignmentRequest, SalespersonId};
use super::validation::ValidationError;

/// Identifier wrapper for captured leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the prospect first reached the dealership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureChannel {
    Phone,
    Showroom,
}

impl CaptureChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone call",
            Self::Showroom => "Showroom visit",
        }
    }
}

/// Raw lead-capture payload from the reception desk or the phone team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCapture {
    pub channel: CaptureChannel,
    pub prospect_name: String,
    pub contact: String,
    #[serde(default)]
    pub vehicle_interest: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Salesperson picked by the receptionist instead of the recommendation.
    #[serde(default)]
    pub requested_salesperson: Option<SalespersonId>,
    #[serde(default)]
    pub force: bool,
}

impl LeadCapture {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prospect_name.trim().is_empty() {
            return Err(ValidationError::MissingCaptureField("prospect name"));
        }
        if self.contact.trim().is_empty() {
            return Err(ValidationError::MissingCaptureField("contact"));
        }
        Ok(())
    }

    pub fn assignment_request(&self) -> AssignmentRequest {
        match &self.requested_salesperson {
            Some(salesperson_id) => AssignmentRequest::Manual {
                salesperson_id: salesperson_id.clone(),
                force: self.force,
            },
            None => AssignmentRequest::Recommended,
        }
    }
}

/// Lead after intake, stamped with its identifier and capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedLead {
    pub lead_id: LeadId,
    pub channel: CaptureChannel,
    pub prospect_name: String,
    pub contact: String,
    pub vehicle_interest: Option<String>,
    pub notes: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl CapturedLead {
    pub fn from_capture(lead_id: LeadId, capture: LeadCapture, captured_at: DateTime<Utc>) -> Self {
        let LeadCapture {
            channel,
            prospect_name,
            contact,
            vehicle_interest,
            notes,
            ..
        } = capture;

        Self {
            lead_id,
            channel,
            prospect_name: prospect_name.trim().to_string(),
            contact: contact.trim().to_string(),
            vehicle_interest,
            notes,
            captured_at,
        }
    }
}
