//! Typed request bodies for the mutating operations.
//!
//! Every field is optional at the wire level; which ones are required
//! depends on the operation and the request kind. Blank strings count as
//! absent.

use crate::error::{Result, SwapError};
use crate::types::{
    DesiredResources, ExchangeRequest, Participant, ParticipantId, RequestId, RequestKind,
    Resource,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields for creating or updating an exchange request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPayload {
    pub held_resource: Option<String>,
    pub held_resource_detail: Option<String>,
    pub first_choice: Option<String>,
    pub second_choice: Option<String>,
    pub third_choice: Option<String>,
    pub desired_choice: Option<String>,
}

fn present_resource(value: &Option<String>) -> Option<Resource> {
    value.as_deref().and_then(Resource::new)
}

fn detail(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl RequestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_held(mut self, resource: impl Into<String>) -> Self {
        self.held_resource = Some(resource.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.held_resource_detail = Some(detail.into());
        self
    }

    /// Set the three ranked choices of a preference request.
    pub fn with_choices(mut self, first: &str, second: &str, third: &str) -> Self {
        self.first_choice = Some(first.to_string());
        self.second_choice = Some(second.to_string());
        self.third_choice = Some(third.to_string());
        self
    }

    pub fn with_desired(mut self, resource: impl Into<String>) -> Self {
        self.desired_choice = Some(resource.into());
        self
    }

    fn ranked_fields(&self) -> [(&'static str, &Option<String>); 3] {
        [
            ("first_choice", &self.first_choice),
            ("second_choice", &self.second_choice),
            ("third_choice", &self.third_choice),
        ]
    }

    /// Build a new request of `kind` for `owner`. Preference requests need all
    /// three choices; cycle requests need the single desired choice.
    pub fn into_request(self, owner: &Participant, kind: RequestKind) -> Result<ExchangeRequest> {
        let mut missing = Vec::new();

        let held = present_resource(&self.held_resource);
        if held.is_none() {
            missing.push("held_resource");
        }

        let desired = match kind {
            RequestKind::Preference => {
                let mut choices = Vec::with_capacity(3);
                for (name, value) in self.ranked_fields() {
                    match present_resource(value) {
                        Some(resource) => choices.push(resource),
                        None => missing.push(name),
                    }
                }
                Some(DesiredResources::Ranked(choices))
            }
            RequestKind::Cycle => {
                let single = present_resource(&self.desired_choice).map(DesiredResources::Single);
                if single.is_none() {
                    missing.push("desired_choice");
                }
                single
            }
        };

        let (held, desired) = match (held, desired) {
            (Some(held), Some(desired)) if missing.is_empty() => (held, desired),
            _ => return Err(SwapError::MissingFields(missing)),
        };

        let request = ExchangeRequest::new(owner, held, detail(&self.held_resource_detail), desired);
        request.validate().map_err(SwapError::Validation)?;
        Ok(request)
    }

    /// Merge supplied fields into `request`. Each supplied field fully
    /// replaces the stored value; fields that do not apply to the request's
    /// kind are ignored. Returns whether anything changed.
    pub fn apply_to(&self, request: &mut ExchangeRequest) -> Result<bool> {
        let supplied = match request.kind {
            RequestKind::Preference => self.ranked_fields().iter().any(|(_, v)| v.is_some()),
            RequestKind::Cycle => self.desired_choice.is_some(),
        } || self.held_resource.is_some()
            || self.held_resource_detail.is_some();
        if !supplied {
            return Err(SwapError::Validation(
                "No updatable fields provided".to_string(),
            ));
        }

        let mut updated = request.clone();

        if let Some(raw) = &self.held_resource {
            updated.held_resource = Resource::new(raw).ok_or_else(|| blank("held_resource"))?;
        }
        if self.held_resource_detail.is_some() {
            updated.held_resource_detail = detail(&self.held_resource_detail);
        }

        match &mut updated.desired {
            DesiredResources::Ranked(choices) => {
                for (position, (name, value)) in self.ranked_fields().into_iter().enumerate() {
                    let Some(raw) = value else { continue };
                    let resource = Resource::new(raw).ok_or_else(|| blank(name))?;
                    if position < choices.len() {
                        choices[position] = resource;
                    } else if position == choices.len() {
                        choices.push(resource);
                    } else {
                        return Err(SwapError::Validation(format!(
                            "{} cannot be set before the choices that rank above it",
                            name
                        )));
                    }
                }
            }
            DesiredResources::Single(choice) => {
                if let Some(raw) = &self.desired_choice {
                    *choice = Resource::new(raw).ok_or_else(|| blank("desired_choice"))?;
                }
            }
        }

        updated.validate().map_err(SwapError::Validation)?;

        if updated == *request {
            return Ok(false);
        }
        updated.touch();
        *request = updated;
        Ok(true)
    }
}

fn blank(field: &str) -> SwapError {
    SwapError::Validation(format!("{} must not be blank", field))
}

/// Body of the interest operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestPayload {
    pub other_user_id: Option<String>,
}

impl InterestPayload {
    pub fn new(other: impl Into<String>) -> Self {
        Self {
            other_user_id: Some(other.into()),
        }
    }

    /// The counterpart named by the payload.
    pub fn target(&self) -> Result<ParticipantId> {
        self.other_user_id
            .as_deref()
            .map(ParticipantId::new)
            .filter(ParticipantId::is_usable)
            .ok_or_else(|| SwapError::MissingFields(vec!["other_user_id"]))
    }
}

/// Parse a request id supplied as a string.
pub fn parse_request_id(raw: &str) -> Result<RequestId> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| SwapError::Validation(format!("Invalid request id '{}': {}", raw, e)))
}
