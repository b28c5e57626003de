use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Type alias for request identifiers
pub type RequestId = Uuid;

/// Maximum number of ranked choices on a preference request.
pub const MAX_CHOICES: usize = 3;

/// Opaque participant identifier, issued by the identity provider.
///
/// The engine never interprets the value beyond [`ParticipantId::is_usable`]:
/// records whose owner id is blank or contains control characters are kept in
/// the store but never surface in match results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id can be displayed and contacted.
    pub fn is_usable(&self) -> bool {
        !self.0.trim().is_empty() && !self.0.chars().any(char::is_control)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The caller of an engine operation, as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// Email or similar. Only disclosed to counterparts of a confirmed match.
    pub contact: String,
}

impl Participant {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.into(),
            contact: contact.into(),
        }
    }
}

/// The two request variants. An owner holds at most one active request of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Up to three ranked desired resources. Matched pairwise, with an
    /// interest handshake on top.
    Preference,

    /// Exactly one desired resource. Matched as direct swaps, falling back
    /// to three-way chains.
    Cycle,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Preference => "preference",
            RequestKind::Cycle => "cycle",
        }
    }

    /// Convert to u8 for storage indexing
    pub fn to_u8(self) -> u8 {
        match self {
            RequestKind::Preference => 0,
            RequestKind::Cycle => 1,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(RequestKind::Preference),
            1 => Some(RequestKind::Cycle),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preference" => Ok(RequestKind::Preference),
            "cycle" => Ok(RequestKind::Cycle),
            other => Err(format!("Unknown request kind '{}'", other)),
        }
    }
}

/// A housing unit, compared by exact (whitespace-trimmed) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Returns `None` for blank names.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Preference rank, 1 (most wanted) through [`MAX_CHOICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(u8);

impl Rank {
    pub const FIRST: Rank = Rank(1);

    pub fn new(value: u8) -> Option<Self> {
        if (1..=MAX_CHOICES as u8).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn from_position(index: usize) -> Self {
        Self(index as u8 + 1)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a request owner would accept in exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredResources {
    /// Choices in rank order: index 0 is rank 1.
    Ranked(Vec<Resource>),

    /// The single acceptable resource, implicitly rank 1.
    Single(Resource),
}

impl DesiredResources {
    pub fn kind(&self) -> RequestKind {
        match self {
            DesiredResources::Ranked(_) => RequestKind::Preference,
            DesiredResources::Single(_) => RequestKind::Cycle,
        }
    }

    /// Rank at which `resource` is desired, if at all.
    pub fn rank_of(&self, resource: &Resource) -> Option<Rank> {
        match self {
            DesiredResources::Ranked(choices) => choices
                .iter()
                .position(|c| c == resource)
                .map(Rank::from_position),
            DesiredResources::Single(choice) => (choice == resource).then_some(Rank::FIRST),
        }
    }

    /// Choices paired with their rank, best first.
    pub fn ranked(&self) -> Vec<(Rank, &Resource)> {
        match self {
            DesiredResources::Ranked(choices) => choices
                .iter()
                .enumerate()
                .map(|(i, c)| (Rank::from_position(i), c))
                .collect(),
            DesiredResources::Single(choice) => vec![(Rank::FIRST, choice)],
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if let DesiredResources::Ranked(choices) = self {
            if choices.is_empty() {
                return Err("At least one desired resource is required".to_string());
            }
            if choices.len() > MAX_CHOICES {
                return Err(format!(
                    "At most {} desired resources are allowed, got {}",
                    MAX_CHOICES,
                    choices.len()
                ));
            }
            for (i, choice) in choices.iter().enumerate() {
                if choices[..i].contains(choice) {
                    return Err(format!("Desired resource '{}' is listed twice", choice));
                }
            }
        }
        Ok(())
    }
}

/// One participant's standing offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// Primary key. UUIDv7, so store order is creation order.
    #[serde(rename = "_id")]
    pub id: RequestId,

    pub kind: RequestKind,

    pub owner_id: ParticipantId,

    /// Owner's display name at creation time.
    pub owner_name: String,

    /// Owner's contact at creation time. Redacted in match views
    /// until the match is confirmed.
    pub owner_contact: String,

    pub held_resource: Resource,

    /// Free-form sub-unit qualifier, e.g. a room letter.
    pub held_resource_detail: Option<String>,

    pub desired: DesiredResources,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ExchangeRequest {
    pub fn new(
        owner: &Participant,
        held_resource: Resource,
        held_resource_detail: Option<String>,
        desired: DesiredResources,
    ) -> Self {
        let now = Utc::now();
        ExchangeRequest {
            id: Uuid::now_v7(),
            kind: desired.kind(),
            owner_id: owner.id.clone(),
            owner_name: owner.display_name.clone(),
            owner_contact: owner.contact.clone(),
            held_resource,
            held_resource_detail,
            desired,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.kind != self.desired.kind() {
            return Err(format!(
                "Request kind {} does not match its desired resources ({})",
                self.kind,
                self.desired.kind()
            ));
        }
        self.desired.validate()
    }

    /// Rank at which this request's owner wants `other`'s held resource.
    pub fn wants(&self, other: &ExchangeRequest) -> Option<Rank> {
        self.desired.rank_of(&other.held_resource)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// "`from_owner_id` is willing to proceed with `to_owner_id`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecord {
    pub from_owner_id: ParticipantId,
    pub to_owner_id: ParticipantId,
    pub created_at: DateTime<Utc>,
}

impl InterestRecord {
    pub fn new(from: ParticipantId, to: ParticipantId) -> Self {
        Self {
            from_owner_id: from,
            to_owner_id: to,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, participant: &ParticipantId) -> bool {
        &self.from_owner_id == participant || &self.to_owner_id == participant
    }
}
