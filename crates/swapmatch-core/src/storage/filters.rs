use crate::types::{ExchangeRequest, ParticipantId, RequestKind};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Filter criteria for listing requests
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub kind: Option<RequestKind>,
    pub owner: Option<ParticipantId>,
    pub created_after: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl RequestFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by request kind
    pub fn with_kind(mut self, kind: RequestKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter by owner
    pub fn with_owner(mut self, owner: ParticipantId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Filter by creation time (after this time)
    pub fn created_after(mut self, time: DateTime<Utc>) -> Self {
        self.created_after = Some(time);
        self
    }

    /// Limit number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a request matches the filter criteria
    pub fn matches(&self, request: &ExchangeRequest) -> bool {
        if let Some(kind) = self.kind {
            if request.kind != kind {
                return false;
            }
        }

        if let Some(ref owner) = self.owner {
            if &request.owner_id != owner {
                return false;
            }
        }

        if let Some(after) = self.created_after {
            if request.created_at < after {
                return false;
            }
        }

        true
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub request_count: u64,
    pub request_counts_by_kind: HashMap<RequestKind, u64>,
    pub interest_count: u64,
}
