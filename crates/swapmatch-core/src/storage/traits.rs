use crate::error::{Result, SwapError};
use crate::storage::filters::{RequestFilter, StoreStats};
use crate::types::{ExchangeRequest, InterestRecord, ParticipantId, RequestId, RequestKind};

/// Durable home of exchange requests and interest records.
///
/// Every read-then-write invariant check (one active request per owner and
/// kind, one interest record per ordered pair) happens inside a single call,
/// so implementations can make it atomic.
pub trait RequestStore: Send + Sync {
    // === Request Operations ===

    /// Insert a new request. Fails with `DuplicateRequest` if the owner already
    /// has an active request of the same kind.
    fn insert_request(&self, request: &ExchangeRequest) -> Result<()>;

    /// Replace a stored request. Fails with `RequestNotFound` if it has been
    /// deleted, and with `Validation` if the owner or kind would change.
    fn put_request(&self, request: &ExchangeRequest) -> Result<()>;

    /// Retrieve a request by ID
    fn get_request(&self, id: RequestId) -> Result<Option<ExchangeRequest>>;

    /// The owner's active request of the given kind, if any
    fn find_request(
        &self,
        owner: &ParticipantId,
        kind: RequestKind,
    ) -> Result<Option<ExchangeRequest>>;

    /// Hard delete. Returns whether a record was removed.
    fn delete_request(&self, id: RequestId) -> Result<bool>;

    /// List requests matching the filter, in store iteration order
    fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ExchangeRequest>>;

    // === Interest Operations ===

    /// Insert an interest record. Fails with `DuplicateInterest` if the
    /// same direction already exists.
    fn insert_interest(&self, record: &InterestRecord) -> Result<()>;

    fn get_interest(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Result<Option<InterestRecord>>;

    /// Returns whether a record was removed.
    fn delete_interest(&self, from: &ParticipantId, to: &ParticipantId) -> Result<bool>;

    /// Remove every record naming `participant` on either side. Returns the
    /// number removed.
    fn delete_interests_involving(&self, participant: &ParticipantId) -> Result<usize>;

    /// Every record naming `participant` on either side
    fn list_interests(&self, participant: &ParticipantId) -> Result<Vec<InterestRecord>>;

    // === Maintenance ===

    fn stats(&self) -> Result<StoreStats>;
}

/// A replacement must keep the stored request's owner and kind.
pub(crate) fn check_same_identity(
    stored: &ExchangeRequest,
    replacement: &ExchangeRequest,
) -> Result<()> {
    if stored.owner_id != replacement.owner_id || stored.kind != replacement.kind {
        return Err(SwapError::Validation(format!(
            "Request {} cannot change owner or kind",
            replacement.id
        )));
    }
    Ok(())
}
