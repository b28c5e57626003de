use crate::error::Result;
use crate::storage::RequestStore;
use crate::types::{InterestRecord, ParticipantId};
use serde::Serialize;
use std::collections::HashSet;

/// Handshake state between two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InterestState {
    /// Neither side has expressed interest.
    NoInterest,
    /// Exactly one direction exists.
    OneSided {
        from: ParticipantId,
        to: ParticipantId,
    },
    /// Both directions exist.
    MutuallyConfirmed,
}

impl InterestState {
    /// State of the pair as currently recorded in `store`.
    pub fn between<S: RequestStore + ?Sized>(
        store: &S,
        a: &ParticipantId,
        b: &ParticipantId,
    ) -> Result<Self> {
        let a_to_b = store.get_interest(a, b)?.is_some();
        let b_to_a = store.get_interest(b, a)?.is_some();
        Ok(Self::from_directions(a, b, a_to_b, b_to_a))
    }

    pub fn from_directions(a: &ParticipantId, b: &ParticipantId, a_to_b: bool, b_to_a: bool) -> Self {
        match (a_to_b, b_to_a) {
            (true, true) => InterestState::MutuallyConfirmed,
            (true, false) => InterestState::OneSided {
                from: a.clone(),
                to: b.clone(),
            },
            (false, true) => InterestState::OneSided {
                from: b.clone(),
                to: a.clone(),
            },
            (false, false) => InterestState::NoInterest,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, InterestState::MutuallyConfirmed)
    }
}

/// Interest directions between one viewer and one counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterestFlags {
    pub i_expressed: bool,
    pub they_expressed: bool,
}

impl InterestFlags {
    pub fn mutually_confirmed(&self) -> bool {
        self.i_expressed && self.they_expressed
    }
}

/// Snapshot of every interest record touching one viewer, loaded once per
/// match query instead of two store lookups per counterpart.
pub struct InterestLedger {
    viewer: ParticipantId,
    outgoing: HashSet<ParticipantId>,
    incoming: HashSet<ParticipantId>,
}

impl InterestLedger {
    pub fn load<S: RequestStore + ?Sized>(store: &S, viewer: &ParticipantId) -> Result<Self> {
        Ok(Self::from_records(viewer, store.list_interests(viewer)?))
    }

    pub fn from_records(
        viewer: &ParticipantId,
        records: impl IntoIterator<Item = InterestRecord>,
    ) -> Self {
        let mut outgoing = HashSet::new();
        let mut incoming = HashSet::new();
        for record in records {
            if &record.from_owner_id == viewer {
                outgoing.insert(record.to_owner_id);
            } else if &record.to_owner_id == viewer {
                incoming.insert(record.from_owner_id);
            }
        }
        Self {
            viewer: viewer.clone(),
            outgoing,
            incoming,
        }
    }

    pub fn viewer(&self) -> &ParticipantId {
        &self.viewer
    }

    pub fn flags(&self, counterpart: &ParticipantId) -> InterestFlags {
        InterestFlags {
            i_expressed: self.outgoing.contains(counterpart),
            they_expressed: self.incoming.contains(counterpart),
        }
    }
}
