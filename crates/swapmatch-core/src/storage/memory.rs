use crate::error::{Result, SwapError};
use crate::storage::filters::{RequestFilter, StoreStats};
use crate::storage::traits::{check_same_identity, RequestStore};
use crate::types::{ExchangeRequest, InterestRecord, ParticipantId, RequestId, RequestKind};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    /// Insertion order is iteration order.
    requests: Vec<ExchangeRequest>,
    interests: Vec<InterestRecord>,
}

/// In-memory store. All conditional inserts run under one write guard.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| SwapError::StoreUnavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| SwapError::StoreUnavailable("memory store lock poisoned".into()))
    }
}

impl RequestStore for MemoryStore {
    fn insert_request(&self, request: &ExchangeRequest) -> Result<()> {
        request.validate().map_err(SwapError::Validation)?;

        let mut tables = self.write()?;
        if tables
            .requests
            .iter()
            .any(|r| r.owner_id == request.owner_id && r.kind == request.kind)
        {
            return Err(SwapError::DuplicateRequest {
                owner: request.owner_id.clone(),
                kind: request.kind,
            });
        }
        tables.requests.push(request.clone());
        Ok(())
    }

    fn put_request(&self, request: &ExchangeRequest) -> Result<()> {
        request.validate().map_err(SwapError::Validation)?;

        let mut tables = self.write()?;
        let slot = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(SwapError::RequestNotFound(request.id))?;
        check_same_identity(slot, request)?;
        *slot = request.clone();
        Ok(())
    }

    fn get_request(&self, id: RequestId) -> Result<Option<ExchangeRequest>> {
        Ok(self.read()?.requests.iter().find(|r| r.id == id).cloned())
    }

    fn find_request(
        &self,
        owner: &ParticipantId,
        kind: RequestKind,
    ) -> Result<Option<ExchangeRequest>> {
        Ok(self
            .read()?
            .requests
            .iter()
            .find(|r| &r.owner_id == owner && r.kind == kind)
            .cloned())
    }

    fn delete_request(&self, id: RequestId) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.requests.len();
        tables.requests.retain(|r| r.id != id);
        Ok(tables.requests.len() != before)
    }

    fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ExchangeRequest>> {
        let tables = self.read()?;
        let matching = tables.requests.iter().filter(|r| filter.matches(r)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    fn insert_interest(&self, record: &InterestRecord) -> Result<()> {
        let mut tables = self.write()?;
        if tables.interests.iter().any(|i| {
            i.from_owner_id == record.from_owner_id && i.to_owner_id == record.to_owner_id
        }) {
            return Err(SwapError::DuplicateInterest {
                from: record.from_owner_id.clone(),
                to: record.to_owner_id.clone(),
            });
        }
        tables.interests.push(record.clone());
        Ok(())
    }

    fn get_interest(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Result<Option<InterestRecord>> {
        Ok(self
            .read()?
            .interests
            .iter()
            .find(|i| &i.from_owner_id == from && &i.to_owner_id == to)
            .cloned())
    }

    fn delete_interest(&self, from: &ParticipantId, to: &ParticipantId) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.interests.len();
        tables
            .interests
            .retain(|i| !(&i.from_owner_id == from && &i.to_owner_id == to));
        Ok(tables.interests.len() != before)
    }

    fn delete_interests_involving(&self, participant: &ParticipantId) -> Result<usize> {
        let mut tables = self.write()?;
        let before = tables.interests.len();
        tables.interests.retain(|i| !i.involves(participant));
        Ok(before - tables.interests.len())
    }

    fn list_interests(&self, participant: &ParticipantId) -> Result<Vec<InterestRecord>> {
        Ok(self
            .read()?
            .interests
            .iter()
            .filter(|i| i.involves(participant))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<StoreStats> {
        let tables = self.read()?;
        let mut stats = StoreStats {
            request_count: tables.requests.len() as u64,
            interest_count: tables.interests.len() as u64,
            ..Default::default()
        };
        for request in &tables.requests {
            *stats.request_counts_by_kind.entry(request.kind).or_insert(0) += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::*;

    fn participant(id: &str) -> Participant {
        Participant::new(id, format!("User {}", id), format!("{}@example.edu", id))
    }

    fn cycle_request(owner: &str, held: &str, wants: &str) -> ExchangeRequest {
        ExchangeRequest::new(
            &participant(owner),
            Resource::new(held).unwrap(),
            None,
            DesiredResources::Single(Resource::new(wants).unwrap()),
        )
    }

    #[test]
    fn test_insert_rejects_second_request_of_same_kind() {
        let store = MemoryStore::new();
        store.insert_request(&cycle_request("u1", "X", "Y")).unwrap();

        let err = store
            .insert_request(&cycle_request("u1", "X", "Z"))
            .unwrap_err();
        assert!(matches!(err, SwapError::DuplicateRequest { .. }));

        // A request of the other kind is fine
        let pref = ExchangeRequest::new(
            &participant("u1"),
            Resource::new("X").unwrap(),
            None,
            DesiredResources::Ranked(vec![Resource::new("Y").unwrap()]),
        );
        store.insert_request(&pref).unwrap();
        assert_eq!(store.stats().unwrap().request_count, 2);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = MemoryStore::new();
        let a = cycle_request("a", "X", "Y");
        let b = cycle_request("b", "Y", "Z");
        let c = cycle_request("c", "Z", "X");
        for r in [&b, &a, &c] {
            store.insert_request(r).unwrap();
        }

        let ids: Vec<_> = store
            .list_requests(RequestFilter::new())
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);

        let limited = store
            .list_requests(RequestFilter::new().with_limit(1))
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_put_request_updates_in_place() {
        let store = MemoryStore::new();
        let a = cycle_request("a", "X", "Y");
        let b = cycle_request("b", "Y", "X");
        store.insert_request(&a).unwrap();
        store.insert_request(&b).unwrap();

        let mut updated = a.clone();
        updated.held_resource = Resource::new("W").unwrap();
        store.put_request(&updated).unwrap();

        let all = store.list_requests(RequestFilter::new()).unwrap();
        assert_eq!(all[0].held_resource.as_str(), "W");
        assert_eq!(all[1].id, b.id);
    }

    #[test]
    fn test_put_request_does_not_resurrect_deleted() {
        let store = MemoryStore::new();
        let old = cycle_request("a", "X", "Y");
        store.insert_request(&old).unwrap();
        assert!(store.delete_request(old.id).unwrap());

        let fresh = cycle_request("a", "X", "Z");
        store.insert_request(&fresh).unwrap();

        // An edit read before the delete lands after it
        let mut edited = old.clone();
        edited.held_resource = Resource::new("W").unwrap();
        assert!(matches!(
            store.put_request(&edited),
            Err(SwapError::RequestNotFound(id)) if id == old.id
        ));

        let owned = store
            .list_requests(RequestFilter::new().with_owner(ParticipantId::new("a")))
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, fresh.id);
    }

    #[test]
    fn test_put_request_keeps_owner_and_kind() {
        let store = MemoryStore::new();
        let a = cycle_request("a", "X", "Y");
        store.insert_request(&a).unwrap();

        let mut moved = a.clone();
        moved.owner_id = ParticipantId::new("b");
        let err = store.put_request(&moved).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.get_request(a.id).unwrap(), Some(a));
    }

    #[test]
    fn test_interest_lifecycle() {
        let store = MemoryStore::new();
        let (a, b, c) = (
            ParticipantId::new("a"),
            ParticipantId::new("b"),
            ParticipantId::new("c"),
        );

        store
            .insert_interest(&InterestRecord::new(a.clone(), b.clone()))
            .unwrap();
        assert!(matches!(
            store.insert_interest(&InterestRecord::new(a.clone(), b.clone())),
            Err(SwapError::DuplicateInterest { .. })
        ));
        store
            .insert_interest(&InterestRecord::new(b.clone(), a.clone()))
            .unwrap();
        store
            .insert_interest(&InterestRecord::new(c.clone(), b.clone()))
            .unwrap();

        assert_eq!(store.list_interests(&b).unwrap().len(), 3);
        assert!(store.delete_interest(&a, &b).unwrap());
        assert!(!store.delete_interest(&a, &b).unwrap());

        assert_eq!(store.delete_interests_involving(&b).unwrap(), 2);
        assert_eq!(store.stats().unwrap().interest_count, 0);
    }
}
