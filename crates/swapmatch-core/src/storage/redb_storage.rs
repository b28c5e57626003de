use crate::error::{Result, SwapError};
use crate::storage::filters::{RequestFilter, StoreStats};
use crate::storage::traits::{check_same_identity, RequestStore};
use crate::types::{ExchangeRequest, InterestRecord, ParticipantId, RequestId, RequestKind};
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Table definitions
const REQUESTS: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("requests");
const INTERESTS: TableDefinition<&str, &[u8]> = TableDefinition::new("interests");

// Secondary index: owner id -> request ids
const REQUESTS_BY_OWNER: MultimapTableDefinition<&str, &[u8; 16]> =
    MultimapTableDefinition::new("requests_by_owner");

// Metadata table
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Separates the two participant ids in an interest key.
const INTEREST_KEY_SEPARATOR: char = '\u{1f}';

/// Redb-based request store
pub struct RedbStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStore {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SwapError::StoreUnavailable(format!("Failed to create directory: {}", e))
            })?;
        }

        let is_new = !path.exists();
        let db = Database::create(&path)?;

        if !is_new {
            Self::check_schema_version(&db)?;
        }

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(REQUESTS)?;
            let _ = write_txn.open_table(INTERESTS)?;
            let _ = write_txn.open_multimap_table(REQUESTS_BY_OWNER)?;
            let mut meta = write_txn.open_table(META)?;
            if is_new {
                meta.insert(
                    SCHEMA_VERSION_KEY,
                    CURRENT_SCHEMA_VERSION.to_string().as_bytes(),
                )?;
            }
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Check schema version. Returns error on mismatch.
    fn check_schema_version(db: &Database) -> Result<()> {
        let read_txn = db.begin_read()?;
        let version = {
            let table = read_txn.open_table(META).ok();
            table.and_then(|t| {
                t.get(SCHEMA_VERSION_KEY).ok().flatten().and_then(|v| {
                    std::str::from_utf8(v.value())
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                })
            })
        };

        match version {
            Some(v) if v == CURRENT_SCHEMA_VERSION => Ok(()),
            Some(v) => Err(SwapError::Validation(format!(
                "Store schema v{} does not match this binary (v{})",
                v, CURRENT_SCHEMA_VERSION
            ))),
            None => Err(SwapError::Validation(
                "Store has no schema version; not a swapmatch database".to_string(),
            )),
        }
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn uuid_to_bytes(id: &uuid::Uuid) -> [u8; 16] {
        *id.as_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(SwapError::from)
    }

    fn deserialize_request(bytes: &[u8]) -> Result<ExchangeRequest> {
        bincode::deserialize(bytes).map_err(SwapError::from)
    }

    fn deserialize_interest(bytes: &[u8]) -> Result<InterestRecord> {
        bincode::deserialize(bytes).map_err(SwapError::from)
    }

    fn interest_key(from: &ParticipantId, to: &ParticipantId) -> String {
        format!("{}{}{}", from, INTEREST_KEY_SEPARATOR, to)
    }

    /// Request ids indexed under `owner`, in id (creation) order
    fn owner_request_ids(
        index: &impl ReadableMultimapTable<&'static str, &'static [u8; 16]>,
        owner: &ParticipantId,
    ) -> Result<Vec<[u8; 16]>> {
        Ok(index
            .get(owner.as_str())?
            .map(|r| r.map(|g| *g.value()))
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl RequestStore for RedbStore {
    fn insert_request(&self, request: &ExchangeRequest) -> Result<()> {
        request.validate().map_err(SwapError::Validation)?;

        let id_bytes = Self::uuid_to_bytes(&request.id);
        let request_bytes = Self::serialize(request)?;

        // Single write transaction: duplicate check and insert are atomic
        let write_txn = self.db.begin_write()?;
        {
            let owned: Vec<[u8; 16]> = {
                let index = write_txn.open_multimap_table(REQUESTS_BY_OWNER)?;
                Self::owner_request_ids(&index, &request.owner_id)?
            };

            let mut requests = write_txn.open_table(REQUESTS)?;
            for existing_id in &owned {
                let existing = requests
                    .get(existing_id)?
                    .map(|g| Self::deserialize_request(g.value()))
                    .transpose()?;
                if let Some(existing) = existing {
                    if existing.kind == request.kind {
                        return Err(SwapError::DuplicateRequest {
                            owner: request.owner_id.clone(),
                            kind: request.kind,
                        });
                    }
                }
            }

            requests.insert(&id_bytes, request_bytes.as_slice())?;
        }
        {
            let mut index = write_txn.open_multimap_table(REQUESTS_BY_OWNER)?;
            index.insert(request.owner_id.as_str(), &id_bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn put_request(&self, request: &ExchangeRequest) -> Result<()> {
        request.validate().map_err(SwapError::Validation)?;

        let id_bytes = Self::uuid_to_bytes(&request.id);
        let request_bytes = Self::serialize(request)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut requests = write_txn.open_table(REQUESTS)?;
            // Dropping the uncommitted transaction aborts the write
            let stored = requests
                .get(&id_bytes)?
                .map(|g| Self::deserialize_request(g.value()))
                .transpose()?
                .ok_or(SwapError::RequestNotFound(request.id))?;
            check_same_identity(&stored, request)?;
            requests.insert(&id_bytes, request_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_request(&self, id: RequestId) -> Result<Option<ExchangeRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REQUESTS)?;
        let id_bytes = Self::uuid_to_bytes(&id);

        if let Some(bytes) = table.get(&id_bytes)? {
            Ok(Some(Self::deserialize_request(bytes.value())?))
        } else {
            Ok(None)
        }
    }

    fn find_request(
        &self,
        owner: &ParticipantId,
        kind: RequestKind,
    ) -> Result<Option<ExchangeRequest>> {
        let read_txn = self.db.begin_read()?;
        let requests = read_txn.open_table(REQUESTS)?;
        let index = read_txn.open_multimap_table(REQUESTS_BY_OWNER)?;

        for id_bytes in Self::owner_request_ids(&index, owner)? {
            if let Some(bytes) = requests.get(&id_bytes)? {
                let request = Self::deserialize_request(bytes.value())?;
                if request.kind == kind {
                    return Ok(Some(request));
                }
            }
        }
        Ok(None)
    }

    fn delete_request(&self, id: RequestId) -> Result<bool> {
        let id_bytes = Self::uuid_to_bytes(&id);

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut requests = write_txn.open_table(REQUESTS)?;
            let removed = requests.remove(&id_bytes)?.map(|g| g.value().to_vec());
            removed
                .map(|bytes| Self::deserialize_request(&bytes))
                .transpose()?
        };

        let Some(removed) = removed else {
            return Ok(false);
        };

        {
            let mut index = write_txn.open_multimap_table(REQUESTS_BY_OWNER)?;
            index.remove(removed.owner_id.as_str(), &id_bytes)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ExchangeRequest>> {
        let read_txn = self.db.begin_read()?;
        let requests_table = read_txn.open_table(REQUESTS)?;

        let mut requests = Vec::new();
        let limit_reached = |found: &Vec<ExchangeRequest>| {
            filter.limit.map(|l| found.len() >= l).unwrap_or(false)
        };

        if let Some(ref owner) = filter.owner {
            // Owner filter: use the index instead of a full scan
            let index = read_txn.open_multimap_table(REQUESTS_BY_OWNER)?;
            for id_bytes in Self::owner_request_ids(&index, owner)? {
                if limit_reached(&requests) {
                    break;
                }
                if let Some(bytes) = requests_table.get(&id_bytes)? {
                    let request = Self::deserialize_request(bytes.value())?;
                    if filter.matches(&request) {
                        requests.push(request);
                    }
                }
            }
        } else {
            // Full table scan. UUIDv7 keys iterate in creation order.
            for item in requests_table.iter()? {
                if limit_reached(&requests) {
                    break;
                }
                let (_, value) = item?;
                let request = Self::deserialize_request(value.value())?;
                if filter.matches(&request) {
                    requests.push(request);
                }
            }
        }

        Ok(requests)
    }

    fn insert_interest(&self, record: &InterestRecord) -> Result<()> {
        let key = Self::interest_key(&record.from_owner_id, &record.to_owner_id);
        let record_bytes = Self::serialize(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut interests = write_txn.open_table(INTERESTS)?;
            if interests.get(key.as_str())?.is_some() {
                return Err(SwapError::DuplicateInterest {
                    from: record.from_owner_id.clone(),
                    to: record.to_owner_id.clone(),
                });
            }
            interests.insert(key.as_str(), record_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_interest(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Result<Option<InterestRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTERESTS)?;
        let key = Self::interest_key(from, to);

        if let Some(bytes) = table.get(key.as_str())? {
            Ok(Some(Self::deserialize_interest(bytes.value())?))
        } else {
            Ok(None)
        }
    }

    fn delete_interest(&self, from: &ParticipantId, to: &ParticipantId) -> Result<bool> {
        let key = Self::interest_key(from, to);

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut interests = write_txn.open_table(INTERESTS)?;
            let removed = interests.remove(key.as_str())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn delete_interests_involving(&self, participant: &ParticipantId) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut interests = write_txn.open_table(INTERESTS)?;

            let mut doomed = Vec::new();
            for item in interests.iter()? {
                let (key, value) = item?;
                let record = Self::deserialize_interest(value.value())?;
                if record.involves(participant) {
                    doomed.push(key.value().to_string());
                }
            }

            for key in &doomed {
                interests.remove(key.as_str())?;
            }
            doomed.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn list_interests(&self, participant: &ParticipantId) -> Result<Vec<InterestRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTERESTS)?;

        let mut records = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            let record = Self::deserialize_interest(value.value())?;
            if record.involves(participant) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn stats(&self) -> Result<StoreStats> {
        let read_txn = self.db.begin_read()?;
        let requests = read_txn.open_table(REQUESTS)?;
        let interests = read_txn.open_table(INTERESTS)?;

        let mut stats = StoreStats::default();
        for item in requests.iter()? {
            let (_, value) = item?;
            let request = Self::deserialize_request(value.value())?;
            stats.request_count += 1;
            *stats.request_counts_by_kind.entry(request.kind).or_insert(0) += 1;
        }
        stats.interest_count = interests.iter()?.count() as u64;

        Ok(stats)
    }
}
