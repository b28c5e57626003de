pub mod types;
pub mod storage;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod rank;
pub mod interest;
pub mod presentation;
pub mod payload;
pub mod api;

pub use error::{ErrorKind, Result, SwapError};
pub use types::*;
pub use storage::{
    MemoryStore, RedbStore, RequestFilter, RequestStore, StoreStats, CURRENT_SCHEMA_VERSION,
};
pub use api::{EngineConfig, SwapEngine, DEFAULT_CONTACT_PLACEHOLDER};
pub use graph::{NodeIndex, WantsEdge, WantsGraph};
pub use matcher::{
    all_mutual, chains_for, cycle_matches_for, mutual_for, Chain, CycleMatches, DirectSwap,
    PairMatch,
};
pub use rank::{MatchType, RankPair};
pub use interest::{InterestFlags, InterestLedger, InterestState};
pub use presentation::{
    present, to_public, CycleMatchView, MutualMatchView, OwnRequestView, PairMatchView, PartyView,
};
pub use payload::{parse_request_id, InterestPayload, RequestPayload};
