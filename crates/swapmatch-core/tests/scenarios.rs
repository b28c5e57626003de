//! End-to-end scenarios run against both store implementations.

use std::sync::Arc;
use swapmatch_core::*;
use tempfile::TempDir;

fn person(id: &str) -> Participant {
    Participant::new(id, format!("User {}", id), format!("{}@example.edu", id))
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn memory_engine() -> SwapEngine<MemoryStore> {
    init_logging();
    SwapEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default()).unwrap()
}

fn redb_engine() -> (SwapEngine<RedbStore>, TempDir) {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let engine = SwapEngine::open(temp_dir.path().join("swapmatch.redb"), EngineConfig::default())
        .unwrap();
    (engine, temp_dir)
}

fn cycle<S: RequestStore>(engine: &SwapEngine<S>, who: &Participant, held: &str, wants: &str) {
    let payload = RequestPayload::new().with_held(held).with_desired(wants);
    engine
        .create_request(who, RequestKind::Cycle, payload)
        .unwrap();
}

fn prefer<S: RequestStore>(
    engine: &SwapEngine<S>,
    who: &Participant,
    held: &str,
    choices: [&str; 3],
) -> RequestId {
    let payload = RequestPayload::new()
        .with_held(held)
        .with_choices(choices[0], choices[1], choices[2]);
    engine
        .create_request(who, RequestKind::Preference, payload)
        .unwrap()
}

fn direct_swap_for_both<S: RequestStore>(engine: SwapEngine<S>) {
    let (a, b) = (person("a"), person("b"));
    cycle(&engine, &a, "X", "Y");
    cycle(&engine, &b, "Y", "X");

    for (me, other) in [(&a, &b), (&b, &a)] {
        let matches = engine.list_cycle_matches(me).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_type, MatchType::DirectSwap);
        assert_eq!(matches[0].other.user_id, other.id);
        assert!(matches[0].third.is_none());
    }
}

fn chain_rotates<S: RequestStore>(engine: SwapEngine<S>) {
    let (a, b, c) = (person("a"), person("b"), person("c"));
    cycle(&engine, &a, "X", "Y");
    cycle(&engine, &b, "Y", "Z");
    cycle(&engine, &c, "Z", "X");

    for (me, second, third) in [(&a, &b, &c), (&b, &c, &a), (&c, &a, &b)] {
        let matches = engine.list_cycle_matches(me).unwrap();
        assert_eq!(matches.len(), 1, "chain for {}", me.id);
        assert_eq!(matches[0].match_type, MatchType::ThreeWayChain);
        assert_eq!(matches[0].other.user_id, second.id);
        assert_eq!(
            matches[0].third.as_ref().map(|p| p.user_id.clone()),
            Some(third.id.clone())
        );
    }
}

fn duplicate_request_rejected<S: RequestStore>(engine: SwapEngine<S>) {
    let a = person("a");
    prefer(&engine, &a, "X", ["Y", "Z", "W"]);

    let payload = RequestPayload::new()
        .with_held("X")
        .with_choices("P", "Q", "R");
    let err = engine
        .create_request(&a, RequestKind::Preference, payload)
        .unwrap_err();
    assert!(matches!(err, SwapError::DuplicateRequest { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // The other kind is independent
    cycle(&engine, &a, "X", "Y");
    let stats = engine.stats().unwrap();
    assert_eq!(stats.request_count, 2);
}

fn delete_cascades_interest<S: RequestStore>(engine: SwapEngine<S>) {
    let (a, b) = (person("a"), person("b"));
    let id = prefer(&engine, &a, "X", ["Y", "P", "Q"]);
    prefer(&engine, &b, "Y", ["X", "P", "Q"]);

    engine
        .express_interest(&a, &InterestPayload::new("b"))
        .unwrap();
    engine.delete_request(&a, id).unwrap();

    let err = engine
        .accept_interest(&b, &InterestPayload::new("a"))
        .unwrap_err();
    assert!(matches!(err, SwapError::NoIncomingInterest { .. }));
    assert_eq!(engine.stats().unwrap().interest_count, 0);

    // A fresh request does not resurrect the old confirmation
    prefer(&engine, &a, "X", ["Y", "P", "Q"]);
    let view = &engine.list_mutual_matches(&b).unwrap()[0];
    assert!(!view.they_expressed_interest);
}

fn interest_idempotence<S: RequestStore>(engine: SwapEngine<S>) {
    let a = person("a");
    let to_b = InterestPayload::new("b");

    engine.express_interest(&a, &to_b).unwrap();
    let err = engine.express_interest(&a, &to_b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(engine.stats().unwrap().interest_count, 1);

    engine.withdraw_interest(&a, &to_b).unwrap();
    let err = engine.withdraw_interest(&a, &to_b).unwrap_err();
    assert!(matches!(err, SwapError::InterestNotFound { .. }));
    assert_eq!(engine.stats().unwrap().interest_count, 0);

    let err = engine
        .remove_match(&a, &InterestPayload::default())
        .unwrap_err();
    assert!(matches!(err, SwapError::MissingFields(_)));
}

fn ordering_and_global_listing<S: RequestStore>(engine: SwapEngine<S>) {
    let me = person("me");
    let (p, q, r) = (person("p"), person("q"), person("r"));
    prefer(&engine, &me, "M", ["P", "R", "Q"]);
    // (mine, theirs) = (3, 1)
    prefer(&engine, &q, "Q", ["M", "A", "B"]);
    // (1, 2)
    prefer(&engine, &p, "P", ["A", "M", "B"]);
    // (2, 1)
    prefer(&engine, &r, "R", ["M", "A", "B"]);

    let order: Vec<_> = engine
        .list_mutual_matches(&me)
        .unwrap()
        .into_iter()
        .map(|m| m.other_user_id)
        .collect();
    assert_eq!(order, vec![p.id.clone(), r.id.clone(), q.id.clone()]);

    let pairs = engine.all_mutual_matches(RequestKind::Preference).unwrap();
    assert_eq!(pairs.len(), 3);
    assert!(pairs
        .iter()
        .all(|pair| pair.a.user_id == me.id || pair.b.user_id == me.id));
    assert!(pairs
        .iter()
        .all(|pair| pair.a.contact_display == DEFAULT_CONTACT_PLACEHOLDER));
}

fn presented_request_uses_public_id<S: RequestStore>(engine: SwapEngine<S>) {
    let a = person("a");
    let id = prefer(&engine, &a, "X", ["Y", "Z", "W"]);

    let own = engine
        .get_own_request(&a, RequestKind::Preference)
        .unwrap()
        .unwrap();
    let value = present(&own).unwrap();
    assert_eq!(value["id"], serde_json::json!(id.to_string()));
    assert_eq!(value["owner_contact"], serde_json::json!("a@example.edu"));
    assert_eq!(value["is_own"], serde_json::json!(true));
}

macro_rules! against_both_stores {
    ($($scenario:ident),* $(,)?) => {
        mod memory_store {
            $(
                #[test]
                fn $scenario() {
                    super::$scenario(super::memory_engine());
                }
            )*
        }

        mod redb_store {
            $(
                #[test]
                fn $scenario() {
                    let (engine, _temp_dir) = super::redb_engine();
                    super::$scenario(engine);
                }
            )*
        }
    };
}

against_both_stores!(
    direct_swap_for_both,
    chain_rotates,
    duplicate_request_rejected,
    delete_cascades_interest,
    interest_idempotence,
    ordering_and_global_listing,
    presented_request_uses_public_id,
);

#[test]
fn test_requests_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("swapmatch.redb");
    let (a, b) = (person("a"), person("b"));

    {
        let engine = SwapEngine::open(&path, EngineConfig::default()).unwrap();
        cycle(&engine, &a, "X", "Y");
        cycle(&engine, &b, "Y", "X");
        engine
            .express_interest(&a, &InterestPayload::new("b"))
            .unwrap();
    }

    let engine = SwapEngine::open(&path, EngineConfig::default()).unwrap();
    assert_eq!(engine.list_cycle_matches(&a).unwrap().len(), 1);
    let state = engine
        .interest_state(&b, &InterestPayload::new("a"))
        .unwrap();
    assert!(matches!(state, InterestState::OneSided { .. }));
}
