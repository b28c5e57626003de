use crate::error::{Result, SwapError};
use crate::graph::WantsGraph;
use crate::interest::{self, InterestLedger, InterestState};
use crate::matcher::{self, CycleMatches};
use crate::payload::{InterestPayload, RequestPayload};
use crate::presentation::{
    contact_for, CycleMatchView, MutualMatchView, OwnRequestView, PairMatchView, PartyView,
};
use crate::rank::{order_by_match_type, order_by_rank, MatchType};
use crate::storage::{RedbStore, RequestFilter, RequestStore, StoreStats};
use crate::types::{ExchangeRequest, Participant, ParticipantId, RequestId, RequestKind};
use std::path::Path;
use std::sync::Arc;

/// Placeholder shown instead of an undisclosed contact.
pub const DEFAULT_CONTACT_PLACEHOLDER: &str = "Hidden until confirmed";

/// Engine behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Shown in place of a counterpart's contact until disclosure is allowed.
    pub contact_placeholder: String,
    /// Disclose contacts on cycle-kind matches, which have no interest
    /// handshake. Preference-kind matches are unaffected.
    pub disclose_cycle_contacts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contact_placeholder: DEFAULT_CONTACT_PLACEHOLDER.into(),
            disclose_cycle_contacts: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.contact_placeholder = placeholder.into();
        self
    }

    pub fn with_disclose_cycle_contacts(mut self, disclose: bool) -> Self {
        self.disclose_cycle_contacts = disclose;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.contact_placeholder.trim().is_empty() {
            return Err("contact_placeholder must not be blank".to_string());
        }
        Ok(())
    }
}

/// The exchange matching engine over one request store.
///
/// Holds no state of its own beyond the store handle; every call receives
/// the resolved caller explicitly.
///
/// # Example
/// ```rust,no_run
/// use swapmatch_core::{EngineConfig, Participant, RequestKind, RequestPayload, SwapEngine};
///
/// let engine = SwapEngine::open("./swapmatch.redb", EngineConfig::default()).unwrap();
/// let ana = Participant::new("u1", "Ana", "ana@example.edu");
/// let payload = RequestPayload::new().with_held("Hall B").with_desired("Hall C");
/// engine.create_request(&ana, RequestKind::Cycle, payload).unwrap();
/// let matches = engine.list_cycle_matches(&ana).unwrap();
/// ```
pub struct SwapEngine<S: RequestStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl SwapEngine<RedbStore> {
    /// Open (or create) a store file at the given path.
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let store = Arc::new(RedbStore::open(path.as_ref())?);
        Self::new(store, config)
    }
}

impl<S: RequestStore> SwapEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(SwapError::Validation)?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    // === Requests ===

    /// Create the caller's request of `kind`. Rejected if one already exists.
    pub fn create_request(
        &self,
        caller: &Participant,
        kind: RequestKind,
        payload: RequestPayload,
    ) -> Result<RequestId> {
        caller_id(&caller.id)?;
        let request = payload.into_request(caller, kind)?;
        self.store.insert_request(&request)?;
        log::info!(
            "Created {} request {} for {}",
            kind,
            request.id,
            caller.id
        );
        Ok(request.id)
    }

    /// Apply a partial update to one of the caller's requests. Returns
    /// `false` when the supplied fields match what is stored.
    pub fn update_request(
        &self,
        caller: &Participant,
        id: RequestId,
        payload: &RequestPayload,
    ) -> Result<bool> {
        let mut request = self.owned_request(caller, id)?;
        if !payload.apply_to(&mut request)? {
            log::debug!("Update of request {} changed nothing", id);
            return Ok(false);
        }
        self.store.put_request(&request)?;
        log::info!("Updated {} request {} for {}", request.kind, id, caller.id);
        Ok(true)
    }

    /// Delete one of the caller's requests. Deleting a preference request
    /// also removes every interest record naming the caller.
    pub fn delete_request(&self, caller: &Participant, id: RequestId) -> Result<()> {
        let request = self.owned_request(caller, id)?;
        if !self.store.delete_request(id)? {
            return Err(SwapError::RequestNotFound(id));
        }
        log::info!("Deleted {} request {} for {}", request.kind, id, caller.id);

        if request.kind == RequestKind::Preference {
            let removed = self.store.delete_interests_involving(&caller.id)?;
            if removed > 0 {
                log::warn!(
                    "Removed {} interest record(s) involving {} with their request",
                    removed,
                    caller.id
                );
            }
        }
        Ok(())
    }

    /// The caller's active request of `kind`, if any.
    pub fn get_own_request(
        &self,
        caller: &Participant,
        kind: RequestKind,
    ) -> Result<Option<OwnRequestView>> {
        Ok(self
            .store
            .find_request(&caller.id, kind)?
            .map(OwnRequestView::from))
    }

    fn owned_request(&self, caller: &Participant, id: RequestId) -> Result<ExchangeRequest> {
        match self.store.get_request(id)? {
            Some(request) if request.owner_id == caller.id => Ok(request),
            _ => Err(SwapError::RequestNotFound(id)),
        }
    }

    fn snapshot(&self, kind: RequestKind) -> Result<Vec<ExchangeRequest>> {
        self.store.list_requests(RequestFilter::new().with_kind(kind))
    }

    // === Matching ===

    /// Preference-kind mutual matches for the caller, best first, with the
    /// interest handshake overlaid.
    pub fn list_mutual_matches(&self, caller: &Participant) -> Result<Vec<MutualMatchView>> {
        let snapshot = self.snapshot(RequestKind::Preference)?;
        let graph = WantsGraph::build(RequestKind::Preference, &snapshot);
        let Some(me) = graph.index_of(&caller.id) else {
            return Ok(Vec::new());
        };

        let mut swaps = matcher::mutual_for(&graph, me);
        order_by_rank(&mut swaps, |swap| swap.ranks);

        let ledger = InterestLedger::load(self.store.as_ref(), &caller.id)?;
        let views = swaps
            .into_iter()
            .map(|swap| {
                let other = graph.request(swap.other);
                let flags = ledger.flags(&other.owner_id);
                let choices = other.desired.ranked();
                let choice = |n: usize| choices.get(n).map(|(_, r)| (*r).clone());

                MutualMatchView {
                    other_user_id: other.owner_id.clone(),
                    other_user_name: other.owner_name.clone(),
                    other_held_resource: other.held_resource.clone(),
                    other_held_resource_detail: other.held_resource_detail.clone(),
                    my_preference_level: swap.ranks.mine.get(),
                    they_want_my_level: swap.ranks.theirs.get(),
                    mutually_confirmed: flags.mutually_confirmed(),
                    i_expressed_interest: flags.i_expressed,
                    they_expressed_interest: flags.they_expressed,
                    other_contact_display: contact_for(
                        &other.owner_contact,
                        flags.mutually_confirmed(),
                        &self.config.contact_placeholder,
                    ),
                    other_first_choice: choice(0),
                    other_second_choice: choice(1),
                    other_third_choice: choice(2),
                }
            })
            .collect();
        Ok(views)
    }

    /// Cycle-kind matches for the caller: direct swaps, or three-way chains
    /// when there is no direct swap.
    pub fn list_cycle_matches(&self, caller: &Participant) -> Result<Vec<CycleMatchView>> {
        let snapshot = self.snapshot(RequestKind::Cycle)?;
        let graph = WantsGraph::build(RequestKind::Cycle, &snapshot);
        let Some(me) = graph.index_of(&caller.id) else {
            return Ok(Vec::new());
        };

        let party = |request: &ExchangeRequest| {
            PartyView::new(
                request,
                contact_for(
                    &request.owner_contact,
                    self.config.disclose_cycle_contacts,
                    &self.config.contact_placeholder,
                ),
            )
        };

        let mut views: Vec<CycleMatchView> = match matcher::cycle_matches_for(&graph, me) {
            CycleMatches::DirectSwaps(swaps) => swaps
                .iter()
                .map(|swap| CycleMatchView {
                    match_type: MatchType::DirectSwap,
                    other: party(graph.request(swap.other)),
                    third: None,
                })
                .collect(),
            CycleMatches::Chains(chains) => chains
                .iter()
                .map(|chain| CycleMatchView {
                    match_type: MatchType::ThreeWayChain,
                    other: party(graph.request(chain.second)),
                    third: Some(party(graph.request(chain.third))),
                })
                .collect(),
        };
        order_by_match_type(&mut views, |view| view.match_type);
        Ok(views)
    }

    /// Every mutual pair of `kind` in the store, each unordered pair once,
    /// best first.
    pub fn all_mutual_matches(&self, kind: RequestKind) -> Result<Vec<PairMatchView>> {
        let snapshot = self.snapshot(kind)?;
        let graph = WantsGraph::build(kind, &snapshot);

        let mut pairs = matcher::all_mutual(&graph);
        order_by_rank(&mut pairs, |pair| pair.ranks);

        let mut views = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let a = graph.request(pair.a);
            let b = graph.request(pair.b);
            let confirmed = kind == RequestKind::Preference
                && InterestState::between(self.store.as_ref(), &a.owner_id, &b.owner_id)?
                    .is_confirmed();
            let disclosed = match kind {
                RequestKind::Preference => confirmed,
                RequestKind::Cycle => self.config.disclose_cycle_contacts,
            };
            let placeholder = &self.config.contact_placeholder;

            views.push(PairMatchView {
                kind,
                a: PartyView::new(a, contact_for(&a.owner_contact, disclosed, placeholder)),
                b: PartyView::new(b, contact_for(&b.owner_contact, disclosed, placeholder)),
                a_preference_level: pair.ranks.mine.get(),
                b_preference_level: pair.ranks.theirs.get(),
                mutually_confirmed: confirmed,
            });
        }
        Ok(views)
    }

    // === Interest handshake ===

    pub fn express_interest(
        &self,
        caller: &Participant,
        payload: &InterestPayload,
    ) -> Result<InterestState> {
        let other = payload.target()?;
        interest::express_interest(self.store.as_ref(), caller_id(&caller.id)?, &other)
    }

    pub fn withdraw_interest(
        &self,
        caller: &Participant,
        payload: &InterestPayload,
    ) -> Result<InterestState> {
        let other = payload.target()?;
        interest::withdraw_interest(self.store.as_ref(), caller_id(&caller.id)?, &other)
    }

    pub fn accept_interest(
        &self,
        caller: &Participant,
        payload: &InterestPayload,
    ) -> Result<InterestState> {
        let other = payload.target()?;
        interest::accept_interest(self.store.as_ref(), caller_id(&caller.id)?, &other)
    }

    pub fn remove_match(
        &self,
        caller: &Participant,
        payload: &InterestPayload,
    ) -> Result<InterestState> {
        let other = payload.target()?;
        interest::remove_match(self.store.as_ref(), caller_id(&caller.id)?, &other)
    }

    /// Handshake state between the caller and the named participant.
    pub fn interest_state(
        &self,
        caller: &Participant,
        payload: &InterestPayload,
    ) -> Result<InterestState> {
        let other = payload.target()?;
        InterestState::between(self.store.as_ref(), &caller.id, &other)
    }
}

fn caller_id(id: &ParticipantId) -> Result<&ParticipantId> {
    if id.is_usable() {
        Ok(id)
    } else {
        Err(SwapError::Validation(format!(
            "Caller id {:?} is not usable",
            id.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::MemoryStore;

    fn create_test_engine() -> SwapEngine<MemoryStore> {
        SwapEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default()).unwrap()
    }

    fn person(id: &str) -> Participant {
        Participant::new(id, id.to_uppercase(), format!("{}@example.edu", id))
    }

    fn prefer(engine: &SwapEngine<MemoryStore>, who: &Participant, held: &str, choices: [&str; 3]) -> RequestId {
        let payload = RequestPayload::new()
            .with_held(held)
            .with_choices(choices[0], choices[1], choices[2]);
        engine
            .create_request(who, RequestKind::Preference, payload)
            .unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_contact_placeholder("hidden")
            .with_disclose_cycle_contacts(false);
        assert_eq!(config.contact_placeholder, "hidden");
        assert!(!config.disclose_cycle_contacts);
        assert!(EngineConfig::default().disclose_cycle_contacts);

        let blank = EngineConfig::new().with_contact_placeholder(" ");
        assert!(blank.validate().is_err());
        assert!(SwapEngine::new(Arc::new(MemoryStore::new()), blank).is_err());
    }

    #[test]
    fn test_mutual_view_redacts_until_confirmed() {
        let engine = create_test_engine();
        let (a, b) = (person("a"), person("b"));
        prefer(&engine, &a, "X", ["Y", "P", "Q"]);
        prefer(&engine, &b, "Y", ["R", "X", "S"]);

        let views = engine.list_mutual_matches(&a).unwrap();
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.other_user_id, b.id);
        assert_eq!(view.my_preference_level, 1);
        assert_eq!(view.they_want_my_level, 2);
        assert_eq!(view.other_contact_display, DEFAULT_CONTACT_PLACEHOLDER);
        assert_eq!(view.other_second_choice.as_ref().map(|r| r.as_str()), Some("X"));

        engine
            .express_interest(&a, &InterestPayload::new("b"))
            .unwrap();
        let view = &engine.list_mutual_matches(&a).unwrap()[0];
        assert!(view.i_expressed_interest);
        assert!(!view.mutually_confirmed);
        assert_eq!(view.other_contact_display, DEFAULT_CONTACT_PLACEHOLDER);

        engine.accept_interest(&b, &InterestPayload::new("a")).unwrap();
        let view = &engine.list_mutual_matches(&a).unwrap()[0];
        assert!(view.mutually_confirmed);
        assert_eq!(view.other_contact_display, "b@example.edu");

        let back = &engine.list_mutual_matches(&b).unwrap()[0];
        assert_eq!(back.other_contact_display, "a@example.edu");
        assert_eq!(back.my_preference_level, 2);
    }

    #[test]
    fn test_update_and_delete_require_ownership() {
        let engine = create_test_engine();
        let (a, b) = (person("a"), person("b"));
        let id = prefer(&engine, &a, "X", ["Y", "P", "Q"]);

        let patch = RequestPayload::new().with_held("Z");
        let err = engine.update_request(&b, id, &patch).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = engine.delete_request(&b, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(engine.update_request(&a, id, &patch).unwrap());
        assert!(!engine.update_request(&a, id, &patch).unwrap());

        let own = engine
            .get_own_request(&a, RequestKind::Preference)
            .unwrap()
            .unwrap();
        assert!(own.is_own);
        assert_eq!(own.request.held_resource.as_str(), "Z");

        engine.delete_request(&a, id).unwrap();
        assert!(engine
            .get_own_request(&a, RequestKind::Preference)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_cycle_delete_keeps_interests() {
        let engine = create_test_engine();
        let (a, b) = (person("a"), person("b"));
        let payload = RequestPayload::new().with_held("X").with_desired("Y");
        let id = engine
            .create_request(&a, RequestKind::Cycle, payload)
            .unwrap();
        engine.express_interest(&a, &InterestPayload::new("b")).unwrap();

        engine.delete_request(&a, id).unwrap();
        let state = engine.interest_state(&b, &InterestPayload::new("a")).unwrap();
        assert_eq!(
            state,
            InterestState::OneSided {
                from: a.id.clone(),
                to: b.id.clone()
            }
        );
    }

    #[test]
    fn test_cycle_contacts_follow_config() {
        let store = Arc::new(MemoryStore::new());
        let disclosing = SwapEngine::new(store.clone(), EngineConfig::default()).unwrap();
        let redacting =
            SwapEngine::new(store, EngineConfig::new().with_disclose_cycle_contacts(false)).unwrap();
        let (a, b) = (person("a"), person("b"));
        for (who, held, wants) in [(&a, "X", "Y"), (&b, "Y", "X")] {
            let payload = RequestPayload::new().with_held(held).with_desired(wants);
            disclosing
                .create_request(who, RequestKind::Cycle, payload)
                .unwrap();
        }

        // Cycle matches have no handshake: contacts are shown by default
        let shown = disclosing.list_cycle_matches(&a).unwrap();
        assert_eq!(shown[0].match_type, MatchType::DirectSwap);
        assert_eq!(shown[0].other.contact_display, "b@example.edu");

        let pairs = disclosing.all_mutual_matches(RequestKind::Cycle).unwrap();
        assert_eq!(pairs.len(), 1);
        let mut contacts = [
            pairs[0].a.contact_display.as_str(),
            pairs[0].b.contact_display.as_str(),
        ];
        contacts.sort();
        assert_eq!(contacts, ["a@example.edu", "b@example.edu"]);

        let hidden = redacting.list_cycle_matches(&a).unwrap();
        assert_eq!(hidden[0].other.contact_display, DEFAULT_CONTACT_PLACEHOLDER);
    }

    #[test]
    fn test_cycle_disclosure_leaves_preference_redacted() {
        let engine = create_test_engine();
        assert!(engine.config().disclose_cycle_contacts);
        let (a, b) = (person("a"), person("b"));
        prefer(&engine, &a, "X", ["Y", "P", "Q"]);
        prefer(&engine, &b, "Y", ["X", "P", "Q"]);

        let views = engine.list_mutual_matches(&a).unwrap();
        assert_eq!(views[0].other_contact_display, DEFAULT_CONTACT_PLACEHOLDER);
        let pairs = engine.all_mutual_matches(RequestKind::Preference).unwrap();
        assert_eq!(pairs[0].a.contact_display, DEFAULT_CONTACT_PLACEHOLDER);
        assert_eq!(pairs[0].b.contact_display, DEFAULT_CONTACT_PLACEHOLDER);
    }

    #[test]
    fn test_unusable_caller_rejected() {
        let engine = create_test_engine();
        let ghost = Participant::new("", "Ghost", "ghost@example.edu");
        let payload = RequestPayload::new().with_held("X").with_desired("Y");
        let err = engine
            .create_request(&ghost, RequestKind::Cycle, payload)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = engine
            .express_interest(&ghost, &InterestPayload::new("a"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_no_request_means_no_matches() {
        let engine = create_test_engine();
        let a = person("a");
        assert!(engine.list_mutual_matches(&a).unwrap().is_empty());
        assert!(engine.list_cycle_matches(&a).unwrap().is_empty());
        assert!(engine
            .all_mutual_matches(RequestKind::Preference)
            .unwrap()
            .is_empty());
    }
}
