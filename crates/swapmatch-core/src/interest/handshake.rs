use crate::error::{Result, SwapError};
use crate::interest::state::InterestState;
use crate::storage::RequestStore;
use crate::types::{InterestRecord, ParticipantId};

fn ensure_distinct(from: &ParticipantId, to: &ParticipantId) -> Result<()> {
    if from == to {
        return Err(SwapError::Validation(
            "Cannot express interest in yourself".to_string(),
        ));
    }
    Ok(())
}

/// Record that `from` is willing to proceed with `to`.
///
/// NoInterest becomes OneSided(from→to); OneSided(to→from) becomes
/// MutuallyConfirmed. Fails with `DuplicateInterest` if the direction exists.
pub fn express_interest<S: RequestStore + ?Sized>(
    store: &S,
    from: &ParticipantId,
    to: &ParticipantId,
) -> Result<InterestState> {
    ensure_distinct(from, to)?;
    store.insert_interest(&InterestRecord::new(from.clone(), to.clone()))?;
    log::info!("Interest expressed: {} -> {}", from, to);
    InterestState::between(store, from, to)
}

/// Answer an incoming interest from `to`. Requires the reverse direction to
/// exist and this direction not to.
pub fn accept_interest<S: RequestStore + ?Sized>(
    store: &S,
    from: &ParticipantId,
    to: &ParticipantId,
) -> Result<InterestState> {
    ensure_distinct(from, to)?;
    if store.get_interest(to, from)?.is_none() {
        return Err(SwapError::NoIncomingInterest {
            from: to.clone(),
            to: from.clone(),
        });
    }
    store.insert_interest(&InterestRecord::new(from.clone(), to.clone()))?;
    log::info!("Interest accepted: {} <-> {}", from, to);
    InterestState::between(store, from, to)
}

/// Remove the `from → to` direction. MutuallyConfirmed drops back to
/// OneSided(to→from); OneSided(from→to) drops to NoInterest.
pub fn withdraw_interest<S: RequestStore + ?Sized>(
    store: &S,
    from: &ParticipantId,
    to: &ParticipantId,
) -> Result<InterestState> {
    if !store.delete_interest(from, to)? {
        return Err(SwapError::InterestNotFound {
            from: from.clone(),
            to: to.clone(),
        });
    }
    log::info!("Interest withdrawn: {} -> {}", from, to);
    InterestState::between(store, from, to)
}

/// Remove both directions between `a` and `b`.
pub fn remove_match<S: RequestStore + ?Sized>(
    store: &S,
    a: &ParticipantId,
    b: &ParticipantId,
) -> Result<InterestState> {
    let removed_ab = store.delete_interest(a, b)?;
    let removed_ba = store.delete_interest(b, a)?;
    if !removed_ab && !removed_ba {
        return Err(SwapError::MatchNotFound {
            a: a.clone(),
            b: b.clone(),
        });
    }
    log::info!("Match removed: {} <-> {}", a, b);
    Ok(InterestState::NoInterest)
}
