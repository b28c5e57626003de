//! Cycle matcher: length-2 and length-3 cycles in a [`WantsGraph`].
//!
//! Caller-scoped queries are directional (the caller is always the first
//! link). The global pair listing visits every ordered pair but reports each
//! unordered pair once.

mod chains;
mod pairs;

pub use chains::{chains_for, Chain};
pub use pairs::{all_mutual, mutual_for, DirectSwap, PairMatch};

use crate::graph::{NodeIndex, WantsGraph};

/// Result of a cycle-kind query for one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleMatches {
    /// At least one direct swap exists; chain search was skipped.
    DirectSwaps(Vec<DirectSwap>),
    /// No direct swap exists; these are the chains found (possibly none).
    Chains(Vec<Chain>),
}

impl CycleMatches {
    pub fn is_empty(&self) -> bool {
        match self {
            CycleMatches::DirectSwaps(swaps) => swaps.is_empty(),
            CycleMatches::Chains(chains) => chains.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CycleMatches::DirectSwaps(swaps) => swaps.len(),
            CycleMatches::Chains(chains) => chains.len(),
        }
    }
}

/// Direct swaps for `caller`; chains only when there are none.
pub fn cycle_matches_for(graph: &WantsGraph<'_>, caller: NodeIndex) -> CycleMatches {
    let swaps = mutual_for(graph, caller);
    if !swaps.is_empty() {
        return CycleMatches::DirectSwaps(swaps);
    }

    log::debug!(
        "No direct swap for {}; searching three-way chains",
        graph.request(caller).owner_id
    );
    CycleMatches::Chains(chains_for(graph, caller))
}
