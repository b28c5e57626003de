//! Ranking and tie-breaking for computed matches.
//!
//! Preference matches are ordered by the strongest single-sided preference
//! (`min` of the two ranks), then by the combined preference (`sum`). The sort
//! is stable, so remaining ties keep store iteration order. Cycle matches only
//! ever carry rank 1 and are grouped by [`MatchType`] instead.

use crate::types::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Both sides' ranks for one mutual match, from one participant's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankPair {
    /// How much the viewer wants the counterpart's resource.
    pub mine: Rank,
    /// How much the counterpart wants the viewer's resource.
    pub theirs: Rank,
}

impl RankPair {
    pub fn new(mine: Rank, theirs: Rank) -> Self {
        Self { mine, theirs }
    }

    /// The same match seen from the counterpart's side.
    pub fn flipped(self) -> Self {
        Self {
            mine: self.theirs,
            theirs: self.mine,
        }
    }

    /// Lowest (best) of the two ranks.
    pub fn strongest(&self) -> u8 {
        self.mine.get().min(self.theirs.get())
    }

    pub fn combined(&self) -> u8 {
        self.mine.get() + self.theirs.get()
    }

    /// Ascending sort key: strongest preference first, then best combined.
    pub fn sort_key(&self) -> (u8, u8) {
        (self.strongest(), self.combined())
    }
}

/// Stable-sort `items` by the rank pair each carries.
pub fn order_by_rank<T>(items: &mut [T], ranks: impl Fn(&T) -> RankPair) {
    items.sort_by_key(|item| ranks(item).sort_key());
}

/// Shape of a cycle-kind match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Two owners want each other's resource.
    DirectSwap,
    /// A wants B's, B wants C's, C wants A's.
    ThreeWayChain,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::DirectSwap => "direct_swap",
            MatchType::ThreeWayChain => "three_way_chain",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Stable-group `items` so every direct swap precedes every chain.
pub fn order_by_match_type<T>(items: &mut [T], match_type: impl Fn(&T) -> MatchType) {
    items.sort_by_key(|item| match_type(item));
}
