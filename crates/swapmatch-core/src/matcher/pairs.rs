use crate::graph::{NodeIndex, WantsGraph};
use crate::rank::RankPair;
use std::collections::HashSet;

/// A length-2 cycle seen from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectSwap {
    pub caller: NodeIndex,
    pub other: NodeIndex,
    pub ranks: RankPair,
}

/// A length-2 cycle from the global view: `a` is whichever side was
/// reached first in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMatch {
    pub a: NodeIndex,
    pub b: NodeIndex,
    /// `mine` is a's rank for b's resource.
    pub ranks: RankPair,
}

/// Every counterpart that `caller` wants and that wants `caller` back,
/// in store order.
pub fn mutual_for(graph: &WantsGraph<'_>, caller: NodeIndex) -> Vec<DirectSwap> {
    graph
        .edges_from(caller)
        .iter()
        .filter_map(|edge| {
            graph.rank(edge.target, caller).map(|theirs| DirectSwap {
                caller,
                other: edge.target,
                ranks: RankPair::new(edge.rank, theirs),
            })
        })
        .collect()
}

/// Every mutual pair in the graph, each unordered pair exactly once.
pub fn all_mutual(graph: &WantsGraph<'_>) -> Vec<PairMatch> {
    let mut seen_pairs = HashSet::new();
    let mut matches = Vec::new();

    for a in 0..graph.len() {
        for swap in mutual_for(graph, a) {
            let owner_a = &graph.request(a).owner_id;
            let owner_b = &graph.request(swap.other).owner_id;
            let pair = if owner_a <= owner_b {
                (owner_a, owner_b)
            } else {
                (owner_b, owner_a)
            };
            if !seen_pairs.insert(pair) {
                continue;
            }
            matches.push(PairMatch {
                a,
                b: swap.other,
                ranks: swap.ranks,
            });
        }
    }

    matches
}
