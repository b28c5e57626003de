use crate::graph::{NodeIndex, WantsGraph};

/// A length-3 cycle starting at the caller:
/// caller wants second's resource, second wants third's, third wants caller's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub caller: NodeIndex,
    pub second: NodeIndex,
    pub third: NodeIndex,
}

/// Three-way chains through `caller`.
///
/// Every second party is tried, but for each one only the first completing
/// third party (in store order) is reported.
pub fn chains_for(graph: &WantsGraph<'_>, caller: NodeIndex) -> Vec<Chain> {
    let mut chains = Vec::new();

    for first_link in graph.edges_from(caller) {
        let second = first_link.target;

        let third = graph
            .edges_from(second)
            .iter()
            .map(|edge| edge.target)
            .find(|&third| third != caller && graph.wants(third, caller));

        if let Some(third) = third {
            chains.push(Chain {
                caller,
                second,
                third,
            });
        }
    }

    chains
}
