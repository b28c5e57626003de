use crate::types::Rank;

/// Position of a request within a [`WantsGraph`](super::WantsGraph) snapshot.
/// Lower indices come earlier in store iteration order.
pub type NodeIndex = usize;

/// "The source owner wants `target`'s held resource, at `rank`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WantsEdge {
    /// Request whose held resource is wanted.
    pub target: NodeIndex,

    /// Source owner's preference for that resource. Always rank 1 for
    /// cycle requests.
    pub rank: Rank,
}
