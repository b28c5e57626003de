use crate::graph::types::{NodeIndex, WantsEdge};
use crate::types::{ExchangeRequest, ParticipantId, Rank, RequestKind, Resource};
use std::collections::HashMap;

/// Directed "wants" relation over one snapshot of active requests of a
/// single kind.
///
/// Nodes keep store iteration order. An edge `a -> b` means a's owner wants
/// b's held resource. Edges between requests of the same owner are never
/// created, and requests whose owner id is unusable are left out entirely.
pub struct WantsGraph<'a> {
    kind: RequestKind,
    nodes: Vec<&'a ExchangeRequest>,
    /// Outgoing edges per node, ordered by target index.
    outgoing: Vec<Vec<WantsEdge>>,
    by_owner: HashMap<&'a ParticipantId, NodeIndex>,
}

impl<'a> WantsGraph<'a> {
    /// Build the graph from a store snapshot. Requests of other kinds are ignored.
    pub fn build(kind: RequestKind, snapshot: &'a [ExchangeRequest]) -> Self {
        let mut nodes = Vec::with_capacity(snapshot.len());
        let mut by_owner = HashMap::new();

        for request in snapshot.iter().filter(|r| r.kind == kind) {
            if !request.owner_id.is_usable() {
                log::debug!(
                    "Skipping {} request {}: unusable owner id {:?}",
                    kind,
                    request.id,
                    request.owner_id.as_str()
                );
                continue;
            }
            if by_owner.contains_key(&request.owner_id) {
                log::debug!(
                    "Skipping {} request {}: owner {} already has one in this snapshot",
                    kind,
                    request.id,
                    request.owner_id
                );
                continue;
            }
            by_owner.insert(&request.owner_id, nodes.len());
            nodes.push(request);
        }

        // Held resource -> holders, in node order. Built once per snapshot so
        // edge construction is linear in the number of desired resources.
        let mut holders: HashMap<&Resource, Vec<NodeIndex>> = HashMap::new();
        for (idx, request) in nodes.iter().enumerate() {
            holders.entry(&request.held_resource).or_default().push(idx);
        }

        let outgoing = nodes
            .iter()
            .map(|request| {
                let mut edges: Vec<WantsEdge> = request
                    .desired
                    .ranked()
                    .into_iter()
                    .flat_map(|(rank, resource)| {
                        holders
                            .get(resource)
                            .into_iter()
                            .flatten()
                            .map(move |&target| WantsEdge { target, rank })
                    })
                    .filter(|edge| nodes[edge.target].owner_id != request.owner_id)
                    .collect();
                edges.sort_by_key(|edge| edge.target);
                edges
            })
            .collect();

        Self {
            kind,
            nodes,
            outgoing,
            by_owner,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Number of requests in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of wants-edges
    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// The request at `idx`
    pub fn request(&self, idx: NodeIndex) -> &'a ExchangeRequest {
        self.nodes[idx]
    }

    /// Node of the owner's request, if the owner is in the graph
    pub fn index_of(&self, owner: &ParticipantId) -> Option<NodeIndex> {
        self.by_owner.get(owner).copied()
    }

    /// Outgoing edges of `idx`, in target order
    pub fn edges_from(&self, idx: NodeIndex) -> &[WantsEdge] {
        &self.outgoing[idx]
    }

    /// Rank at which `from`'s owner wants `to`'s held resource
    pub fn rank(&self, from: NodeIndex, to: NodeIndex) -> Option<Rank> {
        let edges = &self.outgoing[from];
        edges
            .binary_search_by_key(&to, |edge| edge.target)
            .ok()
            .map(|pos| edges[pos].rank)
    }

    pub fn wants(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.rank(from, to).is_some()
    }
}
