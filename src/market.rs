//! Weighted bipartite market graph: nodes, buyer–seller edges, active sets.
//!
//! Owned by [`crate::Simulator`], which drives the node lifecycle. Nodes, adjacency,
//! and the active buyer/seller sets are all keyed by [`NodeId`] in ordered maps, so
//! every iteration runs in insertion (arrival) order.

use crate::types::{NodeId, Position, Role};
use std::collections::{BTreeMap, BTreeSet};

/// One market participant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub role: Role,
    pub position: Position,
    /// Advances left before forced departure (only ticks while active).
    pub departure: u32,
    /// Advances left before the node becomes visible (only ticks while pending).
    pub wait: u32,
    pub in_market: bool,
}

/// Neighbor id -> edge weight.
type Adjacency = BTreeMap<NodeId, f64>;

/// Market graph state. Edges are stored on both endpoints and only ever join
/// an active buyer with an active seller.
#[derive(Clone, Debug, Default)]
pub struct MarketGraph {
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, Adjacency>,
    buyers: BTreeSet<NodeId>,
    sellers: BTreeSet<NodeId>,
}

impl MarketGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.buyers.clear();
        self.sellers.clear();
    }

    /// Stores a node without edges. Active nodes join their role's active set.
    pub fn insert_node(&mut self, node: Node) {
        let id = node.id;
        if node.in_market {
            self.active_set_mut(node.role).insert(id);
        }
        self.adjacency.insert(id, Adjacency::new());
        self.nodes.insert(id, node);
    }

    /// Flips a pending node to active and adds it to its active set.
    /// Returns false if the node is unknown.
    pub fn activate(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.in_market = true;
        node.wait = 0;
        let role = node.role;
        self.active_set_mut(role).insert(id);
        true
    }

    /// Removes a node, its incident edges, and its active-set membership.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        if let Some(neighbors) = self.adjacency.remove(&id) {
            for neighbor in neighbors.keys() {
                if let Some(adj) = self.adjacency.get_mut(neighbor) {
                    adj.remove(&id);
                }
            }
        }
        self.active_set_mut(node.role).remove(&id);
        Some(node)
    }

    /// Inserts or overwrites the edge between `a` and `b`.
    pub fn set_edge(&mut self, a: NodeId, b: NodeId, weight: f64) {
        self.adjacency.entry(a).or_default().insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
    }

    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.adjacency.get(&a)?.get(&b).copied()
    }

    /// Neighbors of `id` with edge weights, in id order.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|adj| adj.iter().map(|(&n, &w)| (n, w)))
    }

    /// All edges as (buyer, seller, weight), ordered by buyer then seller id.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.buyers.iter().flat_map(move |&b| {
            self.neighbors(b).map(move |(s, w)| (b, s, w))
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes, pending and active, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Active ids of the given role, in id order.
    pub fn active(&self, role: Role) -> &BTreeSet<NodeId> {
        match role {
            Role::Buyer => &self.buyers,
            Role::Seller => &self.sellers,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.buyers
            .iter()
            .filter_map(|b| self.adjacency.get(b))
            .map(|adj| adj.len())
            .sum()
    }

    fn active_set_mut(&mut self, role: Role) -> &mut BTreeSet<NodeId> {
        match role {
            Role::Buyer => &mut self.buyers,
            Role::Seller => &mut self.sellers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, role: Role, in_market: bool) -> Node {
        Node {
            id: NodeId(id),
            role,
            position: Position::new(0.0, 0.0),
            departure: 2,
            wait: if in_market { 0 } else { 1 },
            in_market,
        }
    }

    #[test]
    fn insert_tracks_only_active_nodes_in_sets() {
        let mut g = MarketGraph::new();
        g.insert_node(node(0, Role::Buyer, true));
        g.insert_node(node(1, Role::Seller, false));
        assert!(g.active(Role::Buyer).contains(&NodeId(0)));
        assert!(g.active(Role::Seller).is_empty());
        assert_eq!(g.node_count(), 2);

        assert!(g.activate(NodeId(1)));
        assert!(g.active(Role::Seller).contains(&NodeId(1)));
        assert!(g.node(NodeId(1)).unwrap().in_market);
    }

    #[test]
    fn edges_are_symmetric_and_removed_with_node() {
        let mut g = MarketGraph::new();
        g.insert_node(node(0, Role::Buyer, true));
        g.insert_node(node(1, Role::Seller, true));
        g.insert_node(node(2, Role::Seller, true));
        g.set_edge(NodeId(0), NodeId(1), 1.5);
        g.set_edge(NodeId(2), NodeId(0), 2.5);
        assert_eq!(g.edge_weight(NodeId(1), NodeId(0)), Some(1.5));
        assert_eq!(g.edge_weight(NodeId(0), NodeId(2)), Some(2.5));
        assert_eq!(g.edge_count(), 2);

        let removed = g.remove_node(NodeId(0)).unwrap();
        assert_eq!(removed.id, NodeId(0));
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.neighbors(NodeId(1)).count(), 0);
        assert!(g.active(Role::Buyer).is_empty());
        assert!(g.remove_node(NodeId(0)).is_none());
    }

    #[test]
    fn edges_iterate_in_id_order() {
        let mut g = MarketGraph::new();
        g.insert_node(node(3, Role::Buyer, true));
        g.insert_node(node(0, Role::Buyer, true));
        g.insert_node(node(2, Role::Seller, true));
        g.insert_node(node(1, Role::Seller, true));
        for b in [3, 0] {
            for s in [2, 1] {
                g.set_edge(NodeId(b), NodeId(s), (b * 10 + s) as f64);
            }
        }
        let order: Vec<(u64, u64)> = g.edges().map(|(b, s, _)| (b.0, s.0)).collect();
        assert_eq!(order, vec![(0, 1), (0, 2), (3, 1), (3, 2)]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut g = MarketGraph::new();
        g.insert_node(node(0, Role::Buyer, true));
        g.insert_node(node(1, Role::Seller, true));
        g.set_edge(NodeId(0), NodeId(1), 1.0);
        g.clear();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.active(Role::Buyer).is_empty());
    }
}
