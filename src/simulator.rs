//! Time-stepped market simulator.
//!
//! Owns the [`MarketGraph`] and the clock. Callers insert nodes with
//! [`Simulator::add_node`], let an algorithm read the state, realize its matches
//! with [`Simulator::remove_matching`], and finally call [`Simulator::advance`].
//!
//! Timer mechanics: a node added at `t = 1` with departure 2 has departure 1 at
//! `t = 2` and is gone at `t = 3`. A node added with wait 2 and departure 1 is
//! pending at `t = 1` and `t = 2`, active at `t = 3`, and gone at `t = 4`.

use crate::error::SimError;
use crate::market::{MarketGraph, Node};
use crate::types::{NodeId, Position, Role, WeightFn};
use log::{debug, info, trace};
use std::collections::BTreeSet;
use std::fmt;

/// A node is critical when its departure countdown is at or below this.
pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 1;

/// Nodes that left the market unmatched during one [`Simulator::advance`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdvanceReport {
    pub removed_buyers: Vec<NodeId>,
    pub removed_sellers: Vec<NodeId>,
}

impl AdvanceReport {
    pub fn buyers_removed(&self) -> usize {
        self.removed_buyers.len()
    }

    pub fn sellers_removed(&self) -> usize {
        self.removed_sellers.len()
    }
}

/// Serializable dump of the whole market at one point in time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketSnapshot {
    pub time: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgeSnapshot {
    pub buyer: NodeId,
    pub seller: NodeId,
    pub weight: f64,
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t = {}", self.time)?;
        for n in &self.nodes {
            writeln!(
                f,
                "  node {} {:?} pos=({}, {}) d={} k={} in_market={}",
                n.id, n.role, n.position.x, n.position.y, n.departure, n.wait, n.in_market
            )?;
        }
        for e in &self.edges {
            writeln!(f, "  edge {} -- {} weight={}", e.buyer, e.seller, e.weight)?;
        }
        Ok(())
    }
}

/// Two-sided market simulator over a weighted bipartite graph.
pub struct Simulator {
    graph: MarketGraph,
    time: u64,
    next_id: u64,
    weight_fn: WeightFn,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("time", &self.time)
            .field("next_id", &self.next_id)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Creates an empty market at `t = 0` using `weight_fn` for edge weights.
    pub fn new<F>(weight_fn: F) -> Self
    where
        F: Fn(Position, u32, Position, u32) -> f64 + 'static,
    {
        Self::with_weight_fn(Box::new(weight_fn))
    }

    pub fn with_weight_fn(weight_fn: WeightFn) -> Self {
        Self {
            graph: MarketGraph::new(),
            time: 0,
            next_id: 0,
            weight_fn,
        }
    }

    /// Clears all nodes and edges and rewinds the clock and id counter.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.time = 0;
        self.next_id = 0;
    }

    /// Inserts a node and returns its id.
    ///
    /// With `wait == 0` the node is active immediately and is connected to every
    /// active node of the opposite role. Otherwise it stays pending, without edges,
    /// until `wait` advances have elapsed.
    pub fn add_node(
        &mut self,
        position: impl Into<Position>,
        departure: u32,
        is_buyer: bool,
        wait: u32,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let role = Role::from_is_buyer(is_buyer);
        let position = position.into();
        let in_market = wait == 0;
        self.graph.insert_node(Node {
            id,
            role,
            position,
            departure,
            wait,
            in_market,
        });
        if in_market {
            self.connect(id);
        }
        info!(
            "node added id={} role={:?} pos=({}, {}) departure={} wait={} t={}",
            id, role, position.x, position.y, departure, wait, self.time
        );
        id
    }

    /// Advances the clock by one step.
    ///
    /// Active nodes count down toward departure and leave when their countdown
    /// would hit zero; pending nodes count down toward arrival and are connected
    /// once active. With `recalc_weights`, every edge is recomputed afterwards.
    pub fn advance(&mut self, recalc_weights: bool) -> AdvanceReport {
        self.time += 1;

        let mut departed = Vec::new();
        let mut arrived = Vec::new();
        for node in self.graph.nodes_mut() {
            if node.in_market {
                if node.departure > 1 {
                    node.departure -= 1;
                } else {
                    departed.push(node.id);
                }
            } else {
                node.wait = node.wait.saturating_sub(1);
                if node.wait < 1 {
                    arrived.push(node.id);
                }
            }
        }

        let mut report = AdvanceReport::default();
        for id in departed {
            if let Some(node) = self.graph.remove_node(id) {
                match node.role {
                    Role::Buyer => report.removed_buyers.push(id),
                    Role::Seller => report.removed_sellers.push(id),
                }
            }
        }

        for id in arrived {
            if self.graph.activate(id) {
                self.connect(id);
                trace!("node arrived id={} t={}", id, self.time);
            }
        }

        if recalc_weights {
            self.recalc_weights();
        }

        if !report.removed_buyers.is_empty() || !report.removed_sellers.is_empty() {
            info!(
                "nodes departed t={} buyers={:?} sellers={:?}",
                self.time, report.removed_buyers, report.removed_sellers
            );
        }
        debug!(
            "advanced t={} nodes={} edges={}",
            self.time,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        report
    }

    /// Realizes a committed match: both participants and all their edges leave
    /// the market. Returns the weight the (buyer, seller) edge held.
    pub fn remove_matching(&mut self, buyer: NodeId, seller: NodeId) -> Result<f64, SimError> {
        self.require_active(buyer, Role::Buyer)?;
        self.require_active(seller, Role::Seller)?;
        let weight = self
            .graph
            .edge_weight(buyer, seller)
            .ok_or(SimError::MissingMatch { buyer, seller })?;
        self.graph.remove_node(buyer);
        self.graph.remove_node(seller);
        info!(
            "match removed buyer={} seller={} weight={} t={}",
            buyer, seller, weight, self.time
        );
        Ok(weight)
    }

    /// Criticality at the default threshold of 1.
    pub fn is_critical(&self, id: NodeId) -> Result<bool, SimError> {
        self.is_critical_at(id, DEFAULT_CRITICAL_THRESHOLD)
    }

    /// True iff the active node's departure countdown is at most `threshold`.
    pub fn is_critical_at(&self, id: NodeId, threshold: u32) -> Result<bool, SimError> {
        let node = self.graph.node(id).ok_or(SimError::UnknownNode(id))?;
        if !node.in_market {
            return Err(SimError::NodeNotActive(id));
        }
        Ok(node.departure <= threshold)
    }

    /// Current logical time.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Id of the most recently inserted node, if any.
    pub fn last_node_id(&self) -> Option<NodeId> {
        self.next_id.checked_sub(1).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn edge_weight(&self, buyer: NodeId, seller: NodeId) -> Option<f64> {
        self.graph.edge_weight(buyer, seller)
    }

    /// Active buyer ids in arrival order.
    pub fn buyers(&self) -> &BTreeSet<NodeId> {
        self.graph.active(Role::Buyer)
    }

    /// Active seller ids in arrival order.
    pub fn sellers(&self) -> &BTreeSet<NodeId> {
        self.graph.active(Role::Seller)
    }

    /// Sellers adjacent to `buyer`, with weights, in id order.
    pub fn seller_edges(&self, buyer: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.graph.neighbors(buyer)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            time: self.time,
            nodes: self.graph.nodes().cloned().collect(),
            edges: self
                .graph
                .edges()
                .map(|(buyer, seller, weight)| EdgeSnapshot {
                    buyer,
                    seller,
                    weight,
                })
                .collect(),
        }
    }

    fn require_active(&self, id: NodeId, role: Role) -> Result<(), SimError> {
        let node = self.graph.node(id).ok_or(SimError::UnknownNode(id))?;
        if !node.in_market {
            return Err(SimError::NodeNotActive(id));
        }
        if node.role != role {
            return Err(SimError::RoleMismatch {
                id,
                expected: role,
                actual: node.role,
            });
        }
        Ok(())
    }

    /// Connects an active node to every active node of the opposite role.
    fn connect(&mut self, id: NodeId) {
        let Some(node) = self.graph.node(id).cloned() else {
            return;
        };
        let others: Vec<NodeId> = self
            .graph
            .active(node.role.opposite())
            .iter()
            .copied()
            .collect();
        for other_id in others {
            let Some(other) = self.graph.node(other_id) else {
                continue;
            };
            let weight = match node.role {
                Role::Buyer => self.weigh(&node, other),
                Role::Seller => self.weigh(other, &node),
            };
            self.graph.set_edge(id, other_id, weight);
        }
    }

    fn recalc_weights(&mut self) {
        let edges: Vec<(NodeId, NodeId)> = self.graph.edges().map(|(b, s, _)| (b, s)).collect();
        for (b, s) in edges {
            let (Some(buyer), Some(seller)) = (self.graph.node(b), self.graph.node(s)) else {
                continue;
            };
            let weight = self.weigh(buyer, seller);
            self.graph.set_edge(b, s, weight);
        }
    }

    fn weigh(&self, buyer: &Node, seller: &Node) -> f64 {
        (self.weight_fn)(buyer.position, buyer.departure, seller.position, seller.departure)
    }
}
