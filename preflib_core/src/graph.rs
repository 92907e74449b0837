use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// A node of a graph instance. Nodes are the alternatives of the file.
pub type Node = u32;

/// A weighted edge `(tail, head, weight)`.
pub type Edge = (Node, Node, i64);

/// A directed, edge-weighted graph without multi-edges.
///
/// Nodes are discovered when edges are inserted. There is at most one weight
/// per ordered pair of nodes, the last insertion wins.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Graph {
    adjacency: BTreeMap<Node, BTreeSet<Node>>,
    weight: BTreeMap<(Node, Node), i64>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Adds a node if it is not in the graph yet.
    pub fn add_node(&mut self, node: Node) {
        self.adjacency.entry(node).or_default();
    }

    /// Adds (or re-weights) the edge `tail -> head`, creating missing nodes.
    pub fn add_edge(&mut self, tail: Node, head: Node, weight: i64) {
        self.add_node(head);
        self.adjacency.entry(tail).or_default().insert(head);
        self.weight.insert((tail, head), weight);
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// The out-neighbours of a node, `None` if the node is unknown.
    pub fn neighbours(&self, node: Node) -> Option<&BTreeSet<Node>> {
        self.adjacency.get(&node)
    }

    pub fn weight(&self, tail: Node, head: Node) -> Option<i64> {
        self.weight.get(&(tail, head)).copied()
    }

    /// The edges leaving `node`, sorted by head. Empty for an unknown node.
    pub fn outgoing_edges(&self, node: Node) -> Vec<Edge> {
        self.adjacency
            .get(&node)
            .map(|heads| {
                heads
                    .iter()
                    .map(|&head| (node, head, self.weight[&(node, head)]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All the edges, sorted by tail then head.
    pub fn edges(&self) -> Vec<Edge> {
        self.weight
            .iter()
            .map(|(&(tail, head), &w)| (tail, head, w))
            .collect()
    }

    /// The nodes in increasing order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.weight.len()
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with {} vertices and {} edges:",
            self.num_nodes(),
            self.num_edges()
        )?;
        for node in self.nodes() {
            write!(f, "\n{}:", node)?;
            for (_, head, w) in self.outgoing_edges(node) {
                write!(f, " ({}, {})", head, w)?;
            }
        }
        Ok(())
    }
}
