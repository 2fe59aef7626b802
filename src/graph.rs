use std::collections::{HashMap, HashSet};
use std::num::ParseIntError;

use itertools::Itertools;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Dfs;
use thiserror::Error;
use unordered_pair::UnorderedPair;

/// Identifier of a puzzle node. Nodes carry no data beyond identity.
pub type NodeId = u32;

/// An undirected edge, keyed by its endpoints irrespective of order.
///
/// Parallel edges share a key; their count is tracked separately, see [`Graph::multiplicities`].
pub type EdgeKey = UnorderedPair<NodeId>;

/// Reasons a [`Graph`] may be rejected before any algorithm runs on it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// An edge names a node missing from the node list.
    #[error("edge {edge} references node {node}, which is not in the node list")]
    UnknownNode {
        /// The missing node.
        node: NodeId,
        /// The offending edge, encoded as `"a-b"`.
        edge: String,
    },
}

/// Reasons an encoded edge such as `"3-7"` could not be read.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EdgeParseError {
    /// No `-` separates the two endpoints.
    #[error("expected \"<a>-<b>\"")]
    MissingSeparator,
    /// An endpoint is not a node identifier.
    #[error("bad endpoint: {0}")]
    BadEndpoint(#[from] ParseIntError),
}

/// Encode an edge the way visited-edge histories spell it, `"<a>-<b>"`.
pub fn encode_edge(edge: EdgeKey) -> String {
    format!("{}-{}", edge.0, edge.1)
}

/// Read an edge encoded as `"<a>-<b>"`. Whitespace around either endpoint is tolerated.
pub fn parse_edge(text: &str) -> Result<EdgeKey, EdgeParseError> {
    let (a, b) = text.split_once('-').ok_or(EdgeParseError::MissingSeparator)?;
    Ok(UnorderedPair(a.trim().parse()?, b.trim().parse()?))
}

/// An undirected multigraph as handed over by callers: a node list plus an edge list in which
/// the same pair may appear more than once.
///
/// Input order is significant; wherever an algorithm needs to pick "the first" vertex or neighbor,
/// it follows the order nodes and edges were given in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) edges: Vec<EdgeKey>,
}

impl Graph {
    /// Construct a graph from its nodes and `(a, b)` edges.
    pub fn new(nodes: Vec<NodeId>, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        Self {
            nodes,
            edges: edges.into_iter().map(UnorderedPair::from).collect(),
        }
    }

    /// Nodes, in input order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges, in input order, one entry per parallel occurrence.
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    /// Total number of edges, counting parallel occurrences separately.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `node` is in the node list.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Check every edge endpoint belongs to the node list.
    pub fn validate(&self) -> Result<(), GraphError> {
        let known: HashSet<NodeId> = self.nodes.iter().copied().collect();
        for edge in &self.edges {
            for node in [edge.0, edge.1] {
                if !known.contains(&node) {
                    return Err(GraphError::UnknownNode { node, edge: encode_edge(*edge) });
                }
            }
        }

        Ok(())
    }

    /// Degree of every node appearing in an edge. A self-loop counts twice.
    pub fn degrees(&self) -> HashMap<NodeId, usize> {
        let mut degrees = HashMap::with_capacity(self.nodes.len());
        for UnorderedPair(a, b) in &self.edges {
            *degrees.entry(*a).or_default() += 1;
            *degrees.entry(*b).or_default() += 1;
        }

        degrees
    }

    /// Degree of a single node; zero for nodes without edges.
    pub fn degree(&self, node: NodeId) -> usize {
        self.edges.iter()
            .map(|UnorderedPair(a, b)| usize::from(*a == node) + usize::from(*b == node))
            .sum()
    }

    /// Odd-degree nodes, in input node order.
    pub fn odd_vertices(&self) -> Vec<NodeId> {
        let degrees = self.degrees();
        self.nodes.iter()
            .copied()
            .unique()
            .filter(|node| degrees.get(node).is_some_and(|degree| degree % 2 == 1))
            .collect()
    }

    /// How many parallel occurrences each distinct edge has.
    pub fn multiplicities(&self) -> HashMap<EdgeKey, usize> {
        self.edges.iter().copied().counts()
    }

    /// Distinct neighbors of every node, ordered by first appearance in the edge list.
    pub(crate) fn ordered_neighbors(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut neighbors: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(self.nodes.len());
        for UnorderedPair(a, b) in &self.edges {
            for (from, to) in [(*a, *b), (*b, *a)] {
                let list = neighbors.entry(from).or_default();
                if !list.contains(&to) {
                    list.push(to);
                }
            }
        }

        neighbors
    }

    /// Where a trail over this graph has to begin.
    ///
    /// With two odd vertices, the first of them in node order; with none, the first node with an edge.
    /// `Ok(None)` means there are no edges at all.
    /// When the odd vertex count is neither 0 nor 2, no trail exists and the odd vertices are returned as the error.
    pub(crate) fn trail_start(&self) -> Result<Option<NodeId>, Vec<NodeId>> {
        let odd = self.odd_vertices();
        match odd.len() {
            2 => Ok(odd.first().copied()),
            0 => {
                let degrees = self.degrees();
                Ok(self.nodes.iter().copied().find(|node| degrees.contains_key(node)))
            }
            _ => Err(odd),
        }
    }

    /// Whether the nodes carrying edges form a single connected component.
    /// Isolated nodes are ignored; a graph without edges counts as connected.
    pub fn is_connected(&self) -> bool {
        let simple: UnGraphMap<NodeId, ()> = UnGraphMap::from_edges(self.edges.iter().map(|UnorderedPair(a, b)| (*a, *b)));
        spans(&simple)
    }

    /// Index the graph as a petgraph multigraph, keeping parallel edges distinct.
    ///
    /// Edge indices match positions in [`Self::edges`]; node weights are the original identifiers.
    pub(crate) fn to_multigraph(&self) -> (UnGraph<NodeId, ()>, HashMap<NodeId, NodeIndex>) {
        let mut multigraph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index_of = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            index_of.entry(*node).or_insert_with(|| multigraph.add_node(*node));
        }

        for UnorderedPair(a, b) in &self.edges {
            // validated beforehand, but keep indices aligned with the edge list regardless
            let a = *index_of.entry(*a).or_insert_with(|| multigraph.add_node(*a));
            let b = *index_of.entry(*b).or_insert_with(|| multigraph.add_node(*b));
            multigraph.add_edge(a, b, ());
        }

        (multigraph, index_of)
    }
}

/// Connected components of a simple graph, each listed in DFS discovery order.
pub(crate) fn components(graph: &UnGraphMap<NodeId, ()>) -> Vec<Vec<NodeId>> {
    let mut seen = HashSet::with_capacity(graph.node_count());
    let mut components = Vec::new();

    for start in graph.nodes() {
        if seen.contains(&start) {
            continue;
        }

        let mut component = Vec::new();
        let mut dfs = Dfs::new(graph, start);
        while let Some(node) = dfs.next(graph) {
            seen.insert(node);
            component.push(node);
        }
        components.push(component);
    }

    components
}

/// Whether every node of `graph` is reachable from every other.
pub(crate) fn spans(graph: &UnGraphMap<NodeId, ()>) -> bool {
    let Some(start) = graph.nodes().next() else {
        return true;
    };

    let mut reached = 0;
    let mut dfs = Dfs::new(graph, start);
    while dfs.next(graph).is_some() {
        reached += 1;
    }

    reached == graph.node_count()
}
