use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use petgraph::visit::EdgeRef;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::graph::{Graph, GraphError, NodeId};

/// A walk through a graph as the sequence of nodes it visits.
pub type Trail = Vec<NodeId>;

/// Reasons [`solve`] may fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    /// The graph itself is malformed.
    #[error("invalid graph: {0}")]
    InvalidInput(#[from] GraphError),
    /// The number of odd-degree vertices is neither 0 nor 2, so no Euler trail exists.
    #[error("no Euler path: {} vertices have odd degree", .odd_vertices.len())]
    Unsolvable {
        /// Every odd-degree vertex, in node order.
        odd_vertices: Vec<NodeId>,
    },
    /// Degrees allow a trail, but the edges are split across several components.
    #[error("no Euler path: graph is disconnected, a walk covers only {covered} of {total} edges")]
    Disconnected {
        /// Edges the walk managed to consume from the start vertex's component.
        covered: usize,
        /// Edges in the graph.
        total: usize,
    },
}

/// Find an Euler trail: a walk using every edge exactly once, parallel edges included.
///
/// The walk starts at the first odd vertex in node order if there are two, otherwise at the first node that has an edge, in which case it is a closed circuit.
/// A graph with no edges yields the empty trail.
///
/// # Internals
/// This is Hierholzer's algorithm run over an indexed multigraph.
/// Every node keeps a list of `(edge, neighbor)` slots and a cursor into it; an edge is consumed by marking its index used, so a single parallel occurrence is taken at a time.
/// The walk is only checked for completeness afterwards: a disconnected graph makes it stop early, which is reported as [`SolveError::Disconnected`].
pub fn solve(graph: &Graph) -> Result<Trail, SolveError> {
    graph.validate()?;

    let start = match graph.trail_start() {
        Ok(Some(start)) => start,
        Ok(None) => return Ok(Trail::new()),
        Err(odd_vertices) => return Err(SolveError::Unsolvable { odd_vertices }),
    };

    let (multigraph, index_of) = graph.to_multigraph();

    // edge_references() yields edges in index order, i.e. input order
    let mut slots = vec![Vec::new(); multigraph.node_count()];
    for edge in multigraph.edge_references() {
        slots[edge.source().index()].push((edge.id(), edge.target()));
        if edge.source() != edge.target() {
            slots[edge.target().index()].push((edge.id(), edge.source()));
        }
    }

    let mut used = vec![false; multigraph.edge_count()];
    let mut cursors = vec![0usize; multigraph.node_count()];
    let mut stack = vec![index_of[&start]];
    let mut trail = Trail::with_capacity(graph.edge_count() + 1);

    while let Some(&vertex) = stack.last() {
        let slots_here = &slots[vertex.index()];
        let cursor = &mut cursors[vertex.index()];
        while slots_here.get(*cursor).is_some_and(|(edge, _)| used[edge.index()]) {
            *cursor += 1;
        }

        match slots_here.get(*cursor) {
            Some(&(edge, neighbor)) => {
                used[edge.index()] = true;
                stack.push(neighbor);
            }
            None => {
                stack.pop();
                trail.push(multigraph[vertex]);
            }
        }
    }

    trail.reverse();

    let covered = trail.len().saturating_sub(1);
    if covered != graph.edge_count() {
        return Err(SolveError::Disconnected { covered, total: graph.edge_count() });
    }

    debug!("euler trail of {} edges from node {}", covered, start);
    Ok(trail)
}

/// Check that `trail` walks every edge of `graph` exactly once, respecting multiplicity.
pub fn verify_trail(graph: &Graph, trail: &[NodeId]) -> bool {
    if graph.edges.is_empty() {
        return trail.len() <= 1;
    }

    let mut remaining: HashMap<_, usize> = graph.multiplicities();
    for (a, b) in trail.iter().copied().tuple_windows() {
        match remaining.get_mut(&UnorderedPair(a, b)) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }

    remaining.values().all(|count| *count == 0)
}
