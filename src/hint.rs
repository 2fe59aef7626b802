use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::{debug, error};
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::graph::{parse_edge, EdgeKey, Graph, GraphError, NodeId};

/// One edge traversal, from the player's position to a neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    /// Node the player is standing on.
    pub from: NodeId,
    /// Node the edge leads to.
    pub to: NodeId,
}

impl Move {
    /// The edge this move consumes.
    pub fn edge(&self) -> EdgeKey {
        UnorderedPair(self.from, self.to)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// What the player should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
    /// Take this edge.
    Move(Move),
    /// Every edge has been drawn; nothing is left to do.
    Completed,
    /// Edges remain, but none of them touch `position`; the player has to start over.
    DeadEnd {
        /// Where the player got stuck.
        position: NodeId,
    },
}

/// Reasons [`next_move`] may refuse to give a hint.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HintError {
    /// The graph itself is malformed.
    #[error("invalid graph: {0}")]
    InvalidInput(#[from] GraphError),
    /// No start position was given and the graph has no Euler trail to start one on.
    #[error("graph is unsolvable: {} vertices have odd degree", .odd_vertices.len())]
    Unsolvable {
        /// Every odd-degree vertex, in node order.
        odd_vertices: Vec<NodeId>,
    },
    /// The given position is not a node of the graph.
    #[error("node {0} is not part of the graph")]
    UnknownEndpoint(NodeId),
    /// Moves exist but none could be chosen. This should never happen.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),
}

/// Player progress, rebuilt from scratch from the caller's history on every request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitedState {
    visited: HashMap<EdgeKey, usize>,
    position: Option<NodeId>,
}

impl VisitedState {
    /// A fresh game: nothing visited, and the start left to the engine when `position` is `None`.
    pub fn new(position: Option<NodeId>) -> Self {
        Self { visited: HashMap::new(), position }
    }

    /// Rebuild progress from a history of edges encoded as `"a-b"`.
    ///
    /// The history is unordered and direction-agnostic.
    /// Entries that do not parse, or that name an edge missing from `graph`, are skipped rather than rejected,
    /// and counts are capped at each edge's multiplicity.
    pub fn from_history<S: AsRef<str>>(graph: &Graph, history: &[S], position: Option<NodeId>) -> Self {
        let totals = graph.multiplicities();
        let mut state = Self::new(position);

        for entry in history {
            let entry = entry.as_ref();
            let Ok(edge) = parse_edge(entry) else {
                debug!("dropping malformed history entry {:?}", entry);
                continue;
            };
            let Some(total) = totals.get(&edge) else {
                debug!("dropping history entry {:?}, no such edge", entry);
                continue;
            };

            let count = state.visited.entry(edge).or_default();
            *count = (*count + 1).min(*total);
        }

        state
    }

    /// The player's current node, if a game is under way.
    pub fn position(&self) -> Option<NodeId> {
        self.position
    }

    /// How many times `edge` has been drawn.
    pub fn visited(&self, edge: EdgeKey) -> usize {
        self.visited.get(&edge).copied().unwrap_or_default()
    }

    /// Record a move as drawn and move the player to its far end.
    pub fn apply(&mut self, step: Move) {
        *self.visited.entry(step.edge()).or_default() += 1;
        self.position = Some(step.to);
    }
}

/// A candidate move and whether taking it would cut off part of the undrawn edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// The move.
    pub step: Move,
    /// `true` if drawing this edge strands undrawn edges beyond it, i.e. the edge is a bridge of the undrawn graph.
    pub bridge: bool,
}

/// The undrawn part of a graph: remaining parallel occurrences per edge, and for every node its distinct neighbors in input order.
///
/// Neighbors whose shared edges are used up stay in the lists and are filtered on read,
/// so taking and restoring an edge only ever touches a counter.
struct RemainingGraph {
    remaining: HashMap<EdgeKey, usize>,
    neighbors: HashMap<NodeId, Vec<NodeId>>,
}

impl RemainingGraph {
    fn new(graph: &Graph, state: &VisitedState) -> Self {
        let remaining = graph.multiplicities()
            .into_iter()
            .map(|(edge, total)| (edge, total.saturating_sub(state.visited(edge))))
            .collect();

        Self { remaining, neighbors: graph.ordered_neighbors() }
    }

    fn remaining(&self, edge: EdgeKey) -> usize {
        self.remaining.get(&edge).copied().unwrap_or_default()
    }

    /// Neighbors of `node` still joined to it by an undrawn edge.
    fn live_neighbors(&self, node: NodeId) -> impl Iterator<Item=NodeId> + '_ {
        self.neighbors.get(&node)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |neighbor| self.remaining(UnorderedPair(node, *neighbor)) > 0)
    }

    fn has_edges(&self, node: NodeId) -> bool {
        self.live_neighbors(node).next().is_some()
    }

    fn is_exhausted(&self) -> bool {
        self.remaining.values().all(|count| *count == 0)
    }

    fn take(&mut self, edge: EdgeKey) {
        if let Some(count) = self.remaining.get_mut(&edge) {
            *count = count.saturating_sub(1);
        }
    }

    fn restore(&mut self, edge: EdgeKey) {
        *self.remaining.entry(edge).or_default() += 1;
    }

    /// Every node reachable from `start` over undrawn edges, found with an explicit stack.
    fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            for neighbor in self.live_neighbors(node) {
                if seen.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        seen
    }

    /// Whether drawing `from`-`to` next would cut the undrawn edges in two.
    ///
    /// One occurrence of the edge is set aside and the undrawn graph searched from `from`,
    /// or from `to` when `from` has nothing left; the edge is a bridge if `to` falls out of reach
    /// or nothing at all would be left to search.
    fn is_bridge(&mut self, from: NodeId, to: NodeId) -> bool {
        let edge = UnorderedPair(from, to);
        self.take(edge);

        let search_from = if self.has_edges(from) {
            Some(from)
        } else if self.has_edges(to) {
            Some(to)
        } else {
            None
        };
        let bridge = match search_from {
            None => true,
            Some(start) => !self.reachable_from(start).contains(&to),
        };

        self.restore(edge);
        bridge
    }

    fn classify(&mut self, from: NodeId) -> Vec<Candidate> {
        let targets = self.live_neighbors(from).collect_vec();
        targets.into_iter()
            .map(|to| Candidate { step: Move { from, to }, bridge: self.is_bridge(from, to) })
            .collect()
    }
}

/// The node a hint is computed for: the player's position, or where a trail would have to start.
/// `None` when no position is given and the graph has no edges.
fn acting_vertex(graph: &Graph, state: &VisitedState) -> Result<Option<NodeId>, HintError> {
    match state.position {
        Some(position) if graph.contains(position) => Ok(Some(position)),
        Some(position) => Err(HintError::UnknownEndpoint(position)),
        None => graph.trail_start().map_err(|odd_vertices| HintError::Unsolvable { odd_vertices }),
    }
}

/// Classify every move available from the acting node.
///
/// Candidates are listed in adjacency order: neighbors ordered by their first edge in the input.
pub fn classify_moves(graph: &Graph, state: &VisitedState) -> Result<Vec<Candidate>, HintError> {
    graph.validate()?;
    let Some(acting) = acting_vertex(graph, state)? else {
        return Ok(Vec::new());
    };

    Ok(RemainingGraph::new(graph, state).classify(acting))
}

/// Suggest the next edge to draw, steering clear of bridges of the undrawn graph.
///
/// The suggestion is computed from nothing but the arguments, so repeating a call repeats the answer.
///
/// # Policy
/// 1. With no edges left at all, the puzzle is [`Hint::Completed`]; with edges left elsewhere but none at the acting node, it is a [`Hint::DeadEnd`].
/// 2. If the acting node has a single neighbor left, that move is forced and returned as is.
/// 3. Otherwise the first move, in adjacency order, that is not a bridge is returned.
///    Only when every move is a bridge is the first of them taken.
///
/// Following the hints from a valid start always draws the whole graph.
pub fn next_move(graph: &Graph, state: &VisitedState) -> Result<Hint, HintError> {
    graph.validate()?;
    let Some(acting) = acting_vertex(graph, state)? else {
        return Ok(Hint::Completed);
    };

    let mut remaining = RemainingGraph::new(graph, state);
    let targets = remaining.live_neighbors(acting).collect_vec();
    match targets.as_slice() {
        [] => {
            return Ok(if remaining.is_exhausted() {
                Hint::Completed
            } else {
                Hint::DeadEnd { position: acting }
            });
        }
        [only] => {
            debug!("move {}-{} is forced", acting, only);
            return Ok(Hint::Move(Move { from: acting, to: *only }));
        }
        _ => {}
    }

    let candidates = remaining.classify(acting);
    let chosen = candidates.iter()
        .find(|candidate| !candidate.bridge)
        .or_else(|| candidates.first());

    match chosen {
        Some(candidate) => {
            debug!("suggesting {} out of {} candidates, bridge: {}", candidate.step, candidates.len(), candidate.bridge);
            Ok(Hint::Move(candidate.step))
        }
        None => {
            let reason = format!("node {} has undrawn edges but no candidate move", acting);
            error!("{}", reason);
            Err(HintError::Inconsistent(reason))
        }
    }
}
