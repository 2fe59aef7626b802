//! Random generation of puzzles that can be drawn in one stroke.
//!
//! [`generate`] builds a connected graph with exactly the odd vertex count a [`Kind`] asks for.
//! [`Difficulty`] maps the three level tiers onto generator parameters, and [`level`] derives a level deterministically from a tier and an index.

use std::ops::RangeInclusive;

use itertools::Itertools;
use log::debug;
use petgraph::graphmap::UnGraphMap;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};
use thiserror::Error;

use crate::graph::{components, spans, Graph, NodeId};
use crate::solver::{solve, SolveError};

/// Number of fresh graphs [`generate`] draws before giving up.
pub const MAX_ATTEMPTS: usize = 64;

/// The shape of stroke a puzzle demands.
#[derive(Copy, Clone, Debug, Display, EnumString, VariantArray, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Every vertex has even degree; the stroke ends where it began.
    Circuit,
    /// Exactly two vertices have odd degree; the stroke runs from one to the other.
    Path,
}

impl Kind {
    /// How many odd-degree vertices a graph of this kind has.
    pub fn odd_vertices(&self) -> usize {
        match self {
            Kind::Circuit => 0,
            Kind::Path => 2,
        }
    }
}

/// Reasons [`generate`] may fail.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerateError {
    /// The requested parameters make no sense.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No attempt produced a valid graph.
    #[error("no valid graph found after {attempts} attempts")]
    GenerationFailed {
        /// Attempts made.
        attempts: usize,
    },
    /// A generated level could not be solved. This indicates a generator bug.
    #[error("generated level failed verification: {0}")]
    Unverified(#[from] SolveError),
}

/// Generate a connected graph over nodes `1..=num_nodes` which can be drawn as a `kind` stroke.
///
/// Every pair of nodes is first joined with probability `edge_probability`.
/// Components are then chained together and odd vertices paired off until every degree is even;
/// for a [`Kind::Path`], one edge is finally removed to open the circuit up.
/// A result that fails the final connectivity and parity check is thrown away, at most [`MAX_ATTEMPTS`] times.
///
/// All randomness comes from `rng`, so a seeded generator reproduces its graph.
pub fn generate<R: Rng>(num_nodes: usize, edge_probability: f64, kind: Kind, rng: &mut R) -> Result<Graph, GenerateError> {
    if num_nodes < 3 {
        return Err(GenerateError::InvalidInput(format!("need at least 3 nodes, got {}", num_nodes)));
    }
    if NodeId::try_from(num_nodes).is_err() {
        return Err(GenerateError::InvalidInput(format!("{} nodes is too many", num_nodes)));
    }
    if !(0.0..=1.0).contains(&edge_probability) {
        return Err(GenerateError::InvalidInput(format!("edge probability {} is outside [0, 1]", edge_probability)));
    }

    for attempt in 1..=MAX_ATTEMPTS {
        match attempt_once(num_nodes as NodeId, edge_probability, kind, rng) {
            Some(graph) => {
                debug!("generated {} graph with {} edges on attempt {}", kind, graph.edge_count(), attempt);
                return Ok(graph);
            }
            None => debug!("attempt {} did not yield a valid {} graph, regenerating", attempt, kind),
        }
    }

    Err(GenerateError::GenerationFailed { attempts: MAX_ATTEMPTS })
}

fn odd_vertices(graph: &UnGraphMap<NodeId, ()>) -> Vec<NodeId> {
    graph.nodes().filter(|node| graph.neighbors(*node).count() % 2 == 1).collect()
}

fn attempt_once<R: Rng>(num_nodes: NodeId, edge_probability: f64, kind: Kind, rng: &mut R) -> Option<Graph> {
    let nodes = (1..=num_nodes).collect_vec();
    let mut graph: UnGraphMap<NodeId, ()> = UnGraphMap::with_capacity(nodes.len(), nodes.len() * (nodes.len() - 1) / 2);
    for node in &nodes {
        graph.add_node(*node);
    }

    for (a, b) in nodes.iter().copied().tuple_combinations() {
        if rng.random_bool(edge_probability) {
            graph.add_edge(a, b, ());
        }
    }

    connect(&mut graph, rng);
    make_even(&mut graph, rng);

    if kind == Kind::Path {
        // an even, connected graph has no bridges, so any edge may go
        let edges = graph.all_edges().map(|(a, b, _)| (a, b)).collect_vec();
        let (a, b) = *edges.choose(rng)?;
        graph.remove_edge(a, b);
    }

    if !spans(&graph) || odd_vertices(&graph).len() != kind.odd_vertices() {
        return None;
    }

    Some(Graph::new(nodes, graph.all_edges().map(|(a, b, _)| (a, b))))
}

/// Chain components together with one random edge between each consecutive pair.
fn connect<R: Rng>(graph: &mut UnGraphMap<NodeId, ()>, rng: &mut R) {
    let components = components(graph);
    for (left, right) in components.iter().tuple_windows() {
        // components are never empty
        if let (Some(a), Some(b)) = (left.choose(rng), right.choose(rng)) {
            graph.add_edge(*a, *b, ());
        }
    }
}

/// Pair odd vertices off at random and fix each pair without adding parallel edges.
///
/// A pair `u`, `v` is joined directly if possible.
/// If they are already adjacent, both are joined to some `w` adjacent to neither, which leaves the parity of `w` alone.
/// Failing that, the existing `u`-`v` edge is removed instead.
fn make_even<R: Rng>(graph: &mut UnGraphMap<NodeId, ()>, rng: &mut R) {
    let mut odd = odd_vertices(graph);
    odd.shuffle(rng);

    for (u, v) in odd.into_iter().tuples() {
        if !graph.contains_edge(u, v) {
            graph.add_edge(u, v, ());
            continue;
        }

        let detours = graph.nodes()
            .filter(|w| *w != u && *w != v && !graph.contains_edge(u, *w) && !graph.contains_edge(v, *w))
            .collect_vec();
        match detours.choose(rng) {
            Some(w) => {
                graph.add_edge(u, *w, ());
                graph.add_edge(*w, v, ());
            }
            None => {
                graph.remove_edge(u, v);
            }
        }
    }
}

/// Level tiers.
#[derive(Copy, Clone, Debug, Default, Display, EnumString, VariantArray, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Small, sparse circuits.
    #[default]
    Easy,
    /// Mid-sized circuits.
    Medium,
    /// Larger, dense graphs that must be drawn as an open path.
    Hard,
}

/// Generator parameters for a [`Difficulty`].
#[derive(Clone, Debug, PartialEq)]
pub struct LevelParams {
    /// Node counts to pick from.
    pub nodes: RangeInclusive<usize>,
    /// Probability of each initial edge.
    pub edge_probability: f64,
    /// Stroke shape.
    pub kind: Kind,
}

impl Difficulty {
    /// The generator parameters for this tier.
    pub fn params(&self) -> LevelParams {
        match self {
            Difficulty::Easy => LevelParams { nodes: 5..=6, edge_probability: 0.4, kind: Kind::Circuit },
            Difficulty::Medium => LevelParams { nodes: 7..=9, edge_probability: 0.45, kind: Kind::Circuit },
            Difficulty::Hard => LevelParams { nodes: 10..=12, edge_probability: 0.6, kind: Kind::Path },
        }
    }

    /// Seed identifying level `index` of this tier.
    pub fn seed_for(&self, index: u64) -> u64 {
        let tier = match self {
            Difficulty::Easy => 1u64,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        };

        (tier << 48) ^ index
    }
}

/// Generate a level of the given tier, checking it can actually be solved.
pub fn generate_level<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Result<Graph, GenerateError> {
    let params = difficulty.params();
    let num_nodes = rng.random_range(params.nodes);
    let graph = generate(num_nodes, params.edge_probability, params.kind, rng)?;
    solve(&graph)?;

    Ok(graph)
}

/// Generate a level from an explicit seed, or from fresh entropy when `seed` is `None`.
///
/// Every call owns its generator, so concurrent callers never disturb one another's sequences.
pub fn generate_seeded(difficulty: Difficulty, seed: Option<u64>) -> Result<Graph, GenerateError> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    generate_level(difficulty, &mut rng)
}

/// Level number `index` of a tier. The same tier and index always give the same graph.
pub fn level(difficulty: Difficulty, index: u64) -> Result<Graph, GenerateError> {
    generate_seeded(difficulty, Some(difficulty.seed_for(index)))
}
