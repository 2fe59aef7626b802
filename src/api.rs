//! JSON-shaped requests and responses for request-handling shells.
//!
//! Every operation is a pure function of its request, so shells may call them from any thread.

use log::warn;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};

use crate::explain::{Explainer, NO_EXPLANATION};
use crate::generator::{self, Difficulty};
use crate::graph::{Graph, NodeId};
use crate::hint::{self, Hint, HintError, VisitedState};
use crate::solver;

/// A graph as it travels over the wire: `{"nodes": [1, 2], "edges": [[1, 2]]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPayload {
    /// Node identifiers.
    pub nodes: Vec<NodeId>,
    /// Edges as endpoint pairs; repeats are parallel edges.
    pub edges: Vec<[NodeId; 2]>,
}

impl From<&Graph> for GraphPayload {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().iter().map(|edge| [edge.0, edge.1]).collect(),
        }
    }
}

impl From<&GraphPayload> for Graph {
    fn from(payload: &GraphPayload) -> Self {
        Graph::new(payload.nodes.clone(), payload.edges.iter().map(|[a, b]| (*a, *b)))
    }
}

/// Request a new level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Level tier.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Level number within the tier; the same number always yields the same level.
    #[serde(default)]
    pub index: Option<u64>,
    /// Explicit seed, used when no `index` is given.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A generated level, or why there is none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Whether a level was generated.
    pub ok: bool,
    /// The level.
    #[serde(flatten)]
    pub graph: Option<GraphPayload>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// An Euler trail, or why there is none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Whether a trail was found.
    pub ok: bool,
    /// The trail as a node sequence.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Vec<NodeId>>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Ask for the next move given the full history of play.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    /// The puzzle.
    #[serde(flatten)]
    pub graph: GraphPayload,
    /// Drawn edges as `"a-b"`, in any order; unreadable entries are ignored.
    #[serde(default)]
    pub visited_edges: Vec<String>,
    /// Current end of the stroke, or `null` before the first move.
    #[serde(default)]
    pub path_endpoint: Option<NodeId>,
}

/// Outcome of a hint request.
#[derive(Clone, Copy, Debug, Display, EnumString, VariantArray, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HintStatus {
    /// A move is suggested.
    Move,
    /// All edges are drawn.
    Completed,
    /// The player is stuck and has to restart.
    DeadEnd,
    /// The graph has no Euler trail.
    Unsolvable,
    /// The request itself is wrong.
    InvalidInput,
    /// The engine failed; this is a bug, not a player mistake.
    InternalError,
}

/// The suggested move, or a status explaining why there is none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintResponse {
    /// Whether the request was handled without a failure. A completed puzzle counts as success.
    pub ok: bool,
    /// What happened.
    pub status: HintStatus,
    /// The suggested move as `[from, to]`.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none", default)]
    pub step: Option<[NodeId; 2]>,
    /// Human-readable status.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Natural-language explanation, or a placeholder when none is available.
    pub explanation: String,
}

/// Operations a shell can dispatch to [`handle_json`].
#[derive(Clone, Copy, Debug, Display, EnumString, VariantArray, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// [`generate`]
    Generate,
    /// [`solve`]
    Solve,
    /// [`hint`]
    Hint,
}

/// Generate a level for the requested tier.
pub fn generate(request: &GenerateRequest) -> GenerateResponse {
    let generated = match request.index {
        Some(index) => generator::level(request.difficulty, index),
        None => generator::generate_seeded(request.difficulty, request.seed),
    };

    match generated {
        Ok(graph) => GenerateResponse { ok: true, graph: Some(GraphPayload::from(&graph)), error: None },
        Err(e) => {
            warn!("level generation failed: {}", e);
            GenerateResponse { ok: false, graph: None, error: Some(e.to_string()) }
        }
    }
}

/// Solve a puzzle.
pub fn solve(request: &GraphPayload) -> SolveResponse {
    match solver::solve(&Graph::from(request)) {
        Ok(path) => SolveResponse { ok: true, path: Some(path), error: None },
        Err(e) => SolveResponse { ok: false, path: None, error: Some(e.to_string()) },
    }
}

/// Suggest the next move, attaching an explanation from `explainer` when it has one.
pub fn hint(request: &HintRequest, explainer: &dyn Explainer) -> HintResponse {
    let graph = Graph::from(&request.graph);
    let state = VisitedState::from_history(&graph, &request.visited_edges, request.path_endpoint);

    let (ok, status, step, message) = match hint::next_move(&graph, &state) {
        Ok(Hint::Move(step)) => (true, HintStatus::Move, Some(step), None),
        Ok(Hint::Completed) => (true, HintStatus::Completed, None, Some("all edges are drawn".to_string())),
        Ok(Hint::DeadEnd { position }) => (
            false,
            HintStatus::DeadEnd,
            None,
            Some(format!("no undrawn edge leaves node {}, but some remain elsewhere; start over", position)),
        ),
        Err(e) => {
            let status = match e {
                HintError::Unsolvable { .. } => HintStatus::Unsolvable,
                HintError::InvalidInput(_) | HintError::UnknownEndpoint(_) => HintStatus::InvalidInput,
                HintError::Inconsistent(_) => HintStatus::InternalError,
            };
            (false, status, None, Some(e.to_string()))
        }
    };

    let explanation = explainer.explain(&graph, &state, step)
        .unwrap_or_else(|| NO_EXPLANATION.to_string());

    HintResponse {
        ok,
        status,
        step: step.map(|step| [step.from, step.to]),
        message,
        explanation,
    }
}

/// Decode a JSON request for `operation`, run it, and encode the response.
pub fn handle_json(operation: Operation, request: &str, explainer: &dyn Explainer) -> Result<String, serde_json::Error> {
    match operation {
        Operation::Generate => serde_json::to_string(&generate(&serde_json::from_str::<GenerateRequest>(request)?)),
        Operation::Solve => serde_json::to_string(&solve(&serde_json::from_str::<GraphPayload>(request)?)),
        Operation::Hint => serde_json::to_string(&hint(&serde_json::from_str::<HintRequest>(request)?, explainer)),
    }
}
