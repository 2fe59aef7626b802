use itertools::Itertools;

use crate::graph::Graph;
use crate::hint::{classify_moves, Move, VisitedState};

/// Text returned in place of an explanation when none could be produced.
pub const NO_EXPLANATION: &str = "no explanation available";

/// Produces a natural-language explanation of a hint.
///
/// Explanations are decoration: an implementation may fail or be absent at any time, and a hint is still returned.
pub trait Explainer {
    /// Explain the state of play and the suggested move, if any. `None` means no explanation is available.
    fn explain(&self, graph: &Graph, state: &VisitedState, suggested: Option<Move>) -> Option<String>;
}

/// An [`Explainer`] that never explains anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExplainer;

impl Explainer for NoExplainer {
    fn explain(&self, _graph: &Graph, _state: &VisitedState, _suggested: Option<Move>) -> Option<String> {
        None
    }
}

/// An [`Explainer`] which describes the available moves and which of them are bridges, computed locally.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalExplainer;

impl Explainer for LocalExplainer {
    fn explain(&self, graph: &Graph, state: &VisitedState, suggested: Option<Move>) -> Option<String> {
        let candidates = classify_moves(graph, state).ok()?;
        let suggested = suggested?;
        let position = suggested.from;

        let mut text = format!(
            "From node {} you can take {}.",
            position,
            candidates.iter().map(|candidate| candidate.step.to_string()).join(", "),
        );

        let bridges = candidates.iter().filter(|candidate| candidate.bridge).collect_vec();
        if candidates.len() == 1 {
            text.push_str(&format!(" Edge {} is the only way on.", suggested));
        } else if bridges.is_empty() {
            text.push_str(&format!(" None of them cut off undrawn edges; take {}.", suggested));
        } else if bridges.len() == candidates.len() {
            text.push_str(&format!(" Every choice cuts off undrawn edges; take {} and finish that side later.", suggested));
        } else {
            text.push_str(&format!(
                " Avoid {}: drawing it now would leave undrawn edges out of reach. Take {} instead.",
                bridges.iter().map(|candidate| candidate.step.to_string()).join(", "),
                suggested,
            ));
        }

        Some(text)
    }
}
