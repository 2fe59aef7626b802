#![warn(missing_docs)]

//! # `onestroke`
//!
//! The algorithmic core of a one-stroke drawing puzzle, where every edge of a graph has to be drawn exactly once without lifting the pen.
//! Build a [`Graph`] from a node list and an edge list (parallel edges allowed), then:
//!
//! - call [`solve()`] for a complete Euler trail, e.g. to show the solution;
//! - call [`next_move()`] with a [`VisitedState`] rebuilt from the player's history for a hint;
//! - call [`generate()`](generator::generate) or [`level()`](generator::level) for a fresh puzzle.
//!
//! The [`api`] module wraps all three as JSON requests and responses for a thin web or command-line shell.
//! With the `wasm` feature (on by default) they are also exported to JavaScript.
//!
//! # Internals
//! A graph has an Euler trail if and only if its edges are connected and 0 or 2 of its vertices have odd degree.
//! With 0 the trail is a closed circuit; with 2 it runs between the two odd vertices.
//!
//! The solver is Hierholzer's algorithm over an indexed multigraph, so a parallel edge is consumed one occurrence at a time.
//!
//! Hints follow Fleury's rule: never draw an edge whose removal would split the undrawn edges in two (a "bridge"),
//! unless there is no other way forward.
//! Each hint is recomputed from scratch out of the full history, with one reachability search per candidate move.
//!
//! The generator draws a random graph, chains its components together, pairs off odd vertices until every degree is even,
//! and for an open path removes one edge again. Nothing random is shared between calls.

pub use generator::{generate, level, Difficulty, Kind};
pub use graph::{Graph, NodeId};
pub use hint::{next_move, Hint, Move, VisitedState};
pub use solver::solve;

pub mod api;
pub mod explain;
pub mod generator;
pub mod graph;
pub mod hint;
pub mod solver;
#[cfg(feature = "wasm")]
pub mod wasm;
mod tests;
