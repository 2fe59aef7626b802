//! Bindings for the browser front end. Each function takes and returns the JSON documents of [`crate::api`].

use wasm_bindgen::prelude::*;

use crate::api::{handle_json, Operation};
use crate::explain::LocalExplainer;

fn run(operation: Operation, request: &str) -> Result<String, JsValue> {
    handle_json(operation, request, &LocalExplainer)
        .map_err(|e| js_sys::Error::new(&format!("bad {} request: {}", operation, e)).into())
}

/// Generate a level from a JSON `GenerateRequest`.
#[wasm_bindgen]
pub fn generate(request: &str) -> Result<String, JsValue> {
    run(Operation::Generate, request)
}

/// Solve the JSON graph in `request`.
#[wasm_bindgen]
pub fn solve(request: &str) -> Result<String, JsValue> {
    run(Operation::Solve, request)
}

/// Suggest the next move for a JSON `HintRequest`, explained locally.
#[wasm_bindgen]
pub fn hint(request: &str) -> Result<String, JsValue> {
    run(Operation::Hint, request)
}
