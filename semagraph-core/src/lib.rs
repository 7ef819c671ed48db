//! Semagraph Core
//!
//! A reactive value-propagation graph: named mutable cells ("nodes")
//! connected by directed, guard-gated transformation links ("edges").
//! Updating a cell automatically recomputes and pushes values to dependent
//! cells, so derived state (form-validation fields, computed flags) and
//! side-effecting reactions need no manual re-computation bookkeeping.
//!
//! # Architecture
//!
//! - `graph`: the node/edge data model and the depth-first propagation
//!   engine
//! - `projection`: reusable declarative recipes that materialize into edges
//!   when applied to a graph
//! - `func`: async callback types (constraints, merges, guards, transforms)
//!   and adapters for plain async closures
//! - `error`: typed setup and evaluation errors
//!
//! # Example
//!
//! ```rust,ignore
//! use semagraph_core::{Graph, NodeConfig, EffectConfig};
//! use semagraph_core::projection::{from, Rule};
//!
//! let mut form: Graph<serde_json::Value> = Graph::new();
//!
//! form.binding("age", NodeConfig::new("".into()))?
//!     .binding("age_error", NodeConfig::new(serde_json::Value::Null))?;
//!
//! // Derive the error field from the raw input.
//! form.define("age_error", &from(["age"], vec![Rule::map(|values, _| async move {
//!     let ok = values[0].as_str().is_some_and(|s| s.parse::<u32>().is_ok_and(|n| n >= 18));
//!     Ok(if ok { serde_json::Value::Null } else { "Must be 18+".into() })
//! })]))?;
//!
//! form.update("age", "41".into()).await?;
//! assert!(form.value("age_error")?.is_null());
//! ```
//!
//! Propagation is fully sequential and runs to completion before `update`
//! resolves; see the `graph` module docs for the ordering and failure
//! contracts.

pub mod error;
pub mod func;
pub mod graph;
pub mod projection;

pub use error::{EvalError, EvalResult, EvalStage, GraphError, Result};
pub use graph::{
    Edge, EdgeConfig, EdgeId, EdgeMeta, EffectConfig, Graph, Node, NodeConfig, NodeMeta,
    EFFECT_SINK,
};
pub use projection::{from, FromProjection, Projection, Rule};
