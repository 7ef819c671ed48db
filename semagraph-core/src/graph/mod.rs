//! The Propagation Graph
//!
//! This module implements the node/edge data model and the update-and-
//! propagate engine.
//!
//! # Overview
//!
//! The graph is a directed structure where:
//!
//! - Nodes are named mutable value cells with a constraint gate and a merge
//!   function
//! - Edges are guard-gated transformations from a fixed set of input nodes
//!   to zero or more output nodes
//!
//! Updating a node merges the incoming value, stores the result, and - if
//! the node's constraint passes - fires its edges depth-first and strictly
//! in attachment order, each edge in turn updating its output nodes.
//!
//! # Design Decisions
//!
//! 1. Ownership is centralized in [`Graph`] rather than distributed through
//!    reference-counted links because:
//!    - The node/edge relationship is many-to-many and bidirectional, which
//!      would otherwise force `Arc` cycles
//!    - Exclusive access through `&mut Graph` statically serializes
//!      external calls, which the ordering contract requires anyway
//!
//! 2. Nodes are addressed by name (that is their identity); edges are
//!    anonymous and addressed by [`EdgeId`].
//!
//! 3. No scheduling layer: propagation order is purely structural
//!    (attachment order), with no batching, deduplication, or topological
//!    reordering.

mod edge;
mod graph;
mod node;

pub use edge::{Edge, EdgeConfig, EdgeId, EdgeMeta, EffectConfig, EFFECT_SINK};
pub use graph::Graph;
pub use node::{Node, NodeConfig, NodeMeta};
