//! Graph Nodes
//!
//! A node is a named mutable value cell. It owns the current value, a
//! constraint predicate that gates propagation, a merge function that folds
//! incoming values into the stored one, and the list of edges that read
//! from it (in attachment order, which is the order they are visited during
//! a sweep).
//!
//! The merge/constraint split matters: merge runs on *every* update and its
//! result is always stored, even when the constraint then rejects
//! propagation. This lets a node accumulate partial information across
//! updates and only propagate once its constraint is satisfied.

use smallvec::SmallVec;

use crate::func::{ConstraintFn, MergeFn};
use crate::graph::edge::EdgeId;

/// A value cell in the graph.
///
/// Nodes are owned by their [`Graph`](crate::graph::Graph) and addressed by
/// name; they reference the edges they feed by [`EdgeId`]. Created once via
/// [`Graph::binding`](crate::graph::Graph::binding) and never removed.
pub struct Node<V> {
    /// Unique name within the owning graph.
    pub(crate) name: String,

    /// The most recent merged value.
    pub(crate) value: V,

    /// Gates whether updates propagate to attached edges.
    pub(crate) constraint: ConstraintFn<V>,

    /// Folds an incoming value into the stored one.
    pub(crate) merge: MergeFn<V>,

    /// Edges for which this node is an input, in attachment order.
    pub(crate) edges: SmallVec<[EdgeId; 4]>,

    /// Emit diagnostic events for this node's propagation attempts.
    pub(crate) debug: bool,
}

impl<V> Node<V>
where
    V: Clone,
{
    /// The node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current stored (merged) value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Number of edges attached to this node as an input.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Snapshot handed to this node's constraint and merge callbacks.
    pub(crate) fn meta(&self) -> NodeMeta<V> {
        NodeMeta {
            name: self.name.clone(),
            value: self.value.clone(),
            debug: self.debug,
        }
    }
}

/// Metadata snapshot of a node, passed to its constraint and merge
/// callbacks for introspection.
#[derive(Debug, Clone)]
pub struct NodeMeta<V> {
    /// Name of the node being updated.
    pub name: String,
    /// The node's current stored value. For a merge callback this is the
    /// value *before* the merge; for a constraint it equals the merged
    /// value under evaluation.
    pub value: V,
    /// Whether diagnostics are enabled for this node.
    pub debug: bool,
}

/// Per-node configuration accepted by
/// [`Graph::binding`](crate::graph::Graph::binding).
///
/// Only the initial value is required; constraint defaults to always-true,
/// merge defaults to replacement, and the debug flag defaults to the
/// graph-wide setting.
pub struct NodeConfig<V> {
    pub(crate) value: V,
    pub(crate) constraint: Option<ConstraintFn<V>>,
    pub(crate) merge: Option<MergeFn<V>>,
    pub(crate) debug: Option<bool>,
}

impl<V> NodeConfig<V>
where
    V: Send + 'static,
{
    /// Configuration for a node with the given initial value and defaults
    /// everywhere else.
    pub fn new(value: V) -> Self {
        Self {
            value,
            constraint: None,
            merge: None,
            debug: None,
        }
    }

    /// Gate propagation on the given predicate over the merged value.
    pub fn constraint<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(V, NodeMeta<V>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<bool>> + Send + 'static,
    {
        self.constraint = Some(crate::func::constraint(f));
        self
    }

    /// Fold incoming values with the given merge function instead of
    /// replacing the stored value.
    pub fn merge<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(V, NodeMeta<V>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<V>> + Send + 'static,
    {
        self.merge = Some(crate::func::merge(f));
        self
    }

    /// Override the graph-wide debug flag for this node.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_leave_overrides_unset() {
        let config = NodeConfig::new(0);
        assert!(config.constraint.is_none());
        assert!(config.merge.is_none());
        assert!(config.debug.is_none());
    }

    #[test]
    fn config_builder_sets_overrides() {
        let config = NodeConfig::new(0)
            .constraint(|v, _| async move { Ok(v > 0) })
            .merge(|incoming, meta| async move { Ok(incoming + meta.value) })
            .debug(true);

        assert!(config.constraint.is_some());
        assert!(config.merge.is_some());
        assert_eq!(config.debug, Some(true));
    }
}
