//! The Graph Aggregate
//!
//! `Graph` owns every node and edge and drives propagation. Ownership is
//! centralized: nodes refer to edges by [`EdgeId`], edges refer to nodes by
//! name, and nothing holds a reference into anything else. This keeps the
//! many-to-many node/edge relationship cycle-free on the ownership side and
//! makes the whole graph a plain value.
//!
//! # Propagation
//!
//! `update(name, value)` merges the incoming value into the node, stores the
//! result, and then walks the graph depth-first: the node's constraint gates
//! its edges; each edge's guard gates its transform; each transform result
//! is pushed to the edge's output nodes via a recursive update. Everything
//! is strictly sequential - a node's edges in attachment order, an edge's
//! outputs in attachment order - and the outer `update` call only resolves
//! once the entire transitive sweep has completed. A failing callback aborts
//! the sweep at that point; merges applied earlier in the sweep stay applied.
//!
//! The engine does no cycle detection. Wiring a cycle is a caller error and
//! recurses until the stack (or the boxed-future heap) gives out.
//!
//! Exclusive access (`&mut self`) serializes external calls statically:
//! there is no way to overlap two updates on one graph, and no internal
//! locking is needed.

use std::fmt::Debug;

use async_recursion::async_recursion;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{EvalStage, GraphError, Result};
use crate::func;
use crate::graph::edge::{Edge, EdgeConfig, EdgeId, EffectConfig, EFFECT_SINK};
use crate::graph::node::{Node, NodeConfig};
use crate::projection::Projection;

/// A reactive value-propagation graph over values of type `V`.
///
/// Heterogeneous graphs (different logical types per node) use a tagged
/// union such as `serde_json::Value` for `V`.
///
/// # Example
///
/// ```rust,ignore
/// let mut form: Graph<String> = Graph::new();
/// form.binding("email", NodeConfig::new(String::new()))?
///     .binding("password", NodeConfig::new(String::new()))?;
///
/// form.effect(
///     &["email", "password"],
///     EffectConfig::run(|values, _| async move {
///         println!("SUBMIT: {values:?}");
///         Ok(values[0].clone())
///     })
///     .when(|values, _| async move { Ok(!values[0].is_empty() && values[1].len() >= 8) }),
/// )?;
///
/// form.update("email", "a@b.com".into()).await?;
/// form.update("password", "12345678".into()).await?; // effect fires
/// ```
pub struct Graph<V> {
    /// All nodes, keyed by name. Insertion-ordered for deterministic
    /// iteration and diagnostics.
    nodes: IndexMap<String, Node<V>>,

    /// All edges, addressed by `EdgeId`. Never shrinks.
    edges: Vec<Edge<V>>,

    /// Default debug flag inherited by nodes and edges created without an
    /// explicit override.
    debug: bool,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for Graph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("edge_count", &self.edges.len())
            .field("debug", &self.debug)
            .finish()
    }
}

impl<V> Graph<V> {
    /// An empty graph with diagnostics disabled.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            debug: false,
        }
    }

    /// An empty graph with the given graph-wide debug default.
    pub fn with_debug(debug: bool) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            debug,
        }
    }

    /// The graph-wide debug default.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Number of bound nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of constructed edges (including effects).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a node with this name is bound.
    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Names of all bound nodes, in binding order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Look up a node by name.
    pub fn get_node(&self, name: &str) -> Result<&Node<V>> {
        self.nodes
            .get(name)
            .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))
    }

    /// Look up an edge by id, if it belongs to this graph.
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge<V>> {
        self.edges.get(id.0)
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut Node<V>> {
        self.nodes
            .get_mut(name)
            .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))
    }
}

impl<V> Graph<V>
where
    V: Clone + Debug + Send + Sync + 'static,
{
    /// The current stored value of the named node.
    pub fn value(&self, name: &str) -> Result<&V> {
        Ok(self.get_node(name)?.value())
    }

    /// Bind a new node.
    ///
    /// Fails with [`GraphError::DuplicateNode`] if the name is taken,
    /// leaving the graph untouched. Returns `&mut Self` for fluent setup
    /// chaining.
    pub fn binding(&mut self, name: impl Into<String>, config: NodeConfig<V>) -> Result<&mut Self> {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }

        let node = Node {
            name: name.clone(),
            value: config.value,
            constraint: config.constraint.unwrap_or_else(func::default_constraint),
            merge: config.merge.unwrap_or_else(func::default_merge),
            edges: SmallVec::new(),
            debug: config.debug.unwrap_or(self.debug),
        };
        self.nodes.insert(name, node);
        Ok(self)
    }

    /// Construct an edge from the named inputs to the named outputs.
    ///
    /// All names are resolved before anything is mutated, so a bad name or
    /// an empty input list leaves the graph untouched. The edge is
    /// registered with each input node in order; that registration order is
    /// the order edges fire during a sweep.
    pub fn connect(
        &mut self,
        inputs: &[&str],
        outputs: &[&str],
        config: EdgeConfig<V>,
    ) -> Result<EdgeId> {
        if inputs.is_empty() {
            return Err(GraphError::EmptyInputs);
        }
        for name in inputs.iter().chain(outputs.iter()) {
            self.get_node(name)?;
        }

        let id = EdgeId(self.edges.len());
        let edge = Edge {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            guard: config.guard.unwrap_or_else(func::default_guard),
            transform: config.transform.unwrap_or_else(func::default_transform),
            debug: config.debug.unwrap_or(self.debug),
        };
        self.edges.push(edge);
        for name in inputs {
            self.node_mut(name)?.edges.push(id);
        }
        Ok(id)
    }

    /// Append the named node as an output of an existing edge.
    ///
    /// This is how projections get wired to their target: they produce
    /// output-less edges and the consumer attaches the destination.
    pub fn attach_output(&mut self, id: EdgeId, name: &str) -> Result<()> {
        self.get_node(name)?;
        let edge = self
            .edges
            .get_mut(id.0)
            .ok_or(GraphError::EdgeNotFound(id.0))?;
        edge.outputs.push(name.to_string());
        Ok(())
    }

    /// Define the named node in terms of a projection.
    ///
    /// Resolves the target, applies the projection to this graph, and
    /// attaches the target as the sole output of every edge the projection
    /// produced.
    pub fn define(&mut self, name: &str, projection: &dyn Projection<V>) -> Result<&mut Self> {
        self.get_node(name)?;
        let ids = projection.apply_to(self)?;
        for id in ids {
            self.attach_output(id, name)?;
        }
        Ok(self)
    }

    /// Define the named node in terms of several projections, each becoming
    /// one or more independent edges.
    pub fn define_all(
        &mut self,
        name: &str,
        projections: &[&dyn Projection<V>],
    ) -> Result<&mut Self> {
        for projection in projections {
            self.define(name, *projection)?;
        }
        Ok(self)
    }

    /// Register a side effect over the named input nodes.
    ///
    /// Builds a zero-output edge whose guard is the effect's `when`
    /// predicate and whose transform is its `run` action. The graph keeps
    /// no separate record of effects; they live on their input nodes like
    /// any other edge.
    pub fn effect(&mut self, inputs: &[&str], config: EffectConfig<V>) -> Result<&mut Self> {
        self.connect(
            inputs,
            &[],
            EdgeConfig {
                guard: config.when,
                transform: Some(config.run),
                debug: None,
            },
        )?;
        Ok(self)
    }

    /// Update the named node and run the full propagation sweep.
    ///
    /// The node's merge folds `value` into its stored value; the merged
    /// result is always stored (even if the constraint then rejects
    /// propagation), except when the merge itself fails, in which case the
    /// stored value is left at its prior state and the error surfaces here.
    pub async fn update(&mut self, name: &str, value: V) -> Result<()> {
        self.get_node(name)?;
        self.update_node(name.to_string(), value).await
    }

    /// Re-propagate the named node's stored value without merging.
    ///
    /// Used to re-trigger dependents after an external change. If the
    /// node's constraint no longer passes, propagation is silently
    /// suppressed. Forced propagation emits no node-level diagnostics.
    pub async fn force(&mut self, name: &str) -> Result<()> {
        self.get_node(name)?;
        self.propagate_node(name.to_string(), true).await
    }

    #[async_recursion]
    async fn update_node(&mut self, name: String, incoming: V) -> Result<()> {
        let (merge, meta) = {
            let node = self.get_node(&name)?;
            (node.merge.clone(), node.meta())
        };

        let merged = merge(incoming, meta)
            .await
            .map_err(|e| GraphError::eval(EvalStage::Merge, &name, e))?;
        self.node_mut(&name)?.value = merged;

        self.propagate_node(name, false).await
    }

    async fn propagate_node(&mut self, name: String, forced: bool) -> Result<()> {
        let (constraint, meta, edges, node_debug) = {
            let node = self.get_node(&name)?;
            (
                node.constraint.clone(),
                node.meta(),
                node.edges.clone(),
                node.debug,
            )
        };
        let value = meta.value.clone();

        let pass = constraint(value.clone(), meta)
            .await
            .map_err(|e| GraphError::eval(EvalStage::Constraint, &name, e))?;

        if pass {
            if node_debug && !forced {
                debug!(node = %name, value = ?value, "node update");
            }
            // Sequential on purpose: attachment order is the observable
            // ordering contract for fan-out.
            for id in edges {
                self.propagate_edge(id).await?;
            }
        } else if node_debug && !forced {
            debug!(node = %name, value = ?value, "no node update");
        }

        Ok(())
    }

    async fn propagate_edge(&mut self, id: EdgeId) -> Result<()> {
        let (guard, transform, meta, target) = {
            let edge = &self.edges[id.0];
            (
                edge.guard.clone(),
                edge.transform.clone(),
                edge.meta(),
                edge.describe(),
            )
        };

        // Live values at call time, not a snapshot from construction.
        let mut values = Vec::with_capacity(meta.from.len());
        for input in &meta.from {
            values.push(self.get_node(input)?.value().clone());
        }

        let to_label: Vec<&str> = if meta.to.is_empty() {
            vec![EFFECT_SINK]
        } else {
            meta.to.iter().map(String::as_str).collect()
        };

        let pass = guard(values.clone(), meta.clone())
            .await
            .map_err(|e| GraphError::eval(EvalStage::Guard, &target, e))?;
        if !pass {
            if meta.debug {
                debug!(from = ?meta.from, to = ?to_label, value = ?values, "no propagation");
            }
            return Ok(());
        }

        let output = transform(values, meta.clone())
            .await
            .map_err(|e| GraphError::eval(EvalStage::Transform, &target, e))?;

        if meta.to.is_empty() {
            // Effect edge: the transform ran for its side effect only.
            if meta.debug {
                debug!(from = ?meta.from, to = ?to_label, value = ?output, "propagate");
            }
            return Ok(());
        }

        for out in &meta.to {
            if meta.debug {
                debug!(from = ?meta.from, to = %out, value = ?output, "propagate");
            }
            self.update_node(out.clone(), output.clone()).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[test]
    fn duplicate_binding_fails_and_leaves_graph_unchanged() {
        let mut graph: Graph<i32> = Graph::new();
        graph.binding("a", NodeConfig::new(1)).unwrap();

        let err = graph.binding("a", NodeConfig::new(2)).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(name) if name == "a"));

        assert_eq!(graph.node_count(), 1);
        assert_eq!(*graph.value("a").unwrap(), 1);
    }

    #[test]
    fn connect_requires_inputs() {
        let mut graph: Graph<i32> = Graph::new();
        graph.binding("a", NodeConfig::new(0)).unwrap();

        let err = graph.connect(&[], &["a"], EdgeConfig::new()).unwrap_err();
        assert!(matches!(err, GraphError::EmptyInputs));
    }

    #[test]
    fn connect_rejects_unknown_names_without_partial_mutation() {
        let mut graph: Graph<i32> = Graph::new();
        graph.binding("a", NodeConfig::new(0)).unwrap();

        let err = graph
            .connect(&["a", "ghost"], &[], EdgeConfig::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(name) if name == "ghost"));

        // "a" must not have been registered against a half-built edge.
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.get_node("a").unwrap().edge_count(), 0);
    }

    #[test]
    fn effect_registers_on_every_input() {
        let mut graph: Graph<i32> = Graph::new();
        graph
            .binding("a", NodeConfig::new(0))
            .unwrap()
            .binding("b", NodeConfig::new(0))
            .unwrap();

        graph
            .effect(
                &["a", "b"],
                EffectConfig::run(|values, _| async move { Ok(values[0]) }),
            )
            .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_node("a").unwrap().edge_count(), 1);
        assert_eq!(graph.get_node("b").unwrap().edge_count(), 1);

        let edge = graph.get_edge(EdgeId(0)).unwrap();
        assert!(edge.is_effect());
        assert_eq!(edge.inputs(), ["a", "b"]);
    }

    #[test]
    fn update_and_force_resolve_names_first() {
        let mut graph: Graph<i32> = Graph::new();

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt.block_on(graph.update("ghost", 1)).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
        let err = rt.block_on(graph.force("ghost")).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn update_stores_merged_value() {
        let mut graph: Graph<i32> = Graph::new();
        graph
            .binding(
                "total",
                NodeConfig::new(10).merge(|incoming, meta| async move { Ok(meta.value + incoming) }),
            )
            .unwrap();

        graph.update("total", 5).await.unwrap();
        assert_eq!(*graph.value("total").unwrap(), 15);

        graph.update("total", 5).await.unwrap();
        assert_eq!(*graph.value("total").unwrap(), 20);
    }

    #[tokio::test]
    async fn merge_failure_leaves_prior_value() {
        let mut graph: Graph<i32> = Graph::new();
        graph
            .binding(
                "a",
                NodeConfig::new(1).merge(|incoming, _| async move {
                    if incoming < 0 {
                        Err("negative values are not mergeable".into())
                    } else {
                        Ok(incoming)
                    }
                }),
            )
            .unwrap();

        let err = graph.update("a", -1).await.unwrap_err();
        assert!(matches!(
            err,
            GraphError::Eval {
                stage: EvalStage::Merge,
                ..
            }
        ));
        assert_eq!(*graph.value("a").unwrap(), 1);
    }

    #[tokio::test]
    async fn constraint_gates_propagation_but_not_merge() {
        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();

        let mut graph: Graph<i32> = Graph::new();
        graph
            .binding(
                "a",
                NodeConfig::new(0).constraint(|v, _| async move { Ok(v >= 10) }),
            )
            .unwrap();
        graph
            .effect(
                &["a"],
                EffectConfig::run(move |values, _| {
                    let fired = fired_clone.clone();
                    async move {
                        fired.fetch_add(1, Ordering::SeqCst);
                        Ok(values[0])
                    }
                }),
            )
            .unwrap();

        // Below threshold: merged value stored, no propagation.
        graph.update("a", 5).await.unwrap();
        assert_eq!(*graph.value("a").unwrap(), 5);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // At threshold: propagates.
        graph.update("a", 10).await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn define_attaches_target_to_projection_edges() {
        use crate::projection::{from, Rule};

        let mut graph: Graph<i32> = Graph::new();
        graph
            .binding("base", NodeConfig::new(0))
            .unwrap()
            .binding("doubled", NodeConfig::new(0))
            .unwrap();

        graph
            .define(
                "doubled",
                &from(
                    ["base"],
                    vec![Rule::map(|values: Vec<i32>, _| async move {
                        Ok(values[0] * 2)
                    })],
                ),
            )
            .unwrap();

        graph.update("base", 21).await.unwrap();
        assert_eq!(*graph.value("doubled").unwrap(), 42);
    }
}
