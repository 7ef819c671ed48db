//! Graph Edges
//!
//! An edge is a directed, guard-gated transformation from a fixed, non-empty
//! set of input nodes to zero or more output nodes. When an input node
//! propagates, the edge reads the *live* values of all its inputs, evaluates
//! its guard, and if the guard passes computes its transform once and
//! broadcasts the identical result to every output node in order.
//!
//! An edge with no output nodes is an "effect": its transform runs purely
//! for side effects and the return value is discarded.

use smallvec::SmallVec;

use crate::func::{GuardFn, TransformFn};

/// Label used in diagnostics as the destination of a zero-output edge.
pub const EFFECT_SINK: &str = "<effect>";

/// Index of an edge within its owning graph.
///
/// Edges are anonymous; ids are handed out by the graph at construction
/// and stay valid for the graph's lifetime (edges are never removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) usize);

/// A transformation link between nodes.
///
/// Input names are fixed at construction; output names may be appended
/// afterwards (this is how [`Graph::define`](crate::graph::Graph::define)
/// wires a projection's edges to their target node).
pub struct Edge<V> {
    /// Names of the nodes this edge reads from. Never empty.
    pub(crate) inputs: SmallVec<[String; 4]>,

    /// Names of the nodes this edge writes to. Empty for effect edges.
    pub(crate) outputs: SmallVec<[String; 4]>,

    /// Gates whether the transform runs.
    pub(crate) guard: GuardFn<V>,

    /// Computes the value broadcast to the outputs.
    pub(crate) transform: TransformFn<V>,

    /// Emit diagnostic events for this edge's propagation attempts.
    pub(crate) debug: bool,
}

impl<V> Edge<V> {
    /// Names of this edge's input nodes, in order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Names of this edge's output nodes, in order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Whether this is an effect edge (no outputs).
    pub fn is_effect(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Snapshot handed to this edge's guard and transform callbacks.
    pub(crate) fn meta(&self) -> EdgeMeta {
        EdgeMeta {
            from: self.inputs.to_vec(),
            to: self.outputs.to_vec(),
            debug: self.debug,
        }
    }

    /// Diagnostic description of where this edge's values come from.
    pub(crate) fn describe(&self) -> String {
        self.inputs.join(",")
    }
}

/// Metadata snapshot of an edge, passed to its guard and transform
/// callbacks for introspection.
#[derive(Debug, Clone)]
pub struct EdgeMeta {
    /// Input node names, in the order their values appear in the value
    /// vector.
    pub from: Vec<String>,
    /// Output node names, in broadcast order. Empty for effect edges.
    pub to: Vec<String>,
    /// Whether diagnostics are enabled for this edge.
    pub debug: bool,
}

/// Per-edge configuration accepted by
/// [`Graph::connect`](crate::graph::Graph::connect).
///
/// Guard defaults to always-pass, transform to identity over a single
/// input, and the debug flag to the graph-wide setting.
pub struct EdgeConfig<V> {
    pub(crate) guard: Option<GuardFn<V>>,
    pub(crate) transform: Option<TransformFn<V>>,
    pub(crate) debug: Option<bool>,
}

impl<V> Default for EdgeConfig<V> {
    fn default() -> Self {
        Self {
            guard: None,
            transform: None,
            debug: None,
        }
    }
}

impl<V> EdgeConfig<V>
where
    V: Send + 'static,
{
    /// Configuration with defaults everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate the transform on the given predicate over the input values.
    pub fn when<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<bool>> + Send + 'static,
    {
        self.guard = Some(crate::func::guard(f));
        self
    }

    /// Compute the propagated value with the given transform.
    pub fn map<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<V>> + Send + 'static,
    {
        self.transform = Some(crate::func::transform(f));
        self
    }

    /// Override the graph-wide debug flag for this edge.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }
}

/// Configuration for an effect, accepted by
/// [`Graph::effect`](crate::graph::Graph::effect): a side-effecting action
/// (`run`) and an optional gate (`when`).
pub struct EffectConfig<V> {
    pub(crate) run: TransformFn<V>,
    pub(crate) when: Option<GuardFn<V>>,
}

impl<V> EffectConfig<V>
where
    V: Send + 'static,
{
    /// Effect that runs the given action whenever its inputs propagate.
    ///
    /// The action is an ordinary transform whose return value is discarded;
    /// it must still produce a `V` (conventionally echoing one of its
    /// inputs or a unit-like value of the graph's value type).
    pub fn run<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<V>> + Send + 'static,
    {
        Self {
            run: crate::func::transform(f),
            when: None,
        }
    }

    /// Gate the action on the given predicate over the input values.
    pub fn when<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<bool>> + Send + 'static,
    {
        self.when = Some(crate::func::guard(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_sink_label_is_stable() {
        assert_eq!(EFFECT_SINK, "<effect>");
    }

    #[test]
    fn edge_config_builder_sets_overrides() {
        let config = EdgeConfig::<i32>::new()
            .when(|values, _| async move { Ok(values[0] > 0) })
            .map(|values, _| async move { Ok(values[0] * 2) })
            .debug(true);

        assert!(config.guard.is_some());
        assert!(config.transform.is_some());
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn effect_config_defaults_to_ungated() {
        let config = EffectConfig::<i32>::run(|values, _| async move { Ok(values[0]) });
        assert!(config.when.is_none());
    }
}
