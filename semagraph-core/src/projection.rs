//! Projections
//!
//! A projection is a reusable, graph-independent recipe for edges: a list
//! of input node *names* plus one or more guard/transform rules. Applying
//! it to a concrete graph resolves the names against that graph's nodes
//! and materializes one output-less edge per rule.
//!
//! Projections never attach outputs themselves; that is the consumer's
//! job (normally [`Graph::define`](crate::graph::Graph::define), which
//! appends its target node to every produced edge). This split is what
//! lets one projection be reused against several graphs, or wired to
//! several unrelated target nodes.

use std::fmt::Debug;

use crate::error::Result;
use crate::func::{GuardFn, TransformFn};
use crate::graph::{EdgeConfig, EdgeId, EdgeMeta, Graph};

/// A recipe that materializes into edges when applied to a graph.
pub trait Projection<V>: Send + Sync {
    /// Resolve this projection against `graph`, returning the ids of the
    /// edges it created. Implementations must not attach outputs.
    fn apply_to(&self, graph: &mut Graph<V>) -> Result<Vec<EdgeId>>;
}

/// One guard/transform pair of a [`FromProjection`].
///
/// Both halves are optional: a missing guard always passes, a missing
/// transform forwards a single input value unchanged.
pub struct Rule<V> {
    pub(crate) guard: Option<GuardFn<V>>,
    pub(crate) transform: Option<TransformFn<V>>,
}

impl<V> Default for Rule<V> {
    fn default() -> Self {
        Self {
            guard: None,
            transform: None,
        }
    }
}

impl<V> Rule<V>
where
    V: Send + 'static,
{
    /// The identity rule: no guard, default transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule computing its output with the given transform.
    pub fn map<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<V>> + Send + 'static,
    {
        Self {
            guard: None,
            transform: Some(crate::func::transform(f)),
        }
    }

    /// Gate this rule on the given predicate over the input values.
    pub fn when<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = crate::error::EvalResult<bool>> + Send + 'static,
    {
        self.guard = Some(crate::func::guard(f));
        self
    }
}

/// The declarative "from" projection: input names plus transformation
/// rules, mirroring `define(target, from([..], rules))` host code.
pub struct FromProjection<V> {
    inputs: Vec<String>,
    rules: Vec<Rule<V>>,
}

impl<V> FromProjection<V> {
    /// A projection reading from the named inputs, one future edge per rule.
    pub fn new<I, S>(inputs: I, rules: Vec<Rule<V>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            rules,
        }
    }

    /// The input node names this projection will resolve.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Number of rules (= number of edges `apply_to` will create).
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl<V> Projection<V> for FromProjection<V>
where
    V: Clone + Debug + Send + Sync + 'static,
{
    fn apply_to(&self, graph: &mut Graph<V>) -> Result<Vec<EdgeId>> {
        let inputs: Vec<&str> = self.inputs.iter().map(String::as_str).collect();
        self.rules
            .iter()
            .map(|rule| {
                graph.connect(
                    &inputs,
                    &[],
                    EdgeConfig {
                        guard: rule.guard.clone(),
                        transform: rule.transform.clone(),
                        debug: None,
                    },
                )
            })
            .collect()
    }
}

/// Shorthand for [`FromProjection::new`].
pub fn from<V, I, S>(inputs: I, rules: Vec<Rule<V>>) -> FromProjection<V>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FromProjection::new(inputs, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::NodeConfig;

    fn graph_with(names: &[&str]) -> Graph<i32> {
        let mut graph = Graph::new();
        for name in names {
            graph.binding(*name, NodeConfig::new(0)).unwrap();
        }
        graph
    }

    #[test]
    fn apply_to_creates_one_edge_per_rule_without_outputs() {
        let mut graph = graph_with(&["a", "b"]);
        let projection = from(
            ["a", "b"],
            vec![
                Rule::map(|values: Vec<i32>, _| async move { Ok(values[0] + values[1]) }),
                Rule::map(|values: Vec<i32>, _| async move { Ok(values[0] - values[1]) }),
            ],
        );

        let ids = projection.apply_to(&mut graph).unwrap();
        assert_eq!(ids.len(), 2);
        for id in ids {
            let edge = graph.get_edge(id).unwrap();
            assert_eq!(edge.inputs(), ["a", "b"]);
            assert!(edge.outputs().is_empty());
        }
        // Both edges registered on both inputs, in rule order.
        assert_eq!(graph.get_node("a").unwrap().edge_count(), 2);
        assert_eq!(graph.get_node("b").unwrap().edge_count(), 2);
    }

    #[test]
    fn apply_to_fails_on_unresolved_name() {
        let mut graph = graph_with(&["a"]);
        let projection: FromProjection<i32> = from(["a", "missing"], vec![Rule::new()]);

        let err = projection.apply_to(&mut graph).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(name) if name == "missing"));
    }

    #[test]
    fn projection_is_reusable_across_graphs() {
        let projection = from(
            ["a"],
            vec![Rule::map(|values: Vec<i32>, _| async move {
                Ok(values[0] * 10)
            })],
        );

        let mut first = graph_with(&["a"]);
        let mut second = graph_with(&["a"]);
        assert_eq!(projection.apply_to(&mut first).unwrap().len(), 1);
        assert_eq!(projection.apply_to(&mut second).unwrap().len(), 1);
    }
}
