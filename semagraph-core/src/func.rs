//! Callback Types
//!
//! Every behavioral knob of the graph is a user-supplied async function:
//! node constraints and merges, edge guards and transforms. They all receive
//! the value(s) being propagated plus a cheap metadata snapshot of the
//! invoking node or edge, and may fail with any boxed error, which the
//! engine wraps in [`GraphError::Eval`](crate::error::GraphError).
//!
//! The type aliases below are `Arc`'d boxed-future trait objects so that the
//! engine can clone them out of the graph before awaiting. The adapter
//! functions in this module lift plain async closures into those aliases;
//! the configuration builders ([`NodeConfig`](crate::graph::NodeConfig),
//! [`EffectConfig`](crate::graph::EffectConfig), [`Rule`](crate::projection::Rule),
//! and friends) call them for you, so most host code never names these types.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::{EvalError, EvalResult};
use crate::graph::{EdgeMeta, NodeMeta};

/// Gate on a node: receives the merged value, decides whether it propagates.
pub type ConstraintFn<V> =
    Arc<dyn Fn(V, NodeMeta<V>) -> BoxFuture<'static, EvalResult<bool>> + Send + Sync>;

/// How a node folds an incoming value into its stored one. The metadata
/// snapshot carries the current stored value.
pub type MergeFn<V> =
    Arc<dyn Fn(V, NodeMeta<V>) -> BoxFuture<'static, EvalResult<V>> + Send + Sync>;

/// Gate on an edge: receives the ordered input values, decides whether the
/// transform runs.
pub type GuardFn<V> =
    Arc<dyn Fn(Vec<V>, EdgeMeta) -> BoxFuture<'static, EvalResult<bool>> + Send + Sync>;

/// How an edge computes the value it broadcasts to its outputs.
pub type TransformFn<V> =
    Arc<dyn Fn(Vec<V>, EdgeMeta) -> BoxFuture<'static, EvalResult<V>> + Send + Sync>;

/// Lift an async closure into a [`ConstraintFn`].
pub fn constraint<V, F, Fut>(f: F) -> ConstraintFn<V>
where
    F: Fn(V, NodeMeta<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<bool>> + Send + 'static,
{
    Arc::new(move |value, meta| Box::pin(f(value, meta)))
}

/// Lift an async closure into a [`MergeFn`].
pub fn merge<V, F, Fut>(f: F) -> MergeFn<V>
where
    F: Fn(V, NodeMeta<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<V>> + Send + 'static,
{
    Arc::new(move |value, meta| Box::pin(f(value, meta)))
}

/// Lift an async closure into a [`GuardFn`].
pub fn guard<V, F, Fut>(f: F) -> GuardFn<V>
where
    F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<bool>> + Send + 'static,
{
    Arc::new(move |values, meta| Box::pin(f(values, meta)))
}

/// Lift an async closure into a [`TransformFn`].
pub fn transform<V, F, Fut>(f: F) -> TransformFn<V>
where
    F: Fn(Vec<V>, EdgeMeta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<V>> + Send + 'static,
{
    Arc::new(move |values, meta| Box::pin(f(values, meta)))
}

/// Default node constraint: always propagate.
pub(crate) fn default_constraint<V>() -> ConstraintFn<V>
where
    V: Send + 'static,
{
    constraint(|_, _| async { Ok(true) })
}

/// Default node merge: replace the stored value with the incoming one.
pub(crate) fn default_merge<V>() -> MergeFn<V>
where
    V: Send + 'static,
{
    merge(|incoming, _| async move { Ok(incoming) })
}

/// Default edge guard: always pass.
pub(crate) fn default_guard<V>() -> GuardFn<V>
where
    V: Send + 'static,
{
    guard(|_, _| async { Ok(true) })
}

/// Default edge transform: identity over a single input value.
///
/// With more than one input there is no typed value to forward, so the
/// default fails at evaluation time; multi-input edges must supply an
/// explicit transform.
pub(crate) fn default_transform<V>() -> TransformFn<V>
where
    V: Send + 'static,
{
    transform(|mut values: Vec<V>, _| async move {
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Err(EvalError::from(format!(
                "default transform requires exactly one input, got {}",
                values.len()
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_meta() -> EdgeMeta {
        EdgeMeta {
            from: vec!["a".into()],
            to: Vec::new(),
            debug: false,
        }
    }

    #[tokio::test]
    async fn default_guard_and_constraint_pass() {
        let g = default_guard::<i32>();
        assert!(g(vec![1], edge_meta()).await.unwrap());

        let c = default_constraint::<i32>();
        let meta = NodeMeta {
            name: "a".into(),
            value: 1,
            debug: false,
        };
        assert!(c(1, meta).await.unwrap());
    }

    #[tokio::test]
    async fn default_merge_replaces() {
        let m = default_merge::<i32>();
        let meta = NodeMeta {
            name: "a".into(),
            value: 1,
            debug: false,
        };
        assert_eq!(m(9, meta).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn default_transform_forwards_single_input() {
        let t = default_transform::<i32>();
        assert_eq!(t(vec![7], edge_meta()).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn default_transform_rejects_multiple_inputs() {
        let t = default_transform::<i32>();
        let err = t(vec![1, 2], edge_meta()).await.unwrap_err();
        assert!(err.to_string().contains("exactly one input"));
    }
}
