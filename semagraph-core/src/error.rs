//! Error Types
//!
//! Errors fall into two families, mirroring the two phases of a graph's life:
//!
//! - Setup errors (`DuplicateNode`, `NodeNotFound`, `EmptyInputs`) are raised
//!   synchronously while wiring the graph and abort the setup step before any
//!   partial mutation is applied.
//!
//! - Evaluation errors (`Eval`) wrap a failure from a user-supplied merge,
//!   constraint, guard, or transform callback during a propagation sweep.
//!   The sweep aborts at the point of failure; merges already applied to
//!   nodes visited earlier in the sweep remain applied. The engine performs
//!   no rollback and no retries.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Boxed error type returned by user-supplied callbacks.
pub type EvalError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for user-supplied callbacks.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Which user-supplied callback failed during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStage {
    /// A node's constraint predicate.
    Constraint,
    /// A node's merge function.
    Merge,
    /// An edge's guard predicate.
    Guard,
    /// An edge's transform function.
    Transform,
}

impl fmt::Display for EvalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvalStage::Constraint => "constraint",
            EvalStage::Merge => "merge",
            EvalStage::Guard => "guard",
            EvalStage::Transform => "transform",
        };
        f.write_str(name)
    }
}

/// Errors produced by graph setup and propagation.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A node with this name is already bound in the graph.
    #[error("node {0:?} already exists in this graph")]
    DuplicateNode(String),

    /// No node with this name is bound in the graph.
    #[error("no node named {0:?}")]
    NodeNotFound(String),

    /// An edge id from another graph (or a stale one) was passed in.
    #[error("no edge #{0} in this graph")]
    EdgeNotFound(usize),

    /// An edge was constructed with an empty input list.
    #[error("an edge requires at least one input node")]
    EmptyInputs,

    /// A user-supplied callback failed during a propagation sweep.
    #[error("{stage} failed at {target:?}: {source}")]
    Eval {
        stage: EvalStage,
        /// Node name or edge input-list description where the failure occurred.
        target: String,
        source: EvalError,
    },
}

impl GraphError {
    /// Wrap a callback failure with its stage and location.
    pub fn eval(stage: EvalStage, target: impl Into<String>, source: EvalError) -> Self {
        Self::Eval {
            stage,
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_error_display_names_stage_and_target() {
        let err = GraphError::eval(EvalStage::Merge, "age", "boom".into());
        let text = err.to_string();
        assert!(text.contains("merge"));
        assert!(text.contains("age"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn setup_errors_name_the_offender() {
        assert!(GraphError::DuplicateNode("email".into())
            .to_string()
            .contains("email"));
        assert!(GraphError::NodeNotFound("missing".into())
            .to_string()
            .contains("missing"));
    }
}
