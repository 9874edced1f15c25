use thiserror::Error;

/// Error type accepted from fallible predicates and actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Chain configuration errors. Raised while building, never during a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("decision id {index} does not belong to this chain")]
    UnknownDecision { index: usize },

    #[error("decision '{decision}' cannot be its own next rule")]
    SelfReference { decision: String },

    #[error("decision '{from}' is already linked to '{existing}'")]
    LinkExists { from: String, existing: String },

    #[error("cyclic chain detected: {}", path.join(" -> "))]
    CyclicChain { path: Vec<String> },

    #[error("duplicate decision name '{name}'")]
    DuplicateDecision { name: String },

    #[error("decision '{decision}' has no predicate; call .when() before compiling")]
    MissingPredicate { decision: String },

    #[error("decision '{decision}' has no action; call .then() before compiling")]
    MissingAction { decision: String },

    #[error("decision book has no default result; call .with_default_result()")]
    MissingDefaultResult,
}

/// A predicate or action failed while a chain was running.
///
/// The run stops at the failing decision and no result is produced.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("predicate of decision '{decision}' failed: {source}")]
    Predicate {
        decision: String,
        #[source]
        source: BoxError,
    },

    #[error("action of decision '{decision}' failed: {source}")]
    Action {
        decision: String,
        #[source]
        source: BoxError,
    },

    #[error("cannot run from decision id {index}: not part of this chain")]
    UnknownDecision { index: usize },

    #[error("deadline exceeded before decision '{decision}'")]
    DeadlineExceeded { decision: String },
}

impl EvalError {
    /// Name of the decision where the run stopped, if known.
    #[must_use]
    pub fn decision(&self) -> Option<&str> {
        match self {
            EvalError::Predicate { decision, .. }
            | EvalError::Action { decision, .. }
            | EvalError::DeadlineExceeded { decision } => Some(decision),
            EvalError::UnknownDecision { .. } => None,
        }
    }
}

/// Failed fact lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactError {
    #[error("no fact named '{name}'")]
    Missing { name: String },

    #[error("fact '{name}' is not of type {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}
