use thiserror::Error;

use crate::{ChainError, EvalError};

/// Unified error type covering chain configuration and evaluation.
///
/// Returned by one-shot helpers like
/// [`DecisionBookBuilder::evaluate_once()`](crate::DecisionBookBuilder::evaluate_once).
#[derive(Debug, Error)]
pub enum RuleChainError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
