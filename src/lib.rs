//! Declarative decision chains evaluated against named facts.
//!
//! A [`Decision`] pairs a predicate over a [`FactMap`] with an action that may
//! write a [`ResultHolder`] and returns a [`RuleState`]: `Next` hands control
//! to the next decision, `Break` stops the chain. Decisions are linked into a
//! [`Chain`] through a [`ChainBuilder`], or appended in order to a
//! [`DecisionBook`], which adds a shared result and a default fallback.

mod compile;
mod error;
mod evaluate;
mod types;

pub use error::RuleChainError;
pub use types::{
    BoxError, Chain, ChainBuilder, ChainError, ChainRun, Decision, DecisionBook,
    DecisionBookBuilder, DecisionId, EvalError, Fact, FactError, FactMap, ResultHolder, RuleState,
    RunTrace, Value, ValueTypeError,
};
