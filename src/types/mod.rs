mod book;
mod chain;
mod decision;
mod error;
mod fact;
mod fact_map;
mod result_holder;
mod rule_state;
mod run_trace;
mod value;

pub use book::{DecisionBook, DecisionBookBuilder};
pub use chain::{Chain, ChainBuilder, DecisionId};
pub(crate) use chain::CompiledDecision;
pub use decision::Decision;
pub use error::{BoxError, ChainError, EvalError, FactError};
pub use fact::Fact;
pub use fact_map::FactMap;
pub use result_holder::ResultHolder;
pub use rule_state::RuleState;
pub use run_trace::{ChainRun, RunTrace};
pub use value::{Value, ValueTypeError};
