use std::fmt;
use std::time::Duration;

use super::chain::DecisionId;
use super::result_holder::ResultHolder;

/// What happened during one run of a chain.
///
/// Lists the decisions whose predicate was evaluated, the decisions whose
/// action fired (both in visiting order), the decision that stopped the chain
/// with [`RuleState::Break`](super::RuleState::Break), and the wall-clock
/// duration of the run.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RunTrace {
    evaluated: Vec<String>,
    fired: Vec<String>,
    halted_by: Option<String>,
    duration: Duration,
}

impl RunTrace {
    pub(crate) fn new(
        evaluated: Vec<String>,
        fired: Vec<String>,
        halted_by: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            evaluated,
            fired,
            halted_by,
            duration,
        }
    }

    /// Names of decisions whose predicate ran, in order.
    #[must_use]
    pub fn evaluated(&self) -> &[String] {
        &self.evaluated
    }

    /// Names of decisions whose action ran, in order.
    #[must_use]
    pub fn fired(&self) -> &[String] {
        &self.fired
    }

    /// The decision whose action returned `Break`, if the chain was cut short.
    #[must_use]
    pub fn halted_by(&self) -> Option<&str> {
        self.halted_by.as_deref()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for RunTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluated: [{}]", self.evaluated.join(", "))?;
        write!(f, ", fired: [{}]", self.fired.join(", "))?;
        match &self.halted_by {
            Some(name) => write!(f, ", halted by: {name}")?,
            None => write!(f, ", ran to end")?,
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}

/// Outcome of [`Chain::run`](super::Chain::run): one result holder per
/// decision plus the [`RunTrace`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ChainRun<R> {
    chain: u64,
    holders: Vec<ResultHolder<R>>,
    trace: RunTrace,
}

impl<R> ChainRun<R> {
    pub(crate) fn new(chain: u64, holders: Vec<ResultHolder<R>>, trace: RunTrace) -> Self {
        Self {
            chain,
            holders,
            trace,
        }
    }

    fn slot(&self, id: DecisionId) -> Option<usize> {
        (id.chain == self.chain).then_some(id.index)
    }

    /// The value a decision's action stored, or `None` if it never did
    /// (including when the decision was never reached).
    #[must_use]
    pub fn result(&self, id: DecisionId) -> Option<&R> {
        self.holder(id).and_then(ResultHolder::get)
    }

    #[must_use]
    pub fn holder(&self, id: DecisionId) -> Option<&ResultHolder<R>> {
        self.holders.get(self.slot(id)?)
    }

    pub fn trace(&self) -> &RunTrace {
        &self.trace
    }

    /// Consume the run, keeping only the value stored for `id`.
    #[must_use]
    pub fn into_result(mut self, id: DecisionId) -> Option<R> {
        let idx = self.slot(id)?;
        self.holders.get_mut(idx).and_then(ResultHolder::take)
    }
}
