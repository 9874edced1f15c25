use std::fmt;
use std::time::Instant;

use super::chain::{Chain, ChainBuilder, DecisionId};
use super::decision::Decision;
use super::error::{ChainError, EvalError};
use super::fact::Fact;
use super::fact_map::FactMap;
use super::result_holder::ResultHolder;
use super::run_trace::RunTrace;

/// Builder for a [`DecisionBook`].
///
/// Decisions run in the order they are added: each new decision becomes the
/// next rule of the one before it.
///
/// # Example
///
/// ```
/// use rulechain::{DecisionBookBuilder, Fact, RuleState, Value};
///
/// let mut book = DecisionBookBuilder::<Value, bool>::new()
///     .decision("high_score", |d| {
///         d.when(|f| f.get_as::<i64>("score").is_ok_and(|s| s >= 700))
///             .then(|_, r| {
///                 r.set(true);
///                 RuleState::Break
///             })
///     })
///     .with_default_result(false)
///     .build()
///     .unwrap();
///
/// book.given([Fact::new("score", Value::Int(640))]);
/// assert_eq!(book.run().unwrap(), &false);
/// ```
pub struct DecisionBookBuilder<T, R> {
    decisions: Vec<Decision<T, R>>,
    default_result: Option<R>,
    facts: FactMap<T>,
}

impl<T, R> Default for DecisionBookBuilder<T, R> {
    fn default() -> Self {
        Self {
            decisions: Vec::new(),
            default_result: None,
            facts: FactMap::new(),
        }
    }
}

impl<T, R> DecisionBookBuilder<T, R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decision, configured by the closure, to the end of the chain.
    #[must_use]
    pub fn decision(
        mut self,
        name: impl Into<String>,
        f: impl FnOnce(Decision<T, R>) -> Decision<T, R>,
    ) -> Self {
        self.decisions.push(f(Decision::new(name)));
        self
    }

    /// Append an already configured decision to the end of the chain.
    #[must_use]
    pub fn push(mut self, decision: Decision<T, R>) -> Self {
        self.decisions.push(decision);
        self
    }

    /// The result reported when no action sets one.
    #[must_use]
    pub fn with_default_result(mut self, result: R) -> Self {
        self.default_result = Some(result);
        self
    }

    /// Facts visible to every decision in the book.
    #[must_use]
    pub fn given(mut self, facts: impl IntoIterator<Item = Fact<T>>) -> Self {
        self.facts.extend(facts);
        self
    }

    /// Link the decisions in order and compile them.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::MissingDefaultResult`] if no default result was
    /// configured, or any error from [`ChainBuilder::compile`].
    pub fn build(self) -> Result<DecisionBook<T, R>, ChainError> {
        let default_result = self
            .default_result
            .ok_or(ChainError::MissingDefaultResult)?;

        let mut builder = ChainBuilder::new();
        let mut head = None;
        let mut tail: Option<DecisionId> = None;
        for decision in self.decisions {
            let id = builder.add(decision);
            if let Some(prev) = tail {
                builder.set_next_rule(prev, id)?;
            }
            head.get_or_insert(id);
            tail = Some(id);
        }

        Ok(DecisionBook {
            chain: builder.compile()?,
            head,
            default_result,
            facts: self.facts,
            result: None,
        })
    }
}

impl<T: Clone, R: Clone> DecisionBookBuilder<T, R> {
    /// Build the book and evaluate it once against `facts`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleChainError`](crate::RuleChainError) wrapping either the
    /// build failure or the evaluation failure.
    pub fn evaluate_once(self, facts: &FactMap<T>) -> Result<R, crate::RuleChainError> {
        let book = self.build()?;
        Ok(book.evaluate(facts)?)
    }
}

impl<T, R> fmt::Debug for DecisionBookBuilder<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionBookBuilder")
            .field("decisions", &self.decisions)
            .field("has_default_result", &self.default_result.is_some())
            .field("facts", &self.facts.names().collect::<Vec<_>>())
            .finish()
    }
}

/// An ordered chain of decisions with a guaranteed fallback result.
///
/// All decisions share one result holder per run, and see the book's facts
/// overlaid on the facts they were given individually (the book's facts win
/// on name collisions). A run that completes without any action setting the
/// holder reports the default result. A failed run reports the error, never
/// the default.
pub struct DecisionBook<T, R> {
    chain: Chain<T, R>,
    head: Option<DecisionId>,
    default_result: R,
    facts: FactMap<T>,
    result: Option<R>,
}

impl<T, R> DecisionBook<T, R> {
    /// Add facts for subsequent runs. Names already bound are overwritten.
    pub fn given(&mut self, facts: impl IntoIterator<Item = Fact<T>>) -> &mut Self {
        self.facts.extend(facts);
        self
    }

    /// Drop every fact supplied with [`given`](Self::given).
    pub fn clear_facts(&mut self) -> &mut Self {
        self.facts.clear();
        self
    }

    #[must_use]
    pub fn facts(&self) -> &FactMap<T> {
        &self.facts
    }

    /// Finalized result of the last successful [`run`](Self::run).
    #[must_use]
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn default_result(&self) -> &R {
        &self.default_result
    }

    #[must_use]
    pub fn chain(&self) -> &Chain<T, R> {
        &self.chain
    }
}

impl<T: Clone, R: Clone> DecisionBook<T, R> {
    /// Run the chain against the book's facts and store the finalized result.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a predicate or action fails. The stored result
    /// is cleared in that case.
    pub fn run(&mut self) -> Result<&R, EvalError> {
        self.result = None;
        let (result, _) = self.execute(None, None)?;
        Ok(self.result.insert(result))
    }

    /// Evaluate against the book's facts overlaid with `facts`, without
    /// touching the stored result. Safe to call from many threads at once.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a predicate or action fails.
    pub fn evaluate(&self, facts: &FactMap<T>) -> Result<R, EvalError> {
        self.execute(Some(facts), None).map(|(result, _)| result)
    }

    /// Like [`evaluate`](Self::evaluate), also returning the [`RunTrace`].
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a predicate or action fails.
    pub fn evaluate_traced(&self, facts: &FactMap<T>) -> Result<(R, RunTrace), EvalError> {
        self.execute(Some(facts), None)
    }

    /// Like [`evaluate`](Self::evaluate), but gives up with
    /// [`EvalError::DeadlineExceeded`] once `deadline` has passed.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a predicate or action fails or the deadline passes.
    pub fn evaluate_with_deadline(
        &self,
        facts: &FactMap<T>,
        deadline: Instant,
    ) -> Result<R, EvalError> {
        self.execute(Some(facts), Some(deadline)).map(|(result, _)| result)
    }

    fn execute(
        &self,
        extra: Option<&FactMap<T>>,
        deadline: Option<Instant>,
    ) -> Result<(R, RunTrace), EvalError> {
        let Some(head) = self.head else {
            tracing::debug!("decision book is empty, using default result");
            return Ok((self.default_result.clone(), RunTrace::default()));
        };

        let merged;
        let facts = match extra {
            Some(extra) if self.facts.is_empty() => extra,
            Some(extra) => {
                merged = self.facts.merged(extra);
                &merged
            }
            None => &self.facts,
        };

        let mut holder = ResultHolder::new();
        let trace = self.chain.run_shared(head, facts, &mut holder, deadline)?;
        let result = match holder.into_inner() {
            Some(result) => result,
            None => {
                tracing::debug!(
                    evaluated = trace.evaluated().len(),
                    "no decision set a result, using default"
                );
                self.default_result.clone()
            }
        };
        Ok((result, trace))
    }
}

impl<T, R> fmt::Debug for DecisionBook<T, R>
where
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionBook")
            .field("chain", &self.chain)
            .field("default_result", &self.default_result)
            .field("facts", &self.facts.names().collect::<Vec<_>>())
            .field("result", &self.result)
            .finish()
    }
}
