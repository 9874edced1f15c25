use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::decision::{Action, Decision, Predicate};
use super::error::{ChainError, EvalError};
use super::fact_map::FactMap;
use super::result_holder::ResultHolder;
use super::run_trace::{ChainRun, RunTrace};
use crate::evaluate::{run_chain, Holders};

static NEXT_CHAIN: AtomicU64 = AtomicU64::new(0);

/// Handle to a decision inside a [`ChainBuilder`] and the [`Chain`] compiled from it.
///
/// An id only resolves in the builder that issued it (and its compiled chain);
/// anywhere else it is reported as an unknown decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecisionId {
    pub(crate) chain: u64,
    pub(crate) index: usize,
}

impl DecisionId {
    /// Position of the decision in the chain arena (insertion order).
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Builder for a [`Chain`] of decisions.
///
/// Decisions live in an arena and are addressed by [`DecisionId`]. Links are
/// wired with [`set_next_rule`](Self::set_next_rule), which rejects any link
/// that would make the chain cyclic.
///
/// # Example
///
/// ```
/// use rulechain::{ChainBuilder, Fact, RuleState};
///
/// let mut builder = ChainBuilder::<&str, bool>::new();
/// let gate = builder.decision("gate", |d| {
///     d.given([Fact::new("hello", "world")])
///         .when(|_| false)
///         .then_flow(|_| RuleState::Next)
/// });
/// let approve = builder.decision("approve", |d| {
///     d.when(|_| true).then(|_, result| {
///         result.set(true);
///         RuleState::Break
///     })
/// });
/// builder.set_next_rule(gate, approve).unwrap();
///
/// let chain = builder.compile().unwrap();
/// let run = chain.run(gate).unwrap();
/// assert_eq!(run.result(approve), Some(&true));
/// ```
pub struct ChainBuilder<T, R> {
    id: u64,
    decisions: Vec<Decision<T, R>>,
    links: Vec<Option<usize>>,
}

impl<T, R> Default for ChainBuilder<T, R> {
    fn default() -> Self {
        Self {
            id: NEXT_CHAIN.fetch_add(1, Ordering::Relaxed),
            decisions: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl<T, R> ChainBuilder<T, R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a decision. The closure configures it with `given`, `when` and `then`.
    pub fn decision(
        &mut self,
        name: impl Into<String>,
        f: impl FnOnce(Decision<T, R>) -> Decision<T, R>,
    ) -> DecisionId {
        self.add(f(Decision::new(name)))
    }

    /// Add an already configured decision.
    pub fn add(&mut self, decision: Decision<T, R>) -> DecisionId {
        self.decisions.push(decision);
        self.links.push(None);
        DecisionId {
            chain: self.id,
            index: self.decisions.len() - 1,
        }
    }

    /// Make `to` run after `from`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if either id is unknown, `from == to`, `from`
    /// already has a next rule, or the link would close a cycle.
    pub fn set_next_rule(
        &mut self,
        from: DecisionId,
        to: DecisionId,
    ) -> Result<&mut Self, ChainError> {
        crate::compile::check_link(&self.decisions, &self.links, self.id, from, to)?;
        self.links[from.index] = Some(to.index);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Validate the decisions and freeze them into a [`Chain`].
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if a decision is missing its predicate or action,
    /// or two decisions share a name.
    pub fn compile(self) -> Result<Chain<T, R>, ChainError> {
        crate::compile::compile(self.id, self.decisions, self.links)
    }
}

impl<T, R> fmt::Debug for ChainBuilder<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("id", &self.id)
            .field("decisions", &self.decisions)
            .field("links", &self.links)
            .finish()
    }
}

pub(crate) struct CompiledDecision<T, R> {
    pub(crate) name: String,
    pub(crate) facts: FactMap<T>,
    pub(crate) predicate: Predicate<T>,
    pub(crate) action: Action<T, R>,
    pub(crate) next: Option<usize>,
}

/// A compiled, immutable chain of decisions.
///
/// Every run starts with fresh result holders, so a `Chain` can be run any
/// number of times and shared across threads behind an `Arc`.
pub struct Chain<T, R> {
    pub(crate) id: u64,
    pub(crate) decisions: Vec<CompiledDecision<T, R>>,
}

impl<T, R> Chain<T, R> {
    fn decision_id(&self, index: usize) -> DecisionId {
        DecisionId {
            chain: self.id,
            index,
        }
    }

    /// Arena slot of `id`, if it was issued for this chain.
    fn slot(&self, id: DecisionId) -> Option<usize> {
        (id.chain == self.id && id.index < self.decisions.len()).then_some(id.index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    #[must_use]
    pub fn name(&self, id: DecisionId) -> Option<&str> {
        self.slot(id).map(|idx| self.decisions[idx].name.as_str())
    }

    /// Look up a decision by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<DecisionId> {
        self.decisions
            .iter()
            .position(|d| d.name == name)
            .map(|idx| self.decision_id(idx))
    }

    #[must_use]
    pub fn next_of(&self, id: DecisionId) -> Option<DecisionId> {
        let idx = self.slot(id)?;
        self.decisions[idx].next.map(|next| self.decision_id(next))
    }

    /// Decision names reachable from `head`, in the order a run would visit them
    /// if no decision returned `Break`.
    #[must_use]
    pub fn path_from(&self, head: DecisionId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut cursor = self.slot(head);
        while let Some(idx) = cursor {
            let decision = &self.decisions[idx];
            path.push(decision.name.as_str());
            cursor = decision.next;
        }
        path
    }

    /// Decisions that no other decision links to.
    #[must_use]
    pub fn heads(&self) -> Vec<DecisionId> {
        let mut linked = vec![false; self.decisions.len()];
        for next in self.decisions.iter().filter_map(|d| d.next) {
            linked[next] = true;
        }
        (0..self.decisions.len())
            .filter(|&idx| !linked[idx])
            .map(|idx| self.decision_id(idx))
            .collect()
    }
}

impl<T: Clone, R> Chain<T, R> {
    /// Run the chain from `head`. Each decision sees the facts it was given.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if `head` is not part of this chain or a predicate
    /// or action fails. No partial result is returned.
    pub fn run(&self, head: DecisionId) -> Result<ChainRun<R>, EvalError> {
        self.run_per_decision(head, None, None)
    }

    /// Run the chain from `head` with extra facts visible to every decision.
    /// The supplied facts win over a decision's own facts of the same name.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_with(&self, head: DecisionId, facts: &FactMap<T>) -> Result<ChainRun<R>, EvalError> {
        self.run_per_decision(head, Some(facts), None)
    }

    /// Like [`run_with`](Self::run_with), but gives up with
    /// [`EvalError::DeadlineExceeded`] once `deadline` has passed.
    ///
    /// The deadline is checked before each decision; a predicate or action
    /// that is already running is not interrupted.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_with_deadline(
        &self,
        head: DecisionId,
        facts: &FactMap<T>,
        deadline: Instant,
    ) -> Result<ChainRun<R>, EvalError> {
        self.run_per_decision(head, Some(facts), Some(deadline))
    }

    fn run_per_decision(
        &self,
        head: DecisionId,
        facts: Option<&FactMap<T>>,
        deadline: Option<Instant>,
    ) -> Result<ChainRun<R>, EvalError> {
        let head = self.resolve_head(head)?;
        let mut holders: Vec<ResultHolder<R>> =
            (0..self.decisions.len()).map(|_| ResultHolder::new()).collect();
        let trace = run_chain(
            &self.decisions,
            head,
            facts,
            Holders::PerDecision(&mut holders),
            deadline,
        )?;
        Ok(ChainRun::new(self.id, holders, trace))
    }

    fn resolve_head(&self, head: DecisionId) -> Result<usize, EvalError> {
        self.slot(head)
            .ok_or(EvalError::UnknownDecision { index: head.index })
    }

    /// Run with a single result holder shared by every decision.
    pub(crate) fn run_shared(
        &self,
        head: DecisionId,
        facts: &FactMap<T>,
        holder: &mut ResultHolder<R>,
        deadline: Option<Instant>,
    ) -> Result<RunTrace, EvalError> {
        run_chain(
            &self.decisions,
            self.resolve_head(head)?,
            Some(facts),
            Holders::Shared(holder),
            deadline,
        )
    }
}

impl<T, R> fmt::Debug for Chain<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.decisions
                    .iter()
                    .map(|d| (&d.name, d.next.and_then(|n| self.decisions.get(n)).map(|n| &n.name))),
            )
            .finish()
    }
}

impl<T, R> fmt::Display for Chain<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chain({} decisions, {} links)",
            self.decisions.len(),
            self.decisions.iter().filter(|d| d.next.is_some()).count(),
        )
    }
}
