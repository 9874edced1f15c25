use std::time::Instant;

use crate::types::{CompiledDecision, EvalError, FactMap, ResultHolder, RunTrace};

/// Where actions write their result: one holder per decision for plain chain
/// runs, or a single holder shared by every decision of a book.
pub(crate) enum Holders<'a, R> {
    PerDecision(&'a mut [ResultHolder<R>]),
    Shared(&'a mut ResultHolder<R>),
}

impl<R> Holders<'_, R> {
    fn slot(&mut self, idx: usize) -> &mut ResultHolder<R> {
        match self {
            Holders::PerDecision(holders) => &mut holders[idx],
            Holders::Shared(holder) => holder,
        }
    }
}

/// Walk the chain starting at `head`.
///
/// Each visited decision sees its own facts, overlaid with `shared` when given.
/// The walk is iterative; since links are acyclic every decision is visited at
/// most once.
pub(crate) fn run_chain<T: Clone, R>(
    decisions: &[CompiledDecision<T, R>],
    head: usize,
    shared: Option<&FactMap<T>>,
    mut holders: Holders<'_, R>,
    deadline: Option<Instant>,
) -> Result<RunTrace, EvalError> {
    if head >= decisions.len() {
        return Err(EvalError::UnknownDecision { index: head });
    }

    let start = Instant::now();
    let mut evaluated = Vec::new();
    let mut fired = Vec::new();
    let mut halted_by = None;
    let mut cursor = Some(head);

    while let Some(idx) = cursor {
        let decision = &decisions[idx];
        debug_assert!(evaluated.len() < decisions.len(), "chain walk revisited a decision");

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::debug!(decision = %decision.name, "deadline exceeded");
            return Err(EvalError::DeadlineExceeded {
                decision: decision.name.clone(),
            });
        }

        let merged;
        let facts = match shared {
            Some(shared) if decision.facts.is_empty() => shared,
            Some(shared) if !shared.is_empty() => {
                merged = decision.facts.merged(shared);
                &merged
            }
            _ => &decision.facts,
        };

        evaluated.push(decision.name.clone());
        let matched = (decision.predicate)(facts).map_err(|source| {
            tracing::debug!(decision = %decision.name, error = %source, "predicate failed");
            EvalError::Predicate {
                decision: decision.name.clone(),
                source,
            }
        })?;
        tracing::trace!(decision = %decision.name, matched, "predicate evaluated");

        if matched {
            let state = (decision.action)(facts, holders.slot(idx)).map_err(|source| {
                tracing::debug!(decision = %decision.name, error = %source, "action failed");
                EvalError::Action {
                    decision: decision.name.clone(),
                    source,
                }
            })?;
            fired.push(decision.name.clone());
            tracing::debug!(decision = %decision.name, %state, "action fired");

            if state.is_break() {
                halted_by = Some(decision.name.clone());
                break;
            }
        }

        cursor = decision.next;
    }

    Ok(RunTrace::new(evaluated, fired, halted_by, start.elapsed()))
}
