use std::collections::HashSet;

use crate::types::{Chain, ChainError, CompiledDecision, Decision, DecisionId};

/// Validate a prospective `from -> to` link against the links already in place.
///
/// Both ids must have been issued by the builder identified by `chain`.
/// Existing links are acyclic, so walking forward from `to` terminates; if the
/// walk reaches `from`, the new link would close a cycle.
pub(crate) fn check_link<T, R>(
    decisions: &[Decision<T, R>],
    links: &[Option<usize>],
    chain: u64,
    from: DecisionId,
    to: DecisionId,
) -> Result<(), ChainError> {
    for id in [from, to] {
        if id.chain != chain || id.index >= decisions.len() {
            return Err(ChainError::UnknownDecision { index: id.index });
        }
    }
    let (from, to) = (from.index, to.index);
    let name = |idx: usize| decisions[idx].name.clone();

    if from == to {
        return Err(ChainError::SelfReference {
            decision: name(from),
        });
    }
    if let Some(existing) = links[from] {
        return Err(ChainError::LinkExists {
            from: name(from),
            existing: name(existing),
        });
    }

    let mut path = vec![name(from), name(to)];
    let mut cursor = links[to];
    while let Some(idx) = cursor {
        path.push(name(idx));
        if idx == from {
            return Err(ChainError::CyclicChain { path });
        }
        cursor = links[idx];
    }
    Ok(())
}

pub(crate) fn compile<T, R>(
    chain: u64,
    decisions: Vec<Decision<T, R>>,
    links: Vec<Option<usize>>,
) -> Result<Chain<T, R>, ChainError> {
    check_duplicates(&decisions)?;

    let compiled = decisions
        .into_iter()
        .zip(links)
        .map(|(decision, next)| -> Result<CompiledDecision<T, R>, ChainError> {
            let predicate = decision.predicate.ok_or_else(|| ChainError::MissingPredicate {
                decision: decision.name.clone(),
            })?;
            let action = decision.action.ok_or_else(|| ChainError::MissingAction {
                decision: decision.name.clone(),
            })?;
            Ok(CompiledDecision {
                name: decision.name,
                facts: decision.facts,
                predicate,
                action,
                next,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Chain {
        id: chain,
        decisions: compiled,
    })
}

fn check_duplicates<T, R>(decisions: &[Decision<T, R>]) -> Result<(), ChainError> {
    let mut seen = HashSet::new();
    for decision in decisions {
        if !seen.insert(decision.name.as_str()) {
            return Err(ChainError::DuplicateDecision {
                name: decision.name.clone(),
            });
        }
    }
    Ok(())
}
