use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rulechain::{ChainBuilder, Decision, EvalError, Fact, FactError, FactMap, RuleState};

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn hello() -> Fact<String> {
    Fact::new("hello", "world".to_owned())
}

fn goodbye() -> Fact<String> {
    Fact::new("goodbye", "world".to_owned())
}

#[test]
fn decision_is_created() {
    let decision: Decision<String, bool> = Decision::new("d");
    assert_eq!(decision.name(), "d");
    assert!(decision.facts().is_empty());
}

#[test]
fn then_sets_result_when_predicate_holds() {
    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", |d| {
        d.given([hello()]).when(|_| true).then(|_, r| {
            r.set(true);
            RuleState::Next
        })
    });
    let chain = builder.compile().unwrap();

    let run = chain.run(d1).unwrap();
    assert_eq!(run.result(d1), Some(&true));
}

#[test]
fn then_runs_once_when_predicate_holds() {
    let calls = counter();
    let seen = Arc::clone(&calls);

    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", move |d| {
        d.given([hello()]).when(|_| true).then_flow(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            RuleState::Next
        })
    });
    let chain = builder.compile().unwrap();
    let _run = chain.run(d1).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn then_does_not_run_when_predicate_fails() {
    let calls = counter();
    let seen = Arc::clone(&calls);

    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", move |d| {
        d.given([hello()]).when(|_| false).then_flow(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            RuleState::Next
        })
    });
    let chain = builder.compile().unwrap();
    let run = chain.run(d1).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(run.result(d1), None);
    assert!(run.trace().fired().is_empty());
}

#[test]
fn false_predicate_passes_control_to_next() {
    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", |d| {
        d.given([hello()])
            .when(|_| false)
            .then_flow(|_| RuleState::Break)
    });
    let d2 = builder.decision("d2", |d| {
        d.given([goodbye()]).when(|_| true).then(|_, r| {
            r.set(true);
            RuleState::Break
        })
    });
    builder.set_next_rule(d1, d2).unwrap();
    let chain = builder.compile().unwrap();

    let run = chain.run(d1).unwrap();
    assert_eq!(run.trace().evaluated(), &["d1", "d2"]);
    assert_eq!(run.trace().fired(), &["d2"]);
    assert_eq!(run.result(d2), Some(&true));
}

#[test]
fn next_passes_control_to_next() {
    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", |d| {
        d.given([hello()])
            .when(|_| true)
            .then_flow(|_| RuleState::Next)
    });
    let d2 = builder.decision("d2", |d| {
        d.given([goodbye()]).when(|_| true).then(|_, r| {
            r.set(true);
            RuleState::Break
        })
    });
    builder.set_next_rule(d1, d2).unwrap();
    let chain = builder.compile().unwrap();

    let run = chain.run(d1).unwrap();
    assert_eq!(run.trace().fired(), &["d1", "d2"]);
    assert_eq!(run.trace().halted_by(), Some("d2"));
    assert_eq!(run.result(d1), None);
    assert_eq!(run.result(d2), Some(&true));
}

#[test]
fn break_stops_the_chain() {
    let d2_predicate = counter();
    let d2_action = counter();
    let (p, a) = (Arc::clone(&d2_predicate), Arc::clone(&d2_action));

    let mut builder = ChainBuilder::<String, bool>::new();
    let d1 = builder.decision("d1", |d| {
        d.given([hello()])
            .when(|_| true)
            .then_flow(|_| RuleState::Break)
    });
    let d2 = builder.decision("d2", move |d| {
        d.given([goodbye()])
            .when(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
                true
            })
            .then(move |_, r| {
                a.fetch_add(1, Ordering::SeqCst);
                r.set(true);
                RuleState::Break
            })
    });
    builder.set_next_rule(d1, d2).unwrap();
    let chain = builder.compile().unwrap();

    let run = chain.run(d1).unwrap();
    assert_eq!(d2_predicate.load(Ordering::SeqCst), 0);
    assert_eq!(d2_action.load(Ordering::SeqCst), 0);
    assert_eq!(run.result(d2), None);
    assert_eq!(run.trace().halted_by(), Some("d1"));
}

#[test]
fn running_from_the_middle_skips_earlier_decisions() {
    let mut builder = ChainBuilder::<String, i64>::new();
    let ids: Vec<_> = (0..4_i64)
        .map(|i| {
            builder.decision(&format!("d{i}"), move |d| {
                d.when(|_| true).then(move |_, r| {
                    r.set(i);
                    RuleState::Next
                })
            })
        })
        .collect();
    for pair in ids.windows(2) {
        builder.set_next_rule(pair[0], pair[1]).unwrap();
    }
    let chain = builder.compile().unwrap();

    let run = chain.run(ids[2]).unwrap();
    assert_eq!(run.trace().evaluated(), &["d2", "d3"]);
    assert_eq!(run.result(ids[0]), None);
    assert_eq!(run.result(ids[3]), Some(&3));
}

#[test]
fn multiple_facts_are_looked_up_by_name() {
    let mut builder = ChainBuilder::<i64, bool>::new();
    let compare = builder.decision("compare", |d| {
        d.given([Fact::new("applicant1", 699), Fact::new("applicant2", 701)])
            .try_when(|f| Ok(*f.try_get("applicant1")? < 700))
            .try_then(|f, r| {
                let first: i64 = *f.try_get("applicant1")?;
                let second: i64 = *f.try_get("applicant2")?;
                r.set(second > first);
                Ok(RuleState::Break)
            })
    });
    let chain = builder.compile().unwrap();
    assert_eq!(chain.run(compare).unwrap().result(compare), Some(&true));
}

#[test]
fn predicate_failure_aborts_the_chain() {
    let downstream = counter();
    let seen = Arc::clone(&downstream);

    let mut builder = ChainBuilder::<i64, bool>::new();
    let d1 = builder.decision("needs_score", |d| {
        d.try_when(|f| Ok(*f.try_get("score")? > 600))
            .then_flow(|_| RuleState::Next)
    });
    let d2 = builder.decision("downstream", move |d| {
        d.when(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        })
        .then_flow(|_| RuleState::Next)
    });
    builder.set_next_rule(d1, d2).unwrap();
    let chain = builder.compile().unwrap();

    let err = chain.run(d1).unwrap_err();
    match &err {
        EvalError::Predicate { decision, source } => {
            assert_eq!(decision, "needs_score");
            let fact_err = source.downcast_ref::<FactError>().unwrap();
            assert_eq!(
                fact_err,
                &FactError::Missing {
                    name: "score".into()
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(downstream.load(Ordering::SeqCst), 0);
}

#[test]
fn action_failure_aborts_the_chain() {
    let mut builder = ChainBuilder::<i64, bool>::new();
    let d1 = builder.decision("explode", |d| {
        d.when(|_| true)
            .try_then(|_, r| {
                r.set(true);
                Err("ledger unavailable".into())
            })
    });
    let d2 = builder.decision("after", |d| {
        d.when(|_| true).then(|_, r| {
            r.set(false);
            RuleState::Next
        })
    });
    builder.set_next_rule(d1, d2).unwrap();
    let chain = builder.compile().unwrap();

    let err = chain.run(d1).unwrap_err();
    assert_eq!(err.decision(), Some("explode"));
    assert_eq!(
        err.to_string(),
        "action of decision 'explode' failed: ledger unavailable"
    );
}

#[test]
fn run_with_supplies_shared_facts() {
    let mut builder = ChainBuilder::<i64, i64>::new();
    let gate = builder.decision("gate", |d| {
        d.when(|f| f.contains("limit"))
            .then_flow(|_| RuleState::Next)
    });
    let cap = builder.decision("cap", |d| {
        d.given([Fact::new("requested", 500)])
            .when(|f| f.contains("limit"))
            .then(|f, r| {
                let requested = f.get("requested").copied().unwrap_or(0);
                let limit = f.get("limit").copied().unwrap_or(0);
                r.set(requested.min(limit));
                RuleState::Break
            })
    });
    builder.set_next_rule(gate, cap).unwrap();
    let chain = builder.compile().unwrap();

    // Without shared facts nothing passes the gate.
    assert_eq!(chain.run(gate).unwrap().result(cap), None);

    let facts = FactMap::new().with(Fact::new("limit", 300));
    let run = chain.run_with(gate, &facts).unwrap();
    assert_eq!(run.result(cap), Some(&300));
}
