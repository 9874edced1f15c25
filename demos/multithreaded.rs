use std::sync::Arc;
use std::thread;

use rulechain::{DecisionBookBuilder, Fact, FactMap, RuleState, Value};

fn main() {
    let book = Arc::new(
        DecisionBookBuilder::<Value, &'static str>::new()
            .decision("underage", |d| {
                d.when(|f| f.get_as::<i64>("user.age").is_ok_and(|age| age < 18))
                    .then(|_, r| {
                        r.set("denied");
                        RuleState::Break
                    })
            })
            .decision("active", |d| {
                d.when(|f| f.get_as::<&str>("user.status") == Ok("active"))
                    .then(|_, r| {
                        r.set("allowed");
                        RuleState::Break
                    })
            })
            .with_default_result("review")
            .build()
            .expect("failed to build decision book"),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let facts = FactMap::new()
                    .with(Fact::new("user.age", Value::Int(16 + i64::from(i))))
                    .with(Fact::new("user.status", Value::from("active")));

                let result = book.evaluate(&facts);
                println!("Thread {i}: {result:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
