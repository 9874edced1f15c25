use rulechain::{DecisionBookBuilder, Fact, FactMap, RuleState, Value};

fn main() {
    let book = DecisionBookBuilder::<Value, &'static str>::new()
        .decision("hard_deny", |d| {
            d.when(|f| f.get_as::<bool>("user.banned").unwrap_or(false))
                .then(|_, r| {
                    r.set("deny");
                    RuleState::Break
                })
        })
        .decision("restricted_region", |d| {
            d.when(|f| f.get_as::<&str>("request.region") == Ok("restricted"))
                .then(|_, r| {
                    r.set("deny");
                    RuleState::Break
                })
        })
        .decision("can_proceed", |d| {
            d.try_when(|f| {
                let age: i64 = f.get_as("user.age")?;
                let status: &str = f.get_as("user.status")?;
                Ok(age >= 18 && status == "active")
            })
            .then(|_, r| {
                r.set("proceed");
                RuleState::Next
            })
        })
        .with_default_result("review")
        .build()
        .expect("failed to build decision book");

    let facts = FactMap::new()
        .with(Fact::new("user.age", Value::Int(25)))
        .with(Fact::new("user.status", Value::from("active")))
        .with(Fact::new("user.banned", Value::Bool(false)))
        .with(Fact::new("request.region", Value::from("us-east")));

    let (result, trace) = book
        .evaluate_traced(&facts)
        .expect("evaluation failed");

    println!("Result: {result}");
    println!("{trace}");
    println!();
    println!("Evaluation order: {:?}", trace.evaluated());
    println!("Decisions that fired: {:?}", trace.fired());
    println!("Duration: {:?}", trace.duration());
}
