use rulechain::{DecisionBookBuilder, Fact, RuleChainError, RuleState, Value};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RuleChainError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulechain=debug")),
        )
        .init();

    let mut book = DecisionBookBuilder::<Value, bool>::new()
        .decision("poor_credit", |d| {
            d.try_when(|f| Ok(f.get_as::<i64>("applicant.credit_score")? < 600))
                .then(|_, r| {
                    r.set(false);
                    RuleState::Break
                })
        })
        .decision("strong_credit", |d| {
            d.try_when(|f| Ok(f.get_as::<i64>("applicant.credit_score")? >= 720))
                .then(|_, r| {
                    r.set(true);
                    RuleState::Break
                })
        })
        .decision("cash_cushion", |d| {
            d.try_when(|f| {
                let cash: f64 = f.get_as("applicant.cash_on_hand")?;
                let amount: f64 = f.get_as("loan.amount")?;
                Ok(cash >= amount * 0.2)
            })
            .then(|_, r| {
                r.set(true);
                RuleState::Next
            })
        })
        .given([Fact::new("loan.amount", Value::Float(250_000.0))])
        .with_default_result(false)
        .build()?;

    let applicants = [
        ("alex", 580, 90_000.0),
        ("sam", 750, 1_000.0),
        ("jo", 660, 60_000.0),
        ("kim", 660, 20_000.0),
    ];

    for (name, score, cash) in applicants {
        book.given([
            Fact::new("applicant.credit_score", Value::Int(score)),
            Fact::new("applicant.cash_on_hand", Value::Float(cash)),
        ]);
        let approved = book.run()?;
        println!("{name}: approved = {approved}");
    }

    Ok(())
}
