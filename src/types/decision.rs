use std::fmt;

use super::error::BoxError;
use super::fact::Fact;
use super::fact_map::FactMap;
use super::result_holder::ResultHolder;
use super::rule_state::RuleState;

pub(crate) type Predicate<T> = Box<dyn Fn(&FactMap<T>) -> Result<bool, BoxError> + Send + Sync>;

pub(crate) type Action<T, R> =
    Box<dyn Fn(&FactMap<T>, &mut ResultHolder<R>) -> Result<RuleState, BoxError> + Send + Sync>;

/// A single guarded rule: input facts, a predicate ("when") and an action ("then").
///
/// Decisions are plain builders. They become executable once added to a
/// [`ChainBuilder`](super::ChainBuilder) or
/// [`DecisionBookBuilder`](super::DecisionBookBuilder) and compiled; the
/// forward link to the next decision lives in the chain, not here.
///
/// # Example
///
/// ```
/// use rulechain::{Decision, Fact, RuleState, Value};
///
/// let decision: Decision<Value, bool> = Decision::new("adult")
///     .given([Fact::new("age", Value::Int(30))])
///     .when(|f| f.get_as::<i64>("age").is_ok_and(|age| age >= 18))
///     .then(|_, result| {
///         result.set(true);
///         RuleState::Break
///     });
/// assert_eq!(decision.name(), "adult");
/// ```
pub struct Decision<T, R> {
    pub(crate) name: String,
    pub(crate) facts: FactMap<T>,
    pub(crate) predicate: Option<Predicate<T>>,
    pub(crate) action: Option<Action<T, R>>,
}

impl<T, R> Decision<T, R> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            facts: FactMap::new(),
            predicate: None,
            action: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Facts bound so far with [`given`](Self::given).
    #[must_use]
    pub fn facts(&self) -> &FactMap<T> {
        &self.facts
    }

    /// Bind input facts. Repeated calls merge into the existing facts;
    /// a fact whose name is already bound replaces the earlier value.
    #[must_use]
    pub fn given(mut self, facts: impl IntoIterator<Item = Fact<T>>) -> Self {
        self.facts.extend(facts);
        self
    }
}

impl<T: 'static, R: 'static> Decision<T, R> {
    /// Set the guard. Replaces any previous predicate.
    #[must_use]
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FactMap<T>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(move |facts: &FactMap<T>| Ok(predicate(facts))));
        self
    }

    /// Set a guard that can fail. An `Err` aborts the run with
    /// [`EvalError::Predicate`](super::EvalError::Predicate).
    #[must_use]
    pub fn try_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FactMap<T>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Set the action run when the guard holds. Replaces any previous action.
    #[must_use]
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&FactMap<T>, &mut ResultHolder<R>) -> RuleState + Send + Sync + 'static,
    {
        self.action = Some(Box::new(
            move |facts: &FactMap<T>, result: &mut ResultHolder<R>| Ok(action(facts, result)),
        ));
        self
    }

    /// Set an action that can fail. An `Err` aborts the run with
    /// [`EvalError::Action`](super::EvalError::Action).
    #[must_use]
    pub fn try_then<F>(mut self, action: F) -> Self
    where
        F: Fn(&FactMap<T>, &mut ResultHolder<R>) -> Result<RuleState, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Set an action that only steers the chain and never touches the result.
    #[must_use]
    pub fn then_flow<F>(mut self, action: F) -> Self
    where
        F: Fn(&FactMap<T>) -> RuleState + Send + Sync + 'static,
    {
        self.action = Some(Box::new(
            move |facts: &FactMap<T>, _: &mut ResultHolder<R>| Ok(action(facts)),
        ));
        self
    }
}

impl<T, R> fmt::Debug for Decision<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decision")
            .field("name", &self.name)
            .field("facts", &self.facts.names().collect::<Vec<_>>())
            .field("has_predicate", &self.predicate.is_some())
            .field("has_action", &self.action.is_some())
            .finish()
    }
}
