use std::fmt;

/// Control signal returned by a decision's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub enum RuleState {
    /// Continue with the next decision in the chain, if any.
    Next,
    /// Stop the chain after this decision.
    Break,
}

impl RuleState {
    #[must_use]
    pub fn is_break(self) -> bool {
        self == RuleState::Break
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleState::Next => f.write_str("NEXT"),
            RuleState::Break => f.write_str("BREAK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(RuleState::Next.to_string(), "NEXT");
        assert_eq!(RuleState::Break.to_string(), "BREAK");
    }

    #[test]
    fn is_break() {
        assert!(RuleState::Break.is_break());
        assert!(!RuleState::Next.is_break());
    }
}
