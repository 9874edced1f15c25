use std::fmt;

/// An immutable, named input value for rule evaluation.
///
/// Facts with the same name are still distinct values; name uniqueness is
/// enforced when they are collected into a [`FactMap`](super::FactMap).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fact<T> {
    name: String,
    value: T,
}

impl<T> Fact<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Split the fact into its name and value.
    #[must_use]
    pub fn into_parts(self) -> (String, T) {
        (self.name, self.value)
    }

    pub(crate) fn replace_value(&mut self, value: T) -> T {
        std::mem::replace(&mut self.value, value)
    }
}

impl<T: fmt::Display> fmt::Display for Fact<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}
