/// Mutable single-slot output written by decision actions.
///
/// Starts unset. "Unset" is distinct from any value of `R`, which is what lets
/// a [`DecisionBook`](super::DecisionBook) tell "nothing matched" apart from an
/// action that stored `false` or `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHolder<R> {
    value: Option<R>,
}

impl<R> Default for ResultHolder<R> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<R> ResultHolder<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the one it replaced.
    pub fn set(&mut self, value: R) -> Option<R> {
        self.value.replace(value)
    }

    #[must_use]
    pub fn get(&self) -> Option<&R> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Remove and return the value, leaving the holder unset.
    pub fn take(&mut self) -> Option<R> {
        self.value.take()
    }

    pub fn reset(&mut self) {
        self.value = None;
    }

    #[must_use]
    pub fn into_inner(self) -> Option<R> {
        self.value
    }
}
