use std::collections::HashMap;

use super::error::FactError;
use super::fact::Fact;

/// Name-indexed, insertion-ordered collection of [`Fact`]s.
///
/// This is the read-only view handed to every predicate and action. Names are
/// unique: inserting a fact under an existing name replaces the stored value
/// (last write wins) while the entry keeps the position of its first insertion,
/// so iteration order stays deterministic.
#[derive(Debug, Clone)]
pub struct FactMap<T> {
    facts: Vec<Fact<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for FactMap<T> {
    fn default() -> Self {
        Self {
            facts: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> FactMap<T> {
    /// Create an empty fact map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact, consuming and returning the map.
    #[must_use]
    pub fn with(mut self, fact: Fact<T>) -> Self {
        self.insert(fact);
        self
    }

    /// Insert a fact. Returns the value previously bound to the same name, if any.
    pub fn insert(&mut self, fact: Fact<T>) -> Option<T> {
        if let Some(&idx) = self.index.get(fact.name()) {
            let (_, value) = fact.into_parts();
            return Some(self.facts[idx].replace_value(value));
        }
        self.index.insert(fact.name().to_owned(), self.facts.len());
        self.facts.push(fact);
        None
    }

    /// Look up a value by fact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.fact(name).map(Fact::value)
    }

    /// Look up the whole fact by name.
    #[must_use]
    pub fn fact(&self, name: &str) -> Option<&Fact<T>> {
        self.index.get(name).map(|&idx| &self.facts[idx])
    }

    /// Like [`get`](Self::get), but reports a missing fact as [`FactError::Missing`].
    ///
    /// # Errors
    ///
    /// Returns [`FactError::Missing`] if no fact is bound to `name`.
    pub fn try_get(&self, name: &str) -> Result<&T, FactError> {
        self.get(name).ok_or_else(|| FactError::Missing {
            name: name.to_owned(),
        })
    }

    /// Look up a fact and convert it to `U`.
    ///
    /// ```
    /// use rulechain::{Fact, FactMap, Value};
    ///
    /// let facts: FactMap<Value> = [Fact::new("score", Value::Int(700))].into_iter().collect();
    /// assert_eq!(facts.get_as::<i64>("score").unwrap(), 700);
    /// assert!(facts.get_as::<bool>("score").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FactError::Missing`] if no fact is bound to `name`, or
    /// [`FactError::TypeMismatch`] if the conversion to `U` fails.
    pub fn get_as<'a, U>(&'a self, name: &str) -> Result<U, FactError>
    where
        U: TryFrom<&'a T>,
    {
        let value = self.try_get(name)?;
        U::try_from(value).map_err(|_| FactError::TypeMismatch {
            name: name.to_owned(),
            expected: std::any::type_name::<U>(),
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate over facts in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fact<T>> {
        self.facts.iter()
    }

    /// Fact names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.facts.iter().map(Fact::name)
    }

    pub(crate) fn clear(&mut self) {
        self.facts.clear();
        self.index.clear();
    }
}

impl<T: Clone> FactMap<T> {
    /// A copy of this map with every fact of `overlay` inserted on top.
    /// Facts in `overlay` win on name collisions.
    #[must_use]
    pub fn merged(&self, overlay: &FactMap<T>) -> FactMap<T> {
        let mut out = self.clone();
        out.extend(overlay.iter().cloned());
        out
    }
}

impl<T> Extend<Fact<T>> for FactMap<T> {
    fn extend<I: IntoIterator<Item = Fact<T>>>(&mut self, iter: I) {
        for fact in iter {
            self.insert(fact);
        }
    }
}

impl<T> FromIterator<Fact<T>> for FactMap<T> {
    fn from_iter<I: IntoIterator<Item = Fact<T>>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, T> IntoIterator for &'a FactMap<T> {
    type Item = &'a Fact<T>;
    type IntoIter = std::slice::Iter<'a, Fact<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn applicants() -> FactMap<Value> {
        FactMap::new()
            .with(Fact::new("applicant1", Value::Int(699)))
            .with(Fact::new("applicant2", Value::Int(701)))
    }

    #[test]
    fn get_by_name() {
        let facts = applicants();
        assert_eq!(facts.get("applicant1"), Some(&Value::Int(699)));
        assert_eq!(facts.get("applicant2"), Some(&Value::Int(701)));
        assert_eq!(facts.get("applicant3"), None);
    }

    #[test]
    fn duplicate_name_last_write_wins() {
        let mut facts = applicants();
        let old = facts.insert(Fact::new("applicant1", Value::Int(750)));
        assert_eq!(old, Some(Value::Int(699)));
        assert_eq!(facts.len(), 2);
        assert_eq!(facts.get("applicant1"), Some(&Value::Int(750)));
    }

    #[test]
    fn duplicate_keeps_first_position() {
        let facts: FactMap<i64> = [
            Fact::new("a", 1),
            Fact::new("b", 2),
            Fact::new("a", 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(facts.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(facts.get("a"), Some(&3));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let facts: FactMap<i64> = ["z", "a", "m"]
            .iter()
            .enumerate()
            .map(|(i, name)| Fact::new(*name, i as i64))
            .collect();
        let names: Vec<&str> = facts.iter().map(Fact::name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn try_get_missing() {
        let facts = applicants();
        assert_eq!(
            facts.try_get("nobody"),
            Err(FactError::Missing {
                name: "nobody".into()
            })
        );
    }

    #[test]
    fn get_as_typed_lookup() {
        let facts = applicants().with(Fact::new("approved", Value::Bool(true)));
        assert_eq!(facts.get_as::<i64>("applicant1"), Ok(699));
        assert_eq!(facts.get_as::<f64>("applicant1"), Ok(699.0));
        assert_eq!(facts.get_as::<bool>("approved"), Ok(true));
    }

    #[test]
    fn get_as_type_mismatch() {
        let facts = applicants();
        let err = facts.get_as::<bool>("applicant1").unwrap_err();
        assert!(matches!(
            err,
            FactError::TypeMismatch { ref name, expected } if name == "applicant1" && expected == "bool"
        ));
    }

    #[test]
    fn get_as_missing() {
        let facts = applicants();
        assert!(matches!(
            facts.get_as::<i64>("nobody"),
            Err(FactError::Missing { .. })
        ));
    }

    #[test]
    fn merged_overlay_wins() {
        let base = applicants();
        let overlay = FactMap::new()
            .with(Fact::new("applicant2", Value::Int(1)))
            .with(Fact::new("rate", Value::Float(0.05)));
        let merged = base.merged(&overlay);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("applicant1"), Some(&Value::Int(699)));
        assert_eq!(merged.get("applicant2"), Some(&Value::Int(1)));
        assert_eq!(merged.get("rate"), Some(&Value::Float(0.05)));
        // base untouched
        assert_eq!(base.get("applicant2"), Some(&Value::Int(701)));
    }

    #[test]
    fn empty_map() {
        let facts: FactMap<Value> = FactMap::new();
        assert!(facts.is_empty());
        assert_eq!(facts.len(), 0);
        assert!(!facts.contains("anything"));
    }

    #[test]
    fn clear_drops_everything() {
        let mut facts = applicants();
        facts.clear();
        assert!(facts.is_empty());
        assert_eq!(facts.get("applicant1"), None);
    }
}
