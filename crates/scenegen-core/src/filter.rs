//! Predicate-based projection of a Fact Store.
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactStore};

/// Whitelist of predicate names. A fact passes when its functor equals one
/// of the listed names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactFilter {
    predicates: Vec<String>,
}

impl FactFilter {
    pub fn new<I, S>(predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            predicates: predicates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn matches(&self, fact: &Fact) -> bool {
        let functor = fact.functor();
        self.predicates.iter().any(|name| name == functor)
    }

    /// Returns the ordered sub-sequence of `facts` whose functor is listed.
    pub fn apply(&self, facts: &[Fact]) -> FactStore {
        FactStore::from_facts(facts.iter().filter(|f| self.matches(f)).cloned().collect())
    }
}
