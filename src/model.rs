//! # Credential Data Model
//!
//! Document types for Verifiable Credentials and Presentations, modelled on
//! the W3C [Data Model v1.1]. Documents serialize to the camelCase JSON wire
//! shape; builders enforce the structural invariants (base type present,
//! mandatory fields set) before a document leaves the crate.
//!
//! [Data Model v1.1]: https://www.w3.org/TR/vc-data-model

pub mod proof;
pub mod vc;
pub mod vp;

use serde::{Deserialize, Serialize};

pub use proof::Proof;
pub use vc::{CredentialSubject, VcBuilder, VerifiableCredential};
pub use vp::{VerifiablePresentation, VpBuilder};

/// Serializes a single object or a set of objects, as permitted for
/// `credentialSubject` by the data model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Single object.
    One(T),

    /// Set of objects.
    Many(Vec<T>),
}

impl<T: Default> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T> OneOrMany<T> {
    /// Number of contained objects.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(set) => set.len(),
        }
    }

    /// True if no objects are contained (only possible for an empty set).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the contained objects.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(one) => std::slice::from_ref(one).iter(),
            Self::Many(set) => set.iter(),
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(mut set: Vec<T>) -> Self {
        if set.len() == 1 {
            Self::One(set.remove(0))
        } else {
            Self::Many(set)
        }
    }
}

/// De-duplicates string entries, preserving the order of first appearance.
pub(crate) fn dedup_preserve(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn one_or_many_serde() {
        let one: OneOrMany<String> = OneOrMany::One("a".into());
        assert_eq!(serde_json::to_value(&one).expect("should serialize"), json!("a"));

        let many: OneOrMany<String> = vec!["a".to_string(), "b".to_string()].into();
        assert_eq!(serde_json::to_value(&many).expect("should serialize"), json!(["a", "b"]));

        let de: OneOrMany<String> = serde_json::from_value(json!(["a", "b"])).expect("should deserialize");
        assert_eq!(de.len(), 2);
    }

    #[test]
    fn singleton_vec_collapses() {
        let one: OneOrMany<String> = vec!["a".to_string()].into();
        assert!(matches!(one, OneOrMany::One(_)));
    }

    #[test]
    fn dedup_keeps_first_appearance() {
        let deduped = dedup_preserve(["b", "a", "b", "c", "a"].map(String::from));
        assert_eq!(deduped, vec!["b", "a", "c"]);
    }
}
