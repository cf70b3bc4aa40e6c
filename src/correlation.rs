//! Correlation identifiers linking requests to their responses.
//!
//! Gremlin-style servers echo the `requestId` of a request on every response
//! message that answers it. [`CorrelationId`] wraps that opaque string so it
//! can be cloned cheaply across the aggregator map and waiting callers.

use std::{fmt, sync::Arc};

/// Opaque identifier shared by a request and every response message for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Create a new [`CorrelationId`] from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Returns `true` if the identifier is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self { Self(Arc::from(value)) }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[cfg(test)]
mod tests {
    use super::CorrelationId;

    #[test]
    fn clones_share_storage() {
        let id = CorrelationId::from("1d6d02bd-8e56-421d-9438-3bd6d0079ff1");
        let copy = id.clone();
        assert_eq!(id, copy);
        assert_eq!(copy.as_str(), "1d6d02bd-8e56-421d-9438-3bd6d0079ff1");
        assert_eq!(copy.to_string(), id.as_str());
    }

    #[test]
    fn empty_identifier_is_detected() {
        assert!(CorrelationId::from(String::new()).is_empty());
        assert!(!CorrelationId::new("r").is_empty());
    }
}
