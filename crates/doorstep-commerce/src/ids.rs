//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ServiceId where a SubServiceId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(CategoryId);
define_id!(ServiceId);
define_id!(SubServiceId);
define_id!(EnquiryId);
define_id!(UserId);

impl SubServiceId {
    /// Compose the id of the `index`-th sub-service of a service document.
    pub fn compose(service_id: &ServiceId, index: usize) -> Self {
        Self(format!("{}-{}", service_id.as_str(), index))
    }

    /// Split back into the owning service document id and the index within it.
    ///
    /// Service ids may themselves contain hyphens; only the last segment is
    /// treated as the index.
    pub fn split(&self) -> Option<(ServiceId, usize)> {
        let (service, index) = self.0.rsplit_once('-')?;
        if service.is_empty() {
            return None;
        }
        let index = index.parse().ok()?;
        Some((ServiceId::new(service), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ServiceId::new("65a1f0c2");
        assert_eq!(id.as_str(), "65a1f0c2");
    }

    #[test]
    fn test_id_from_string() {
        let id: CategoryId = "ac-repair".into();
        assert_eq!(id.as_str(), "ac-repair");
        assert_eq!(format!("{}", id), "ac-repair");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = SubServiceId::new("svc-0");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"svc-0\"");
    }

    #[test]
    fn test_sub_service_id_round_trip() {
        let service = ServiceId::new("65a1f0c2");
        let id = SubServiceId::compose(&service, 3);
        assert_eq!(id.as_str(), "65a1f0c2-3");
        assert_eq!(id.split(), Some((service, 3)));
    }

    #[test]
    fn test_sub_service_id_split_with_hyphenated_service() {
        let id = SubServiceId::new("ac-docs-12");
        assert_eq!(id.split(), Some((ServiceId::new("ac-docs"), 12)));
    }

    #[test]
    fn test_sub_service_id_split_rejects_malformed() {
        assert_eq!(SubServiceId::new("no-index-x").split(), None);
        assert_eq!(SubServiceId::new("plain").split(), None);
        assert_eq!(SubServiceId::new("-4").split(), None);
    }
}
