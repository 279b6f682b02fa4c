//! Identifier types shared by entities and nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from a string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Name of a persisted entity class, e.g. `Acme.Shop:Product`.
    EntityType
);

string_id!(
    /// Stable identifier of a persisted entity, issued by the store.
    EntityIdentifier
);

string_id!(
    /// Identifier of a content node. The same identifier may exist once
    /// per workspace.
    NodeIdentifier
);

/// A content node's back-reference to the entity it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentObjectRef {
    /// Type of the bound entity.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Identifier of the bound entity.
    pub identifier: EntityIdentifier,
}

impl ContentObjectRef {
    /// Creates a new reference.
    pub fn new(
        entity_type: impl Into<EntityType>,
        identifier: impl Into<EntityIdentifier>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for ContentObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = EntityIdentifier::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(format!("{:?}", id), "EntityIdentifier(abc)");

        let reference = ContentObjectRef::new("Acme.Shop:Product", "abc");
        assert_eq!(reference.to_string(), "Acme.Shop:Product#abc");
    }

    #[test]
    fn content_object_ref_serde_shape() {
        let reference = ContentObjectRef::new("Acme.Shop:Product", "p-1");
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(json, r#"{"type":"Acme.Shop:Product","identifier":"p-1"}"#);
    }
}
