//! Property-based test generators using proptest.
//!
//! Provides strategies for generating property values, property maps and
//! identifiers.

use contentproxy_core::{EntityIdentifier, NodeIdentifier, PropertyMap, Value};
use proptest::prelude::*;

/// Strategy for generating property names.
pub fn property_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9]{0,15}").expect("Invalid regex")
}

/// Strategy for generating entity identifiers.
pub fn entity_identifier_strategy() -> impl Strategy<Value = EntityIdentifier> {
    prop::string::string_regex("[a-f0-9]{8}")
        .expect("Invalid regex")
        .prop_map(EntityIdentifier::from)
}

/// Strategy for generating node identifiers.
pub fn node_identifier_strategy() -> impl Strategy<Value = NodeIdentifier> {
    prop::string::string_regex("[a-f0-9]{8}")
        .expect("Invalid regex")
        .prop_map(NodeIdentifier::from)
}

/// Strategy for generating scalar values.
///
/// Floats are finite so generated values always equal themselves.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::Text),
    ]
}

/// Strategy for generating values, nested up to two levels.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

/// Strategy for generating property maps with unique names.
pub fn property_map_strategy(max_len: usize) -> impl Strategy<Value = PropertyMap> {
    prop::collection::vec((property_name_strategy(), value_strategy()), 0..=max_len).prop_map(
        |pairs| {
            let mut map = PropertyMap::new();
            for (name, value) in pairs {
                map.insert(name, value);
            }
            map
        },
    )
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_values_equal_their_clone(value in value_strategy()) {
            prop_assert_eq!(value.clone(), value);
        }

        #[test]
        fn property_map_names_are_unique(map in property_map_strategy(8)) {
            let mut names: Vec<&str> = map.names().collect();
            let len = names.len();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), len);
            prop_assert!(len <= 8);
        }

        #[test]
        fn identifiers_are_hex(id in entity_identifier_strategy()) {
            prop_assert_eq!(id.as_str().len(), 8);
            prop_assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
