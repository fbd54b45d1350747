//! Hashable projection of values for equality indexes.

use crate::value::Value;

/// A value that can be used as a key in an equality index.
///
/// Only scalar values have a key. Lists, maps and NaN floats are not
/// comparable for equality lookups and do not index; documents carrying
/// them are still stored, just not reachable through that field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKey {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value, keyed by its bit pattern (`-0.0` is folded onto `0.0`).
    Float(u64),
    /// Text value.
    Text(String),
}

impl IndexKey {
    /// Builds the index key for a value, if the value is indexable.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(IndexKey::Null),
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Int(n) => Some(IndexKey::Int(*n)),
            Value::Float(x) if x.is_nan() => None,
            Value::Float(x) => {
                let x = if *x == 0.0 { 0.0 } else { *x };
                Some(IndexKey::Float(x.to_bits()))
            }
            Value::Text(s) => Some(IndexKey::Text(s.clone())),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[test]
    fn scalars_have_keys() {
        assert_eq!(IndexKey::from_value(&Value::from(30)), Some(IndexKey::Int(30)));
        assert_eq!(
            IndexKey::from_value(&Value::from("Jane")),
            Some(IndexKey::Text("Jane".into()))
        );
        assert_eq!(IndexKey::from_value(&Value::Null), Some(IndexKey::Null));
    }

    #[test]
    fn int_and_float_are_distinct() {
        assert_ne!(
            IndexKey::from_value(&Value::Int(1)),
            IndexKey::from_value(&Value::Float(1.0))
        );
    }

    #[test]
    fn negative_zero_folds() {
        assert_eq!(
            IndexKey::from_value(&Value::Float(-0.0)),
            IndexKey::from_value(&Value::Float(0.0))
        );
    }

    #[test]
    fn composite_values_do_not_index() {
        assert_eq!(IndexKey::from_value(&Value::from(vec![1])), None);
        assert_eq!(IndexKey::from_value(&Value::Map(BTreeMap::new())), None);
        assert_eq!(IndexKey::from_value(&Value::Float(f64::NAN)), None);
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-5i64..5).prop_map(Value::Int),
            prop_oneof![Just(-1.5f64), Just(0.0), Just(2.25)].prop_map(Value::Float),
            "[ab]{0,2}".prop_map(Value::Text),
        ]
    }

    proptest! {
        #[test]
        fn keys_agree_with_value_equality(a in scalar(), b in scalar()) {
            let ka = IndexKey::from_value(&a).unwrap();
            let kb = IndexKey::from_value(&b).unwrap();
            prop_assert_eq!(ka == kb, a == b);
        }
    }
}
