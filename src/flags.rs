use std::collections::BTreeMap;

use heck::ToLowerCamelCase;
use serde_json::Value;

use crate::flag_value::FlagValue;

/// Flags keyed by their canonical (lower camel case) name.
pub type Flags = BTreeMap<String, FlagValue>;

/// Returns the canonical form of a flag name as adapters publish it, e.g. `flag-a-1` becomes
/// `flagA1` and `flag_b` becomes `flagB`. Already canonical names are returned unchanged.
pub fn normalize_flag_name(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Coerces a raw value into a flag value. Missing values (JSON `null`) become `false`; every
/// other value is kept as the provider's variation.
pub fn normalize_flag_value(value: impl Into<FlagValue>) -> FlagValue {
    match value.into() {
        FlagValue::Json(Value::Null) => FlagValue::Bool(false),
        value => value,
    }
}

pub fn normalize_flag(name: &str, value: impl Into<FlagValue>) -> (String, FlagValue) {
    (normalize_flag_name(name), normalize_flag_value(value))
}

/// Normalizes every raw name/value pair. When two raw names collapse onto the same canonical
/// name, the later pair wins.
pub fn normalize_flags<I, K, V>(raw: I) -> Flags
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<FlagValue>,
{
    raw.into_iter()
        .map(|(name, value)| normalize_flag(name.as_ref(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use serde_json::json;
    use spectral::prelude::*;
    use test_case::test_case;

    #[test_case("flag-a-1", "flagA1")]
    #[test_case("flag_b", "flagB")]
    #[test_case("fooFlag", "fooFlag")]
    #[test_case("Foo Bar", "fooBar")]
    #[test_case("SOME_FLAG", "someFlag")]
    #[test_case("", "")]
    fn canonical_names(raw: &str, expected: &str) {
        assert_that!(normalize_flag_name(raw)).is_equal_to(expected.to_string());
    }

    #[test]
    fn normalizes_names_and_null_values() {
        let raw = json!({ "flag-a-1": false, "flag_b": null });
        let raw = raw.as_object().unwrap().clone();

        let flags = normalize_flags(raw);

        assert_that!(flags).is_equal_to(btreemap! {
            "flagA1".to_string() => FlagValue::Bool(false),
            "flagB".to_string() => FlagValue::Bool(false),
        });
    }

    #[test]
    fn normalizing_canonical_flags_is_identity() {
        let canonical = btreemap! {
            "fooFlag".to_string() => FlagValue::Bool(true),
            "colorScheme".to_string() => FlagValue::from("dark"),
            "retryBudget".to_string() => FlagValue::Int(3),
        };

        let normalized = normalize_flags(canonical.clone());

        assert_that!(normalized).is_equal_to(&canonical);
        assert_that!(normalize_flags(normalized)).is_equal_to(&canonical);
    }

    #[test]
    fn keeps_variation_values() {
        let (name, value) = normalize_flag("button-color", json!("blue"));
        assert_that!(name.as_str()).is_equal_to("buttonColor");
        assert_that!(value).is_equal_to(FlagValue::from("blue"));

        let (_, value) = normalize_flag("limits", json!({ "max": 3 }));
        assert_that!(value).is_equal_to(FlagValue::Json(json!({ "max": 3 })));
    }
}
