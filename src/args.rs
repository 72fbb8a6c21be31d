use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Adapter-specific configuration, e.g. the identity flags are evaluated for. The controller never
/// looks inside it beyond merging top-level and nested object fields.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AdapterArgs(Map<String, Value>);

impl AdapterArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from an arbitrary JSON value. Anything other than an object is coerced to
    /// an empty argument set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => AdapterArgs(map),
            Value::Null => AdapterArgs::default(),
            other => {
                warn!("adapter arguments must be an object, ignoring {}", other);
                AdapterArgs::default()
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for AdapterArgs {
    fn from(map: Map<String, Value>) -> Self {
        AdapterArgs(map)
    }
}

impl From<Value> for AdapterArgs {
    fn from(value: Value) -> Self {
        AdapterArgs::from_value(value)
    }
}

fn is_false(b: &bool) -> bool {
    !b
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationOptions {
    /// Replace the base's fields instead of folding into them.
    #[serde(default, skip_serializing_if = "is_false")]
    pub should_overwrite: bool,
}

impl ReconfigurationOptions {
    pub fn overwrite() -> Self {
        ReconfigurationOptions {
            should_overwrite: true,
        }
    }

    pub fn merge() -> Self {
        ReconfigurationOptions {
            should_overwrite: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationRequest {
    pub adapter_args: AdapterArgs,
    #[serde(default)]
    pub options: ReconfigurationOptions,
}

impl ReconfigurationRequest {
    pub fn new(adapter_args: AdapterArgs, options: ReconfigurationOptions) -> Self {
        ReconfigurationRequest {
            adapter_args,
            options,
        }
    }
}

/// Combines `base` with a reconfiguration request.
///
/// With `should_overwrite` set, every top-level field of the request replaces the base's field of
/// the same name. Otherwise the request is folded in field by field: nested objects are merged
/// recursively and only leaf values are replaced, so nothing already accumulated in `base` is lost
/// unless the request names it explicitly.
pub fn merge_adapter_args(base: &AdapterArgs, request: &ReconfigurationRequest) -> AdapterArgs {
    let mut merged = base.0.clone();
    for (field, value) in request.adapter_args.0.iter() {
        if request.options.should_overwrite {
            merged.insert(field.clone(), value.clone());
        } else {
            match merged.get_mut(field) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    merged.insert(field.clone(), value.clone());
                }
            }
        }
    }
    AdapterArgs(merged)
}

fn deep_merge(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (field, value) in incoming {
                match target.get_mut(field) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(field.clone(), value.clone());
                    }
                }
            }
        }
        (target, incoming) => *target = incoming.clone(),
    }
}
