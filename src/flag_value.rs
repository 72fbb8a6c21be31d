use log::warn;
use serde::{Deserialize, Serialize};

// Largest magnitude below which every integer is exactly representable as an f64.
const MAX_SAFE_INTEGER: f64 = 9007199254740991_f64;

/// A flag's value as published by an adapter: either a plain boolean toggle or a
/// provider-defined variation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
}

impl Default for FlagValue {
    fn default() -> Self {
        FlagValue::Bool(false)
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> FlagValue {
        FlagValue::Bool(b)
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> FlagValue {
        FlagValue::Str(s)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> FlagValue {
        FlagValue::Str(s.to_owned())
    }
}

impl From<i64> for FlagValue {
    fn from(i: i64) -> FlagValue {
        FlagValue::Int(i)
    }
}

impl From<f64> for FlagValue {
    fn from(f: f64) -> FlagValue {
        FlagValue::Float(f)
    }
}

impl From<serde_json::Value> for FlagValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Bool(b) => b.into(),
            Value::String(s) => s.into(),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.into(),
                (None, Some(f)) => f.into(),
                (None, None) => {
                    warn!("unrepresentable number {}, keeping it as JSON", n);
                    FlagValue::Json(Value::Number(n))
                }
            },
            other => FlagValue::Json(other),
        }
    }
}

impl FlagValue {
    fn kind(&self) -> &'static str {
        match self {
            FlagValue::Bool(_) => "bool",
            FlagValue::Str(_) => "str",
            FlagValue::Int(_) => "int",
            FlagValue::Float(_) => "float",
            FlagValue::Json(_) => "json",
        }
    }

    fn mismatch<T>(&self, wanted: &str) -> Option<T> {
        warn!("flag value is {} but {} was requested: {:?}", self.kind(), wanted, self);
        None
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => self.mismatch("bool"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(s) => Some(s),
            _ => self.mismatch("str"),
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FlagValue::Float(f) => Some(*f),
            FlagValue::Int(i) => Some(*i as f64),
            _ => self.mismatch("float"),
        }
    }

    /// Integral floats within the exactly representable range convert; anything else does not.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(i) => Some(*i),
            FlagValue::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                Some(*f as i64)
            }
            _ => self.mismatch("int"),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FlagValue::Bool(b) => Value::from(*b),
            FlagValue::Str(s) => Value::from(s.as_str()),
            FlagValue::Int(i) => Value::from(*i),
            FlagValue::Float(f) => Value::from(*f),
            FlagValue::Json(v) => v.clone(),
        }
    }

    /// Whether this value selects the given variation. Toggles compare against `true` unless a
    /// specific variation is requested.
    pub fn matches_variation(&self, variation: Option<&FlagValue>) -> bool {
        match variation {
            Some(variation) => self == variation,
            None => self == &FlagValue::Bool(true),
        }
    }
}
