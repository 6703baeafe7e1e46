//! The consumer-facing value representation.
//!
//! Mirrors the shapes idiomatic typed-JavaScript consumers work with: named
//! field objects, variant values that are either a bare label or a
//! `{tag, value}` pair, and `undefined` for absence. A variant case is a
//! distinct enum discriminant here (`Label` vs `Tagged`), never something
//! recovered by probing the value's runtime type.

use crate::runtime::native::NativeValue;
use crate::schema::{CaseRef, Mapping, Presence};

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<SurfaceValue>),
    /// Named fields in insertion order.
    Object(Vec<(String, SurfaceValue)>),
    /// A nullary variant case: the bare label.
    Label(String),
    /// A payload-carrying variant case.
    Tagged {
        label: String,
        value: Box<SurfaceValue>,
    },
    /// A native value crossing the surface uninspected.
    Foreign(Box<NativeValue>),
}

impl SurfaceValue {
    pub fn str(s: &str) -> SurfaceValue {
        SurfaceValue::Str(s.to_string())
    }

    pub fn label(l: &str) -> SurfaceValue {
        SurfaceValue::Label(l.to_string())
    }

    pub fn tagged(label: &str, value: SurfaceValue) -> SurfaceValue {
        SurfaceValue::Tagged {
            label: label.to_string(),
            value: Box::new(value),
        }
    }

    pub fn object(pairs: Vec<(&str, SurfaceValue)>) -> SurfaceValue {
        SurfaceValue::Object(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SurfaceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SurfaceValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SurfaceValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SurfaceValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SurfaceValue]> {
        match self {
            SurfaceValue::Array(elems) => Some(elems),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, SurfaceValue)]> {
        match self {
            SurfaceValue::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Field lookup on an object value.
    pub fn field(&self, name: &str) -> Option<&SurfaceValue> {
        match self {
            SurfaceValue::Object(pairs) => pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Short shape name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceValue::Undefined => "undefined",
            SurfaceValue::Null => "null",
            SurfaceValue::Bool(_) => "bool",
            SurfaceValue::Int(_) => "int",
            SurfaceValue::Float(_) => "float",
            SurfaceValue::Str(_) => "string",
            SurfaceValue::Array(_) => "array",
            SurfaceValue::Object(_) => "object",
            SurfaceValue::Label(_) => "label",
            SurfaceValue::Tagged { .. } => "tagged value",
            SurfaceValue::Foreign(_) => "foreign value",
        }
    }

    /// Decode a JSON value into its surface form, using the declared mapping
    /// to resolve what JSON cannot express on its own: strings that are
    /// variant labels, objects that are `{tag, value}` pairs, numbers that
    /// are floats, and `null` standing for absence.
    ///
    /// Decoding never fails; a JSON value that does not fit the mapping
    /// decodes to its natural untyped form and is rejected later by
    /// conversion, which owns the error taxonomy.
    pub fn from_json(value: &serde_json::Value, mapping: &Mapping) -> SurfaceValue {
        use serde_json::Value;

        if let Mapping::Option(inner) = mapping {
            if value.is_null() {
                return SurfaceValue::Undefined;
            }
            return SurfaceValue::from_json(value, inner);
        }

        match (value, mapping) {
            (Value::Null, Mapping::Unit) => SurfaceValue::Undefined,
            (Value::Null, _) => SurfaceValue::Null,
            (Value::Bool(b), _) => SurfaceValue::Bool(*b),
            (Value::Number(n), Mapping::Float) => match n.as_f64() {
                Some(x) => SurfaceValue::Float(x),
                None => SurfaceValue::Null,
            },
            (Value::Number(_), _) => from_json_untyped(value),
            (Value::String(s), Mapping::Variant(_)) => SurfaceValue::Label(s.clone()),
            (Value::String(s), _) => SurfaceValue::Str(s.clone()),
            (Value::Array(items), Mapping::Array(elem)) | (Value::Array(items), Mapping::List(elem)) => {
                SurfaceValue::Array(
                    items
                        .iter()
                        .map(|item| SurfaceValue::from_json(item, elem))
                        .collect(),
                )
            }
            (Value::Array(_), _) => from_json_untyped(value),
            (Value::Object(obj), Mapping::Variant(var)) => {
                let tag = obj.get("tag").and_then(|t| t.as_str());
                match (tag, obj.get("value")) {
                    (Some(label), Some(payload)) => {
                        let payload_mapping = match var.case_ref(label) {
                            Some(CaseRef::Block(_, m)) => Some(m),
                            _ => None,
                        };
                        let inner = match payload_mapping {
                            Some(m) => SurfaceValue::from_json(payload, m),
                            None => from_json_untyped(payload),
                        };
                        SurfaceValue::tagged(label, inner)
                    }
                    _ => from_json_untyped(value),
                }
            }
            (Value::Object(obj), Mapping::Record(rec)) => {
                let mut pairs = Vec::new();
                for field in &rec.fields {
                    match obj.get(&field.name) {
                        None => {}
                        Some(Value::Null)
                            if !matches!(field.presence, Presence::Required) => {}
                        Some(jv) => pairs.push((
                            field.name.clone(),
                            SurfaceValue::from_json(jv, &field.mapping),
                        )),
                    }
                }
                SurfaceValue::Object(pairs)
            }
            (Value::Object(_), _) => from_json_untyped(value),
        }
    }

    /// Encode into JSON for display and persistence.
    ///
    /// Lossy at two edges JSON cannot carry: `Undefined` becomes `null` and
    /// an embedded native value is rendered as a string.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            SurfaceValue::Undefined | SurfaceValue::Null => Value::Null,
            SurfaceValue::Bool(b) => Value::Bool(*b),
            SurfaceValue::Int(n) => Value::from(*n),
            SurfaceValue::Float(x) => match serde_json::Number::from_f64(*x) {
                Some(n) => Value::Number(n),
                None => Value::Null,
            },
            SurfaceValue::Str(s) => Value::String(s.clone()),
            SurfaceValue::Array(elems) => {
                Value::Array(elems.iter().map(|e| e.to_json()).collect())
            }
            SurfaceValue::Object(pairs) => {
                let mut map = serde_json::Map::new();
                for (name, value) in pairs {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
            SurfaceValue::Label(l) => Value::String(l.clone()),
            SurfaceValue::Tagged { label, value } => {
                let mut map = serde_json::Map::new();
                map.insert("tag".to_string(), Value::String(label.clone()));
                map.insert("value".to_string(), value.to_json());
                Value::Object(map)
            }
            SurfaceValue::Foreign(n) => Value::String(format!("<native {}>", n)),
        }
    }
}

/// Decode JSON with no mapping in play, as under an opaque position.
fn from_json_untyped(value: &serde_json::Value) -> SurfaceValue {
    use serde_json::Value;

    match value {
        Value::Null => SurfaceValue::Null,
        Value::Bool(b) => SurfaceValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SurfaceValue::Int(i),
            None => match n.as_f64() {
                Some(x) => SurfaceValue::Float(x),
                None => SurfaceValue::Null,
            },
        },
        Value::String(s) => SurfaceValue::Str(s.clone()),
        Value::Array(items) => SurfaceValue::Array(items.iter().map(from_json_untyped).collect()),
        Value::Object(obj) => SurfaceValue::Object(
            obj.iter()
                .map(|(name, jv)| (name.clone(), from_json_untyped(jv)))
                .collect(),
        ),
    }
}

impl std::fmt::Display for SurfaceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceValue::Undefined => write!(f, "undefined"),
            SurfaceValue::Null => write!(f, "null"),
            SurfaceValue::Bool(b) => write!(f, "{}", b),
            SurfaceValue::Int(n) => write!(f, "{}", n),
            SurfaceValue::Float(x) => write!(f, "{}", x),
            SurfaceValue::Str(s) => write!(f, "{:?}", s),
            SurfaceValue::Array(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            SurfaceValue::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (name, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            SurfaceValue::Label(l) => write!(f, "{}", l),
            SurfaceValue::Tagged { label, value } => {
                write!(f, "{{tag: {}, value: {}}}", label, value)
            }
            SurfaceValue::Foreign(n) => write!(f, "native({})", n),
        }
    }
}
