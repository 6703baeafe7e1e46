//! The runtime-facing value representation.
//!
//! Mirrors how the native runtime lays values out in memory: records are
//! positional tuples, variant constructors are plain integers (nullary) or
//! tagged blocks (payload-carrying), lists are cons chains, and absence is
//! the `Undefined` sentinel.

use crate::runtime::surface::SurfaceValue;

/// Tag of the cons cell in the native list encoding. The empty list is
/// `Int(0)`.
pub const LIST_CONS_TAG: u32 = 0;

#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    /// The runtime's none-sentinel.
    Undefined,
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Flat array, element-wise converted.
    Array(Vec<NativeValue>),
    /// Positional record payload, one slot per declared field.
    Tuple(Vec<NativeValue>),
    /// A payload-carrying constructor application.
    Block { tag: u32, payload: Vec<NativeValue> },
    /// A surface value crossing the runtime uninspected.
    Foreign(Box<SurfaceValue>),
}

impl NativeValue {
    pub fn str(s: &str) -> NativeValue {
        NativeValue::Str(s.to_string())
    }

    /// Construct a tagged block.
    pub fn block(tag: u32, payload: Vec<NativeValue>) -> NativeValue {
        NativeValue::Block { tag, payload }
    }

    /// Build the native cons-chain encoding of a list.
    pub fn list_from(items: Vec<NativeValue>) -> NativeValue {
        let mut chain = NativeValue::Int(0);
        for item in items.into_iter().rev() {
            chain = NativeValue::block(LIST_CONS_TAG, vec![item, chain]);
        }
        chain
    }

    /// Walk a cons chain back into a flat item vector.
    ///
    /// Returns `None` when the value is not a well-formed chain (wrong
    /// terminal, wrong cell tag, or a cell without exactly head and tail).
    pub fn list_items(&self) -> Option<Vec<NativeValue>> {
        let mut items = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                NativeValue::Int(0) => return Some(items),
                NativeValue::Block { tag, payload }
                    if *tag == LIST_CONS_TAG && payload.len() == 2 =>
                {
                    items.push(payload[0].clone());
                    cursor = &payload[1];
                }
                _ => return None,
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            NativeValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            NativeValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[NativeValue]> {
        match self {
            NativeValue::Tuple(slots) => Some(slots),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<(u32, &[NativeValue])> {
        match self {
            NativeValue::Block { tag, payload } => Some((*tag, payload)),
            _ => None,
        }
    }

    /// Short shape name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            NativeValue::Undefined => "undefined",
            NativeValue::Unit => "unit",
            NativeValue::Bool(_) => "bool",
            NativeValue::Int(_) => "int",
            NativeValue::Float(_) => "float",
            NativeValue::Str(_) => "string",
            NativeValue::Array(_) => "array",
            NativeValue::Tuple(_) => "tuple",
            NativeValue::Block { .. } => "block",
            NativeValue::Foreign(_) => "foreign value",
        }
    }
}

impl std::fmt::Display for NativeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeValue::Undefined => write!(f, "undefined"),
            NativeValue::Unit => write!(f, "()"),
            NativeValue::Bool(b) => write!(f, "{}", b),
            NativeValue::Int(n) => write!(f, "{}", n),
            NativeValue::Float(x) => write!(f, "{}", x),
            NativeValue::Str(s) => write!(f, "{:?}", s),
            NativeValue::Array(elems) => {
                write!(f, "[|")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "|]")
            }
            NativeValue::Tuple(slots) => {
                write!(f, "(")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", slot)?;
                }
                write!(f, ")")
            }
            NativeValue::Block { tag, payload } => {
                write!(f, "B{}[", tag)?;
                for (i, field) in payload.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "]")
            }
            NativeValue::Foreign(s) => write!(f, "surface({})", s),
        }
    }
}
