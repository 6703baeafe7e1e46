//! Declared conversion mappings.
//!
//! A `Mapping` describes, for one type position, how surface values and
//! native values correspond. Conversion never inspects a value beyond its
//! own discriminant; everything else is driven by the declaration, so both
//! directions share a single source of truth for constructor numbering and
//! field order.

use std::collections::HashMap;

use crate::error::BridgeError;
use crate::runtime::native::NativeValue;

// ============================================================================
// Type mappings
// ============================================================================

/// Conversion rule for one type position.
#[derive(Clone, Debug, PartialEq)]
pub enum Mapping {
    Bool,
    Int,
    Float,
    Str,
    /// Surface `undefined` paired with the native unit value.
    Unit,
    /// Crosses the boundary uninspected, embedded in the other representation.
    Opaque,
    /// Surface `undefined` or a value of the inner mapping.
    Option(Box<Mapping>),
    /// Flat array, element-wise conversion.
    Array(Box<Mapping>),
    /// Surface array paired with a native cons chain.
    List(Box<Mapping>),
    Record(RecordMapping),
    Variant(VariantMapping),
}

impl Mapping {
    pub fn option(inner: Mapping) -> Mapping {
        Mapping::Option(Box::new(inner))
    }

    pub fn array(elem: Mapping) -> Mapping {
        Mapping::Array(Box::new(elem))
    }

    pub fn list(elem: Mapping) -> Mapping {
        Mapping::List(Box::new(elem))
    }

    /// True when conversion under this mapping is embedding only.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Mapping::Opaque)
    }
}

// ============================================================================
// Records
// ============================================================================

/// Ordered field list of a record declaration.
///
/// The native shape is a positional tuple of exactly `fields.len()` slots,
/// one per field in declaration order. Optional fields keep their slot.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordMapping {
    pub fields: Vec<FieldMapping>,
}

impl RecordMapping {
    pub fn new(fields: Vec<FieldMapping>) -> Self {
        RecordMapping { fields }
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapping {
    pub name: String,
    pub mapping: Mapping,
    pub presence: Presence,
}

impl FieldMapping {
    pub fn required(name: &str, mapping: Mapping) -> Self {
        FieldMapping {
            name: name.to_string(),
            mapping,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &str, mapping: Mapping) -> Self {
        FieldMapping {
            name: name.to_string(),
            mapping,
            presence: Presence::Optional,
        }
    }
}

/// Absence rule for a record field or a function parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Presence {
    /// Must be present; absence is an error.
    Required,
    /// Absent converts to the native none-sentinel.
    Optional,
    /// Absent converts to the declared native default.
    Defaulted(NativeValue),
}

// ============================================================================
// Variants
// ============================================================================

/// One constructor of a variant declaration: a label alone, or a label
/// carrying exactly one payload value.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseMapping {
    pub label: String,
    pub payload: Option<Mapping>,
}

impl CaseMapping {
    pub fn nullary(label: &str) -> Self {
        CaseMapping {
            label: label.to_string(),
            payload: None,
        }
    }

    pub fn with_payload(label: &str, payload: Mapping) -> Self {
        CaseMapping {
            label: label.to_string(),
            payload: Some(payload),
        }
    }
}

/// Position of a label in the variant's two constructor tables.
///
/// Nullary constructors and payload constructors are numbered independently,
/// each 0.. in declaration order within their own table. Nullary cases encode
/// natively as plain integers, payload cases as tagged blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseIndex {
    Nullary(u32),
    Block(u32),
}

/// Resolved lookup result for a surface label.
pub enum CaseRef<'a> {
    Nullary(u32),
    Block(u32, &'a Mapping),
}

/// A variant declaration together with its derived label tables.
///
/// The tables are computed once here, from declaration order, and never
/// mutated afterwards. Both conversion directions read the same tables, so a
/// label and its index can never drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantMapping {
    cases: Vec<CaseMapping>,
    index: HashMap<String, CaseIndex>,
    nullary_labels: Vec<String>,
    block_cases: Vec<(String, Mapping)>,
}

impl VariantMapping {
    /// Derive the label tables from the declared constructor order.
    ///
    /// Fails on a duplicate label, which would break the label-to-index
    /// bijection the conversion relies on.
    pub fn new(cases: Vec<CaseMapping>) -> Result<Self, BridgeError> {
        let mut index = HashMap::new();
        let mut nullary_labels = Vec::new();
        let mut block_cases = Vec::new();

        for case in &cases {
            if index.contains_key(&case.label) {
                return Err(BridgeError::Invalid(format!(
                    "E_DUP_LABEL: duplicate constructor label '{}'",
                    case.label
                )));
            }
            match &case.payload {
                None => {
                    let rank = nullary_labels.len() as u32;
                    index.insert(case.label.clone(), CaseIndex::Nullary(rank));
                    nullary_labels.push(case.label.clone());
                }
                Some(payload) => {
                    let tag = block_cases.len() as u32;
                    index.insert(case.label.clone(), CaseIndex::Block(tag));
                    block_cases.push((case.label.clone(), payload.clone()));
                }
            }
        }

        Ok(VariantMapping {
            cases,
            index,
            nullary_labels,
            block_cases,
        })
    }

    pub fn cases(&self) -> &[CaseMapping] {
        &self.cases
    }

    pub fn case_index(&self, label: &str) -> Option<CaseIndex> {
        self.index.get(label).copied()
    }

    /// Look up a label, resolving payload cases to their payload mapping.
    pub fn case_ref(&self, label: &str) -> Option<CaseRef<'_>> {
        match self.index.get(label)? {
            CaseIndex::Nullary(rank) => Some(CaseRef::Nullary(*rank)),
            CaseIndex::Block(tag) => {
                let (_, payload) = self.block_cases.get(*tag as usize)?;
                Some(CaseRef::Block(*tag, payload))
            }
        }
    }

    /// Label of the nullary constructor at `rank`, if declared.
    pub fn nullary_label(&self, rank: u32) -> Option<&str> {
        self.nullary_labels.get(rank as usize).map(|s| s.as_str())
    }

    /// Label and payload mapping of the payload constructor at `tag`.
    pub fn block_case(&self, tag: u32) -> Option<(&str, &Mapping)> {
        self.block_cases
            .get(tag as usize)
            .map(|(label, payload)| (label.as_str(), payload))
    }

    pub fn nullary_count(&self) -> usize {
        self.nullary_labels.len()
    }

    pub fn block_count(&self) -> usize {
        self.block_cases.len()
    }
}

// ============================================================================
// Functions
// ============================================================================

/// How the surface side passes arguments to an exported function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgStyle {
    /// One surface object; parameters are read from it by name.
    NamedObject,
    /// Arguments arrive positionally in declared order.
    Positional,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamMapping {
    pub name: String,
    pub mapping: Mapping,
    pub presence: Presence,
}

impl ParamMapping {
    pub fn required(name: &str, mapping: Mapping) -> Self {
        ParamMapping {
            name: name.to_string(),
            mapping,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &str, mapping: Mapping) -> Self {
        ParamMapping {
            name: name.to_string(),
            mapping,
            presence: Presence::Optional,
        }
    }
}

/// Declared signature of one exported native function.
#[derive(Clone, Debug, PartialEq)]
pub struct FnMapping {
    pub name: String,
    pub params: Vec<ParamMapping>,
    pub result: Mapping,
    pub arg_style: ArgStyle,
}

impl FnMapping {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True when neither arguments nor result need real conversion, only
    /// opaque embedding. Such exports mirror direct re-exports.
    pub fn is_passthrough(&self) -> bool {
        self.result.is_opaque() && self.params.iter().all(|p| p.mapping.is_opaque())
    }
}

/// Declared mapping of one exported constant value.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstMapping {
    pub name: String,
    pub mapping: Mapping,
}

// ============================================================================
// Module schema
// ============================================================================

/// Everything a binding generator declares about one native module: named
/// type mappings plus the signatures of its exports.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleSchema {
    pub name: String,
    /// Named declarations in declaration order, references already inlined.
    pub types: Vec<(String, Mapping)>,
    pub functions: Vec<FnMapping>,
    pub constants: Vec<ConstMapping>,
}

impl ModuleSchema {
    pub fn new(name: &str) -> Self {
        ModuleSchema {
            name: name.to_string(),
            types: Vec::new(),
            functions: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn type_named(&self, name: &str) -> Option<&Mapping> {
        self.types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    pub fn function(&self, name: &str) -> Option<&FnMapping> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&ConstMapping> {
        self.constants.iter().find(|c| c.name == name)
    }
}
