// Error taxonomy for the marshalling boundary.
// Every condition is synchronous and surfaces to the caller; there is no
// recovery layer behind the conversion functions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A surface label that no constructor of the target variant declares.
    #[error("unknown label '{label}'")]
    UnknownLabel { label: String },

    /// A native nullary-case index outside the declared constructor table.
    #[error("no nullary constructor with index {index}")]
    UnknownNullaryIndex { index: i64 },

    /// A native block tag outside the declared constructor table.
    #[error("no payload constructor with tag {tag}")]
    UnknownBlockTag { tag: u32 },

    /// Declared and actual argument counts disagree for a named export.
    #[error("arity mismatch for '{name}': expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A fixed-arity function invoked through the wrong entry point.
    #[error("wrong entry point: arity {arity} function invoked with {requested} argument(s)")]
    EntryPointArity { arity: usize, requested: usize },

    /// A value whose shape does not match its declared mapping.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A required record field or parameter absent from the surface object.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// Arguments passed in the wrong style for the declared signature.
    #[error("argument style mismatch for '{name}': expected {expected}")]
    ArgStyleMismatch {
        name: String,
        expected: &'static str,
    },

    /// An export name the schema or the native module does not declare.
    #[error("unknown export '{name}'")]
    UnknownExport { name: String },

    /// An export declared as one kind but registered as another.
    #[error("export '{name}' is a {got}, expected a {expected}")]
    ExportKind {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    /// A named type reference with no earlier declaration.
    #[error("unknown type reference '{name}'")]
    UnknownTypeRef { name: String },

    /// Declaration failed structural validation (E_* coded message).
    #[error("invalid schema: {0}")]
    Invalid(String),

    /// Declaration file is not valid JSON or not schema-shaped.
    #[error("schema parse error: {0}")]
    Parse(String),

    /// Filesystem failure reading or writing a declaration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand for loader-level structural complaints.
    pub fn parse(msg: impl Into<String>) -> Self {
        BridgeError::Parse(msg.into())
    }

    /// Shorthand for value-shape complaints.
    pub fn shape(expected: impl Into<String>, got: impl Into<String>) -> Self {
        BridgeError::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
