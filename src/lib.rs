//! Seam Bridge
//!
//! Runtime value marshalling between a curried, ML-style native runtime and
//! the values idiomatic typed-JavaScript style consumers expect. Generated
//! bindings describe each module in a declaration schema; this crate loads
//! and validates those declarations and performs the conversions they
//! describe.
//!
//! ## Boundary Contract
//!
//! 1. **One schema, both directions**: constructor numbering and field
//!    order come from a single declaration, so the two conversion
//!    directions cannot drift apart
//! 2. **No shape inference**: conversion reads a value's discriminant and
//!    the declared mapping, nothing else
//! 3. **Loud failures**: unknown labels, unknown constructor indices and
//!    arity drift are explicit errors, never corrupt values
//! 4. **Fixed-arity entry points**: native functions are invoked through
//!    the entry point matching their declared arity, never by counting
//!    arguments at runtime

pub mod error;
pub mod schema;
pub mod schema_loader;
pub mod schema_validator;
pub mod runtime;

#[cfg(test)]
mod loader_tests;

pub use error::BridgeError;
pub use schema::{
    ArgStyle, CaseIndex, CaseMapping, CaseRef, ConstMapping, FieldMapping, FnMapping, Mapping,
    ModuleSchema, ParamMapping, Presence, RecordMapping, VariantMapping,
};
pub use schema_loader::{
    load_schema_file, module_schema_from_json, module_schema_to_json, save_schema_file,
};
pub use schema_validator::validate_module_schema;
pub use runtime::{
    from_native, to_native, BoundModule, CallArgs, Export, FnAdapter, NativeFun, NativeModule,
    NativeValue, SurfaceValue, MAX_ARITY,
};
