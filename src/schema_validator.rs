//! Structural validation of a module schema.
//!
//! Runs after loading (or after building a schema programmatically) and
//! reports the first defect found as a coded message. Conversion assumes a
//! validated schema; everything checked here is a declaration bug, not a
//! value bug.

use std::collections::HashSet;

use regex::Regex;

use crate::error::BridgeError;
use crate::runtime::curry::MAX_ARITY;
use crate::runtime::native::NativeValue;
use crate::schema::{ConstMapping, FnMapping, Mapping, ModuleSchema, Presence};

pub fn validate_module_schema(schema: &ModuleSchema) -> Result<(), BridgeError> {
    let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    check_ident(&ident, &schema.name, "module name")?;

    let mut type_names = HashSet::new();
    for (name, mapping) in &schema.types {
        check_ident(&ident, name, "type name")?;
        if !type_names.insert(name.as_str()) {
            return Err(invalid(format!(
                "E_DUP_TYPE: duplicate type declaration '{}'",
                name
            )));
        }
        validate_mapping(&ident, mapping)?;
    }

    let mut export_names = HashSet::new();
    for function in &schema.functions {
        validate_function(&ident, function)?;
        if !export_names.insert(function.name.as_str()) {
            return Err(invalid(format!(
                "E_DUP_EXPORT: duplicate export '{}'",
                function.name
            )));
        }
    }
    for constant in &schema.constants {
        validate_constant(&ident, constant)?;
        if !export_names.insert(constant.name.as_str()) {
            return Err(invalid(format!(
                "E_DUP_EXPORT: duplicate export '{}'",
                constant.name
            )));
        }
    }

    Ok(())
}

fn validate_function(ident: &Regex, function: &FnMapping) -> Result<(), BridgeError> {
    check_ident(ident, &function.name, "export name")?;

    if function.arity() == 0 || function.arity() > MAX_ARITY {
        return Err(invalid(format!(
            "E_ARITY_RANGE: function '{}' declares arity {}, supported range is 1..={}",
            function.name,
            function.arity(),
            MAX_ARITY
        )));
    }

    let mut param_names = HashSet::new();
    for param in &function.params {
        check_ident(ident, &param.name, "parameter name")?;
        if !param_names.insert(param.name.as_str()) {
            return Err(invalid(format!(
                "E_DUP_PARAM: duplicate parameter '{}' in function '{}'",
                param.name, function.name
            )));
        }
        validate_mapping(ident, &param.mapping)?;
        validate_default(&param.name, &param.mapping, &param.presence)?;
    }

    validate_mapping(ident, &function.result)
}

fn validate_constant(ident: &Regex, constant: &ConstMapping) -> Result<(), BridgeError> {
    check_ident(ident, &constant.name, "export name")?;
    validate_mapping(ident, &constant.mapping)
}

fn validate_mapping(ident: &Regex, mapping: &Mapping) -> Result<(), BridgeError> {
    match mapping {
        Mapping::Bool
        | Mapping::Int
        | Mapping::Float
        | Mapping::Str
        | Mapping::Unit
        | Mapping::Opaque => Ok(()),
        Mapping::Option(inner) | Mapping::Array(inner) | Mapping::List(inner) => {
            validate_mapping(ident, inner)
        }
        Mapping::Record(rec) => {
            if rec.fields.is_empty() {
                return Err(invalid("E_EMPTY_RECORD: record declares no fields".to_string()));
            }
            let mut field_names = HashSet::new();
            for field in &rec.fields {
                check_ident(ident, &field.name, "field name")?;
                if !field_names.insert(field.name.as_str()) {
                    return Err(invalid(format!(
                        "E_DUP_FIELD: duplicate field '{}'",
                        field.name
                    )));
                }
                validate_mapping(ident, &field.mapping)?;
                validate_default(&field.name, &field.mapping, &field.presence)?;
            }
            Ok(())
        }
        Mapping::Variant(var) => {
            if var.cases().is_empty() {
                return Err(invalid(
                    "E_EMPTY_VARIANT: variant declares no constructors".to_string(),
                ));
            }
            // Duplicate labels cannot reach this point; table construction
            // already rejects them.
            for case in var.cases() {
                check_ident(ident, &case.label, "constructor label")?;
                if let Some(payload) = &case.payload {
                    validate_mapping(ident, payload)?;
                }
            }
            Ok(())
        }
    }
}

/// A declared default must be a scalar of the member's own mapping kind.
fn validate_default(
    member: &str,
    mapping: &Mapping,
    presence: &Presence,
) -> Result<(), BridgeError> {
    let default = match presence {
        Presence::Defaulted(default) => default,
        _ => return Ok(()),
    };
    let matches_mapping = matches!(
        (mapping, default),
        (Mapping::Bool, NativeValue::Bool(_))
            | (Mapping::Int, NativeValue::Int(_))
            | (Mapping::Float, NativeValue::Float(_))
            | (Mapping::Str, NativeValue::Str(_))
    );
    if matches_mapping {
        Ok(())
    } else {
        Err(invalid(format!(
            "E_BAD_DEFAULT: default for '{}' is a {} but the mapping expects {}",
            member,
            default.kind(),
            kind_name(mapping)
        )))
    }
}

fn check_ident(ident: &Regex, name: &str, what: &str) -> Result<(), BridgeError> {
    if ident.is_match(name) {
        Ok(())
    } else {
        Err(invalid(format!("E_BAD_IDENT: {} '{}' is not a valid identifier", what, name)))
    }
}

fn kind_name(mapping: &Mapping) -> &'static str {
    match mapping {
        Mapping::Bool => "bool",
        Mapping::Int => "int",
        Mapping::Float => "float",
        Mapping::Str => "string",
        Mapping::Unit => "unit",
        Mapping::Opaque => "opaque",
        Mapping::Option(_) => "option",
        Mapping::Array(_) => "array",
        Mapping::List(_) => "list",
        Mapping::Record(_) => "record",
        Mapping::Variant(_) => "variant",
    }
}

fn invalid(message: String) -> BridgeError {
    BridgeError::Invalid(message)
}
