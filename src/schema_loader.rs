//! Declaration file loading and saving.
//!
//! A declaration file is the JSON a binding generator emits for one module:
//! named type mappings plus export signatures. Named references (`{"ref":
//! "name"}`) may point at any earlier declaration and are inlined while
//! loading, so a loaded schema is self-contained and conversion never needs
//! a lookup context. Saving writes the resolved form back out.

use std::fs;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::BridgeError;
use crate::schema::{
    ArgStyle, CaseMapping, ConstMapping, FieldMapping, FnMapping, Mapping, ModuleSchema,
    ParamMapping, Presence, RecordMapping, VariantMapping,
};
use crate::runtime::native::NativeValue;

// ============================================================================
// File API
// ============================================================================

pub fn load_schema_file(path: &str) -> Result<ModuleSchema, BridgeError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| BridgeError::Parse(format!("{}: {}", path, e)))?;
    let schema = module_schema_from_json(&value)?;
    debug!(
        module = %schema.name,
        types = schema.types.len(),
        functions = schema.functions.len(),
        "loaded module schema"
    );
    Ok(schema)
}

pub fn save_schema_file(path: &str, schema: &ModuleSchema) -> Result<(), BridgeError> {
    let value = module_schema_to_json(schema);
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| BridgeError::Parse(e.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}

// ============================================================================
// Deserialization
// ============================================================================

pub fn module_schema_from_json(value: &Value) -> Result<ModuleSchema, BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::parse("schema must be an object"))?;
    let name = obj
        .get("module")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::parse("schema missing 'module' name"))?;

    let mut schema = ModuleSchema::new(name);

    if let Some(types) = obj.get("types") {
        let list = types
            .as_array()
            .ok_or_else(|| BridgeError::parse("'types' must be an array"))?;
        for decl in list {
            let decl_obj = decl
                .as_object()
                .ok_or_else(|| BridgeError::parse("type declaration must be an object"))?;
            let type_name = decl_obj
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| BridgeError::parse("type declaration missing 'name'"))?;
            let mapping_val = decl_obj.get("mapping").ok_or_else(|| {
                BridgeError::Parse(format!("type '{}' missing 'mapping'", type_name))
            })?;
            // Each declaration may reference only the ones before it, which
            // rules out cycles without a separate occurs check.
            let mapping = mapping_from_json(mapping_val, &schema.types)?;
            schema.types.push((type_name.to_string(), mapping));
        }
    }

    if let Some(functions) = obj.get("functions") {
        let list = functions
            .as_array()
            .ok_or_else(|| BridgeError::parse("'functions' must be an array"))?;
        for decl in list {
            schema.functions.push(fn_from_json(decl, &schema.types)?);
        }
    }

    if let Some(constants) = obj.get("constants") {
        let list = constants
            .as_array()
            .ok_or_else(|| BridgeError::parse("'constants' must be an array"))?;
        for decl in list {
            schema.constants.push(const_from_json(decl, &schema.types)?);
        }
    }

    Ok(schema)
}

fn mapping_from_json(
    value: &Value,
    types: &[(String, Mapping)],
) -> Result<Mapping, BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::parse("mapping must be an object"))?;

    if let Some(reference) = obj.get("ref") {
        let name = reference
            .as_str()
            .ok_or_else(|| BridgeError::parse("'ref' must be a string"))?;
        return match types.iter().find(|(n, _)| n == name) {
            Some((_, mapping)) => Ok(mapping.clone()),
            None => Err(BridgeError::UnknownTypeRef {
                name: name.to_string(),
            }),
        };
    }

    let kind = obj
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::parse("mapping missing 'kind'"))?;

    match kind {
        "bool" => Ok(Mapping::Bool),
        "int" => Ok(Mapping::Int),
        "float" => Ok(Mapping::Float),
        "str" => Ok(Mapping::Str),
        "unit" => Ok(Mapping::Unit),
        "opaque" => Ok(Mapping::Opaque),
        "option" => {
            let inner = obj
                .get("inner")
                .ok_or_else(|| BridgeError::parse("option mapping missing 'inner'"))?;
            Ok(Mapping::option(mapping_from_json(inner, types)?))
        }
        "array" => {
            let elem = obj
                .get("elem")
                .ok_or_else(|| BridgeError::parse("array mapping missing 'elem'"))?;
            Ok(Mapping::array(mapping_from_json(elem, types)?))
        }
        "list" => {
            let elem = obj
                .get("elem")
                .ok_or_else(|| BridgeError::parse("list mapping missing 'elem'"))?;
            Ok(Mapping::list(mapping_from_json(elem, types)?))
        }
        "record" => {
            let fields_val = obj
                .get("fields")
                .and_then(|v| v.as_array())
                .ok_or_else(|| BridgeError::parse("record mapping missing 'fields' array"))?;
            let mut fields = Vec::new();
            for field in fields_val {
                fields.push(field_from_json(field, types)?);
            }
            Ok(Mapping::Record(RecordMapping::new(fields)))
        }
        "variant" => {
            let cases_val = obj
                .get("cases")
                .and_then(|v| v.as_array())
                .ok_or_else(|| BridgeError::parse("variant mapping missing 'cases' array"))?;
            let mut cases = Vec::new();
            for case in cases_val {
                cases.push(case_from_json(case, types)?);
            }
            Ok(Mapping::Variant(VariantMapping::new(cases)?))
        }
        other => Err(BridgeError::Parse(format!(
            "unknown mapping kind '{}'",
            other
        ))),
    }
}

fn case_from_json(value: &Value, types: &[(String, Mapping)]) -> Result<CaseMapping, BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::parse("variant case must be an object"))?;
    let label = obj
        .get("label")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::parse("variant case missing 'label'"))?;
    let payload = match obj.get("payload") {
        Some(payload_val) => Some(mapping_from_json(payload_val, types)?),
        None => None,
    };
    Ok(CaseMapping {
        label: label.to_string(),
        payload,
    })
}

fn field_from_json(
    value: &Value,
    types: &[(String, Mapping)],
) -> Result<FieldMapping, BridgeError> {
    let (name, mapping, presence) = member_from_json(value, types, "field")?;
    Ok(FieldMapping {
        name,
        mapping,
        presence,
    })
}

fn param_from_json(
    value: &Value,
    types: &[(String, Mapping)],
) -> Result<ParamMapping, BridgeError> {
    let (name, mapping, presence) = member_from_json(value, types, "param")?;
    Ok(ParamMapping {
        name,
        mapping,
        presence,
    })
}

/// Shared shape of record fields and function parameters:
/// `{"name": ..., "mapping": ..., "presence"?: ...}`.
fn member_from_json(
    value: &Value,
    types: &[(String, Mapping)],
    what: &str,
) -> Result<(String, Mapping, Presence), BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::Parse(format!("{} must be an object", what)))?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::Parse(format!("{} missing 'name'", what)))?;
    let mapping_val = obj
        .get("mapping")
        .ok_or_else(|| BridgeError::Parse(format!("{} '{}' missing 'mapping'", what, name)))?;
    let mapping = mapping_from_json(mapping_val, types)?;
    let presence = presence_from_json(obj.get("presence"), &mapping, name)?;
    Ok((name.to_string(), mapping, presence))
}

fn presence_from_json(
    value: Option<&Value>,
    mapping: &Mapping,
    member: &str,
) -> Result<Presence, BridgeError> {
    match value {
        None => Ok(Presence::Required),
        Some(Value::String(s)) => match s.as_str() {
            "required" => Ok(Presence::Required),
            "optional" => Ok(Presence::Optional),
            other => Err(BridgeError::Parse(format!(
                "unknown presence '{}' for '{}'",
                other, member
            ))),
        },
        Some(Value::Object(obj)) => {
            let default = obj.get("default").ok_or_else(|| {
                BridgeError::Parse(format!("presence object for '{}' missing 'default'", member))
            })?;
            Ok(Presence::Defaulted(default_from_json(default, mapping, member)?))
        }
        Some(_) => Err(BridgeError::Parse(format!(
            "presence for '{}' must be a string or a default object",
            member
        ))),
    }
}

/// A declared default is typed by the member's own mapping, so `7` under a
/// float mapping becomes a native float, not an int.
fn default_from_json(
    value: &Value,
    mapping: &Mapping,
    member: &str,
) -> Result<NativeValue, BridgeError> {
    match mapping {
        Mapping::Bool => value.as_bool().map(NativeValue::Bool).ok_or_else(|| {
            BridgeError::Parse(format!("default for bool member '{}' must be a bool", member))
        }),
        Mapping::Int => value.as_i64().map(NativeValue::Int).ok_or_else(|| {
            BridgeError::Parse(format!("default for int member '{}' must be an integer", member))
        }),
        Mapping::Float => value.as_f64().map(NativeValue::Float).ok_or_else(|| {
            BridgeError::Parse(format!("default for float member '{}' must be a number", member))
        }),
        Mapping::Str => value
            .as_str()
            .map(|s| NativeValue::Str(s.to_string()))
            .ok_or_else(|| {
                BridgeError::Parse(format!(
                    "default for string member '{}' must be a string",
                    member
                ))
            }),
        _ => Err(BridgeError::Parse(format!(
            "default for '{}': defaults are only supported for scalar mappings",
            member
        ))),
    }
}

fn fn_from_json(value: &Value, types: &[(String, Mapping)]) -> Result<FnMapping, BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::parse("function declaration must be an object"))?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::parse("function declaration missing 'name'"))?;

    let params_val = obj
        .get("params")
        .and_then(|v| v.as_array())
        .ok_or_else(|| BridgeError::Parse(format!("function '{}' missing 'params' array", name)))?;
    let mut params = Vec::new();
    for param in params_val {
        params.push(param_from_json(param, types)?);
    }

    let result_val = obj
        .get("result")
        .ok_or_else(|| BridgeError::Parse(format!("function '{}' missing 'result'", name)))?;
    let result = mapping_from_json(result_val, types)?;

    let arg_style = match obj.get("argStyle") {
        None => ArgStyle::Positional,
        Some(style) => match style.as_str() {
            Some("named") => ArgStyle::NamedObject,
            Some("positional") => ArgStyle::Positional,
            _ => {
                return Err(BridgeError::Parse(format!(
                    "function '{}': argStyle must be \"named\" or \"positional\"",
                    name
                )))
            }
        },
    };

    Ok(FnMapping {
        name: name.to_string(),
        params,
        result,
        arg_style,
    })
}

fn const_from_json(value: &Value, types: &[(String, Mapping)]) -> Result<ConstMapping, BridgeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BridgeError::parse("constant declaration must be an object"))?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BridgeError::parse("constant declaration missing 'name'"))?;
    let mapping_val = obj
        .get("mapping")
        .ok_or_else(|| BridgeError::Parse(format!("constant '{}' missing 'mapping'", name)))?;
    Ok(ConstMapping {
        name: name.to_string(),
        mapping: mapping_from_json(mapping_val, types)?,
    })
}

// ============================================================================
// Serialization
// ============================================================================

pub fn module_schema_to_json(schema: &ModuleSchema) -> Value {
    let types: Vec<Value> = schema
        .types
        .iter()
        .map(|(name, mapping)| json!({ "name": name, "mapping": mapping_to_json(mapping) }))
        .collect();
    let functions: Vec<Value> = schema.functions.iter().map(fn_to_json).collect();
    let constants: Vec<Value> = schema
        .constants
        .iter()
        .map(|c| json!({ "name": c.name, "mapping": mapping_to_json(&c.mapping) }))
        .collect();

    json!({
        "module": schema.name,
        "types": types,
        "functions": functions,
        "constants": constants,
    })
}

fn mapping_to_json(mapping: &Mapping) -> Value {
    match mapping {
        Mapping::Bool => json!({ "kind": "bool" }),
        Mapping::Int => json!({ "kind": "int" }),
        Mapping::Float => json!({ "kind": "float" }),
        Mapping::Str => json!({ "kind": "str" }),
        Mapping::Unit => json!({ "kind": "unit" }),
        Mapping::Opaque => json!({ "kind": "opaque" }),
        Mapping::Option(inner) => json!({ "kind": "option", "inner": mapping_to_json(inner) }),
        Mapping::Array(elem) => json!({ "kind": "array", "elem": mapping_to_json(elem) }),
        Mapping::List(elem) => json!({ "kind": "list", "elem": mapping_to_json(elem) }),
        Mapping::Record(rec) => {
            let fields: Vec<Value> = rec
                .fields
                .iter()
                .map(|f| member_to_json(&f.name, &f.mapping, &f.presence))
                .collect();
            json!({ "kind": "record", "fields": fields })
        }
        Mapping::Variant(var) => {
            let cases: Vec<Value> = var
                .cases()
                .iter()
                .map(|case| match &case.payload {
                    None => json!({ "label": case.label }),
                    Some(payload) => {
                        json!({ "label": case.label, "payload": mapping_to_json(payload) })
                    }
                })
                .collect();
            json!({ "kind": "variant", "cases": cases })
        }
    }
}

fn member_to_json(name: &str, mapping: &Mapping, presence: &Presence) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("name".to_string(), json!(name));
    obj.insert("mapping".to_string(), mapping_to_json(mapping));
    if let Some(presence_val) = presence_to_json(presence) {
        obj.insert("presence".to_string(), presence_val);
    }
    Value::Object(obj)
}

fn presence_to_json(presence: &Presence) -> Option<Value> {
    match presence {
        Presence::Required => None,
        Presence::Optional => Some(json!("optional")),
        Presence::Defaulted(default) => {
            let scalar = match default {
                NativeValue::Bool(b) => json!(b),
                NativeValue::Int(n) => json!(n),
                NativeValue::Float(x) => json!(x),
                NativeValue::Str(s) => json!(s),
                _ => Value::Null,
            };
            Some(json!({ "default": scalar }))
        }
    }
}

fn fn_to_json(sig: &FnMapping) -> Value {
    let params: Vec<Value> = sig
        .params
        .iter()
        .map(|p| member_to_json(&p.name, &p.mapping, &p.presence))
        .collect();
    let arg_style = match sig.arg_style {
        ArgStyle::NamedObject => "named",
        ArgStyle::Positional => "positional",
    };
    json!({
        "name": sig.name,
        "argStyle": arg_style,
        "params": params,
        "result": mapping_to_json(&sig.result),
    })
}
