//! Unit tests for declaration files and structural validation.
//!
//! Parsing, reference inlining, the JSON round trip, file IO through real
//! temp files, and every validator rejection code.

use serde_json::json;

use crate::error::BridgeError;
use crate::runtime::curry::MAX_ARITY;
use crate::runtime::native::NativeValue;
use crate::schema::{
    ArgStyle, CaseIndex, CaseMapping, ConstMapping, FieldMapping, FnMapping, Mapping,
    ModuleSchema, ParamMapping, Presence, RecordMapping, VariantMapping,
};
use crate::schema_loader::{
    load_schema_file, module_schema_from_json, module_schema_to_json, save_schema_file,
};
use crate::schema_validator::validate_module_schema;

/// A declaration exercising every mapping kind, both presence forms, a
/// typed default, and both argument styles.
fn demo_json() -> serde_json::Value {
    json!({
        "module": "Demo",
        "types": [
            {
                "name": "color",
                "mapping": {
                    "kind": "variant",
                    "cases": [
                        { "label": "A" },
                        { "label": "B", "payload": { "kind": "int" } },
                        { "label": "C", "payload": { "kind": "str" } }
                    ]
                }
            },
            {
                "name": "point",
                "mapping": {
                    "kind": "record",
                    "fields": [
                        { "name": "x", "mapping": { "kind": "int" } },
                        { "name": "y", "mapping": { "kind": "int" }, "presence": "required" },
                        { "name": "label", "mapping": { "kind": "str" }, "presence": "optional" },
                        { "name": "scale", "mapping": { "kind": "float" }, "presence": { "default": 1 } }
                    ]
                }
            }
        ],
        "functions": [
            {
                "name": "make",
                "argStyle": "named",
                "params": [
                    { "name": "visible", "mapping": { "kind": "bool" }, "presence": "optional" },
                    { "name": "origin", "mapping": { "ref": "point" } },
                    { "name": "tags", "mapping": { "kind": "list", "elem": { "kind": "str" } }, "presence": "optional" },
                    { "name": "children", "mapping": { "kind": "opaque" }, "presence": "optional" }
                ],
                "result": { "kind": "opaque" }
            },
            {
                "name": "reset",
                "params": [
                    { "name": "force", "mapping": { "kind": "option", "inner": { "kind": "bool" } } }
                ],
                "result": { "kind": "unit" }
            }
        ],
        "constants": [
            { "name": "palette", "mapping": { "kind": "array", "elem": { "ref": "color" } } }
        ]
    })
}

/// Unwrap a validator rejection down to its coded message.
fn invalid_code(err: BridgeError) -> String {
    match err {
        BridgeError::Invalid(msg) => msg,
        other => panic!("expected Invalid, got {:?}", other),
    }
}

// ============================================================================
// Parsing Tests
// ============================================================================

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_full_schema_parses() {
        let schema = module_schema_from_json(&demo_json()).unwrap();

        assert_eq!(schema.name, "Demo");
        assert_eq!(schema.types.len(), 2);
        assert_eq!(schema.functions.len(), 2);
        assert_eq!(schema.constants.len(), 1);

        let make = schema.function("make").unwrap();
        assert_eq!(make.arity(), 4);
        assert_eq!(make.arg_style, ArgStyle::NamedObject);
        assert!(!make.is_passthrough());
    }

    #[test]
    fn test_variant_tables_derive_from_declaration_order() {
        let schema = module_schema_from_json(&demo_json()).unwrap();

        let color = match schema.type_named("color").unwrap() {
            Mapping::Variant(var) => var,
            other => panic!("expected variant, got {:?}", other),
        };
        assert_eq!(color.case_index("A"), Some(CaseIndex::Nullary(0)));
        assert_eq!(color.case_index("B"), Some(CaseIndex::Block(0)));
        assert_eq!(color.case_index("C"), Some(CaseIndex::Block(1)));
    }

    #[test]
    fn test_presence_forms_parse() {
        let schema = module_schema_from_json(&demo_json()).unwrap();

        let point = match schema.type_named("point").unwrap() {
            Mapping::Record(rec) => rec,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(point.fields[0].presence, Presence::Required);
        assert_eq!(point.fields[1].presence, Presence::Required);
        assert_eq!(point.fields[2].presence, Presence::Optional);
        // The default was written as the integer 1 but the field maps to a
        // float, so it parses as a native float.
        assert_eq!(
            point.fields[3].presence,
            Presence::Defaulted(NativeValue::Float(1.0))
        );
    }

    #[test]
    fn test_ref_inlines_earlier_declaration() {
        let schema = module_schema_from_json(&demo_json()).unwrap();

        let point = schema.type_named("point").unwrap().clone();
        let make = schema.function("make").unwrap();
        assert_eq!(make.params[1].mapping, point);
    }

    #[test]
    fn test_forward_ref_rejected() {
        let value = json!({
            "module": "Demo",
            "types": [
                {
                    "name": "pair",
                    "mapping": {
                        "kind": "record",
                        "fields": [
                            { "name": "origin", "mapping": { "ref": "point" } }
                        ]
                    }
                },
                { "name": "point", "mapping": { "kind": "int" } }
            ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        match err {
            BridgeError::UnknownTypeRef { name } => assert_eq!(name, "point"),
            other => panic!("expected UnknownTypeRef, got {:?}", other),
        }
    }

    #[test]
    fn test_arg_style_defaults_to_positional() {
        let schema = module_schema_from_json(&demo_json()).unwrap();
        assert_eq!(schema.function("reset").unwrap().arg_style, ArgStyle::Positional);
    }

    #[test]
    fn test_missing_module_name_rejected() {
        let err = module_schema_from_json(&json!({ "types": [] })).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[test]
    fn test_missing_mapping_kind_rejected() {
        let value = json!({
            "module": "Demo",
            "types": [ { "name": "t", "mapping": { "inner": { "kind": "int" } } } ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        match err {
            BridgeError::Parse(msg) => assert!(msg.contains("kind")),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mapping_kind_rejected() {
        let value = json!({
            "module": "Demo",
            "types": [ { "name": "t", "mapping": { "kind": "tuple" } } ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[test]
    fn test_missing_function_result_rejected() {
        let value = json!({
            "module": "Demo",
            "functions": [ { "name": "f", "params": [] } ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        match err {
            BridgeError::Parse(msg) => assert!(msg.contains("result")),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_arg_style_rejected() {
        let value = json!({
            "module": "Demo",
            "functions": [
                {
                    "name": "f",
                    "argStyle": "curried",
                    "params": [ { "name": "a", "mapping": { "kind": "int" } } ],
                    "result": { "kind": "int" }
                }
            ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[test]
    fn test_default_must_match_the_scalar_mapping() {
        let value = json!({
            "module": "Demo",
            "types": [
                {
                    "name": "t",
                    "mapping": {
                        "kind": "record",
                        "fields": [
                            { "name": "n", "mapping": { "kind": "int" }, "presence": { "default": "seven" } }
                        ]
                    }
                }
            ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[test]
    fn test_default_on_composite_mapping_rejected() {
        let value = json!({
            "module": "Demo",
            "types": [
                {
                    "name": "t",
                    "mapping": {
                        "kind": "record",
                        "fields": [
                            {
                                "name": "items",
                                "mapping": { "kind": "array", "elem": { "kind": "int" } },
                                "presence": { "default": 0 }
                            }
                        ]
                    }
                }
            ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        match err {
            BridgeError::Parse(msg) => assert!(msg.contains("scalar")),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_labels_rejected_while_parsing() {
        let value = json!({
            "module": "Demo",
            "types": [
                {
                    "name": "t",
                    "mapping": {
                        "kind": "variant",
                        "cases": [ { "label": "A" }, { "label": "A" } ]
                    }
                }
            ]
        });

        let err = module_schema_from_json(&value).unwrap_err();
        assert!(invalid_code(err).starts_with("E_DUP_LABEL"));
    }
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[cfg(test)]
mod serialize_tests {
    use super::*;

    #[test]
    fn test_schema_survives_json_round_trip() {
        let schema = module_schema_from_json(&demo_json()).unwrap();

        let written = module_schema_to_json(&schema);
        let reread = module_schema_from_json(&written).unwrap();
        assert_eq!(reread, schema);
    }

    #[test]
    fn test_required_presence_stays_implicit() {
        let schema = module_schema_from_json(&demo_json()).unwrap();
        let written = module_schema_to_json(&schema);

        let fields = written
            .pointer("/types/1/mapping/fields")
            .and_then(|v| v.as_array())
            .unwrap();
        assert_eq!(fields[0].get("presence"), None);
        assert_eq!(fields[2].get("presence"), Some(&json!("optional")));
        assert_eq!(
            fields[3].get("presence"),
            Some(&json!({ "default": 1.0 }))
        );
    }

    #[test]
    fn test_arg_style_always_written() {
        let schema = module_schema_from_json(&demo_json()).unwrap();
        let written = module_schema_to_json(&schema);

        assert_eq!(
            written.pointer("/functions/0/argStyle"),
            Some(&json!("named"))
        );
        assert_eq!(
            written.pointer("/functions/1/argStyle"),
            Some(&json!("positional"))
        );
    }

    #[test]
    fn test_refs_write_back_inlined() {
        let schema = module_schema_from_json(&demo_json()).unwrap();
        let written = module_schema_to_json(&schema);

        // The param declared as {"ref": "point"} serializes as the full
        // record; loaded schemas are self-contained.
        assert_eq!(
            written.pointer("/functions/0/params/1/mapping/kind"),
            Some(&json!("record"))
        );
    }
}

// ============================================================================
// File IO Tests
// ============================================================================

#[cfg(test)]
mod file_tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        let path = path.to_str().unwrap();
        let schema = module_schema_from_json(&demo_json()).unwrap();

        save_schema_file(path, &schema).unwrap();
        let reloaded = load_schema_file(path).unwrap();
        assert_eq!(reloaded, schema);
    }

    #[test]
    fn test_load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_schema_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }

    #[test]
    fn test_load_unparseable_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "module: Demo").unwrap();

        let err = load_schema_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }
}

// ============================================================================
// Validator Tests
// ============================================================================

#[cfg(test)]
mod validator_tests {
    use super::*;

    fn int_fn(name: &str) -> FnMapping {
        FnMapping {
            name: name.to_string(),
            params: vec![ParamMapping::required("n", Mapping::Int)],
            result: Mapping::Int,
            arg_style: ArgStyle::Positional,
        }
    }

    #[test]
    fn test_well_formed_schema_passes() {
        let schema = module_schema_from_json(&demo_json()).unwrap();
        validate_module_schema(&schema).unwrap();
    }

    #[test]
    fn test_module_name_must_be_an_identifier() {
        let schema = ModuleSchema::new("not a module!");
        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_BAD_IDENT"));
    }

    #[test]
    fn test_duplicate_type_declarations_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push(("t".to_string(), Mapping::Int));
        schema.types.push(("t".to_string(), Mapping::Str));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_DUP_TYPE"));
    }

    #[test]
    fn test_export_names_shared_across_kinds() {
        // A function and a constant under one name collide.
        let mut schema = ModuleSchema::new("Demo");
        schema.functions.push(int_fn("value"));
        schema.constants.push(ConstMapping {
            name: "value".to_string(),
            mapping: Mapping::Int,
        });

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_DUP_EXPORT"));
    }

    #[test]
    fn test_duplicate_function_exports_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.functions.push(int_fn("f"));
        schema.functions.push(int_fn("f"));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_DUP_EXPORT"));
    }

    #[test]
    fn test_zero_arity_function_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.functions.push(FnMapping {
            name: "f".to_string(),
            params: vec![],
            result: Mapping::Unit,
            arg_style: ArgStyle::Positional,
        });

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_ARITY_RANGE"));
    }

    #[test]
    fn test_arity_above_entry_point_range_rejected() {
        let params = (0..=MAX_ARITY)
            .map(|i| ParamMapping::required(&format!("p{}", i), Mapping::Int))
            .collect();
        let mut schema = ModuleSchema::new("Demo");
        schema.functions.push(FnMapping {
            name: "wide".to_string(),
            params,
            result: Mapping::Unit,
            arg_style: ArgStyle::Positional,
        });

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_ARITY_RANGE"));
    }

    #[test]
    fn test_duplicate_parameter_names_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.functions.push(FnMapping {
            name: "f".to_string(),
            params: vec![
                ParamMapping::required("a", Mapping::Int),
                ParamMapping::required("a", Mapping::Str),
            ],
            result: Mapping::Unit,
            arg_style: ArgStyle::Positional,
        });

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_DUP_PARAM"));
    }

    #[test]
    fn test_empty_record_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema
            .types
            .push(("t".to_string(), Mapping::Record(RecordMapping::new(vec![]))));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_EMPTY_RECORD"));
    }

    #[test]
    fn test_empty_variant_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::Variant(VariantMapping::new(vec![]).unwrap()),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_EMPTY_VARIANT"));
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::Record(RecordMapping::new(vec![
                FieldMapping::required("x", Mapping::Int),
                FieldMapping::required("x", Mapping::Str),
            ])),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_DUP_FIELD"));
    }

    #[test]
    fn test_field_names_must_be_identifiers() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::Record(RecordMapping::new(vec![FieldMapping::required(
                "no spaces",
                Mapping::Int,
            )])),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_BAD_IDENT"));
    }

    #[test]
    fn test_constructor_labels_must_be_identifiers() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::Variant(VariantMapping::new(vec![CaseMapping::nullary("1st")]).unwrap()),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_BAD_IDENT"));
    }

    #[test]
    fn test_default_kind_must_match_mapping_kind() {
        // Programmatically built schemas bypass the loader's typed-default
        // parsing, so the validator re-checks the pairing.
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::Record(RecordMapping::new(vec![FieldMapping {
                name: "n".to_string(),
                mapping: Mapping::Int,
                presence: Presence::Defaulted(NativeValue::str("seven")),
            }])),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_BAD_DEFAULT"));
    }

    #[test]
    fn test_nested_mappings_validated() {
        let mut schema = ModuleSchema::new("Demo");
        schema.types.push((
            "t".to_string(),
            Mapping::option(Mapping::Record(RecordMapping::new(vec![]))),
        ));

        let code = invalid_code(validate_module_schema(&schema).unwrap_err());
        assert!(code.starts_with("E_EMPTY_RECORD"));
    }
}
