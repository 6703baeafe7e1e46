use clap::{Arg, Command};

use seam_bridge::{
    from_native, load_schema_file, to_native, validate_module_schema, ArgStyle, BridgeError,
    Mapping, ModuleSchema, Presence, SurfaceValue,
};

fn main() {
    tracing_subscriber::fmt::init();

    let exit_code = (|| {
        let matches = Command::new("seam-bridge")
            .about("Schema tool for the surface/native marshalling boundary")
            .arg(
                Arg::new("validate")
                    .long("validate")
                    .help("Validate a declaration file and exit")
                    .value_name("SCHEMA")
                    .num_args(1),
            )
            .arg(
                Arg::new("inspect")
                    .long("inspect")
                    .help("Print a summary of a declaration file")
                    .value_name("SCHEMA")
                    .num_args(1),
            )
            .arg(
                Arg::new("convert")
                    .long("convert")
                    .help("Round-trip a JSON value through the native representation")
                    .value_name("SCHEMA")
                    .num_args(1)
                    .requires_all(["type", "value"]),
            )
            .arg(
                Arg::new("type")
                    .long("type")
                    .help("Declared type name to convert against")
                    .value_name("NAME")
                    .num_args(1),
            )
            .arg(
                Arg::new("value")
                    .long("value")
                    .help("Surface value as inline JSON")
                    .value_name("JSON")
                    .num_args(1),
            )
            .group(
                clap::ArgGroup::new("mode")
                    .args(["validate", "inspect", "convert"])
                    .required(true),
            )
            .get_matches();

        if let Some(path) = matches.get_one::<String>("validate") {
            return run(validate_schema(path));
        }
        if let Some(path) = matches.get_one::<String>("inspect") {
            return run(inspect_schema(path));
        }
        if let Some(path) = matches.get_one::<String>("convert") {
            let type_name = matches.get_one::<String>("type");
            let raw_value = matches.get_one::<String>("value");
            return match (type_name, raw_value) {
                (Some(type_name), Some(raw_value)) => {
                    run(convert_value(path, type_name, raw_value))
                }
                _ => {
                    eprintln!("Error: --convert requires --type and --value");
                    1
                }
            };
        }
        1
    })();

    std::process::exit(exit_code);
}

fn run(result: Result<(), BridgeError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn validate_schema(path: &str) -> Result<(), BridgeError> {
    let schema = load_schema_file(path)?;
    validate_module_schema(&schema)?;
    println!(
        "Schema OK: '{}' ({} types, {} functions, {} constants)",
        schema.name,
        schema.types.len(),
        schema.functions.len(),
        schema.constants.len()
    );
    Ok(())
}

fn inspect_schema(path: &str) -> Result<(), BridgeError> {
    let schema = load_schema_file(path)?;
    validate_module_schema(&schema)?;
    print_schema_summary(&schema);
    Ok(())
}

fn convert_value(path: &str, type_name: &str, raw_value: &str) -> Result<(), BridgeError> {
    let schema = load_schema_file(path)?;
    validate_module_schema(&schema)?;
    let mapping = schema
        .type_named(type_name)
        .ok_or_else(|| BridgeError::UnknownTypeRef {
            name: type_name.to_string(),
        })?;
    let json: serde_json::Value = serde_json::from_str(raw_value)
        .map_err(|e| BridgeError::Parse(format!("--value: {}", e)))?;

    let surface = SurfaceValue::from_json(&json, mapping);
    println!("surface: {}", surface);

    let native = to_native(&surface, mapping)?;
    println!("native:  {}", native);

    let back = from_native(&native, mapping)?;
    println!("back:    {}", back);
    println!("canonical: {}", back.to_json());

    if back == surface {
        println!("round-trip: ok");
    } else {
        println!("round-trip: differs (input was not in canonical form)");
    }
    Ok(())
}

// Print a textual summary of a declaration file
fn print_schema_summary(schema: &ModuleSchema) {
    println!("ModuleSchema '{}'", schema.name);

    println!();
    println!("Types:");
    for (name, mapping) in &schema.types {
        println!("  {} = {}", name, describe_mapping(mapping));
    }

    println!();
    println!("Functions:");
    for function in &schema.functions {
        let style = match function.arg_style {
            ArgStyle::NamedObject => "named",
            ArgStyle::Positional => "positional",
        };
        let passthrough = if function.is_passthrough() {
            " (passthrough)"
        } else {
            ""
        };
        println!(
            "  {}/{} {}{} -> {}",
            function.name,
            function.arity(),
            style,
            passthrough,
            describe_mapping(&function.result)
        );
    }

    if !schema.constants.is_empty() {
        println!();
        println!("Constants:");
        for constant in &schema.constants {
            println!("  {}: {}", constant.name, describe_mapping(&constant.mapping));
        }
    }
}

fn describe_mapping(mapping: &Mapping) -> String {
    match mapping {
        Mapping::Bool => "bool".to_string(),
        Mapping::Int => "int".to_string(),
        Mapping::Float => "float".to_string(),
        Mapping::Str => "str".to_string(),
        Mapping::Unit => "unit".to_string(),
        Mapping::Opaque => "opaque".to_string(),
        Mapping::Option(inner) => format!("option<{}>", describe_mapping(inner)),
        Mapping::Array(elem) => format!("array<{}>", describe_mapping(elem)),
        Mapping::List(elem) => format!("list<{}>", describe_mapping(elem)),
        Mapping::Record(rec) => {
            let fields: Vec<String> = rec
                .fields
                .iter()
                .map(|field| {
                    let marker = match field.presence {
                        Presence::Required => "",
                        Presence::Optional | Presence::Defaulted(_) => "?",
                    };
                    format!("{}{}: {}", field.name, marker, describe_mapping(&field.mapping))
                })
                .collect();
            format!("record{{{}}}", fields.join(", "))
        }
        Mapping::Variant(var) => {
            let cases: Vec<String> = var
                .cases()
                .iter()
                .map(|case| match &case.payload {
                    None => case.label.clone(),
                    Some(payload) => format!("{}({})", case.label, describe_mapping(payload)),
                })
                .collect();
            format!("variant({})", cases.join(", "))
        }
    }
}
