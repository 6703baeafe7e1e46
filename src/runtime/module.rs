//! Native module registration and schema binding.
//!
//! A `NativeModule` is the runtime side's export table: curried function
//! values and plain constant values under export names. Binding a
//! `ModuleSchema` against it wires every declared export to its adapter and
//! is where declaration drift (missing exports, wrong kinds, wrong arities)
//! is caught, before any call happens.

use std::collections::HashMap;

use tracing::debug;

use crate::error::BridgeError;
use crate::runtime::adapter::{CallArgs, FnAdapter};
use crate::runtime::convert::from_native;
use crate::runtime::curry::NativeFun;
use crate::runtime::native::NativeValue;
use crate::runtime::surface::SurfaceValue;
use crate::schema::ModuleSchema;

/// One registered native export.
#[derive(Clone, Debug)]
pub enum Export {
    Function(NativeFun),
    Constant(NativeValue),
}

#[derive(Clone, Debug)]
pub struct NativeModule {
    name: String,
    exports: HashMap<String, Export>,
}

impl NativeModule {
    pub fn new(name: &str) -> Self {
        NativeModule {
            name: name.to_string(),
            exports: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_fn(&mut self, name: &str, fun: NativeFun) {
        self.exports.insert(name.to_string(), Export::Function(fun));
    }

    pub fn register_const(&mut self, name: &str, value: NativeValue) {
        self.exports
            .insert(name.to_string(), Export::Constant(value));
    }

    pub fn lookup(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }
}

/// A schema bound against a native module: one adapter per declared
/// function, constants already converted to their surface form.
///
/// The schema selects the public surface; native exports it does not name
/// stay unreachable through the bound module.
#[derive(Clone, Debug)]
pub struct BoundModule {
    name: String,
    adapters: HashMap<String, FnAdapter>,
    constants: HashMap<String, SurfaceValue>,
}

impl BoundModule {
    pub fn bind(schema: &ModuleSchema, module: &NativeModule) -> Result<BoundModule, BridgeError> {
        debug!(
            module = %schema.name,
            functions = schema.functions.len(),
            constants = schema.constants.len(),
            "binding module schema"
        );

        let mut adapters = HashMap::new();
        for sig in &schema.functions {
            match module.lookup(&sig.name) {
                Some(Export::Function(fun)) => {
                    let adapter = FnAdapter::bind(sig, fun.clone())?;
                    adapters.insert(sig.name.clone(), adapter);
                }
                Some(Export::Constant(_)) => {
                    return Err(BridgeError::ExportKind {
                        name: sig.name.clone(),
                        expected: "function",
                        got: "constant",
                    });
                }
                None => {
                    return Err(BridgeError::UnknownExport {
                        name: sig.name.clone(),
                    });
                }
            }
        }

        let mut constants = HashMap::new();
        for decl in &schema.constants {
            match module.lookup(&decl.name) {
                Some(Export::Constant(value)) => {
                    let surface = from_native(value, &decl.mapping)?;
                    constants.insert(decl.name.clone(), surface);
                }
                Some(Export::Function(_)) => {
                    return Err(BridgeError::ExportKind {
                        name: decl.name.clone(),
                        expected: "constant",
                        got: "function",
                    });
                }
                None => {
                    return Err(BridgeError::UnknownExport {
                        name: decl.name.clone(),
                    });
                }
            }
        }

        Ok(BoundModule {
            name: schema.name.clone(),
            adapters,
            constants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self, name: &str) -> Option<&FnAdapter> {
        self.adapters.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&SurfaceValue> {
        self.constants.get(name)
    }

    /// Adapt a call to a declared export by name.
    pub fn call(&self, name: &str, args: &CallArgs) -> Result<SurfaceValue, BridgeError> {
        match self.adapters.get(name) {
            Some(adapter) => adapter.call(args),
            None => Err(BridgeError::UnknownExport {
                name: name.to_string(),
            }),
        }
    }
}
