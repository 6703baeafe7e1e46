//! Per-export call adapters.
//!
//! Every exported native function gets exactly one adapter, shaped by its
//! declared signature: arguments are extracted in declared parameter order,
//! converted one by one, handed to the entry point matching the declared
//! arity, and the result converted back. The adapter is the only path from a
//! surface call to a native function.

use tracing::trace;

use crate::error::BridgeError;
use crate::runtime::convert::{from_native, member_to_native};
use crate::runtime::curry::NativeFun;
use crate::runtime::native::NativeValue;
use crate::runtime::surface::SurfaceValue;
use crate::schema::{ArgStyle, FnMapping};

/// Arguments of one surface call, in the style the signature declares.
#[derive(Clone, Debug, PartialEq)]
pub enum CallArgs {
    /// One object carrying the labeled parameters.
    Named(SurfaceValue),
    /// Arguments in declared order. An absent optional argument is passed
    /// as an explicit `Undefined` to keep its slot.
    Positional(Vec<SurfaceValue>),
}

#[derive(Clone, Debug)]
pub struct FnAdapter {
    name: String,
    sig: FnMapping,
    fun: NativeFun,
}

impl FnAdapter {
    /// Pair a declared signature with a native function value.
    ///
    /// The declared arity and the function's intrinsic arity must agree;
    /// binding is the earliest point where that drift can be caught.
    pub fn bind(sig: &FnMapping, fun: NativeFun) -> Result<FnAdapter, BridgeError> {
        if sig.arity() != fun.arity() {
            return Err(BridgeError::ArityMismatch {
                name: sig.name.clone(),
                expected: sig.arity(),
                got: fun.arity(),
            });
        }
        Ok(FnAdapter {
            name: sig.name.clone(),
            sig: sig.clone(),
            fun,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.sig.arity()
    }

    pub fn signature(&self) -> &FnMapping {
        &self.sig
    }

    /// True when every parameter and the result cross opaquely, mirroring a
    /// direct re-export.
    pub fn is_passthrough(&self) -> bool {
        self.sig.is_passthrough()
    }

    /// Adapt one surface call: extract, convert, invoke, convert back.
    pub fn call(&self, args: &CallArgs) -> Result<SurfaceValue, BridgeError> {
        trace!(export = %self.name, arity = self.sig.arity(), "adapting call");
        let natives = self.extract(args)?;
        let result = self.invoke(natives)?;
        from_native(&result, &self.sig.result)
    }

    /// Pull arguments out of the call in declared parameter order and
    /// convert each against its parameter mapping.
    fn extract(&self, args: &CallArgs) -> Result<Vec<NativeValue>, BridgeError> {
        match (self.sig.arg_style, args) {
            (ArgStyle::NamedObject, CallArgs::Named(obj)) => {
                if !matches!(obj, SurfaceValue::Object(_)) {
                    return Err(BridgeError::shape("object", obj.kind()));
                }
                let mut natives = Vec::with_capacity(self.sig.arity());
                for param in &self.sig.params {
                    let found = obj.field(&param.name);
                    natives.push(member_to_native(
                        found,
                        &param.name,
                        &param.mapping,
                        &param.presence,
                    )?);
                }
                Ok(natives)
            }
            (ArgStyle::Positional, CallArgs::Positional(list)) => {
                if list.len() != self.sig.arity() {
                    return Err(BridgeError::ArityMismatch {
                        name: self.name.clone(),
                        expected: self.sig.arity(),
                        got: list.len(),
                    });
                }
                let mut natives = Vec::with_capacity(self.sig.arity());
                for (param, value) in self.sig.params.iter().zip(list) {
                    natives.push(member_to_native(
                        Some(value),
                        &param.name,
                        &param.mapping,
                        &param.presence,
                    )?);
                }
                Ok(natives)
            }
            (ArgStyle::NamedObject, CallArgs::Positional(_)) => Err(BridgeError::ArgStyleMismatch {
                name: self.name.clone(),
                expected: "a named argument object",
            }),
            (ArgStyle::Positional, CallArgs::Named(_)) => Err(BridgeError::ArgStyleMismatch {
                name: self.name.clone(),
                expected: "positional arguments",
            }),
        }
    }

    /// Hand the converted arguments to the entry point for the declared
    /// arity. Each arm destructures the exact argument count, so a count
    /// drift surfaces as an error instead of a misnumbered invocation.
    fn invoke(&self, args: Vec<NativeValue>) -> Result<NativeValue, BridgeError> {
        let got = args.len();
        match self.sig.arity() {
            1 => match <[NativeValue; 1]>::try_from(args) {
                Ok([a]) => self.fun.call1(a),
                Err(_) => Err(self.arity_error(1, got)),
            },
            2 => match <[NativeValue; 2]>::try_from(args) {
                Ok([a, b]) => self.fun.call2(a, b),
                Err(_) => Err(self.arity_error(2, got)),
            },
            3 => match <[NativeValue; 3]>::try_from(args) {
                Ok([a, b, c]) => self.fun.call3(a, b, c),
                Err(_) => Err(self.arity_error(3, got)),
            },
            4 => match <[NativeValue; 4]>::try_from(args) {
                Ok([a, b, c, d]) => self.fun.call4(a, b, c, d),
                Err(_) => Err(self.arity_error(4, got)),
            },
            5 => match <[NativeValue; 5]>::try_from(args) {
                Ok([a, b, c, d, e]) => self.fun.call5(a, b, c, d, e),
                Err(_) => Err(self.arity_error(5, got)),
            },
            6 => match <[NativeValue; 6]>::try_from(args) {
                Ok([a, b, c, d, e, g]) => self.fun.call6(a, b, c, d, e, g),
                Err(_) => Err(self.arity_error(6, got)),
            },
            7 => match <[NativeValue; 7]>::try_from(args) {
                Ok([a, b, c, d, e, g, h]) => self.fun.call7(a, b, c, d, e, g, h),
                Err(_) => Err(self.arity_error(7, got)),
            },
            8 => match <[NativeValue; 8]>::try_from(args) {
                Ok([a, b, c, d, e, g, h, i]) => self.fun.call8(a, b, c, d, e, g, h, i),
                Err(_) => Err(self.arity_error(8, got)),
            },
            declared => Err(self.arity_error(declared, got)),
        }
    }

    fn arity_error(&self, expected: usize, got: usize) -> BridgeError {
        BridgeError::ArityMismatch {
            name: self.name.clone(),
            expected,
            got,
        }
    }
}
