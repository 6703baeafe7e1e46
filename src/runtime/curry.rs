//! Curried native function values.
//!
//! The native runtime compiles an n-argument function to a value invoked
//! through the entry point for exactly n arguments. Each supported arity has
//! its own typed entry point here; there is no generic invoke-by-count, so a
//! caller cannot reach a function through the wrong arity without getting an
//! explicit error back.

use std::rc::Rc;

use crate::error::BridgeError;
use crate::runtime::native::NativeValue;

/// Highest arity the entry-point set covers.
pub const MAX_ARITY: usize = 8;

type V = NativeValue;

#[derive(Clone)]
pub enum NativeFun {
    Arity1(Rc<dyn Fn(V) -> V>),
    Arity2(Rc<dyn Fn(V, V) -> V>),
    Arity3(Rc<dyn Fn(V, V, V) -> V>),
    Arity4(Rc<dyn Fn(V, V, V, V) -> V>),
    Arity5(Rc<dyn Fn(V, V, V, V, V) -> V>),
    Arity6(Rc<dyn Fn(V, V, V, V, V, V) -> V>),
    Arity7(Rc<dyn Fn(V, V, V, V, V, V, V) -> V>),
    Arity8(Rc<dyn Fn(V, V, V, V, V, V, V, V) -> V>),
}

impl NativeFun {
    pub fn arity1(f: impl Fn(V) -> V + 'static) -> NativeFun {
        NativeFun::Arity1(Rc::new(f))
    }

    pub fn arity2(f: impl Fn(V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity2(Rc::new(f))
    }

    pub fn arity3(f: impl Fn(V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity3(Rc::new(f))
    }

    pub fn arity4(f: impl Fn(V, V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity4(Rc::new(f))
    }

    pub fn arity5(f: impl Fn(V, V, V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity5(Rc::new(f))
    }

    pub fn arity6(f: impl Fn(V, V, V, V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity6(Rc::new(f))
    }

    pub fn arity7(f: impl Fn(V, V, V, V, V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity7(Rc::new(f))
    }

    pub fn arity8(f: impl Fn(V, V, V, V, V, V, V, V) -> V + 'static) -> NativeFun {
        NativeFun::Arity8(Rc::new(f))
    }

    /// Intrinsic arity of the function value.
    pub fn arity(&self) -> usize {
        match self {
            NativeFun::Arity1(_) => 1,
            NativeFun::Arity2(_) => 2,
            NativeFun::Arity3(_) => 3,
            NativeFun::Arity4(_) => 4,
            NativeFun::Arity5(_) => 5,
            NativeFun::Arity6(_) => 6,
            NativeFun::Arity7(_) => 7,
            NativeFun::Arity8(_) => 8,
        }
    }

    pub fn call1(&self, a: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity1(f) => Ok(f(a)),
            other => Err(entry_point_error(other.arity(), 1)),
        }
    }

    pub fn call2(&self, a: V, b: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity2(f) => Ok(f(a, b)),
            other => Err(entry_point_error(other.arity(), 2)),
        }
    }

    pub fn call3(&self, a: V, b: V, c: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity3(f) => Ok(f(a, b, c)),
            other => Err(entry_point_error(other.arity(), 3)),
        }
    }

    pub fn call4(&self, a: V, b: V, c: V, d: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity4(f) => Ok(f(a, b, c, d)),
            other => Err(entry_point_error(other.arity(), 4)),
        }
    }

    pub fn call5(&self, a: V, b: V, c: V, d: V, e: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity5(f) => Ok(f(a, b, c, d, e)),
            other => Err(entry_point_error(other.arity(), 5)),
        }
    }

    pub fn call6(&self, a: V, b: V, c: V, d: V, e: V, g: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity6(f) => Ok(f(a, b, c, d, e, g)),
            other => Err(entry_point_error(other.arity(), 6)),
        }
    }

    pub fn call7(&self, a: V, b: V, c: V, d: V, e: V, g: V, h: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity7(f) => Ok(f(a, b, c, d, e, g, h)),
            other => Err(entry_point_error(other.arity(), 7)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call8(&self, a: V, b: V, c: V, d: V, e: V, g: V, h: V, i: V) -> Result<V, BridgeError> {
        match self {
            NativeFun::Arity8(f) => Ok(f(a, b, c, d, e, g, h, i)),
            other => Err(entry_point_error(other.arity(), 8)),
        }
    }
}

fn entry_point_error(arity: usize, requested: usize) -> BridgeError {
    BridgeError::EntryPointArity { arity, requested }
}

impl std::fmt::Debug for NativeFun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFun(arity={})", self.arity())
    }
}
