// Runtime value machinery: the two value representations, the conversion
// pass between them, and the call adaptation path.

pub mod adapter;
pub mod convert;
pub mod curry;
pub mod module;
pub mod native;
pub mod surface;




pub use adapter::{CallArgs, FnAdapter};
pub use convert::{from_native, to_native};
pub use curry::{NativeFun, MAX_ARITY};
pub use module::{BoundModule, Export, NativeModule};
pub use native::NativeValue;
pub use surface::SurfaceValue;
