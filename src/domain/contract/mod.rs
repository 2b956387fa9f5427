//! Contract call model: which function to call and how to describe it

mod descriptor;
mod selector;

pub use descriptor::{build_descriptor, call_args, FunctionDescriptor, ParamSpec};
pub use selector::{FunctionKind, FunctionSelector};
