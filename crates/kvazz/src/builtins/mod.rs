//! Built-in function dispatch.
//!
//! Each builtin gets its own file, matching the source's one-builtin-per-file
//! layout; this module just seeds the global environment and routes calls.

mod hevec;
mod lengthof;
mod print;

use crate::environment::{EnvEntry, EnvHandle};
use crate::error::KvazzResult;
use crate::io::PrintWriter;
use crate::value::{BuiltinId, Value};

/// Declares the three builtins in `env` under their call names.
pub fn install(env: &EnvHandle) {
    env.declare("print", EnvEntry::Builtin(BuiltinId::Print)).expect("fresh global env");
    env.declare("lengthof", EnvEntry::Builtin(BuiltinId::LengthOf)).expect("fresh global env");
    env.declare("hevec", EnvEntry::Builtin(BuiltinId::Hevec)).expect("fresh global env");
}

/// Invokes a builtin by id with already-evaluated arguments.
pub fn call(id: BuiltinId, args: Vec<Value>, out: &mut dyn PrintWriter) -> KvazzResult<Value> {
    match id {
        BuiltinId::Print => print::call(args, out),
        BuiltinId::LengthOf => lengthof::call(args),
        BuiltinId::Hevec => hevec::call(args),
    }
}
