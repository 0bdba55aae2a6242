use std::rc::Rc;

use lox_value::object::{NativeFn, NativeFnPtr, Obj};
use lox_value::{Environment, Value};

/// Native functions defined in the global scope of every interpreter.
const BUILTIN_FUNCTIONS: &[(&str, usize, NativeFnPtr)] = &[("clock", 0, clock)];

pub fn define_builtin_functions(globals: &mut Environment) {
    for &(ident, arity, func) in BUILTIN_FUNCTIONS {
        let native = NativeFn { ident, arity, func };
        globals.define(ident, Value::Object(Rc::new(Obj::NativeFn(native))));
    }
}

/// Seconds since the Unix epoch.
pub fn clock(_args: &[Value]) -> Value {
    let now = std::time::SystemTime::now();
    let since_the_epoch_secs = now
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |duration| duration.as_secs_f64());
    Value::Number(since_the_epoch_secs)
}
