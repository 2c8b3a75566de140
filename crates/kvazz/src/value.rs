//! Runtime value representation.
//!
//! Unlike a heap-arena interpreter, Kvazz values are small enough to carry
//! directly: a `Vector` is an `Rc<RefCell<Vec<Value>>>` so that the
//! language's value-semantics-on-assignment can still share the
//! backing storage the way the source's copy-on-assign vectors do, while
//! indexed mutation (`v[i] = ...`) sees the same storage other bindings see.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDef;

/// The built-in functions the evaluator knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinId {
    Print,
    LengthOf,
    Hevec,
}

impl BuiltinId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::LengthOf => "lengthof",
            Self::Hevec => "hevec",
        }
    }
}

/// The two shapes an L-value descriptor can take. Never held longer
/// than the handling of a single `AssignOp`.
#[derive(Debug, Clone)]
pub enum LValue {
    EnvSlot {
        env: crate::environment::EnvHandle,
        name: String,
    },
    VectorSlot {
        vector: Rc<RefCell<Vec<Value>>>,
        index: usize,
    },
}

/// A user-defined function: its name (for display), its parameter list, and
/// a shared handle into the AST it was declared in.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub def: Rc<FunctionDef>,
}

/// The tagged runtime value. `LValue` is produced only transiently by
/// the evaluator and is never returned from a public evaluation entry point.
#[derive(Debug, Clone)]
pub enum Value {
    Nothing,
    Int(i64),
    Real(f64),
    Bool(bool),
    String(String),
    Vector(Rc<RefCell<Vec<Value>>>),
    Function(FunctionValue),
    Builtin(BuiltinId),
    LValue(LValue),
}

impl Value {
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Vector(_) => "vector",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
            Value::LValue(_) => "lvalue",
        }
    }

    /// Truthiness. Strings and vectors are unconditionally
    /// truthy, including when empty — an inherited quirk, not a bug to fix.
    pub fn is_truthy(&self) -> Result<bool, String> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Real(r) => Ok(*r != 0.0),
            Value::String(_) => Ok(true),
            Value::Vector(_) => Ok(true),
            Value::Nothing => Ok(false),
            Value::Function(_) | Value::Builtin(_) | Value::LValue(_) => {
                Err(format!("cannot test truthiness of a {}", self.type_name()))
            }
        }
    }
}

/// Numeric promotion used by every arithmetic/comparison operator: if either operand is `Real`, both are widened.
pub enum Numeric {
    Int(i64, i64),
    Real(f64, f64),
}

pub fn promote_pair(a: &Value, b: &Value) -> Option<Numeric> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(Numeric::Int(*x, *y)),
        (Value::Int(x), Value::Real(y)) => Some(Numeric::Real(*x as f64, *y)),
        (Value::Real(x), Value::Int(y)) => Some(Numeric::Real(*x, *y as f64)),
        (Value::Real(x), Value::Real(y)) => Some(Numeric::Real(*x, *y)),
        _ => None,
    }
}

/// Cross-type equality: numeric cross-type comparison by value,
/// byte-wise string equality, recursive vector equality, functions and
/// builtins never equal anything (including themselves).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Function(_), _) | (_, Value::Function(_)) => false,
        (Value::Builtin(_), _) | (_, Value::Builtin(_)) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Nothing, Value::Nothing) => true,
        (Value::Vector(x), Value::Vector(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| values_equal(l, r))
        }
        _ => match promote_pair(a, b) {
            Some(Numeric::Int(x, y)) => x == y,
            Some(Numeric::Real(x, y)) => x == y,
            None => false,
        },
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "nothing"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Function(func) => {
                write!(f, "Function<{}({})>", func.def.name, func.def.params.join(", "))
            }
            Value::Builtin(id) => write!(f, "Builtin<{}>", id.name()),
            Value::LValue(_) => write!(f, "<lvalue>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_rules() {
        assert!(!Value::Int(0).is_truthy().unwrap());
        assert!(Value::Int(-1).is_truthy().unwrap());
        assert!(Value::String(String::new()).is_truthy().unwrap());
        assert!(Value::vector(vec![]).is_truthy().unwrap());
        assert!(!Value::Nothing.is_truthy().unwrap());
    }

    #[test]
    fn cross_type_numeric_equality() {
        assert!(values_equal(&Value::Int(2), &Value::Real(2.0)));
        assert!(!values_equal(&Value::Int(2), &Value::Bool(true)));
    }

    #[test]
    fn vector_equality_is_recursive() {
        let a = Value::vector(vec![Value::Int(1), Value::vector(vec![Value::Int(2)])]);
        let b = Value::vector(vec![Value::Int(1), Value::vector(vec![Value::Int(2)])]);
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn display_matches_print_format() {
        assert_eq!(Value::vector(vec![Value::Int(1), Value::Bool(true)]).to_string(), "[1, true]");
    }
}
