use crate::error::{KvazzError, KvazzResult};
use crate::value::Value;

/// `lengthof(v)`: element count for a `Vector`, byte length for a `String`.
pub fn call(mut args: Vec<Value>) -> KvazzResult<Value> {
    if args.len() != 1 {
        return Err(KvazzError::ty(format!(
            "lengthof expects exactly 1 argument, got {}",
            args.len()
        )));
    }
    match args.remove(0) {
        Value::Vector(v) => Ok(Value::Int(v.borrow().len() as i64)),
        Value::String(s) => Ok(Value::Int(s.len() as i64)),
        other => Err(KvazzError::ty(format!(
            "lengthof is not defined for a {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_length() {
        let v = Value::vector(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(matches!(call(vec![v]).unwrap(), Value::Int(3)));
    }

    #[test]
    fn string_length_is_byte_length() {
        assert!(matches!(call(vec![Value::String("hi".into())]).unwrap(), Value::Int(2)));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(call(vec![]).is_err());
    }
}
