use crate::error::{KvazzError, KvazzResult};
use crate::value::Value;

/// `hevec(n [, default])`: a length-`n` vector filled with `default`
/// (or `Nothing` if omitted).
pub fn call(mut args: Vec<Value>) -> KvazzResult<Value> {
    if args.is_empty() || args.len() > 2 {
        return Err(KvazzError::ty(format!(
            "hevec expects 1 or 2 arguments, got {}",
            args.len()
        )));
    }
    let default = if args.len() == 2 { args.pop().unwrap() } else { Value::Nothing };
    let n = match args.pop().unwrap() {
        Value::Int(n) => n,
        other => {
            return Err(KvazzError::ty(format!(
                "hevec's first argument must be an int, got {}",
                other.type_name()
            )))
        }
    };
    if n < 0 {
        return Err(KvazzError::index("hevec length must not be negative"));
    }
    let items = (0..n).map(|_| default.clone()).collect();
    Ok(Value::vector(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_with_default() {
        let result = call(vec![Value::Int(3), Value::Int(0)]).unwrap();
        assert_eq!(result.to_string(), "[0, 0, 0]");
    }

    #[test]
    fn defaults_to_nothing() {
        let result = call(vec![Value::Int(2)]).unwrap();
        assert_eq!(result.to_string(), "[nothing, nothing]");
    }

    #[test]
    fn rejects_non_int_length() {
        assert!(call(vec![Value::String("x".into())]).is_err());
    }
}
