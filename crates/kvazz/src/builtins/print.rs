use crate::error::KvazzResult;
use crate::io::PrintWriter;
use crate::value::Value;

/// `print(… values)`: joins each argument's display form with a single
/// space and writes one line. Returns `Nothing`.
pub fn call(args: Vec<Value>, out: &mut dyn PrintWriter) -> KvazzResult<Value> {
    let line = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
    out.print_line(&line);
    Ok(Value::Nothing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectPrint;

    #[test]
    fn joins_arguments_with_spaces() {
        let mut sink = CollectPrint::new();
        call(vec![Value::Int(1), Value::Bool(true), Value::String("hi".into())], &mut sink).unwrap();
        assert_eq!(sink.lines, vec!["1 true hi"]);
    }
}
