//! Thin convenience glue on top of the lexer/parser/evaluator.

use crate::error::KvazzResult;
use crate::evaluator::Interpreter;
use crate::io::PrintWriter;
use crate::lexer::lex;
use crate::parser::{parse, Program};
use crate::value::Value;

/// Lexes then parses `source` in one step.
pub fn parse_source(source: &str) -> KvazzResult<Program> {
    parse(lex(source)?)
}

/// Parses and runs `source` against a fresh `Interpreter`, writing any
/// `print` output through `out`.
pub fn run_source(source: &str, out: &mut dyn PrintWriter) -> KvazzResult<Value> {
    let program = parse_source(source)?;
    Interpreter::new().run(&program, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectPrint;

    #[test]
    fn run_source_executes_main() {
        let mut out = CollectPrint::new();
        run_source(r#"function main() { print("hi"); }"#, &mut out).unwrap();
        assert_eq!(out.lines, vec!["hi"]);
    }
}
