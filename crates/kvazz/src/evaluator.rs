//! Tree-walking evaluator.
//!
//! One `eval_*` function per AST shape, each returning `(Value, Flow)`. The
//! evaluator carries a single piece of mutable state, `lvalue_flag`, that
//! `VariableLookup`/`Access` consult to decide whether to hand back a value
//! or an `LValue` descriptor; it is cleared around every sub-evaluation that
//! must not itself be treated as an l-value. The output
//! sink for the `print` builtin is supplied per call to `run`,
//! rather than owned by the interpreter, so a caller keeps its own handle to
//! inspect what was printed once evaluation finishes.

use crate::ast::{AssignOp as AstAssignOp, BinOp, Node, UnaryOp};
use crate::builtins;
use crate::environment::{EnvEntry, EnvHandle};
use crate::error::{KvazzError, KvazzResult};
use crate::io::PrintWriter;
use crate::value::{promote_pair, values_equal, FunctionValue, LValue, Numeric, Value};

/// Control-flow tag threaded alongside every evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Good,
    Return,
}

type EvalResult = KvazzResult<(Value, Flow)>;

/// Owns the global environment for a single program run and drives
/// evaluation of its AST.
pub struct Interpreter {
    global: EnvHandle,
    lvalue_flag: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let global = EnvHandle::root();
        builtins::install(&global);
        Self {
            global,
            lvalue_flag: false,
        }
    }

    /// Runs a parsed `Program`: executes its top-level declarations, then,
    /// if a zero-arg function named `main` was declared, invokes it.
    /// `print` output is written through `out`.
    pub fn run(&mut self, program: &Node, out: &mut dyn PrintWriter) -> KvazzResult<Value> {
        let Node::Program(decls) = program else {
            return Err(KvazzError::ty("run() requires a Program node"));
        };
        let global = self.global.clone();
        for decl in decls {
            self.eval(decl, &global, out)?;
        }
        match global.lookup("main") {
            Some(EnvEntry::Function(func)) => {
                tracing::debug!("invoking main");
                self.invoke_function(&func, Vec::new(), out)
            }
            _ => Ok(Value::Nothing),
        }
    }

    fn eval(&mut self, node: &Node, env: &EnvHandle, out: &mut dyn PrintWriter) -> EvalResult {
        match node {
            Node::Program(_) => Err(KvazzError::ty("nested Program node")),
            Node::Block(stmts) => self.eval_block(stmts, env, out),
            Node::Declare { name, init } => self.eval_declare(name, init, env, out),
            Node::FunctionDeclare(def) => {
                env.declare(
                    def.name.clone(),
                    EnvEntry::Function(FunctionValue { def: def.clone() }),
                )?;
                Ok((Value::Nothing, Flow::Good))
            }
            Node::AssignOp { target, op, value } => self.eval_assign(target, *op, value, env, out),
            Node::Return(expr) => {
                let (value, _) = self.eval(expr, env, out)?;
                Ok((value, Flow::Return))
            }
            Node::IfThen { cond, then_branch } => {
                let (cond_val, _) = self.eval(cond, env, out)?;
                if truthy(&cond_val)? {
                    self.eval(then_branch, env, out)
                } else {
                    Ok((Value::Nothing, Flow::Good))
                }
            }
            Node::IfElse { cond, then_branch, else_branch } => {
                let (cond_val, _) = self.eval(cond, env, out)?;
                if truthy(&cond_val)? {
                    self.eval(then_branch, env, out)
                } else {
                    self.eval(else_branch, env, out)
                }
            }
            Node::While { cond, body } => self.eval_while(cond, body, env, out),
            Node::BinaryOp { op, left, right } => self.eval_binary(*op, left, right, env, out),
            Node::UnaryOp { op, operand } => self.eval_unary(*op, operand, env, out),
            Node::FunctionCall { callee, args } => self.eval_call(callee, args, env, out),
            Node::Access { target, index } => self.eval_access(target, index, env, out),
            Node::VariableLookup { name, global } => self.eval_lookup(name, *global, env),
            Node::IntLiteral(v) => Ok((Value::Int(*v), Flow::Good)),
            Node::BoolLiteral(v) => Ok((Value::Bool(*v), Flow::Good)),
            Node::RealLiteral(v) => Ok((Value::Real(*v), Flow::Good)),
            Node::StringLiteral(v) => Ok((Value::String(v.clone()), Flow::Good)),
            Node::VectorLiteral(items) => self.eval_vector_literal(items, env, out),
        }
    }

    /// Evaluates `node` guaranteed not to be treated as an l-value, even if
    /// called from within l-value handling.
    fn eval_rvalue(&mut self, node: &Node, env: &EnvHandle, out: &mut dyn PrintWriter) -> EvalResult {
        let saved = self.lvalue_flag;
        self.lvalue_flag = false;
        let result = self.eval(node, env, out);
        self.lvalue_flag = saved;
        result
    }

    fn eval_block(&mut self, stmts: &[Node], env: &EnvHandle, out: &mut dyn PrintWriter) -> EvalResult {
        let scope = EnvHandle::child(env);
        for stmt in stmts {
            let (value, flow) = self.eval(stmt, &scope, out)?;
            if flow == Flow::Return {
                return Ok((value, Flow::Return));
            }
        }
        Ok((Value::Nothing, Flow::Good))
    }

    fn eval_declare(
        &mut self,
        name: &str,
        init: &Node,
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        let (value, _) = self.eval_rvalue(init, env, out)?;
        env.declare(name, EnvEntry::Value(value))?;
        Ok((Value::Nothing, Flow::Good))
    }

    fn eval_while(&mut self, cond: &Node, body: &Node, env: &EnvHandle, out: &mut dyn PrintWriter) -> EvalResult {
        loop {
            let (cond_val, _) = self.eval_rvalue(cond, env, out)?;
            if !truthy(&cond_val)? {
                return Ok((Value::Nothing, Flow::Good));
            }
            let (value, flow) = self.eval(body, env, out)?;
            if flow == Flow::Return {
                return Ok((value, Flow::Return));
            }
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Node, env: &EnvHandle, out: &mut dyn PrintWriter) -> EvalResult {
        let (value, _) = self.eval_rvalue(operand, env, out)?;
        let result = match op {
            UnaryOp::Not => Value::Bool(!truthy(&value)?),
            UnaryOp::Neg => match value {
                Value::Int(n) => Value::Int(-n),
                Value::Real(r) => Value::Real(-r),
                other => {
                    return Err(KvazzError::ty(format!(
                        "unary '-' is not defined for a {}",
                        other.type_name()
                    )))
                }
            },
        };
        Ok((result, Flow::Good))
    }

    fn eval_binary(
        &mut self,
        op: BinOp,
        left: &Node,
        right: &Node,
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        // Both operands evaluate unconditionally; `|`/`&` do not short-circuit.
        let (lhs, _) = self.eval_rvalue(left, env, out)?;
        let (rhs, _) = self.eval_rvalue(right, env, out)?;
        apply_binary(op, &lhs, &rhs).map(|v| (v, Flow::Good))
    }

    fn eval_call(
        &mut self,
        callee: &Node,
        args: &[Node],
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        let (callee_val, _) = self.eval_rvalue(callee, env, out)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            let (value, _) = self.eval_rvalue(arg, env, out)?;
            arg_values.push(value);
        }
        match callee_val {
            Value::Function(func) => {
                let value = self.invoke_function(&func, arg_values, out)?;
                Ok((value, Flow::Good))
            }
            Value::Builtin(id) => {
                let value = builtins::call(id, arg_values, out)?;
                Ok((value, Flow::Good))
            }
            other => Err(KvazzError::ty(format!("{} is not callable", other.type_name()))),
        }
    }

    /// Invokes a user function against a fresh child of the **global**
    /// environment, never of the caller's scope.
    fn invoke_function(
        &mut self,
        func: &FunctionValue,
        args: Vec<Value>,
        out: &mut dyn PrintWriter,
    ) -> KvazzResult<Value> {
        if args.len() != func.def.params.len() {
            return Err(KvazzError::ty(format!(
                "{} expects {} argument(s), got {}",
                func.def.name,
                func.def.params.len(),
                args.len()
            )));
        }
        let frame = EnvHandle::child(&self.global);
        for (param, value) in func.def.params.iter().zip(args) {
            frame
                .declare(param.clone(), EnvEntry::Value(value))
                .expect("fresh call frame");
        }
        let (value, flow) = self.eval(&func.def.body, &frame, out)?;
        match flow {
            Flow::Return => Ok(value),
            Flow::Good => Ok(Value::Nothing),
        }
    }

    fn eval_access(
        &mut self,
        target: &Node,
        index: &Node,
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        let want_lvalue = self.lvalue_flag;
        let (target_val, _) = self.eval_rvalue(target, env, out)?;
        let (index_val, _) = self.eval_rvalue(index, env, out)?;

        match (&target_val, &index_val) {
            (Value::Vector(vec), Value::Int(i)) => {
                let idx = *i;
                if idx < 0 || idx as usize >= vec.borrow().len() {
                    return Err(KvazzError::index(format!("vector index {idx} out of bounds")));
                }
                if want_lvalue {
                    Ok((
                        Value::LValue(LValue::VectorSlot {
                            vector: vec.clone(),
                            index: idx as usize,
                        }),
                        Flow::Good,
                    ))
                } else {
                    Ok((vec.borrow()[idx as usize].clone(), Flow::Good))
                }
            }
            (Value::String(s), Value::Int(i)) => {
                if want_lvalue {
                    return Err(KvazzError::ty("string elements are immutable"));
                }
                let idx = *i;
                let bytes = s.as_bytes();
                if idx < 0 || idx as usize >= bytes.len() {
                    return Err(KvazzError::index(format!("string index {idx} out of bounds")));
                }
                let ch = bytes[idx as usize] as char;
                Ok((Value::String(ch.to_string()), Flow::Good))
            }
            _ => Err(KvazzError::ty(format!(
                "cannot index a {} with a {}",
                target_val.type_name(),
                index_val.type_name()
            ))),
        }
    }

    fn eval_lookup(&mut self, name: &str, global: bool, env: &EnvHandle) -> EvalResult {
        let base = if global { &self.global } else { env };
        match base.lookup(name) {
            Some(EnvEntry::Value(value)) => {
                if self.lvalue_flag {
                    Ok((
                        Value::LValue(LValue::EnvSlot {
                            env: base.clone(),
                            name: name.to_string(),
                        }),
                        Flow::Good,
                    ))
                } else {
                    Ok((value, Flow::Good))
                }
            }
            Some(EnvEntry::Function(func)) => {
                if self.lvalue_flag {
                    return Err(KvazzError::ty("a function is not assignable"));
                }
                Ok((Value::Function(func), Flow::Good))
            }
            Some(EnvEntry::Builtin(id)) => {
                if self.lvalue_flag {
                    return Err(KvazzError::ty("a builtin is not assignable"));
                }
                Ok((Value::Builtin(id), Flow::Good))
            }
            None => Err(KvazzError::name(format!("undefined variable '{name}'"))),
        }
    }

    fn eval_vector_literal(
        &mut self,
        items: &[Node],
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let (value, _) = self.eval_rvalue(item, env, out)?;
            values.push(value);
        }
        Ok((Value::vector(values), Flow::Good))
    }

    fn eval_assign(
        &mut self,
        target: &Node,
        op: AstAssignOp,
        value_expr: &Node,
        env: &EnvHandle,
        out: &mut dyn PrintWriter,
    ) -> EvalResult {
        self.lvalue_flag = true;
        let lvalue_result = self.eval(target, env, out);
        self.lvalue_flag = false;
        let (lvalue, _) = lvalue_result?;
        let Value::LValue(slot) = lvalue else {
            return Err(KvazzError::ty("assignment target did not produce an l-value"));
        };

        let (mut rhs, _) = self.eval_rvalue(value_expr, env, out)?;

        if let Some(base_op) = op.base_op() {
            // Compound assignment re-evaluates the l-value expression as a
            // plain rvalue; this is deliberate, not an optimization
            // bug — a side-effecting index expression is meant to run twice.
            let (lhs, _) = self.eval_rvalue(target, env, out)?;
            rhs = apply_binary(base_op, &lhs, &rhs)?;
        }

        match slot {
            LValue::EnvSlot { env: owner, name } => {
                owner.assign(&name, rhs.clone())?;
            }
            LValue::VectorSlot { vector, index } => {
                let mut vec = vector.borrow_mut();
                if index >= vec.len() {
                    return Err(KvazzError::index(format!("vector index {index} out of bounds")));
                }
                vec[index] = rhs.clone();
            }
        }
        Ok((rhs, Flow::Good))
    }
}

fn truthy(value: &Value) -> KvazzResult<bool> {
    value.is_truthy().map_err(KvazzError::ty)
}

/// Shared operator semantics, used by both `BinaryOp` and compound
/// assignment desugaring.
fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value) -> KvazzResult<Value> {
    match op {
        BinOp::Or => Ok(Value::Bool(truthy(lhs)? || truthy(rhs)?)),
        BinOp::And => Ok(Value::Bool(truthy(lhs)? && truthy(rhs)?)),
        BinOp::Eq => Ok(Value::Bool(values_equal(lhs, rhs))),
        BinOp::NotEq => Ok(Value::Bool(!values_equal(lhs, rhs))),
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => compare(op, lhs, rhs),
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub => arithmetic(op, lhs, rhs),
        BinOp::Mul => arithmetic(op, lhs, rhs),
        BinOp::Div => arithmetic(op, lhs, rhs),
        BinOp::Mod => modulo(lhs, rhs),
    }
}

fn add(lhs: &Value, rhs: &Value) -> KvazzResult<Value> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
        (Value::Vector(a), Value::Vector(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::vector(items))
        }
        _ => arithmetic(BinOp::Add, lhs, rhs),
    }
}

fn arithmetic(op: BinOp, lhs: &Value, rhs: &Value) -> KvazzResult<Value> {
    match promote_pair(lhs, rhs) {
        Some(Numeric::Int(a, b)) => match op {
            BinOp::Add => Ok(Value::Int(a.wrapping_add(b))),
            BinOp::Sub => Ok(Value::Int(a.wrapping_sub(b))),
            BinOp::Mul => Ok(Value::Int(a.wrapping_mul(b))),
            BinOp::Div => {
                if b == 0 {
                    Err(KvazzError::arithmetic("division by zero"))
                } else {
                    Ok(Value::Int(a / b))
                }
            }
            _ => unreachable!("arithmetic() only called for + - * /"),
        },
        Some(Numeric::Real(a, b)) => match op {
            BinOp::Add => Ok(Value::Real(a + b)),
            BinOp::Sub => Ok(Value::Real(a - b)),
            BinOp::Mul => Ok(Value::Real(a * b)),
            BinOp::Div => Ok(Value::Real(a / b)),
            _ => unreachable!("arithmetic() only called for + - * /"),
        },
        None => Err(KvazzError::ty(format!(
            "'{}' is not defined for {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn modulo(lhs: &Value, rhs: &Value) -> KvazzResult<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                Err(KvazzError::arithmetic("modulo by zero"))
            } else {
                Ok(Value::Int(a % b))
            }
        }
        _ => Err(KvazzError::arithmetic(format!(
            "'%' requires two ints, got {} and {}",
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> KvazzResult<Value> {
    let ordering = match promote_pair(lhs, rhs) {
        Some(Numeric::Int(a, b)) => a.partial_cmp(&b),
        Some(Numeric::Real(a, b)) => a.partial_cmp(&b),
        None => {
            return Err(KvazzError::ty(format!(
                "'{}' is not defined for {} and {}",
                op,
                lhs.type_name(),
                rhs.type_name()
            )))
        }
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::LtEq => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::GtEq => ordering.is_ge(),
        _ => unreachable!("compare() only called for < <= > >="),
    };
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectPrint;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn run_ok(src: &str) -> Vec<String> {
        let program = parse(lex(src).unwrap()).unwrap();
        let mut out = CollectPrint::new();
        Interpreter::new().run(&program, &mut out).unwrap();
        out.lines
    }

    #[test]
    fn hello_world() {
        assert_eq!(run_ok(r#"function main() { print("hello"); }"#), vec!["hello"]);
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(
            run_ok("function main() { print(1 + 2 * 3); print((1 + 2) * 3); }"),
            vec!["7", "9"]
        );
    }

    #[test]
    fn recursive_factorial() {
        let src = "function fact(n) { if n <= 1 then { return 1; } else { return n * fact(n - 1); } } function main() { print(fact(5)); }";
        assert_eq!(run_ok(src), vec!["120"]);
    }

    #[test]
    fn vector_and_compound_assignment() {
        let src = "function main() { var v = [1, 2, 3]; v[1] += 10; print(v); print(lengthof(v)); }";
        assert_eq!(run_ok(src), vec!["[1, 12, 3]", "3"]);
    }

    #[test]
    fn global_via_sigil() {
        let src = "var g = 0; function bump() { $g += 1; } function main() { bump(); bump(); print(g); }";
        assert_eq!(run_ok(src), vec!["2"]);
    }

    #[test]
    fn hevec_builtin() {
        let src = "function main() { var z = hevec(3, 0); z[0] = 9; print(z); }";
        assert_eq!(run_ok(src), vec!["[9, 0, 0]"]);
    }

    #[test]
    fn division_by_zero_is_an_error_not_a_panic() {
        let program = parse(lex("function main() { print(1 / 0); }").unwrap()).unwrap();
        let mut out = CollectPrint::new();
        let err = Interpreter::new().run(&program, &mut out).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Arithmetic);
    }

    #[test]
    fn functions_close_over_global_not_caller_scope() {
        let src = "var g = 1; function see() { return g; } function main() { var g = 99; print(see()); }";
        assert_eq!(run_ok(src), vec!["1"]);
    }
}
