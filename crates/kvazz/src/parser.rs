//! Token stream to abstract syntax tree.
//!
//! Declarations and statements are recursive descent; expressions are
//! Pratt-style precedence climbing. There is no error recovery: the
//! first malformed construct aborts parsing with a `KvazzError::parse`.

use crate::ast::{AssignOp, BinOp, FunctionDef, Node, UnaryOp};
use crate::error::{KvazzError, KvazzResult};
use crate::token::{Span, Token, TokenKind};

/// The root of a parsed program; see `kvazz::parse`.
pub type Program = Node;

struct ParseState {
    tokens: Vec<Token>,
    index: usize,
    eof: Token,
}

impl ParseState {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            eof: Token::eof(),
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, n: usize) -> &Token {
        self.tokens.get(self.index + n).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.index).cloned().unwrap_or_else(Token::eof);
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        tok
    }

    fn span_here(&self) -> Span {
        self.current().span
    }

    fn match_keyword(&mut self, word: &str) -> KvazzResult<Token> {
        if self.current().is_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("keyword '{word}'")))
        }
    }

    fn match_symbol(&mut self, sym: &str) -> KvazzResult<Token> {
        if self.current().is_symbol(sym) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{sym}'")))
        }
    }

    fn match_kind(&mut self, kind: TokenKind) -> KvazzResult<Token> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("a {kind} token")))
        }
    }

    fn unexpected(&self, wanted: &str) -> KvazzError {
        KvazzError::parse(
            format!("expected {wanted}, found {}", self.current()),
            self.span_here(),
        )
    }
}

/// Parses a full token stream into a `Program` node.
pub fn parse(tokens: Vec<Token>) -> KvazzResult<Program> {
    let mut state = ParseState::new(tokens);
    let mut decls = Vec::new();
    while state.current().kind != TokenKind::Eof {
        decls.push(parse_top_level(&mut state)?);
    }
    tracing::debug!(top_level = decls.len(), "parsed program");
    Ok(Node::Program(decls))
}

fn parse_top_level(state: &mut ParseState) -> KvazzResult<Node> {
    if state.current().is_keyword("var") {
        parse_declare(state)
    } else if state.current().is_keyword("function") {
        parse_function_declare(state)
    } else {
        Err(KvazzError::parse(
            format!(
                "top-level statements must be 'var' or 'function', found {}",
                state.current()
            ),
            state.span_here(),
        ))
    }
}

fn parse_declare(state: &mut ParseState) -> KvazzResult<Node> {
    state.match_keyword("var")?;
    let name = state.match_kind(TokenKind::Identifier)?.lexeme;
    state.match_symbol("=")?;
    let init = parse_expr(state, 0)?;
    state.match_symbol(";")?;
    Ok(Node::Declare {
        name,
        init: Box::new(init),
    })
}

fn parse_function_declare(state: &mut ParseState) -> KvazzResult<Node> {
    state.match_keyword("function")?;
    let name = state.match_kind(TokenKind::Identifier)?.lexeme;
    state.match_symbol("(")?;
    let mut params = Vec::new();
    if !state.current().is_symbol(")") {
        loop {
            params.push(state.match_kind(TokenKind::Identifier)?.lexeme);
            if state.current().is_symbol(",") {
                state.advance();
            } else {
                break;
            }
        }
    }
    state.match_symbol(")")?;
    let body = parse_block(state)?;
    Ok(Node::FunctionDeclare(std::rc::Rc::new(FunctionDef {
        name,
        params,
        body,
    })))
}

fn parse_block(state: &mut ParseState) -> KvazzResult<Node> {
    state.match_symbol("{")?;
    let mut stmts = Vec::new();
    while !state.current().is_symbol("}") {
        if state.current().kind == TokenKind::Eof {
            return Err(state.unexpected("'}'"));
        }
        stmts.push(parse_statement(state)?);
    }
    state.match_symbol("}")?;
    Ok(Node::Block(stmts))
}

fn parse_statement(state: &mut ParseState) -> KvazzResult<Node> {
    if state.current().is_keyword("var") {
        return parse_declare(state);
    }
    if state.current().is_keyword("if") {
        return parse_if(state);
    }
    if state.current().is_keyword("while") {
        return parse_while(state);
    }
    if state.current().is_keyword("return") {
        state.advance();
        let expr = parse_expr(state, 0)?;
        state.match_symbol(";")?;
        return Ok(Node::Return(Box::new(expr)));
    }

    let primary = parse_primary(state)?;
    if let Some(op_sym) = current_assign_symbol(state) {
        if !primary.is_lvalue_shape() {
            return Err(KvazzError::parse(
                "assignment target must be a variable or index expression",
                state.span_here(),
            ));
        }
        state.advance();
        let op = AssignOp::from_symbol(&op_sym).expect("checked by current_assign_symbol");
        let value = parse_expr(state, 0)?;
        state.match_symbol(";")?;
        return Ok(Node::AssignOp {
            target: Box::new(primary),
            op,
            value: Box::new(value),
        });
    }

    if matches!(primary, Node::FunctionCall { .. }) {
        state.match_symbol(";")?;
        return Ok(primary);
    }

    Err(KvazzError::parse(
        "expected an assignment or function call statement",
        state.span_here(),
    ))
}

fn current_assign_symbol(state: &ParseState) -> Option<String> {
    const OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];
    if state.current().kind == TokenKind::Symbol && OPS.contains(&state.current().lexeme.as_str())
    {
        Some(state.current().lexeme.clone())
    } else {
        None
    }
}

fn parse_if(state: &mut ParseState) -> KvazzResult<Node> {
    state.match_keyword("if")?;
    let cond = parse_expr(state, 0)?;
    state.match_keyword("then")?;
    let then_branch = parse_block(state)?;
    if state.current().is_keyword("else") {
        state.advance();
        let else_branch = parse_block(state)?;
        Ok(Node::IfElse {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    } else {
        Ok(Node::IfThen {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
        })
    }
}

fn parse_while(state: &mut ParseState) -> KvazzResult<Node> {
    state.match_keyword("while")?;
    let cond = parse_expr(state, 0)?;
    state.match_keyword("do")?;
    let body = parse_block(state)?;
    Ok(Node::While {
        cond: Box::new(cond),
        body: Box::new(body),
    })
}

/// Binding power of a binary-operator symbol, or `None` if the current
/// token does not start a binary operator.
fn binding_power(sym: &str) -> Option<u8> {
    match sym {
        "|" | "&" => Some(1),
        "==" | "!=" | "<=" | ">=" | "<" | ">" => Some(3),
        "+" | "-" => Some(4),
        "*" | "/" | "%" => Some(5),
        _ => None,
    }
}

/// Pratt precedence climbing: consumes a primary, then repeatedly extends it
/// with binary operators whose binding power strictly exceeds `min_bp`
/// (left-associativity).
fn parse_expr(state: &mut ParseState, min_bp: u8) -> KvazzResult<Node> {
    let mut left = parse_unary(state)?;
    loop {
        let sym = if state.current().kind == TokenKind::Symbol {
            state.current().lexeme.clone()
        } else {
            break;
        };
        let Some(bp) = binding_power(&sym) else {
            break;
        };
        if bp <= min_bp {
            break;
        }
        state.advance();
        let right = parse_expr(state, bp)?;
        let op = BinOp::from_symbol(&sym).expect("checked by binding_power");
        left = Node::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_unary(state: &mut ParseState) -> KvazzResult<Node> {
    if state.current().is_symbol("-") {
        state.advance();
        let operand = parse_primary(state)?;
        return Ok(Node::UnaryOp {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        });
    }
    if state.current().is_symbol("!") {
        state.advance();
        let operand = parse_primary(state)?;
        return Ok(Node::UnaryOp {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        });
    }
    parse_primary(state)
}

fn parse_primary(state: &mut ParseState) -> KvazzResult<Node> {
    let tok = state.current().clone();

    if tok.is_symbol("[") || tok.is_symbol("<[") {
        return parse_vector_literal(state);
    }

    if tok.is_symbol("(") {
        state.advance();
        let inner = parse_expr(state, 0)?;
        state.match_symbol(")")?;
        return parse_postfix(state, inner);
    }

    if tok.is_symbol("$") {
        state.advance();
        let name = state.match_kind(TokenKind::Identifier)?.lexeme;
        let node = Node::VariableLookup { name, global: true };
        return parse_postfix(state, node);
    }

    if tok.kind == TokenKind::Identifier {
        state.advance();
        let node = Node::VariableLookup {
            name: tok.lexeme,
            global: false,
        };
        return parse_postfix(state, node);
    }

    if tok.kind == TokenKind::IntLiteral {
        state.advance();
        let value: i64 = tok.lexeme.parse().map_err(|_| {
            KvazzError::parse(format!("invalid integer literal '{}'", tok.lexeme), tok.span)
        })?;
        return Ok(Node::IntLiteral(value));
    }

    if tok.kind == TokenKind::RealLiteral {
        state.advance();
        let value: f64 = tok.lexeme.parse().map_err(|_| {
            KvazzError::parse(format!("invalid real literal '{}'", tok.lexeme), tok.span)
        })?;
        return Ok(Node::RealLiteral(value));
    }

    if tok.kind == TokenKind::BoolLiteral {
        state.advance();
        return Ok(Node::BoolLiteral(tok.lexeme == "true"));
    }

    if tok.kind == TokenKind::StringLiteral {
        state.advance();
        return Ok(Node::StringLiteral(tok.lexeme));
    }

    Err(KvazzError::parse(
        format!("expected an expression, found {tok}"),
        tok.span,
    ))
}

/// Extends a primary with any trailing call/index postfixes.
fn parse_postfix(state: &mut ParseState, mut node: Node) -> KvazzResult<Node> {
    loop {
        if state.current().is_symbol("(") {
            state.advance();
            let mut args = Vec::new();
            if !state.current().is_symbol(")") {
                loop {
                    args.push(parse_expr(state, 0)?);
                    if state.current().is_symbol(",") {
                        state.advance();
                    } else {
                        break;
                    }
                }
            }
            state.match_symbol(")")?;
            node = Node::FunctionCall {
                callee: Box::new(node),
                args,
            };
        } else if state.current().is_symbol("[") {
            state.advance();
            let index = parse_expr(state, 0)?;
            state.match_symbol("]")?;
            node = Node::Access {
                target: Box::new(node),
                index: Box::new(index),
            };
        } else {
            break;
        }
    }
    Ok(node)
}

fn parse_vector_literal(state: &mut ParseState) -> KvazzResult<Node> {
    let opener = state.advance();
    let closer = if opener.lexeme == "<[" { "]>" } else { "]" };
    let mut items = Vec::new();
    if !state.current().is_symbol(closer) {
        loop {
            items.push(parse_expr(state, 0)?);
            if state.current().is_symbol(",") {
                state.advance();
            } else {
                break;
            }
        }
    }
    state.match_symbol(closer)?;
    Ok(Node::VectorLiteral(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_src(src: &str) -> Program {
        parse(lex(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_empty_program() {
        assert_eq!(parse_src(""), Node::Program(vec![]));
    }

    #[test]
    fn parses_global_declare() {
        let prog = parse_src("var x = 1;");
        match prog {
            Node::Program(decls) => {
                assert_eq!(decls.len(), 1);
                assert!(matches!(&decls[0], Node::Declare { name, .. } if name == "x"));
            }
            _ => panic!("expected Program"),
        }
    }

    #[test]
    fn precedence_multiplication_binds_tighter() {
        let prog = parse_src("function main() { print(1 + 2 * 3); }");
        let Node::Program(decls) = prog else { panic!() };
        let Node::FunctionDeclare(def) = &decls[0] else { panic!() };
        let Node::Block(stmts) = &def.body else { panic!() };
        let Node::FunctionCall { args, .. } = &stmts[0] else { panic!() };
        match &args[0] {
            Node::BinaryOp { op: BinOp::Add, left, right } => {
                assert!(matches!(left.as_ref(), Node::IntLiteral(1)));
                assert!(matches!(right.as_ref(), Node::BinaryOp { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn left_associative_subtraction() {
        let prog = parse_src("function main() { print(1 - 2 - 3); }");
        let Node::Program(decls) = prog else { panic!() };
        let Node::FunctionDeclare(def) = &decls[0] else { panic!() };
        let Node::Block(stmts) = &def.body else { panic!() };
        let Node::FunctionCall { args, .. } = &stmts[0] else { panic!() };
        match &args[0] {
            Node::BinaryOp { op: BinOp::Sub, left, .. } => {
                assert!(matches!(left.as_ref(), Node::BinaryOp { op: BinOp::Sub, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        let prog = parse_src("function main() { print(-1 + 2); }");
        let Node::Program(decls) = prog else { panic!() };
        let Node::FunctionDeclare(def) = &decls[0] else { panic!() };
        let Node::Block(stmts) = &def.body else { panic!() };
        let Node::FunctionCall { args, .. } = &stmts[0] else { panic!() };
        assert!(matches!(
            &args[0],
            Node::BinaryOp { op: BinOp::Add, left, .. } if matches!(left.as_ref(), Node::UnaryOp { op: UnaryOp::Neg, .. })
        ));
    }

    #[test]
    fn compound_assignment_requires_lvalue() {
        let err = parse(lex("function main() { 1 += 2; }").unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Parse);
    }

    #[test]
    fn vector_literal_both_delimiters() {
        let prog = parse_src("var v = <[1, 2]>;");
        let Node::Program(decls) = prog else { panic!() };
        assert!(matches!(&decls[0], Node::Declare { init, .. } if matches!(init.as_ref(), Node::VectorLiteral(items) if items.len() == 2)));
    }

    #[test]
    fn global_sigil_sets_flag() {
        let prog = parse_src("function bump() { $g += 1; }");
        let Node::Program(decls) = prog else { panic!() };
        let Node::FunctionDeclare(def) = &decls[0] else { panic!() };
        let Node::Block(stmts) = &def.body else { panic!() };
        assert!(matches!(
            &stmts[0],
            Node::AssignOp { target, .. } if matches!(target.as_ref(), Node::VariableLookup { global: true, .. })
        ));
    }

    #[test]
    fn top_level_requires_var_or_function() {
        let err = parse(lex("1 + 1;").unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Parse);
    }
}
