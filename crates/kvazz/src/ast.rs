//! Abstract syntax tree: a closed sum of 19 node kinds.
//!
//! Each node exclusively owns its children. `FunctionDeclare` bodies are
//! additionally wrapped in `Rc` so that a `Value::Function` can hold a
//! shared, non-owning handle into the program without the AST itself ever
//! having more than one owner of a given node.

use std::fmt;
use std::rc::Rc;

/// Binary operator tags, shared between `BinaryOp` and the compound
/// assignment desugaring in `AssignOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn from_symbol(sym: &str) -> Option<Self> {
        Some(match sym {
            "|" => Self::Or,
            "&" => Self::And,
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Or => "|",
            Self::And => "&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operator tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compound assignment operators, plus plain `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    pub fn from_symbol(sym: &str) -> Option<Self> {
        Some(match sym {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubAssign,
            "*=" => Self::MulAssign,
            "/=" => Self::DivAssign,
            "%=" => Self::ModAssign,
            _ => return None,
        })
    }

    /// The base binary operator a compound assignment desugars to.
    pub fn base_op(self) -> Option<BinOp> {
        Some(match self {
            Self::Assign => return None,
            Self::AddAssign => BinOp::Add,
            Self::SubAssign => BinOp::Sub,
            Self::MulAssign => BinOp::Mul,
            Self::DivAssign => BinOp::Div,
            Self::ModAssign => BinOp::Mod,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
        }
    }
}

/// The 19 AST node kinds the parser produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Vec<Node>),
    Block(Vec<Node>),
    Declare {
        name: String,
        init: Box<Node>,
    },
    FunctionDeclare(Rc<FunctionDef>),
    AssignOp {
        target: Box<Node>,
        op: AssignOp,
        value: Box<Node>,
    },
    Return(Box<Node>),
    IfThen {
        cond: Box<Node>,
        then_branch: Box<Node>,
    },
    IfElse {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },
    While {
        cond: Box<Node>,
        body: Box<Node>,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    FunctionCall {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Access {
        target: Box<Node>,
        index: Box<Node>,
    },
    VariableLookup {
        name: String,
        global: bool,
    },
    IntLiteral(i64),
    BoolLiteral(bool),
    RealLiteral(f64),
    StringLiteral(String),
    VectorLiteral(Vec<Node>),
}

/// Body of a `FunctionDeclare`, held behind `Rc` so `Value::Function` can
/// share it without AST nodes ever having two owners.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Node,
}

impl Node {
    /// The tree-printer label used by the `parse` CLI subcommand.
    pub fn label(&self) -> String {
        match self {
            Node::Program(_) => "Program".to_string(),
            Node::Block(_) => "Block".to_string(),
            Node::Declare { name, .. } => format!("Declare {name}"),
            Node::FunctionDeclare(def) => {
                format!("FunctionDeclare {}({})", def.name, def.params.join(", "))
            }
            Node::AssignOp { op, .. } => format!("AssignOp {}", op.as_str()),
            Node::Return(_) => "Return".to_string(),
            Node::IfThen { .. } => "IfThen".to_string(),
            Node::IfElse { .. } => "IfElse".to_string(),
            Node::While { .. } => "While".to_string(),
            Node::BinaryOp { op, .. } => format!("BinaryOp {op}"),
            Node::UnaryOp { op, .. } => format!("UnaryOp {op}"),
            Node::FunctionCall { .. } => "FunctionCall".to_string(),
            Node::Access { .. } => "Access".to_string(),
            Node::VariableLookup { name, global } => {
                if *global {
                    format!("VariableLookup ${name}")
                } else {
                    format!("VariableLookup {name}")
                }
            }
            Node::IntLiteral(v) => format!("int-literal '{v}'"),
            Node::BoolLiteral(v) => format!("bool-literal '{v}'"),
            Node::RealLiteral(v) => format!("real-literal '{v}'"),
            Node::StringLiteral(v) => format!("string-literal '{v}'"),
            Node::VectorLiteral(_) => "VectorLiteral".to_string(),
        }
    }

    /// Direct children, in evaluation order, for the tree-printer and for
    /// any other generic tree walk.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Program(stmts) | Node::Block(stmts) => stmts.iter().collect(),
            Node::Declare { init, .. } => vec![init],
            Node::FunctionDeclare(def) => vec![&def.body],
            Node::AssignOp { target, value, .. } => vec![target, value],
            Node::Return(expr) => vec![expr],
            Node::IfThen { cond, then_branch } => vec![cond, then_branch],
            Node::IfElse {
                cond,
                then_branch,
                else_branch,
            } => vec![cond, then_branch, else_branch],
            Node::While { cond, body } => vec![cond, body],
            Node::BinaryOp { left, right, .. } => vec![left, right],
            Node::UnaryOp { operand, .. } => vec![operand],
            Node::FunctionCall { callee, args } => {
                let mut v = vec![callee.as_ref()];
                v.extend(args.iter());
                v
            }
            Node::Access { target, index } => vec![target, index],
            Node::VariableLookup { .. }
            | Node::IntLiteral(_)
            | Node::BoolLiteral(_)
            | Node::RealLiteral(_)
            | Node::StringLiteral(_) => vec![],
            Node::VectorLiteral(items) => items.iter().collect(),
        }
    }

    /// True for the two expression forms the parser allows as assignment
    /// targets.
    pub fn is_lvalue_shape(&self) -> bool {
        matches!(self, Node::VariableLookup { .. } | Node::Access { .. })
    }
}
