use crate::{Decln, Expr, Ident, Span};
use serde::{Deserialize, Serialize};

/// A statement body. `braced` distinguishes `{ ... }` from the single
/// statement form; the code generator warns about gratuitous nested braces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub braced: bool,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Block {
        Block {
            stmts,
            braced: true,
            span,
        }
    }
}

/// `if` with its `else if` chain flattened: `branches` holds the condition
/// and body of the `if` and every `else if`, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub branches: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    Expr(Expr),
    Decl(Decln),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Decl(Decln),
    Block(Block),
    If(IfStmt),
    While {
        cond: Expr,
        body: Block,
        span: Span,
    },
    DoWhile {
        body: Block,
        cond: Expr,
        span: Span,
    },
    For {
        init: Option<ForInit>,
        cond: Option<Expr>,
        next: Option<Expr>,
        body: Block,
        span: Span,
    },
    Switch {
        expr: Expr,
        body: Block,
        span: Span,
    },
    /// `case e:` — a marker statement inside a switch body.
    Case {
        expr: Expr,
        span: Span,
    },
    /// `default:` — a marker statement inside a switch body.
    Default {
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Goto {
        label: Ident,
    },
    /// `name:` — a goto label definition preceding the next statement.
    Labeled {
        label: Ident,
    },
    Return {
        expr: Option<Expr>,
        span: Span,
    },
    /// The empty statement `;`.
    Null {
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span(),
            Stmt::Decl(decln) => decln.span,
            Stmt::Block(block) => block.span,
            Stmt::If(ifstmt) => ifstmt.span,
            Stmt::While { span, .. }
            | Stmt::DoWhile { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Case { span, .. }
            | Stmt::Default { span }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Return { span, .. }
            | Stmt::Null { span } => *span,
            Stmt::Goto { label } | Stmt::Labeled { label } => label.span,
        }
    }
}
