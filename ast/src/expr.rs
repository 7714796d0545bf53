use crate::{Span, TypeName};
use serde::{Deserialize, Serialize};

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Ident {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// A literal as it appeared in the source, quotes/prefixes/suffixes included.
/// The code generator extracts the value (`literal` module); invalid literal
/// text is a code-generation diagnostic, not a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lit {
    pub text: String,
    pub span: Span,
}

impl Lit {
    pub fn new(text: impl Into<String>, span: Span) -> Lit {
        Lit {
            text: text.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Plus,    // +x
    Minus,   // -x
    BitNot,  // ~x
    LogNot,  // !x
    Deref,   // *x
    Addr,    // &x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    Neq,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,
}

/// One C expression. Parenthesized sub-expressions are transparent: the
/// parser drops the parentheses, so `(e)` arrives as `e`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(Lit),
    ChrLit(Lit),
    StrLit(Lit),
    Ident(Ident),
    Unary {
        op: UnOp,
        op_span: Span,
        arg: Box<Expr>,
    },
    Binary {
        op: BinOp,
        op_span: Span,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        op_span: Span,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_arm: Box<Expr>,
        else_arm: Box<Expr>,
        op_span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// `base.member` (`arrow` false) or `base->member` (`arrow` true).
    Member {
        base: Box<Expr>,
        member: Ident,
        arrow: bool,
    },
    Cast {
        tname: Box<TypeName>,
        arg: Box<Expr>,
        span: Span,
    },
    SizeofExpr {
        arg: Box<Expr>,
        span: Span,
    },
    SizeofType {
        tname: Box<TypeName>,
        span: Span,
    },
    VaStart {
        ap: Box<Expr>,
        span: Span,
    },
    VaArg {
        ap: Box<Expr>,
        tname: Box<TypeName>,
        span: Span,
    },
    VaEnd {
        ap: Box<Expr>,
        span: Span,
    },
    VaCopy {
        dest: Box<Expr>,
        src: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Source range of the whole expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Num(lit) | Expr::ChrLit(lit) | Expr::StrLit(lit) => lit.span,
            Expr::Ident(id) => id.span,
            Expr::Unary { op_span, arg, .. } => op_span.join(arg.span()),
            Expr::Binary { lhs, rhs, .. } | Expr::Assign { lhs, rhs, .. } => {
                lhs.span().join(rhs.span())
            }
            Expr::Ternary { cond, else_arm, .. } => cond.span().join(else_arm.span()),
            Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::Cast { span, .. }
            | Expr::SizeofExpr { span, .. }
            | Expr::SizeofType { span, .. }
            | Expr::VaStart { span, .. }
            | Expr::VaArg { span, .. }
            | Expr::VaEnd { span, .. }
            | Expr::VaCopy { span, .. } => *span,
            Expr::Member { base, member, .. } => base.span().join(member.span),
        }
    }
}
