//! C abstract syntax tree consumed by the `ccir` code generator.
//!
//! The parser is an external collaborator: it owns tokenization and grammar,
//! produces the node types defined here, and hands them to the code generator
//! one top-level declaration at a time through [AstSource]. Because C's
//! grammar cannot be parsed without knowing which identifiers name types, the
//! parser consults [TypeQuery] (implemented by the code generator over its
//! module scope) while it works.
//!
//! Nodes carry [Span] source positions instead of token pointers; the code
//! generator threads them through to diagnostics.

mod decl;
mod expr;
mod span;
mod stmt;

#[cfg(test)]
mod tests;

pub use decl::{
    Attr, DeclSpec, DeclSpecs, Declarator, Decln, Designator, EnumElem, EnumSpec, FuncSpec,
    InitDeclarator, InitItem, Initializer, MemberDecl, ParamDecl, RecordKind, RecordSpec,
    StorageClass, TypeName, TypeQual, TypeSpec,
};
pub use expr::{AssignOp, BinOp, Expr, Ident, Lit, UnOp};
pub use span::{Pos, Span};
pub use stmt::{Block, ForInit, IfStmt, Stmt};

use std::fmt;

/// Answers the parser's "is this identifier a typedef name?" queries.
///
/// Implemented by the code generator; the answer depends on the scopes that
/// are open at the point the parser asks.
pub trait TypeQuery {
    fn ident_is_type(&self, ident: &str) -> bool;
}

/// The parser side of the processing loop. The code generator pulls one
/// top-level declaration at a time until `Ok(None)`.
pub trait AstSource {
    fn next_global_decln(&mut self, types: &dyn TypeQuery)
    -> Result<Option<Decln>, ParseFault>;
}

/// A parse failure surfaced through [AstSource]. The code generator reports
/// it and stops pulling from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFault {
    pub span: Span,
    pub message: String,
}

impl fmt::Display for ParseFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: parse error: {}", self.span, self.message)
    }
}

impl std::error::Error for ParseFault {}
