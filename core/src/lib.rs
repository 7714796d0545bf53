//! The `ccir` code generator core.
//!
//! Consumes a C AST (`ccir_ast`) one top-level declaration at a time and
//! emits a machine-independent three-address IR module (`ccir_ir`) together
//! with a symbol/type directory. The externally visible entry point is
//! [module::CodeGen]; everything else is the machinery behind it:
//!
//! - [ctype] — C type representation and operations,
//! - [records] — tag-scoped struct/union/enum registries,
//! - [scope] / [symbols] / [labels] — name resolution layers,
//! - [expr] / [stmt] / [decl] / [init] — the four lowering subsystems,
//! - [diag] — the accumulating diagnostic sink.
//!
//! Fatal diagnostics set a module-wide error flag but do not stop
//! processing; the caller is expected to discard the produced module when
//! [diag::Diagnostics::failed] reports true.

pub mod ctype;
pub mod decl;
pub mod diag;
pub mod expr;
pub mod init;
pub mod labels;
pub mod literal;
pub mod module;
pub mod records;
pub mod scope;
pub mod stmt;
pub mod symbols;
pub mod test_util;

use thiserror::Error;

/// Error classes propagated between code-generation operations.
///
/// Most failures have already produced a diagnostic by the time the error
/// reaches the caller; the variant only tells the caller how to recover.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CgenError {
    /// A fatal diagnostic was reported and the module error flag is set.
    #[error("invalid code")]
    Invalid,
    /// An identifier is already present in the targeted container.
    #[error("identifier already defined")]
    Exists,
    /// A lookup failed.
    #[error("identifier not found")]
    NotFound,
    /// A constant expression was required but the value is not known at
    /// compile time.
    #[error("expression is not constant")]
    NotConstant,
    /// The parser reported a failure; pulling from it has stopped.
    #[error(transparent)]
    Parse(#[from] ccir_ast::ParseFault),
}
