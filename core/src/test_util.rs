//! Place to put utilities that are only used by tests: AST builders and a
//! silent code generator, so test cases read like the C they stand for.

use crate::diag::Diagnostics;
use crate::module::CodeGen;
use ccir_ast::{
    AssignOp, AstSource, BinOp, Block, DeclSpec, DeclSpecs, Declarator, Decln, Expr, Ident,
    InitDeclarator, Initializer, Lit, ParamDecl, ParseFault, Span, Stmt, TypeQuery, TypeSpec, UnOp,
};

/// A code generator with a silent diagnostic sink; tests assert on the
/// collected diagnostics instead of stderr.
pub fn cgen() -> CodeGen {
    CodeGen::with_diags(Diagnostics::silent())
}

pub fn sp() -> Span {
    Span::default()
}

pub fn id(name: &str) -> Ident {
    Ident::new(name, sp())
}

pub fn num(text: &str) -> Expr {
    Expr::Num(Lit::new(text, sp()))
}

pub fn chr(text: &str) -> Expr {
    Expr::ChrLit(Lit::new(text, sp()))
}

pub fn string(text: &str) -> Expr {
    Expr::StrLit(Lit::new(text, sp()))
}

pub fn var(name: &str) -> Expr {
    Expr::Ident(id(name))
}

pub fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        op_span: sp(),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn un(op: UnOp, arg: Expr) -> Expr {
    Expr::Unary {
        op,
        op_span: sp(),
        arg: Box::new(arg),
    }
}

pub fn asg(op: AssignOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Assign {
        op,
        op_span: sp(),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn idx(base: Expr, index: Expr) -> Expr {
    Expr::Index {
        base: Box::new(base),
        index: Box::new(index),
        span: sp(),
    }
}

pub fn member(base: Expr, name: &str, arrow: bool) -> Expr {
    Expr::Member {
        base: Box::new(base),
        member: id(name),
        arrow,
    }
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args,
        span: sp(),
    }
}

pub fn ternary(cond: Expr, then_arm: Expr, else_arm: Expr) -> Expr {
    Expr::Ternary {
        cond: Box::new(cond),
        then_arm: Box::new(then_arm),
        else_arm: Box::new(else_arm),
        op_span: sp(),
    }
}

/// Declaration specifiers made purely of type specifiers.
pub fn tspecs(specs: &[TypeSpec]) -> DeclSpecs {
    DeclSpecs::new(
        specs
            .iter()
            .cloned()
            .map(|ts| DeclSpec::TypeSpec(ts, sp()))
            .collect(),
    )
}

pub fn int_specs() -> DeclSpecs {
    tspecs(&[TypeSpec::Int])
}

pub fn d_id(name: &str) -> Declarator {
    Declarator::Ident(id(name))
}

pub fn d_ptr(inner: Declarator) -> Declarator {
    Declarator::Ptr {
        inner: Box::new(inner),
        quals: Vec::new(),
    }
}

pub fn d_arr(inner: Declarator, size: Option<Expr>) -> Declarator {
    Declarator::Array {
        inner: Box::new(inner),
        size,
        span: sp(),
    }
}

pub fn d_fun(inner: Declarator, params: Vec<ParamDecl>, variadic: bool) -> Declarator {
    Declarator::Func {
        inner: Box::new(inner),
        params,
        variadic,
        span: sp(),
    }
}

pub fn param(specs: DeclSpecs, decl: Declarator) -> ParamDecl {
    ParamDecl { specs, decl }
}

pub fn init_decl(decl: Declarator, init: Option<Initializer>) -> InitDeclarator {
    InitDeclarator { decl, init }
}

/// A declaration without a body.
pub fn gdecln(specs: DeclSpecs, decls: Vec<InitDeclarator>) -> Decln {
    Decln {
        specs,
        decls,
        body: None,
        span: sp(),
    }
}

/// A function definition.
pub fn fundef(specs: DeclSpecs, decl: Declarator, stmts: Vec<Stmt>) -> Decln {
    Decln {
        specs,
        decls: vec![init_decl(decl, None)],
        body: Some(block(stmts)),
        span: sp(),
    }
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block::new(stmts, sp())
}

/// An [AstSource] over a pre-built list of top-level declarations.
pub struct VecSource {
    declns: std::vec::IntoIter<Decln>,
}

impl VecSource {
    pub fn new(declns: Vec<Decln>) -> VecSource {
        VecSource {
            declns: declns.into_iter(),
        }
    }
}

impl AstSource for VecSource {
    fn next_global_decln(
        &mut self,
        _types: &dyn TypeQuery,
    ) -> Result<Option<Decln>, ParseFault> {
        Ok(self.declns.next())
    }
}
