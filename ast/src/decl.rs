use crate::{Expr, Ident, Lit, Span, stmt::Block};
use serde::{Deserialize, Serialize};

/// Declaration specifiers in source order. Order matters: the code generator
/// warns when specifiers appear out of the conventional order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclSpecs {
    pub specs: Vec<DeclSpec>,
}

impl DeclSpecs {
    pub fn new(specs: Vec<DeclSpec>) -> DeclSpecs {
        DeclSpecs { specs }
    }

    /// Span covering all specifiers, or the default span if there are none.
    pub fn span(&self) -> Span {
        self.specs
            .iter()
            .map(DeclSpec::span)
            .reduce(Span::join)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclSpec {
    Storage(StorageClass, Span),
    TypeQual(TypeQual, Span),
    FuncSpec(FuncSpec, Span),
    Attr(Attr),
    TypeSpec(TypeSpec, Span),
}

impl DeclSpec {
    pub fn span(&self) -> Span {
        match self {
            DeclSpec::Storage(_, span)
            | DeclSpec::TypeQual(_, span)
            | DeclSpec::FuncSpec(_, span)
            | DeclSpec::TypeSpec(_, span) => *span,
            DeclSpec::Attr(attr) => attr.name.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeQual {
    Const,
    Restrict,
    Volatile,
    Atomic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuncSpec {
    Inline,
}

/// One entry of an `__attribute__((...))` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeSpec {
    Void,
    Char,
    Short,
    Int,
    Long,
    Signed,
    Unsigned,
    Bool,
    VaList,
    Record(RecordSpec),
    Enum(EnumSpec),
    TypedefName(Ident),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
}

/// `struct tag { ... }` / `union tag` in any of the reference, declaration
/// and definition forms. `members` is `Some` exactly when a body was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub kind: RecordKind,
    pub tag: Option<Ident>,
    pub members: Option<Vec<MemberDecl>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub specs: DeclSpecs,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub tag: Option<Ident>,
    pub elems: Option<Vec<EnumElem>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumElem {
    pub name: Ident,
    pub value: Option<Expr>,
}

/// A declarator wraps the declared base type from the inside out: the leaf
/// is the declared identifier (or nothing, for abstract declarators) and
/// each wrapper adds a pointer, array or function layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declarator {
    /// Abstract declarator leaf: no identifier (type names, unnamed args).
    Abstract,
    Ident(Ident),
    Ptr {
        inner: Box<Declarator>,
        quals: Vec<(TypeQual, Span)>,
    },
    Array {
        inner: Box<Declarator>,
        size: Option<Expr>,
        span: Span,
    },
    Func {
        inner: Box<Declarator>,
        params: Vec<ParamDecl>,
        variadic: bool,
        span: Span,
    },
}

impl Declarator {
    /// The declared identifier, if this declarator has one.
    pub fn ident(&self) -> Option<&Ident> {
        match self {
            Declarator::Abstract => None,
            Declarator::Ident(id) => Some(id),
            Declarator::Ptr { inner, .. }
            | Declarator::Array { inner, .. }
            | Declarator::Func { inner, .. } => inner.ident(),
        }
    }

    /// The function declarator closest to the declared identifier: the one
    /// whose parameter list belongs to a function definition using this
    /// declarator. `None` when no function layer is present.
    pub fn innermost_func(&self) -> Option<(&[ParamDecl], bool)> {
        match self {
            Declarator::Abstract | Declarator::Ident(_) => None,
            Declarator::Ptr { inner, .. } | Declarator::Array { inner, .. } => {
                inner.innermost_func()
            }
            Declarator::Func {
                inner,
                params,
                variadic,
                ..
            } => inner.innermost_func().or(Some((params, *variadic))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub specs: DeclSpecs,
    pub decl: Declarator,
}

/// A type name as used by casts, `sizeof` and `va_arg`: specifiers plus an
/// abstract declarator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    pub specs: DeclSpecs,
    pub decl: Declarator,
}

impl TypeName {
    pub fn span(&self) -> Span {
        self.specs.span()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    Expr(Expr),
    List { items: Vec<InitItem>, span: Span },
}

impl Initializer {
    pub fn span(&self) -> Span {
        match self {
            Initializer::Expr(expr) => expr.span(),
            Initializer::List { span, .. } => *span,
        }
    }

    /// The string literal directly initializing a character array, if this
    /// initializer is one.
    pub fn as_string(&self) -> Option<&Lit> {
        match self {
            Initializer::Expr(Expr::StrLit(lit)) => Some(lit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitItem {
    pub designators: Vec<Designator>,
    pub init: Initializer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Designator {
    Field(Ident),
    Index(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitDeclarator {
    pub decl: Declarator,
    pub init: Option<Initializer>,
}

/// One declaration: specifiers plus declarators, used both at file scope and
/// for block-local declarations. A function definition is a declaration with
/// a single function declarator and a `body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decln {
    pub specs: DeclSpecs,
    pub decls: Vec<InitDeclarator>,
    pub body: Option<Block>,
    pub span: Span,
}
