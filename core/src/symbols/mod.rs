//! Module-level symbol directory.
//!
//! One directory exists per translation unit. Each named entity (function,
//! variable, typedef) gets a single entry; redeclarations are merged into
//! it by composing the declared types and reconciling the flags.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::ctype::CGType;
use crate::diag::Diagnostics;
use bitflags::bitflags;
use ccir_ast::Span;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Fun,
    Var,
    Type,
}

impl SymbolKind {
    fn what(self) -> &'static str {
        match self {
            SymbolKind::Fun => "function",
            SymbolKind::Var => "variable",
            SymbolKind::Type => "type",
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SymbolFlags: u8 {
        const DEFINED = 1;
        const STATIC = 1 << 1;
        const EXTERN = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// The C identifier.
    pub cident: String,
    /// The IR identifier (`@` prefixed).
    pub irident: String,
    pub kind: SymbolKind,
    pub cgtype: CGType,
    pub flags: SymbolFlags,
    /// Span of the first declaration.
    pub span: Span,
}

/// The symbol directory.
#[derive(Debug, Default)]
pub struct Symbols {
    syms: Vec<Symbol>,
    index: HashMap<String, SymbolRef>,
}

impl Symbols {
    pub fn new() -> Symbols {
        Symbols::default()
    }

    /// Inserts a new entry. The caller has already checked that `cident`
    /// is not present.
    pub fn insert(
        &mut self,
        kind: SymbolKind,
        cident: &str,
        irident: String,
        cgtype: CGType,
        flags: SymbolFlags,
        span: Span,
    ) -> Result<SymbolRef, CgenError> {
        if self.index.contains_key(cident) {
            return Err(CgenError::Exists);
        }
        let sref = SymbolRef(u32::try_from(self.syms.len()).expect("symbol count overflow"));
        self.syms.push(Symbol {
            cident: cident.to_string(),
            irident,
            kind,
            cgtype,
            flags,
            span,
        });
        self.index.insert(cident.to_string(), sref);
        Ok(sref)
    }

    pub fn lookup(&self, cident: &str) -> Option<SymbolRef> {
        self.index.get(cident).copied()
    }

    /// Merges a redeclaration of an existing symbol per the C rules:
    /// the kind must match, the types must compose, and the flags are
    /// reconciled. Diagnostics are emitted here; on error the entry is
    /// left unchanged.
    pub fn redeclare(
        &mut self,
        diags: &mut Diagnostics,
        sref: SymbolRef,
        kind: SymbolKind,
        cgtype: &CGType,
        flags: SymbolFlags,
        span: Span,
    ) -> Result<(), CgenError> {
        let sym = &self.syms[sref.0 as usize];
        if sym.kind != kind {
            diags.fatal(
                span,
                format!(
                    "'{}' redeclared as a different kind of symbol (was {}, now {})",
                    sym.cident,
                    sym.kind.what(),
                    kind.what()
                ),
            );
            return Err(CgenError::Invalid);
        }
        let composed = match sym.cgtype.compose(cgtype) {
            Ok(composed) => composed,
            Err(_) => {
                diags.fatal(
                    span,
                    format!("conflicting types for '{}'", sym.cident),
                );
                return Err(CgenError::Invalid);
            }
        };

        // Static/non-static reconciliation: following a non-static
        // declaration with a static one is an error; the other direction
        // only warns.
        let was_static = sym.flags.contains(SymbolFlags::STATIC);
        let now_static = flags.contains(SymbolFlags::STATIC);
        if now_static && !was_static {
            diags.fatal(
                span,
                format!("static declaration of '{}' follows non-static", sym.cident),
            );
            return Err(CgenError::Invalid);
        }
        if was_static && !now_static && !flags.contains(SymbolFlags::EXTERN) {
            diags.warn(
                span,
                format!("non-static declaration of '{}' follows static", sym.cident),
            );
        }

        if sym.flags.contains(SymbolFlags::DEFINED) {
            if flags.contains(SymbolFlags::DEFINED) {
                diags.fatal(span, format!("redefinition of '{}'", sym.cident));
                return Err(CgenError::Invalid);
            }
            diags.warn(
                span,
                format!("declaration of '{}' follows definition", sym.cident),
            );
        }

        let sym = &mut self.syms[sref.0 as usize];
        sym.cgtype = composed;
        sym.flags |= flags & (SymbolFlags::DEFINED | SymbolFlags::STATIC);
        // A definition resolves the tentative extern state.
        if flags.contains(SymbolFlags::DEFINED) {
            sym.flags.remove(SymbolFlags::EXTERN);
        } else if !flags.contains(SymbolFlags::EXTERN) {
            sym.flags.remove(SymbolFlags::EXTERN);
        }
        Ok(())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolRef, &Symbol)> {
        self.syms
            .iter()
            .enumerate()
            .map(|(i, sym)| (SymbolRef(i as u32), sym))
    }

    pub fn len(&self) -> usize {
        self.syms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }
}

impl Index<SymbolRef> for Symbols {
    type Output = Symbol;

    fn index(&self, sref: SymbolRef) -> &Symbol {
        &self.syms[sref.0 as usize]
    }
}

impl IndexMut<SymbolRef> for Symbols {
    fn index_mut(&mut self, sref: SymbolRef) -> &mut Symbol {
        &mut self.syms[sref.0 as usize]
    }
}
