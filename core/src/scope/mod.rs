//! Nested lexical scopes.
//!
//! A scope is a stack of frames; each frame maps names to members in
//! insertion order. Ordinary identifiers and tags (struct/union/enum names)
//! live in logically separate namespaces but share the frame storage,
//! discriminated by member kind.
//!
//! Every entry carries its defining span and a `used` flag; the frame
//! returned by [Scope::pop] lets the caller run the unused-identifier
//! warning pass in insertion order.


use crate::CgenError;
use crate::ctype::CGType;
use crate::records::{EnumElemRef, EnumRef, RecordKind, RecordRef};
use crate::symbols::SymbolRef;
use ccir_ast::Span;

/// What a name resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeMember {
    /// A module-level symbol (function or global variable).
    GSym { symbol: SymbolRef, cgtype: CGType },
    /// A procedure argument, by IR variable name.
    Arg { vname: String, cgtype: CGType },
    /// A local variable, by IR variable name.
    LVar { vname: String, cgtype: CGType },
    /// A typedef.
    TDef { cgtype: CGType },
    /// An enum element.
    EElem { elem: EnumElemRef },
    /// A struct/union tag.
    RecordTag { record: RecordRef, kind: RecordKind },
    /// An enum tag.
    EnumTag { enum_ref: EnumRef },
}

impl ScopeMember {
    /// Tag-namespace members.
    pub fn is_tag(&self) -> bool {
        matches!(
            self,
            ScopeMember::RecordTag { .. } | ScopeMember::EnumTag { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    pub name: String,
    pub member: ScopeMember,
    pub span: Span,
    pub used: bool,
}

#[derive(Debug, Default)]
struct Frame {
    entries: Vec<ScopeEntry>,
}

impl Frame {
    fn find(&self, name: &str, tag: bool) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.member.is_tag() == tag && e.name == name)
    }
}

/// The scope stack. Created with the module frame already open; that frame
/// is never popped.
#[derive(Debug)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Scope {
        Scope::new()
    }
}

impl Scope {
    pub fn new() -> Scope {
        Scope {
            frames: vec![Frame::default()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Closes the innermost frame and returns its entries in insertion
    /// order for the unused-identifier warning pass.
    pub fn pop(&mut self) -> Vec<ScopeEntry> {
        assert!(self.frames.len() > 1, "popping the module frame");
        self.frames.pop().expect("scope stack empty").entries
    }

    /// True when only the module frame is open.
    pub fn in_module_scope(&self) -> bool {
        self.frames.len() == 1
    }

    fn insert(&mut self, name: &str, span: Span, member: ScopeMember) -> Result<(), CgenError> {
        let tag = member.is_tag();
        let frame = self.frames.last_mut().expect("scope stack empty");
        if frame.find(name, tag).is_some() {
            return Err(CgenError::Exists);
        }
        frame.entries.push(ScopeEntry {
            name: name.to_string(),
            member,
            span,
            used: false,
        });
        Ok(())
    }

    pub fn insert_gsym(
        &mut self,
        name: &str,
        span: Span,
        symbol: SymbolRef,
        cgtype: CGType,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::GSym { symbol, cgtype })
    }

    pub fn insert_arg(
        &mut self,
        name: &str,
        span: Span,
        vname: String,
        cgtype: CGType,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::Arg { vname, cgtype })
    }

    pub fn insert_lvar(
        &mut self,
        name: &str,
        span: Span,
        vname: String,
        cgtype: CGType,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::LVar { vname, cgtype })
    }

    pub fn insert_tdef(&mut self, name: &str, span: Span, cgtype: CGType) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::TDef { cgtype })
    }

    pub fn insert_eelem(
        &mut self,
        name: &str,
        span: Span,
        elem: EnumElemRef,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::EElem { elem })
    }

    pub fn insert_record_tag(
        &mut self,
        name: &str,
        span: Span,
        record: RecordRef,
        kind: RecordKind,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::RecordTag { record, kind })
    }

    pub fn insert_enum_tag(
        &mut self,
        name: &str,
        span: Span,
        enum_ref: EnumRef,
    ) -> Result<(), CgenError> {
        self.insert(name, span, ScopeMember::EnumTag { enum_ref })
    }

    fn lookup_in(&self, name: &str, tag: bool, local_only: bool) -> Option<&ScopeEntry> {
        for frame in self.frames.iter().rev() {
            if let Some(i) = frame.find(name, tag) {
                return Some(&frame.entries[i]);
            }
            if local_only {
                break;
            }
        }
        None
    }

    /// Resolves an ordinary identifier, walking outward.
    pub fn lookup(&self, name: &str) -> Option<&ScopeEntry> {
        self.lookup_in(name, false, false)
    }

    /// Resolves an ordinary identifier in the innermost frame only.
    pub fn lookup_local(&self, name: &str) -> Option<&ScopeEntry> {
        self.lookup_in(name, false, true)
    }

    /// Resolves a tag, walking outward.
    pub fn lookup_tag(&self, name: &str) -> Option<&ScopeEntry> {
        self.lookup_in(name, true, false)
    }

    /// Resolves a tag in the innermost frame only.
    pub fn lookup_tag_local(&self, name: &str) -> Option<&ScopeEntry> {
        self.lookup_in(name, true, true)
    }

    /// True when `name` exists in an enclosing (non-innermost) frame; used
    /// for the shadowing warning.
    pub fn shadows(&self, name: &str, tag: bool) -> bool {
        self.frames[..self.frames.len() - 1]
            .iter()
            .any(|frame| frame.find(name, tag).is_some())
    }

    fn mark_used_in(&mut self, name: &str, tag: bool) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(i) = frame.find(name, tag) {
                frame.entries[i].used = true;
                return;
            }
        }
    }

    /// Marks the innermost binding of `name` as used.
    pub fn mark_used(&mut self, name: &str) {
        self.mark_used_in(name, false);
    }

    /// Marks the innermost tag binding of `name` as used.
    pub fn mark_used_tag(&mut self, name: &str) {
        self.mark_used_in(name, true);
    }
}
