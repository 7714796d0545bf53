use super::*;
use crate::ctype::{CGType, ElmType};
use crate::diag::Diagnostics;

fn int() -> CGType {
    CGType::basic(ElmType::Int)
}

fn sp() -> Span {
    Span::default()
}

fn insert_var(symbols: &mut Symbols, name: &str, flags: SymbolFlags) -> SymbolRef {
    symbols
        .insert(SymbolKind::Var, name, format!("@{name}"), int(), flags, sp())
        .unwrap()
}

#[test]
fn insert_and_lookup() {
    let mut symbols = Symbols::new();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::empty());
    assert_eq!(symbols.lookup("x"), Some(sref));
    assert_eq!(symbols.lookup("y"), None);
    assert_eq!(symbols[sref].irident, "@x");
    assert_eq!(
        symbols.insert(SymbolKind::Var, "x", "@x".into(), int(), SymbolFlags::empty(), sp()),
        Err(CgenError::Exists)
    );
}

#[test]
fn redeclaration_composes_types_into_one_entry() {
    // int a[]; then int a[4]; leaves a single entry with the known size.
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = symbols
        .insert(
            SymbolKind::Var,
            "a",
            "@a".into(),
            CGType::array(int(), None),
            SymbolFlags::empty(),
            sp(),
        )
        .unwrap();
    symbols
        .redeclare(
            &mut diags,
            sref,
            SymbolKind::Var,
            &CGType::array(int(), Some(4)),
            SymbolFlags::empty(),
            sp(),
        )
        .unwrap();
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[sref].cgtype, CGType::array(int(), Some(4)));
    assert!(!diags.failed());
}

#[test]
fn kind_mismatch_is_fatal() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::empty());
    let result = symbols.redeclare(&mut diags, sref, SymbolKind::Fun, &int(), SymbolFlags::empty(), sp());
    assert_eq!(result, Err(CgenError::Invalid));
    assert!(diags.failed());
}

#[test]
fn static_after_non_static_is_fatal() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::empty());
    let result = symbols.redeclare(&mut diags, sref, SymbolKind::Var, &int(), SymbolFlags::STATIC, sp());
    assert_eq!(result, Err(CgenError::Invalid));
}

#[test]
fn non_static_after_static_warns() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::STATIC);
    symbols
        .redeclare(&mut diags, sref, SymbolKind::Var, &int(), SymbolFlags::empty(), sp())
        .unwrap();
    assert!(!diags.failed());
    assert_eq!(diags.warning_count(), 1);
    assert!(symbols[sref].flags.contains(SymbolFlags::STATIC));
}

#[test]
fn double_definition_is_fatal() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::DEFINED);
    let result = symbols.redeclare(&mut diags, sref, SymbolKind::Var, &int(), SymbolFlags::DEFINED, sp());
    assert_eq!(result, Err(CgenError::Invalid));
}

#[test]
fn declaration_after_definition_warns() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::DEFINED);
    symbols
        .redeclare(&mut diags, sref, SymbolKind::Var, &int(), SymbolFlags::empty(), sp())
        .unwrap();
    assert_eq!(diags.warning_count(), 1);
    assert!(symbols[sref].flags.contains(SymbolFlags::DEFINED));
}

#[test]
fn definition_clears_extern() {
    let mut symbols = Symbols::new();
    let mut diags = Diagnostics::silent();
    let sref = insert_var(&mut symbols, "x", SymbolFlags::EXTERN);
    symbols
        .redeclare(&mut diags, sref, SymbolKind::Var, &int(), SymbolFlags::DEFINED, sp())
        .unwrap();
    assert!(symbols[sref].flags.contains(SymbolFlags::DEFINED));
    assert!(!symbols[sref].flags.contains(SymbolFlags::EXTERN));
}

#[test]
fn iteration_preserves_insertion_order() {
    let mut symbols = Symbols::new();
    insert_var(&mut symbols, "a", SymbolFlags::empty());
    insert_var(&mut symbols, "b", SymbolFlags::empty());
    insert_var(&mut symbols, "c", SymbolFlags::empty());
    let names: Vec<_> = symbols.iter().map(|(_, s)| s.cident.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
}
