use super::*;
use crate::ctype::ElmType;

fn int() -> CGType {
    CGType::basic(ElmType::Int)
}

#[test]
fn record_members_keep_declaration_order() {
    let mut records = Records::new();
    let rref = records.create(RecordKind::Struct, Some("point".into()), "@@point".into());
    records.append(rref, "x", int()).unwrap();
    records.append(rref, "y", int()).unwrap();
    let names: Vec<_> = records[rref].elems.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
    assert_eq!(records[rref].find_elem("y").unwrap().0, 1);
    assert!(records[rref].find_elem("z").is_none());
}

#[test]
fn duplicate_member_rejected() {
    let mut records = Records::new();
    let rref = records.create(RecordKind::Struct, None, "@@anon0".into());
    records.append(rref, "x", int()).unwrap();
    assert_eq!(records.append(rref, "x", int()), Err(CgenError::Exists));
}

#[test]
fn enum_append_and_lookup() {
    let mut enums = Enums::new();
    let eref = enums.create(Some("color".into()));
    let red = enums.append(eref, "red", 0).unwrap();
    let green = enums.append(eref, "green", 7).unwrap();
    assert_eq!(enums.elem(red).value, 0);
    assert_eq!(enums.elem(green).name, "green");
    assert_eq!(enums.find_value(eref, 7), Some(green));
    assert_eq!(enums.find_value(eref, 1), None);
    assert_eq!(enums.append(eref, "red", 2), Err(CgenError::Exists));
}

#[test]
fn enum_strictness() {
    let mut enums = Enums::new();
    let named = enums.create(Some("e".into()));
    assert!(enums[named].strict());
    let anon = enums.create(None);
    assert!(!enums[anon].strict());
    enums[anon].named = true;
    assert!(enums[anon].strict());
}

#[test]
fn registry_iteration_order() {
    let mut records = Records::new();
    let a = records.create(RecordKind::Struct, Some("a".into()), "@@a".into());
    let b = records.create(RecordKind::Union, Some("b".into()), "@@b".into());
    let refs: Vec<_> = records.iter().map(|(r, _)| r).collect();
    assert_eq!(refs, [a, b]);
}
