use super::*;
use crate::diag::Diagnostics;

fn sp() -> Span {
    Span::default()
}

#[test]
fn define_then_use_is_clean() {
    let mut labels = Labels::new();
    labels.define("out", sp()).unwrap();
    labels.use_label("out", sp());
    let mut diags = Diagnostics::silent();
    labels.check(&mut diags);
    assert!(!diags.failed());
    assert_eq!(diags.warning_count(), 0);
}

#[test]
fn use_before_define_is_clean() {
    let mut labels = Labels::new();
    labels.use_label("out", sp());
    labels.define("out", sp()).unwrap();
    let mut diags = Diagnostics::silent();
    labels.check(&mut diags);
    assert!(!diags.failed());
}

#[test]
fn duplicate_definition_rejected() {
    let mut labels = Labels::new();
    labels.define("out", sp()).unwrap();
    assert_eq!(labels.define("out", sp()), Err(CgenError::Exists));
}

#[test]
fn used_but_undefined_is_fatal() {
    let mut labels = Labels::new();
    labels.use_label("missing", sp());
    let mut diags = Diagnostics::silent();
    labels.check(&mut diags);
    assert!(diags.failed());
}

#[test]
fn defined_but_unused_warns() {
    let mut labels = Labels::new();
    labels.define("orphan", sp()).unwrap();
    let mut diags = Diagnostics::silent();
    labels.check(&mut diags);
    assert!(!diags.failed());
    assert_eq!(diags.warning_count(), 1);
}

#[test]
fn ir_label_uses_underscore_prefix() {
    assert_eq!(Labels::ir_label("out"), "%_out");
}
