use super::*;

fn sp() -> Span {
    ccir_ast::Span::default()
}

fn int_ok(text: &str) -> (i64, ElmType) {
    let mut diags = Diagnostics::silent();
    let parsed = parse_int(&mut diags, sp(), text).expect("parse failed");
    assert!(!diags.failed(), "unexpected error for {text}");
    parsed
}

#[test]
fn decimal_octal_hex() {
    assert_eq!(int_ok("0"), (0, ElmType::Int));
    assert_eq!(int_ok("42"), (42, ElmType::Int));
    assert_eq!(int_ok("017"), (15, ElmType::Int));
    assert_eq!(int_ok("0x2A"), (42, ElmType::Int));
    assert_eq!(int_ok("0X2a"), (42, ElmType::Int));
}

#[test]
fn suffixes_in_any_case_and_order() {
    assert_eq!(int_ok("1u").1, ElmType::UInt);
    assert_eq!(int_ok("1U").1, ElmType::UInt);
    assert_eq!(int_ok("1l").1, ElmType::Long);
    assert_eq!(int_ok("1ul").1, ElmType::ULong);
    assert_eq!(int_ok("1lu").1, ElmType::ULong);
    assert_eq!(int_ok("1LL").1, ElmType::LongLong);
    assert_eq!(int_ok("1llu").1, ElmType::ULongLong);
    assert_eq!(int_ok("1ULL").1, ElmType::ULongLong);
}

#[test]
fn magnitude_widens_the_type() {
    // int is 16 bits, so 40000 does not fit a plain int.
    assert_eq!(int_ok("32767").1, ElmType::Int);
    assert_eq!(int_ok("40000").1, ElmType::Long);
    assert_eq!(int_ok("3000000000").1, ElmType::LongLong);
    // Hexadecimal literals may fall over to unsigned.
    assert_eq!(int_ok("0xffff").1, ElmType::UInt);
    assert_eq!(int_ok("0x7fff").1, ElmType::Int);
}

#[test]
fn invalid_literals_are_fatal() {
    let mut diags = Diagnostics::silent();
    assert!(parse_int(&mut diags, sp(), "12xy").is_err());
    assert!(parse_int(&mut diags, sp(), "0x").is_err());
    assert!(parse_int(&mut diags, sp(), "089").is_err());
    assert!(diags.failed());
}

#[test]
fn char_literals() {
    let mut diags = Diagnostics::silent();
    assert_eq!(parse_char(&mut diags, sp(), "'a'").unwrap(), (97, false));
    assert_eq!(parse_char(&mut diags, sp(), "L'a'").unwrap(), (97, true));
    assert_eq!(parse_char(&mut diags, sp(), "'\\n'").unwrap(), (10, false));
    assert_eq!(parse_char(&mut diags, sp(), "'\\0'").unwrap(), (0, false));
    assert_eq!(parse_char(&mut diags, sp(), "'\\x41'").unwrap(), (0x41, false));
    assert_eq!(parse_char(&mut diags, sp(), "'\\101'").unwrap(), (0o101, false));
    assert_eq!(parse_char(&mut diags, sp(), "'\\\\'").unwrap(), (92, false));
    assert!(!diags.failed());
}

#[test]
fn bad_char_literals_are_fatal() {
    let mut diags = Diagnostics::silent();
    assert!(parse_char(&mut diags, sp(), "''").is_err());
    assert!(parse_char(&mut diags, sp(), "'ab'").is_err());
    assert!(parse_char(&mut diags, sp(), "'\\q'").is_err());
    assert!(diags.failed());
}

#[test]
fn out_of_range_escape_warns() {
    let mut diags = Diagnostics::silent();
    parse_char(&mut diags, sp(), "'\\x1ff'").unwrap();
    assert_eq!(diags.warning_count(), 1);
    // A wide literal has more headroom.
    let mut diags = Diagnostics::silent();
    parse_char(&mut diags, sp(), "L'\\x1ff'").unwrap();
    assert_eq!(diags.warning_count(), 0);
}

#[test]
fn string_literals() {
    let mut diags = Diagnostics::silent();
    let (chars, wide) = parse_string(&mut diags, sp(), "\"hi\"").unwrap();
    assert_eq!(chars, [0x68, 0x69]);
    assert!(!wide);
    let (chars, wide) = parse_string(&mut diags, sp(), "L\"a\\n\"").unwrap();
    assert_eq!(chars, [97, 10]);
    assert!(wide);
    let (chars, _) = parse_string(&mut diags, sp(), "\"\"").unwrap();
    assert!(chars.is_empty());
    assert!(!diags.failed());
}
