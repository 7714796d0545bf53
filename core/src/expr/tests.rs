use super::*;
use crate::ctype::{CConv, FuncType};
use crate::module::{CodeGen, ProcGen};
use crate::test_util::*;
use ccir_ast::{AssignOp, BinOp, Declarator, TypeName, TypeSpec, UnOp};
use ccir_ir::Linkage;
use pretty_assertions::assert_eq;

fn cast(specs: &[TypeSpec], arg: Expr) -> Expr {
    Expr::Cast {
        tname: Box::new(TypeName {
            specs: tspecs(specs),
            decl: Declarator::Abstract,
        }),
        arg: Box::new(arg),
        span: sp(),
    }
}

/// Lowers an expression to an rvalue in a throwaway procedure context.
fn lower(cg: &mut CodeGen, expr: &Expr) -> Result<(EResult, LBlock), CgenError> {
    let mut pgen = ProcGen::new(cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let eres = pgen.process_expr(expr, &mut lblock)?;
    let eres = pgen.as_rvalue(eres, &mut lblock)?;
    Ok((eres, lblock))
}

fn rvalue(cg: &mut CodeGen, expr: &Expr) -> (EResult, LBlock) {
    lower(cg, expr).expect("lowering failed")
}

#[test]
fn integer_literal_is_a_known_constant() {
    let mut cg = cgen();
    let (eres, lblock) = rvalue(&mut cg, &num("42"));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 42);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert_eq!(lblock.entries.len(), 1);
    assert_eq!(lblock.entries[0].instr.as_ref().unwrap().to_string(), "%0 = imm.16 42");
}

#[test]
fn integer_overflow_folds_and_warns() {
    // 32767 + 1 wraps at 16 bits signed.
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, num("32767"), num("1")));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, -32768);
    assert_eq!(cg.diags.warnings(), ["integer arithmetic overflow"]);
}

#[test]
fn arithmetic_folding() {
    let mut cg = cgen();
    let cases: &[(Expr, i64)] = &[
        (bin(BinOp::Mul, num("6"), num("7")), 42),
        (bin(BinOp::Sub, num("1"), num("2")), -1),
        (bin(BinOp::Div, num("7"), num("2")), 3),
        (bin(BinOp::Mod, num("7"), num("2")), 1),
        (bin(BinOp::Shl, num("1"), num("4")), 16),
        (bin(BinOp::BitXor, num("12"), num("10")), 6),
        (un(UnOp::Minus, num("5")), -5),
        (un(UnOp::BitNot, num("0")), -1),
        (un(UnOp::LogNot, num("0")), 1),
    ];
    for (expr, expected) in cases {
        let (eres, _) = rvalue(&mut cg, expr);
        assert!(eres.cvknown, "not constant: {expr:?}");
        assert_eq!(eres.cvint, *expected, "wrong fold for {expr:?}");
    }
}

#[test]
fn division_by_zero_warns_and_is_not_constant() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Div, num("1"), num("0")));
    assert!(!eres.cvknown);
    assert_eq!(cg.diags.warnings(), ["division by zero"]);
}

#[test]
fn shift_out_of_range_warns() {
    let mut cg = cgen();
    rvalue(&mut cg, &bin(BinOp::Shl, num("1"), num("16")));
    assert_eq!(cg.diags.warnings(), ["shift amount exceeds operand width"]);
}

#[test]
fn uac_takes_the_larger_type() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, num("1"), num("2l")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Long));
    assert_eq!(eres.cvint, 3);
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn uac_mixed_sign_goes_unsigned_with_warning() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, num("1"), num("2u")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::UInt));
    assert_eq!(cg.diags.warnings(), ["signed value converted to unsigned"]);
}

#[test]
fn negative_to_unsigned_warns_specifically() {
    let mut cg = cgen();
    rvalue(
        &mut cg,
        &bin(BinOp::Add, un(UnOp::Minus, num("1")), num("2u")),
    );
    assert_eq!(cg.diags.warnings(), ["negative value converted to unsigned"]);
}

#[test]
fn bitwise_on_signed_warns() {
    let mut cg = cgen();
    rvalue(&mut cg, &bin(BinOp::BitAnd, num("1"), num("2")));
    assert_eq!(cg.diags.warnings(), ["bitwise operation on signed value"]);
    let mut cg = cgen();
    rvalue(&mut cg, &bin(BinOp::BitAnd, num("1u"), num("2u")));
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn char_operands_promote_to_int() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, chr("'a'"), num("1")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert_eq!(eres.cvint, 98);
}

#[test]
fn comparison_yields_truth_value() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Lt, num("1"), num("2")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Logic));
    assert_eq!(eres.cvint, 1);
    // Unsigned comparison uses the bit pattern.
    let (eres, _) = rvalue(
        &mut cg,
        &bin(BinOp::Gt, cast(&[TypeSpec::Unsigned], un(UnOp::Minus, num("1"))), num("1u")),
    );
    assert_eq!(eres.cvint, 1);
}

#[test]
fn logical_operators_short_circuit_and_fold() {
    let mut cg = cgen();
    let (eres, lblock) = rvalue(&mut cg, &bin(BinOp::LogAnd, num("0"), num("1")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Logic));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 0);
    // The short-circuit structure is present.
    let text = lblock.to_string();
    assert!(text.contains("jz"), "no short-circuit jump in:\n{text}");
    assert!(text.contains("%false_and0:"), "no false label in:\n{text}");

    let (eres, _) = rvalue(&mut cg, &bin(BinOp::LogOr, num("0"), num("3")));
    assert_eq!(eres.cvint, 1);
}

fn declare_int_array(cg: &mut CodeGen, name: &str, size: &str) {
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(d_arr(d_id(name), Some(num(size))), None)],
    ))
    .expect("declaration failed");
}

#[test]
fn pointer_integer_addition_folds_over_the_symbol() {
    // int a[10]; a + 3 is a pointer to int, 6 bytes past a.
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, var("a"), num("3")));
    assert_eq!(eres.cgtype, CGType::pointer(CGType::basic(ElmType::Int)));
    assert!(eres.cvknown);
    assert_eq!(eres.cvsymbol, cg.symbols.lookup("a"));
    assert_eq!(eres.cvint, 6);
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn pointer_addition_is_commutative() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, num("3"), var("a")));
    assert_eq!(eres.cgtype, CGType::pointer(CGType::basic(ElmType::Int)));
    assert_eq!(eres.cvint, 6);
}

#[test]
fn pointer_difference_in_elements() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let (eres, _) = rvalue(
        &mut cg,
        &bin(
            BinOp::Sub,
            bin(BinOp::Add, var("a"), num("5")),
            bin(BinOp::Add, var("a"), num("2")),
        ),
    );
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 3);
}

#[test]
fn constant_pointer_comparison_needs_a_common_base() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    declare_int_array(&mut cg, "b", "10");
    let (same, _) = rvalue(
        &mut cg,
        &bin(BinOp::Lt, var("a"), bin(BinOp::Add, var("a"), num("1"))),
    );
    assert!(same.cvknown);
    assert_eq!(same.cvint, 1);
    // Different base symbols do not fold, so a constant-expression
    // context rejects the comparison.
    let (diff, _) = rvalue(&mut cg, &bin(BinOp::Eq, var("a"), var("b")));
    assert!(!diff.cvknown);
    assert_eq!(
        cg.constexpr_eval(&bin(BinOp::Eq, var("a"), var("b"))),
        Err(CgenError::NotConstant)
    );
}

#[test]
fn array_indexing_yields_an_element_lvalue() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let mut pgen = ProcGen::new(&mut cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let eres = pgen
        .process_expr(&idx(var("a"), num("2")), &mut lblock)
        .unwrap();
    assert_eq!(eres.valtype, ValType::Lvalue);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 4);
    let text = lblock.to_string();
    assert!(text.contains("ptridx"), "no ptridx in:\n{text}");
}

#[test]
fn out_of_bounds_index_warns() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    lower(&mut cg, &idx(var("a"), num("10"))).unwrap();
    assert_eq!(cg.diags.warnings(), ["array index out of bounds"]);
}

#[test]
fn ternary_takes_the_common_arm_type() {
    // cond ? (int)1 : (long)2 has type long.
    let mut cg = cgen();
    let expr = ternary(
        num("1"),
        cast(&[TypeSpec::Int], num("1")),
        cast(&[TypeSpec::Long], num("2")),
    );
    let (eres, _) = rvalue(&mut cg, &expr);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Long));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 1);
}

#[test]
fn lvalue_required_for_assignment_target() {
    let mut cg = cgen();
    let result = lower(&mut cg, &asg(AssignOp::Assign, num("1"), num("2")));
    assert_eq!(result, Err(CgenError::Invalid));
    assert_eq!(cg.diags.errors(), ["lvalue required"]);
}

#[test]
fn assignment_to_array_is_fatal() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let result = lower(&mut cg, &asg(AssignOp::Assign, var("a"), num("0")));
    assert_eq!(result, Err(CgenError::Invalid));
    assert_eq!(cg.diags.errors(), ["assignment to expression with array type"]);
}

fn declare_int(cg: &mut CodeGen, name: &str) {
    cg.process_global_decln(&gdecln(int_specs(), vec![init_decl(d_id(name), None)]))
        .expect("declaration failed");
}

#[test]
fn assignment_emits_write_and_is_used() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let (eres, lblock) = rvalue(&mut cg, &asg(AssignOp::Assign, var("x"), num("5")));
    assert!(eres.valused);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    let text = lblock.to_string();
    assert!(text.contains("write.16"), "no write in:\n{text}");
}

#[test]
fn compound_assignment_reads_operates_writes() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let (eres, lblock) = rvalue(&mut cg, &asg(AssignOp::Add, var("x"), num("2")));
    assert!(eres.valused);
    let text = lblock.to_string();
    assert!(text.contains("read.16"), "no read in:\n{text}");
    assert!(text.contains("add.16"), "no add in:\n{text}");
    assert!(text.contains("write.16"), "no write in:\n{text}");
}

#[test]
fn increment_emits_read_add_write() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let (eres, lblock) = rvalue(&mut cg, &un(UnOp::PostInc, var("x")));
    assert!(eres.valused);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    let text = lblock.to_string();
    assert!(text.contains("read.16") && text.contains("add.16") && text.contains("write.16"));
}

#[test]
fn undeclared_identifier_is_fatal() {
    let mut cg = cgen();
    let result = lower(&mut cg, &var("missing"));
    assert_eq!(result, Err(CgenError::Invalid));
    assert_eq!(cg.diags.errors(), ["undeclared identifier 'missing'"]);
}

#[test]
fn truncating_conversion_warns() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    lower(
        &mut cg,
        &asg(AssignOp::Assign, var("x"), num("70000")),
    )
    .unwrap();
    assert_eq!(cg.diags.warnings(), ["number changed in conversion"]);
}

#[test]
fn explicit_cast_silences_conversion_warnings() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    lower(
        &mut cg,
        &asg(AssignOp::Assign, var("x"), cast(&[TypeSpec::Int], num("70000"))),
    )
    .unwrap();
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn null_constant_converts_to_pointer_silently() {
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(d_ptr(d_id("p")), None)],
    ))
    .unwrap();
    lower(&mut cg, &asg(AssignOp::Assign, var("p"), num("0"))).unwrap();
    assert!(cg.diags.warnings().is_empty());
    // A nonzero integer warns.
    lower(&mut cg, &asg(AssignOp::Assign, var("p"), num("7"))).unwrap();
    assert_eq!(
        cg.diags.warnings(),
        ["integer converted to pointer without a cast"]
    );
}

#[test]
fn sizeof_uses_fixed_dimensions() {
    let mut cg = cgen();
    let (eres, _) = rvalue(
        &mut cg,
        &Expr::SizeofType {
            tname: Box::new(TypeName {
                specs: tspecs(&[TypeSpec::Long]),
                decl: Declarator::Abstract,
            }),
            span: sp(),
        },
    );
    assert_eq!(eres.cgtype, CGType::basic(ElmType::UInt));
    assert_eq!(eres.cvint, 4);
}

#[test]
fn sizeof_expression_sees_the_array_type() {
    let mut cg = cgen();
    declare_int_array(&mut cg, "a", "10");
    let (eres, lblock) = rvalue(
        &mut cg,
        &Expr::SizeofExpr {
            arg: Box::new(var("a")),
            span: sp(),
        },
    );
    assert_eq!(eres.cvint, 20);
    // The operand itself is not evaluated.
    assert_eq!(lblock.entries.len(), 1);
}

#[test]
fn call_converts_fixed_arguments() {
    // int f(long); f(3) converts the argument to long.
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(
            d_fun(
                d_id("f"),
                vec![param(tspecs(&[TypeSpec::Long]), Declarator::Abstract)],
                false,
            ),
            None,
        )],
    ))
    .unwrap();
    let (eres, lblock) = rvalue(&mut cg, &call(var("f"), vec![num("3")]));
    assert!(eres.valused);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    let text = lblock.to_string();
    assert!(text.contains("sgnext.32"), "no widening in:\n{text}");
    assert!(text.contains("call.16 @f"), "no call in:\n{text}");
}

#[test]
fn call_argument_count_is_checked() {
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(
            d_fun(
                d_id("f"),
                vec![param(int_specs(), Declarator::Abstract)],
                false,
            ),
            None,
        )],
    ))
    .unwrap();
    assert_eq!(
        lower(&mut cg, &call(var("f"), vec![])),
        Err(CgenError::Invalid)
    );
    assert_eq!(
        lower(&mut cg, &call(var("f"), vec![num("1"), num("2")])),
        Err(CgenError::Invalid)
    );
    assert_eq!(
        cg.diags.errors(),
        [
            "too few arguments in function call",
            "too many arguments in function call"
        ]
    );
}

#[test]
fn indirect_call_synthesizes_a_callsign() {
    // int (*fp)(int); (*fp)(1) goes through calli with a callsign.
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(
            d_fun(
                d_ptr(d_id("fp")),
                vec![param(int_specs(), Declarator::Abstract)],
                false,
            ),
            None,
        )],
    ))
    .unwrap();
    let (_, lblock) = rvalue(&mut cg, &call(var("fp"), vec![num("1")]));
    let text = lblock.to_string();
    assert!(text.contains("calli.16"), "no calli in:\n{text}");
    assert!(text.contains("@@csign0"), "no callsign reference in:\n{text}");
    let callsign = cg.module.find("@@csign0").expect("callsign not emitted");
    let ccir_ir::Decln::Proc(proc) = callsign else {
        panic!("callsign is not a procedure")
    };
    assert_eq!(proc.linkage, Linkage::Callsign);
    assert!(proc.body.is_none());
}

#[test]
fn calling_a_non_function_is_fatal() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    assert_eq!(
        lower(&mut cg, &call(var("x"), vec![])),
        Err(CgenError::Invalid)
    );
}

#[test]
fn string_literal_becomes_a_module_variable() {
    let mut cg = cgen();
    let mut pgen = ProcGen::new(&mut cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let eres = pgen.process_expr(&string("\"hi\""), &mut lblock).unwrap();
    assert_eq!(eres.valtype, ValType::Lvalue);
    assert_eq!(
        eres.cgtype,
        CGType::array(CGType::basic(ElmType::Char), Some(3))
    );
    assert!(eres.cvknown);
    let decln = cg.module.find("@@str0").expect("string variable not emitted");
    let ccir_ir::Decln::Var(strvar) = decln else {
        panic!("string is not a variable")
    };
    let values: Vec<i64> = strvar
        .dblock
        .entries
        .iter()
        .map(|e| match e {
            ccir_ir::DataEntry::Int { value, .. } => *value,
            other => panic!("unexpected entry {other:?}"),
        })
        .collect();
    assert_eq!(values, [0x68, 0x69, 0]);
}

fn declare_point(cg: &mut CodeGen) {
    // struct point { int x; int y; }; struct point p;
    use ccir_ast::{MemberDecl, RecordSpec};
    let spec = TypeSpec::Record(RecordSpec {
        kind: ccir_ast::RecordKind::Struct,
        tag: Some(id("point")),
        members: Some(vec![MemberDecl {
            specs: int_specs(),
            declarators: vec![d_id("x"), d_id("y")],
        }]),
        span: sp(),
    });
    cg.process_global_decln(&gdecln(tspecs(&[spec]), vec![init_decl(d_id("p"), None)]))
        .expect("record declaration failed");
}

#[test]
fn member_access_folds_the_offset() {
    let mut cg = cgen();
    declare_point(&mut cg);
    let mut pgen = ProcGen::new(&mut cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let eres = pgen
        .process_expr(&member(var("p"), "y", false), &mut lblock)
        .unwrap();
    assert_eq!(eres.valtype, ValType::Lvalue);
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert!(eres.cvknown);
    assert_eq!(eres.cvint, 2);
    assert!(lblock.to_string().contains("recmbr"));
}

#[test]
fn unknown_member_is_fatal() {
    let mut cg = cgen();
    declare_point(&mut cg);
    assert_eq!(
        lower(&mut cg, &member(var("p"), "z", false)),
        Err(CgenError::Invalid)
    );
    assert_eq!(cg.diags.errors(), ["no member named 'z'"]);
}

#[test]
fn arrow_requires_a_record_pointer() {
    let mut cg = cgen();
    declare_point(&mut cg);
    // &p)->x
    let mut pgen = ProcGen::new(&mut cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let eres = pgen
        .process_expr(&member(un(UnOp::Addr, var("p")), "x", true), &mut lblock)
        .unwrap();
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert_eq!(eres.valtype, ValType::Lvalue);
}

#[test]
fn address_of_and_deref_round_trip() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let (eres, _) = rvalue(&mut cg, &un(UnOp::Addr, var("x")));
    assert_eq!(eres.cgtype, CGType::pointer(CGType::basic(ElmType::Int)));
    assert!(eres.cvknown);
    let mut pgen = ProcGen::new(&mut cg, CGType::basic(ElmType::Int), false);
    let mut lblock = LBlock::new();
    let back = pgen
        .process_expr(&un(UnOp::Deref, un(UnOp::Addr, var("x"))), &mut lblock)
        .unwrap();
    assert_eq!(back.valtype, ValType::Lvalue);
    assert_eq!(back.cgtype, CGType::basic(ElmType::Int));
}

#[test]
fn comma_warns_on_unused_left_operand() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Comma, num("1"), num("2")));
    assert_eq!(eres.cvint, 2);
    assert_eq!(
        cg.diags.warnings(),
        ["left operand of comma expression has no effect"]
    );
}

#[test]
fn constexpr_eval_folds_and_rejects_runtime_values() {
    let mut cg = cgen();
    let eres = cg
        .constexpr_eval(&bin(BinOp::Add, num("1"), num("2")))
        .unwrap();
    assert_eq!(eres.cvint, 3);

    declare_int(&mut cg, "x");
    assert_eq!(
        cg.constexpr_eval(&var("x")),
        Err(CgenError::NotConstant)
    );
    assert!(cg.diags.errors().contains(&"constant expression required"));
}

#[test]
fn enum_mixing_warns() {
    use ccir_ast::{EnumElem, EnumSpec};
    let mut cg = cgen();
    let spec = TypeSpec::Enum(EnumSpec {
        tag: Some(id("color")),
        elems: Some(vec![
            EnumElem {
                name: id("red"),
                value: None,
            },
            EnumElem {
                name: id("green"),
                value: None,
            },
        ]),
        span: sp(),
    });
    cg.process_global_decln(&gdecln(tspecs(&[spec]), vec![init_decl(d_id("c"), None)]))
        .unwrap();
    let (eres, _) = rvalue(&mut cg, &bin(BinOp::Add, var("red"), num("1")));
    assert_eq!(eres.cgtype, CGType::basic(ElmType::Int));
    assert_eq!(cg.diags.warnings(), ["mixing enum and non-enum operands"]);
    // The enumerator itself is a known constant of the enum type.
    let (green, _) = rvalue(&mut cg, &var("green"));
    assert!(green.cvknown);
    assert_eq!(green.cvint, 1);
    assert!(matches!(green.cgtype, CGType::Enum(_)));
}

#[test]
fn compound_assignment_widens_back_to_the_enum() {
    use ccir_ast::{EnumElem, EnumSpec};
    let mut cg = cgen();
    let spec = TypeSpec::Enum(EnumSpec {
        tag: Some(id("color")),
        elems: Some(vec![EnumElem {
            name: id("red"),
            value: None,
        }]),
        span: sp(),
    });
    cg.process_global_decln(&gdecln(tspecs(&[spec]), vec![init_decl(d_id("c"), None)]))
        .unwrap();
    let (eres, _) = rvalue(&mut cg, &asg(AssignOp::Add, var("c"), num("1")));
    assert!(matches!(eres.cgtype, CGType::Enum(_)));
}

#[test]
fn void_cast_discards_the_value() {
    let mut cg = cgen();
    let (eres, _) = rvalue(&mut cg, &cast(&[TypeSpec::Void], num("1")));
    assert!(eres.cgtype.is_void());
    assert!(eres.var.is_none());
    assert!(eres.valused);
}

#[test]
fn function_type_queries() {
    let ftype = CGType::Func(Box::new(FuncType {
        ret: CGType::basic(ElmType::Void),
        args: vec![CGType::basic(ElmType::Int)],
        variadic: true,
        cconv: CConv::Usr,
    }));
    assert!(ftype.is_func());
    assert!(!ftype.is_scalar());
}
