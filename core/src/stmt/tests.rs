use super::*;
use crate::module::CodeGen;
use crate::test_util::*;
use ccir_ast::{AssignOp, EnumElem, EnumSpec, TypeSpec};
use pretty_assertions::assert_eq;

/// Lowers `void f() { <stmts> }` and returns the emitted body text.
fn lower_fn(cg: &mut CodeGen, stmts: Vec<Stmt>) -> String {
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        stmts,
    );
    cg.process_global_decln(&decln).expect("function failed");
    let ccir_ir::Decln::Proc(proc) = cg.module.find("@f").expect("proc missing") else {
        panic!("@f is not a procedure")
    };
    proc.body.as_ref().expect("no body").to_string()
}

fn declare_int(cg: &mut CodeGen, name: &str) {
    cg.process_global_decln(&gdecln(int_specs(), vec![init_decl(d_id(name), None)]))
        .expect("declaration failed");
}

/// `x = <n>;` — a side-effecting statement that draws no warnings.
fn set_x(value: &str) -> Stmt {
    Stmt::Expr(asg(AssignOp::Assign, var("x"), num(value)))
}

#[test]
fn while_loop_layout() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let body = lower_fn(
        &mut cg,
        vec![Stmt::While {
            cond: bin(ccir_ast::BinOp::Lt, var("x"), num("10")),
            body: block(vec![set_x("1")]),
            span: sp(),
        }],
    );
    assert!(body.contains("%while0:"), "no loop label in:\n{body}");
    assert!(body.contains("jz.16"), "no condition exit in:\n{body}");
    assert!(body.contains("%end_while1"), "no end label in:\n{body}");
    assert!(body.contains("jmp %while0"), "no back jump in:\n{body}");
}

#[test]
fn do_while_tests_the_condition_at_the_bottom() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let body = lower_fn(
        &mut cg,
        vec![Stmt::DoWhile {
            body: block(vec![set_x("1")]),
            cond: bin(ccir_ast::BinOp::Lt, var("x"), num("10")),
            span: sp(),
        }],
    );
    assert!(body.contains("%do0:"));
    assert!(body.contains("%next_do1:"));
    assert!(body.contains("jnz.16"), "no bottom test in:\n{body}");
    assert!(body.contains("%end_do2:"));
}

#[test]
fn for_loop_with_continue_targets_the_step() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let body = lower_fn(
        &mut cg,
        vec![Stmt::For {
            init: Some(ccir_ast::ForInit::Expr(asg(
                AssignOp::Assign,
                var("x"),
                num("0"),
            ))),
            cond: Some(bin(ccir_ast::BinOp::Lt, var("x"), num("10"))),
            next: Some(un(ccir_ast::UnOp::PostInc, var("x"))),
            body: block(vec![Stmt::Continue { span: sp() }]),
            span: sp(),
        }],
    );
    assert!(body.contains("%for0:"));
    assert!(body.contains("jmp %next_for1"), "continue misses the step in:\n{body}");
    assert!(body.contains("%end_for2"));
}

#[test]
fn if_else_chain_layout() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let body = lower_fn(
        &mut cg,
        vec![Stmt::If(IfStmt {
            branches: vec![
                (bin(ccir_ast::BinOp::Lt, var("x"), num("1")), block(vec![set_x("1")])),
                (bin(ccir_ast::BinOp::Lt, var("x"), num("2")), block(vec![set_x("2")])),
            ],
            else_block: Some(block(vec![set_x("3")])),
            span: sp(),
        })],
    );
    assert!(body.contains("%end_if0"));
    assert!(body.contains("%false_if1:"));
    assert!(body.contains("%false_if2:"));
}

#[test]
fn break_and_continue_outside_a_loop_are_fatal() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Break { span: sp() }],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert_eq!(
        cg.diags.errors(),
        ["break statement not within a loop or switch"]
    );

    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Continue { span: sp() }],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert_eq!(cg.diags.errors(), ["continue statement not within a loop"]);
}

#[test]
fn goto_and_label_round_trip() {
    let mut cg = cgen();
    let body = lower_fn(
        &mut cg,
        vec![
            Stmt::Goto { label: id("out") },
            Stmt::Labeled { label: id("out") },
        ],
    );
    assert!(body.contains("jmp %_out"));
    assert!(body.contains("%_out:"));
    assert!(!cg.diags.failed());
}

#[test]
fn goto_without_definition_is_fatal_at_procedure_end() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Goto { label: id("nowhere") }],
    );
    // The body lowers fine; the closure check raises the error.
    let _ = cg.process_global_decln(&decln);
    assert!(cg.diags.failed());
    assert_eq!(cg.diags.errors(), ["label 'nowhere' used but not defined"]);
}

#[test]
fn unused_label_warns() {
    let mut cg = cgen();
    lower_fn(&mut cg, vec![Stmt::Labeled { label: id("orphan") }]);
    assert!(
        cg.diags
            .warnings()
            .contains(&"label 'orphan' defined but not used")
    );
}

#[test]
fn duplicate_label_is_fatal() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![
            Stmt::Labeled { label: id("l") },
            Stmt::Labeled { label: id("l") },
        ],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert!(cg.diags.errors().contains(&"duplicate label 'l'"));
}

#[test]
fn return_converts_to_the_return_type() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Long]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Return {
            expr: Some(num("3")),
            span: sp(),
        }],
    );
    cg.process_global_decln(&decln).unwrap();
    let ccir_ir::Decln::Proc(proc) = cg.module.find("@f").unwrap() else {
        panic!("not a proc")
    };
    let body = proc.body.as_ref().unwrap().to_string();
    assert!(body.contains("sgnext.32"), "no widening in:\n{body}");
    assert!(body.contains("retv.32"), "no retv in:\n{body}");
    assert!(!cg.diags.failed());
}

#[test]
fn return_mismatches_warn() {
    let mut cg = cgen();
    lower_fn(
        &mut cg,
        vec![Stmt::Return {
            expr: Some(num("1")),
            span: sp(),
        }],
    );
    assert_eq!(
        cg.diags.warnings(),
        ["'return' with a value in a function returning void"]
    );

    let mut cg = cgen();
    let decln = fundef(
        int_specs(),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Return {
            expr: None,
            span: sp(),
        }],
    );
    cg.process_global_decln(&decln).unwrap();
    assert_eq!(
        cg.diags.warnings(),
        ["'return' without a value in a non-void function"]
    );
}

#[test]
fn unused_expression_value_warns() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    lower_fn(&mut cg, vec![Stmt::Expr(bin(ccir_ast::BinOp::Add, var("x"), num("1")))]);
    assert_eq!(cg.diags.warnings(), ["computed expression value is not used"]);
}

#[test]
fn unused_local_variable_warns_at_scope_exit() {
    let mut cg = cgen();
    lower_fn(
        &mut cg,
        vec![Stmt::Decl(gdecln(
            int_specs(),
            vec![init_decl(d_id("unused"), None)],
        ))],
    );
    assert_eq!(cg.diags.warnings(), ["unused variable 'unused'"]);
}

#[test]
fn gratuitous_nested_block_warns() {
    let mut cg = cgen();
    lower_fn(&mut cg, vec![Stmt::Block(block(vec![]))]);
    assert_eq!(cg.diags.warnings(), ["gratuitous nested block"]);
}

fn color_enum_spec() -> TypeSpec {
    TypeSpec::Enum(EnumSpec {
        tag: Some(id("e")),
        elems: Some(vec![
            EnumElem {
                name: id("a"),
                value: Some(num("0")),
            },
            EnumElem {
                name: id("b"),
                value: Some(num("1")),
            },
        ]),
        span: sp(),
    })
}

#[test]
fn switch_dispatch_chain_layout() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let body = lower_fn(
        &mut cg,
        vec![Stmt::Switch {
            expr: var("x"),
            body: block(vec![
                Stmt::Case {
                    expr: num("1"),
                    span: sp(),
                },
                set_x("1"),
                Stmt::Break { span: sp() },
                Stmt::Default { span: sp() },
                set_x("2"),
            ]),
            span: sp(),
        }],
    );
    assert!(body.contains("%case_cnd0:"), "no dispatch label in:\n{body}");
    assert!(body.contains("%case_body2:"), "no body label in:\n{body}");
    assert!(body.contains("%default4:"), "no default label in:\n{body}");
    // The final dispatch point falls back to the default body.
    assert!(body.contains("jmp %default4"), "no default fallback in:\n{body}");
    assert!(body.contains("%end_switch1:"));
}

#[test]
fn duplicate_case_value_is_fatal() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Switch {
            expr: var("x"),
            body: block(vec![
                Stmt::Case {
                    expr: num("1"),
                    span: sp(),
                },
                Stmt::Case {
                    expr: bin(ccir_ast::BinOp::Add, num("0"), num("1")),
                    span: sp(),
                },
            ]),
            span: sp(),
        }],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert!(cg.diags.errors().contains(&"duplicate case value 1"));
}

#[test]
fn case_outside_a_switch_is_fatal() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Case {
            expr: num("1"),
            span: sp(),
        }],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert!(
        cg.diags
            .errors()
            .contains(&"case label not within a switch statement")
    );
}

#[test]
fn switch_on_enum_without_default_checks_exhaustiveness() {
    // enum e { a = 0, b = 1 } c; switch (c) { case 0: break; } leaves b
    // unhandled.
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        tspecs(&[color_enum_spec()]),
        vec![init_decl(d_id("c"), None)],
    ))
    .unwrap();
    lower_fn(
        &mut cg,
        vec![Stmt::Switch {
            expr: var("c"),
            body: block(vec![
                Stmt::Case {
                    expr: num("0"),
                    span: sp(),
                },
                Stmt::Break { span: sp() },
            ]),
            span: sp(),
        }],
    );
    assert_eq!(
        cg.diags.warnings(),
        ["enumeration value 'b' not handled in switch"]
    );
}

#[test]
fn switch_with_default_skips_the_exhaustiveness_check() {
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        tspecs(&[color_enum_spec()]),
        vec![init_decl(d_id("c"), None)],
    ))
    .unwrap();
    lower_fn(
        &mut cg,
        vec![Stmt::Switch {
            expr: var("c"),
            body: block(vec![
                Stmt::Case {
                    expr: num("0"),
                    span: sp(),
                },
                Stmt::Break { span: sp() },
                Stmt::Default { span: sp() },
                Stmt::Break { span: sp() },
            ]),
            span: sp(),
        }],
    );
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn switch_on_a_non_integer_is_fatal() {
    let mut cg = cgen();
    cg.process_global_decln(&gdecln(
        int_specs(),
        vec![init_decl(d_ptr(d_id("p")), None)],
    ))
    .unwrap();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![Stmt::Switch {
            expr: var("p"),
            body: block(vec![]),
            span: sp(),
        }],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert!(
        cg.diags
            .errors()
            .iter()
            .any(|e| e.starts_with("switch quantity is not an integer"))
    );
}

#[test]
fn local_declaration_with_initializer() {
    let mut cg = cgen();
    let body = lower_fn(
        &mut cg,
        vec![
            Stmt::Decl(gdecln(
                int_specs(),
                vec![init_decl(
                    d_id("y"),
                    Some(ccir_ast::Initializer::Expr(num("5"))),
                )],
            )),
            Stmt::Expr(asg(AssignOp::Assign, var("y"), num("6"))),
        ],
    );
    assert!(body.contains("lvarptr"), "no local pointer in:\n{body}");
    assert!(body.contains("write.16"), "no store in:\n{body}");
    assert!(!cg.diags.failed());
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn local_shadowing_warns() {
    let mut cg = cgen();
    declare_int(&mut cg, "x");
    lower_fn(
        &mut cg,
        vec![
            Stmt::Decl(gdecln(
                int_specs(),
                vec![init_decl(
                    d_id("x"),
                    Some(ccir_ast::Initializer::Expr(num("5"))),
                )],
            )),
            Stmt::Expr(asg(AssignOp::Assign, var("x"), num("6"))),
        ],
    );
    assert!(
        cg.diags
            .warnings()
            .contains(&"'x' shadows a wider-scope declaration")
    );
}
