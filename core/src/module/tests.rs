use super::*;
use crate::test_util::*;
use ccir_ast::{Initializer, Stmt, TypeSpec};
use pretty_assertions::assert_eq;

#[test]
fn process_source_drains_the_parser() {
    let mut cg = cgen();
    let mut src = VecSource::new(vec![
        gdecln(int_specs(), vec![init_decl(d_id("x"), Some(Initializer::Expr(num("1"))))]),
        fundef(
            tspecs(&[TypeSpec::Void]),
            d_fun(d_id("f"), vec![], false),
            vec![],
        ),
    ]);
    cg.process_source(&mut src).expect("processing failed");
    assert!(cg.module.find("@x").is_some());
    assert!(cg.module.find("@f").is_some());
    assert!(!cg.diags.failed());
}

#[test]
fn declared_but_undefined_symbols_become_extern_declns() {
    // int g(long); extern int e; — both are emitted with extern linkage
    // after the module is processed.
    let mut cg = cgen();
    let mut src = VecSource::new(vec![
        gdecln(
            int_specs(),
            vec![init_decl(
                d_fun(
                    d_id("g"),
                    vec![param(tspecs(&[TypeSpec::Long]), ccir_ast::Declarator::Abstract)],
                    false,
                ),
                None,
            )],
        ),
        {
            let mut decln = gdecln(int_specs(), vec![init_decl(d_id("e"), None)]);
            decln
                .specs
                .specs
                .insert(0, ccir_ast::DeclSpec::Storage(ccir_ast::StorageClass::Extern, sp()));
            decln
        },
    ]);
    cg.process_source(&mut src).unwrap();

    let ir::Decln::Proc(gproc) = cg.module.find("@g").expect("@g missing") else {
        panic!("@g is not a proc")
    };
    assert_eq!(gproc.linkage, ir::Linkage::Extern);
    assert!(gproc.body.is_none());
    assert_eq!(gproc.args.len(), 1);
    assert_eq!(gproc.args[0].atype, ir::Texpr::Int(32));

    let ir::Decln::Var(evar) = cg.module.find("@e").expect("@e missing") else {
        panic!("@e is not a var")
    };
    assert_eq!(evar.linkage, ir::Linkage::Extern);
    assert!(evar.dblock.entries.is_empty());
}

#[test]
fn defined_symbols_are_not_re_emitted() {
    let mut cg = cgen();
    let mut src = VecSource::new(vec![gdecln(
        int_specs(),
        vec![init_decl(d_id("x"), Some(Initializer::Expr(num("1"))))],
    )]);
    cg.process_source(&mut src).unwrap();
    let count = cg
        .module
        .declns
        .iter()
        .filter(|d| d.ident() == "@x")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn symbol_idempotence_over_redeclarations() {
    // Declaring g twice with compatible types leaves one directory entry
    // with the composed type.
    let mut cg = cgen();
    let declare = |size: Option<Expr>| {
        gdecln(
            int_specs(),
            vec![init_decl(d_arr(d_id("a"), size), None)],
        )
    };
    let mut src = VecSource::new(vec![declare(None), declare(Some(num("4")))]);
    cg.process_source(&mut src).unwrap();
    let sref = cg.symbols.lookup("a").expect("a missing");
    assert_eq!(
        cg.symbols[sref].cgtype,
        crate::ctype::CGType::array(crate::ctype::CGType::basic(crate::ctype::ElmType::Int), Some(4))
    );
    assert_eq!(cg.symbols.iter().filter(|(_, s)| s.cident == "a").count(), 1);
}

#[test]
fn incompatible_redeclaration_sets_the_error_flag_but_processing_continues() {
    let mut cg = cgen();
    let mut src = VecSource::new(vec![
        gdecln(int_specs(), vec![init_decl(d_id("x"), None)]),
        gdecln(tspecs(&[TypeSpec::Long]), vec![init_decl(d_id("x"), None)]),
        gdecln(int_specs(), vec![init_decl(d_id("y"), None)]),
    ]);
    let result = cg.process_source(&mut src);
    assert_eq!(result, Err(CgenError::Invalid));
    assert!(cg.diags.failed());
    // The sibling declaration after the failure was still processed.
    assert!(cg.symbols.lookup("y").is_some());
}

#[test]
fn ident_is_type_answers_typedef_queries() {
    let mut cg = cgen();
    let specs = ccir_ast::DeclSpecs::new(vec![
        ccir_ast::DeclSpec::Storage(ccir_ast::StorageClass::Typedef, sp()),
        ccir_ast::DeclSpec::TypeSpec(TypeSpec::Int, sp()),
    ]);
    let mut src = VecSource::new(vec![gdecln(specs, vec![init_decl(d_id("myint"), None)])]);
    cg.process_source(&mut src).unwrap();
    assert!(cg.ident_is_type("myint"));
    assert!(!cg.ident_is_type("x"));
}

#[test]
fn static_definitions_get_module_local_linkage() {
    let mut cg = cgen();
    let mut specs = int_specs();
    specs
        .specs
        .insert(0, ccir_ast::DeclSpec::Storage(ccir_ast::StorageClass::Static, sp()));
    let mut src = VecSource::new(vec![gdecln(
        specs,
        vec![init_decl(d_id("x"), Some(Initializer::Expr(num("1"))))],
    )]);
    cg.process_source(&mut src).unwrap();
    let ir::Decln::Var(xvar) = cg.module.find("@x").unwrap() else {
        panic!("not a var")
    };
    assert_eq!(xvar.linkage, ir::Linkage::Default);
}

#[test]
fn anonymous_tags_get_numbered_identifiers() {
    let mut cg = cgen();
    assert_eq!(cg.tag_ir_ident(None), "@@anon0");
    assert_eq!(cg.tag_ir_ident(None), "@@anon1");
    assert_eq!(cg.tag_ir_ident(Some("s")), "@@s");
    // A shadowed tag of the same name gets a disambiguation suffix.
    assert_eq!(cg.tag_ir_ident(Some("s")), "@@s.1");
    assert_eq!(cg.next_string_ident(), "@@str0");
    assert_eq!(cg.next_callsign_ident(), "@@csign0");
}

#[test]
fn variadic_function_definition_carries_the_flag() {
    use ccir_ast::Expr as AstExpr;
    let mut cg = cgen();
    // int sum(int n, ...) { va_list ap; __va_start(ap); va_end(ap); return 0; }
    let decln = fundef(
        int_specs(),
        d_fun(d_id("sum"), vec![param(int_specs(), d_id("n"))], true),
        vec![
            Stmt::Decl(gdecln(
                tspecs(&[TypeSpec::VaList]),
                vec![init_decl(d_id("ap"), None)],
            )),
            Stmt::Expr(AstExpr::VaStart {
                ap: Box::new(var("ap")),
                span: sp(),
            }),
            Stmt::Expr(AstExpr::VaEnd {
                ap: Box::new(var("ap")),
                span: sp(),
            }),
            Stmt::Return {
                expr: Some(num("0")),
                span: sp(),
            },
        ],
    );
    cg.process_global_decln(&decln).expect("variadic function failed");
    let ir::Decln::Proc(proc) = cg.module.find("@sum").unwrap() else {
        panic!("not a proc")
    };
    assert!(proc.variadic);
    let body = proc.body.as_ref().unwrap().to_string();
    assert!(body.contains("vastart"), "no vastart in:\n{body}");
    assert!(body.contains("vaend"), "no vaend in:\n{body}");
    assert!(!cg.diags.failed());
}

#[test]
fn va_start_outside_a_variadic_function_is_fatal() {
    use ccir_ast::Expr as AstExpr;
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![
            Stmt::Decl(gdecln(
                tspecs(&[TypeSpec::VaList]),
                vec![init_decl(d_id("ap"), None)],
            )),
            Stmt::Expr(AstExpr::VaStart {
                ap: Box::new(var("ap")),
                span: sp(),
            }),
        ],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert_eq!(
        cg.diags.errors(),
        ["'va_start' used in a non-variadic function"]
    );
}

#[test]
fn function_arguments_are_usable_in_the_body() {
    use ccir_ast::BinOp;
    let mut cg = cgen();
    // int max(int a, int b) { return a > b ? a : b; } without the ternary:
    // return a + b;
    let decln = fundef(
        int_specs(),
        d_fun(
            d_id("add"),
            vec![param(int_specs(), d_id("a")), param(int_specs(), d_id("b"))],
            false,
        ),
        vec![Stmt::Return {
            expr: Some(bin(BinOp::Add, var("a"), var("b"))),
            span: sp(),
        }],
    );
    cg.process_global_decln(&decln).unwrap();
    let ir::Decln::Proc(proc) = cg.module.find("@add").unwrap() else {
        panic!("not a proc")
    };
    assert_eq!(proc.args.len(), 2);
    assert_eq!(proc.args[0].ident, "%a");
    assert_eq!(proc.args[1].ident, "%b");
    let body = proc.body.as_ref().unwrap().to_string();
    assert!(body.contains("lvarptr.16 %a"), "argument unused in:\n{body}");
    assert!(!cg.diags.failed());
    assert!(cg.diags.warnings().is_empty());
}

#[test]
fn unnamed_parameter_in_a_definition_is_fatal() {
    let mut cg = cgen();
    let decln = fundef(
        int_specs(),
        d_fun(
            d_id("f"),
            vec![param(int_specs(), ccir_ast::Declarator::Abstract)],
            false,
        ),
        vec![],
    );
    assert!(cg.process_global_decln(&decln).is_err());
    assert_eq!(
        cg.diags.errors(),
        ["parameter name omitted in function definition"]
    );
}

#[test]
fn local_variables_land_in_the_procedure_table() {
    let mut cg = cgen();
    let decln = fundef(
        tspecs(&[TypeSpec::Void]),
        d_fun(d_id("f"), vec![], false),
        vec![
            Stmt::Decl(gdecln(
                int_specs(),
                vec![init_decl(d_id("v"), Some(Initializer::Expr(num("1"))))],
            )),
            Stmt::Expr(asg(ccir_ast::AssignOp::Assign, var("v"), num("2"))),
        ],
    );
    cg.process_global_decln(&decln).unwrap();
    let ir::Decln::Proc(proc) = cg.module.find("@f").unwrap() else {
        panic!("not a proc")
    };
    assert_eq!(proc.lvars.len(), 1);
    assert_eq!(proc.lvars[0].ident, "%v");
    assert_eq!(proc.lvars[0].vtype, ir::Texpr::Int(16));
}

#[test]
fn constexpr_eval_int_requires_an_integral_value() {
    let mut cg = cgen();
    assert_eq!(
        cg.constexpr_eval_int(&bin(ccir_ast::BinOp::Mul, num("6"), num("7"))).unwrap().0,
        42
    );
}
