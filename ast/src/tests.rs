use super::*;

fn sp(line: u32, col: u32) -> Span {
    Span::new(Pos::new(line, col), Pos::new(line, col + 1))
}

#[test]
fn span_join_covers_both_ranges() {
    let a = Span::new(Pos::new(1, 4), Pos::new(1, 9));
    let b = Span::new(Pos::new(3, 1), Pos::new(3, 2));
    let joined = a.join(b);
    assert_eq!(joined.start, Pos::new(1, 4));
    assert_eq!(joined.end, Pos::new(3, 2));
    // join is symmetric.
    assert_eq!(b.join(a), joined);
}

#[test]
fn span_display() {
    assert_eq!(sp(3, 14).to_string(), "3:14");
    assert_eq!(Span::default().to_string(), "?:?");
}

#[test]
fn expr_span_spans_the_operands() {
    let expr = Expr::Binary {
        op: BinOp::Add,
        op_span: sp(1, 3),
        lhs: Box::new(Expr::Num(Lit::new("1", sp(1, 1)))),
        rhs: Box::new(Expr::Num(Lit::new("2", sp(1, 5)))),
    };
    assert_eq!(expr.span(), Span::new(Pos::new(1, 1), Pos::new(1, 6)));
}

#[test]
fn declarator_ident_walks_to_the_leaf() {
    let decl = Declarator::Ptr {
        inner: Box::new(Declarator::Array {
            inner: Box::new(Declarator::Ident(Ident::new("x", sp(1, 6)))),
            size: None,
            span: sp(1, 7),
        }),
        quals: vec![],
    };
    assert_eq!(decl.ident().unwrap().name, "x");
    assert!(Declarator::Abstract.ident().is_none());
}

#[test]
fn innermost_func_finds_the_parameter_list() {
    // int (*f(int a))(int b) — f is a function of one parameter returning
    // a function pointer; its own parameter list is the inner one.
    let own_params = vec![ParamDecl {
        specs: DeclSpecs::default(),
        decl: Declarator::Ident(Ident::new("a", sp(1, 10))),
    }];
    let ptr_params = vec![ParamDecl {
        specs: DeclSpecs::default(),
        decl: Declarator::Ident(Ident::new("b", sp(1, 20))),
    }];
    let decl = Declarator::Func {
        inner: Box::new(Declarator::Ptr {
            inner: Box::new(Declarator::Func {
                inner: Box::new(Declarator::Ident(Ident::new("f", sp(1, 7)))),
                params: own_params,
                variadic: false,
                span: sp(1, 8),
            }),
            quals: vec![],
        }),
        params: ptr_params,
        variadic: false,
        span: sp(1, 16),
    };
    let (params, variadic) = decl.innermost_func().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].decl.ident().unwrap().name, "a");
    assert!(!variadic);
    assert!(Declarator::Ident(Ident::new("x", sp(1, 1))).innermost_func().is_none());
}
