use super::*;

fn parse(source: &str) -> (Program, Interner) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program().unwrap();
    (program, parser.into_interner())
}

fn class(program: &Program, index: usize) -> &ClassDecl {
    match &program.declarations[index] {
        Decl::Class(c) => c,
        Decl::Interface(_) => panic!("expected class"),
    }
}

#[test]
fn parse_int_literal() {
    let mut parser = Parser::new("42");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::IntLiteral(n) => assert_eq!(n, 42),
        _ => panic!("expected int literal"),
    }
}

#[test]
fn parse_precedence() {
    // 1 + 2 * 3 should be 1 + (2 * 3)
    let mut parser = Parser::new("1 + 2 * 3");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::Binary(bin) => {
            assert_eq!(bin.op, BinaryOp::Add);
            match bin.right.kind {
                ExprKind::Binary(inner) => assert_eq!(inner.op, BinaryOp::Mul),
                _ => panic!("expected binary on right"),
            }
        }
        _ => panic!("expected binary"),
    }
}

#[test]
fn parse_logical_binds_looser_than_comparison() {
    let mut parser = Parser::new("a < b && c == d || e");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::Binary(bin) => {
            assert_eq!(bin.op, BinaryOp::Or);
            assert!(matches!(&bin.left.kind, ExprKind::Binary(l) if l.op == BinaryOp::And));
        }
        _ => panic!("expected binary"),
    }
}

#[test]
fn parse_method_chain() {
    let mut parser = Parser::new("a.b.c(1, 2)");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::MethodCall(call) => {
            assert_eq!(call.args.len(), 2);
            let receiver = call.receiver.expect("receiver");
            assert!(matches!(receiver.kind, ExprKind::FieldAccess(_)));
        }
        _ => panic!("expected method call"),
    }
}

#[test]
fn parse_unqualified_call_has_no_receiver() {
    let mut parser = Parser::new("helper(x)");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::MethodCall(call) => assert!(call.receiver.is_none()),
        _ => panic!("expected method call"),
    }
}

#[test]
fn node_ids_are_unique() {
    let mut parser = Parser::new("a.f(1) + new B(2)");
    let expr = parser.parse_expression().unwrap();
    let ExprKind::Binary(bin) = expr.kind else {
        panic!("expected binary");
    };
    assert_ne!(bin.left.id, bin.right.id);
    assert_ne!(bin.left.id, expr.id);
}

#[test]
fn parse_class_with_members() {
    let (program, interner) = parse(
        "class B extends A implements Shape, Named {
            int x;
            static int count = 3;
            B(int x) { this.x = x; }
            public int area() { return x * x; }
            static void main() { }
        }",
    );
    let b = class(&program, 0);
    assert_eq!(interner.resolve(b.name), "B");
    assert_eq!(interner.resolve(b.superclass.expect("super").name), "A");
    assert_eq!(b.interfaces.len(), 2);
    assert_eq!(b.fields.len(), 2);
    assert!(b.fields[1].is_static);
    assert!(b.fields[1].init.is_some());
    assert_eq!(b.constructors.len(), 1);
    assert_eq!(b.constructors[0].params.len(), 1);
    assert_eq!(b.methods.len(), 2);
    assert!(b.methods[1].is_static);
    assert_eq!(b.methods[1].return_type.kind, TypeExprKind::Void);
}

#[test]
fn parse_interface() {
    let (program, interner) = parse("interface Shape { int area(); boolean bigger(Shape other); }");
    let Decl::Interface(shape) = &program.declarations[0] else {
        panic!("expected interface");
    };
    assert_eq!(interner.resolve(shape.name), "Shape");
    assert_eq!(shape.methods.len(), 2);
    assert_eq!(shape.methods[1].params.len(), 1);
}

#[test]
fn parse_statements() {
    let (program, _) = parse(
        "class M {
            static void main() {
                int i = 0;
                Shape s = null;
                s = new Square(3);
                while (i < 3) { i = i + 1; }
                if (i == 3) System.out.println(i); else System.out.println(false);
                s.area();
                return;
            }
        }",
    );
    let stmts = &class(&program, 0).methods[0].body.stmts;
    assert!(matches!(stmts[0], Stmt::VarDecl(_)));
    match &stmts[1] {
        Stmt::VarDecl(decl) => assert!(matches!(decl.ty.kind, TypeExprKind::Named(_))),
        _ => panic!("expected declaration with class type"),
    }
    assert!(matches!(stmts[2], Stmt::Assign(_)));
    assert!(matches!(stmts[3], Stmt::While(_)));
    match &stmts[4] {
        Stmt::If(if_stmt) => {
            assert!(matches!(*if_stmt.then_branch, Stmt::Print(_)));
            assert!(if_stmt.else_branch.is_some());
        }
        _ => panic!("expected if"),
    }
    assert!(matches!(stmts[5], Stmt::Expr(_)));
    assert!(matches!(stmts[6], Stmt::Return(ReturnStmt { value: None, .. })));
}

#[test]
fn program_records_next_node_id() {
    let (program, _) = parse("class A { int f() { return 1 + 2; } }");
    // literal, literal, binary
    assert_eq!(program.next_node_id, 3);
}

#[test]
fn constructor_name_must_match() {
    let mut parser = Parser::new("class A { B() { } }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::ConstructorNameMismatch { .. }));
}

#[test]
fn invalid_assignment_target() {
    let mut parser = Parser::new("class A { void f() { 1 = 2; } }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::InvalidAssignmentTarget { .. }));
}

#[test]
fn println_requires_one_argument() {
    let mut parser = Parser::new("class A { void f() { System.out.println(1, 2); } }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::InvalidPrint { .. }));
}

#[test]
fn void_field_is_rejected() {
    let mut parser = Parser::new("class A { void x; }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::VoidField { .. }));
}

#[test]
fn top_level_must_be_declaration() {
    let mut parser = Parser::new("int x;");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::ExpectedDeclaration { .. }));
}
