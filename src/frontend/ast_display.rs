// src/frontend/ast_display.rs
//! Pretty-printing for AST nodes with symbol resolution.

use std::fmt::Write;

use crate::frontend::Interner;
use crate::frontend::ast::{
    Block, ClassDecl, ConstructorDecl, Decl, Expr, ExprKind, FieldDecl, InterfaceDecl, MethodDecl,
    Param, Program, Stmt, TypeExpr, TypeExprKind, UnaryOp,
};

/// Pretty-printer for AST nodes that resolves symbols via an Interner.
pub struct AstPrinter<'a> {
    interner: &'a Interner,
    indent: usize,
}

impl<'a> AstPrinter<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            indent: 0,
        }
    }

    /// Print an entire program to a String.
    pub fn print_program(&self, program: &Program) -> String {
        let mut out = String::new();
        out.push_str("Program\n");
        let inner = self.indented();
        for decl in &program.declarations {
            match decl {
                Decl::Class(class) => inner.write_class(&mut out, class),
                Decl::Interface(iface) => inner.write_interface(&mut out, iface),
            }
        }
        out
    }

    /// Print a single expression on one line.
    pub fn print_expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.write_expr_inline(&mut out, expr);
        out
    }

    fn name(&self, sym: crate::frontend::Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn write_indent(&self, out: &mut String) {
        for _ in 0..self.indent {
            out.push_str("  ");
        }
    }

    fn indented(&self) -> Self {
        Self {
            interner: self.interner,
            indent: self.indent + 1,
        }
    }

    fn line(&self, out: &mut String, text: &str) {
        self.write_indent(out);
        out.push_str(text);
        out.push('\n');
    }

    fn write_interface(&self, out: &mut String, iface: &InterfaceDecl) {
        self.line(out, &format!("InterfaceDecl \"{}\"", self.name(iface.name)));
        let inner = self.indented();
        for sig in &iface.methods {
            let mut text = format!("MethodSig \"{}\"", self.name(sig.name));
            self.write_signature(&mut text, &sig.params, Some(&sig.return_type));
            inner.line(out, &text);
        }
    }

    fn write_class(&self, out: &mut String, class: &ClassDecl) {
        let mut header = format!("ClassDecl \"{}\"", self.name(class.name));
        if let Some(sup) = &class.superclass {
            write!(header, " extends {}", self.name(sup.name)).unwrap();
        }
        if !class.interfaces.is_empty() {
            let names: Vec<&str> = class.interfaces.iter().map(|i| self.name(i.name)).collect();
            write!(header, " implements {}", names.join(", ")).unwrap();
        }
        self.line(out, &header);

        let inner = self.indented();
        for field in &class.fields {
            inner.write_field(out, field);
        }
        for ctor in &class.constructors {
            inner.write_constructor(out, ctor);
        }
        for method in &class.methods {
            inner.write_method(out, method);
        }
    }

    fn write_field(&self, out: &mut String, field: &FieldDecl) {
        let mut text = String::from("FieldDecl ");
        if field.is_static {
            text.push_str("static ");
        }
        write!(text, "\"{}\": ", self.name(field.name)).unwrap();
        self.write_type_inline(&mut text, &field.ty);
        if let Some(init) = &field.init {
            text.push_str(" = ");
            self.write_expr_inline(&mut text, init);
        }
        self.line(out, &text);
    }

    fn write_constructor(&self, out: &mut String, ctor: &ConstructorDecl) {
        let mut text = String::from("Constructor");
        self.write_signature(&mut text, &ctor.params, None);
        self.line(out, &text);
        self.indented().write_block(out, &ctor.body);
    }

    fn write_method(&self, out: &mut String, method: &MethodDecl) {
        let mut text = String::from("MethodDecl ");
        if method.is_static {
            text.push_str("static ");
        }
        write!(text, "\"{}\"", self.name(method.name)).unwrap();
        self.write_signature(&mut text, &method.params, Some(&method.return_type));
        self.line(out, &text);
        self.indented().write_block(out, &method.body);
    }

    fn write_signature(&self, out: &mut String, params: &[Param], ret: Option<&TypeExpr>) {
        out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write!(out, "{}: ", self.name(param.name)).unwrap();
            self.write_type_inline(out, &param.ty);
        }
        out.push(')');
        if let Some(ret) = ret {
            out.push_str(" -> ");
            self.write_type_inline(out, ret);
        }
    }

    fn write_type_inline(&self, out: &mut String, ty: &TypeExpr) {
        match ty.kind {
            TypeExprKind::Int => out.push_str("int"),
            TypeExprKind::Boolean => out.push_str("boolean"),
            TypeExprKind::Void => out.push_str("void"),
            TypeExprKind::Named(sym) => out.push_str(self.name(sym)),
        }
    }

    fn write_block(&self, out: &mut String, block: &Block) {
        self.line(out, "Block");
        let inner = self.indented();
        for stmt in &block.stmts {
            inner.write_stmt(out, stmt);
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.write_block(out, block),
            Stmt::VarDecl(decl) => {
                let mut text = format!("VarDecl \"{}\": ", self.name(decl.name));
                self.write_type_inline(&mut text, &decl.ty);
                if let Some(init) = &decl.init {
                    text.push_str(" = ");
                    self.write_expr_inline(&mut text, init);
                }
                self.line(out, &text);
            }
            Stmt::Assign(assign) => {
                let mut text = String::from("Assign ");
                self.write_expr_inline(&mut text, &assign.target);
                text.push_str(" = ");
                self.write_expr_inline(&mut text, &assign.value);
                self.line(out, &text);
            }
            Stmt::If(if_stmt) => {
                let mut text = String::from("If ");
                self.write_expr_inline(&mut text, &if_stmt.condition);
                self.line(out, &text);
                let inner = self.indented();
                inner.line(out, "then:");
                inner.indented().write_stmt(out, &if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    inner.line(out, "else:");
                    inner.indented().write_stmt(out, else_branch);
                }
            }
            Stmt::While(while_stmt) => {
                let mut text = String::from("While ");
                self.write_expr_inline(&mut text, &while_stmt.condition);
                self.line(out, &text);
                self.indented().write_stmt(out, &while_stmt.body);
            }
            Stmt::Return(ret) => match &ret.value {
                Some(value) => {
                    let mut text = String::from("Return ");
                    self.write_expr_inline(&mut text, value);
                    self.line(out, &text);
                }
                None => self.line(out, "Return"),
            },
            Stmt::Print(print) => {
                let mut text = String::from("Println ");
                self.write_expr_inline(&mut text, &print.value);
                self.line(out, &text);
            }
            Stmt::Expr(expr_stmt) => {
                let mut text = String::from("Expr ");
                self.write_expr_inline(&mut text, &expr_stmt.expr);
                self.line(out, &text);
            }
        }
    }

    fn write_args(&self, out: &mut String, args: &[Expr]) {
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr_inline(out, arg);
        }
        out.push(')');
    }

    /// Expressions print fully parenthesized so precedence is visible.
    fn write_expr_inline(&self, out: &mut String, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLiteral(n) => write!(out, "{}", n).unwrap(),
            ExprKind::BoolLiteral(b) => write!(out, "{}", b).unwrap(),
            ExprKind::Null => out.push_str("null"),
            ExprKind::This => out.push_str("this"),
            ExprKind::Identifier(sym) => out.push_str(self.name(*sym)),
            ExprKind::Binary(bin) => {
                out.push('(');
                self.write_expr_inline(out, &bin.left);
                write!(out, " {} ", bin.op.as_str()).unwrap();
                self.write_expr_inline(out, &bin.right);
                out.push(')');
            }
            ExprKind::Unary(un) => {
                out.push_str(match un.op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                });
                self.write_expr_inline(out, &un.operand);
            }
            ExprKind::FieldAccess(access) => {
                self.write_expr_inline(out, &access.object);
                write!(out, ".{}", self.name(access.field)).unwrap();
            }
            ExprKind::MethodCall(call) => {
                if let Some(receiver) = &call.receiver {
                    self.write_expr_inline(out, receiver);
                    out.push('.');
                }
                out.push_str(self.name(call.method));
                self.write_args(out, &call.args);
            }
            ExprKind::New(new) => {
                write!(out, "new {}", self.name(new.class)).unwrap();
                self.write_args(out, &new.args);
            }
            ExprKind::NullCheck(inner) => {
                out.push_str("nullcheck(");
                self.write_expr_inline(out, inner);
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;

    fn print(source: &str) -> String {
        let mut parser = Parser::new(source);
        let program = parser.parse_program().expect("parse failed");
        let interner = parser.into_interner();
        AstPrinter::new(&interner).print_program(&program)
    }

    #[test]
    fn prints_class_header_and_members() {
        let out = print(
            "class Square extends Base implements Shape, Named {
                static int count = 1;
                int side;
                Square(int s) { side = s; }
                int area() { return side * side; }
            }",
        );
        assert!(out.starts_with("Program\n"));
        assert!(out.contains("  ClassDecl \"Square\" extends Base implements Shape, Named\n"));
        assert!(out.contains("    FieldDecl static \"count\": int = 1\n"));
        assert!(out.contains("    FieldDecl \"side\": int\n"));
        assert!(out.contains("    Constructor(s: int)\n"));
        assert!(out.contains("    MethodDecl \"area\"() -> int\n"));
        assert!(out.contains("Return (side * side)"));
    }

    #[test]
    fn prints_interface_signatures() {
        let out = print("interface Shape { int area(); boolean fits(Shape other, int n); }");
        assert!(out.contains("  InterfaceDecl \"Shape\"\n"));
        assert!(out.contains("    MethodSig \"area\"() -> int\n"));
        assert!(out.contains("    MethodSig \"fits\"(other: Shape, n: int) -> boolean\n"));
    }

    #[test]
    fn prints_statements_and_calls() {
        let out = print(
            "class Main {
                static void main() {
                    A a = new A(1, 2);
                    while (!done) { a.f(x).g = 3; }
                    if (1 < 2) System.out.println(a.f()); else return;
                }
            }",
        );
        assert!(out.contains("VarDecl \"a\": A = new A(1, 2)"));
        assert!(out.contains("While !done"));
        assert!(out.contains("Assign a.f(x).g = 3"));
        assert!(out.contains("If (1 < 2)"));
        assert!(out.contains("Println a.f()"));
        assert!(out.contains("else:"));
    }
}
