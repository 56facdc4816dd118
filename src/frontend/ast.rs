// src/frontend/ast.rs

use crate::frontend::Span;

/// Unique identifier for symbols (interned strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Create a Symbol from a raw index. Only the interner should use this.
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the underlying index.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Unique identifier for AST nodes. Side tables produced by the analyzer
/// (expression types, method bindings, name resolutions) are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A complete program
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Decl>,
    /// First node id not yet handed out. Passes that synthesize nodes
    /// continue numbering from here.
    pub next_node_id: u32,
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

/// A reference to a named type in a header (`extends A`, `implements I`)
#[derive(Debug, Clone, Copy)]
pub struct TypeName {
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Symbol,
    pub superclass: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: Symbol,
    pub methods: Vec<MethodSig>,
    pub span: Span,
}

/// A bodiless method signature inside an interface
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: Symbol,
    pub ty: TypeExpr,
    pub is_static: bool,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: Symbol,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: TypeExpr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeExprKind {
    Int,
    Boolean,
    Void,
    Named(Symbol),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    VarDecl(VarDecl),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Print(PrintStmt),
    Expr(ExprStmt),
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Symbol,
    pub ty: TypeExpr,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `target = value;` where target is a name or a field access
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `System.out.println(value);`
#[derive(Debug, Clone)]
pub struct PrintStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i32),
    BoolLiteral(bool),
    Null,
    This,
    Identifier(Symbol),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    FieldAccess(Box<FieldAccessExpr>),
    MethodCall(Box<MethodCallExpr>),
    New(Box<NewExpr>),
    /// Evaluates the operand and fails with a null-receiver error when it is
    /// null. Inserted by the analyzer around instance receivers.
    NullCheck(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    pub object: Expr,
    pub field: Symbol,
    pub field_span: Span,
}

/// `receiver.method(args)` or, with no receiver, `method(args)`
#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub receiver: Option<Expr>,
    pub method: Symbol,
    pub args: Vec<Expr>,
    pub method_span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub class: Symbol,
    pub class_span: Span,
    pub args: Vec<Expr>,
}
