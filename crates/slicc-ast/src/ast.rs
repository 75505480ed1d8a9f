use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Source position of a node: file, line and column (1-based)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location used for symbols the compiler registers itself
    pub fn builtin() -> Self {
        Self::new("<builtin>", 0, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Raw `key = "value"` annotations attached to a declaration.
///
/// Ordered so that anything derived from them (generated code, diagnostics)
/// is deterministic.
pub type Pairs = BTreeMap<String, String>;

/// Reference to a type by name, unresolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAst {
    pub ident: String,
    #[serde(default)]
    pub location: Location,
}

impl TypeAst {
    pub fn new(ident: impl Into<String>, location: Location) -> Self {
        Self {
            ident: ident.into(),
            location,
        }
    }
}

/// Formal parameter in a function declaration: `Type ident`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalParam {
    #[serde(rename = "type")]
    pub ty: TypeAst,
    pub ident: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub pairs: Pairs,
}

/// Top-level declarations in a protocol specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDeclAst),
    Type(TypeDeclAst),
    Machine(MachineDeclAst),
}

/// Function declaration.
///
/// `statements` is `None` for functions whose implementation lives outside
/// the protocol source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDeclAst {
    pub return_type: TypeAst,
    pub ident: String,
    #[serde(default)]
    pub formals: Vec<FormalParam>,
    #[serde(default)]
    pub pairs: Pairs,
    #[serde(default)]
    pub statements: Option<Vec<Stmt>>,
    #[serde(default)]
    pub location: Location,
}

/// Type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclAst {
    pub ident: String,
    #[serde(default)]
    pub body: TypeBody,
    #[serde(default)]
    pub pairs: Pairs,
    #[serde(default)]
    pub location: Location,
}

/// Shape of a declared type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeBody {
    #[default]
    Primitive,
    Structure(Vec<FieldAst>),
    Enumeration(Vec<String>),
}

/// Field in a structure type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAst {
    #[serde(rename = "type")]
    pub ty: TypeAst,
    pub ident: String,
    #[serde(default)]
    pub location: Location,
}

/// State machine declaration and the declarations nested inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDeclAst {
    pub ident: String,
    #[serde(default)]
    pub pairs: Pairs,
    #[serde(default)]
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub location: Location,
}

/// Statement types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(ExprStmt),
    Return(ReturnStmt),
    Assign(AssignStmt),
    Local(LocalStmt),
    If(IfStmt),
}

/// Expression evaluated for its side effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    #[serde(default)]
    pub location: Location,
}

/// Return statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    #[serde(default)]
    pub value: Option<Expr>,
    #[serde(default)]
    pub location: Location,
}

/// Assignment: lhs := rhs;
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub lhs: Expr,
    pub rhs: Expr,
    #[serde(default)]
    pub location: Location,
}

/// Local variable declaration: Type ident := init;
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalStmt {
    #[serde(rename = "type")]
    pub ty: TypeAst,
    pub ident: String,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub location: Location,
}

/// If statement with optional else block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Vec<Stmt>,
    #[serde(default)]
    pub else_block: Option<Vec<Stmt>>,
    #[serde(default)]
    pub location: Location,
}

/// Expression types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var(VarExpr),
    Literal(LiteralExpr),
    Call(CallExpr),
    Binary(BinaryExpr),
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::Var(e) => &e.location,
            Expr::Literal(e) => &e.location,
            Expr::Call(e) => &e.location,
            Expr::Binary(e) => &e.location,
        }
    }
}

/// Reference to a variable or parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarExpr {
    pub ident: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralExpr {
    pub value: Literal,
    #[serde(default)]
    pub location: Location,
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    String(String),
}

/// Call of a function by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub ident: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub location: Location,
}

/// Binary expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
    #[serde(default)]
    pub location: Location,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    // Logical
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}
