/// The AST node definitions for a Void program. Kept as a handful of sum types
/// rather than a class hierarchy per node kind.

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub app_name: String,
    pub style: Option<String>,
    pub body: Vec<TopLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Main { body: Block },
}

pub type Block = Vec<Stmt>;

/// The declared scalar/collection type of a `create:` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    String,
    Int,
    Float,
    Bool,
    List,
    Dict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMethod {
    Add,
    Delete,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Dict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Echo(Vec<Expr>),
    CreateVar {
        declared_type: DeclaredType,
        name: String,
        init: Expr,
    },
    AssignVar {
        name: String,
        value: Expr,
    },
    /// `x[i] = value;` — distinct from `AssignVar` so the index is never
    /// silently dropped.
    IndexAssign {
        object: Expr,
        index: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_branch: Option<ElseBranch>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
    },
    MethodCall {
        object: String,
        method: CollectionMethod,
        collection: CollectionKind,
        args: Vec<Expr>,
    },
    ExprStmt(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    If(Box<Stmt>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Identifier(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    RandCall {
        min: Box<Expr>,
        max: Box<Expr>,
    },
    ListLiteral(Vec<Expr>),
    DictLiteral(Vec<(Expr, Expr)>),
    IndexAccess {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Write(Box<Expr>),
}
