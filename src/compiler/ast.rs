//! Statement tree produced by the parser and walked by the interpreter

/// How a declaration binds its names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclKind {
    /// Function-scoped for the whole render
    Var,
    /// Block-scoped
    Let,
    /// Block-scoped, not reassignable
    Const,
}

/// What a `for (x of ...)` / `for (x in ...)` loop walks over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterMode {
    Of,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Echo {
    /// Path resolved leniently. `root` is the text before the first `.` or
    /// `[` and may be empty; `rest` is the remainder.
    Path { root: String, rest: String },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    Text(String),
    Echo(Echo),
    Declare {
        kind: DeclKind,
        bindings: Vec<(String, Option<Expr>)>,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        kind: Option<DeclKind>,
        name: String,
        mode: IterMode,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
}

/// `=` is `None`; compound assignments carry their arithmetic
pub(crate) type AssignOp = Option<BinaryOp>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Callee {
    Function(String),
    Method { object: Box<Expr>, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Expr>),
    Ident(String),
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: String,
        value: Box<Expr>,
    },
    Update {
        increment: bool,
        prefix: bool,
        target: String,
    },
}

/// A compiled template: statements in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Program {
    pub body: Vec<Stmt>,
}
