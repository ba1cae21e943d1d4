//! The abstract syntax tree.
//!
//! One closed enum per syntactic category, so the code generator can match
//! exhaustively instead of downcasting.

use crate::common::Id;
use crate::front::types::Type;

#[derive(Debug)]
pub struct Program {
    pub decls: Vec<Decl>,
}

/// A top-level declaration.
#[derive(Debug)]
pub enum Decl {
    Variable(VarDecl),
    Function(FunctionDecl),
    Enum(EnumDecl),
}

/// A variable declaration, global or local.
#[derive(Debug)]
pub struct VarDecl {
    pub ty: Type,
    pub declarator: Declarator,
    pub init: Option<Initializer>,
}

impl VarDecl {
    pub fn name(&self) -> Id {
        self.declarator.name()
    }

    pub fn is_pointer(&self) -> bool {
        self.declarator.is_pointer()
    }

    pub fn is_array(&self) -> bool {
        self.declarator.is_array()
    }
}

/// How a declared name is shaped: plain identifier, pointer, or array.
#[derive(Debug)]
pub enum Declarator {
    Ident(Id),
    Pointer(Box<Declarator>),
    Array {
        base: Box<Declarator>,
        size: Option<Box<Expr>>,
    },
}

impl Declarator {
    pub fn name(&self) -> Id {
        match self {
            Declarator::Ident(id) => *id,
            Declarator::Pointer(base) => base.name(),
            Declarator::Array { base, .. } => base.name(),
        }
    }

    pub fn is_pointer(&self) -> bool {
        match self {
            Declarator::Ident(_) => false,
            Declarator::Pointer(_) => true,
            Declarator::Array { base, .. } => base.is_pointer(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Declarator::Array { .. })
    }

    /// The declared element count, when it is an integer literal.
    pub fn array_size(&self) -> Option<i32> {
        match self {
            Declarator::Array {
                size: Some(expr), ..
            } => match **expr {
                Expr::IntLiteral(n) => Some(n),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Initializer {
    Expr(Expr),
    List(Vec<Expr>),
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub ret: Type,
    pub returns_pointer: bool,
    pub name: Id,
    pub params: Vec<Param>,
    /// `None` for a prototype.
    pub body: Option<Stmt>,
}

#[derive(Debug)]
pub struct Param {
    pub ty: Type,
    /// `None` for an unnamed prototype parameter.
    pub name: Option<Id>,
    pub is_pointer: bool,
}

#[derive(Debug)]
pub struct EnumDecl {
    pub name: Option<Id>,
    pub values: Vec<Enumerator>,
}

#[derive(Debug)]
pub struct Enumerator {
    pub name: Id,
    pub value: Option<Expr>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Relational and equality operators always produce a 0/1 integer.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
    LogicalNot,
    BitNot,
    AddressOf,
    Dereference,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssignOp {
    Assign,
    MulAssign,
    DivAssign,
    ModAssign,
    AddAssign,
    SubAssign,
    LeftAssign,
    RightAssign,
    AndAssign,
    XorAssign,
    OrAssign,
}

#[derive(Debug)]
pub enum Expr {
    IntLiteral(i32),
    FloatLiteral(f32),
    DoubleLiteral(f64),
    CharLiteral(u8),
    /// Raw source text, quotes included.
    StringLiteral(String),
    Identifier(Id),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assignment {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: Id,
    },
    PointerMember {
        object: Box<Expr>,
        field: Id,
    },
    Cast {
        ty: Type,
        expr: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Comma {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    SizeofExpr(Box<Expr>),
    SizeofType(Type),
}

impl Expr {
    /// The identifier named by this expression, if it is one.
    pub fn as_identifier(&self) -> Option<Id> {
        match self {
            Expr::Identifier(id) => Some(*id),
            _ => None,
        }
    }
}

/// A `for` loop initializer: either a declaration or a plain expression.
#[derive(Debug)]
pub enum ForInit {
    Decl(VarDecl),
    Expr(Expr),
}

#[derive(Debug)]
pub enum Stmt {
    Expr(Option<Expr>),
    Compound {
        decls: Vec<VarDecl>,
        stmts: Vec<Stmt>,
    },
    If {
        cond: Expr,
        then_stmt: Box<Stmt>,
        else_stmt: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<ForInit>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Switch {
        scrutinee: Expr,
        body: Box<Stmt>,
    },
    /// `case value: stmt`, or `default: stmt` when `value` is `None`.
    Case {
        value: Option<Expr>,
        stmt: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Goto(Id),
    Labeled {
        label: Id,
        stmt: Box<Stmt>,
    },
}
