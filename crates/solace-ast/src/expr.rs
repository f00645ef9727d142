use crate::ident::{Ident, NodeId, Span};
use crate::ty::{Denomination, TypeName};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    /// The Solidity-level type the front-end resolved this expression to. Absent only
    /// for expression-like AST positions that are not themselves typed (e.g. the
    /// callee name in a struct-constructor call is carried via `ExprKind::Type`
    /// instead). Every other expression reachable from executable code must carry
    /// one (spec.md §3, TypeTable invariant).
    pub ty: Option<TypeName>,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Lit),
    Ident(Ident),
    MemberAccess { base: Box<Expr>, member: Ident },
    /// `a[k]`. `index` is `None` only for the syntactically-legal-but-meaningless
    /// `a[]` in an array `new` expression, which this translator rejects outright
    /// (dynamic arrays are a non-goal).
    IndexAccess { base: Box<Expr>, index: Option<Box<Expr>> },
    Call(CallExpr),
    /// `(a, b, )` — tuple expression or multi-value assignment target. `None` entries
    /// are elided positions (`(, b) = ...`).
    Tuple(Vec<Option<Expr>>),
    Conditional { cond: Box<Expr>, then: Box<Expr>, or_else: Box<Expr> },
    Unary { op: UnOp, expr: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Assign { op: AssignOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// `new T(...)` — the call arguments live on the enclosing `CallExpr`; this kind
    /// only appears as a `CallExpr::callee`.
    New(TypeName),
    /// A type name used as a call callee: `uint256(x)`, `MyContract(addr)`.
    Type(TypeName),
    This,
    Super,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    /// Named-argument call syntax: `f({a: 1, b: 2})`. Parallel to `args` when present.
    pub arg_names: Vec<Ident>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Lit {
    Bool(bool),
    /// A signed decimal integer literal, pre-denomination. The expression lowerer
    /// applies `denom` (spec.md §4.9 Literal rule).
    Number { value: i128, denom: Option<Denomination> },
    Str(String),
    HexStr(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    /// `delete x;` — rejected by the expression lowerer (spec.md §4.9 UnaryOp rule).
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `**` — rejected (spec.md §4.9 BinaryOp rule).
    Exp,
    /// `<<` — allowed.
    Shl,
    /// `>>` — rejected, both arithmetic and logical forms are ambiguous for signed
    /// wrapped integers (spec.md §4.9 BinaryOp rule).
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    /// The C infix operator token for this binary op, where one exists directly.
    pub fn as_c_op(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Exp => "**",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    OrAssign,
    AndAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl AssignOp {
    /// The plain binary op a compound assignment normalizes to, per spec.md §4.9
    /// Assignment rule (ii): `a op= b` rewrites to `a = a op b`.
    pub fn normalize(self) -> Option<BinOp> {
        Some(match self {
            Self::Assign => return None,
            Self::AddAssign => BinOp::Add,
            Self::SubAssign => BinOp::Sub,
            Self::MulAssign => BinOp::Mul,
            Self::DivAssign => BinOp::Div,
            Self::ModAssign => BinOp::Mod,
            Self::OrAssign => BinOp::BitOr,
            Self::AndAssign => BinOp::BitAnd,
            Self::XorAssign => BinOp::BitXor,
            Self::ShlAssign => BinOp::Shl,
            Self::ShrAssign => BinOp::Shr,
        })
    }
}
