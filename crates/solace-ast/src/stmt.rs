use crate::expr::Expr;
use crate::ident::{NodeId, Span};
use crate::item::VariableDeclaration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StmtKind {
    /// `T a = init;` or the tuple form `(T a, , T c) = init;`. A single non-tuple
    /// declaration has exactly one `Some` slot.
    VarDecl { decls: Vec<Option<VariableDeclaration>>, init: Option<Expr> },
    Expr(Expr),
    If { cond: Expr, then: Box<Stmt>, or_else: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, update: Option<Expr>, body: Box<Stmt> },
    Continue,
    Break,
    Return(Option<Expr>),
    /// `_;` inside a modifier body: the point where the next-inner specialization
    /// (the next modifier, or the function's own body) is invoked (spec.md §4.11
    /// point 2, glossary "modifier specialization"). Meaningless outside a modifier.
    Placeholder,
    Emit { event: NodeId, args: Vec<Expr> },
    /// `throw;` — rejected by the block lowerer (spec.md §4.10).
    Throw,
    /// Raw `assembly { ... }` block — rejected (spec.md §4.10, non-goal).
    Assembly,
    Block(Block),
}
