//! A shallow, default-recursing visitor over the AST, in the style of `forge-lint`'s
//! own linter passes: implementors override only the node kinds they care about and
//! return `true` to keep recursing into children, `false` to prune the subtree.

use crate::expr::{CallExpr, Expr, ExprKind};
use crate::item::{Item, ItemContract, ItemEnum, ItemFunction, ItemKind, ItemStruct, VariableDefinition};
use crate::stmt::{Block, Stmt, StmtKind};

#[allow(unused_variables)]
pub trait Visit {
    fn visit_item(&mut self, item: &Item) -> bool {
        true
    }
    fn visit_contract(&mut self, contract: &ItemContract) -> bool {
        true
    }
    fn visit_function(&mut self, func: &ItemFunction) -> bool {
        true
    }
    fn visit_struct(&mut self, s: &ItemStruct) -> bool {
        true
    }
    fn visit_enum(&mut self, e: &ItemEnum) -> bool {
        true
    }
    fn visit_state_var(&mut self, var: &VariableDefinition) -> bool {
        true
    }
    fn visit_block(&mut self, block: &Block) -> bool {
        true
    }
    fn visit_stmt(&mut self, stmt: &Stmt) -> bool {
        true
    }
    fn visit_expr(&mut self, expr: &Expr) -> bool {
        true
    }
}

pub fn walk_item<V: Visit + ?Sized>(v: &mut V, item: &Item) {
    if !v.visit_item(item) {
        return;
    }
    match &item.kind {
        ItemKind::Contract(c) => {
            if v.visit_contract(c) {
                for sub in &c.body {
                    walk_item(v, sub);
                }
            }
        }
        ItemKind::Function(f) => {
            if v.visit_function(f) {
                if let Some(body) = &f.body {
                    walk_block(v, body);
                }
            }
        }
        ItemKind::Variable(var) => {
            if v.visit_state_var(var) {
                if let Some(init) = &var.initializer {
                    walk_expr(v, init);
                }
            }
        }
        ItemKind::Struct(s) => {
            v.visit_struct(s);
        }
        ItemKind::Enum(e) => {
            v.visit_enum(e);
        }
        ItemKind::Event(_) | ItemKind::Using(_) => {}
    }
}

pub fn walk_block<V: Visit + ?Sized>(v: &mut V, block: &Block) {
    if !v.visit_block(block) {
        return;
    }
    for stmt in &block.stmts {
        walk_stmt(v, stmt);
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    if !v.visit_stmt(stmt) {
        return;
    }
    match &stmt.kind {
        StmtKind::VarDecl { init, .. } => {
            if let Some(init) = init {
                walk_expr(v, init);
            }
        }
        StmtKind::Expr(e) => walk_expr(v, e),
        StmtKind::If { cond, then, or_else } => {
            walk_expr(v, cond);
            walk_stmt(v, then);
            if let Some(or_else) = or_else {
                walk_stmt(v, or_else);
            }
        }
        StmtKind::While { cond, body } => {
            walk_expr(v, cond);
            walk_stmt(v, body);
        }
        StmtKind::DoWhile { body, cond } => {
            walk_stmt(v, body);
            walk_expr(v, cond);
        }
        StmtKind::For { init, cond, update, body } => {
            if let Some(init) = init {
                walk_stmt(v, init);
            }
            if let Some(cond) = cond {
                walk_expr(v, cond);
            }
            if let Some(update) = update {
                walk_expr(v, update);
            }
            walk_stmt(v, body);
        }
        StmtKind::Return(Some(e)) => walk_expr(v, e),
        StmtKind::Emit { args, .. } => {
            for a in args {
                walk_expr(v, a);
            }
        }
        StmtKind::Block(b) => walk_block(v, b),
        StmtKind::Continue
        | StmtKind::Break
        | StmtKind::Return(None)
        | StmtKind::Placeholder
        | StmtKind::Throw
        | StmtKind::Assembly => {}
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    if !v.visit_expr(expr) {
        return;
    }
    match &expr.kind {
        ExprKind::MemberAccess { base, .. } => walk_expr(v, base),
        ExprKind::IndexAccess { base, index } => {
            walk_expr(v, base);
            if let Some(index) = index {
                walk_expr(v, index);
            }
        }
        ExprKind::Call(CallExpr { callee, args, .. }) => {
            walk_expr(v, callee);
            for a in args {
                walk_expr(v, a);
            }
        }
        ExprKind::Tuple(elems) => {
            for e in elems.iter().flatten() {
                walk_expr(v, e);
            }
        }
        ExprKind::Conditional { cond, then, or_else } => {
            walk_expr(v, cond);
            walk_expr(v, then);
            walk_expr(v, or_else);
        }
        ExprKind::Unary { expr, .. } => walk_expr(v, expr),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(v, lhs);
            walk_expr(v, rhs);
        }
        ExprKind::Assign { lhs, rhs, .. } => {
            walk_expr(v, lhs);
            walk_expr(v, rhs);
        }
        ExprKind::Literal(_)
        | ExprKind::Ident(_)
        | ExprKind::New(_)
        | ExprKind::Type(_)
        | ExprKind::This
        | ExprKind::Super => {}
    }
}
