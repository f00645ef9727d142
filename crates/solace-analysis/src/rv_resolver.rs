//! Contract-rv resolver (spec.md §4.3): determines the most-derived contract type
//! produced by any expression of contract type, supporting call-graph construction in
//! the presence of polymorphism.

use crate::alloc_graph::AllocationGraph;
use crate::error::{AnalysisError, Diagnostics};
use indexmap::IndexMap;
use solace_ast::{CallExpr, Expr, ExprKind, FunctionKind, NodeId, Program, Res, TypeName};
use std::cell::RefCell;

/// Resolves the concrete contract type an expression evaluates to at runtime, caching
/// per-function results so that mutually-recursive `internal`/`external` calls reach a
/// fixpoint rather than recursing forever (spec.md §4.3, "permitting cyclic dependence
/// to be resolved via fixpoint").
pub struct ContractRvResolver<'a, 'p> {
    program: &'a Program<'p>,
    allocs: &'a AllocationGraph,
    /// Cache of `function id -> resolved return type`, `InProgress` breaks cycles by
    /// treating a self-referential fixpoint attempt as unresolved rather than looping.
    cache: RefCell<IndexMap<NodeId, CacheSlot>>,
}

#[derive(Clone, Copy)]
enum CacheSlot {
    InProgress,
    Resolved(NodeId),
    Unresolved,
}

impl<'a, 'p> ContractRvResolver<'a, 'p> {
    pub fn new(program: &'a Program<'p>, allocs: &'a AllocationGraph) -> Self {
        Self { program, allocs, cache: RefCell::new(IndexMap::new()) }
    }

    /// Resolves the most-derived contract `expr` can hold at runtime (spec.md §4.3
    /// rules i-v). Pushes [`AnalysisError::UnresolvedRv`] into `diags` for unsupported
    /// patterns rather than failing the whole pass.
    pub fn resolve(&self, expr: &Expr, diags: &mut Diagnostics) -> Option<NodeId> {
        match &expr.kind {
            // (i) a state-variable identifier resolves to `specialize(id)`.
            ExprKind::Ident(id) => match id.res {
                Res::Decl(decl) => self.allocs.specialize(decl).or_else(|| self.declared_contract(expr)),
                _ => None,
            },
            // (ii) `e.m` where `m` names a state variable of `e`'s known type.
            ExprKind::MemberAccess { member, .. } => match member.res {
                Res::Decl(decl) => self.allocs.specialize(decl).or_else(|| self.declared_contract(expr)),
                _ => None,
            },
            // (iv) `new T(...)` resolves to `T` directly.
            ExprKind::Call(CallExpr { callee, .. }) => match &callee.kind {
                ExprKind::New(TypeName::UserDefined(contract)) => Some(*contract),
                // (iii) internal/external/library/super calls resolve to the callee's rv.
                ExprKind::Ident(id) => match id.res {
                    Res::Decl(decl) => self.resolve_function(decl, diags),
                    _ => None,
                },
                ExprKind::MemberAccess { member, .. } => match member.res {
                    Res::Decl(decl) => self.resolve_function(decl, diags),
                    _ => {
                        diags.push(AnalysisError::UnresolvedRv {
                            expr: expr.id,
                            reason: "rv of a function call whose callee is not statically resolved",
                        });
                        None
                    }
                },
                _ => {
                    diags.push(AnalysisError::UnresolvedRv {
                        expr: expr.id,
                        reason: "rv of a function call whose result is dereferenced through another call",
                    });
                    None
                }
            },
            _ => None,
        }
    }

    /// Per-function rv, computed transitively from the function's `return` statements
    /// and cached (spec.md §4.3). `InProgress` entries short-circuit cycles to `None`.
    fn resolve_function(&self, func: NodeId, diags: &mut Diagnostics) -> Option<NodeId> {
        if let Some(slot) = self.cache.borrow().get(&func) {
            return match slot {
                CacheSlot::Resolved(c) => Some(*c),
                CacheSlot::InProgress | CacheSlot::Unresolved => None,
            };
        }
        self.cache.borrow_mut().insert(func, CacheSlot::InProgress);

        let resolved = self.compute_function_rv(func, diags);
        let slot = match resolved {
            Some(c) => CacheSlot::Resolved(c),
            None => CacheSlot::Unresolved,
        };
        self.cache.borrow_mut().insert(func, slot);
        resolved
    }

    fn compute_function_rv(&self, func: NodeId, diags: &mut Diagnostics) -> Option<NodeId> {
        let def = self.program.registry.function(func)?;
        if !matches!(def.kind, FunctionKind::Function) {
            return None;
        }
        let body = def.body.as_ref()?;
        let mut found: Option<NodeId> = None;
        collect_returns(body, &mut |ret_expr| {
            if let Some(c) = self.resolve(ret_expr, diags) {
                found = Some(c);
            }
        });
        found
    }

    /// Falls back to the statically-declared contract type of `expr`, when no
    /// allocation-graph specialization is on record (e.g. a parameter, not a state
    /// variable ever assigned a `new`).
    fn declared_contract(&self, expr: &Expr) -> Option<NodeId> {
        match expr.ty.as_ref()? {
            TypeName::UserDefined(id) => Some(*id),
            _ => None,
        }
    }
}

fn collect_returns(block: &solace_ast::Block, f: &mut impl FnMut(&Expr)) {
    for stmt in &block.stmts {
        collect_returns_stmt(stmt, f);
    }
}

fn collect_returns_stmt(stmt: &solace_ast::Stmt, f: &mut impl FnMut(&Expr)) {
    use solace_ast::StmtKind;
    match &stmt.kind {
        StmtKind::Return(Some(e)) => f(e),
        StmtKind::If { then, or_else, .. } => {
            collect_returns_stmt(then, f);
            if let Some(or_else) = or_else {
                collect_returns_stmt(or_else, f);
            }
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } | StmtKind::For { body, .. } => {
            collect_returns_stmt(body, f);
        }
        StmtKind::Block(b) => collect_returns(b, f),
        _ => {}
    }
}
