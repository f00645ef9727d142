//! Allocation graph (spec.md §4.1): enumerates inter-contract child relationships
//! created via `new T(...)` inside constructors, and rejects allocations that escape
//! the constructor they were created in.

use crate::error::{AnalysisError, Diagnostics};
use indexmap::IndexMap;
use solace_ast::{
    walk_expr, AssignOp, CallExpr, Expr, ExprKind, FunctionKind, ItemContract, NodeId, Program, TypeName,
    Visit,
};
use std::collections::HashMap;

/// One child relation: `contract` allocates `child` at `site`, storing the result in
/// `dest_slot` (a state variable of `contract`).
#[derive(Debug, Clone, Copy)]
pub struct ChildAlloc {
    pub child: NodeId,
    pub dest_slot: NodeId,
    pub site: NodeId,
}

#[derive(Debug, Default)]
pub struct AllocationGraph {
    children: IndexMap<NodeId, Vec<ChildAlloc>>,
    /// Every distinct contract type ever assigned into a given state-variable slot,
    /// in first-seen order. Backs `specialize`.
    assigned_types: IndexMap<NodeId, Vec<NodeId>>,
}

impl AllocationGraph {
    pub fn build(program: &Program<'_>, diags: &mut Diagnostics) -> Self {
        let mut graph = Self::default();
        for contract in program.registry.contracts() {
            graph.visit_contract_constructors(program, contract, diags);
        }
        graph
    }

    fn visit_contract_constructors(
        &mut self,
        program: &Program<'_>,
        contract: &ItemContract,
        diags: &mut Diagnostics,
    ) {
        for item in &contract.body {
            let solace_ast::ItemKind::Function(f) = &item.kind else { continue };
            if !matches!(f.kind, FunctionKind::Constructor | FunctionKind::Modifier) {
                continue;
            }
            let Some(body) = &f.body else { continue };
            let mut visitor = ConstructorVisitor {
                program,
                owner: contract.id,
                locals: HashMap::new(),
                graph: self,
                diags,
            };
            solace_ast::walk_block(&mut visitor, body);
        }
    }

    pub fn children(&self, contract: NodeId) -> &[ChildAlloc] {
        self.children.get(&contract).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `cost(C) = 1 + sum(cost(children))`, computed by depth-first post-order
    /// accumulation. Returns `Err` on a cycle (spec.md §4.1).
    pub fn cost(&self, contract: NodeId) -> Result<u64, AnalysisError> {
        let mut stack = Vec::new();
        self.cost_inner(contract, &mut stack)
    }

    fn cost_inner(&self, contract: NodeId, stack: &mut Vec<NodeId>) -> Result<u64, AnalysisError> {
        if stack.contains(&contract) {
            return Err(AnalysisError::AllocationCycle(contract));
        }
        stack.push(contract);
        let mut total = 1u64;
        for child in self.children(contract) {
            total += self.cost_inner(child.child, stack)?;
        }
        stack.pop();
        Ok(total)
    }

    /// The most-derived type ever assigned to `var`, per spec.md §4.1. Callers
    /// decide what "declared type" fallback to use when more than one derived type
    /// was observed (ambiguous case), since the allocation graph itself does not
    /// carry declared types. spec.md §4.1: "if multiple derived types are assigned,
    /// the declared type is returned and a warning is recorded" — the warning is a
    /// `tracing::warn!`, not a `Diagnostics` entry, since an ambiguous specialization
    /// still produces a usable (if less precise) translation rather than a fatal
    /// violation (spec.md §7's taxonomy has no "ambiguous but recoverable" category).
    pub fn specialize(&self, var: NodeId) -> Option<NodeId> {
        let types = self.assigned_types.get(&var)?;
        match types.as_slice() {
            [] => None,
            [only] => Some(*only),
            many => {
                tracing::warn!(slot = ?var, candidates = many.len(), "ambiguous specialize(): falling back to declared type");
                None
            }
        }
    }

    pub fn is_ambiguous(&self, var: NodeId) -> bool {
        self.assigned_types.get(&var).map(|v| v.len() > 1).unwrap_or(false)
    }
}

struct ConstructorVisitor<'a, 'p> {
    program: &'a Program<'p>,
    owner: NodeId,
    /// Local variable id -> contract type, when a local was directly initialized
    /// from a `new` expression in this same constructor body. Single-hop taint
    /// tracking only (spec.md §4.1 "taint propagation along identifier flow");
    /// chasing through helper-function returns would require the call graph, which
    /// is built from this pass's own output, so it is intentionally not attempted.
    locals: HashMap<NodeId, NodeId>,
    graph: &'a mut AllocationGraph,
    diags: &'a mut Diagnostics,
}

impl Visit for ConstructorVisitor<'_, '_> {
    fn visit_stmt(&mut self, stmt: &solace_ast::Stmt) -> bool {
        use solace_ast::StmtKind;
        match &stmt.kind {
            StmtKind::VarDecl { decls, init: Some(init) } => {
                if let [Some(decl)] = decls.as_slice() {
                    if let Some(child) = new_target(init) {
                        self.locals.insert(decl.id, child);
                    }
                }
                walk_expr(self, init);
                return false;
            }
            StmtKind::Expr(Expr { kind: ExprKind::Assign { op: AssignOp::Assign, lhs, rhs }, .. }) => {
                self.handle_assignment(lhs, rhs);
                return false;
            }
            _ => {}
        }
        true
    }

    fn visit_expr(&mut self, expr: &Expr) -> bool {
        if let ExprKind::Call(CallExpr { callee, .. }) = &expr.kind {
            if matches!(callee.kind, ExprKind::New(_)) {
                // A `new` not immediately under a recognized assignment/decl form:
                // either this visitor already special-cased its parent (decl/assign,
                // handled above and pruned), or it truly escapes.
                self.diags.push(AnalysisError::EscapingAllocation { site: expr.id });
                return false;
            }
        }
        true
    }
}

impl ConstructorVisitor<'_, '_> {
    fn handle_assignment(&mut self, lhs: &Expr, rhs: &Expr) {
        let child = new_target(rhs).or_else(|| self.taint_of(rhs));
        let Some(child) = child else {
            walk_expr(self, rhs);
            return;
        };
        match state_var_target(lhs) {
            Some(dest) => {
                self.graph.children.entry(self.owner).or_default().push(ChildAlloc {
                    child,
                    dest_slot: dest,
                    site: lhs.id,
                });
                self.graph.assigned_types.entry(dest).or_default().push(child);
            }
            None => {
                self.diags.push(AnalysisError::EscapingAllocation { site: lhs.id });
            }
        }
    }

    fn taint_of(&self, expr: &Expr) -> Option<NodeId> {
        match &expr.kind {
            ExprKind::Ident(id) => match id.res {
                solace_ast::Res::Decl(decl) => self.locals.get(&decl).copied(),
                _ => None,
            },
            _ => None,
        }
    }
}

fn new_target(expr: &Expr) -> Option<NodeId> {
    let ExprKind::Call(CallExpr { callee, .. }) = &expr.kind else { return None };
    match &callee.kind {
        ExprKind::New(TypeName::UserDefined(contract)) => Some(*contract),
        _ => None,
    }
}

/// Resolves an assignment LHS to the state-variable declaration it targets, if any:
/// a bare identifier bound to a state var, or `this.x`.
fn state_var_target(lhs: &Expr) -> Option<NodeId> {
    match &lhs.kind {
        ExprKind::Ident(id) => match id.res {
            solace_ast::Res::Decl(decl) => Some(decl),
            _ => None,
        },
        ExprKind::MemberAccess { base, member } => {
            if matches!(base.kind, ExprKind::This) {
                match member.res {
                    solace_ast::Res::Decl(decl) => Some(decl),
                    _ => None,
                }
            } else {
                None
            }
        }
        _ => None,
    }
}

