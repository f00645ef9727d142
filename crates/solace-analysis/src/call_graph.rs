//! Call graph (spec.md §4.4): over the flat model, enumerates every function actually
//! executable and labels edges by call kind.

use crate::flat_model::{FlatContract, FlatModel};
use crate::rv_resolver::ContractRvResolver;
use crate::error::Diagnostics;
use indexmap::{IndexMap, IndexSet};
use solace_ast::{CallExpr, Expr, ExprKind, FunctionKind, NodeId, Program, Res, TypeName, Visit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    Internal,
    External,
    Super,
    Library,
    Alloc,
}

/// A vertex in the call graph: a function as seen from a particular flat contract's
/// scope (the same `ItemFunction` can be a vertex under more than one flat contract,
/// e.g. an inherited internal helper called from two different most-derived types).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallVertex {
    pub scope: NodeId,
    pub function: NodeId,
}

#[derive(Debug, Default)]
pub struct CallGraph {
    vertices: IndexSet<CallVertex>,
    edges: IndexMap<CallVertex, Vec<(CallVertex, CallKind)>>,
}

impl CallGraph {
    /// Builds the call graph over `model`'s flat contracts, per spec.md §4.4: vertex
    /// set starts from each flat contract's interface and fallback, then closes under
    /// the edges discovered by walking each vertex's body.
    pub fn build(
        program: &Program<'_>,
        model: &FlatModel<'_>,
        rv: &ContractRvResolver<'_, '_>,
        diags: &mut Diagnostics,
    ) -> Self {
        let mut graph = Self::default();
        let mut queue: Vec<CallVertex> = Vec::new();

        for flat in model.view() {
            for f in flat.interface() {
                queue.push(CallVertex { scope: flat.id, function: f.id });
            }
            if let Some(f) = flat.fallback() {
                queue.push(CallVertex { scope: flat.id, function: f.id });
            }
        }

        while let Some(v) = queue.pop() {
            if !graph.vertices.insert(v) {
                continue;
            }
            let Some(def) = program.registry.function(v.function) else { continue };
            let Some(body) = &def.body else { continue };
            let Some(scope) = model.get(v.scope) else { continue };

            let mut visitor = CallSiteVisitor { program, model, scope, caller: v, rv, diags, found: Vec::new() };
            solace_ast::walk_block(&mut visitor, body);
            for modifier_inv in &def.header.modifiers {
                if let Some(m) = program.registry.function(modifier_inv.modifier) {
                    if matches!(m.kind, FunctionKind::Modifier) {
                        if let Some(mbody) = &m.body {
                            solace_ast::walk_block(&mut visitor, mbody);
                        }
                    }
                }
            }
            let found = visitor.found;

            for (callee, kind) in found {
                graph.edges.entry(v).or_default().push((callee, kind));
                queue.push(callee);
            }
        }

        graph
    }

    pub fn vertices(&self) -> impl Iterator<Item = &CallVertex> + '_ {
        self.vertices.iter()
    }

    pub fn edges(&self, v: CallVertex) -> &[(CallVertex, CallKind)] {
        self.edges.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, v: CallVertex) -> bool {
        self.vertices.contains(&v)
    }

    /// `internals(flat)`: callees executed from `flat` that are not part of its
    /// interface, needed because they must still be emitted (spec.md §4.4).
    pub fn internals<'a>(&self, flat: &'a FlatContract<'_>) -> Vec<NodeId> {
        let interface_ids: IndexSet<NodeId> = flat.interface().map(|f| f.id).collect();
        let mut seen = IndexSet::new();
        for v in self.vertices.iter().filter(|v| v.scope == flat.id) {
            if !interface_ids.contains(&v.function) {
                seen.insert(v.function);
            }
        }
        seen.into_iter().collect()
    }

    /// `super_calls(flat, f)`: the linearization-ordered super overrides that `f`
    /// dispatches to, needed to emit `f`'s `_1_`, `_2_`, … specializations.
    pub fn super_calls(&self, caller: CallVertex) -> Vec<NodeId> {
        self.edges(caller)
            .iter()
            .filter(|(_, kind)| matches!(kind, CallKind::Super))
            .map(|(callee, _)| callee.function)
            .collect()
    }
}

struct CallSiteVisitor<'a, 'p> {
    program: &'a Program<'p>,
    model: &'a FlatModel<'p>,
    scope: &'a FlatContract<'p>,
    caller: CallVertex,
    rv: &'a ContractRvResolver<'a, 'p>,
    diags: &'a mut Diagnostics,
    found: Vec<(CallVertex, CallKind)>,
}

impl Visit for CallSiteVisitor<'_, '_> {
    fn visit_expr(&mut self, expr: &Expr) -> bool {
        let ExprKind::Call(CallExpr { callee, .. }) = &expr.kind else { return true };
        match &callee.kind {
            ExprKind::New(TypeName::UserDefined(target)) => {
                if let Some(ctor) = self.constructor_of(*target) {
                    self.found.push((CallVertex { scope: *target, function: ctor }, CallKind::Alloc));
                }
            }
            ExprKind::Ident(id) => {
                if let Res::Decl(func) = id.res {
                    if let Some(def) = self.program.registry.function(func) {
                        // A bare identifier call within the same contract's lexical
                        // scope, not routed through `this`, is Internal per spec.md §4.4.
                        if matches!(def.kind, FunctionKind::Function) {
                            self.found.push((
                                CallVertex { scope: self.caller.scope, function: func },
                                CallKind::Internal,
                            ));
                        }
                    }
                }
            }
            ExprKind::MemberAccess { base, member } => {
                let Res::Decl(func) = member.res else { return true };
                match &base.kind {
                    solace_ast::ExprKind::Super => {
                        // Super calls expand along the linearization from the caller's
                        // scope: enumerate g-definitions in bases above the
                        // most-derived definer of g (spec.md §4.4).
                        for target in self.super_targets(member.as_str(), func) {
                            self.found.push((
                                CallVertex { scope: self.caller.scope, function: target },
                                CallKind::Super,
                            ));
                        }
                    }
                    solace_ast::ExprKind::This => {
                        self.found.push((
                            CallVertex { scope: self.caller.scope, function: func },
                            CallKind::External,
                        ));
                    }
                    _ => {
                        if self.is_library_call(base) {
                            self.found.push((
                                CallVertex { scope: self.caller.scope, function: func },
                                CallKind::Library,
                            ));
                        } else if let Some(rv_contract) = self.rv.resolve(base, self.diags) {
                            self.found.push((CallVertex { scope: rv_contract, function: func }, CallKind::External));
                        }
                    }
                }
            }
            _ => {}
        }
        true
    }
}

impl CallSiteVisitor<'_, '_> {
    fn constructor_of(&self, contract: NodeId) -> Option<NodeId> {
        self.model.get(contract)?.constructors().first().map(|f| f.id)
    }

    fn is_library_call(&self, base: &Expr) -> bool {
        matches!(base.ty.as_ref(), Some(TypeName::UserDefined(id))
            if self.program.registry.contract(*id).map(|c| matches!(c.kind, solace_ast::ContractKind::Library)).unwrap_or(false))
    }

    /// Given `super.g()` invoked lexically from `self.scope`'s most-derived definer of
    /// `g` (the caller's own function, `func`), walk the linearization above it to find
    /// the next override(s) of `g` (spec.md §4.4).
    fn super_targets(&self, name: &str, fallback: NodeId) -> Vec<NodeId> {
        let flat = self.scope;
        // Find where in the linearization the *caller's enclosing contract* sits, then
        // look above it for the next contract defining `name`.
        let caller_owner = self
            .program
            .registry
            .function(self.caller.function)
            .and_then(|f| f.contract)
            .unwrap_or(flat.id);
        let Some(pos) = flat.linearization.iter().position(|&c| c == caller_owner) else {
            return vec![fallback];
        };
        for &base_id in &flat.linearization[pos + 1..] {
            if let Some(base) = self.program.registry.contract(base_id) {
                for item in &base.body {
                    if let solace_ast::ItemKind::Function(f) = &item.kind {
                        if matches!(f.kind, FunctionKind::Function) && f.name() == name {
                            return vec![f.id];
                        }
                    }
                }
            }
        }
        vec![fallback]
    }
}
