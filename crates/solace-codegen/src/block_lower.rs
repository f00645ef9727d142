//! Block lowerer (spec.md §4.10): walks one function body statement-by-statement,
//! opening a fresh lexical scope per block and handing expressions to the expression
//! lowerer configured with that scope's resolver.

use crate::cast::{CExpr, CStmt, CVarDecl};
use crate::error::{CodegenError, CodegenResult};
use crate::expr_lower::{ExprLowerer, LowerCtx};
use crate::naming;
use crate::scope::Scope;
use solace_ast::{AssignOp, Block, Expr, ExprKind, Ident, Res, Span, Stmt, StmtKind, TypeName};

pub struct BlockLowerer<'a, 'x, 'p> {
    pub exprs: &'a ExprLowerer<'x, 'p>,
    next_local: std::cell::Cell<u32>,
}

impl<'a, 'x, 'p> BlockLowerer<'a, 'x, 'p> {
    pub fn new(exprs: &'a ExprLowerer<'x, 'p>) -> Self {
        Self { exprs, next_local: std::cell::Cell::new(0) }
    }

    pub fn lower_block(&self, block: &Block, scope: &mut Scope) -> CodegenResult<Vec<CStmt>> {
        scope.push();
        let mut out = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            out.extend(self.lower_stmt(stmt, scope)?);
        }
        scope.pop();
        Ok(out)
    }

    /// Lowers a function's own top-level body, prepending the payable prologue
    /// (spec.md §4.10, §8 testable property) when `payable` is set. Used exactly
    /// once per payable function body, never inside a modifier specialization.
    pub fn lower_function_body(&self, block: &Block, scope: &mut Scope, payable: bool) -> CodegenResult<Vec<CStmt>> {
        let mut out = self.lower_block(block, scope)?;
        if payable {
            let balance = CExpr::ptr_ident("self").member("model_balance", true).member("v", false);
            let paid = CExpr::ident("paid").member("v", false);
            let value = CExpr::ident("value").member("v", false);
            let prologue = CStmt::If {
                cond: CExpr::binary("==", paid, CExpr::IntLit(1)),
                then: Box::new(CStmt::Expr(CExpr::Assign {
                    op: "+=",
                    lhs: Box::new(balance),
                    rhs: Box::new(value),
                })),
                or_else: None,
            };
            out.insert(0, prologue);
        }
        Ok(out)
    }

    /// An empty result means the statement is elided entirely (e.g. `emit`, which has
    /// no model in the generated C: spec.md §4.10 drops event statements as a
    /// non-goal); more than one means a single Solidity statement expanded into a
    /// short sequence that must stay in the *same* C scope (construction sites).
    fn lower_stmt(&self, stmt: &Stmt, scope: &mut Scope) -> CodegenResult<Vec<CStmt>> {
        match &stmt.kind {
            StmtKind::VarDecl { decls, init } => self.lower_var_decl(stmt, decls, init, scope),
            StmtKind::Expr(e) => {
                if let Some(construction) = self.try_lower_construction(e, scope)? {
                    return Ok(vec![construction]);
                }
                if let ExprKind::Assign { op: AssignOp::Assign, lhs, rhs } = &e.kind {
                    if let ExprKind::Tuple(elems) = &lhs.kind {
                        return self.lower_tuple_assign(elems, rhs, scope);
                    }
                }
                Ok(vec![CStmt::Expr(self.exprs.lower(e, scope, LowerCtx::default())?)])
            }
            StmtKind::If { cond, then, or_else } => {
                let c_cond = self.exprs.lower(cond, scope, LowerCtx::default())?;
                let c_then = Box::new(self.lower_body(then, scope)?);
                let c_else = or_else.as_ref().map(|s| self.lower_body(s, scope)).transpose()?.map(Box::new);
                Ok(vec![CStmt::If { cond: c_cond, then: c_then, or_else: c_else }])
            }
            StmtKind::While { cond, body } => {
                let c_cond = self.exprs.lower(cond, scope, LowerCtx::default())?;
                let c_body = Box::new(self.lower_body(body, scope)?);
                Ok(vec![CStmt::While { cond: c_cond, body: c_body }])
            }
            StmtKind::DoWhile { body, cond } => {
                let c_body = Box::new(self.lower_body(body, scope)?);
                let c_cond = self.exprs.lower(cond, scope, LowerCtx::default())?;
                Ok(vec![CStmt::DoWhile { body: c_body, cond: c_cond }])
            }
            StmtKind::For { init, cond, update, body } => {
                scope.push();
                let c_init = init
                    .as_ref()
                    .map(|s| self.lower_stmt(s, scope))
                    .transpose()?
                    .map(|mut stmts| stmts.pop())
                    .flatten()
                    .map(Box::new);
                let c_cond = cond.as_ref().map(|c| self.exprs.lower(c, scope, LowerCtx::default())).transpose()?;
                let c_update = update.as_ref().map(|u| self.exprs.lower(u, scope, LowerCtx::default())).transpose()?;
                let c_body = Box::new(self.lower_body(body, scope)?);
                scope.pop();
                Ok(vec![CStmt::For { init: c_init, cond: c_cond, update: c_update, body: c_body }])
            }
            StmtKind::Continue => Ok(vec![CStmt::Continue]),
            StmtKind::Break => Ok(vec![CStmt::Break]),
            StmtKind::Return(e) => {
                let c_e = e.as_ref().map(|e| self.exprs.lower(e, scope, LowerCtx::default())).transpose()?;
                Ok(vec![CStmt::Return(c_e)])
            }
            StmtKind::Emit { .. } => Ok(vec![]),
            StmtKind::Placeholder => Ok(vec![CStmt::Placeholder]),
            StmtKind::Throw => Err(CodegenError::Unsupported { construct: "throw", site: stmt.id }),
            StmtKind::Assembly => Err(CodegenError::Unsupported { construct: "inline assembly", site: stmt.id }),
            StmtKind::Block(b) => Ok(vec![CStmt::Block(self.lower_block(b, scope)?)]),
        }
    }

    /// Lowers a single (possibly brace-less) statement as its own block, so every
    /// control-flow body gets the same per-block scope discipline as an explicit
    /// `{ ... }` (spec.md §4.10).
    fn lower_body(&self, stmt: &Stmt, scope: &mut Scope) -> CodegenResult<CStmt> {
        if let StmtKind::Block(b) = &stmt.kind {
            return Ok(CStmt::Block(self.lower_block(b, scope)?));
        }
        scope.push();
        let body = self.lower_stmt(stmt, scope)?;
        scope.pop();
        Ok(CStmt::Block(body))
    }

    /// `dest = new T(args);` allocates a child contract directly into `dest`'s storage
    /// slot: the allocation graph (spec.md §4.1) already proved `dest` is a state
    /// variable that owns exactly this child, so this lowers to one call into `T`'s
    /// constructor rather than a value-producing expression.
    fn try_lower_construction(&self, e: &Expr, scope: &Scope) -> CodegenResult<Option<CStmt>> {
        let ExprKind::Assign { lhs, rhs, .. } = &e.kind else { return Ok(None) };
        self.construction_call(lhs, rhs, scope)
    }

    fn construction_call(&self, dest: &Expr, rhs: &Expr, scope: &Scope) -> CodegenResult<Option<CStmt>> {
        let ExprKind::Call(call) = &rhs.kind else { return Ok(None) };
        let ExprKind::New(TypeName::UserDefined(child_id)) = &call.callee.kind else { return Ok(None) };

        let child_flat = self
            .exprs
            .model
            .get(*child_id)
            .ok_or_else(|| CodegenError::Internal("allocated contract missing from flat model".into()))?;
        if child_flat.constructors().is_empty() {
            return Err(CodegenError::Internal("allocated contract has no constructor".into()));
        }

        let dest_c = self.exprs.lower(dest, scope, LowerCtx::reference())?;
        let mut args = vec![
            dest_c,
            CExpr::ident("sender"),
            CExpr::call("Init_sol_uint256_t", vec![CExpr::IntLit(0)]),
            CExpr::ident("blocknum"),
            CExpr::ident("timestamp"),
            CExpr::call("Init_sol_bool_t", vec![CExpr::IntLit(0)]),
            CExpr::ident("origin"),
        ];
        for a in &call.args {
            args.push(self.exprs.lower_arg(a, scope)?);
        }
        Ok(Some(CStmt::Expr(CExpr::call(naming::ctor_name(child_flat), args))))
    }

    /// `(a, b, …) = rhs` (spec.md §4.10 ExpressionStatement rule): one temporary per
    /// non-hole LHS position, the RHS's later positions threaded to the callee as
    /// dest-references when RHS is a function call, then each temp copied to its LHS.
    fn lower_tuple_assign(&self, lhs_elems: &[Option<Expr>], rhs: &Expr, scope: &mut Scope) -> CodegenResult<Vec<CStmt>> {
        let mut out = Vec::new();
        let mut temps: Vec<Option<String>> = Vec::with_capacity(lhs_elems.len());
        for elem in lhs_elems {
            match elem {
                Some(e) => {
                    let ty = self
                        .exprs
                        .types
                        .symbol(e.id)
                        .ok_or_else(|| CodegenError::Internal("tuple-assign element missing from the type table".into()))?
                        .to_string();
                    let name = self.fresh_tmp_name();
                    out.push(CStmt::VarDecl(CVarDecl { ty, name: name.clone(), is_pointer: false, init: None }));
                    temps.push(Some(name));
                }
                None => temps.push(None),
            }
        }

        match &rhs.kind {
            ExprKind::Call(_) => {
                let call_c = self.exprs.lower(rhs, scope, LowerCtx::default())?;
                let CExpr::Call { callee, mut args } = call_c else {
                    return Err(CodegenError::Internal("tuple-assign RHS call lowered to a non-call expression".into()));
                };
                for name in temps.iter().skip(1).flatten() {
                    args.push(CExpr::ident(name).addr_of());
                }
                let call_expr = CExpr::Call { callee, args };
                if let Some(name0) = &temps[0] {
                    out.push(CStmt::Expr(CExpr::Assign {
                        op: "=",
                        lhs: Box::new(CExpr::ident(name0).member("v", false)),
                        rhs: Box::new(call_expr.member("v", false)),
                    }));
                } else {
                    out.push(CStmt::Expr(call_expr));
                }
            }
            ExprKind::Tuple(rhs_elems) => {
                for (name, relem) in temps.iter().zip(rhs_elems.iter()) {
                    if let (Some(name), Some(re)) = (name, relem) {
                        let v = self.exprs.lower(re, scope, LowerCtx::default())?;
                        out.push(CStmt::Expr(CExpr::Assign {
                            op: "=",
                            lhs: Box::new(CExpr::ident(name).member("v", false)),
                            rhs: Box::new(v),
                        }));
                    }
                }
            }
            _ => {
                return Err(CodegenError::Unsupported {
                    construct: "tuple-assignment RHS that is neither a call nor a tuple literal",
                    site: rhs.id,
                })
            }
        }

        for (elem, name) in lhs_elems.iter().zip(temps.iter()) {
            if let (Some(e), Some(name)) = (elem, name) {
                let lhs_c = self.exprs.lower(e, scope, LowerCtx::default())?;
                out.push(CStmt::Expr(CExpr::Assign {
                    op: "=",
                    lhs: Box::new(lhs_c),
                    rhs: Box::new(CExpr::ident(name).member("v", false)),
                }));
            }
        }
        Ok(out)
    }

    fn fresh_tmp_name(&self) -> String {
        let n = self.next_local.get();
        self.next_local.set(n + 1);
        format!("tmp_{n}")
    }

    fn lower_var_decl(
        &self,
        stmt: &Stmt,
        decls: &[Option<solace_ast::VariableDeclaration>],
        init: &Option<solace_ast::Expr>,
        scope: &mut Scope,
    ) -> CodegenResult<Vec<CStmt>> {
        let present: Vec<_> = decls.iter().flatten().collect();
        let [decl] = present.as_slice() else {
            return Err(CodegenError::Unsupported { construct: "tuple-destructuring variable declaration", site: stmt.id });
        };

        let is_pointer = self.exprs.types.is_pointer(decl.id);
        let c_name = self.fresh_local_name(decl);
        let ty_name = self
            .exprs
            .types
            .symbol(decl.id)
            .ok_or_else(|| CodegenError::Internal("local declaration missing from the type table".into()))?
            .to_string();

        // `T local = new Child(...);`: the local itself is a by-value struct, directly
        // constructed in place, rather than a `.v =`-style scalar initializer.
        if let Some(init_expr) = init {
            if let Some(ctor_call) = self.construction_call(
                &Expr { id: decl.id, span: decl_span(decl), ty: None, kind: ExprKind::Ident(synthetic_ident(decl)) },
                init_expr,
                scope,
            )? {
                scope.bind(decl.id, c_name.clone(), is_pointer);
                let decl_stmt = CStmt::VarDecl(CVarDecl { ty: ty_name, name: c_name, is_pointer, init: None });
                return Ok(vec![decl_stmt, ctor_call]);
            }
        }

        let c_init = match init {
            Some(e) => Some(self.lower_initializer(e, is_pointer, scope)?),
            None => None,
        };
        scope.bind(decl.id, c_name.clone(), is_pointer);

        Ok(vec![CStmt::VarDecl(CVarDecl { ty: ty_name, name: c_name, is_pointer, init: c_init })])
    }

    fn lower_initializer(&self, init: &solace_ast::Expr, is_pointer: bool, scope: &Scope) -> CodegenResult<CExpr> {
        let ctx = if is_pointer { LowerCtx::reference() } else { LowerCtx::default() };
        self.exprs.lower(init, scope, ctx)
    }

    fn fresh_local_name(&self, decl: &solace_ast::VariableDeclaration) -> String {
        let n = self.next_local.get();
        self.next_local.set(n + 1);
        match &decl.name {
            Some(id) => format!("local_{}_{}", solace_analysis::escape(id.as_str()), n),
            None => format!("local_{n}"),
        }
    }
}

/// `decl`'s own span, reused for the synthetic identifier standing in for its LHS
/// position in `T local = new Child(...);` (spec.md §4.10 construction-site rule).
fn decl_span(decl: &solace_ast::VariableDeclaration) -> Span {
    decl.name.as_ref().map(|id| id.span).unwrap_or(Span::DUMMY)
}

/// A bare identifier expression resolving straight back to `decl`, used as the
/// construction helper's "destination" argument when the destination is a freshly
/// declared local rather than an already-lowered LHS expression.
fn synthetic_ident(decl: &solace_ast::VariableDeclaration) -> ExprKind {
    let name = decl.name.as_ref().map(|id| id.as_str().to_string()).unwrap_or_default();
    ExprKind::Ident(Ident { name, span: decl_span(decl), res: Res::Decl(decl.id) })
}
