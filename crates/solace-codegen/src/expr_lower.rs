//! Expression lowerer (spec.md §4.9): a recursive visitor converting one Solidity
//! expression to one C expression tree.

use crate::cast::CExpr;
use crate::error::{CodegenError, CodegenResult};
use crate::scope::Scope;
use solace_analysis::{AddressDomain, CallGraph, Config, ContractRvResolver, FlatModel, MapDatabase, TypeTable};
use solace_ast::{
    AssignOp, BinOp, CallExpr, Denomination, Expr, ExprKind, Lit, Magic, NodeId, Program, Res, TypeName, UnOp,
};

/// The two contextual flags named in spec.md §4.9: `find_reference` (the surrounding
/// LHS needs a storage pointer, not a value) and `initializer` (lowering is happening
/// inside a constructor's field-initialization phase, where `new T(...)` writes
/// directly into the destination slot rather than through a threaded `dest` param).
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCtx {
    pub find_reference: bool,
    pub initializer: bool,
}

impl LowerCtx {
    pub fn reference() -> Self {
        Self { find_reference: true, initializer: false }
    }
}

pub struct ExprLowerer<'a, 'p> {
    pub program: &'a Program<'p>,
    pub model: &'a FlatModel<'p>,
    pub types: &'a TypeTable,
    pub map_db: &'a MapDatabase,
    pub address_domain: &'a AddressDomain,
    pub call_graph: &'a CallGraph,
    pub rv: &'a ContractRvResolver<'a, 'p>,
    pub config: &'a Config,
    /// The flat contract whose method body is currently being lowered; `self->` member
    /// accesses and internal-call resolution are relative to this scope.
    pub self_contract: NodeId,
    /// The function currently being lowered, needed to resolve `super.f()` targets
    /// relative to where `f` is called from (spec.md §4.4 super-call expansion).
    pub current_function: NodeId,
}

impl<'a, 'p> ExprLowerer<'a, 'p> {
    pub fn lower(&self, expr: &Expr, scope: &Scope, ctx: LowerCtx) -> CodegenResult<CExpr> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.lower_literal(expr, lit, ctx),
            ExprKind::Ident(id) => self.lower_ident(expr, id, scope, ctx),
            ExprKind::MemberAccess { base, member } => self.lower_member(expr, base, member, scope, ctx),
            ExprKind::IndexAccess { base, index } => self.lower_index(expr, base, index.as_deref(), scope, ctx),
            ExprKind::Call(call) => self.lower_call(expr, call, scope, ctx),
            ExprKind::Tuple(elems) => self.lower_tuple(expr, elems, scope, ctx),
            ExprKind::Conditional { cond, then, or_else } => Ok(CExpr::Conditional {
                cond: Box::new(self.lower(cond, scope, LowerCtx::default())?),
                then: Box::new(self.lower(then, scope, ctx)?),
                or_else: Box::new(self.lower(or_else, scope, ctx)?),
            }),
            ExprKind::Unary { op, expr: inner } => self.lower_unary(expr, *op, inner, scope, ctx),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(expr, *op, lhs, rhs, scope),
            ExprKind::Assign { op, lhs, rhs } => self.lower_assign(expr, *op, lhs, rhs, scope),
            ExprKind::New(_) => Err(CodegenError::Internal(
                "`new` must be lowered by its enclosing assignment/declaration, not standalone".into(),
            )),
            ExprKind::Type(_) => Err(CodegenError::Internal("bare type name used outside a call/cast".into())),
            ExprKind::This => Ok(CExpr::ptr_ident("self")),
            ExprKind::Super => {
                Err(CodegenError::Internal("`super` used outside a member-access call".into()))
            }
        }
    }

    fn wrapped_value(&self, node: NodeId, e: CExpr) -> CExpr {
        match self.types.node_type(node) {
            Some(ct) if ct.is_wrapped_scalar() => e.member("v", false),
            _ => e,
        }
    }

    fn lower_literal(&self, expr: &Expr, lit: &Lit, ctx: LowerCtx) -> CodegenResult<CExpr> {
        match lit {
            Lit::Bool(b) => Ok(CExpr::IntLit(if *b { 1 } else { 0 })),
            Lit::Number { value, denom } => {
                let scaled = value * denom.map(Denomination::multiplier).unwrap_or(1) as i128;
                if expr.ty.as_ref().map(TypeName::is_address).unwrap_or(false) {
                    // Inside an address cast, a numeric literal becomes the registered
                    // symbol `g_literal_address_<n>` (spec.md §4.9 Literal rule).
                    let _ = ctx;
                    Ok(CExpr::ident(AddressDomain::literal_symbol(scaled)))
                } else {
                    Ok(CExpr::IntLit(scaled))
                }
            }
            Lit::Str(s) => Ok(CExpr::IntLit(fnv1a(s.as_bytes()) as i128)),
            Lit::HexStr(s) => Ok(CExpr::IntLit(fnv1a(s.as_bytes()) as i128)),
        }
    }

    fn lower_ident(&self, expr: &Expr, id: &solace_ast::Ident, scope: &Scope, ctx: LowerCtx) -> CodegenResult<CExpr> {
        match id.res {
            Res::Decl(decl) => {
                if let Some(entry) = scope.lookup(decl) {
                    let base = if entry.is_pointer { CExpr::ptr_ident(&entry.c_name) } else { CExpr::ident(&entry.c_name) };
                    return Ok(self.apply_reference(expr.id, base, entry.is_pointer, ctx));
                }
                // Not locally bound: a state variable of `self_contract`, addressed as
                // `self->user_<name>` (spec.md §4.9 Identifier rule).
                let name = id.as_str();
                let base = CExpr::ptr_ident("self").member(format!("user_{name}"), true);
                Ok(self.apply_reference(expr.id, base, true, ctx))
            }
            Res::Magic(m) => Ok(self.lower_magic(m)),
            Res::Unresolved => Err(CodegenError::Internal(format!("unresolved identifier `{}`", id.as_str()))),
        }
    }

    fn apply_reference(&self, node: NodeId, base: CExpr, base_is_storage_field: bool, ctx: LowerCtx) -> CExpr {
        if ctx.find_reference {
            if base_is_storage_field {
                base.addr_of()
            } else {
                base
            }
        } else {
            self.wrapped_value(node, base)
        }
    }

    fn lower_magic(&self, m: Magic) -> CExpr {
        let name = match m {
            Magic::MsgSender => "sender",
            Magic::MsgValue => "value",
            Magic::BlockNumber => "blocknum",
            Magic::BlockTimestamp | Magic::Now => "timestamp",
            Magic::TxOrigin => "origin",
            Magic::This => "self",
            _ => "sender",
        };
        CExpr::ident(name)
    }

    fn lower_member(
        &self,
        expr: &Expr,
        base: &Expr,
        member: &solace_ast::Ident,
        scope: &Scope,
        ctx: LowerCtx,
    ) -> CodegenResult<CExpr> {
        // `block.number`, `msg.sender`, ... are Magic member accesses the front-end
        // resolves directly on `member.res`; only non-magic member paths fall through
        // to struct/contract/address member dispatch below.
        if let Res::Magic(m) = member.res {
            return Ok(self.lower_magic(m));
        }

        if member.as_str() == "balance" {
            let base_c = self.lower(base, scope, LowerCtx::default())?;
            return Ok(base_c.member("model_balance", true));
        }

        let base_is_pointer = self.is_pointer_expr(base, scope);
        let base_c = self.lower(base, scope, LowerCtx::default())?;
        let field = CExpr::Member { base: Box::new(base_c), field: format!("user_{}", member.as_str()), arrow: base_is_pointer };
        Ok(self.apply_reference(expr.id, field, true, ctx))
    }

    fn is_pointer_expr(&self, expr: &Expr, scope: &Scope) -> bool {
        match &expr.kind {
            ExprKind::This => true,
            ExprKind::Ident(id) => match id.res {
                Res::Decl(decl) => scope.lookup(decl).map(|e| e.is_pointer).unwrap_or(true),
                _ => false,
            },
            _ => self.types.is_pointer(expr.id),
        }
    }

    fn lower_index(
        &self,
        expr: &Expr,
        base: &Expr,
        index: Option<&Expr>,
        scope: &Scope,
        ctx: LowerCtx,
    ) -> CodegenResult<CExpr> {
        let Some(index) = index else {
            return Err(CodegenError::Unsupported { construct: "array `new` index placeholder", site: expr.id });
        };
        let mapping_ty = base
            .ty
            .as_ref()
            .ok_or_else(|| CodegenError::Internal("map index base has no resolved type".into()))?;

        // Collect the full index chain by walking nested `IndexAccess` nodes, per
        // spec.md §4.9: `a[k1][k2]` reads the map record's full key arity at once.
        let mut bases = vec![base];
        let mut keys = vec![index];
        let mut cur = base;
        while let ExprKind::IndexAccess { base: inner_base, index: Some(inner_index) } = &cur.kind {
            bases.push(inner_base);
            keys.push(inner_index);
            cur = inner_base;
        }
        let root = *bases.last().unwrap();
        keys.reverse();

        let record = self
            .map_db
            .query(mapping_ty)
            .or_else(|| root.ty.as_ref().and_then(|t| self.map_db.query(t)))
            .ok_or_else(|| CodegenError::Internal("map shape not registered in the map database".into()))?;

        if keys.len() != record.keys.len() {
            return Err(CodegenError::Unsupported { construct: "partial map lookup", site: expr.id });
        }

        let root_c = self.lower(root, scope, LowerCtx::reference())?;
        let mut args = vec![root_c];
        for k in &keys {
            args.push(self.lower_arg(k, scope)?);
        }

        if ctx.find_reference {
            // References into maps are rejected (spec.md §4.9 IndexAccess rule).
            return Err(CodegenError::Unsupported { construct: "reference into a map element", site: expr.id });
        }

        let read = CExpr::call(format!("Read_{}", record.c_name()), args);
        Ok(self.wrapped_value(expr.id, read))
    }

    fn lower_tuple(&self, expr: &Expr, elems: &[Option<Expr>], scope: &Scope, ctx: LowerCtx) -> CodegenResult<CExpr> {
        match elems {
            [Some(only)] => self.lower(only, scope, ctx),
            [] => Err(CodegenError::Internal("empty tuple expression".into())),
            _ => Err(CodegenError::Unsupported {
                construct: "multi-element tuple/inline-array expression outside a tuple assignment",
                site: expr.id,
            }),
        }
    }

    fn lower_unary(&self, expr: &Expr, op: UnOp, inner: &Expr, scope: &Scope, ctx: LowerCtx) -> CodegenResult<CExpr> {
        if matches!(op, UnOp::Delete) {
            return Err(CodegenError::Unsupported { construct: "delete", site: expr.id });
        }
        let c_inner = self.lower(inner, scope, LowerCtx::default())?;
        let (c_op, postfix) = match op {
            UnOp::Neg => ("-", false),
            UnOp::Not => ("!", false),
            UnOp::BitNot => ("~", false),
            UnOp::PreInc => ("++", false),
            UnOp::PreDec => ("--", false),
            UnOp::PostInc => ("++", true),
            UnOp::PostDec => ("--", true),
            UnOp::Delete => unreachable!(),
        };
        let result = CExpr::Unary { op: c_op, postfix, operand: Box::new(c_inner) };
        let _ = ctx;
        Ok(result)
    }

    fn lower_binary(&self, expr: &Expr, op: BinOp, lhs: &Expr, rhs: &Expr, scope: &Scope) -> CodegenResult<CExpr> {
        if matches!(op, BinOp::Exp) {
            return Err(CodegenError::Unsupported { construct: "`**` (exponent)", site: expr.id });
        }
        if matches!(op, BinOp::Shr) {
            return Err(CodegenError::Unsupported { construct: "`>>` (right shift)", site: expr.id });
        }
        let c_lhs = self.lower(lhs, scope, LowerCtx::default())?;
        let c_rhs = self.lower(rhs, scope, LowerCtx::default())?;
        Ok(CExpr::binary(op.as_c_op(), c_lhs, c_rhs))
    }

    fn lower_assign(&self, expr: &Expr, op: AssignOp, lhs: &Expr, rhs: &Expr, scope: &Scope) -> CodegenResult<CExpr> {
        // (iii) LHS is an `IndexAccess` on a map -> `Write_Map_N(...)`.
        if let ExprKind::IndexAccess { .. } = &lhs.kind {
            return self.lower_map_write(expr, lhs, op, rhs, scope);
        }

        // (ii) compound assignment normalizes to `a = a op b`.
        if let Some(normalized) = op.normalize() {
            let rewritten_rhs = Expr {
                id: expr.id,
                span: expr.span,
                ty: expr.ty.clone(),
                kind: ExprKind::Binary { op: normalized, lhs: Box::new(lhs.clone()), rhs: Box::new(rhs.clone()) },
            };
            return self.lower_assign(expr, AssignOp::Assign, lhs, &rewritten_rhs, scope);
        }

        // (i) whole-struct pointer assignment: both sides are storage references.
        if self.types.is_pointer(lhs.id) && self.types.is_pointer(rhs.id) {
            let c_lhs = self.lower(lhs, scope, LowerCtx::reference())?;
            let c_rhs = self.lower(rhs, scope, LowerCtx::reference())?;
            return Ok(CExpr::Assign { op: "=", lhs: Box::new(c_lhs), rhs: Box::new(c_rhs) });
        }

        // (v) otherwise: `lhs.v = rhs.v`.
        let c_lhs = self.lower(lhs, scope, LowerCtx::default())?;
        let c_rhs = self.lower(rhs, scope, LowerCtx::default())?;
        Ok(CExpr::Assign { op: "=", lhs: Box::new(c_lhs), rhs: Box::new(c_rhs) })
    }

    fn lower_map_write(
        &self,
        expr: &Expr,
        lhs: &Expr,
        op: AssignOp,
        rhs: &Expr,
        scope: &Scope,
    ) -> CodegenResult<CExpr> {
        let ExprKind::IndexAccess { base, index: Some(index) } = &lhs.kind else {
            return Err(CodegenError::Internal("map write lowering called on a non-index LHS".into()));
        };
        let mapping_ty =
            base.ty.as_ref().ok_or_else(|| CodegenError::Internal("map write base has no resolved type".into()))?;
        let record = self
            .map_db
            .query(mapping_ty)
            .ok_or_else(|| CodegenError::Internal("map shape not registered in the map database".into()))?;

        let root_c = self.lower(base, scope, LowerCtx::reference())?;
        let key_c = self.lower_arg(index, scope)?;

        let rhs_c = if let Some(normalized) = op.normalize() {
            if matches!(normalized, BinOp::Exp) {
                return Err(CodegenError::Unsupported { construct: "`**` (exponent)", site: expr.id });
            }
            if matches!(normalized, BinOp::Shr) {
                return Err(CodegenError::Unsupported { construct: "`>>` (right shift)", site: expr.id });
            }
            let current_read =
                self.wrapped_value(lhs.id, CExpr::call(format!("Read_{}", record.c_name()), vec![root_c.clone(), key_c.clone()]));
            let rhs_lowered = self.lower(rhs, scope, LowerCtx::default())?;
            self.wrap_for_call(lhs.id, CExpr::binary(normalized.as_c_op(), current_read, rhs_lowered))
        } else {
            let rhs_lowered = self.lower(rhs, scope, LowerCtx::default())?;
            self.wrap_for_call(lhs.id, rhs_lowered)
        };

        let _ = expr;
        Ok(CExpr::call(format!("Write_{}", record.c_name()), vec![root_c, key_c, rhs_c]))
    }

    fn lower_call(&self, expr: &Expr, call: &CallExpr, scope: &Scope, ctx: LowerCtx) -> CodegenResult<CExpr> {
        crate::call_lower::lower_call(self, expr, call, scope, ctx)
    }

    /// Lowers `e` as a call argument: unwraps to the raw scalar (if any), then
    /// rewraps through the `Init_<T>` constructor the callee's wrapped-struct
    /// parameter expects (spec.md §8 scenarios 5-6, e.g. `Init_sol_address_t((x).v)`).
    /// Struct/map-typed arguments pass through unchanged — only scalar and enum
    /// wrappers round-trip through `Init_`.
    pub fn lower_arg(&self, e: &Expr, scope: &Scope) -> CodegenResult<CExpr> {
        let value = self.lower(e, scope, LowerCtx::default())?;
        Ok(self.wrap_for_call(e.id, value))
    }

    pub fn wrap_for_call(&self, node: NodeId, value: CExpr) -> CExpr {
        match self.types.node_type(node) {
            Some(ct) if ct.is_wrapped_scalar() => CExpr::call(format!("Init_{}", ct.c_name()), vec![value]),
            _ => value,
        }
    }
}

/// A deterministic stand-in hash for string literals (spec.md §4.9 Literal rule:
/// "string literals become a deterministic hash").
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
