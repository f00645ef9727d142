//! Function-call taxonomy, split out of `expr_lower` (spec.md §4.9 FunctionCall rule):
//! assert/require/revert, transfer/send, internal/external/super dispatch, explicit
//! type conversions, and the crypto-hash builtins.

use crate::error::{CodegenError, CodegenResult};
use crate::expr_lower::{ExprLowerer, LowerCtx};
use crate::{cast::CExpr, naming, scope::Scope};
use solace_analysis::{CallEdgeKind, CallStateEdge, CallStateKind};
use solace_ast::{CallExpr, ContractKind, Expr, ExprKind, ItemFunction, Res, StateMutability, TypeName};

pub fn lower_call(
    lowerer: &ExprLowerer<'_, '_>,
    expr: &Expr,
    call: &CallExpr,
    scope: &Scope,
    ctx: LowerCtx,
) -> CodegenResult<CExpr> {
    match &call.callee.kind {
        ExprKind::Type(ty) => lower_conversion(lowerer, ty, call, scope),
        ExprKind::New(_) => Err(CodegenError::Unsupported {
            construct: "nested `new` outside a direct state-variable assignment",
            site: expr.id,
        }),
        ExprKind::Ident(id) => lower_ident_call(lowerer, expr, id, call, scope),
        ExprKind::MemberAccess { base, member } => lower_member_call(lowerer, expr, base, member, call, scope, ctx),
        _ => Err(CodegenError::Unsupported {
            construct: "call through an unsupported callee expression",
            site: expr.id,
        }),
    }
}

const REJECTED_BUILTINS: &[&str] =
    &["selfdestruct", "suicide", "ecrecover", "blockhash", "call", "delegatecall", "staticcall"];

fn lower_ident_call(
    lowerer: &ExprLowerer<'_, '_>,
    expr: &Expr,
    id: &solace_ast::Ident,
    call: &CallExpr,
    scope: &Scope,
) -> CodegenResult<CExpr> {
    let name = id.as_str();
    if REJECTED_BUILTINS.contains(&name) {
        return Err(CodegenError::Unsupported { construct: "call to an environment-escaping builtin", site: expr.id });
    }

    match name {
        "require" => {
            let cond = lowerer.lower(&call.args[0], scope, LowerCtx::default())?;
            let msg = match call.args.get(1) {
                Some(m) => lowerer.lower(m, scope, LowerCtx::default())?,
                None => CExpr::IntLit(0),
            };
            let callee = if lowerer.config.escalate_requires { "sol_assert" } else { "sol_require" };
            return Ok(CExpr::call(callee, vec![cond, msg]));
        }
        "assert" => {
            let cond = lowerer.lower(&call.args[0], scope, LowerCtx::default())?;
            return Ok(CExpr::call("sol_assert", vec![cond, CExpr::IntLit(0)]));
        }
        "revert" => return Ok(CExpr::call("sol_require", vec![CExpr::IntLit(0), CExpr::IntLit(0)])),
        "keccak256" | "sha256" | "ripemd160" => {
            let mut args = Vec::with_capacity(call.args.len());
            for a in &call.args {
                args.push(lowerer.lower(a, scope, LowerCtx::default())?);
            }
            return Ok(CExpr::call(format!("model_{name}"), args));
        }
        "addmod" | "mulmod" => {
            let mut args = Vec::with_capacity(3);
            for a in &call.args {
                args.push(lowerer.lower(a, scope, LowerCtx::default())?);
            }
            return Ok(CExpr::call(format!("model_{name}"), args));
        }
        _ => {}
    }

    // Anything else is an internal call within the current contract's flat scope.
    let Res::Decl(func_id) = id.res else {
        return Err(CodegenError::Internal(format!("unresolved call target `{name}`")));
    };
    let def = lowerer
        .program
        .registry
        .function(func_id)
        .ok_or_else(|| CodegenError::Internal(format!("call target `{name}` is not a function")))?;
    let flat = lowerer
        .model
        .get(lowerer.self_contract)
        .ok_or_else(|| CodegenError::Internal("self contract missing from flat model".into()))?;

    let mut args = call_receiver_and_state(def, CExpr::ptr_ident("self"), CallEdgeKind::Internal, None);
    for a in &call.args {
        args.push(lowerer.lower_arg(a, scope)?);
    }
    Ok(CExpr::call(naming::method_name(flat, def), args))
}

fn lower_member_call(
    lowerer: &ExprLowerer<'_, '_>,
    expr: &Expr,
    base: &Expr,
    member: &solace_ast::Ident,
    call: &CallExpr,
    scope: &Scope,
    _ctx: LowerCtx,
) -> CodegenResult<CExpr> {
    let name = member.as_str();
    if matches!(name, "push" | "pop") {
        return Err(CodegenError::Unsupported { construct: "dynamic array mutation", site: expr.id });
    }
    if REJECTED_BUILTINS.contains(&name) {
        return Err(CodegenError::Unsupported { construct: "call to an environment-escaping builtin", site: expr.id });
    }

    if base.ty.as_ref().map(TypeName::is_address).unwrap_or(false) && matches!(name, "transfer" | "send") {
        let addr = lowerer.lower_arg(base, scope)?;
        let amount = lowerer.lower_arg(&call.args[0], scope)?;
        let balance = CExpr::ptr_ident("self").member("model_balance", true).addr_of();
        let callee = if name == "transfer" { "sol_transfer" } else { "sol_send" };
        return Ok(CExpr::call(callee, vec![balance, addr, amount]));
    }

    let Res::Decl(func_id) = member.res else {
        return Err(CodegenError::Internal(format!("unresolved member call `.{name}`")));
    };
    let def = lowerer
        .program
        .registry
        .function(func_id)
        .ok_or_else(|| CodegenError::Internal(format!("member call target `.{name}` is not a function")))?;

    match &base.kind {
        ExprKind::Super => lower_super_call(lowerer, def, call, scope),
        ExprKind::This => {
            let flat = lowerer
                .model
                .get(lowerer.self_contract)
                .ok_or_else(|| CodegenError::Internal("self contract missing from flat model".into()))?;
            let mut args = call_receiver_and_state(def, CExpr::ptr_ident("self"), CallEdgeKind::External, None);
            for a in &call.args {
                args.push(lowerer.lower_arg(a, scope)?);
            }
            Ok(CExpr::call(naming::method_name(flat, def), args))
        }
        _ if is_library_base(lowerer, base) => {
            let lib_id = def.contract.ok_or_else(|| CodegenError::Internal("library method has no owner".into()))?;
            let lib = lowerer
                .program
                .registry
                .contract(lib_id)
                .ok_or_else(|| CodegenError::Internal("library contract missing from registry".into()))?;
            let mut args = Vec::with_capacity(call.args.len());
            for a in &call.args {
                args.push(lowerer.lower_arg(a, scope)?);
            }
            Ok(CExpr::call(naming::library_method_name(lib.name.as_str(), name), args))
        }
        _ => {
            let target_contract = lowerer
                .rv
                .resolve(base, &mut solace_analysis::Diagnostics::default())
                .ok_or_else(|| CodegenError::Internal("external call receiver has no resolved contract-rv".into()))?;
            let flat = lowerer
                .model
                .get(target_contract)
                .ok_or_else(|| CodegenError::Internal("external call target missing from flat model".into()))?;
            let receiver = lowerer.lower(base, scope, LowerCtx::reference())?;
            let mut args = call_receiver_and_state(def, receiver, CallEdgeKind::External, None);
            for a in &call.args {
                args.push(lowerer.lower_arg(a, scope)?);
            }
            Ok(CExpr::call(naming::method_name(flat, def), args))
        }
    }
}

fn lower_super_call(
    lowerer: &ExprLowerer<'_, '_>,
    def: &ItemFunction,
    call: &CallExpr,
    scope: &Scope,
) -> CodegenResult<CExpr> {
    let vertex = solace_analysis::CallVertex { scope: lowerer.self_contract, function: lowerer.current_function };
    let target_id = lowerer
        .call_graph
        .super_calls(vertex)
        .into_iter()
        .find(|&t| lowerer.program.registry.function(t).map(|f| f.name() == def.name()).unwrap_or(false))
        .unwrap_or(def.id);
    let target = lowerer.program.registry.function(target_id).unwrap_or(def);
    let target_contract = target
        .contract
        .ok_or_else(|| CodegenError::Internal("super call target has no defining contract".into()))?;
    let target_flat = lowerer
        .model
        .get(target_contract)
        .ok_or_else(|| CodegenError::Internal("super call target's contract missing from flat model".into()))?;

    let mut args = call_receiver_and_state(target, CExpr::ptr_ident("self"), CallEdgeKind::Internal, None);
    for a in &call.args {
        args.push(lowerer.lower_arg(a, scope)?);
    }
    // The base's own `<Base>_Method_<name>` is already emitted by the base flat
    // contract's own `convert_contract` pass (spec.md §8 scenario 3); the super call
    // just needs to name that existing symbol, not synthesize a duplicate.
    Ok(CExpr::call(naming::method_name(target_flat, target), args))
}

fn is_library_base(lowerer: &ExprLowerer<'_, '_>, base: &Expr) -> bool {
    matches!(base.ty.as_ref(), Some(TypeName::UserDefined(id))
        if lowerer.program.registry.contract(*id).map(|c| matches!(c.kind, ContractKind::Library)).unwrap_or(false))
}

/// Builds the `self` (if any) + six-slot call-state argument prefix for a call to
/// `callee`, per spec.md §4.8.
fn call_receiver_and_state(
    callee: &ItemFunction,
    receiver: CExpr,
    edge_kind: CallEdgeKind,
    value_override: Option<CExpr>,
) -> Vec<CExpr> {
    // Library edges never reach this helper (`lower_member_call` builds their argument
    // list directly), so `is_library` is always false here.
    let is_pure = callee.header.mutability == Some(StateMutability::Pure);
    let kind = CallStateKind::for_function(false, is_pure);
    let mut out = Vec::with_capacity(7);
    if kind.takes_self() {
        out.push(receiver);
    }
    if kind.takes_call_state() {
        let edge = CallStateEdge::new(edge_kind);
        out.extend(call_state_tuple(edge, value_override));
    }
    out
}

fn call_state_tuple(edge: CallStateEdge, value_override: Option<CExpr>) -> Vec<CExpr> {
    let sender =
        if edge.sender_is_self() { CExpr::ptr_ident("self").member("model_address", true) } else { CExpr::ident("sender") };
    let value = if edge.paid_is_one() {
        value_override.unwrap_or_else(|| CExpr::call("Init_sol_uint256_t", vec![CExpr::IntLit(0)]))
    } else {
        CExpr::ident("value")
    };
    let paid_lit = if edge.paid_is_one() { 1 } else { 0 };
    let paid = CExpr::call("Init_sol_bool_t", vec![CExpr::IntLit(paid_lit)]);
    vec![sender, value, CExpr::ident("blocknum"), CExpr::ident("timestamp"), paid, CExpr::ident("origin")]
}

fn lower_conversion(lowerer: &ExprLowerer<'_, '_>, ty: &TypeName, call: &CallExpr, scope: &Scope) -> CodegenResult<CExpr> {
    let arg = call
        .args
        .first()
        .ok_or_else(|| CodegenError::Internal("type conversion with no argument".into()))?;
    let value = lowerer.lower(arg, scope, LowerCtx::default())?;
    match ty {
        TypeName::Elementary(e) => {
            let c_ty = solace_analysis::elementary_c_type(e);
            Ok(CExpr::Cast { to: c_ty.c_name().to_string(), expr: Box::new(value) })
        }
        TypeName::UserDefined(_) => {
            // Contract/enum reinterpretation: the underlying representation (address or
            // narrow unsigned wrapper) is already compatible, so the conversion is a
            // pass-through at the value level.
            Ok(value)
        }
        _ => Err(CodegenError::Unsupported { construct: "conversion to an unsupported type", site: arg.id }),
    }
}
