//! Shared helpers for synthesizing zero-value and non-deterministic-value expressions
//! for a [`CType`] (spec.md §4.11): both the struct helper generator and the
//! constructor chain need "the zero value of this field's type" and "a fresh
//! non-deterministic value of this field's type", so the logic lives in one place
//! rather than being duplicated per caller.

use crate::cast::{CExpr, CParam, CStmt};
use crate::naming;
use solace_analysis::{resolve_type_name, CallStateKind, CType, TypeTable};
use solace_ast::{Program, TypeName};

/// Resolves a field's declared type to its `CType`, preferring the type table's own
/// entry for user-defined types (structs are namespaced per owning contract there;
/// `resolve_type_name` alone only has the bare, unqualified name available) and
/// falling back to `resolve_type_name` for everything the table has no node for
/// (struct fields are declarations, never visited as expressions).
pub fn resolve_field_type(program: &Program<'_>, types: &TypeTable, ty: &TypeName) -> CType {
    if let TypeName::UserDefined(id) = ty {
        if let Some(ct) = types.node_type(*id) {
            return ct.clone();
        }
    }
    resolve_type_name(program, ty)
}

/// The bare symbol `Init_`/`ZeroInit_`/`ND_` are joined to: strips the leading
/// `struct ` a [`CType::Struct`]/[`CType::Map`] carries, since those name families are
/// always `Init_<Name>` rather than `Init_struct <Name>`.
pub fn bare_symbol(ctype: &CType) -> String {
    let name = ctype.c_name();
    name.strip_prefix("struct ").unwrap_or(name).to_string()
}

/// The zero value of `ctype` (spec.md §4.11 "all fields set to zero/Init_0 recursively").
pub fn zero_value_expr(ctype: &CType) -> CExpr {
    match ctype {
        CType::Wrapped(c) | CType::Enum(c) => CExpr::call(naming::init_name(c), vec![CExpr::IntLit(0)]),
        CType::Struct(_) | CType::Map(_) => CExpr::call(naming::zero_init_name(&bare_symbol(ctype)), vec![]),
    }
}

/// `nd_<raw>` for the scalar underlying a wrapped/enum type: spec.md §6 documents the
/// family as `nd_<int/uint>N_t`; bool and address follow the same stripped-`sol_`
/// pattern since the family name is a naming convention, not an exhaustive enum, and
/// libverify's bodies are someone else's problem regardless (spec.md §1).
fn nd_scalar_call(ctype: &CType, msg: &str) -> CExpr {
    let c = ctype.c_name();
    let raw = c.strip_prefix("sol_").unwrap_or(c);
    CExpr::call(format!("nd_{raw}"), vec![CExpr::StrLit(msg.to_string())])
}

/// A fresh non-deterministic value of `ctype` (spec.md §4.11 `ND_<T>`: "each scalar
/// field <- nd_<type>, each nested struct <- ND_<Inner>"; map fields are left zero).
pub fn nd_value_expr(ctype: &CType, field_msg: &str) -> CExpr {
    match ctype {
        CType::Wrapped(c) | CType::Enum(c) => CExpr::call(naming::init_name(c), vec![nd_scalar_call(ctype, field_msg)]),
        CType::Struct(_) => CExpr::call(naming::nd_init_name(&bare_symbol(ctype)), vec![]),
        CType::Map(_) => CExpr::call(naming::zero_init_name(&bare_symbol(ctype)), vec![]),
    }
}

pub fn field_name(name: &str) -> String {
    format!("user_{name}")
}

/// `<recv>.<field> = <value>;` (or `<recv>-><field> = <value>;` when `arrow`).
pub fn assign_field(recv: &str, field: &str, value: CExpr, arrow: bool) -> CStmt {
    CStmt::Expr(CExpr::Assign {
        op: "=",
        lhs: Box::new(CExpr::ident(recv).member(field, arrow)),
        rhs: Box::new(value),
    })
}

/// The fixed six-slot call-state parameter list (spec.md §4.8), in `CALL_STATE_PARAMS`
/// order: `sender, value, blocknum, timestamp, paid, origin`.
pub fn call_state_params() -> Vec<CParam> {
    vec![
        CParam::new("sol_address_t", "sender", false),
        CParam::new("sol_uint256_t", "value", false),
        CParam::new("sol_uint256_t", "blocknum", false),
        CParam::new("sol_uint256_t", "timestamp", false),
        CParam::new("sol_bool_t", "paid", false),
        CParam::new("sol_address_t", "origin", false),
    ]
}

pub fn call_state_idents() -> Vec<CExpr> {
    vec![
        CExpr::ident("sender"),
        CExpr::ident("value"),
        CExpr::ident("blocknum"),
        CExpr::ident("timestamp"),
        CExpr::ident("paid"),
        CExpr::ident("origin"),
    ]
}

/// `self` (if the callee's [`CallStateKind`] takes one) plus the call-state params (if
/// it takes those too), prefixed onto `extra` (the function's own declared params).
/// Mirrors `call_lower::call_receiver_and_state` exactly so a generated function's
/// signature always matches what every call site to it builds.
/// Forwards `self` plus the call-state identifiers (mirroring [`signature_params`]) as
/// a call's leading arguments, for calls between a function and its own specializations
/// (same callee purity, so the same slots apply on both ends).
pub fn signature_arg_idents(is_pure: bool, extra: Vec<CExpr>) -> Vec<CExpr> {
    let kind = CallStateKind::for_function(false, is_pure);
    let mut out = Vec::with_capacity(extra.len() + 7);
    if kind.takes_self() {
        out.push(CExpr::ptr_ident("self"));
    }
    if kind.takes_call_state() {
        out.extend(call_state_idents());
    }
    out.extend(extra);
    out
}

pub fn signature_params(self_ty: &str, is_pure: bool, extra: Vec<CParam>) -> Vec<CParam> {
    let kind = CallStateKind::for_function(false, is_pure);
    let mut out = Vec::with_capacity(extra.len() + 7);
    if kind.takes_self() {
        out.push(CParam::new(self_ty, "self", true));
    }
    if kind.takes_call_state() {
        out.extend(call_state_params());
    }
    out.extend(extra);
    out
}
