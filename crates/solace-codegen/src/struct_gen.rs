//! Struct helper generator (spec.md §4.11 "Per struct S"): emits `ZeroInit_<T>`,
//! `Init_<T>`, and `ND_<T>` for every struct declared in a flat contract, plus the
//! `CStructDef` itself.

use crate::cast::{CExpr, CFunction, CParam, CStmt, CStructDef, CStructField, CVarDecl};
use crate::naming;
use crate::value_gen::{assign_field, field_name, nd_value_expr, resolve_field_type, zero_value_expr};
use solace_analysis::{CType, TypeTable};
use solace_ast::{ItemStruct, Program};

pub fn struct_def(program: &Program<'_>, types: &TypeTable, name: &str, s: &ItemStruct) -> CStructDef {
    let mut fields = Vec::with_capacity(s.fields.len());
    for f in &s.fields {
        let ctype = resolve_field_type(program, types, &f.ty);
        fields.push(CStructField {
            ty: ctype.c_name().to_string(),
            name: field_name(f.name.as_ref().map(|n| n.as_str()).unwrap_or("_")),
            is_pointer: false,
        });
    }
    CStructDef { name: name.to_string(), fields }
}

/// `ZeroInit_<T>`, `Init_<T>(<simple fields>)`, `ND_<T>`, in that order (spec.md §4.11).
pub fn helper_functions(program: &Program<'_>, types: &TypeTable, name: &str, s: &ItemStruct) -> Vec<CFunction> {
    let struct_ty = format!("struct {name}");
    let field_types: Vec<(String, CType)> = s
        .fields
        .iter()
        .map(|f| {
            let fname = field_name(f.name.as_ref().map(|n| n.as_str()).unwrap_or("_"));
            (fname, resolve_field_type(program, types, &f.ty))
        })
        .collect();

    let mut zero_body = vec![CStmt::VarDecl(CVarDecl { ty: struct_ty.clone(), name: "r".into(), is_pointer: false, init: None })];
    for (fname, ct) in &field_types {
        zero_body.push(assign_field("r", fname, zero_value_expr(ct), false));
    }
    zero_body.push(CStmt::Return(Some(CExpr::ident("r"))));
    let zero_init = CFunction {
        ret_ty: struct_ty.clone(),
        ret_is_pointer: false,
        name: naming::zero_init_name(name),
        params: vec![],
        body: Some(zero_body),
        inline: false,
    };

    let mut init_params = Vec::new();
    let mut init_body = vec![CStmt::VarDecl(CVarDecl {
        ty: struct_ty.clone(),
        name: "r".into(),
        is_pointer: false,
        init: Some(CExpr::call(naming::zero_init_name(name), vec![])),
    })];
    for (fname, ct) in &field_types {
        if matches!(ct, CType::Struct(_) | CType::Map(_)) {
            continue;
        }
        init_params.push(CParam::new(ct.c_name(), fname, false));
        init_body.push(assign_field("r", fname, CExpr::ident(fname), false));
    }
    init_body.push(CStmt::Return(Some(CExpr::ident("r"))));
    let init = CFunction {
        ret_ty: struct_ty.clone(),
        ret_is_pointer: false,
        name: naming::init_name(name),
        params: init_params,
        body: Some(init_body),
        inline: false,
    };

    let mut nd_body = vec![CStmt::VarDecl(CVarDecl {
        ty: struct_ty.clone(),
        name: "r".into(),
        is_pointer: false,
        init: Some(CExpr::call(naming::zero_init_name(name), vec![])),
    })];
    for (fname, ct) in &field_types {
        if matches!(ct, CType::Map(_)) {
            continue;
        }
        nd_body.push(assign_field("r", fname, nd_value_expr(ct, fname), false));
    }
    nd_body.push(CStmt::Return(Some(CExpr::ident("r"))));
    let nd = CFunction {
        ret_ty: struct_ty,
        ret_is_pointer: false,
        name: naming::nd_init_name(name),
        params: vec![],
        body: Some(nd_body),
        inline: false,
    };

    vec![zero_init, init, nd]
}
