//! Function converter (spec.md §4.11 points 1-3): builds the constructor chain, the
//! modifier-specialization chain for every executable method and the fallback, and the
//! single-hop `super` override targets the call graph discovered. Struct/map helper
//! generation lives in `struct_gen`/`map_gen`; this module is the remaining "per
//! function" half of the function converter.

use crate::cast::{substitute_block, CExpr, CFunction, CParam, CStmt, CVarDecl};
use crate::error::{CodegenError, CodegenResult};
use crate::expr_lower::ExprLowerer;
use crate::naming;
use crate::scope::Scope;
use crate::{block_lower::BlockLowerer, value_gen};
use indexmap::IndexSet;
use solace_analysis::{
    escape, AddressDomain, CallGraph, CallVertex, Config, ContractRvResolver, FlatContract, FlatModel, MapDatabase,
    TypeTable,
};
use solace_ast::{
    FunctionKind, ItemContract, ItemFunction, ItemKind, ModifierInvocation, NodeId, Program, StateMutability,
    VariableDeclaration,
};

/// The interface/internal split a single flat contract's functions land in, mirroring
/// [`crate::cast::CTranslationUnit`]'s own two buckets.
#[derive(Debug, Default)]
pub struct ContractFunctions {
    pub interface_fns: Vec<CFunction>,
    pub internal_fns: Vec<CFunction>,
}

pub struct FunctionConverter<'a, 'p> {
    pub program: &'a Program<'p>,
    pub model: &'a FlatModel<'p>,
    pub call_graph: &'a CallGraph,
    pub types: &'a TypeTable,
    pub map_db: &'a MapDatabase,
    pub address_domain: &'a AddressDomain,
    pub rv: &'a ContractRvResolver<'a, 'p>,
    pub config: &'a Config,
}

impl<'a, 'p> FunctionConverter<'a, 'p> {
    fn lowerer(&self, self_contract: NodeId, current_function: NodeId) -> ExprLowerer<'a, 'p> {
        ExprLowerer {
            program: self.program,
            model: self.model,
            types: self.types,
            map_db: self.map_db,
            address_domain: self.address_domain,
            call_graph: self.call_graph,
            rv: self.rv,
            config: self.config,
            self_contract,
            current_function,
        }
    }

    /// Converts every interface/internal method, the fallback, the super-override
    /// targets it dispatches to, and the constructor chain for one flat contract.
    pub fn convert_contract(
        &self,
        flat: &FlatContract<'p>,
        built_super: &mut IndexSet<(NodeId, NodeId)>,
    ) -> CodegenResult<ContractFunctions> {
        let mut out = ContractFunctions::default();

        for f in flat.interface() {
            self.convert_into(flat, f, &mut out.interface_fns, &mut out.internal_fns, built_super)?;
        }
        for fid in self.call_graph.internals(flat) {
            let f = self
                .program
                .registry
                .function(fid)
                .ok_or_else(|| CodegenError::Internal("call-graph internal missing from registry".into()))?;
            let mut discard = Vec::new();
            self.convert_into(flat, f, &mut discard, &mut out.internal_fns, built_super)?;
            out.internal_fns.extend(discard);
        }
        if let Some(fb) = flat.fallback() {
            let fns = self.convert_executable(flat, fb, naming::fallback_name(flat), |i| naming::method_spec_name(flat, fb, i))?;
            out.internal_fns.extend(fns);
        }

        out.internal_fns.extend(self.constructor_chain(flat)?);
        Ok(out)
    }

    fn convert_into(
        &self,
        flat: &FlatContract<'p>,
        f: &'p ItemFunction,
        entry_bucket: &mut Vec<CFunction>,
        rest_bucket: &mut Vec<CFunction>,
        built_super: &mut IndexSet<(NodeId, NodeId)>,
    ) -> CodegenResult<()> {
        let fns = self.convert_executable(flat, f, naming::method_name(flat, f), |i| naming::method_spec_name(flat, f, i))?;
        let mut it = fns.into_iter();
        if let Some(entry) = it.next() {
            entry_bucket.push(entry);
        }
        rest_bucket.extend(it);

        let vertex = CallVertex { scope: flat.id, function: f.id };
        rest_bucket.extend(self.super_target_fns(vertex, built_super)?);
        Ok(())
    }

    /// Builds the entry function (`T_Method_f`) and, if `f` has `k >= 1` applied
    /// modifiers, the `k` specialization functions `T_Method_1_f..T_Method_k_f`
    /// (spec.md §4.11 point 2). The entry is modifier 1's own converted body, its
    /// `_;` substituted by a call into `T_Method_1_f`; each `T_Method_i_f` (`i < k`)
    /// is modifier `i+1`'s body substituted by a call into `T_Method_(i+1)_f`; the
    /// innermost `T_Method_k_f` is the function's own unmodified body (spec.md §8
    /// scenario 4).
    fn convert_executable(
        &self,
        flat: &FlatContract<'p>,
        def: &'p ItemFunction,
        entry_name: String,
        spec_name: impl Fn(usize) -> String,
    ) -> CodegenResult<Vec<CFunction>> {
        let exprs = self.lowerer(flat.id, def.id);
        let is_pure = def.header.mutability == Some(StateMutability::Pure);
        let user_params = self.declared_params(def)?;
        let self_ty = format!("struct {}", naming::struct_name(flat));
        let sig_params = value_gen::signature_params(&self_ty, is_pure, user_params.clone());
        let ret = self.types.node_type(def.id).cloned();
        let ret_ty = ret.as_ref().map(|ct| ct.c_name().to_string()).unwrap_or_else(|| "void".to_string());

        let modifiers = self.applied_modifiers(def);
        let body = def.body.as_ref().ok_or_else(|| CodegenError::Internal("executable function has no body".into()))?;

        if modifiers.is_empty() {
            let mut scope = Scope::new();
            bind_params(def, &user_params, &mut scope);
            let stmts = BlockLowerer::new(&exprs).lower_function_body(body, &mut scope, def.is_payable())?;
            return Ok(vec![CFunction {
                ret_ty,
                ret_is_pointer: false,
                name: entry_name,
                params: sig_params,
                body: Some(stmts),
                inline: false,
            }]);
        }

        let mut out = Vec::with_capacity(modifiers.len() + 1);
        let k = modifiers.len();

        // Entry point (`T_Method_f`) is modifier 1's own converted body, its `_;`
        // substituted by a call into `T_Method_1_f` (spec.md §4.11 point 2).
        {
            let modifier_inv = modifiers[0];
            let mdef = self
                .program
                .registry
                .function(modifier_inv.modifier)
                .ok_or_else(|| CodegenError::Internal("modifier invocation target missing from registry".into()))?;

            let mut scope = Scope::new();
            bind_params(def, &user_params, &mut scope);

            let next_call =
                CExpr::call(spec_name(1), value_gen::signature_arg_idents(is_pure, param_idents(&user_params)));
            let (replacement, rv_name) = match &ret {
                Some(ct) => {
                    let tmp = "mod_rv".to_string();
                    let decl = CStmt::VarDecl(CVarDecl {
                        ty: ct.c_name().to_string(),
                        name: tmp.clone(),
                        is_pointer: false,
                        init: Some(next_call),
                    });
                    (vec![decl], Some(tmp))
                }
                None => (vec![CStmt::Expr(next_call)], None),
            };

            let mut entry_body = self.build_level_body(&exprs, &mut scope, modifier_inv, mdef)?;
            substitute_block(&mut entry_body, &replacement, rv_name.as_deref());
            if let Some(tmp) = &rv_name {
                entry_body.push(CStmt::Return(Some(CExpr::ident(tmp))));
            }

            out.push(CFunction {
                ret_ty: ret_ty.clone(),
                ret_is_pointer: false,
                name: entry_name,
                params: sig_params.clone(),
                body: Some(entry_body),
                inline: false,
            });
        }

        // `T_Method_1_f..T_Method_(k-1)_f` are the remaining modifiers (2..k) in
        // applied order, each substituted by a call one level deeper.
        // `T_Method_k_f` is the function's own unmodified body (spec.md §4.11
        // point 2, §8 scenario 4).
        for level in 1..=k {
            let mut scope = Scope::new();
            bind_params(def, &user_params, &mut scope);

            if level < k {
                let modifier_inv = modifiers[level];
                let mdef = self
                    .program
                    .registry
                    .function(modifier_inv.modifier)
                    .ok_or_else(|| CodegenError::Internal("modifier invocation target missing from registry".into()))?;

                let next_call = CExpr::call(
                    spec_name(level + 1),
                    value_gen::signature_arg_idents(is_pure, param_idents(&user_params)),
                );
                let (replacement, rv_name) = match &ret {
                    Some(ct) => {
                        let tmp = "mod_rv".to_string();
                        let decl = CStmt::VarDecl(CVarDecl {
                            ty: ct.c_name().to_string(),
                            name: tmp.clone(),
                            is_pointer: false,
                            init: Some(next_call),
                        });
                        (vec![decl], Some(tmp))
                    }
                    None => (vec![CStmt::Expr(next_call)], None),
                };

                let mut level_body = self.build_level_body(&exprs, &mut scope, modifier_inv, mdef)?;
                substitute_block(&mut level_body, &replacement, rv_name.as_deref());
                if let Some(tmp) = &rv_name {
                    level_body.push(CStmt::Return(Some(CExpr::ident(tmp))));
                }

                out.push(CFunction {
                    ret_ty: ret_ty.clone(),
                    ret_is_pointer: false,
                    name: spec_name(level),
                    params: sig_params.clone(),
                    body: Some(level_body),
                    inline: false,
                });
            } else {
                let stmts = BlockLowerer::new(&exprs).lower_function_body(body, &mut scope, def.is_payable())?;
                out.push(CFunction {
                    ret_ty: ret_ty.clone(),
                    ret_is_pointer: false,
                    name: spec_name(level),
                    params: sig_params.clone(),
                    body: Some(stmts),
                    inline: false,
                });
            }
        }

        Ok(out)
    }

    /// `super.f()` (spec.md §8 scenario 3) resolves to the base's own defining flat
    /// contract's `<Base>_Method_f`, already emitted by that flat contract's own
    /// `convert_contract` pass (spec.md §4.2: FlatModel always adds every base). This
    /// only needs to emit the target when it is not otherwise reachable through
    /// `flat.interface()`/`call_graph.internals(flat)` for its own defining contract —
    /// e.g. an internal function only ever reached via `super` and never called
    /// directly within its own contract.
    fn super_target_fns(&self, vertex: CallVertex, built: &mut IndexSet<(NodeId, NodeId)>) -> CodegenResult<Vec<CFunction>> {
        let mut out = Vec::new();
        for target_id in self.call_graph.super_calls(vertex) {
            let target = self
                .program
                .registry
                .function(target_id)
                .ok_or_else(|| CodegenError::Internal("super-call target missing from registry".into()))?;
            let target_contract = target
                .contract
                .ok_or_else(|| CodegenError::Internal("super-call target has no defining contract".into()))?;
            let target_flat = self
                .model
                .get(target_contract)
                .ok_or_else(|| CodegenError::Internal("super-call target's contract missing from flat model".into()))?;

            if !built.insert((target_flat.id, target_id)) {
                continue;
            }
            if target_flat.interface().any(|f| f.id == target_id) || self.call_graph.internals(target_flat).contains(&target_id)
            {
                // Already emitted by `target_flat`'s own `convert_contract` pass.
                continue;
            }

            let fns = self.convert_executable(
                target_flat,
                target,
                naming::method_name(target_flat, target),
                |i| naming::method_spec_name(target_flat, target, i),
            )?;
            out.extend(fns);
        }
        Ok(out)
    }

    /// Per-flat-contract constructor chain (spec.md §4.11 point 1): one
    /// `Init_<Base>_For_<Derived>` link per distinct ancestor of `flat` (built at most
    /// once even under diamond inheritance), plus the `Init_<Derived>` wrapper that
    /// forwards to its own root link.
    pub fn constructor_chain(&self, flat: &FlatContract<'p>) -> CodegenResult<Vec<CFunction>> {
        let mut out = Vec::new();
        let mut built = IndexSet::new();
        self.build_ctor_link(flat, flat.id, &mut built, &mut out)?;

        let self_ty = format!("struct {}", naming::struct_name(flat));
        let own_ctor = flat.constructors().first().copied();
        let user_params = match own_ctor {
            Some(c) => self.declared_params(c)?,
            None => vec![],
        };
        let sig_params = value_gen::signature_params(&self_ty, false, user_params.clone());
        let forward = value_gen::signature_arg_idents(false, param_idents(&user_params));
        let root = CExpr::call(naming::ctor_for_name(flat, flat), forward);

        out.push(CFunction {
            ret_ty: "void".into(),
            ret_is_pointer: false,
            name: naming::ctor_name(flat),
            params: sig_params,
            body: Some(vec![CStmt::Expr(root), CStmt::Return(None)]),
            inline: false,
        });
        Ok(out)
    }

    fn build_ctor_link(
        &self,
        derived_flat: &FlatContract<'p>,
        contract_id: NodeId,
        built: &mut IndexSet<NodeId>,
        out: &mut Vec<CFunction>,
    ) -> CodegenResult<()> {
        if !built.insert(contract_id) {
            return Ok(());
        }

        let c = self
            .program
            .registry
            .contract(contract_id)
            .ok_or_else(|| CodegenError::Internal("constructor-chain ancestor missing from registry".into()))?;
        let c_flat = self
            .model
            .get(contract_id)
            .ok_or_else(|| CodegenError::Internal("constructor-chain ancestor missing from flat model".into()))?;
        let own_ctor = own_constructor(c);

        let self_ty = format!("struct {}", naming::struct_name(derived_flat));
        let own_params = match own_ctor {
            Some(ctor) => self.declared_params(ctor)?,
            None => vec![],
        };
        let sig_params = value_gen::signature_params(&self_ty, false, own_params.clone());

        let exprs = self.lowerer(derived_flat.id, own_ctor.map(|c| c.id).unwrap_or(contract_id));
        let mut scope = Scope::new();
        if let Some(ctor) = own_ctor {
            bind_params(ctor, &own_params, &mut scope);
        }

        let mut body = Vec::new();
        for base in &c.bases {
            self.build_ctor_link(derived_flat, base.base, built, out)?;
            let base_flat = self
                .model
                .get(base.base)
                .ok_or_else(|| CodegenError::Internal("constructor-chain base missing from flat model".into()))?;

            let base_c = self
                .program
                .registry
                .contract(base.base)
                .ok_or_else(|| CodegenError::Internal("constructor-chain base missing from registry".into()))?;
            let modifier_args = own_ctor
                .and_then(|oc| oc.header.modifiers.iter().find(|m| m.modifier == base.base))
                .map(|m| m.args.as_slice());
            let exprs_list = if !base.args.is_empty() {
                base.args.as_slice()
            } else {
                modifier_args.unwrap_or(&[])
            };
            let _ = base_c;
            let mut args = Vec::with_capacity(exprs_list.len());
            for a in exprs_list {
                args.push(exprs.lower_arg(a, &scope)?);
            }
            let fwd = value_gen::signature_arg_idents(false, args);
            body.push(CStmt::Expr(CExpr::call(naming::ctor_for_name(base_flat, derived_flat), fwd)));
        }

        // This contract's own literal state-variable initializers (spec.md §4.11
        // point 1): fields left unset here keep the `ZeroInit_<T>` value the caller
        // already populated the struct with before the top-level `Init_<C>` ran.
        for item in &c.body {
            if let ItemKind::Variable(v) = &item.kind {
                if v.var.ty.is_mapping() {
                    continue;
                }
                if let Some(init) = &v.initializer {
                    let Some(name) = v.var.name.as_ref() else { continue };
                    let value = exprs.lower_arg(init, &scope)?;
                    body.push(value_gen::assign_field("self", &format!("user_{}", name.as_str()), value, true));
                }
            }
        }

        if let Some(ctor) = own_ctor {
            if let Some(ctor_body) = &ctor.body {
                let modifiers = self.applied_modifiers(ctor);
                let core = BlockLowerer::new(&exprs).lower_function_body(ctor_body, &mut scope, ctor.is_payable())?;
                let spliced = if modifiers.is_empty() { core } else { self.inline_modifiers(&exprs, &mut scope, &modifiers, core)? };
                let ctor_fn_name = naming::ctor_body_name(c_flat);
                let call_args = value_gen::signature_arg_idents(false, param_idents(&own_params));
                out.push(CFunction {
                    ret_ty: "void".into(),
                    ret_is_pointer: false,
                    name: ctor_fn_name.clone(),
                    params: sig_params.clone(),
                    body: Some(spliced),
                    inline: false,
                });
                body.push(CStmt::Expr(CExpr::call(ctor_fn_name, call_args)));
            }
        }
        body.push(CStmt::Return(None));

        out.push(CFunction {
            ret_ty: "void".into(),
            ret_is_pointer: false,
            name: naming::ctor_for_name(c_flat, derived_flat),
            params: sig_params,
            body: Some(body),
            inline: false,
        });
        Ok(())
    }

    /// Nests modifier bodies outer-to-inner around `core`, used where only one C
    /// function name exists for the whole chain (constructors, super targets): each
    /// modifier's own `_;` is substituted for the body built by the previous
    /// (more-inner) iteration, the last iteration wrapping `core` itself.
    fn inline_modifiers(
        &self,
        exprs: &ExprLowerer<'_, 'p>,
        scope: &mut Scope,
        modifiers: &[&ModifierInvocation],
        core: Vec<CStmt>,
    ) -> CodegenResult<Vec<CStmt>> {
        let mut acc = core;
        for modifier_inv in modifiers.iter().rev() {
            let mdef = self
                .program
                .registry
                .function(modifier_inv.modifier)
                .ok_or_else(|| CodegenError::Internal("modifier invocation target missing from registry".into()))?;
            let mut body = self.build_level_body(exprs, scope, modifier_inv, mdef)?;
            substitute_block(&mut body, &acc, None);
            acc = body;
        }
        Ok(acc)
    }

    /// Lowers one modifier's own body, with its declared parameters (if any) bound to
    /// the invocation's argument expressions, evaluated against `scope` before the
    /// modifier's own parameter frame is pushed (spec.md §4.11 point 2: modifier
    /// invocation arguments are evaluated in the applying function's own scope, never
    /// a sibling modifier's).
    fn build_level_body(
        &self,
        exprs: &ExprLowerer<'_, 'p>,
        scope: &mut Scope,
        modifier_inv: &ModifierInvocation,
        mdef: &'p ItemFunction,
    ) -> CodegenResult<Vec<CStmt>> {
        let mut arg_values = Vec::with_capacity(modifier_inv.args.len());
        for a in &modifier_inv.args {
            arg_values.push(exprs.lower_arg(a, scope)?);
        }

        scope.push();
        let mut prelude = Vec::new();
        for (p, value) in mdef.header.params.iter().zip(arg_values) {
            let ctype = self
                .types
                .node_type(p.id)
                .ok_or_else(|| CodegenError::Internal("modifier parameter missing from type table".into()))?;
            let name = param_c_name(p, 0);
            prelude.push(CStmt::VarDecl(CVarDecl {
                ty: ctype.c_name().to_string(),
                name: name.clone(),
                is_pointer: false,
                init: Some(value),
            }));
            scope.bind(p.id, name, false);
        }

        let mbody = mdef.body.as_ref().ok_or_else(|| CodegenError::Internal("modifier has no body".into()))?;
        let mut stmts = BlockLowerer::new(exprs).lower_block(mbody, scope)?;
        scope.pop();

        prelude.append(&mut stmts);
        Ok(prelude)
    }

    /// Modifier invocations that resolve to an actual `Modifier` function, excluding
    /// base-constructor-argument invocations (which resolve to a contract instead).
    fn applied_modifiers<'f>(&self, def: &'f ItemFunction) -> Vec<&'f ModifierInvocation> {
        def.header
            .modifiers
            .iter()
            .filter(|m| {
                self.program
                    .registry
                    .function(m.modifier)
                    .map(|f| matches!(f.kind, FunctionKind::Modifier))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn declared_params(&self, def: &ItemFunction) -> CodegenResult<Vec<CParam>> {
        let mut out = Vec::with_capacity(def.header.params.len());
        for (i, p) in def.header.params.iter().enumerate() {
            let ctype = self
                .types
                .node_type(p.id)
                .ok_or_else(|| CodegenError::Internal("function parameter missing from type table".into()))?;
            let is_pointer = self.types.is_pointer(p.id);
            out.push(CParam::new(ctype.c_name(), param_c_name(p, i), is_pointer));
        }
        Ok(out)
    }
}

fn own_constructor(c: &ItemContract) -> Option<&ItemFunction> {
    c.body.iter().find_map(|item| match &item.kind {
        ItemKind::Function(f) if matches!(f.kind, FunctionKind::Constructor) => Some(f),
        _ => None,
    })
}

fn bind_params(def: &ItemFunction, params: &[CParam], scope: &mut Scope) {
    for (decl, cparam) in def.header.params.iter().zip(params) {
        scope.bind(decl.id, cparam.name.clone(), cparam.is_pointer);
    }
}

/// `func_user_<name>` (spec.md §4.9 Identifier rule: "parameters `func_user_<name>`"),
/// distinct from a struct field's `user_<name>` (spec.md §6).
fn param_c_name(p: &VariableDeclaration, i: usize) -> String {
    match &p.name {
        Some(id) => format!("func_user_{}", escape(id.as_str())),
        None => format!("func_param_{i}"),
    }
}

fn param_idents(params: &[CParam]) -> Vec<CExpr> {
    params.iter().map(|p| if p.is_pointer { CExpr::ptr_ident(&p.name) } else { CExpr::ident(&p.name) }).collect()
}
