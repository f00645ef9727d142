//! Abstract address domain (spec.md §4.6): bounds the address space and rejects
//! disallowed address operations (`Mutate`, `Compare`, `Cast`, `KeyType`, `ValueType`).

use crate::call_graph::CallGraph;
use crate::config::Config;
use crate::error::{AddressViolation, AddressViolationKind, Diagnostics};
use crate::flat_model::FlatModel;
use indexmap::IndexSet;
use solace_ast::{BinOp, CallExpr, Expr, ExprKind, NodeId, Program, TypeName, UnOp, Visit};

/// The finite address domain computed for one translation run (spec.md §4.6, §3).
#[derive(Debug, Clone)]
pub struct AddressDomain {
    pub literals: IndexSet<i128>,
    pub roles: u32,
    pub clients: u32,
    pub contracts: u32,
    pub aux: u32,
    pub concrete: bool,
}

impl AddressDomain {
    /// `size() = contracts + |literals| + aux + (concrete ? 0 : roles + clients)`,
    /// spec.md §4.6.
    pub fn size(&self) -> u32 {
        let base = self.contracts + self.literals.len() as u32 + self.aux;
        if self.concrete {
            base
        } else {
            base + self.roles + self.clients
        }
    }

    pub fn literal_symbol(n: i128) -> String {
        format!("g_literal_address_{n}")
    }
}

/// Builds the address domain from the analysis stack's other outputs, per spec.md
/// §4.6. `literal 0` is always present (the domain-invariant default/null address).
pub struct PtgBuilder<'a, 'p> {
    program: &'a Program<'p>,
    model: &'a FlatModel<'p>,
    config: &'a Config,
}

impl<'a, 'p> PtgBuilder<'a, 'p> {
    pub fn new(program: &'a Program<'p>, model: &'a FlatModel<'p>, config: &'a Config) -> Self {
        Self { program, model, config }
    }

    pub fn build(&self, call_graph: &CallGraph, diags: &mut Diagnostics) -> AddressDomain {
        let mut literals = LiteralExtractor::default();
        literals.literals.insert(0);
        for flat in self.model.view() {
            for f in flat.interface().chain(flat.internals().iter().copied()).chain(flat.constructors().iter().copied()) {
                // Only functions actually in the call graph's vertex set contribute
                // literals — spec.md §9 open question: "only executed code contributes".
                if call_graph.vertices().any(|v| v.function == f.id) {
                    if let Some(body) = &f.body {
                        solace_ast::walk_block(&mut literals, body);
                    }
                    for m in &f.header.modifiers {
                        if let Some(def) = self.program.registry.function(m.modifier) {
                            if let Some(body) = &def.body {
                                solace_ast::walk_block(&mut literals, body);
                            }
                        }
                    }
                }
            }
            for var in flat.state_variables() {
                if let Some(init) = &var.initializer {
                    solace_ast::walk_expr(&mut literals, init);
                }
            }
        }

        let mut checker = AddressChecker { diags };
        for flat in self.model.view() {
            for f in flat.interface().chain(flat.internals().iter().copied()) {
                if let Some(body) = &f.body {
                    solace_ast::walk_block(&mut checker, body);
                }
            }
            for (var, mapping_ty) in flat.mappings() {
                check_map_value_type(mapping_ty, var.var.id, self.program, diags);
            }
        }

        let roles = RoleExtractor::count(self.model, self.program);
        let clients = ClientExtractor::count(self.model);
        // Normally only the allocation closure's flat contracts are address-domain
        // slots; `use_global_contracts` (spec.md §6) widens that to every concrete
        // contract in the bundle, modeling instances the translator never allocates
        // itself but that the environment could still hand in as a parameter/role.
        let contracts = if self.config.use_global_contracts {
            self.program
                .registry
                .contracts()
                .filter(|c| matches!(c.kind, solace_ast::ContractKind::Contract))
                .count() as u32
        } else {
            self.model.view().count() as u32
        };

        AddressDomain {
            literals: literals.literals,
            roles,
            clients,
            contracts,
            aux: self.config.persistent_users,
            concrete: self.config.use_concrete_users,
        }
    }
}

/// Walks declarations, executed functions, and applied modifiers; for each explicit
/// `address(n)` inserts `n` into the literal set (spec.md §4.6).
#[derive(Default)]
struct LiteralExtractor {
    literals: IndexSet<i128>,
}

impl Visit for LiteralExtractor {
    fn visit_expr(&mut self, expr: &Expr) -> bool {
        if let ExprKind::Call(CallExpr { callee, args, .. }) = &expr.kind {
            if let ExprKind::Type(TypeName::Elementary(solace_ast::ty::ElementaryType::Address { .. })) = &callee.kind
            {
                if let [arg] = args.as_slice() {
                    if let ExprKind::Literal(solace_ast::Lit::Number { value, .. }) = &arg.kind {
                        self.literals.insert(*value);
                    }
                }
            }
        }
        true
    }
}

/// Traverses each flat contract's state variables, counting address slots (unrolling
/// structs by path), per spec.md §4.6. "This assumes every role is in use" — no
/// liveness analysis eliminates unused roles (spec.md §9 open question); the count is
/// a pure structural tally.
struct RoleExtractor;

impl RoleExtractor {
    fn count(model: &FlatModel<'_>, program: &Program<'_>) -> u32 {
        let mut total = 0u32;
        for flat in model.view() {
            for var in flat.state_variables() {
                total += Self::count_ty(&var.var.ty, program);
            }
        }
        total
    }

    fn count_ty(ty: &TypeName, program: &Program<'_>) -> u32 {
        match ty {
            TypeName::Elementary(solace_ast::ty::ElementaryType::Address { .. }) => 1,
            TypeName::UserDefined(id) => {
                if let Some(s) = program.registry.struct_(*id) {
                    s.fields.iter().map(|f| Self::count_ty(&f.ty, program)).sum()
                } else {
                    0
                }
            }
            _ => 0,
        }
    }
}

/// Computes the max number of address-typed parameters over any externally-callable
/// function, with `msg.sender` counting as 1 unconditionally (spec.md §4.6).
struct ClientExtractor;

impl ClientExtractor {
    fn count(model: &FlatModel<'_>) -> u32 {
        let mut max = 1u32; // sender always counts as one client.
        for flat in model.view() {
            for f in flat.interface() {
                let n = 1 + f.header.params.iter().filter(|p| p.ty.is_address()).count() as u32;
                max = max.max(n);
            }
        }
        max
    }
}

/// Rejects `Mutate`/`Compare`/`Cast` violations on address-typed expressions while
/// walking a function body (spec.md §4.6).
struct AddressChecker<'d> {
    diags: &'d mut Diagnostics,
}

impl Visit for AddressChecker<'_> {
    fn visit_expr(&mut self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Unary { op, expr: inner } => {
                if is_address_typed(inner) && !matches!(op, UnOp::Delete) {
                    self.diags.push(AddressViolation { kind: AddressViolationKind::Mutate, site: expr.id });
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if is_address_typed(lhs) || is_address_typed(rhs) {
                    match op {
                        BinOp::Eq | BinOp::Ne => {}
                        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                            self.diags.push(AddressViolation { kind: AddressViolationKind::Compare, site: expr.id });
                        }
                        _ => {
                            self.diags.push(AddressViolation { kind: AddressViolationKind::Mutate, site: expr.id });
                        }
                    }
                }
            }
            ExprKind::Call(CallExpr { callee, args, .. }) => {
                if let ExprKind::Type(target) = &callee.kind {
                    if let [arg] = args.as_slice() {
                        let source_is_addr = is_address_typed(arg);
                        let target_is_addr_or_contract =
                            target.is_address() || matches!(target, TypeName::UserDefined(_));
                        if source_is_addr && !target_is_addr_or_contract {
                            self.diags.push(AddressViolation { kind: AddressViolationKind::Cast, site: expr.id });
                        }
                    }
                }
            }
            _ => {}
        }
        true
    }
}

fn is_address_typed(expr: &Expr) -> bool {
    matches!(&expr.ty, Some(ty) if ty.is_address())
}

/// `ValueType` violation: a map with an address value, or a struct value containing
/// addresses (spec.md §4.6). `site` is the declaring state variable's id, since the
/// map shape itself carries no span of its own.
fn check_map_value_type(ty: &TypeName, site: NodeId, program: &Program<'_>, diags: &mut Diagnostics) {
    let Some((keys, value)) = ty.flatten_mapping() else { return };
    if value.is_address() || struct_contains_address(value, program) {
        diags.push(AddressViolation { kind: AddressViolationKind::ValueType, site });
    }
    // `KeyType`: a map key that is not itself an address but carries one nested
    // inside (a struct-typed key with an address field) — the address domain has no
    // slot kind for such a key (spec.md §4.6).
    for key in keys {
        if !key.is_address() && struct_contains_address(key, program) {
            diags.push(AddressViolation { kind: AddressViolationKind::KeyType, site });
        }
    }
}

fn struct_contains_address(ty: &TypeName, program: &Program<'_>) -> bool {
    let TypeName::UserDefined(id) = ty else { return false };
    let Some(s) = program.registry.struct_(*id) else { return false };
    s.fields.iter().any(|f| f.ty.is_address() || struct_contains_address(&f.ty, program))
}
