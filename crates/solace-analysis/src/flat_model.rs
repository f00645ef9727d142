//! Flat model and flat contract (spec.md §4.2): collapses inheritance into a single
//! addressable view per contract, and collects the set of contracts reachable from the
//! model set's roots via the allocation graph.

use crate::alloc_graph::AllocationGraph;
use indexmap::{IndexMap, IndexSet};
use solace_ast::{
    FunctionKind, Item, ItemContract, ItemEnum, ItemFunction, ItemKind, ItemStruct, NodeId, Program,
    TypeName, VariableDefinition, Visibility,
};

/// A single contract, collapsed along its C3 linearization. Built once per distinct
/// contract in the [`FlatModel`]; read-only thereafter.
#[derive(Debug)]
pub struct FlatContract<'a> {
    pub id: NodeId,
    pub contract: &'a ItemContract,
    /// C3 linearization, most-derived first, `contract` itself at index 0.
    pub linearization: Vec<NodeId>,
    state_vars: IndexMap<String, &'a VariableDefinition>,
    modifiers: IndexMap<String, &'a ItemFunction>,
    interface: IndexMap<String, &'a ItemFunction>,
    internals: Vec<&'a ItemFunction>,
    constructors: Vec<&'a ItemFunction>,
    fallback: Option<&'a ItemFunction>,
    structs: Vec<&'a ItemStruct>,
    enums: Vec<&'a ItemEnum>,
    mappings: Vec<(&'a VariableDefinition, &'a TypeName)>,
}

impl<'a> FlatContract<'a> {
    /// Builds the flat view of `contract`, walking its linearization base-to-derived
    /// (i.e. *last* wins on name collision) to match "most-recent definition" and
    /// "first occurrence wins" rules in spec.md §4.2 — name tables are populated most-
    /// derived-first and `entry().or_insert()` keeps the first (most-derived) hit,
    /// matching the "first occurrence wins" shadowing rule for state variables and the
    /// "most-recent definition" rule for modifiers (most-derived in C3 order *is* the
    /// most recent definition).
    pub fn build(program: &Program<'a>, contract: &'a ItemContract) -> Self {
        let mut flat = Self {
            id: contract.id,
            contract,
            linearization: contract.linearization.clone(),
            state_vars: IndexMap::new(),
            modifiers: IndexMap::new(),
            interface: IndexMap::new(),
            internals: Vec::new(),
            constructors: Vec::new(),
            fallback: None,
            structs: Vec::new(),
            enums: Vec::new(),
            mappings: Vec::new(),
        };

        for &base_id in &flat.linearization {
            let Some(base) = program.registry.contract(base_id) else { continue };
            for item in &base.body {
                flat.absorb(item);
            }
        }
        flat
    }

    fn absorb(&mut self, item: &'a Item) {
        match &item.kind {
            ItemKind::Variable(v) => {
                if let Some(name) = v.var.name.as_ref() {
                    self.state_vars.entry(name.as_str().to_string()).or_insert(v);
                    if v.var.ty.is_mapping() {
                        self.mappings.push((v, &v.var.ty));
                    }
                }
            }
            ItemKind::Function(f) => match f.kind {
                FunctionKind::Modifier => {
                    self.modifiers.insert(f.name().to_string(), f);
                }
                FunctionKind::Constructor => {
                    self.constructors.push(f);
                }
                FunctionKind::Fallback | FunctionKind::Receive => {
                    // Most-derived wins; linearization is walked most-derived-first,
                    // so only the first fallback/receive seen is kept.
                    if self.fallback.is_none() {
                        self.fallback = Some(f);
                    }
                }
                FunctionKind::Function => {
                    if f.is_externally_callable() {
                        self.interface.entry(f.name().to_string()).or_insert(f);
                    } else if matches!(f.header.visibility, Some(Visibility::Internal) | Some(Visibility::Private)) {
                        self.internals.push(f);
                    }
                }
            },
            ItemKind::Struct(s) => self.structs.push(s),
            ItemKind::Enum(e) => self.enums.push(e),
            ItemKind::Event(_) | ItemKind::Using(_) => {}
        }
    }

    pub fn state_variables(&self) -> impl Iterator<Item = &'a VariableDefinition> + '_ {
        self.state_vars.values().copied()
    }

    pub fn modifier(&self, name: &str) -> Option<&'a ItemFunction> {
        self.modifiers.get(name).copied()
    }

    /// Every modifier visible in this flat contract, most-derived definition winning
    /// (same shadowing rule as `modifier`). Used by the type analyzer to type modifier
    /// bodies, which the call graph never visits as their own vertices.
    pub fn modifiers(&self) -> impl Iterator<Item = &'a ItemFunction> + '_ {
        self.modifiers.values().copied()
    }

    pub fn interface(&self) -> impl Iterator<Item = &'a ItemFunction> + '_ {
        self.interface.values().copied()
    }

    pub fn internals(&self) -> &[&'a ItemFunction] {
        &self.internals
    }

    /// Constructors of `self.contract` and all non-interface bases, per spec.md §4.2.
    /// Returned most-derived-first, matching `linearization`'s order.
    pub fn constructors(&self) -> &[&'a ItemFunction] {
        &self.constructors
    }

    pub fn fallback(&self) -> Option<&'a ItemFunction> {
        self.fallback
    }

    pub fn structures(&self) -> &[&'a ItemStruct] {
        &self.structs
    }

    pub fn enums(&self) -> &[&'a ItemEnum] {
        &self.enums
    }

    pub fn mappings(&self) -> &[(&'a VariableDefinition, &'a TypeName)] {
        &self.mappings
    }

    pub fn is_payable(&self) -> bool {
        self.constructors.iter().any(|c| c.is_payable()) || self.fallback.map(|f| f.is_payable()).unwrap_or(false)
    }

    pub fn name(&self) -> &'a str {
        self.contract.name.as_str()
    }
}

/// Set of flat contracts reachable from the model-set roots (spec.md §4.2). Two views
/// are exposed: `view()` (deduplicated) and `bundle()` (multiset preserving root
/// multiplicity, for the test harness per spec.md).
#[derive(Debug)]
pub struct FlatModel<'a> {
    flats: IndexMap<NodeId, FlatContract<'a>>,
    roots: Vec<NodeId>,
}

impl<'a> FlatModel<'a> {
    /// Builds the closure of `roots` under the allocation graph's child relation,
    /// unioned with every base contract of either (spec.md §4.2, §8 invariant 5).
    pub fn build(program: &Program<'a>, roots: &[NodeId], allocs: &AllocationGraph) -> Self {
        let mut reachable: IndexSet<NodeId> = IndexSet::new();
        let mut queue: Vec<NodeId> = roots.to_vec();
        while let Some(next) = queue.pop() {
            if !reachable.insert(next) {
                continue;
            }
            if let Some(contract) = program.registry.contract(next) {
                for &base in &contract.linearization {
                    if reachable.insert(base) {
                        queue.push(base);
                    }
                }
            }
            for child in allocs.children(next) {
                queue.push(child.child);
            }
        }

        let mut flats = IndexMap::new();
        for id in reachable {
            if let Some(contract) = program.registry.contract(id) {
                flats.insert(id, FlatContract::build(program, contract));
            }
        }
        Self { flats, roots: roots.to_vec() }
    }

    /// Deduplicated view: one [`FlatContract`] per distinct contract in the closure.
    pub fn view(&self) -> impl Iterator<Item = &FlatContract<'a>> + '_ {
        self.flats.values()
    }

    pub fn get(&self, id: NodeId) -> Option<&FlatContract<'a>> {
        self.flats.get(&id)
    }

    /// Root contracts, in the multiplicity the caller originally specified (distinct
    /// from `view()`, which is already deduplicated per spec.md §4.2).
    pub fn bundle(&self) -> &[NodeId] {
        &self.roots
    }

    /// Idempotence check backing spec.md §8 invariant 5: re-closing over the already-
    /// closed id set must not grow it.
    pub fn is_closed(&self, program: &Program<'a>, allocs: &AllocationGraph) -> bool {
        let ids: Vec<NodeId> = self.flats.keys().copied().collect();
        let reclosed = Self::build(program, &ids, allocs);
        reclosed.flats.len() == self.flats.len()
    }
}
