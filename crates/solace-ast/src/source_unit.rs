use crate::ident::NodeId;
use crate::item::{Item, ItemContract, ItemEnum, ItemFunction, ItemKind, ItemStruct, VariableDefinition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceUnit {
    pub items: Vec<Item>,
}

/// A whole input bundle: every parsed source unit, borrowed for the lifetime of the
/// translation. Downstream analysis passes hold borrows into this registry rather
/// than owning copies of AST nodes (spec.md §9, "keep the AST in an arena").
#[derive(Debug)]
pub struct Program<'a> {
    pub units: &'a [SourceUnit],
    pub registry: Registry<'a>,
}

impl<'a> Program<'a> {
    pub fn new(units: &'a [SourceUnit]) -> Self {
        Self { units, registry: Registry::build(units) }
    }
}

/// A reference to whatever declaration a [`NodeId`] names.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    Contract(&'a ItemContract),
    /// Covers `function`, `constructor`, `fallback`, `receive`, and `modifier` kinds
    /// alike, distinguished via `ItemFunction::kind`.
    Function(&'a ItemFunction),
    Struct(&'a ItemStruct),
    Enum(&'a ItemEnum),
    StateVar(&'a VariableDefinition),
}

/// Maps every declaration-introducing [`NodeId`] in the bundle to a borrowed
/// reference into the tree that declared it. Built once, read-only thereafter.
#[derive(Debug, Default)]
pub struct Registry<'a> {
    by_id: IndexMap<NodeId, DeclRef<'a>>,
}

impl<'a> Registry<'a> {
    pub fn build(units: &'a [SourceUnit]) -> Self {
        let mut reg = Self::default();
        for unit in units {
            for item in &unit.items {
                reg.index_item(item);
            }
        }
        reg
    }

    fn index_item(&mut self, item: &'a Item) {
        match &item.kind {
            ItemKind::Contract(c) => {
                self.by_id.insert(c.id, DeclRef::Contract(c));
                for sub in &c.body {
                    self.index_item(sub);
                }
            }
            ItemKind::Function(f) => {
                self.by_id.insert(f.id, DeclRef::Function(f));
                for p in f.header.params.iter().chain(f.header.returns.iter()) {
                    // Parameters are addressable declarations too, but are not
                    // top-level DeclRef kinds; the scope resolver (solace-analysis)
                    // indexes them locally per function instead.
                    let _ = p;
                }
            }
            ItemKind::Struct(s) => {
                self.by_id.insert(s.id, DeclRef::Struct(s));
            }
            ItemKind::Enum(e) => {
                self.by_id.insert(e.id, DeclRef::Enum(e));
            }
            ItemKind::Variable(v) => {
                self.by_id.insert(v.var.id, DeclRef::StateVar(v));
            }
            ItemKind::Event(_) | ItemKind::Using(_) => {}
        }
    }

    pub fn get(&self, id: NodeId) -> Option<DeclRef<'a>> {
        self.by_id.get(&id).copied()
    }

    pub fn contract(&self, id: NodeId) -> Option<&'a ItemContract> {
        match self.get(id) {
            Some(DeclRef::Contract(c)) => Some(c),
            _ => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<&'a ItemFunction> {
        match self.get(id) {
            Some(DeclRef::Function(f)) => Some(f),
            _ => None,
        }
    }

    pub fn struct_(&self, id: NodeId) -> Option<&'a ItemStruct> {
        match self.get(id) {
            Some(DeclRef::Struct(s)) => Some(s),
            _ => None,
        }
    }

    pub fn enum_(&self, id: NodeId) -> Option<&'a ItemEnum> {
        match self.get(id) {
            Some(DeclRef::Enum(e)) => Some(e),
            _ => None,
        }
    }

    pub fn state_var(&self, id: NodeId) -> Option<&'a VariableDefinition> {
        match self.get(id) {
            Some(DeclRef::StateVar(v)) => Some(v),
            _ => None,
        }
    }

    /// All contracts in the bundle, in source order.
    pub fn contracts(&self) -> impl Iterator<Item = &'a ItemContract> + '_ {
        self.by_id.values().filter_map(|d| match d {
            DeclRef::Contract(c) => Some(*c),
            _ => None,
        })
    }

    pub fn contract_by_name(&self, name: &str) -> Option<&'a ItemContract> {
        self.contracts().find(|c| c.name.as_str() == name)
    }
}
