use crate::expr::Expr;
use crate::ident::{Ident, NodeId, Span};
use crate::stmt::Block;
use crate::ty::TypeName;
use serde::{Deserialize, Serialize};

/// A top-level or contract-body item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: NodeId,
    pub span: Span,
    pub kind: ItemKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ItemKind {
    Contract(ItemContract),
    Function(ItemFunction),
    Variable(VariableDefinition),
    Struct(ItemStruct),
    Enum(ItemEnum),
    Event(ItemEvent),
    /// `using Lib for T;` — kept so the call graph can classify `Lib.f(x)` sugar as a
    /// `Library` edge (spec.md §4.4).
    Using(UsingDirective),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    Contract,
    AbstractContract,
    Interface,
    Library,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemContract {
    pub id: NodeId,
    pub kind: ContractKind,
    pub name: Ident,
    /// Base list as written, in source order (most-derived is this contract itself).
    pub bases: Vec<InheritanceSpecifier>,
    /// The front-end's C3 linearization of this contract, most-derived first,
    /// including `self` at index 0. Consumed directly by the flat model (spec.md §4.2)
    /// rather than recomputed, since C3 linearization is a front-end responsibility.
    pub linearization: Vec<NodeId>,
    pub body: Vec<Item>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InheritanceSpecifier {
    pub base: NodeId,
    pub args: Vec<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn is_payable(self) -> bool {
        matches!(self, Self::Payable)
    }

    pub fn is_pure(self) -> bool {
        matches!(self, Self::Pure)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    Constructor,
    Function,
    Fallback,
    Receive,
    Modifier,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemFunction {
    pub id: NodeId,
    pub kind: FunctionKind,
    pub header: FunctionHeader,
    pub body: Option<Block>,
    /// The contract this function is textually declared in. `None` for free
    /// functions, which this translator does not model (not referenced by spec.md).
    pub contract: Option<NodeId>,
}

impl ItemFunction {
    pub fn name(&self) -> &str {
        match &self.header.name {
            Some(id) => id.as_str(),
            None => self.kind.default_name(),
        }
    }

    pub fn is_payable(&self) -> bool {
        self.header.mutability == Some(StateMutability::Payable)
    }

    pub fn is_externally_callable(&self) -> bool {
        matches!(self.header.visibility, Some(Visibility::Public) | Some(Visibility::External))
            && matches!(self.kind, FunctionKind::Function | FunctionKind::Fallback | FunctionKind::Receive)
    }
}

impl FunctionKind {
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Constructor => "constructor",
            Self::Function => "<function>",
            Self::Fallback => "fallback",
            Self::Receive => "receive",
            Self::Modifier => "<modifier>",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FunctionHeader {
    pub name: Option<Ident>,
    pub params: Vec<VariableDeclaration>,
    pub visibility: Option<Visibility>,
    pub mutability: Option<StateMutability>,
    pub modifiers: Vec<ModifierInvocation>,
    pub virtual_: bool,
    pub override_paths: Option<Vec<NodeId>>,
    pub returns: Vec<VariableDeclaration>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModifierInvocation {
    /// Resolves either to a `Modifier` function, or to a base contract (when used as
    /// an inheritance-list constructor argument list rather than a true modifier).
    pub modifier: NodeId,
    /// `true` for `super.m()`-shaped invocations appearing in the header itself;
    /// exceedingly rare in practice but representable.
    pub is_super: bool,
    pub args: Vec<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageLocation {
    Memory,
    Storage,
    Calldata,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub id: NodeId,
    pub name: Option<Ident>,
    pub ty: TypeName,
    pub storage: Option<StorageLocation>,
    pub indexed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateVarMutability {
    Mutable,
    Immutable,
    Constant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub var: VariableDeclaration,
    pub visibility: Visibility,
    pub mutability: StateVarMutability,
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemStruct {
    pub id: NodeId,
    pub name: Ident,
    pub fields: Vec<VariableDeclaration>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemEnum {
    pub id: NodeId,
    pub name: Ident,
    pub variants: Vec<Ident>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemEvent {
    pub id: NodeId,
    pub name: Ident,
    pub params: Vec<VariableDeclaration>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsingDirective {
    pub library: NodeId,
    pub ty: Option<TypeName>,
}
