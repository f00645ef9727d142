//! Ergonomic constructors for hand-built AST fixtures, used by this workspace's own
//! test suites (parsing Solidity source is out of scope, so tests build the tree
//! directly rather than feeding a `.sol` fixture through a front-end).

use crate::expr::{CallExpr, Expr, ExprKind, Lit};
use crate::ident::{Ident, NodeId, Res, Span};
use crate::item::{
    ContractKind, FunctionHeader, FunctionKind, InheritanceSpecifier, Item, ItemContract, ItemEnum,
    ItemFunction, ItemKind, ItemStruct, StateMutability, StateVarMutability, StorageLocation,
    VariableDeclaration, VariableDefinition, Visibility,
};
use crate::stmt::{Block, Stmt, StmtKind};
use crate::ty::TypeName;

pub fn id(n: u32) -> NodeId {
    NodeId(n)
}

pub fn ident(name: &str, res: Res) -> Ident {
    Ident { name: name.to_string(), span: Span::DUMMY, res }
}

pub fn decl_ident(name: &str, decl: NodeId) -> Ident {
    ident(name, Res::Decl(decl))
}

pub fn item(kind: ItemKind) -> Item {
    Item { id: NodeId(0), span: Span::DUMMY, kind }
}

pub fn contract(
    cid: NodeId,
    name: &str,
    kind: ContractKind,
    bases: Vec<NodeId>,
    linearization: Vec<NodeId>,
    body: Vec<Item>,
) -> Item {
    Item {
        id: cid,
        span: Span::DUMMY,
        kind: ItemKind::Contract(ItemContract {
            id: cid,
            kind,
            name: decl_ident(name, cid),
            bases: bases.into_iter().map(|base| InheritanceSpecifier { base, args: vec![] }).collect(),
            linearization,
            body,
        }),
    }
}

pub fn state_var(vid: NodeId, name: &str, ty: TypeName, visibility: Visibility) -> Item {
    item(ItemKind::Variable(VariableDefinition {
        var: VariableDeclaration {
            id: vid,
            name: Some(decl_ident(name, vid)),
            ty,
            storage: None,
            indexed: false,
        },
        visibility,
        mutability: StateVarMutability::Mutable,
        initializer: None,
    }))
}

pub fn param(pid: NodeId, name: &str, ty: TypeName, storage: Option<StorageLocation>) -> VariableDeclaration {
    VariableDeclaration { id: pid, name: Some(decl_ident(name, pid)), ty, storage, indexed: false }
}

#[allow(clippy::too_many_arguments)]
pub fn function(
    fid: NodeId,
    contract: NodeId,
    name: &str,
    kind: FunctionKind,
    params: Vec<VariableDeclaration>,
    returns: Vec<VariableDeclaration>,
    visibility: Visibility,
    mutability: StateMutability,
    body: Option<Block>,
) -> Item {
    item(ItemKind::Function(ItemFunction {
        id: fid,
        kind,
        header: FunctionHeader {
            name: Some(decl_ident(name, fid)),
            params,
            visibility: Some(visibility),
            mutability: Some(mutability),
            modifiers: vec![],
            virtual_: false,
            override_paths: None,
            returns,
        },
        body,
        contract: Some(contract),
    }))
}

pub fn struct_(sid: NodeId, name: &str, fields: Vec<VariableDeclaration>) -> Item {
    item(ItemKind::Struct(ItemStruct { id: sid, name: decl_ident(name, sid), fields }))
}

pub fn enum_(eid: NodeId, name: &str, variants: &[&str]) -> Item {
    item(ItemKind::Enum(ItemEnum {
        id: eid,
        name: decl_ident(name, eid),
        variants: variants.iter().map(|v| ident(v, Res::Unresolved)).collect(),
    }))
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block { stmts }
}

pub fn stmt(kind: StmtKind) -> Stmt {
    Stmt { id: NodeId(0), span: Span::DUMMY, kind }
}

pub fn expr(ty: Option<TypeName>, kind: ExprKind) -> Expr {
    Expr { id: NodeId(0), span: Span::DUMMY, ty, kind }
}

pub fn lit_bool(b: bool) -> Expr {
    expr(Some(TypeName::Elementary(crate::ty::ElementaryType::Bool)), ExprKind::Literal(Lit::Bool(b)))
}

pub fn lit_num(value: i128, ty: TypeName) -> Expr {
    expr(Some(ty), ExprKind::Literal(Lit::Number { value, denom: None }))
}

pub fn ident_expr(name: &str, decl: NodeId, ty: TypeName) -> Expr {
    expr(Some(ty), ExprKind::Ident(decl_ident(name, decl)))
}

pub fn call(callee: Expr, args: Vec<Expr>, ty: Option<TypeName>) -> Expr {
    expr(ty, ExprKind::Call(CallExpr { callee: Box::new(callee), args, arg_names: vec![] }))
}
