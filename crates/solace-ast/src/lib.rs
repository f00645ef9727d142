//! AST node definitions for the subset of Solidity this workspace translates to C.
//!
//! This crate defines the shape of the input the translation pipeline consumes. It
//! does not parse Solidity source: the lexer, parser, and type-checker that would
//! produce values of these types are out of scope (see the root `SPEC_FULL.md`), the
//! same way `forge-fmt` and `forge-lint` consume an already-resolved `solar_ast` tree
//! rather than building their own parser. Every expression node already carries its
//! resolved Solidity type and every identifier its resolved declaration, exactly as a
//! solc-family front-end's AST does.

pub mod builder;
pub mod expr;
pub mod ident;
pub mod item;
pub mod source_unit;
pub mod stmt;
pub mod ty;
pub mod visit;

pub use expr::{AssignOp, BinOp, CallExpr, Expr, ExprKind, Lit, UnOp};
pub use ident::{Ident, Magic, NodeId, Res, Span};
pub use item::{
    ContractKind, FunctionHeader, FunctionKind, InheritanceSpecifier, Item, ItemContract, ItemEnum,
    ItemEvent, ItemFunction, ItemKind, ItemStruct, ModifierInvocation, StateMutability, StateVarMutability,
    StorageLocation, UsingDirective, VariableDeclaration, VariableDefinition, Visibility,
};
pub use source_unit::{DeclRef, Program, Registry, SourceUnit};
pub use stmt::{Block, Stmt, StmtKind};
pub use ty::{Denomination, ElementaryType, TypeName};
pub use visit::{walk_block, walk_expr, walk_item, walk_stmt, Visit};
