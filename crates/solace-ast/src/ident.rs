use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte range into the originating source file. Carried for diagnostics only; the
/// translator never re-slices source text from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    pub const DUMMY: Self = Self { lo: 0, hi: 0 };
}

/// A stable identity for a declaration-introducing AST node (contract, function,
/// modifier, struct, enum, state variable, parameter, or local). Assigned by the
/// front-end; the translator never allocates its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identifier as written in source, together with the declaration it was resolved
/// to by the front-end (or a magic global, for `msg`, `block`, `this`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub res: Res,
}

impl Ident {
    pub fn new(name: impl Into<String>, res: Res) -> Self {
        Self { name: name.into(), span: Span::DUMMY, res }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What an identifier resolves to. Populated by the (out-of-scope) front-end; the
/// translator only ever reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Res {
    /// Resolves to a declaration elsewhere in the AST (contract, function, modifier,
    /// struct, enum, state variable, parameter, or local).
    Decl(NodeId),
    /// One of Solidity's builtin globals (`msg`, `block`, `tx`, `this`, `super`, ...).
    Magic(Magic),
    /// The front-end could not resolve this identifier. A well-typed input never
    /// produces this; its presence is an internal-inconsistency error (spec.md §7).
    Unresolved,
}

/// Solidity's builtin magic identifiers and members, as consumed by the call-state
/// model (spec.md §4.8) and the expression lowerer's `MemberAccess` rule (§4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Magic {
    Msg,
    MsgSender,
    MsgValue,
    MsgData,
    MsgSig,
    Block,
    BlockNumber,
    BlockTimestamp,
    BlockCoinbase,
    Tx,
    TxOrigin,
    TxGasPrice,
    This,
    Super,
    Now,
}
