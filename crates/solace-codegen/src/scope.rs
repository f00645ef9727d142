//! The current variable-scope resolver the expression lowerer is configured with
//! (spec.md §4.9): rewrites an identifier's referenced declaration to the emitted C
//! name it was given, and records whether that name denotes a pointer.

use indexmap::IndexMap;
use solace_ast::NodeId;

#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub c_name: String,
    pub is_pointer: bool,
}

/// A stack of lexical scopes, innermost last, mirroring the block lowerer's
/// open-a-scope-per-block discipline (spec.md §4.10).
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<IndexMap<NodeId, ScopeEntry>>,
}

impl Scope {
    pub fn new() -> Self {
        Self { frames: vec![IndexMap::new()] }
    }

    pub fn push(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn bind(&mut self, decl: NodeId, c_name: impl Into<String>, is_pointer: bool) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .insert(decl, ScopeEntry { c_name: c_name.into(), is_pointer });
    }

    pub fn lookup(&self, decl: NodeId) -> Option<&ScopeEntry> {
        self.frames.iter().rev().find_map(|frame| frame.get(&decl))
    }
}
