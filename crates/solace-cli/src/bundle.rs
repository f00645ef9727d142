//! Loads a JSON-encoded AST bundle and resolves the user's model-set contract names
//! to their [`NodeId`]s. Parsing Solidity source itself is out of scope (spec.md §1);
//! this crate only reads the already-resolved tree a front-end would hand the
//! translator, serialized as JSON for this repo's own CLI and test fixtures.

use eyre::{eyre, Context, Result};
use solace_ast::{NodeId, Program, SourceUnit};
use std::path::Path;

pub fn load_units(path: &Path) -> Result<Vec<SourceUnit>> {
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading AST bundle at {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("parsing AST bundle at {} as JSON", path.display()))
}

/// Resolves each model-set contract name to its declaring [`NodeId`], per spec.md §6
/// ("a model set: list of contract symbols that are roots").
pub fn resolve_roots(program: &Program<'_>, names: &[String]) -> Result<Vec<NodeId>> {
    let mut roots = Vec::with_capacity(names.len());
    for name in names {
        let contract = program
            .registry
            .contract_by_name(name)
            .ok_or_else(|| eyre!("model-set contract `{name}` not found in the AST bundle"))?;
        roots.push(contract.id);
    }
    Ok(roots)
}
