use serde::{Deserialize, Serialize};

/// The configuration tuple named in spec.md §6, threaded through every analysis pass
/// and the code generator. Mirrors `foundry_config::Config`'s shape (a plain,
/// serde-round-trippable settings struct with a `Default` impl) scaled down to this
/// translator's much smaller surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// `k`: the number of distinct keys tracked per map instance (spec.md §4.11).
    pub map_depth: u32,
    /// The number of persistent (non-contract) user addresses modeled.
    pub persistent_users: u32,
    /// In concrete mode, roles and clients are elided from the address domain
    /// (spec.md §4.6).
    pub use_concrete_users: bool,
    /// Whether contract instances outside the model set's allocation closure are
    /// still modeled as address-domain members.
    pub use_global_contracts: bool,
    /// Lower `require(...)` to `sol_assert` instead of `sol_require`, treating failed
    /// preconditions as verifier-visible bugs rather than recoverable reverts.
    /// Supplemented from `original_source/` per SPEC_FULL.md.
    pub escalate_requires: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_depth: 2,
            persistent_users: 1,
            use_concrete_users: false,
            use_global_contracts: false,
            escalate_requires: false,
        }
    }
}
