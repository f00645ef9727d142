use solace_ast::NodeId;
use thiserror::Error;

/// The three error taxonomies named in spec.md §7. Each pass collects its own
/// violations and keeps running where it can (non-fatal per-site); the driver
/// aggregates everything and turns a non-empty list into a non-zero exit.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("allocation escapes constructor at {site}: `new` result is not assigned to a state variable")]
    EscapingAllocation { site: NodeId },

    #[error("allocation graph contains a cycle through {0}")]
    AllocationCycle(NodeId),

    #[error("cannot resolve contract-valued rv for expression {0}: {reason}")]
    UnresolvedRv { expr: NodeId, reason: &'static str },

    #[error(transparent)]
    Address(#[from] AddressViolation),

    #[error("unsupported construct: {construct} at {site}")]
    Unsupported { construct: &'static str, site: NodeId },

    #[error("internal inconsistency: {0}")]
    Internal(String),
}

/// `AbstractAddressDomain` violations (spec.md §4.6).
#[derive(Debug, Clone, Copy, Error)]
#[error("{kind} address violation at {site}")]
pub struct AddressViolation {
    pub kind: AddressViolationKind,
    pub site: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressViolationKind {
    /// Arithmetic or member access applied to an address-cast subexpression.
    Mutate,
    /// An ordering comparison (`<`, `>`, `<=`, `>=`) applied to addresses.
    Compare,
    /// A narrowing/widening cast from `address` to a non-address, non-contract type.
    Cast,
    /// A map with a non-address key type holding addresses.
    KeyType,
    /// A map with an address value, or a struct value containing addresses.
    ValueType,
}

impl std::fmt::Display for AddressViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Mutate => "mutate",
            Self::Compare => "compare",
            Self::Cast => "cast",
            Self::KeyType => "key-type",
            Self::ValueType => "value-type",
        };
        f.write_str(s)
    }
}

/// A collector for non-fatal, per-site violations. Every analysis pass that can
/// produce more than one diagnostic takes a `&mut Diagnostics` rather than returning
/// `Result` eagerly, so that e.g. the address domain can report every bad cast in one
/// run instead of stopping at the first.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<AnalysisError>,
}

impl Diagnostics {
    pub fn push(&mut self, err: impl Into<AnalysisError>) {
        self.errors.push(err.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<AnalysisError> {
        self.errors
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
    }
}
