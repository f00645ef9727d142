use crate::ident::NodeId;
use serde::{Deserialize, Serialize};

/// A Solidity type name, resolved: user-defined references already point at the
/// declaring node rather than at an unresolved path. This is deliberately *not* split
/// into a syntactic "as written" form and a separate resolved `Type*`, because the
/// front-end this crate consumes (out of scope, spec.md §1) is assumed to have already
/// folded the two together, exactly as `referencedDeclaration` folds identifier
/// resolution into the AST in solc-family front-ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    Elementary(ElementaryType),
    /// `mapping(K => V)`. Nested mappings are represented by `value` itself being a
    /// `Mapping`; the map database (spec.md §4.5) flattens the chain into a key tuple.
    Mapping { key: Box<TypeName>, value: Box<TypeName> },
    /// A reference to a contract, struct, enum, or user-defined value type declared
    /// elsewhere in the bundle.
    UserDefined(NodeId),
    /// `T[]` or `T[N]`. Rejected by the address domain and type analyzer per spec.md's
    /// non-goals (dynamic arrays); fixed-size arrays are likewise out of scope.
    Array { element: Box<TypeName>, len: Option<u64> },
    /// A function type, e.g. `function(uint) external returns (bool)`. Only used for
    /// library `using for` resolution; never lowered directly.
    Function,
}

impl TypeName {
    pub const ADDRESS: Self = Self::Elementary(ElementaryType::Address { payable: false });

    pub fn is_address(&self) -> bool {
        matches!(self, Self::Elementary(ElementaryType::Address { .. }))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }

    /// Flattens a (possibly nested) mapping type into its key tuple and leaf value
    /// type, per spec.md §4.5.
    pub fn flatten_mapping(&self) -> Option<(Vec<&TypeName>, &TypeName)> {
        let Self::Mapping { key, value } = self else { return None };
        let mut keys = vec![key.as_ref()];
        let mut cur = value.as_ref();
        while let Self::Mapping { key, value } = cur {
            keys.push(key.as_ref());
            cur = value.as_ref();
        }
        Some((keys, cur))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementaryType {
    Bool,
    /// `address` / `address payable`.
    Address { payable: bool },
    /// `intN`, 8..=256 in steps of 8.
    Int(u16),
    /// `uintN`, 8..=256 in steps of 8.
    Uint(u16),
    /// `bytesN`, 1..=32.
    FixedBytes(u8),
    /// Dynamic `bytes`. Rejected outside of hashing contexts (non-goal).
    Bytes,
    /// Dynamic `string`. Hashed to `sol_uint256_t` per spec.md §4.7.
    String,
}

/// A denomination suffix on a numeric literal (`1 ether`, `2 days`), applied by the
/// expression lowerer's `Literal` rule (spec.md §4.9) to scale the literal's raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denomination {
    Wei,
    Gwei,
    Ether,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl Denomination {
    /// The multiplier to apply to the literal's raw decimal value.
    pub fn multiplier(self) -> u128 {
        match self {
            Self::Wei | Self::Seconds => 1,
            Self::Gwei => 1_000_000_000,
            Self::Ether => 1_000_000_000_000_000_000,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
            Self::Weeks => 7 * 24 * 60 * 60,
        }
    }
}
