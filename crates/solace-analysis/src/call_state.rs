//! Call-state model (spec.md §4.8): the ordered auxiliary-parameter tuple threaded
//! through every mutable call.

/// The call-state parameters, in the fixed order spec.md §6 names them: `self` is
/// threaded separately (it is the C receiver pointer, not part of this tuple).
pub const CALL_STATE_PARAMS: [&str; 6] = ["sender", "value", "blocknum", "timestamp", "paid", "origin"];

/// Whether a callable needs the call-state tuple at all, and if so what the next
/// call's tuple looks like relative to the current one (spec.md §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStateKind {
    /// Pure library functions: no `self`, no call-state.
    PureLibrary,
    /// Pure member functions: neither `self` nor call-state (spec.md §4.8: "pure
    /// member functions receive neither self nor call-state").
    PureMember,
    /// Every other callable: both `self` and the full call-state tuple.
    Full,
}

impl CallStateKind {
    pub fn for_function(is_library: bool, is_pure: bool) -> Self {
        match (is_library, is_pure) {
            (true, true) => Self::PureLibrary,
            (false, true) => Self::PureMember,
            _ => Self::Full,
        }
    }

    pub fn takes_self(self) -> bool {
        matches!(self, Self::Full)
    }

    pub fn takes_call_state(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// How the next call-state tuple is derived from the current one, per spec.md §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEdgeKind {
    /// `this.g(...)` or `e.g(...)`: sender <- current `self.address`; value <-
    /// user-supplied (0 if absent); paid <- 1; blocknum/timestamp/origin forwarded.
    External,
    /// A same-contract internal/super/library call: sender, value, origin forwarded
    /// unchanged; paid <- 0.
    Internal,
}

/// Describes, symbolically, how each of the six call-state fields is derived for the
/// callee at one call site. Consumed by the expression lowerer when emitting a call's
/// call-state argument list (spec.md §4.9 "Method emission").
#[derive(Debug, Clone, Copy)]
pub struct CallStateEdge {
    pub kind: CallEdgeKind,
}

impl CallStateEdge {
    pub fn new(kind: CallEdgeKind) -> Self {
        Self { kind }
    }

    /// `true` if `paid` is forced to 1 for the callee (External edges only).
    pub fn paid_is_one(self) -> bool {
        matches!(self.kind, CallEdgeKind::External)
    }

    /// `true` if `sender` becomes the caller's own address rather than being forwarded.
    pub fn sender_is_self(self) -> bool {
        matches!(self.kind, CallEdgeKind::External)
    }
}
