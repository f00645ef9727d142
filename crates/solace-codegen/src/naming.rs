//! Deterministic C symbol naming shared by the lowerers, the function converter, and
//! the driver (spec.md §4.11 point 4 / §4.13, naming conventions fixed by spec.md §6):
//! every emitted contract, struct, method, and constructor gets one fixed,
//! collision-free name derived from the flattened model rather than recomputed ad hoc
//! at each call site.

use solace_analysis::{escape, FlatContract};
use solace_ast::{ItemFunction, ItemStruct};

/// `struct <Contract>` (spec.md §6). Must match the symbol the type analyzer already
/// assigned the flat contract (`TypeAnalyzer::analyze`), since both read off the same
/// `escape(flat.name())`.
pub fn struct_name(flat: &FlatContract<'_>) -> String {
    escape(flat.name())
}

/// `<Contract>_Method_<name>`: the user-facing entry point for function `func`, most-
/// derived flat contract `flat` defining it.
pub fn method_name(flat: &FlatContract<'_>, func: &ItemFunction) -> String {
    format!("{}_Method_{}", struct_name(flat), escape(func.name()))
}

/// `<Contract>_Method_<i>_<name>`: the i-th modifier specialization of `func`
/// (spec.md §4.11 point 2, §6). `i` counts from 1 (outermost modifier) up to k (the
/// function's own body, emitted as the innermost specialization).
pub fn method_spec_name(flat: &FlatContract<'_>, func: &ItemFunction, i: usize) -> String {
    format!("{}_Method_{}_{}", struct_name(flat), i, escape(func.name()))
}

/// `Init_<Contract>`: the top-level constructor entry point (spec.md §6), equal to
/// `Init_<C>_For_<C>` per spec.md §4.11 point 1.
pub fn ctor_name(flat: &FlatContract<'_>) -> String {
    format!("Init_{}", struct_name(flat))
}

/// `Init_<Base>_For_<Derived>`: one link of the constructor chain (spec.md §4.11
/// point 1, §6), invoked by `Derived`'s own chain once per base in its linearization.
pub fn ctor_for_name(base_flat: &FlatContract<'_>, derived_flat: &FlatContract<'_>) -> String {
    format!("Init_{}_For_{}", struct_name(base_flat), struct_name(derived_flat))
}

/// `<Contract>_Constructor`: the user-written constructor body (spec.md §6), distinct
/// from the `Init_*_For_*` chain links that call it.
pub fn ctor_body_name(flat: &FlatContract<'_>) -> String {
    format!("{}_Constructor", struct_name(flat))
}

/// The fallback entry point, invoked only by the test harness (spec.md §4.11 point 3).
pub fn fallback_name(flat: &FlatContract<'_>) -> String {
    format!("{}_Fallback", struct_name(flat))
}

pub fn library_method_name(library_name: &str, func_name: &str) -> String {
    format!("Library_{}_Method_{}", escape(library_name), escape(func_name))
}

/// `<Contract>_Struct_<Name>` (spec.md §6).
pub fn struct_type_name(flat: &FlatContract<'_>, s: &ItemStruct) -> String {
    format!("{}_Struct_{}", struct_name(flat), escape(s.name.as_str()))
}

pub fn zero_init_name(type_name: &str) -> String {
    format!("ZeroInit_{type_name}")
}

pub fn init_name(type_name: &str) -> String {
    format!("Init_{type_name}")
}

pub fn nd_init_name(type_name: &str) -> String {
    format!("ND_{type_name}")
}
