//! Per-contract struct layout (spec.md §6: `struct <Contract>`): the synthesized
//! `model_balance`/`model_address` fields plus one `user_<name>` field per merged
//! state variable of a [`FlatContract`], mapping-typed fields included (their field
//! type is the owning [`MapRecord`]'s `struct Map_N`, not a separate helper trio —
//! unlike a declared `struct S`, a contract itself has no `ZeroInit_`/`Init_`/`ND_`
//! family of its own; `Init_<Contract>` is the constructor chain, not a struct
//! initializer, per spec.md §4.11 point 1).

use crate::cast::{CStructDef, CStructField};
use crate::naming;
use solace_analysis::{FlatContract, TypeTable};

pub fn struct_def(flat: &FlatContract<'_>, types: &TypeTable) -> CStructDef {
    let mut fields = vec![
        CStructField { ty: "sol_uint256_t".into(), name: "model_balance".into(), is_pointer: false },
        CStructField { ty: "sol_address_t".into(), name: "model_address".into(), is_pointer: false },
    ];

    for var in flat.state_variables() {
        let Some(name) = var.var.name.as_ref() else { continue };
        let Some(ctype) = types.node_type(var.var.id) else { continue };
        fields.push(CStructField {
            ty: ctype.c_name().to_string(),
            name: format!("user_{}", name.as_str()),
            is_pointer: false,
        });
    }

    CStructDef { name: naming::struct_name(flat), fields }
}
