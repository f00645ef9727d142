//! End-to-end exercise of `analyze()` over a hand-built one-contract fixture (spec.md
//! §8 scenario 1: "a contract with one address state variable and one setter"),
//! mirroring `solace-ast`'s own `tests/registry.rs` fixture-construction style.

use solace_ast::builder::*;
use solace_ast::{AssignOp, ContractKind, ExprKind, FunctionKind, SourceUnit, StateMutability, StmtKind, TypeName, Visibility};

fn simple_contract() -> SourceUnit {
    let contract_id = id(1);
    let owner_id = id(10);
    let param_id = id(20);
    let func_id = id(30);

    let assign = expr(
        Some(TypeName::ADDRESS),
        ExprKind::Assign {
            op: AssignOp::Assign,
            lhs: Box::new(ident_expr("owner", owner_id, TypeName::ADDRESS)),
            rhs: Box::new(ident_expr("newOwner", param_id, TypeName::ADDRESS)),
        },
    );
    let body = block(vec![stmt(StmtKind::Expr(assign))]);

    let set_owner = function(
        func_id,
        contract_id,
        "setOwner",
        FunctionKind::Function,
        vec![param(param_id, "newOwner", TypeName::ADDRESS, None)],
        vec![],
        Visibility::External,
        StateMutability::NonPayable,
        Some(body),
    );

    SourceUnit {
        items: vec![contract(
            contract_id,
            "Simple",
            ContractKind::Contract,
            vec![],
            vec![contract_id],
            vec![state_var(owner_id, "owner", TypeName::ADDRESS, Visibility::Public), set_owner],
        )],
    }
}

#[test]
fn analyze_flattens_and_types_a_single_contract() {
    let units = vec![simple_contract()];
    let program = solace_ast::Program::new(&units);
    let roots = vec![id(1)];
    let config = solace_analysis::Config::default();
    let mut diags = solace_analysis::Diagnostics::default();

    let analysis = solace_analysis::analyze(&program, &roots, &config, &mut diags);

    assert!(diags.is_empty(), "a plain address assignment should raise no address-domain violations");
    assert_eq!(analysis.model.view().count(), 1);

    let flat = analysis.model.get(id(1)).expect("root contract present in the flat model");
    assert_eq!(flat.name(), "Simple");
    assert_eq!(flat.interface().count(), 1);
    assert!(analysis.map_db.records().is_empty(), "fixture declares no mappings");

    // One call-graph vertex for `setOwner`, reached as the sole interface entry.
    let vertex = solace_analysis::CallVertex { scope: id(1), function: id(30) };
    assert!(analysis.call_graph.contains(vertex));

    // Both `owner` and the `newOwner` parameter type to the wrapped address scalar.
    assert_eq!(analysis.types.node_type(id(10)).map(|t| t.c_name()), Some("sol_address_t"));
    assert_eq!(analysis.types.node_type(id(20)).map(|t| t.c_name()), Some("sol_address_t"));
}

#[test]
fn address_domain_size_matches_the_structural_tally() {
    let units = vec![simple_contract()];
    let program = solace_ast::Program::new(&units);
    let roots = vec![id(1)];
    let config = solace_analysis::Config::default();
    let mut diags = solace_analysis::Diagnostics::default();

    let analysis = solace_analysis::analyze(&program, &roots, &config, &mut diags);

    // literals: {0} (the always-present null address) -> 1.
    // roles: one address state variable -> 1.
    // clients: msg.sender (1) + setOwner's one address param -> 2.
    // contracts: one flat contract -> 1.
    // aux: Config::default().persistent_users -> 1.
    assert_eq!(analysis.address_domain.literals.len(), 1);
    assert_eq!(analysis.address_domain.roles, 1);
    assert_eq!(analysis.address_domain.clients, 2);
    assert_eq!(analysis.address_domain.contracts, 1);
    assert_eq!(analysis.address_domain.size(), 6);
}

#[test]
fn flat_model_closure_is_idempotent() {
    let units = vec![simple_contract()];
    let program = solace_ast::Program::new(&units);
    let roots = vec![id(1)];
    let config = solace_analysis::Config::default();
    let mut diags = solace_analysis::Diagnostics::default();
    let analysis = solace_analysis::analyze(&program, &roots, &config, &mut diags);

    assert!(analysis.model.is_closed(&program, &analysis.allocs));
}
