//! Exercises the `solace` binary end to end: a fixture built the same way
//! `solace-analysis/tests/pipeline.rs` builds one, serialized to the JSON AST bundle
//! format `bundle::load_units` expects, fed through the compiled binary via
//! `env!("CARGO_BIN_EXE_solace")` rather than a library call, so the test actually
//! covers argument parsing, config merging, and process exit codes (spec.md §6/§7).

use solace_ast::builder::*;
use solace_ast::{AssignOp, ContractKind, ExprKind, FunctionKind, SourceUnit, StateMutability, StmtKind, TypeName, Visibility};
use std::io::Write;
use std::process::Command;

fn write_bundle(units: &[SourceUnit]) -> std::path::PathBuf {
    let text = serde_json::to_string(units).expect("fixture AST should serialize");
    let mut path = std::env::temp_dir();
    path.push(format!("solace-cli-test-{}-{:?}.json", std::process::id(), std::thread::current().id()));
    let mut file = std::fs::File::create(&path).expect("create temp bundle file");
    file.write_all(text.as_bytes()).expect("write temp bundle file");
    path
}

fn simple_contract_with_setter() -> SourceUnit {
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

/// A state variable of an address type mutated via `ExprKind::Unary { op: Not, .. }`
/// is exactly the kind of address-domain `Mutate` violation spec.md §7 says must
/// produce a non-zero exit and a `<kind>: <detail>` stderr line.
fn contract_with_address_violation() -> SourceUnit {
    let contract_id = id(1);
    let owner_id = id(10);
    let func_id = id(30);

    let mutate = expr(
        None,
        ExprKind::Unary { op: solace_ast::UnOp::Not, expr: Box::new(ident_expr("owner", owner_id, TypeName::ADDRESS)) },
    );
    let body = block(vec![stmt(StmtKind::Expr(mutate))]);

    let touch = function(
        func_id,
        contract_id,
        "touch",
        FunctionKind::Function,
        vec![],
        vec![],
        Visibility::External,
        StateMutability::NonPayable,
        Some(body),
    );

    SourceUnit {
        items: vec![contract(
            contract_id,
            "Broken",
            ContractKind::Contract,
            vec![],
            vec![contract_id],
            vec![state_var(owner_id, "owner", TypeName::ADDRESS, Visibility::Public), touch],
        )],
    }
}

#[test]
fn translate_succeeds_and_emits_c_to_stdout() {
    let bundle = write_bundle(&[simple_contract_with_setter()]);

    let output = Command::new(env!("CARGO_BIN_EXE_solace"))
        .args(["translate", bundle.to_str().unwrap(), "--model", "Simple"])
        .output()
        .expect("run solace translate");

    let _ = std::fs::remove_file(&bundle);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("struct Simple"), "{stdout}");
    assert!(stdout.contains("#include \"verify.h\""), "{stdout}");
}

#[test]
fn check_reports_success_without_emitting_c() {
    let bundle = write_bundle(&[simple_contract_with_setter()]);

    let output = Command::new(env!("CARGO_BIN_EXE_solace"))
        .args(["check", bundle.to_str().unwrap(), "--model", "Simple"])
        .output()
        .expect("run solace check");

    let _ = std::fs::remove_file(&bundle);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).trim().is_empty(), "check should not emit C");
}

#[test]
fn analysis_violation_exits_non_zero_and_reports_to_stderr() {
    let bundle = write_bundle(&[contract_with_address_violation()]);

    let output = Command::new(env!("CARGO_BIN_EXE_solace"))
        .args(["check", bundle.to_str().unwrap(), "--model", "Broken"])
        .output()
        .expect("run solace check");

    let _ = std::fs::remove_file(&bundle);

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).trim().is_empty());
}

#[test]
fn unknown_model_root_is_a_usage_error_not_a_panic() {
    let bundle = write_bundle(&[simple_contract_with_setter()]);

    let output = Command::new(env!("CARGO_BIN_EXE_solace"))
        .args(["check", bundle.to_str().unwrap(), "--model", "DoesNotExist"])
        .output()
        .expect("run solace check");

    let _ = std::fs::remove_file(&bundle);

    assert!(!output.status.success());
}

#[test]
fn config_override_flag_is_accepted() {
    let bundle = write_bundle(&[simple_contract_with_setter()]);

    let output = Command::new(env!("CARGO_BIN_EXE_solace"))
        .args(["translate", bundle.to_str().unwrap(), "--model", "Simple", "--map-depth", "4"])
        .output()
        .expect("run solace translate with --map-depth");

    let _ = std::fs::remove_file(&bundle);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}
