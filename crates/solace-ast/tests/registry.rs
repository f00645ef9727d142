use solace_ast::builder::*;
use solace_ast::{ContractKind, SourceUnit, Visibility};

#[test]
fn registry_indexes_contract_and_members() {
    let a_id = id(1);
    let var_id = id(2);
    let unit = SourceUnit {
        items: vec![contract(
            a_id,
            "A",
            ContractKind::Contract,
            vec![],
            vec![a_id],
            vec![state_var(var_id, "owner", solace_ast::TypeName::ADDRESS, Visibility::Public)],
        )],
    };
    let units = vec![unit];
    let program = solace_ast::Program::new(&units);

    let a = program.registry.contract_by_name("A").expect("contract A indexed");
    assert_eq!(a.name.as_str(), "A");
    assert_eq!(a.linearization, vec![a_id]);

    let var = program.registry.state_var(var_id).expect("state var indexed");
    assert_eq!(var.var.name.as_ref().unwrap().as_str(), "owner");
}

#[test]
fn flatten_mapping_collects_nested_keys() {
    use solace_ast::ty::ElementaryType;
    use solace_ast::TypeName;

    let ty = TypeName::Mapping {
        key: Box::new(TypeName::ADDRESS),
        value: Box::new(TypeName::Mapping {
            key: Box::new(TypeName::Elementary(ElementaryType::Uint(256))),
            value: Box::new(TypeName::Elementary(ElementaryType::Bool)),
        }),
    };
    let (keys, value) = ty.flatten_mapping().expect("mapping flattens");
    assert_eq!(keys.len(), 2);
    assert!(keys[0].is_address());
    assert_eq!(*value, TypeName::Elementary(ElementaryType::Bool));
}
