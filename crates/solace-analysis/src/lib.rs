//! The analysis stack (spec.md §2 items 1-8): flattens inheritance, resolves dynamic
//! dispatch, bounds the address space, and catalogs maps/structs/allocations ahead of
//! code generation. Each module here is one analysis pass; passes are read-only once
//! built, matching this workspace's "no concurrency, borrow everything from the AST
//! arena" design (spec.md §5, §9).

pub mod address_domain;
pub mod alloc_graph;
pub mod call_graph;
pub mod call_state;
pub mod config;
pub mod error;
pub mod flat_model;
pub mod map_db;
pub mod rv_resolver;
pub mod type_analyzer;

pub use address_domain::{AddressDomain, PtgBuilder};
pub use alloc_graph::{AllocationGraph, ChildAlloc};
pub use call_graph::{CallGraph, CallKind, CallVertex};
pub use call_state::{CallEdgeKind, CallStateEdge, CallStateKind, CALL_STATE_PARAMS};
pub use config::Config;
pub use error::{AddressViolation, AddressViolationKind, AnalysisError, Diagnostics};
pub use flat_model::{FlatContract, FlatModel};
pub use map_db::{MapDatabase, MapRecord};
pub use rv_resolver::ContractRvResolver;
pub use type_analyzer::{escape, elementary_c_type, enum_c_type, CType, TypeAnalyzer, TypeTable};

use solace_ast::{NodeId, Program};

/// Runs the full analysis stack over `program` for the given model-set `roots` and
/// `config`, per the driver's pass ordering (spec.md §4.13 steps 1-6). Returns the
/// aggregated pass outputs plus any collected diagnostics; the driver decides whether
/// a non-empty `Diagnostics` is fatal.
pub struct AnalysisOutputs<'a, 'p> {
    pub allocs: AllocationGraph,
    pub model: FlatModel<'p>,
    pub rv: ContractRvResolver<'a, 'p>,
    pub call_graph: CallGraph,
    pub map_db: MapDatabase,
    pub address_domain: AddressDomain,
    pub types: TypeTable,
}

pub fn analyze<'a, 'p>(
    program: &'a Program<'p>,
    roots: &[NodeId],
    config: &Config,
    diags: &mut Diagnostics,
) -> AnalysisOutputs<'a, 'p> {
    let allocs = AllocationGraph::build(program, diags);
    for contract in program.registry.contracts() {
        if let Err(e) = allocs.cost(contract.id) {
            diags.push(e);
        }
    }
    tracing::info!(contracts = program.registry.contracts().count(), "allocation graph built");

    let model = FlatModel::build(program, roots, &allocs);
    tracing::info!(flats = model.view().count(), "flat model built");

    let rv = ContractRvResolver::new(program, &allocs);
    let call_graph = CallGraph::build(program, &model, &rv, diags);
    tracing::info!(vertices = call_graph.vertices().count(), "call graph built");

    let mut map_db = MapDatabase::new();
    let types = {
        let mut analyzer = TypeAnalyzer::new(program, &model, &mut map_db);
        analyzer.analyze(&call_graph)
    };
    tracing::info!(maps = map_db.records().len(), "type table and map database built");

    let address_domain = PtgBuilder::new(program, &model, config).build(&call_graph, diags);
    tracing::info!(size = address_domain.size(), "address domain built");

    AnalysisOutputs { allocs, model, rv, call_graph, map_db, address_domain, types }
}
