//! The code generator half of the pipeline (spec.md §2 items 9-13): lowers a
//! [`solace_analysis::AnalysisOutputs`] flat model into a deterministic C99
//! [`cast::CTranslationUnit`]. Each module here is one stage of that lowering; this
//! crate's only public entry point, [`translate`], is the code-generation half of the
//! driver (spec.md §4.13) — the CLI crate wraps it with argument parsing and process
//! exit codes, and this function is also what this crate's own integration tests call
//! directly, mirroring how `forge-fmt`'s test harness calls its formatter library
//! function rather than shelling out to the `forge fmt` binary.

pub mod block_lower;
pub mod call_lower;
pub mod cast;
pub mod contract_gen;
pub mod error;
pub mod expr_lower;
pub mod function_converter;
pub mod map_gen;
pub mod naming;
pub mod scope;
pub mod struct_gen;
pub mod value_gen;

pub use cast::{CExpr, CFunction, CParam, CStmt, CStructDef, CTranslationUnit, CVarDecl};
pub use error::{CodegenError, CodegenResult};
pub use function_converter::{ContractFunctions, FunctionConverter};

use indexmap::IndexSet;
use solace_analysis::{AnalysisOutputs, Config};
use solace_ast::Program;

/// Bit-widths this translator's own wrapped-integer table ever produces (spec.md §4.7
/// elementary-type table): the regular 8-bit steps plus Solidity's irregular ABI
/// widths (`bytes3`, `bytes5`, ... give `sol_uint24_t`, `sol_uint40_t`, ...). Used only
/// to decide which `nd_<type>` externs a given bundle might call, not to re-derive the
/// wrapped-type table itself.
const WRAPPED_INT_WIDTHS: &[u32] = &[
    8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 96, 104, 112, 120, 128, 136, 144, 152, 160, 168, 176, 184, 192, 200,
    208, 216, 224, 232, 240, 248, 256,
];

/// Forward declarations for the subset of `libverify`'s entries this bundle's emitted
/// C actually calls (SPEC_FULL.md "`libverify` forward-declaration emission"): the
/// runtime itself is out of scope (spec.md §1), but the translation unit must still
/// declare the symbols it references so the output compiles against any conforming
/// implementation of that header. Declared `extern` since this crate emits no bodies
/// for them (spec.md §1, §6).
fn libverify_decls(unit: &CTranslationUnit, domain_literals: &[i128]) -> String {
    let mut out = String::new();
    out.push_str("extern void sol_assert(sol_bool_t cond, const char* msg);\n");
    out.push_str("extern void sol_require(sol_bool_t cond, const char* msg);\n");
    out.push_str("extern void sol_emit(const char* signature);\n");
    out.push_str("extern void sol_transfer(sol_uint256_t* balance, sol_address_t dst, sol_uint256_t amount);\n");
    out.push_str("extern sol_bool_t sol_send(sol_uint256_t* balance, sol_address_t dst, sol_uint256_t amount);\n");
    out.push_str("extern sol_uint256_t sol_crypto(const char* kind);\n");

    for width in referenced_widths(unit) {
        out.push_str(&format!("extern sol_int{width}_t nd_int{width}_t(const char* msg);\n"));
        out.push_str(&format!("extern sol_uint{width}_t nd_uint{width}_t(const char* msg);\n"));
    }
    out.push_str("extern sol_bool_t nd_bool_t(const char* msg);\n");
    out.push_str("extern sol_address_t nd_address_t(const char* msg);\n");
    out.push('\n');

    for n in domain_literals {
        out.push_str(&format!("extern sol_address_t {};\n", solace_analysis::AddressDomain::literal_symbol(*n)));
    }
    out.push('\n');
    out
}

/// Which wrapped-integer widths the emitted bodies actually reference, scanned from
/// their rendered text: scanning the already-assembled `CFunction`/`CStructDef` bodies
/// is simpler and just as accurate as threading a parallel "widths used" set through
/// every lowering call site, since the wrapped-type family name is textually stable
/// (`sol_uintNNN_t`/`sol_intNNN_t`) regardless of which stage produced it.
fn referenced_widths(unit: &CTranslationUnit) -> Vec<u32> {
    let mut rendered = String::new();
    for s in &unit.structs {
        s.print_definition(&mut rendered);
    }
    for f in unit.interface_fns.iter().chain(unit.internal_fns.iter()) {
        f.print_definition(&mut rendered);
    }

    let mut widths: IndexSet<u32> = IndexSet::new();
    for &w in WRAPPED_INT_WIDTHS {
        if rendered.contains(&format!("sol_uint{w}_t")) || rendered.contains(&format!("sol_int{w}_t")) {
            widths.insert(w);
        }
    }
    widths.sort_unstable();
    widths.into_iter().collect()
}

/// Runs the code-generation half of the driver (spec.md §4.13 steps 7-8) over an
/// already-built [`AnalysisOutputs`]: per flat contract, the contract's own struct
/// layout and every executable method/constructor; per distinct struct declaration,
/// its `ZeroInit_`/`Init_`/`ND_` trio; per map shape, its `ZeroInit_`/`Read_`/`Write_`/
/// `Set_` family. Assembly order here does not matter for correctness (`render()`
/// handles the two-wave forward-declare-then-define split itself, spec.md §8 testable
/// property: "every function ... exactly once as a forward declaration"); contract
/// order follows `model.view()`'s deterministic iteration, keeping the whole pipeline
/// reproducible end to end (spec.md §5, §8 testable property #2).
pub fn translate<'a, 'p>(
    program: &'a Program<'p>,
    analysis: &'a AnalysisOutputs<'a, 'p>,
    config: &'a Config,
) -> CodegenResult<CTranslationUnit> {
    let converter = FunctionConverter {
        program,
        model: &analysis.model,
        call_graph: &analysis.call_graph,
        types: &analysis.types,
        map_db: &analysis.map_db,
        address_domain: &analysis.address_domain,
        rv: &analysis.rv,
        config,
    };

    let mut unit = CTranslationUnit::default();

    for flat in analysis.model.view() {
        unit.structs.push(contract_gen::struct_def(flat, &analysis.types));
        for s in flat.structures() {
            let name = naming::struct_type_name(flat, s);
            unit.structs.push(struct_gen::struct_def(program, &analysis.types, &name, s));
            unit.internal_fns.extend(struct_gen::helper_functions(program, &analysis.types, &name, s));
        }
    }
    tracing::info!(structs = unit.structs.len(), "struct layouts emitted");

    for rec in analysis.map_db.records() {
        unit.structs.push(map_gen::struct_def(rec, config.map_depth));
        unit.internal_fns.extend(map_gen::helper_functions(rec, config.map_depth));
    }
    tracing::info!(maps = analysis.map_db.records().len(), "map helper families emitted");

    let mut built_super = IndexSet::new();
    for flat in analysis.model.view() {
        let funcs = converter.convert_contract(flat, &mut built_super)?;
        unit.interface_fns.extend(funcs.interface_fns);
        unit.internal_fns.extend(funcs.internal_fns);
    }
    tracing::info!(
        interface_fns = unit.interface_fns.len(),
        internal_fns = unit.internal_fns.len(),
        "function conversion complete"
    );

    Ok(unit)
}

/// Renders `unit` to the final C99 text, libverify forward declarations and address
/// literal globals prepended (spec.md §4.13 step 7, SPEC_FULL.md "`libverify` forward-
/// declaration emission").
pub fn render(unit: &CTranslationUnit, address_domain: &solace_analysis::AddressDomain) -> String {
    let mut out = String::new();
    out.push_str("/* Generated translation unit. Do not edit by hand. */\n");
    out.push_str("#include \"verify.h\"\n\n");
    out.push_str(&libverify_decls(unit, &address_domain.literals.iter().copied().collect::<Vec<_>>()));
    out.push_str(&unit.render_body());
    out
}
