//! `solace`: the thin CLI wrapper around the translation pipeline's library entry
//! points (spec.md §4.13's driver is split, per SPEC_FULL.md, into
//! `solace_analysis::analyze` + `solace_codegen::translate`/`render` as a reusable
//! library, and this binary as the argument-parsing/exit-code glue around them).

mod args;
mod bundle;
mod config_file;
mod logging;

use args::{Cli, Command, RunArgs};
use clap::Parser;
use eyre::{Context, Result};
use solace_analysis::{analyze, Config, Diagnostics};
use solace_ast::Program;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let exit_code = match &cli.command {
        Command::Translate(args) => run(args, true)?,
        Command::Check(args) => run(args, false)?,
    };
    std::process::exit(exit_code);
}

/// Runs the pipeline for one invocation; `emit` distinguishes `translate` (emit C on
/// success) from `check` (analysis only, per spec.md §4.13 step 6). Returns the
/// process exit code spec.md §6 specifies: 0 on success, non-zero when any analysis
/// violation was collected.
fn run(args: &RunArgs, emit: bool) -> Result<i32> {
    let units = bundle::load_units(&args.ast)?;
    let program = Program::new(&units);
    let roots = bundle::resolve_roots(&program, &args.model)?;

    let mut config = Config::default();
    if let Some(path) = &args.config {
        config = config_file::PartialConfig::load(path)?.apply(config);
    }
    config = args.overrides.apply(config);

    let mut diags = Diagnostics::default();
    let analysis = analyze(&program, &roots, &config, &mut diags);

    if !diags.is_empty() {
        // spec.md §7: "a non-zero exit and a stderr message `<kind>: <detail>`" —
        // each collected `AnalysisError` already renders that shape via its own
        // `thiserror` `Display` impl.
        for err in diags.iter() {
            eprintln!("{err}");
        }
        return Ok(1);
    }

    if !emit {
        tracing::info!("check passed: no violations collected");
        return Ok(0);
    }

    let unit = solace_codegen::translate(&program, &analysis, &config).context("lowering flat model to C")?;
    let text = solace_codegen::render(&unit, &analysis.address_domain);

    match &args.out {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing output to {}", path.display()))?,
        None => print!("{text}"),
    }

    Ok(0)
}
