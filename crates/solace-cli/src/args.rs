//! Argument parsing (SPEC_FULL.md AMBIENT STACK): a single `clap::Parser` root with
//! `#[command(subcommand)]` variants, mirroring forge's own bin shape.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "solace", version, about = "Solidity-to-C model translator")]
pub struct Cli {
    /// Increase log verbosity; repeatable (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline and emit a C99 translation unit.
    Translate(RunArgs),
    /// Run analysis only; report violations without emitting C (spec.md §4.13 step 6).
    Check(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to a JSON-encoded AST bundle (a serialized `Vec<solace_ast::SourceUnit>`).
    pub ast: PathBuf,

    /// Contract names forming the model set's roots (spec.md §6).
    #[arg(long = "model", required = true, num_args = 1..)]
    pub model: Vec<String>,

    /// Optional TOML config file, merged under any of the flags below.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output path for the emitted C (`translate` only); defaults to stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// `k`: distinct keys tracked per map instance.
    #[arg(long)]
    pub map_depth: Option<u32>,
    /// Number of persistent (non-contract) user addresses modeled.
    #[arg(long)]
    pub persistent_users: Option<u32>,
    /// Elide roles/clients from the address domain.
    #[arg(long)]
    pub concrete_users: bool,
    /// Model contract instances outside the allocation closure too.
    #[arg(long)]
    pub global_contracts: bool,
    /// Lower `require` to `sol_assert` instead of `sol_require`.
    #[arg(long)]
    pub escalate_requires: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: solace_analysis::Config) -> solace_analysis::Config {
        if let Some(v) = self.map_depth {
            config.map_depth = v;
        }
        if let Some(v) = self.persistent_users {
            config.persistent_users = v;
        }
        config.use_concrete_users |= self.concrete_users;
        config.use_global_contracts |= self.global_contracts;
        config.escalate_requires |= self.escalate_requires;
        config
    }
}
