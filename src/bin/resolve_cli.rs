//! Thin CLI front-end over the `depsolve` library: reads a TOML manifest of
//! available unit versions plus a request, resolves, and prints the result.
//!
//! Owns all I/O, argument framing, and `tracing-subscriber` initialization —
//! the library itself never does either.

mod manifest;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use depsolve::{ResolveOptions, UnitVersion};
use tracing_subscriber::EnvFilter;

/// Resolve a manifest's requested packages into a concrete version set.
#[derive(Parser)]
#[command(name = "resolve-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML manifest describing available packages and the request.
    manifest: PathBuf,

    /// Named cost function steering which candidate versions are preferred.
    #[arg(long, value_enum, default_value = "zero")]
    cost: CostStrategy,

    /// Stop after exact-constraint propagation; skip best-first search.
    #[arg(long)]
    propagation_only: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CostStrategy {
    /// Every assignment costs 0 — the solver's default.
    Zero,
    /// Penalize older versions, so search prefers the newest candidate it finds.
    PreferNewest,
}

fn build_options(strategy: CostStrategy, propagation_only: bool) -> ResolveOptions {
    let options = ResolveOptions::new().with_stop_after_first_propagation(propagation_only);
    match strategy {
        CostStrategy::Zero => options,
        CostStrategy::PreferNewest => options.with_cost_function(|choices: &[std::rc::Rc<UnitVersion>]| {
            choices
                .iter()
                .map(|uv| version_rank_penalty(uv.version()))
                .sum()
        }),
    }
}

fn version_rank_penalty(version: &semver::Version) -> f64 {
    let rank = version.major * 1_000_000 + version.minor * 1_000 + version.patch;
    (u64::MAX - rank) as f64
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let (mut resolver, request) = match manifest::load(&cli.manifest) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut constraints = Vec::new();
    for spec in &request.constraint_specs {
        match resolver.get_constraint_str(spec) {
            Ok(c) => constraints.push(c),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let names: Vec<&str> = request.names.iter().map(String::as_str).collect();
    let options = build_options(cli.cost, cli.propagation_only);

    match resolver.resolve(&names, &constraints, &[], &options) {
        Ok(chosen) => {
            for uv in chosen {
                println!("{uv}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
