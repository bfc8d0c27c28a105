#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod logging;

use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use shimres_core::ResolveOptions;

#[derive(Parser, Debug)]
#[command(name = "shimres")]
#[command(author, version, about = "Browser-field aware module resolution", long_about = None)]
struct Cli {
    /// Module specifier to resolve
    specifier: String,

    /// Absolute path of the requesting file
    #[arg(long, value_name = "FILE")]
    from: PathBuf,

    /// File extension to probe, in order (defaults to .js, .json)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Extra search root, appended after the ancestor walk
    #[arg(long = "path", value_name = "DIR")]
    paths: Vec<PathBuf>,

    /// Explicit identifier override, checked after manifest shims
    #[arg(long = "module", value_name = "NAME=PATH", value_parser = parse_module_override)]
    modules: Vec<(String, PathBuf)>,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Stable JSON output shape for `--json`.
#[derive(Serialize)]
struct Output {
    resolved: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<String>,
}

fn parse_module_override(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("empty module name in '{raw}'"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let options = ResolveOptions {
        filename: cli.from.clone(),
        paths: cli.paths.clone(),
        modules: cli.modules.iter().cloned().collect(),
        extensions: cli.extensions.clone(),
        package: None,
        package_filter: None,
    };

    tracing::debug!(specifier = %cli.specifier, from = %cli.from.display(), "resolving");

    let resolved = shimres_core::resolve(&cli.specifier, &options)
        .await
        .into_diagnostic()?;

    tracing::debug!(path = %resolved.path.display(), "resolved");

    if cli.json {
        let output = Output {
            resolved: resolved.path.display().to_string(),
            package: resolved
                .package
                .as_ref()
                .and_then(|p| p.name())
                .map(str::to_string),
        };
        println!("{}", serde_json::to_string(&output).into_diagnostic()?);
    } else {
        println!("{}", resolved.path.display());
    }

    Ok(())
}
