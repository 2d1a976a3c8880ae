// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use cedarwasm::config::{load_and_validate_config, HostConfig};
use cedarwasm::report::{load_into, LoadReport};
use cedarwasm::wasm::{PolicyModule, PolicyModuleLoader};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cedarwasm [--config <host.yaml>] [--module <policies.wasm>] [--shared] [--json] <policy-file>...";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    module: Option<PathBuf>,
    shared: bool,
    json: bool,
    policy_files: Vec<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a file")?;
                cli.config = Some(PathBuf::from(value));
            }
            "--module" => {
                let value = iter.next().ok_or("--module requires a file")?;
                cli.module = Some(PathBuf::from(value));
            }
            "--shared" => cli.shared = true,
            "--json" => cli.json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            file => cli.policy_files.push(PathBuf::from(file)),
        }
    }

    if cli.policy_files.is_empty() {
        return Err("no policy files given".to_string());
    }
    Ok(cli)
}

fn init_tracing() {
    // stderr keeps stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", USAGE);
            eprintln!("Example: cedarwasm policies/alice.cedar policies/bob.cedar");
            eprintln!("Example: cedarwasm --shared --json empty.cedar empty.cedar");
            return ExitCode::from(2);
        }
    };

    init_tracing();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: CliArgs) -> anyhow::Result<bool> {
    let start_time = Instant::now();

    let config = match &cli.config {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HostConfig::default(),
    };
    let module_path = cli.module.clone().unwrap_or_else(|| config.module_path());
    let module = PolicyModuleLoader::load_module(&module_path, &config.wasm)
        .with_context(|| format!("loading policy module {}", module_path.display()))?;

    let mut sources = Vec::with_capacity(cli.policy_files.len());
    for path in &cli.policy_files {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading policy file {}", path.display()))?;
        sources.push((path.display().to_string(), bytes));
    }

    let reports = if cli.shared {
        let module = module.clone();
        tokio::task::spawn_blocking(move || load_shared(&module, &sources)).await?
    } else {
        load_isolated(&module, sources).await?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let marker = if report.succeeded() { "✅" } else { "❌" };
            println!("{} {}", marker, report);
        }
        println!("\n⏱️  Total Time: {:?}", start_time.elapsed());
    }

    Ok(reports.iter().all(LoadReport::succeeded))
}

/// Load every source, in order, into one instance.
fn load_shared(module: &PolicyModule, sources: &[(String, Vec<u8>)]) -> Vec<LoadReport> {
    let mut reports = Vec::with_capacity(sources.len());
    let mut instance = match module.instantiate() {
        Ok(instance) => instance,
        Err(e) => {
            if let Some((source, _)) = sources.first() {
                reports.push(LoadReport::fatal(source, &e));
            }
            return reports;
        }
    };

    for (source, bytes) in sources {
        let report = load_into(&mut instance, source, bytes);
        let fatal = report.fatal;
        reports.push(report);
        if fatal {
            // the instance is gone; later sources have nowhere to load
            break;
        }
    }
    reports
}

/// Load each source into its own fresh instance, in parallel.
async fn load_isolated(
    module: &PolicyModule,
    sources: Vec<(String, Vec<u8>)>,
) -> anyhow::Result<Vec<LoadReport>> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|(source, bytes)| {
            let module = module.clone();
            tokio::task::spawn_blocking(move || match module.instantiate() {
                Ok(mut instance) => load_into(&mut instance, &source, &bytes),
                Err(e) => LoadReport::fatal(&source, &e),
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await?);
    }
    Ok(reports)
}
