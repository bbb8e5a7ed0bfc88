// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, Level};

use genre_composer::config::{AppConfig, CatalogWatcher};
use genre_composer::genres::{CatalogHandle, GenreRegistry};
use genre_composer::server::{self, routes, AppState};

fn print_usage() {
    println!("composer - Genre-based MIDI composition");
    println!();
    println!("Usage: composer [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  serve [--bind ADDR]                     Run the HTTP API");
    println!("  generate <GENRE> [--bars N] [--seed N] [--neural]");
    println!("                                          Write a MIDI file to the output directory");
    println!("  train [DIR] [--epochs N] [--model NAME] Train a model on a MIDI corpus");
    println!("  genres [QUERY]                          List genres by category, or search");
    println!("  info <GENRE>                            Show a genre profile");
    println!("  models                                  List stored model checkpoints");
    println!();
    println!("Options:");
    println!("  --config <FILE>   YAML or TOML configuration file");
    println!("  --verbose, -v     Debug logging");
    println!("  --help, -h        Show this help message");
}

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Cli {
    config: Option<PathBuf>,
    verbose: bool,
    command: Option<String>,
    positional: Vec<String>,
    bind: Option<String>,
    bars: Option<i64>,
    seed: Option<u64>,
    neural: bool,
    epochs: Option<i64>,
    model: Option<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", arg))
        };
        match arg.as_str() {
            "--config" | "-c" => cli.config = Some(PathBuf::from(value()?)),
            "--verbose" | "-v" => cli.verbose = true,
            "--help" | "-h" => cli.help = true,
            "--bind" => cli.bind = Some(value()?),
            "--bars" => {
                let raw = value()?;
                cli.bars = Some(raw.parse().map_err(|_| anyhow!("Invalid bar count: {}", raw))?);
            }
            "--seed" => {
                let raw = value()?;
                cli.seed = Some(raw.parse().map_err(|_| anyhow!("Invalid seed: {}", raw))?);
            }
            "--epochs" => {
                let raw = value()?;
                cli.epochs = Some(raw.parse().map_err(|_| anyhow!("Invalid epoch count: {}", raw))?);
            }
            "--model" => cli.model = Some(value()?),
            "--neural" => cli.neural = true,
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("Unknown option: {}", flag),
            _ if cli.command.is_none() => cli.command = Some(arg.clone()),
            _ => cli.positional.push(arg.clone()),
        }
    }
    Ok(cli)
}

fn init_logging(config: &AppConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse::<Level>()
            .map_err(|_| anyhow!("Invalid logging.level: {}", config.logging.level))?
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<CatalogHandle> {
    let registry = match &config.paths.catalog {
        Some(path) => GenreRegistry::load(path).with_context(|| format!("Failed to load genre catalog {:?}", path))?,
        None => GenreRegistry::builtin(),
    };
    Ok(CatalogHandle::new(registry))
}

fn serve(config: &AppConfig, cli: &Cli) -> Result<()> {
    let catalog = load_catalog(config)?;
    let _watcher = match (&config.paths.catalog, config.paths.watch_catalog) {
        (Some(path), true) => Some(CatalogWatcher::new(path, catalog.clone(), None)?),
        _ => None,
    };
    let state = Arc::new(AppState::from_config(config, catalog));
    let addr = cli.bind.clone().unwrap_or_else(|| config.server.bind.clone());

    let http = Arc::new(server::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime
        .block_on(server::serve(http, state))
        .context("Server stopped")
}

fn generate(config: &AppConfig, cli: &Cli) -> Result<()> {
    let genre = cli
        .positional
        .first()
        .ok_or_else(|| anyhow!("generate requires a genre id (see `composer genres`)"))?;
    let state = AppState::from_config(config, load_catalog(config)?);
    let result = state.orchestrator.generate(
        genre,
        cli.bars.unwrap_or(config.generation.default_bars),
        cli.seed,
        cli.neural,
    )?;
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "{} ({} BPM, seed {}, {} notes)",
        result.path.display(),
        result.tempo,
        result.seed,
        result.composition.note_count()
    );
    Ok(())
}

fn train(config: &AppConfig, cli: &Cli) -> Result<()> {
    let directory = cli
        .positional
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.training.directory.clone());
    let model = cli.model.clone().unwrap_or_else(|| config.neural.model_name.clone());
    let state = AppState::from_config(config, load_catalog(config)?);

    info!(directory = %directory.display(), model = %model, "starting training");
    let outcome = state
        .pipeline
        .run_named(&directory, cli.epochs.unwrap_or(config.training.epochs), &model)?;
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "{} v{}: {} files, {} epochs, final loss {:.4}",
        outcome.model_name,
        outcome.version,
        outcome.files_used,
        outcome.result.epoch_losses.len(),
        outcome.result.final_loss
    );
    Ok(())
}

fn genres(config: &AppConfig, cli: &Cli) -> Result<()> {
    let registry = load_catalog(config)?.snapshot();
    match cli.positional.first() {
        Some(query) => {
            for id in registry.search(query) {
                println!("{}", id);
            }
        }
        None => {
            for (category, ids) in registry.categories() {
                println!("{}: {}", category, ids.join(", "));
            }
        }
    }
    Ok(())
}

fn show_info(config: &AppConfig, cli: &Cli) -> Result<()> {
    let id = cli
        .positional
        .first()
        .ok_or_else(|| anyhow!("info requires a genre id"))?;
    let registry = load_catalog(config)?.snapshot();
    let profile = registry.get(id)?;
    println!("{}", serde_json::to_string_pretty(&routes::genre_json(profile))?);
    Ok(())
}

fn models(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config, CatalogHandle::new(GenreRegistry::builtin()));
    let names = state.orchestrator.store().list()?;
    if names.is_empty() {
        println!("No models in {}", config.paths.models_dir.display());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let Some(command) = cli.command.clone() else {
        print_usage();
        return Ok(());
    };
    if cli.help {
        print_usage();
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config, cli.verbose)?;

    match command.as_str() {
        "serve" => serve(&config, &cli),
        "generate" => generate(&config, &cli),
        "train" => train(&config, &cli),
        "genres" => genres(&config, &cli),
        "info" => show_info(&config, &cli),
        "models" => models(&config),
        "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}
