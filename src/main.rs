//! Sitetree - content tree and slug router CLI.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use sitetree::Structure;
use sitetree::config::StructureConfig;
use sitetree::core::LocaleProvider;
use sitetree::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let config = StructureConfig::load(&cli.config, &cwd, cli.store.as_ref())?;
    let structure = Structure::open(&config)
        .with_context(|| format!("failed to open {}", config.store.path.display()))?;
    let locale = structure.locales().resolve(cli.locale.as_deref());

    match &cli.command {
        Commands::Route { path, query } => cli::lookup::run_route(&structure, path, query),
        Commands::Link {
            presenter,
            action,
            params,
        } => cli::lookup::run_link(
            &structure,
            presenter,
            action,
            params,
            cli.locale.as_deref(),
        ),
        Commands::Tree { json } => cli::tree::run_tree(&structure, &locale, *json),
        Commands::Recover => cli::repair::run_recover(&structure),
        Commands::Fix => cli::repair::run_fix(&structure),
        Commands::Sitemap { output } => cli::sitemap::run_sitemap(
            &structure,
            &locale,
            config.router.base_url().as_deref(),
            output.as_deref(),
        ),
    }
}
