//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use sitetree::core::params::parse_pair;

/// Content tree and slug router
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: structure.toml)
    #[arg(short = 'C', long, global = true, default_value = "structure.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Snapshot file, overrides `[store] path`
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Locale to work in (default: `[locale] default`)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve a request path to its node
    #[command(visible_alias = "r")]
    Route {
        /// Path as sent by the browser, e.g. `/cs/o-nas?page=2`
        path: String,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },

    /// Build the link for a presenter action
    #[command(visible_alias = "l")]
    Link {
        presenter: String,

        action: String,

        /// Link parameter (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },

    /// Print the content tree
    #[command(visible_alias = "t")]
    Tree {
        /// Print the front menu as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild nested-set bounds from parent links
    Recover,

    /// Report untranslated nodes and purge broken system nodes
    Fix,

    /// Write sitemap.xml
    Sitemap {
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}
