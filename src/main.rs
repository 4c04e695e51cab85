//! # Content Manifest CLI (`cmf`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cmf init` | Write a starter configuration file |
//! | `cmf build` | Build the manifest and write it to a file or stdout |
//! | `cmf check` | Report invalid documents and discarded duplicates |
//! | `cmf show <key>` | Print the canonical revision of one document |
//!
//! ## Examples
//!
//! ```bash
//! cmf build --root ./site --output ./site/_data/manifest.json
//! cmf build --lenient > manifest.json
//! cmf check --config ./config/cmf.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use content_manifest::config::{self, Config};
use content_manifest::ingest::{self, BuildArgs};
use content_manifest::progress::ProgressMode;
use content_manifest::{show, telemetry};

/// Content Manifest: validate Markdown front matter, collapse duplicate
/// revisions, and emit a manifest for a static-site renderer.
#[derive(Parser)]
#[command(name = "cmf", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cmf.toml`. When the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/cmf.toml")]
    config: PathBuf,

    /// Progress output on stderr: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal.
    #[arg(long, global = true)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file at `--config`.
    Init,

    /// Build the manifest.
    ///
    /// Reads every Markdown file under the content root, validates front
    /// matter, keeps one canonical revision per identity key, and writes
    /// the sorted manifest as JSON.
    Build {
        /// Content root. Overrides `[content].root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output file. Overrides `[manifest].output`; stdout when neither is set.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exclude invalid documents instead of failing, and list them
        /// under `diagnostics`.
        #[arg(long)]
        lenient: bool,

        /// Print counts without writing the manifest.
        #[arg(long)]
        dry_run: bool,
    },

    /// Report invalid documents and discarded duplicates.
    ///
    /// Exits non-zero when any document is invalid.
    Check {
        /// Content root. Overrides `[content].root`.
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the canonical revision of a document as front matter + body.
    Show {
        /// Identity key (file name without date prefix or extension).
        key: String,

        /// Content root. Overrides `[content].root`.
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn with_root(mut cfg: Config, root: Option<PathBuf>) -> Config {
    if let Some(root) = root {
        cfg.content.root = root;
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return config::scaffold_config(&cli.config);
    }

    let cfg = config::load_config_or_default(&cli.config)?;
    telemetry::init(&cfg.logging)?;

    let progress = Arc::from(
        cli.progress
            .unwrap_or_else(ProgressMode::default_for_tty)
            .reporter(),
    );

    match cli.command {
        Commands::Init => unreachable!("handled before config loading"),
        Commands::Build {
            root,
            output,
            lenient,
            dry_run,
        } => {
            let cfg = with_root(cfg, root);
            let args = BuildArgs {
                output,
                lenient,
                dry_run,
            };
            ingest::run_build(&cfg, &args, progress).await?;
        }
        Commands::Check { root } => {
            let cfg = with_root(cfg, root);
            if !ingest::run_check(&cfg, progress).await? {
                anyhow::bail!("content check failed");
            }
        }
        Commands::Show { key, root } => {
            let cfg = with_root(cfg, root);
            show::run_show(&cfg, &key, progress).await?;
        }
    }

    Ok(())
}
