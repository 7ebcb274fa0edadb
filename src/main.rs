//! # Patch Radar CLI (`pradar`)
//!
//! The `pradar` binary serves duplicate-patch predictions over HTTP and
//! answers one-off prediction queries from the command line.
//!
//! ## Usage
//!
//! ```bash
//! pradar --config ./config/radar.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pradar projects` | List loaded projects with corpus and model summaries |
//! | `pradar predict <project> <patch_id>` | Rank duplicate candidates for one patch |
//! | `pradar serve` | Start the prediction HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect what was loaded from the configured datasets
//! pradar --config ./config/radar.toml projects
//!
//! # Top 5 duplicate candidates within ±14 days (the defaults)
//! pradar --config ./config/radar.toml predict openstack 812345
//!
//! # Wider window, more results, raw JSON
//! pradar --config ./config/radar.toml predict openstack 812345 \
//!     --time-window 30 --top-k 10 --json
//!
//! # Serve predictions on [server].bind
//! pradar --config ./config/radar.toml serve
//! ```

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patch_radar::{config, predict, registry::Registry, server};

/// Patch Radar — duplicate patch recommendation for code-review histories.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file listing the projects to load. See `config/radar.example.toml`.
#[derive(Parser)]
#[command(
    name = "pradar",
    about = "Patch Radar — duplicate patch recommendation for code-review histories",
    version,
    long_about = "Patch Radar recommends the top-K most likely duplicate patches for a \
    reference code-review patch, scoring time-window candidates with text-embedding \
    similarity, file-path structure statistics, and a pre-trained per-project classifier."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/radar.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List loaded projects.
    ///
    /// Shows each project's corpus size, dropped-record count, and the
    /// number of features its classifier expects. Useful for verifying
    /// dataset and model paths before serving.
    Projects,

    /// Rank duplicate candidates for one reference patch.
    ///
    /// Resolves the patch against the local dataset first, then the
    /// project's review server, and prints the top-K scored candidates.
    Predict {
        /// Project key (case-insensitive).
        project: String,

        /// Reference patch id.
        patch_id: String,

        /// Half-window in days around the reference patch's submission time.
        #[arg(long)]
        time_window: Option<i64>,

        /// Number of candidates to return.
        #[arg(long)]
        top_k: Option<usize>,

        /// Print raw JSON instead of the human-readable listing.
        #[arg(long)]
        json: bool,
    },

    /// Start the prediction HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves
    /// `POST /predict_topk` and `GET /health`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patch_radar=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let registry = Registry::load(&cfg)?;

    match cli.command {
        Commands::Projects => {
            if registry.is_empty() {
                println!("No projects loaded.");
                return Ok(());
            }
            for key in registry.keys() {
                let project = registry.get(key).expect("listed key");
                println!(
                    "{} — {} patches ({} dropped), {}-feature model, review fallback: {}",
                    key,
                    project.corpus.len(),
                    project.corpus.dropped(),
                    project.model.n_features(),
                    project.review_url.as_deref().unwrap_or("none"),
                );
            }
        }
        Commands::Predict {
            project,
            patch_id,
            time_window,
            top_k,
            json,
        } => {
            let window_days = time_window.unwrap_or(cfg.retrieval.window_days);
            if window_days < 0 {
                bail!("--time-window must be >= 0");
            }
            let top_k = top_k.unwrap_or(cfg.retrieval.top_k);

            let results = predict::run_predict(
                &registry,
                &cfg.embedding,
                &project,
                patch_id.trim(),
                top_k,
                window_days,
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No candidates in window.");
            } else {
                for (i, entry) in results.iter().enumerate() {
                    let title = if entry.title.is_empty() {
                        "(untitled)"
                    } else {
                        entry.title.as_str()
                    };
                    println!("{}. [{:.3}] {} — {}", i + 1, entry.score, entry.patch_id, title);
                    println!("    created: {}", entry.created_time);
                }
            }
        }
        Commands::Serve => {
            server::run_server(cfg, registry).await?;
        }
    }

    Ok(())
}
