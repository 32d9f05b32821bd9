//! topfive - Command-line entry point
//!
//! Commands:
//! - `analyze` - Read recent activity, print and save a draft
//! - `login`   - Store a Graph access token in the OS keychain
//! - `logout`  - Remove a stored Graph access token
//! - `config`  - Show or initialize the settings file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};

use topfive::config::Settings;
use topfive::providers::source::{
    FallbackSource, GraphSource, JsonFileSource, OutlookLocalSource, RecordSource,
};
use topfive::providers::tagger::{self, Tagger};
use topfive::services::{DigestService, DraftRenderer};
use topfive::storage::{DraftStore, KeychainAccess, KeychainError};

#[derive(Parser)]
#[command(
    name = "topfive",
    about = "Drafts a top-accounts status update from recent calendar events and sent mail",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze recent activity and produce a draft
    Analyze {
        /// Where to read records from
        #[arg(long, value_enum, default_value_t = SourceKind::Auto)]
        source: SourceKind,

        /// Calendar export for `--source json`
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Sent mail export for `--source json`
        #[arg(long)]
        mail: Option<PathBuf>,

        /// Days of history to analyze
        #[arg(long)]
        days: Option<u32>,

        /// Number of items to keep
        #[arg(long)]
        top: Option<usize>,

        /// Directory to save the draft in
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the analysis as JSON instead of the draft
        #[arg(long)]
        json: bool,

        /// Graph access token (falls back to the keychain)
        #[arg(long, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Keychain profile for the stored token
        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// Store a Graph access token in the OS keychain
    Login {
        #[arg(long)]
        token: String,

        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// Remove a stored Graph access token
    Logout {
        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// Print the effective settings
    Config {
        /// Write the settings file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Local Outlook database, then Graph
    Auto,
    Graph,
    Outlook,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };

    match cli.command {
        Commands::Analyze {
            source,
            calendar,
            mail,
            days,
            top,
            output_dir,
            json,
            token,
            profile,
        } => {
            let mut settings = Settings::load(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;
            if let Some(days) = days {
                settings.sources.days_back = days;
            }
            if let Some(top) = top {
                settings.analysis.top_n = top;
            }
            if let Some(dir) = output_dir {
                settings.draft.output_dir = dir;
            }

            let records = match source {
                SourceKind::Json => json_source(calendar, mail)?,
                kind => {
                    let token = resolve_token(token, &profile).await;
                    live_source(kind, token, &settings)?
                }
            };
            analyze(records, settings, json).await
        }
        Commands::Login { token, profile } => {
            KeychainAccess::new()
                .store_token(&profile, &token)
                .await
                .context("storing token in the keychain")?;
            println!("Token stored for profile '{}'", profile);
            Ok(())
        }
        Commands::Logout { profile } => {
            match KeychainAccess::new().delete_token(&profile).await {
                Ok(()) => println!("Token removed for profile '{}'", profile),
                Err(KeychainError::NotFound(_)) => {
                    println!("No token stored for profile '{}'", profile)
                }
                Err(e) => return Err(e).context("removing token from the keychain"),
            }
            Ok(())
        }
        Commands::Config { init } => {
            let settings = Settings::load(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;
            if init && !config_path.exists() {
                settings
                    .save(&config_path)
                    .with_context(|| format!("writing {}", config_path.display()))?;
                println!("Wrote {}", config_path.display());
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

async fn analyze(
    source: Arc<dyn RecordSource>,
    settings: Settings,
    json: bool,
) -> anyhow::Result<()> {
    let tagger: Arc<dyn Tagger> =
        Arc::new(tagger::from_settings(&settings.tagger).context("building tagger")?);
    let store = DraftStore::new(settings.draft.output_dir.clone());

    let digest = DigestService::new(source, tagger, settings)?
        .run()
        .await
        .context("analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&digest.analysis)?);
    } else {
        println!("{}", DraftRenderer::format_for_display(&digest.draft));
    }

    let path = store.save(&digest.draft).await?;
    eprintln!("Draft saved to {}", path.display());
    Ok(())
}

fn json_source(
    calendar: Option<PathBuf>,
    mail: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn RecordSource>> {
    if calendar.is_none() && mail.is_none() {
        bail!("--source json needs --calendar and/or --mail");
    }
    Ok(Arc::new(JsonFileSource::new(calendar, mail)))
}

fn live_source(
    kind: SourceKind,
    token: Option<String>,
    settings: &Settings,
) -> anyhow::Result<Arc<dyn RecordSource>> {
    let graph = token.map(|token| -> Arc<dyn RecordSource> {
        Arc::new(
            GraphSource::new(&settings.sources.graph_base_url, token)
                .with_page_size(settings.sources.page_size),
        )
    });
    let outlook = || -> anyhow::Result<Arc<dyn RecordSource>> {
        Ok(Arc::new(OutlookLocalSource::for_profile(
            &settings.sources.outlook_profile,
        )?))
    };

    match kind {
        SourceKind::Graph => graph.context("no Graph token; pass --token or run `topfive login`"),
        SourceKind::Outlook => outlook(),
        SourceKind::Auto | SourceKind::Json => match (outlook(), graph) {
            (Ok(local), Some(graph)) => Ok(Arc::new(FallbackSource::new(local, graph))),
            (Ok(local), None) => Ok(local),
            (Err(e), Some(graph)) => {
                tracing::info!(error = %e, "local Outlook data unavailable, using Graph");
                Ok(graph)
            }
            (Err(e), None) => Err(e.context("no local Outlook data and no Graph token")),
        },
    }
}

/// Uses the explicit token when given, otherwise the keychain entry.
async fn resolve_token(token: Option<String>, profile: &str) -> Option<String> {
    if token.is_some() {
        return token;
    }
    KeychainAccess::new()
        .token(profile)
        .await
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "keychain unavailable");
            None
        })
}
