//! lookout: watch website visitors live and invite them into a call.
//!
//! Connects to the presence server, keeps the visitor list in sync, and
//! prints it whenever it changes.

mod render;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lookout_common::{LookoutError, Result};
use lookout_config::LookoutConfig;
use lookout_presence::PresenceSyncClient;

use crate::settings::Overrides;

#[derive(Parser)]
#[command(name = "lookout", about = "Real-time website visitor presence")]
struct Args {
    /// Config file to use instead of the platform default.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Presence server host, with optional port.
    #[arg(long, global = true)]
    server: Option<String>,

    /// API key for the presence server.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Use ws:// and http:// instead of wss:// and https://.
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect and print the visitor list whenever it changes.
    Watch,
    /// Ask the server to invite a visitor into a video call.
    Invite { visitor_id: String, guest_url: String },
    /// Print the effective configuration as JSON.
    Config,
    /// Write a config file. With --server, --api-key or --insecure the
    /// values are saved into it; otherwise the commented template is written.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Command::InitConfig { force } = args.command {
        init_logging(None);
        let overrides = overrides(&args);
        return report(init_config(args.config, force, overrides));
    }

    let config = match effective_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lookout: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(Some(&config));

    let result = match args.command {
        Command::Watch => watch(&config).await,
        Command::Invite {
            visitor_id,
            guest_url,
        } => invite(&config, &visitor_id, &guest_url).await,
        Command::Config => {
            println!("{}", lookout_config::config_to_json(&config));
            Ok(())
        }
        Command::InitConfig { .. } => Ok(()),
    };
    report(result)
}

/// `RUST_LOG` wins; otherwise the configured level applies to our crates.
fn init_logging(config: Option<&LookoutConfig>) {
    let level = config
        .map(|c| c.logging.level.as_directive())
        .unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("lookout={level},lookout_presence={level},lookout_config={level}").into()
        }))
        .with_writer(std::io::stderr)
        .init();
}

fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("lookout: {e}");
            ExitCode::FAILURE
        }
    }
}

fn overrides(args: &Args) -> Overrides {
    Overrides {
        server: args.server.clone(),
        api_key: args.api_key.clone(),
        insecure: args.insecure,
    }
}

fn effective_config(args: &Args) -> Result<LookoutConfig> {
    let mut config = settings::load(args.config.as_deref())?;
    settings::apply_overrides(&mut config, overrides(args));
    lookout_config::validation::validate(&config)?;
    Ok(config)
}

fn init_config(path: Option<PathBuf>, force: bool, overrides: Overrides) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => lookout_config::default_config_path()?,
    };
    if path.exists() && !force {
        return Err(LookoutError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if overrides.is_empty() {
        lookout_config::create_default_config(&path)?;
    } else {
        let mut config = LookoutConfig::default();
        settings::apply_overrides(&mut config, overrides);
        lookout_config::save_config_to_path(&config, &path)?;
    }
    println!("Wrote {}", path.display());
    Ok(())
}

fn client(config: &LookoutConfig) -> Result<PresenceSyncClient> {
    let client = PresenceSyncClient::new(settings::presence_config(config))?;
    Ok(client)
}

async fn watch(config: &LookoutConfig) -> Result<()> {
    let client = client(config)?;
    let mut status = client.watch_status();
    let mut visitors = client.watch_visitors();

    client.open();
    tracing::info!(server = %config.presence.server, "Watching visitors (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                println!("{}", render::status_line(current));
            }
            changed = visitors.changed() => {
                if changed.is_err() {
                    break;
                }
                let list = visitors.borrow_and_update().clone();
                println!("{} visitor(s)", list.len());
                println!("{}", render::visitor_table(&list));
            }
        }
    }

    client.teardown().await;
    Ok(())
}

async fn invite(config: &LookoutConfig, visitor_id: &str, guest_url: &str) -> Result<()> {
    if visitor_id.trim().is_empty() || guest_url.trim().is_empty() {
        return Err(LookoutError::Invite(
            "visitor id and guest url must not be empty".into(),
        ));
    }

    let client = client(config)?;
    client
        .send_invite(visitor_id, guest_url)
        .await
        .map_err(|e| LookoutError::Invite(e.to_string()))?;
    println!("Invite sent to {visitor_id}");
    Ok(())
}
