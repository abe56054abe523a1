//! Command-line access to configuration properties.
//!
//! ```text
//! hier-config get -p mail.admin
//! hier-config get -m authentication-orcid -p can-self-register
//! hier-config subset hier.key1
//! hier-config watch
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use hier_config::lifecycle::signals::wait_for_shutdown_signal;
use hier_config::observability::logging::init_logging;
use hier_config::settings::loader::load_settings;
use hier_config::{ConfigEvent, ConfigurationService, ServiceSettings};

#[derive(Parser)]
#[command(name = "hier-config")]
#[command(about = "Inspect hierarchical configuration properties", long_about = None)]
struct Cli {
    /// Configuration home (defaults to $DSPACE_HOME, then the built-in default)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Service settings file (TOML)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one property value (empty line when absent)
    Get {
        /// Property name, relative to --module when given
        #[arg(short, long)]
        property: String,

        /// Module namespace the property belongs to
        #[arg(short, long)]
        module: Option<String>,

        /// Do not substitute ${...} references
        #[arg(short, long)]
        raw: bool,
    },
    /// List property names
    Keys {
        #[arg(short, long)]
        module: Option<String>,
    },
    /// List the next key segments under a prefix
    Children { prefix: String },
    /// Print every property under a prefix as JSON
    Subset { prefix: String },
    /// Keep the configuration live and print changes until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&format!("hier_config={}", cli.log_level));

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => ServiceSettings::default(),
    };
    if !matches!(cli.command, Commands::Watch) {
        settings.reload.enabled = false;
    }

    let mut builder = ConfigurationService::builder().settings(settings);
    if let Some(home) = &cli.home {
        builder = builder.home(home);
    }
    let config = builder.build()?;

    match cli.command {
        Commands::Get {
            property,
            module,
            raw,
        } => {
            let name = match &module {
                Some(module) => format!("{}.{}", module, property),
                None => property,
            };
            let value = if raw {
                config.get_raw(&name).map(|entry| entry.to_string())
            } else {
                config.get(&name)?
            };
            println!("{}", value.unwrap_or_default());
        }
        Commands::Keys { module } => {
            for key in config.property_keys(module.as_deref()) {
                println!("{}", key);
            }
        }
        Commands::Children { prefix } => {
            for child in config.children(&prefix) {
                println!("{}", child);
            }
        }
        Commands::Subset { prefix } => {
            let map: Map<String, Value> = config
                .subset(&prefix)?
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        Commands::Watch => watch(config).await,
    }

    Ok(())
}

async fn watch(config: ConfigurationService) {
    let mut events = config.subscribe();

    eprintln!(
        "Watching {} ({} properties). Press Ctrl-C to stop.",
        config
            .home()
            .map(|home| home.display().to_string())
            .unwrap_or_default(),
        config.len()
    );

    let printer = async {
        loop {
            match events.recv().await {
                Ok(ConfigEvent::Reloaded { trigger, diff }) => {
                    println!("reloaded ({})", trigger.as_str());
                    for key in &diff.added {
                        println!("  + {}", key);
                    }
                    for key in &diff.removed {
                        println!("  - {}", key);
                    }
                    for key in &diff.changed {
                        println!("  ~ {}", key);
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    eprintln!("missed {} events", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    tokio::select! {
        _ = printer => {}
        _ = wait_for_shutdown_signal() => {}
    }

    config.shutdown().await;
}
