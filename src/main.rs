// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Picsort: Browser-Based Image Triage Tool
//!
//! Serves a local web UI for sorting a batch of uploaded images into five
//! fixed categories and downloading the result as a zip archive.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use picsort::config::AppConfig;
use picsort::{PicsortError, Result};

/// Picsort CLI - Browser-Based Image Triage Tool
#[derive(Parser, Debug)]
#[command(name = "picsort")]
#[command(version = "1.0.0")]
#[command(about = "Single-user browser-based image triage tool", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Open browser automatically
    #[arg(long)]
    open: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the sorting web server (default)
    Serve,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Picsort v1.0.0 - Image Triage Tool");
    }

    // Load configuration
    let mut config = AppConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    match cli.command {
        None | Some(Commands::Serve) => run_serve(config, cli.open).await,
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config).await,
    }
}

/// Start the web server
async fn run_serve(config: AppConfig, open: bool) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    info!("Starting web server at http://{}", addr);

    if open {
        let url = format!("http://{}", addr);
        if let Err(e) = open_browser(&url) {
            error!("Failed to open browser: {}", e);
        }
    }

    picsort::web::start_server(config).await
}

/// Run config commands
async fn run_config_command(
    config: AppConfig,
    action: ConfigCommands,
    config_path: &Path,
) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            if output.exists() {
                return Err(PicsortError::Config(format!(
                    "{:?} already exists, refusing to overwrite",
                    output
                )));
            }
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  Listen: {}:{}", config.web.host, config.web.port);
            println!("  Max upload: {} bytes", config.upload.max_body_bytes);
            println!("  Extensions: {:?}", config.upload.extensions);
            println!("  Preview width: {}px", config.display.max_width);
        }
    }

    Ok(())
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }
    Ok(())
}
