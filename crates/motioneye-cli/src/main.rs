//! motionEye CLI - Command-line tool for motionEye surveillance servers

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use motioneye_client::MotionEyeClient;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "motioneye-cli")]
#[command(author, version, about = "motionEye surveillance server CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Server URL [default: http://localhost:8765]
    #[arg(short, long, env = "MOTIONEYE_SERVER")]
    server: Option<String>,

    /// Admin username
    #[arg(long, env = "MOTIONEYE_ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Admin password
    #[arg(long, env = "MOTIONEYE_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Surveillance username
    #[arg(long, env = "MOTIONEYE_SURVEILLANCE_USERNAME")]
    surveillance_username: Option<String>,

    /// Surveillance password
    #[arg(long, env = "MOTIONEYE_SURVEILLANCE_PASSWORD", hide_env_values = true)]
    surveillance_password: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "MOTIONEYE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the admin credentials
    Login,

    /// Show the server manifest
    Manifest,

    /// Show the main server configuration
    ServerConfig,

    /// List all cameras
    Cameras,

    /// Show the configuration of a camera
    Camera {
        /// Camera ID
        id: u32,
    },

    /// Update camera configuration fields
    SetCamera {
        /// Camera ID
        id: u32,

        /// Fields to change, as a JSON object (e.g. '{"video_streaming": true}')
        changes: String,
    },

    /// Trigger a camera action (snapshot, record_start, preset1, ...)
    Action {
        /// Camera ID
        id: u32,

        /// Action name
        name: String,
    },

    /// List recorded movies
    Movies {
        /// Camera ID
        id: u32,

        /// Only list below this directory
        #[arg(long)]
        prefix: Option<String>,
    },

    /// List still images
    Images {
        /// Camera ID
        id: u32,

        /// Only list below this directory
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Show stream and snapshot URLs of a camera
    Urls {
        /// Camera ID
        id: u32,
    },

    /// Build the signed URL of a movie or image
    MediaUrl {
        /// Camera ID
        id: u32,

        /// Path as reported by `movies` or `images`
        path: String,

        /// The path is an image rather than a movie
        #[arg(long)]
        image: bool,

        /// Link to the thumbnail instead of the file
        #[arg(long)]
        preview: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        server: cli.server.as_deref(),
        admin_username: cli.admin_username.as_deref(),
        admin_password: cli.admin_password.as_deref(),
        surveillance_username: cli.surveillance_username.as_deref(),
        surveillance_password: cli.surveillance_password.as_deref(),
        no_color: cli.no_color,
    });

    let ctx = OutputContext::new(cli.output, merged.no_color, cli.quiet);

    let client =
        MotionEyeClient::with_config(merged.client).context("Failed to create motionEye client")?;

    let result = run(&client, &cli.command, &ctx).await;
    client.close();
    result
}

async fn run(client: &MotionEyeClient, command: &Commands, ctx: &OutputContext) -> Result<()> {
    match command {
        Commands::Login => commands::login(client, ctx).await,
        Commands::Manifest => commands::manifest(client, ctx).await,
        Commands::ServerConfig => commands::server_config(client, ctx).await,
        Commands::Cameras => commands::cameras(client, ctx).await,
        Commands::Camera { id } => commands::camera(client, *id, ctx).await,
        Commands::SetCamera { id, changes } => {
            commands::set_camera(client, *id, changes, ctx).await
        }
        Commands::Action { id, name } => commands::action(client, *id, name, ctx).await,
        Commands::Movies { id, prefix } => {
            commands::movies(client, *id, prefix.as_deref(), ctx).await
        }
        Commands::Images { id, prefix } => {
            commands::pictures(client, *id, prefix.as_deref(), ctx).await
        }
        Commands::Urls { id } => commands::urls(client, *id, ctx).await,
        Commands::MediaUrl {
            id,
            path,
            image,
            preview,
        } => commands::media_url(client, *id, path, *image, *preview, ctx),
    }
}
