//! Configuration file handling for motioneye-cli

use anyhow::{Context, Result};
use motioneye_client::{ClientConfig, Credentials};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_SERVER: &str = "http://localhost:8765";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default server URL
    pub server: Option<String>,
    /// Admin account
    pub admin: Option<Credentials>,
    /// Surveillance account
    pub surveillance: Option<Credentials>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

/// Values given on the command line or through the environment
#[derive(Debug, Default)]
pub struct ArgOverrides<'a> {
    pub server: Option<&'a str>,
    pub admin_username: Option<&'a str>,
    pub admin_password: Option<&'a str>,
    pub surveillance_username: Option<&'a str>,
    pub surveillance_password: Option<&'a str>,
    pub no_color: bool,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("motioneye-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> MergedConfig {
        let server = args
            .server
            .map(String::from)
            .or_else(|| self.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let admin = merge_credentials(
            self.admin.clone().unwrap_or_else(Credentials::admin),
            args.admin_username,
            args.admin_password,
        );
        let surveillance = merge_credentials(
            self.surveillance
                .clone()
                .unwrap_or_else(Credentials::surveillance),
            args.surveillance_username,
            args.surveillance_password,
        );

        let mut client = ClientConfig::new(server);
        client.admin = admin;
        client.surveillance = surveillance;
        client.request_timeout_ms = self.timeout_ms;

        MergedConfig {
            client,
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

fn merge_credentials(
    mut base: Credentials,
    username: Option<&str>,
    password: Option<&str>,
) -> Credentials {
    if let Some(username) = username {
        base.username = username.to_string();
    }
    if let Some(password) = password {
        base.password = password.to_string();
    }
    base
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub client: ClientConfig,
    pub no_color: bool,
}
