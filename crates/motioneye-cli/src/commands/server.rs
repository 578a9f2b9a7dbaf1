//! Server commands - login check, manifest and main configuration

use anyhow::{Context, Result};
use motioneye_client::MotionEyeClient;

use crate::output::OutputContext;

/// Verify the admin credentials
pub async fn login(client: &MotionEyeClient, ctx: &OutputContext) -> Result<()> {
    client
        .login()
        .await
        .context("Failed to log in to motionEye")?;

    ctx.success(&format!("Logged in to {}", client.base_url()));
    Ok(())
}

/// Show the server manifest
pub async fn manifest(client: &MotionEyeClient, ctx: &OutputContext) -> Result<()> {
    let manifest = client
        .get_manifest()
        .await
        .context("Failed to get manifest")?;

    ctx.print_value(&manifest);
    Ok(())
}

/// Show the main server configuration
pub async fn server_config(client: &MotionEyeClient, ctx: &OutputContext) -> Result<()> {
    let config = client
        .get_server_config()
        .await
        .context("Failed to get server config")?;

    ctx.print_value(&config);
    Ok(())
}
