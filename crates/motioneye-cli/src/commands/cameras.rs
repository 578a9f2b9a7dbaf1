//! Camera commands - list, show, update, trigger actions, derive URLs

use anyhow::{bail, Context, Result};
use motioneye_client::{Action, CameraConfig, MotionEyeClient, KEY_ID, KEY_NAME};
use serde_json::Value;

use crate::output::{display_scalar, CameraRow, OutputContext, UrlRow};

/// List all cameras
pub async fn cameras(client: &MotionEyeClient, ctx: &OutputContext) -> Result<()> {
    let cameras = client
        .get_cameras()
        .await
        .context("Failed to list cameras")?;

    let rows = cameras
        .iter()
        .map(|camera| -> Result<CameraRow> {
            let stream_url = client
                .get_camera_stream_url(camera)?
                .map(|url| url.to_string())
                .unwrap_or_else(|| "-".to_string());
            Ok(CameraRow {
                id: field(camera, KEY_ID),
                name: field(camera, KEY_NAME),
                streaming: MotionEyeClient::is_camera_streaming(camera).to_string(),
                stream_url,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ctx.print(&rows);
    Ok(())
}

/// Show the full configuration of one camera
pub async fn camera(client: &MotionEyeClient, camera_id: u32, ctx: &OutputContext) -> Result<()> {
    let camera = client
        .get_camera(camera_id)
        .await
        .with_context(|| format!("Failed to get camera {}", camera_id))?;

    ctx.print_value(&Value::Object(camera));
    Ok(())
}

/// Merge `changes` (a JSON object) into a camera configuration and store it
pub async fn set_camera(
    client: &MotionEyeClient,
    camera_id: u32,
    changes: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let changes: CameraConfig =
        serde_json::from_str(changes).context("Configuration must be a JSON object")?;

    let mut camera = client
        .get_camera(camera_id)
        .await
        .with_context(|| format!("Failed to get camera {}", camera_id))?;
    camera.extend(changes);

    client
        .set_camera(camera_id, &camera)
        .await
        .with_context(|| format!("Failed to update camera {}", camera_id))?;

    ctx.success(&format!("Updated camera {}", camera_id));
    Ok(())
}

/// Trigger an action on a camera
pub async fn action(
    client: &MotionEyeClient,
    camera_id: u32,
    name: &str,
    ctx: &OutputContext,
) -> Result<()> {
    if Action::parse(name).is_none() {
        tracing::warn!("'{}' is not a standard motionEye action", name);
    }

    client
        .action(camera_id, name)
        .await
        .with_context(|| format!("Failed to run '{}' on camera {}", name, camera_id))?;

    ctx.success(&format!("Triggered '{}' on camera {}", name, camera_id));
    Ok(())
}

/// Show the stream and snapshot URLs of a camera
pub async fn urls(client: &MotionEyeClient, camera_id: u32, ctx: &OutputContext) -> Result<()> {
    let camera = client
        .get_camera(camera_id)
        .await
        .with_context(|| format!("Failed to get camera {}", camera_id))?;

    if !MotionEyeClient::is_camera_streaming(&camera) {
        bail!("Camera {} is not streaming", camera_id);
    }

    let mut rows = Vec::new();
    if let Some(url) = client.get_camera_stream_url(&camera)? {
        rows.push(UrlRow {
            kind: "stream".to_string(),
            url: url.to_string(),
        });
    }
    if let Some(url) = client.get_camera_snapshot_url(&camera)? {
        rows.push(UrlRow {
            kind: "snapshot".to_string(),
            url: url.to_string(),
        });
    }

    ctx.print(&rows);
    Ok(())
}

fn field(camera: &CameraConfig, key: &str) -> String {
    camera
        .get(key)
        .map(display_scalar)
        .unwrap_or_else(|| "-".to_string())
}
