//! Media commands - list recordings and pictures, build media URLs

use anyhow::{Context, Result};
use motioneye_client::{MediaEntry, MotionEyeClient, KEY_MIME_TYPE, KEY_PATH};

use crate::output::{display_scalar, MediaRow, OutputContext};

/// List recorded movies of a camera
pub async fn movies(
    client: &MotionEyeClient,
    camera_id: u32,
    prefix: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let entries = client
        .get_movies(camera_id, prefix)
        .await
        .with_context(|| format!("Failed to list movies of camera {}", camera_id))?;

    ctx.print(&rows(&entries));
    Ok(())
}

/// List still images of a camera
pub async fn pictures(
    client: &MotionEyeClient,
    camera_id: u32,
    prefix: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let entries = client
        .get_images(camera_id, prefix)
        .await
        .with_context(|| format!("Failed to list images of camera {}", camera_id))?;

    ctx.print(&rows(&entries));
    Ok(())
}

/// Print the signed URL of a movie or image
pub fn media_url(
    client: &MotionEyeClient,
    camera_id: u32,
    path: &str,
    image: bool,
    preview: bool,
    ctx: &OutputContext,
) -> Result<()> {
    let url = if image {
        client.get_image_url(camera_id, path, preview)?
    } else {
        client.get_movie_url(camera_id, path, preview)?
    };

    ctx.print_value(&serde_json::Value::String(url.to_string()));
    Ok(())
}

fn rows(entries: &[MediaEntry]) -> Vec<MediaRow> {
    let get = |entry: &MediaEntry, key: &str| {
        entry
            .get(key)
            .map(display_scalar)
            .unwrap_or_else(|| "-".to_string())
    };

    entries
        .iter()
        .map(|entry| MediaRow {
            path: get(entry, KEY_PATH),
            moment: get(entry, "momentStr"),
            size: get(entry, "sizeStr"),
            mime_type: get(entry, KEY_MIME_TYPE),
        })
        .collect()
}
