//! Command implementations for motioneye-cli

pub mod cameras;
pub mod media;
pub mod server;

pub use cameras::{action, camera, cameras, set_camera, urls};
pub use media::{media_url, movies, pictures};
pub use server::{login, manifest, server_config};
