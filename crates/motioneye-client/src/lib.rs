//! motionEye Client Library
//!
//! Provides an async HTTP client for the motionEye surveillance server.
//!
//! # Example
//!
//! ```rust,no_run
//! use motioneye_client::{ClientConfig, MotionEyeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MotionEyeClient::with_config(
//!         ClientConfig::new("http://localhost:8765").admin("admin", "secret"),
//!     )?;
//!
//!     // Optional: check the credentials up front
//!     client.login().await?;
//!
//!     let manifest = client.get_manifest().await?;
//!     println!("Manifest: {}", manifest);
//!
//!     for camera in client.get_cameras().await? {
//!         if let Some(url) = client.get_camera_stream_url(&camera)? {
//!             println!("Stream: {}", url);
//!         }
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module runs an axum router in-process and hands out a
//! client pointed at it:
//!
//! ```rust,ignore
//! use motioneye_client::testing::TestServer;
//!
//! let server = TestServer::start(router).await?;
//! let cameras = server.client.get_cameras().await?;
//! ```

mod client;
mod config;
mod error;
pub mod signature;
pub mod testing;
mod types;

pub use client::MotionEyeClient;
pub use config::{ClientConfig, Credentials};
pub use error::{MotionEyeClientError, Result};
pub use types::*;
