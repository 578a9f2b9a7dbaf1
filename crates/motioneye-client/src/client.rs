//! motionEye HTTP client implementation

use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument, trace, warn};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::{MotionEyeClientError, Result};
use crate::signature::{compute_signature, password_key, SIGNATURE_PARAM, USERNAME_PARAM};
use crate::types::*;

/// HTTP session slot.
///
/// Moves from `Pending` (or `Open`, for a caller-supplied session) to
/// `Closed` exactly once.
#[derive(Debug)]
enum Session {
    Pending,
    Open(Client),
    Closed,
}

/// motionEye REST API client
///
/// Every API call is signed with the admin credentials; media URLs are
/// signed with the surveillance credentials. The HTTP session is created on
/// first use unless one is supplied with [`MotionEyeClient::with_session`],
/// and released by [`MotionEyeClient::close`] or when the client is dropped.
#[derive(Debug)]
pub struct MotionEyeClient {
    base_url: Url,
    admin: Credentials,
    surveillance: Credentials,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    session: Mutex<Session>,
    owns_session: bool,
}

impl MotionEyeClient {
    /// Create a client with the default credentials
    ///
    /// # Arguments
    /// * `url` - Base URL of the motionEye server (e.g., "http://localhost:8765")
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(url))
    }

    /// Create a client from a full configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a client on top of an existing HTTP session.
    ///
    /// The session remains the caller's: closing the client only drops the
    /// client's handle to it.
    pub fn with_session(config: ClientConfig, session: Client) -> Result<Self> {
        Self::build(config, Some(session))
    }

    fn build(config: ClientConfig, session: Option<Client>) -> Result<Self> {
        let base_url = parse_base_url(&config.url)?;
        let request_timeout = config.request_timeout_duration();
        let connect_timeout = config.connect_timeout_duration();
        let owns_session = session.is_none();

        Ok(Self {
            base_url,
            admin: config.admin,
            surveillance: config.surveillance,
            request_timeout,
            connect_timeout,
            session: Mutex::new(session.map_or(Session::Pending, Session::Open)),
            owns_session,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        matches!(*self.session.lock(), Session::Closed)
    }

    /// Whether the client created (and therefore owns) its HTTP session
    pub fn owns_session(&self) -> bool {
        self.owns_session
    }

    /// Release the HTTP session.
    ///
    /// Idempotent. Every later network operation fails with
    /// [`MotionEyeClientError::Connection`].
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.session.lock(), Session::Closed);
        if let Session::Open(_) = previous {
            debug!(owned = self.owns_session, "Closed motionEye session");
        }
    }

    // =========================================================================
    // Server
    // =========================================================================

    /// Verify the admin credentials against the server
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<Option<Value>> {
        self.request(Method::GET, "/login", &[], None).await
    }

    /// Get the server manifest (identity and version)
    #[instrument(skip(self))]
    pub async fn get_manifest(&self) -> Result<Value> {
        let body = self.request(Method::GET, "/manifest.json", &[], None).await?;
        expect_body(body, "manifest")
    }

    /// Get the main server configuration
    #[instrument(skip(self))]
    pub async fn get_server_config(&self) -> Result<Value> {
        let body = self.request(Method::GET, "/config/main/get", &[], None).await?;
        expect_body(body, "server config")
    }

    // =========================================================================
    // Cameras
    // =========================================================================

    /// List the configuration of all cameras
    #[instrument(skip(self))]
    pub async fn get_cameras(&self) -> Result<Vec<CameraConfig>> {
        let body = self.request(Method::GET, "/config/list", &[], None).await?;
        take_list(body, KEY_CAMERAS)
    }

    /// Get the configuration of one camera
    #[instrument(skip(self))]
    pub async fn get_camera(&self, camera_id: u32) -> Result<CameraConfig> {
        let path = format!("/config/{}/get", camera_segment(camera_id)?);
        let body = self.request(Method::GET, &path, &[], None).await?;
        expect_object(expect_body(body, "camera config")?, "camera config")
    }

    /// Replace the configuration of one camera
    #[instrument(skip(self, config))]
    pub async fn set_camera(
        &self,
        camera_id: u32,
        config: &CameraConfig,
    ) -> Result<Option<Value>> {
        let path = format!("/config/{}/set", camera_segment(camera_id)?);
        let body = Value::Object(config.clone());
        self.request(Method::POST, &path, &[], Some(&body)).await
    }

    /// Trigger an action on a camera.
    ///
    /// `action` is usually one of the [`Action`] names, but any name made of
    /// ASCII letters, digits, `_` and `-` is passed through.
    #[instrument(skip(self))]
    pub async fn action(&self, camera_id: u32, action: &str) -> Result<Option<Value>> {
        let path = format!(
            "/action/{}/{}",
            camera_segment(camera_id)?,
            action_segment(action)?
        );
        self.request(Method::POST, &path, &[], Some(&Value::Object(Map::new())))
            .await
    }

    // =========================================================================
    // Media listings
    // =========================================================================

    /// List recorded movies of a camera, optionally below a directory prefix
    #[instrument(skip(self))]
    pub async fn get_movies(
        &self,
        camera_id: u32,
        prefix: Option<&str>,
    ) -> Result<Vec<MediaEntry>> {
        let path = format!("/movie/{}/list", camera_segment(camera_id)?);
        self.media_list(&path, prefix).await
    }

    /// List still images of a camera, optionally below a directory prefix
    #[instrument(skip(self))]
    pub async fn get_images(
        &self,
        camera_id: u32,
        prefix: Option<&str>,
    ) -> Result<Vec<MediaEntry>> {
        let path = format!("/picture/{}/list", camera_segment(camera_id)?);
        self.media_list(&path, prefix).await
    }

    async fn media_list(&self, path: &str, prefix: Option<&str>) -> Result<Vec<MediaEntry>> {
        let params: Vec<(&str, &str)> = match prefix {
            Some(prefix) if !prefix.is_empty() => vec![("prefix", prefix)],
            _ => Vec::new(),
        };
        let body = self.request(Method::GET, path, &params, None).await?;
        take_list(body, KEY_MEDIA_LIST)
    }

    // =========================================================================
    // URL derivation
    // =========================================================================

    /// Whether a camera has video streaming enabled
    pub fn is_camera_streaming(camera: &CameraConfig) -> bool {
        camera.contains_key(KEY_STREAMING_PORT)
            && camera.get(KEY_VIDEO_STREAMING).is_some_and(is_truthy)
    }

    /// URL of the MJPEG stream served by motion, or `None` if the camera is
    /// not streaming.
    ///
    /// Cameras of remote motionEye instances carry their own `host`;
    /// otherwise the host of the base URL is used. Motion never serves https
    /// on the streaming port.
    pub fn get_camera_stream_url(&self, camera: &CameraConfig) -> Result<Option<Url>> {
        if !Self::is_camera_streaming(camera) {
            return Ok(None);
        }

        let host = match camera.get(KEY_HOST).and_then(Value::as_str) {
            Some(host) if !host.is_empty() => host,
            _ => self.base_url.host_str().ok_or_else(|| {
                MotionEyeClientError::UrlParse(format!(
                    "No host in base URL: {}",
                    self.base_url
                ))
            })?,
        };
        let port = camera
            .get(KEY_STREAMING_PORT)
            .and_then(scalar_to_string)
            .ok_or_else(|| {
                MotionEyeClientError::UrlParse(format!("Invalid {}", KEY_STREAMING_PORT))
            })?;

        let url = Url::parse(&format!("{}://{}:{}/", DEFAULT_URL_SCHEME, host, port))
            .map_err(|e| {
                MotionEyeClientError::UrlParse(format!(
                    "Invalid stream URL for {}:{}: {}",
                    host, port, e
                ))
            })?;

        if self.surveillance.password.is_empty() {
            Ok(Some(url))
        } else {
            Ok(Some(self.signed_url(url, &[], &Method::GET, None, &self.surveillance)))
        }
    }

    /// URL of the current still frame of a camera, or `None` if the camera
    /// is not streaming or has no id.
    pub fn get_camera_snapshot_url(&self, camera: &CameraConfig) -> Result<Option<Url>> {
        if !Self::is_camera_streaming(camera) {
            return Ok(None);
        }
        let Some(id) = camera.get(KEY_ID).and_then(scalar_to_string) else {
            return Ok(None);
        };

        let url = self.media_url(&["picture", &id, "current", ""])?;
        Ok(Some(self.signed_url(
            url,
            &[],
            &Method::GET,
            None,
            &self.surveillance,
        )))
    }

    /// Playback URL of a recorded movie (or its thumbnail with `preview`)
    pub fn get_movie_url(&self, camera_id: u32, path: &str, preview: bool) -> Result<Url> {
        let action = if preview { "preview" } else { "playback" };
        self.media_file_url("movie", camera_id, action, path)
    }

    /// Download URL of a still image (or its thumbnail with `preview`)
    pub fn get_image_url(&self, camera_id: u32, path: &str, preview: bool) -> Result<Url> {
        let action = if preview { "preview" } else { "download" };
        self.media_file_url("picture", camera_id, action, path)
    }

    /// Whether a motion file type code denotes a still image
    pub fn is_file_type_image(file_type: i64) -> bool {
        MediaKind::from_file_type(file_type) == MediaKind::Image
    }

    /// Whether a motion file type code denotes a movie
    pub fn is_file_type_movie(file_type: i64) -> bool {
        MediaKind::from_file_type(file_type) == MediaKind::Movie
    }

    fn media_file_url(
        &self,
        kind: &str,
        camera_id: u32,
        action: &str,
        path: &str,
    ) -> Result<Url> {
        let camera = camera_segment(camera_id)?;
        let mut segments = vec![kind, camera.as_str(), action];
        segments.extend(media_path_segments(path)?);

        let url = self.media_url(&segments)?;
        Ok(self.signed_url(url, &[], &Method::GET, None, &self.surveillance))
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Get the session, creating it on first use
    fn session(&self) -> Result<Client> {
        let mut session = self.session.lock();
        match &*session {
            Session::Open(client) => return Ok(client.clone()),
            Session::Closed => {
                return Err(MotionEyeClientError::Connection(
                    "Client is closed".to_string(),
                ))
            }
            Session::Pending => {}
        }

        let mut builder = Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            MotionEyeClientError::Configuration(format!("Could not create HTTP session: {}", e))
        })?;

        trace!("Opened motionEye session");
        *session = Session::Open(client.clone());
        Ok(client)
    }

    /// Join an API path onto the base URL
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MotionEyeClientError::UrlParse(format!("{}: {}", path, e)))
    }

    /// Replace the path of the base URL with `segments`, percent-encoding
    /// each one.
    fn media_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| {
                MotionEyeClientError::UrlParse(format!("Not a base URL: {}", self.base_url))
            })?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// Attach `params`, the username and the request signature to `url`
    fn signed_url(
        &self,
        mut url: Url,
        params: &[(&str, &str)],
        method: &Method,
        body: Option<&str>,
        credentials: &Credentials,
    ) -> Url {
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            query.append_pair(USERNAME_PARAM, &credentials.username);
        }

        let key = password_key(&credentials.password);
        let signature = compute_signature(method.as_str(), &url, body, &key);
        url.query_pairs_mut().append_pair(SIGNATURE_PARAM, &signature);
        url
    }

    /// Issue a signed admin request and decode the JSON response
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let session = self.session()?;

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| MotionEyeClientError::request(format!("Could not encode body: {}", e)))?;
        let url = self.signed_url(
            self.endpoint(path)?,
            params,
            &method,
            body.as_deref(),
            &self.admin,
        );

        let mut request = session.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request to motionEye failed: {}", e);
            MotionEyeClientError::from_transport(e)
        })?;
        self.handle_response(&method, &url, response).await
    }

    /// Map the status to an error or decode the body
    async fn handle_response(
        &self,
        method: &Method,
        url: &Url,
        response: reqwest::Response,
    ) -> Result<Option<Value>> {
        let status = response.status();
        debug!("{} {} -> {}", method, url.path(), status.as_u16());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Authentication failed in request to {}", url.path());
                return Err(MotionEyeClientError::InvalidAuth {
                    status: status.as_u16(),
                    message: error_message(response, status).await,
                });
            }
            s if !s.is_success() => {
                warn!(
                    "Unexpected HTTP response status code {} for request: {}",
                    status.as_u16(),
                    url.path()
                );
                return Err(MotionEyeClientError::status(
                    status.as_u16(),
                    error_message(response, status).await,
                ));
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(MotionEyeClientError::from_transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            error!("Could not JSON decode: {:?}", String::from_utf8_lossy(&bytes));
            MotionEyeClientError::status(status.as_u16(), format!("Invalid JSON response: {}", e))
        })
    }
}

/// Validate a base URL: it needs a scheme and a host
fn parse_base_url(url: &str) -> Result<Url> {
    let invalid = |detail: String| {
        MotionEyeClientError::Configuration(format!(
            "Invalid URL, must have a URL scheme and host: {:?} ({})",
            url, detail
        ))
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() || parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

/// Render a camera id as a path segment; zero is never a valid id
fn camera_segment(camera_id: u32) -> Result<String> {
    if camera_id == 0 {
        return Err(MotionEyeClientError::Path(
            "Camera id must be positive".to_string(),
        ));
    }
    Ok(camera_id.to_string())
}

/// Check that an action name is a single plain path segment
fn action_segment(action: &str) -> Result<&str> {
    if action.is_empty() {
        return Err(MotionEyeClientError::Path(
            "Action name must not be empty".to_string(),
        ));
    }
    if !action
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(MotionEyeClientError::Path(format!(
            "Invalid action name: {:?}",
            action
        )));
    }
    Ok(action)
}

/// Split a media path into URL-safe segments.
///
/// Leading, doubled and trailing slashes and `.` segments are dropped;
/// `..` is rejected.
fn media_path_segments(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.is_empty() {
        return Err(MotionEyeClientError::Path(format!(
            "Could not parse empty path: {:?}",
            path
        )));
    }
    if segments.contains(&"..") {
        return Err(MotionEyeClientError::Path(format!(
            "Path must not contain '..': {:?}",
            path
        )));
    }
    Ok(segments)
}

/// String form of a JSON number or non-empty string
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

async fn error_message(response: reqwest::Response, status: StatusCode) -> String {
    match response.json::<Value>().await {
        Ok(body) => body
            .get(KEY_ERROR)
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Err(_) => format!("HTTP {}", status),
    }
}

fn expect_body(body: Option<Value>, what: &str) -> Result<Value> {
    body.ok_or_else(|| MotionEyeClientError::request(format!("Empty {} response", what)))
}

fn expect_object(value: Value, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(MotionEyeClientError::request(format!(
            "Expected {} to be an object, got {}",
            what, other
        ))),
    }
}

/// Unwrap a `{"<key>": [ {...}, ... ]}` envelope
fn take_list(body: Option<Value>, key: &str) -> Result<Vec<Map<String, Value>>> {
    let mut envelope = expect_object(expect_body(body, key)?, key)?;
    match envelope.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| expect_object(item, key))
            .collect(),
        Some(_) => Err(MotionEyeClientError::request(format!(
            "'{}' is not a list",
            key
        ))),
        None => Err(MotionEyeClientError::request(format!(
            "Response is missing '{}'",
            key
        ))),
    }
}
