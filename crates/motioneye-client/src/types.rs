//! Well-known keys, actions and media types of the motionEye API

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Camera configuration as reported by the server.
///
/// motionEye does not publish a schema for camera configuration, so it is
/// kept as a plain JSON object. Known keys are listed below.
pub type CameraConfig = Map<String, Value>;

/// One entry of a movie or picture listing (`path`, `mimeType`, ...)
pub type MediaEntry = Map<String, Value>;

/// Default admin username
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Default surveillance username
pub const DEFAULT_SURVEILLANCE_USERNAME: &str = "user";
/// Default motionEye port
pub const DEFAULT_PORT: u16 = 8765;
/// Scheme used for motion streams, which never serve https
pub const DEFAULT_URL_SCHEME: &str = "http";

// =============================================================================
// Configuration keys
// =============================================================================

pub const KEY_ACTIONS: &str = "actions";
pub const KEY_CAMERAS: &str = "cameras";
pub const KEY_ERROR: &str = "error";
pub const KEY_HOST: &str = "host";
pub const KEY_ID: &str = "id";
pub const KEY_MEDIA_LIST: &str = "mediaList";
pub const KEY_MIME_TYPE: &str = "mimeType";
pub const KEY_MOTION_DETECTION: &str = "motion_detection";
pub const KEY_MOVIES: &str = "movies";
pub const KEY_NAME: &str = "name";
pub const KEY_PATH: &str = "path";
pub const KEY_ROOT_DIRECTORY: &str = "root_directory";
pub const KEY_STILL_IMAGES: &str = "still_images";
pub const KEY_STREAMING_PORT: &str = "streaming_port";
pub const KEY_STREAMING_AUTH_MODE: &str = "streaming_auth_mode";
pub const KEY_TEXT_OVERLAY: &str = "text_overlay";
pub const KEY_TEXT_OVERLAY_CAMERA_NAME: &str = "camera-name";
pub const KEY_TEXT_OVERLAY_CUSTOM_TEXT: &str = "custom-text";
pub const KEY_TEXT_OVERLAY_CUSTOM_TEXT_LEFT: &str = "custom_left_text";
pub const KEY_TEXT_OVERLAY_CUSTOM_TEXT_RIGHT: &str = "custom_right_text";
pub const KEY_TEXT_OVERLAY_DISABLED: &str = "disabled";
pub const KEY_TEXT_OVERLAY_LEFT: &str = "left_text";
pub const KEY_TEXT_OVERLAY_RIGHT: &str = "right_text";
pub const KEY_TEXT_OVERLAY_TIMESTAMP: &str = "timestamp";
pub const KEY_UPLOAD_ENABLED: &str = "upload_enabled";
pub const KEY_VIDEO_STREAMING: &str = "video_streaming";

pub const KEY_WEB_HOOK_NOTIFICATIONS_ENABLED: &str = "web_hook_notifications_enabled";
pub const KEY_WEB_HOOK_NOTIFICATIONS_HTTP_METHOD: &str = "web_hook_notifications_http_method";
pub const KEY_WEB_HOOK_NOTIFICATIONS_URL: &str = "web_hook_notifications_url";
pub const KEY_WEB_HOOK_STORAGE_ENABLED: &str = "web_hook_storage_enabled";
pub const KEY_WEB_HOOK_STORAGE_HTTP_METHOD: &str = "web_hook_storage_http_method";
pub const KEY_WEB_HOOK_STORAGE_URL: &str = "web_hook_storage_url";

// =============================================================================
// Webhooks
// =============================================================================

/// HTTP method a webhook is delivered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebHookMethod {
    #[serde(rename = "GET")]
    Get,
    /// POST with the parameters in the query string
    #[serde(rename = "POST")]
    PostQuery,
    /// POST with a form-encoded body
    #[serde(rename = "POSTf")]
    PostForm,
    /// POST with a JSON body
    #[serde(rename = "POSTj")]
    PostJson,
}

impl WebHookMethod {
    /// Value stored in the camera configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::PostQuery => "POST",
            Self::PostForm => "POSTf",
            Self::PostJson => "POSTj",
        }
    }
}

/// Motion conversion specifiers available in webhook URLs, by name.
///
/// See <https://motion-project.github.io/motion_config.html#conversion_specifiers>.
pub const WEB_HOOK_CONVERSION_SPECIFIERS: &[(&str, &str)] = &[
    ("year", "%Y"),
    ("month", "%m"),
    ("day", "%d"),
    ("hour", "%H"),
    ("minute", "%M"),
    ("second", "%S"),
    ("time", "%T"),
    ("event", "%v"),
    ("frame_number", "%q"),
    ("camera_id", "%t"),
    ("changed_pixels", "%D"),
    ("noise_level", "%N"),
    ("width", "%w"),
    ("height", "%h"),
    ("motion_width", "%i"),
    ("motion_height", "%J"),
    ("motion_center_x", "%K"),
    ("motion_center_y", "%L"),
    ("file_path", "%f"),
    ("file_type", "%n"),
    ("threshold", "%o"),
    ("despeckle_labels", "%Q"),
    ("camera_name", "%$"),
    ("fps", "%{fps}"),
    ("host", "%{host}"),
    ("motion_version", "%{ver}"),
];

/// Look up the conversion specifier motion substitutes for `name`
pub fn conversion_specifier(name: &str) -> Option<&'static str> {
    WEB_HOOK_CONVERSION_SPECIFIERS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, spec)| *spec)
}

// =============================================================================
// Actions
// =============================================================================

/// Actions motionEye can trigger on a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Snapshot,
    RecordStart,
    RecordStop,
    Lock,
    Unlock,
    LightOn,
    LightOff,
    AlarmOn,
    AlarmOff,
    Up,
    Right,
    Down,
    Left,
    ZoomIn,
    ZoomOut,
    /// Move to a PTZ preset
    Preset(PresetNumber),
}

/// PTZ preset number, always within 1..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresetNumber(u8);

const PRESET_NAMES: [&str; 9] = [
    "preset1", "preset2", "preset3", "preset4", "preset5", "preset6", "preset7", "preset8",
    "preset9",
];

impl PresetNumber {
    /// `None` unless `n` is in 1..=9
    pub fn new(n: u8) -> Option<Self> {
        (1..=9).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn as_str(self) -> &'static str {
        PRESET_NAMES[usize::from(self.0 - 1)]
    }
}

impl Action {
    /// Action name as used in the `/action/{id}/{name}` path
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::RecordStart => "record_start",
            Self::RecordStop => "record_stop",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::LightOn => "light_on",
            Self::LightOff => "light_off",
            Self::AlarmOn => "alarm_on",
            Self::AlarmOff => "alarm_off",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::Preset(n) => n.as_str(),
        }
    }

    /// Preset action for `n`, `None` outside 1..=9
    pub fn preset(n: u8) -> Option<Self> {
        PresetNumber::new(n).map(Self::Preset)
    }

    /// Parse an action name
    pub fn parse(name: &str) -> Option<Self> {
        let action = match name {
            "snapshot" => Self::Snapshot,
            "record_start" => Self::RecordStart,
            "record_stop" => Self::RecordStop,
            "lock" => Self::Lock,
            "unlock" => Self::Unlock,
            "light_on" => Self::LightOn,
            "light_off" => Self::LightOff,
            "alarm_on" => Self::AlarmOn,
            "alarm_off" => Self::AlarmOff,
            "up" => Self::Up,
            "right" => Self::Right,
            "down" => Self::Down,
            "left" => Self::Left,
            "zoom_in" => Self::ZoomIn,
            "zoom_out" => Self::ZoomOut,
            other => {
                let n: u8 = other.strip_prefix("preset")?.parse().ok()?;
                Self::preset(n)?
            }
        };
        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// =============================================================================
// Media
// =============================================================================

/// Kind of file reported by motion's `%n` webhook specifier.
///
/// Motion reports a bit flag: 1, 2 and 4 are still images, 8, 16 and 32 are
/// movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Movie,
    Unknown,
}

impl MediaKind {
    /// Classify a motion file type code
    pub fn from_file_type(file_type: i64) -> Self {
        match file_type {
            1..=7 => Self::Image,
            8..=63 => Self::Movie,
            _ => Self::Unknown,
        }
    }
}

/// Python-style truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
