//! Wire types for the OpenVidu REST API.
//!
//! Responses are decoded leniently: optional fields may be missing or
//! `null`, unknown fields are ignored. Timestamps travel as epoch
//! milliseconds; one outside chrono's range fails the decode. Request bodies
//! skip every option the caller left unset so the server applies its own
//! defaults.

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── enumerations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaMode {
    Routed,
    Relayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingMode {
    Always,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputMode {
    Composed,
    ComposedQuickStart,
    Individual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingLayout {
    BestFit,
    PictureInPicture,
    VerticalPresentation,
    HorizontalPresentation,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionType {
    #[serde(rename = "WEBRTC")]
    WebRtc,
    #[serde(rename = "IPCAM")]
    IpCam,
}

/// Participant role inside a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Subscriber,
    #[default]
    Publisher,
    Moderator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Starting,
    Started,
    Stopped,
    Ready,
    Failed,
}

// ── responses ────────────────────────────────────────────────────────────

/// The session object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub media_mode: MediaMode,
    pub recording_mode: RecordingMode,
    pub custom_session_id: Option<String>,
    pub forced_video_codec: Option<String>,
    pub allow_transcoding: Option<bool>,
    pub default_recording_properties: Option<RecordingProperties>,
    // Pre-2.20 servers report the recording defaults as flat fields.
    pub default_output_mode: Option<OutputMode>,
    pub default_recording_layout: Option<RecordingLayout>,
    pub default_custom_layout: Option<String>,
    #[serde(default)]
    pub connections: ConnectionList,
    /// Whether the session is being recorded right now.
    #[serde(default)]
    pub recording: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionList {
    #[serde(default)]
    pub number_of_elements: usize,
    #[serde(default)]
    pub content: Vec<ConnectionInfo>,
}

/// The connection object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub status: ConnectionStatus,
    pub session_id: Option<String>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// `None` while the participant has not joined yet.
    #[serde(default, with = "ts_milliseconds_option")]
    pub active_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub token: Option<String>,
    pub server_data: Option<String>,
    pub client_data: Option<String>,
    pub record: Option<bool>,
    /// WebRTC connections only.
    pub role: Option<Role>,
    pub kurento_options: Option<KurentoOptions>,
    // IP camera connections only.
    pub rtsp_uri: Option<String>,
    pub adaptative_bitrate: Option<bool>,
    pub only_play_with_subscribers: Option<bool>,
    pub network_cache: Option<u64>,
    pub publishers: Option<Vec<PublisherInfo>>,
    pub subscribers: Option<Vec<SubscriberInfo>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherInfo {
    pub stream_id: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub media_options: Option<MediaOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaOptions {
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub audio_active: bool,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub video_active: bool,
    pub type_of_video: Option<String>,
    pub frame_rate: Option<u32>,
    /// JSON-encoded `{"width":..,"height":..}` as sent by the server.
    pub video_dimensions: Option<String>,
    pub filter: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberInfo {
    pub stream_id: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// The recording object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    pub id: String,
    pub name: String,
    pub output_mode: OutputMode,
    pub has_audio: bool,
    pub has_video: bool,
    pub resolution: Option<String>,
    pub frame_rate: Option<u32>,
    pub recording_layout: Option<RecordingLayout>,
    pub custom_layout: Option<String>,
    pub session_id: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Bytes.
    pub size: u64,
    /// Seconds.
    pub duration: f64,
    /// Only set once the recording is ready.
    pub url: Option<String>,
    pub status: RecordingStatus,
}

// ── shared request/response pieces ───────────────────────────────────────

/// Recording parameters, used both as the session's default recording
/// properties and as the body of `POST recordings/start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_video: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<OutputMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_layout: Option<RecordingLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_layout: Option<String>,
    /// `WIDTHxHEIGHT`, e.g. `1280x720`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<u32>,
    /// Shared memory for the composing container, in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_failed_streams: Option<bool>,
}

impl RecordingProperties {
    /// Fill every unset field with the defaults used when starting a
    /// recording: audio and video on, individual streams at 640x480 @ 25fps,
    /// failed streams ignored.
    pub fn or_start_defaults(self) -> Self {
        Self {
            has_audio: self.has_audio.or(Some(true)),
            has_video: self.has_video.or(Some(true)),
            output_mode: self.output_mode.or(Some(OutputMode::Individual)),
            resolution: self.resolution.or_else(|| Some("640x480".to_string())),
            frame_rate: self.frame_rate.or(Some(25)),
            ignore_failed_streams: self.ignore_failed_streams.or(Some(true)),
            ..self
        }
    }
}

/// Bandwidth limits and filters for a WebRTC connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KurentoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_max_recv_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_min_recv_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_max_send_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_min_send_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_filters: Option<Vec<String>>,
}

// ── requests ─────────────────────────────────────────────────────────────

/// `POST sessions`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_mode: Option<MediaMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_mode: Option<RecordingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_session_id: Option<String>,
    /// `VP8`, `VP9`, `H264`, `NONE` or `MEDIA_SERVER_PREFERRED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_transcoding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_recording_properties: Option<RecordingProperties>,
}

/// `POST recordings/start`
#[derive(Debug, Clone, Serialize)]
pub struct StartRecording<'a> {
    pub session: &'a str,
    #[serde(flatten)]
    pub properties: RecordingProperties,
}

/// `POST sessions/{id}/connection`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ConnectionProperties {
    #[serde(rename = "WEBRTC")]
    WebRtc(WebRtcConnectionOptions),
    #[serde(rename = "IPCAM")]
    IpCam(IpCamConnectionOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebRtcConnectionOptions {
    pub role: Role,
    /// Server data attached to the connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurento_options: Option<KurentoOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpCamConnectionOptions {
    pub rtsp_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptative_bitrate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_play_with_subscribers: Option<bool>,
    /// Milliseconds of RTSP buffering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_cache: Option<u64>,
}

impl IpCamConnectionOptions {
    pub fn new(rtsp_uri: impl Into<String>) -> Self {
        Self {
            rtsp_uri: rtsp_uri.into(),
            data: None,
            record: None,
            adaptative_bitrate: None,
            only_play_with_subscribers: None,
            network_cache: None,
        }
    }
}

/// `PATCH sessions/{id}/connection/{connectionId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
}

/// `POST signal`
#[derive(Debug, Clone, Serialize)]
pub struct Signal<'a> {
    pub session: &'a str,
    #[serde(rename = "type")]
    pub signal_type: &'a str,
    pub data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<&'a str>>,
}
