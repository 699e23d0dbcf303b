//! One conference room and the participants in it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};

use openvidu_common::protocol::{
    ConnectionList, ConnectionProperties, ConnectionUpdate, IpCamConnectionOptions, MediaMode,
    RecordingMode, RecordingProperties, SessionInfo, Signal, WebRtcConnectionOptions,
};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::upsert;
use crate::transport::Transport;

/// Local mirror of a session, owned by its [`ServerHandle`](crate::ServerHandle).
///
/// Read accessors keep working after the session became invalid so callers
/// can still inspect the last known state; every request fails with
/// [`Error::SessionNotFound`] without touching the network. Connections and
/// clones share the validity flag, so requests made through them fail the
/// same way and can invalidate the session too.
#[derive(Debug, Clone)]
pub struct Session {
    transport: Transport,
    id: String,
    state: SessionState,
    last_payload: Value,
    alive: Arc<AtomicBool>,
}

/// Everything the server reported in one response; replaced as a whole.
#[derive(Debug, Clone)]
struct SessionState {
    /// Connection list emptied, see `connections`.
    info: SessionInfo,
    connections: Vec<Connection>,
}

impl SessionState {
    fn decode(transport: &Transport, alive: &Arc<AtomicBool>, payload: &Value) -> Result<Self> {
        let mut info: SessionInfo = serde_json::from_value(payload.clone())?;
        info.connections = ConnectionList::default();

        let connections = payload
            .pointer("/connections/content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|c| {
                        Connection::from_payload(transport.clone(), &info.id, alive.clone(), c.clone())
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self { info, connections })
    }
}

impl Session {
    pub(crate) fn from_payload(transport: Transport, payload: Value) -> Result<Self> {
        let alive = Arc::new(AtomicBool::new(true));
        let state = SessionState::decode(&transport, &alive, &payload)?;
        Ok(Self {
            transport,
            id: state.info.id.clone(),
            state,
            last_payload: payload,
            alive,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `false` once the server reported the session gone.
    pub fn is_valid(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_invalid(&mut self) {
        if self.alive.swap(false, Ordering::Relaxed) {
            warn!("Session {} is gone, marking invalid", self.id);
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.state.info.created_at
    }

    pub fn media_mode(&self) -> MediaMode {
        self.state.info.media_mode
    }

    pub fn recording_mode(&self) -> RecordingMode {
        self.state.info.recording_mode
    }

    pub fn custom_session_id(&self) -> Option<&str> {
        self.state.info.custom_session_id.as_deref()
    }

    pub fn forced_video_codec(&self) -> Option<&str> {
        self.state.info.forced_video_codec.as_deref()
    }

    pub fn allow_transcoding(&self) -> Option<bool> {
        self.state.info.allow_transcoding
    }

    /// Defaults applied to recordings of this session.
    ///
    /// Older servers report them as flat fields; those are folded in here.
    pub fn default_recording_properties(&self) -> RecordingProperties {
        let info = &self.state.info;
        let mut props = info.default_recording_properties.clone().unwrap_or_default();
        props.output_mode = props.output_mode.or(info.default_output_mode);
        props.recording_layout = props.recording_layout.or(info.default_recording_layout);
        props.custom_layout = props.custom_layout.or_else(|| info.default_custom_layout.clone());
        props
    }

    /// Whether the server is recording the session right now.
    pub fn is_being_recorded(&self) -> bool {
        self.state.info.recording
    }

    /// Look up a connection of this session.
    ///
    /// Works on an invalid session as well; only the connection's own
    /// validity is checked.
    pub fn get_connection(&self, connection_id: &str) -> Result<&Connection> {
        self.state
            .connections
            .iter()
            .find(|c| c.id() == connection_id && c.is_valid())
            .ok_or(Error::ConnectionNotFound)
    }

    /// Requests made through the returned connection fail with
    /// [`Error::SessionNotFound`] once this session is invalid.
    pub fn get_connection_mut(&mut self, connection_id: &str) -> Result<&mut Connection> {
        self.state
            .connections
            .iter_mut()
            .find(|c| c.id() == connection_id && c.is_valid())
            .ok_or(Error::ConnectionNotFound)
    }

    /// Valid connections, in the order the server listed them.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.state.connections.iter().filter(|c| c.is_valid())
    }

    pub fn connection_count(&self) -> usize {
        self.connections().count()
    }

    /// Re-read the session and all of its connections from the server.
    ///
    /// On change the whole connection cache is rebuilt; previously obtained
    /// connection data is discarded. Returns `true` if anything changed.
    pub fn fetch(&mut self) -> Result<bool> {
        self.ensure_valid()?;

        let reply = self.transport.get(&["sessions", &self.id])?;
        if reply.status() == StatusCode::NOT_FOUND {
            self.mark_invalid();
            return Err(Error::SessionNotFound);
        }
        let payload = reply.error_for_status()?.json()?;

        if payload == self.last_payload {
            return Ok(false);
        }
        self.state = SessionState::decode(&self.transport, &self.alive, &payload)?;
        self.last_payload = payload;
        info!(
            "Session {} changed, {} connection(s)",
            self.id,
            self.state.connections.len()
        );
        Ok(true)
    }

    /// Close the session on the server, disconnecting every participant.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_valid()?;

        let reply = self.transport.delete(&["sessions", &self.id])?;
        if reply.status() == StatusCode::NOT_FOUND {
            self.mark_invalid();
            return Err(Error::SessionNotFound);
        }
        reply.error_for_status()?;

        info!("Session {} closed", self.id);
        self.alive.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Create a WebRTC connection; its token is what a browser joins with.
    pub fn create_webrtc_connection(
        &mut self,
        options: WebRtcConnectionOptions,
    ) -> Result<&mut Connection> {
        self.create_connection(&ConnectionProperties::WebRtc(options))
    }

    /// Publish an IP camera into the session.
    pub fn create_ipcam_connection(
        &mut self,
        options: IpCamConnectionOptions,
    ) -> Result<&mut Connection> {
        self.create_connection(&ConnectionProperties::IpCam(options))
    }

    fn create_connection(&mut self, properties: &ConnectionProperties) -> Result<&mut Connection> {
        self.ensure_valid()?;

        let reply = self
            .transport
            .post(&["sessions", &self.id, "connection"], properties)?;
        match reply.status() {
            StatusCode::NOT_FOUND => {
                self.mark_invalid();
                return Err(Error::SessionNotFound);
            }
            StatusCode::BAD_REQUEST => {
                return Err(Error::InvalidArgument(format!(
                    "server rejected connection properties for session {}",
                    self.id
                )))
            }
            _ => {}
        }
        let payload = reply.error_for_status()?.json()?;

        let connection =
            Connection::from_payload(self.transport.clone(), &self.id, self.alive.clone(), payload)?;
        info!("Connection {} created in session {}", connection.id(), self.id);
        Ok(upsert(&mut self.state.connections, connection, Connection::id))
    }

    /// Send a signal to the given connections, or to everyone when `to` is
    /// empty.
    pub fn signal(&mut self, signal_type: &str, data: &str, to: &[&str]) -> Result<()> {
        self.ensure_valid()?;

        let body = Signal {
            session: &self.id,
            signal_type,
            data,
            to: (!to.is_empty()).then(|| to.to_vec()),
        };
        let reply = self.transport.post(&["signal"], &body)?;
        match reply.status() {
            StatusCode::BAD_REQUEST => {
                return Err(Error::InvalidArgument("server rejected signal".to_string()))
            }
            StatusCode::NOT_FOUND => {
                self.mark_invalid();
                return Err(Error::SessionNotFound);
            }
            StatusCode::NOT_ACCEPTABLE => {
                self.mark_invalid();
                return Err(Error::ConnectionNotFound);
            }
            _ => {}
        }
        reply.error_for_status()?;
        Ok(())
    }

    /// Stop a published stream. Subscribers of the stream are dropped too.
    pub fn force_unpublish(&mut self, stream_id: &str) -> Result<()> {
        self.ensure_valid()?;

        let reply = self
            .transport
            .delete(&["sessions", &self.id, "stream", stream_id])?;
        match reply.status() {
            StatusCode::BAD_REQUEST => {
                self.mark_invalid();
                return Err(Error::SessionNotFound);
            }
            StatusCode::NOT_FOUND => return Err(Error::StreamNotFound),
            StatusCode::METHOD_NOT_ALLOWED => {
                return Err(Error::InvalidArgument(format!(
                    "stream {stream_id} belongs to an IP camera and cannot be unpublished"
                )))
            }
            _ => {}
        }
        reply.error_for_status()?;

        info!("Stream {stream_id} unpublished from session {}", self.id);
        Ok(())
    }

    /// Change role or record flag of one of this session's connections.
    pub fn update_connection(&mut self, connection_id: &str, update: &ConnectionUpdate) -> Result<()> {
        self.ensure_valid()?;
        self.get_connection_mut(connection_id)?.update(update)
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::SessionNotFound)
        }
    }
}
