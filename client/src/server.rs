//! Entry point: one handle per OpenVidu server.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::info;

use openvidu_common::config::ClientConfig;
use openvidu_common::protocol::{RecordingProperties, SessionProperties, StartRecording};

use crate::error::{Error, Result};
use crate::recording::Recording;
use crate::session::Session;
use crate::transport::Transport;
use crate::{take_field, upsert};

/// Cached view of the sessions and recordings of one server.
///
/// Nothing is refreshed in the background. [`ServerHandle::fetch`] and
/// [`ServerHandle::fetch_recordings`] rebuild the caches; every other
/// accessor only reads them.
#[derive(Debug)]
pub struct ServerHandle {
    transport: Transport,
    sessions: Vec<Session>,
    recordings: Vec<Recording>,
    /// Raw `content` of the last session listing.
    last_sessions: Option<Value>,
    /// Raw `items` of the last recording listing.
    last_recordings: Option<Value>,
}

impl ServerHandle {
    /// Connect to a server.
    ///
    /// Unless `initial_fetch` is disabled the session listing (and, with
    /// `fetch_recordings`, the recording listing) is loaded right away.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut handle = Self {
            transport: Transport::new(config)?,
            sessions: Vec::new(),
            recordings: Vec::new(),
            last_sessions: None,
            last_recordings: None,
        };

        if config.initial_fetch {
            handle.fetch()?;
            if config.fetch_recordings {
                handle.fetch_recordings()?;
            }
        }

        Ok(handle)
    }

    pub fn url(&self) -> &str {
        self.transport.base_url().as_str()
    }

    /// Reload the session listing.
    ///
    /// If the listing differs from the previous one in any way the whole
    /// session cache is rebuilt from fresh [`Session`] objects and `true` is
    /// returned. Otherwise the cache is left alone.
    pub fn fetch(&mut self) -> Result<bool> {
        let payload = self.transport.get(&["sessions"])?.error_for_status()?.json()?;
        let content = take_field(payload, "content")?;

        if self.last_sessions.as_ref() == Some(&content) {
            return Ok(false);
        }

        let items: Vec<Value> = serde_json::from_value(content.clone())?;
        let sessions = items
            .into_iter()
            .map(|item| Session::from_payload(self.transport.clone(), item))
            .collect::<Result<Vec<_>>>()?;

        info!("Session listing changed, {} session(s)", sessions.len());
        self.sessions = sessions;
        self.last_sessions = Some(content);
        Ok(true)
    }

    /// Create a session on the server and add it to the cache.
    pub fn create_session(&mut self, properties: &SessionProperties) -> Result<&mut Session> {
        let reply = self.transport.post(&["sessions"], properties)?;
        match reply.status() {
            StatusCode::CONFLICT => return Err(Error::SessionAlreadyExists),
            StatusCode::BAD_REQUEST => {
                return Err(Error::InvalidArgument(
                    "server rejected session properties".to_string(),
                ))
            }
            _ => {}
        }
        let payload = reply.error_for_status()?.json()?;

        let session = Session::from_payload(self.transport.clone(), payload)?;
        info!("Session {} created", session.id());
        Ok(upsert(&mut self.sessions, session, Session::id))
    }

    /// A cached, still valid session.
    pub fn get_session(&self, session_id: &str) -> Result<&Session> {
        self.sessions
            .iter()
            .find(|s| s.id() == session_id && s.is_valid())
            .ok_or(Error::SessionNotFound)
    }

    pub fn get_session_mut(&mut self, session_id: &str) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id() == session_id && s.is_valid())
            .ok_or(Error::SessionNotFound)
    }

    /// Valid sessions, in listing order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_valid())
    }

    pub fn session_count(&self) -> usize {
        self.sessions().count()
    }

    /// The server's active configuration, exactly as reported. Never cached.
    pub fn get_config(&self) -> Result<Value> {
        self.transport.get(&["config"])?.error_for_status()?.json()
    }

    /// Start recording a cached session.
    ///
    /// Unset `properties` fall back to audio + video, individual output,
    /// 640x480 at 25fps with failed streams ignored.
    pub fn create_recording(
        &mut self,
        session_id: &str,
        properties: RecordingProperties,
    ) -> Result<&mut Recording> {
        self.get_session(session_id)?;

        let body = StartRecording {
            session: session_id,
            properties: properties.or_start_defaults(),
        };
        let reply = self.transport.post(&["recordings", "start"], &body)?;
        if reply.status() == StatusCode::NOT_FOUND {
            self.get_session_mut(session_id)?.mark_invalid();
            return Err(Error::SessionNotFound);
        }
        let payload = reply.error_for_status()?.json()?;

        let recording = Recording::from_payload(self.transport.clone(), payload)?;
        info!("Recording {} started for session {session_id}", recording.id());
        Ok(upsert(&mut self.recordings, recording, Recording::id))
    }

    /// Reload the recording listing; same rules as [`ServerHandle::fetch`].
    pub fn fetch_recordings(&mut self) -> Result<bool> {
        let payload = self.transport.get(&["recordings"])?.error_for_status()?.json()?;
        let items = take_field(payload, "items")?;

        if self.last_recordings.as_ref() == Some(&items) {
            return Ok(false);
        }

        let list: Vec<Value> = serde_json::from_value(items.clone())?;
        let recordings = list
            .into_iter()
            .map(|item| Recording::from_payload(self.transport.clone(), item))
            .collect::<Result<Vec<_>>>()?;

        info!("Recording listing changed, {} recording(s)", recordings.len());
        self.recordings = recordings;
        self.last_recordings = Some(items);
        Ok(true)
    }

    /// Valid recordings, in listing order.
    pub fn recordings(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.iter().filter(|r| r.is_valid())
    }

    pub fn recording_count(&self) -> usize {
        self.recordings().count()
    }

    pub fn get_recording(&self, recording_id: &str) -> Result<&Recording> {
        self.recordings
            .iter()
            .find(|r| r.id() == recording_id && r.is_valid())
            .ok_or(Error::RecordingNotFound)
    }

    pub fn get_recording_mut(&mut self, recording_id: &str) -> Result<&mut Recording> {
        self.recordings
            .iter_mut()
            .find(|r| r.id() == recording_id && r.is_valid())
            .ok_or(Error::RecordingNotFound)
    }

    /// Valid recordings taken from `session_id`. The session itself does
    /// not have to exist any more.
    pub fn get_session_recordings<'a>(
        &'a self,
        session_id: &'a str,
    ) -> impl Iterator<Item = &'a Recording> + 'a {
        self.recordings()
            .filter(move |r| r.session_id() == session_id)
    }
}
