//! Recordings have their own lifecycle: they outlive the session they were
//! taken from and are stopped and deleted explicitly.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use openvidu_common::protocol::{OutputMode, RecordingInfo, RecordingLayout, RecordingStatus};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Local mirror of a recording, cached by the [`ServerHandle`](crate::ServerHandle).
#[derive(Debug, Clone)]
pub struct Recording {
    transport: Transport,
    id: String,
    info: RecordingInfo,
    last_payload: Value,
    valid: bool,
}

impl Recording {
    pub(crate) fn from_payload(transport: Transport, payload: Value) -> Result<Self> {
        let info: RecordingInfo = serde_json::from_value(payload.clone())?;
        Ok(Self {
            transport,
            id: info.id.clone(),
            info,
            last_payload: payload,
            valid: true,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `false` once the server reported the recording gone.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn mark_invalid(&mut self) {
        if self.valid {
            warn!("Recording {} is gone, marking invalid", self.id);
        }
        self.valid = false;
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Session the recording was taken from. The session may no longer exist.
    pub fn session_id(&self) -> &str {
        &self.info.session_id
    }

    pub fn output_mode(&self) -> OutputMode {
        self.info.output_mode
    }

    pub fn has_audio(&self) -> bool {
        self.info.has_audio
    }

    pub fn has_video(&self) -> bool {
        self.info.has_video
    }

    pub fn resolution(&self) -> Option<&str> {
        self.info.resolution.as_deref()
    }

    pub fn frame_rate(&self) -> Option<u32> {
        self.info.frame_rate
    }

    pub fn recording_layout(&self) -> Option<RecordingLayout> {
        self.info.recording_layout
    }

    pub fn custom_layout(&self) -> Option<&str> {
        self.info.custom_layout.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.info.created_at
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.info.size
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.info.duration
    }

    pub fn url(&self) -> Option<&str> {
        self.info.url.as_deref()
    }

    pub fn status(&self) -> RecordingStatus {
        self.info.status
    }

    /// Re-read the recording from the server.
    ///
    /// Returns `true` if anything changed since the last snapshot.
    pub fn fetch(&mut self) -> Result<bool> {
        self.ensure_valid()?;

        let reply = self.transport.get(&["recordings", &self.id])?;
        match reply.status() {
            StatusCode::NOT_FOUND => {
                self.mark_invalid();
                return Err(Error::RecordingNotFound);
            }
            // The server answers lookups of recordings whose session vanished
            // with 400.
            StatusCode::BAD_REQUEST => {
                self.mark_invalid();
                return Err(Error::SessionNotFound);
            }
            _ => {}
        }
        let payload = reply.error_for_status()?.json()?;

        self.replace(payload)
    }

    /// Stop a running recording.
    pub fn stop(&mut self) -> Result<()> {
        self.ensure_valid()?;

        let reply = self
            .transport
            .post(&["recordings", "stop", &self.id], &serde_json::json!({}))?;
        match reply.status() {
            StatusCode::NOT_FOUND => {
                self.mark_invalid();
                return Err(Error::RecordingNotFound);
            }
            StatusCode::NOT_ACCEPTABLE => return Err(Error::RecordingNotStarted),
            StatusCode::NOT_IMPLEMENTED => {
                self.mark_invalid();
                return Err(Error::RecordingNotEnabled);
            }
            _ => {}
        }
        let reply = reply.error_for_status()?;
        info!("Recording {} stopped", self.id);

        // The server answers with the stopped recording; an empty or odd
        // body just leaves the old snapshot in place.
        match reply.json() {
            Ok(payload) => {
                if let Err(e) = self.replace(payload) {
                    warn!("Cannot read stopped recording {}: {e}", self.id);
                }
            }
            Err(e) => debug!("Stop reply for recording {} is not JSON: {e}", self.id),
        }
        Ok(())
    }

    /// Delete the recording files. The recording must be stopped first.
    pub fn delete(&mut self) -> Result<()> {
        self.ensure_valid()?;

        let reply = self.transport.delete(&["recordings", &self.id])?;
        match reply.status() {
            StatusCode::NOT_FOUND => {
                self.mark_invalid();
                return Err(Error::RecordingNotFound);
            }
            StatusCode::CONFLICT => return Err(Error::RecordingNotStopped),
            StatusCode::NOT_IMPLEMENTED => {
                self.mark_invalid();
                return Err(Error::RecordingNotEnabled);
            }
            _ => {}
        }
        reply.error_for_status()?;

        info!("Recording {} deleted", self.id);
        self.valid = false;
        Ok(())
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::RecordingNotFound)
        }
    }

    fn replace(&mut self, payload: Value) -> Result<bool> {
        if payload == self.last_payload {
            return Ok(false);
        }
        self.info = serde_json::from_value(payload.clone())?;
        self.last_payload = payload;
        Ok(true)
    }
}
