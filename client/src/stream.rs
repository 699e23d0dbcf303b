//! Media streams of a connection: what it publishes and what it receives.
//!
//! Both are plain snapshots. They are rebuilt whenever the owning
//! [`Connection`](crate::Connection) is refreshed and have no requests of
//! their own.

use chrono::{DateTime, Utc};

use openvidu_common::protocol::{MediaOptions, PublisherInfo, SubscriberInfo};

/// A stream the connection is subscribed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    session_id: String,
    stream_id: String,
    created_at: DateTime<Utc>,
}

impl Subscriber {
    pub(crate) fn from_info(session_id: &str, info: &SubscriberInfo) -> Self {
        Self {
            session_id: session_id.to_string(),
            stream_id: info.stream_id.clone(),
            created_at: info.created_at,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A stream the connection publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Publisher {
    session_id: String,
    stream_id: String,
    created_at: DateTime<Utc>,
    media_options: Option<MediaOptions>,
}

impl Publisher {
    pub(crate) fn from_info(session_id: &str, info: &PublisherInfo) -> Self {
        Self {
            session_id: session_id.to_string(),
            stream_id: info.stream_id.clone(),
            created_at: info.created_at,
            media_options: info.media_options.clone(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Missing for IP camera streams on older servers.
    pub fn media_options(&self) -> Option<&MediaOptions> {
        self.media_options.as_ref()
    }
}
