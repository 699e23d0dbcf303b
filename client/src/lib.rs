//! Blocking client for the OpenVidu REST API.
//!
//! A [`ServerHandle`] caches the server's sessions and recordings. Sessions
//! own their [`Connection`]s, connections own their [`Publisher`] and
//! [`Subscriber`] snapshots. Every cached object can be refreshed with
//! `fetch()`, which reports whether anything changed, and turns invalid for
//! good once the server says the resource is gone.
//!
//! ```no_run
//! use openvidu_client::{ClientConfig, ServerHandle};
//!
//! let config = ClientConfig::new("https://localhost:4443/openvidu/api/", "MY_SECRET");
//! let mut server = ServerHandle::new(&config)?;
//! for session in server.sessions() {
//!     println!("{}: {} connection(s)", session.id(), session.connection_count());
//! }
//! server.fetch()?;
//! # Ok::<(), openvidu_client::Error>(())
//! ```

mod connection;
mod error;
mod recording;
mod server;
mod session;
mod stream;
mod transport;

pub use connection::Connection;
pub use error::{Error, Result};
pub use recording::Recording;
pub use server::ServerHandle;
pub use session::Session;
pub use stream::{Publisher, Subscriber};

pub use openvidu_common::config::{self, ClientConfig};
pub use openvidu_common::protocol;

use serde_json::Value;

/// Move `field` out of a JSON object, failing if it is missing.
pub(crate) fn take_field(mut payload: Value, field: &'static str) -> Result<Value> {
    match payload.get_mut(field) {
        Some(value) => Ok(value.take()),
        None => Err(Error::Decode(serde::de::Error::missing_field(field))),
    }
}

/// Insert `item`, replacing an entry with the same id in place.
pub(crate) fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) -> &mut T {
    let idx = match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(idx) => {
            items[idx] = item;
            idx
        }
        None => {
            items.push(item);
            items.len() - 1
        }
    };
    &mut items[idx]
}
