//! Blocking HTTP plumbing shared by every object of one server handle.
//!
//! Each request is authenticated with basic auth (`OPENVIDUAPP` + secret)
//! and resolved relative to the configured base URL.

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use openvidu_common::config::ClientConfig;

use crate::error::{Error, Result};

/// Fixed basic-auth user name of the REST API.
const USERNAME: &str = "OPENVIDUAPP";

const USER_AGENT: &str = concat!("openvidu-client/", env!("CARGO_PKG_VERSION"));

/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub(crate) struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base: Url,
    secret: String,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").field("base", &self.inner.base.as_str()).finish()
    }
}

impl Transport {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(config.url.clone()));
        }

        if !config.verify_tls {
            warn!("TLS certificate verification is disabled for {base}");
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base,
                secret: config.secret.clone(),
            }),
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.inner.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, segments: &[&str]) -> Result<Reply> {
        self.execute(Method::GET, segments, None::<&()>)
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> Result<Reply> {
        self.execute(Method::DELETE, segments, None::<&()>)
    }

    pub(crate) fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Reply> {
        self.execute(Method::POST, segments, Some(body))
    }

    pub(crate) fn patch<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Reply> {
        self.execute(Method::PATCH, segments, Some(body))
    }

    fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Reply> {
        let url = self.url(segments)?;
        let mut request: RequestBuilder = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .basic_auth(USERNAME, Some(&self.inner.secret));
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send()?;
        let status = resp.status();
        let body = resp.bytes()?.to_vec();
        debug!("{method} {url} → {status} ({} bytes)", body.len());

        Ok(Reply {
            method,
            url,
            status,
            body,
        })
    }
}

/// A fully read HTTP response.
#[derive(Debug)]
pub(crate) struct Reply {
    method: Method,
    url: Url,
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    /// Turn any non-2xx status into [`Error::Http`].
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::Http {
                method: self.method,
                url: self.url.to_string(),
                status: self.status,
            })
        }
    }

    pub(crate) fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
