//! Client configuration – reads a KEY=VALUE file or is built in code.
//!
//! One `KEY=VALUE` per line: `#` comments, optional double quotes,
//! unknown keys ignored.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

/// Connection settings for one OpenVidu server.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://localhost:4443/openvidu/api/`.
    pub url: String,
    /// Server secret, sent as the basic-auth password.
    pub secret: String,
    /// Fetch the session listing as soon as the handle is created.
    pub initial_fetch: bool,
    /// Also fetch the recording listing during the initial fetch.
    pub fetch_recordings: bool,
    /// Timeout applied to every request. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Verify the server's TLS certificate.
    ///
    /// Turning this off accepts any certificate and any hostname, which
    /// leaves the client open to man-in-the-middle attacks. Only disable it
    /// against test servers.
    pub verify_tls: bool,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret: secret.into(),
            initial_fetch: true,
            fetch_recordings: false,
            timeout: None,
            verify_tls: true,
        }
    }

    pub fn with_initial_fetch(mut self, enabled: bool) -> Self {
        self.initial_fetch = enabled;
        self
    }

    pub fn with_fetch_recordings(mut self, enabled: bool) -> Self {
        self.fetch_recordings = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

/// Load a `KEY=VALUE` configuration file.
///
/// `OPENVIDU_URL` and `OPENVIDU_SECRET` are required; everything else
/// falls back to the [`ClientConfig::new`] defaults.
pub fn load(path: &Path) -> Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let config = parse(&text).with_context(|| format!("Invalid config: {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Build a [`ClientConfig`] from the text of a configuration file.
pub fn parse(text: &str) -> Result<ClientConfig> {
    let map = parse_conf(text);

    let get = |key: &str| -> Option<String> { map.get(key).cloned().filter(|v| !v.is_empty()) };
    let get_bool = |key: &str, default: bool| -> bool {
        get(key)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
            .unwrap_or(default)
    };

    let url = get("OPENVIDU_URL").context("OPENVIDU_URL is not set")?;
    let secret = get("OPENVIDU_SECRET").context("OPENVIDU_SECRET is not set")?;

    let timeout = match get("REQUEST_TIMEOUT_SECS") {
        Some(v) => {
            let secs: f64 = v
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {v}"))?;
            if secs <= 0.0 {
                anyhow::bail!("REQUEST_TIMEOUT_SECS must be positive, got {v}");
            }
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is out of range: {v}"))?;
            Some(timeout)
        }
        None => None,
    };

    Ok(ClientConfig {
        url,
        secret,
        initial_fetch: get_bool("INITIAL_FETCH", true),
        fetch_recordings: get_bool("FETCH_RECORDINGS", false),
        timeout,
        verify_tls: get_bool("VERIFY_TLS", true),
    })
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────
