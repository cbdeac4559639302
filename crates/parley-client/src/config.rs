//! Connection settings and validation.
//!
//! The connect form collects either a full server URL (tunnel mode, e.g. an
//! ngrok address) or a host/port pair, plus the profile to register.
//! Validation is field-presence only; anything present after trimming is
//! accepted and left to the transport to reject.

use crate::error::ClientError;

/// How the endpoint URL is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    /// Full externally-provided URL (tunnel address).
    #[default]
    Ngrok,
    /// Host and port composed into an HTTP-scheme URL.
    Local,
}

/// Validated-on-connect settings for one connection attempt.
///
/// All fields are kept as entered; [`ConnectConfig::validate`] trims before
/// checking presence and [`ConnectConfig::endpoint_url`] trims before
/// composing, so surrounding whitespace never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectConfig {
    /// Selected connection mode.
    pub mode: ConnectMode,
    /// Server URL (Ngrok mode).
    pub url: String,
    /// Server host (Local mode).
    pub host: String,
    /// Server port (Local mode).
    pub port: String,
    /// Display name to register.
    pub username: String,
    /// Profile photo as a base64 blob. Optional.
    pub profile_photo: Option<String>,
}

impl ConnectConfig {
    /// Check field presence for the selected mode.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidConfig`] with a user-facing message naming the
    /// required fields. The message is static per mode, matching the
    /// grouped check the connect form presents.
    pub fn validate(&self) -> Result<(), ClientError> {
        let valid = match self.mode {
            ConnectMode::Ngrok => {
                !self.url.trim().is_empty() && !self.username.trim().is_empty()
            },
            ConnectMode::Local => {
                !self.host.trim().is_empty()
                    && !self.port.trim().is_empty()
                    && !self.username.trim().is_empty()
            },
        };

        if valid {
            Ok(())
        } else {
            let reason = match self.mode {
                ConnectMode::Ngrok => "fill in all fields (server URL and username)",
                ConnectMode::Local => "fill in all fields (host, port, and username)",
            };
            Err(ClientError::InvalidConfig { reason: reason.to_string() })
        }
    }

    /// Endpoint URL for the selected mode.
    ///
    /// Ngrok mode uses the URL verbatim; Local mode composes
    /// `http://{host}:{port}`. The transport maps HTTP schemes onto
    /// WebSocket schemes when dialing.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        match self.mode {
            ConnectMode::Ngrok => self.url.trim().to_string(),
            ConnectMode::Local => {
                format!("http://{}:{}", self.host.trim(), self.port.trim())
            },
        }
    }

    /// Username with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed_username(&self) -> &str {
        self.username.trim()
    }
}
