//! Connection settings for a mail session.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::materializer::OverwritePolicy;
use crate::{Error, Result};

/// Folder opened when a query does not name one.
pub const DEFAULT_MAIL_FOLDER: &str = "INBOX";

/// Security/encryption mode for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption. Loopback and test servers only.
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl From<Security> for mailsift_imap::Security {
    fn from(security: Security) -> Self {
        match security {
            Security::None => Self::None,
            Security::Tls => Self::Implicit,
            Security::StartTls => Self::StartTls,
        }
    }
}

/// Mail server connection record.
///
/// Deserializes from the JSON a caller keeps for each connection:
///
/// ```
/// let config = mailsift::MailConfig::from_json(
///     r#"{"host": "imap.example.com", "username": "me", "password": "secret"}"#,
/// )
/// .unwrap();
/// assert_eq!(config.mail_folder, "INBOX");
/// assert_eq!(config.port(), 993);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    /// Server hostname.
    pub host: String,
    /// Server port; the security mode's conventional port when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Folder used when a query does not name one.
    #[serde(default = "default_mail_folder")]
    pub mail_folder: String,
    /// Seconds allowed for connecting, TLS handshake included. Zero is
    /// treated as one second.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for each command round-trip. Zero is treated as one
    /// second.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// What to do when a downloaded attachment's file already exists.
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

fn default_mail_folder() -> String {
    DEFAULT_MAIL_FOLDER.to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    30
}

const fn default_io_timeout_secs() -> u64 {
    60
}

/// Whole seconds, never below one.
const fn whole_secs(secs: u64) -> u64 {
    if secs == 0 { 1 } else { secs }
}

impl MailConfig {
    /// Creates a configuration with implicit TLS and default timeouts.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::default(),
            username: username.into(),
            password: password.into(),
            mail_folder: default_mail_folder(),
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            overwrite: OverwritePolicy::default(),
        }
    }

    /// Parses a JSON connection record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON is malformed or a required field
    /// is missing.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the default folder.
    #[must_use]
    pub fn with_mail_folder(mut self, folder: impl Into<String>) -> Self {
        self.mail_folder = folder.into();
        self
    }

    /// Sets both timeouts.
    ///
    /// Fractions of a second are dropped and anything shorter than a second
    /// becomes one second.
    #[must_use]
    pub const fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout_secs = whole_secs(connect.as_secs());
        self.io_timeout_secs = whole_secs(io.as_secs());
        self
    }

    /// Sets the overwrite policy for downloads.
    #[must_use]
    pub const fn with_overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// The port to dial.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| mailsift_imap::Security::from(self.security).default_port())
    }

    /// Builds the transport configuration.
    #[must_use]
    pub fn imap_config(&self) -> mailsift_imap::Config {
        mailsift_imap::Config::builder(self.host.clone())
            .security(self.security.into())
            .port(self.port())
            .connect_timeout(Duration::from_secs(whole_secs(self.connect_timeout_secs)))
            .io_timeout(Duration::from_secs(whole_secs(self.io_timeout_secs)))
            .build()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mail_folder", &self.mail_folder)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("io_timeout_secs", &self.io_timeout_secs)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}
