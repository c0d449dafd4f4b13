//! Scripted in-memory transport and message fixtures.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use mailsift::{MailConfig, MailTransport, TransportError};
use mailsift::SeqNum;

/// One protocol command as seen by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Select(String),
    SearchAll,
    Fetch(u32),
    CloseMailbox,
    Logout,
    /// The transport value was dropped (connection released).
    Released,
}

/// Shared view of the commands a [`FakeTransport`] received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }
}

/// A mailbox server that answers from a fixed script.
#[derive(Debug)]
pub struct FakeTransport {
    log: CallLog,
    password: String,
    folders: Vec<String>,
    messages: Vec<Bytes>,
    fail_search: bool,
    fail_fetch: Option<u32>,
    fail_logout: bool,
}

impl FakeTransport {
    /// Accepts password `secret`, has an INBOX holding `messages` (sequence
    /// numbers start at 1).
    pub fn new(messages: Vec<Vec<u8>>) -> Self {
        Self {
            log: CallLog::default(),
            password: "secret".to_string(),
            folders: vec!["INBOX".to_string()],
            messages: messages.into_iter().map(Bytes::from).collect(),
            fail_search: false,
            fail_fetch: None,
            fail_logout: false,
        }
    }

    pub fn with_folder(mut self, folder: &str) -> Self {
        self.folders.push(folder.to_string());
        self
    }

    pub const fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub const fn failing_fetch(mut self, seq: u32) -> Self {
        self.fail_fetch = Some(seq);
        self
    }

    pub const fn failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl MailTransport for FakeTransport {
    async fn login(&mut self, username: &str, password: &str) -> Result<(), TransportError> {
        self.log.push(Call::Login(username.to_string()));
        if password == self.password {
            Ok(())
        } else {
            Err(TransportError::No(
                "[AUTHENTICATIONFAILED] Invalid credentials".to_string(),
            ))
        }
    }

    async fn select(&mut self, folder: &str) -> Result<(), TransportError> {
        self.log.push(Call::Select(folder.to_string()));
        if self.folders.iter().any(|f| f == folder) {
            Ok(())
        } else {
            Err(TransportError::No("[NONEXISTENT] No such mailbox".to_string()))
        }
    }

    async fn search_all(&mut self) -> Result<Vec<SeqNum>, TransportError> {
        self.log.push(Call::SearchAll);
        if self.fail_search {
            return Err(TransportError::Bad("SEARCH not allowed".to_string()));
        }
        let count = u32::try_from(self.messages.len()).unwrap();
        Ok((1..=count).filter_map(SeqNum::new).collect())
    }

    async fn fetch_message(&mut self, seq: SeqNum) -> Result<Bytes, TransportError> {
        self.log.push(Call::Fetch(seq.get()));
        if self.fail_fetch == Some(seq.get()) {
            return Err(TransportError::No("message unavailable".to_string()));
        }
        Ok(self.messages[seq.get() as usize - 1].clone())
    }

    async fn close_mailbox(&mut self) -> Result<(), TransportError> {
        self.log.push(Call::CloseMailbox);
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        self.log.push(Call::Logout);
        if self.fail_logout {
            Err(TransportError::Bye("server going away".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        self.log.push(Call::Released);
    }
}

pub fn config() -> MailConfig {
    MailConfig::new("imap.test", "felix", "secret")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A multipart message with a text body and one base64 attachment per
/// `(filename, payload)` pair.
pub fn message_with(attachments: &[(&str, &str)]) -> Vec<u8> {
    use std::fmt::Write as _;

    let mut raw = String::from(
        "From: sender@example.com\r\n\
         To: felix@example.com\r\n\
         Subject: attachments\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"==sep==\"\r\n\
         \r\n\
         --==sep==\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         See attached.\r\n",
    );
    for (filename, payload) in attachments {
        write!(
            raw,
            "--==sep==\r\n\
             Content-Type: application/octet-stream; name=\"{filename}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"{filename}\"\r\n\
             \r\n\
             {}\r\n",
            STANDARD.encode(payload)
        )
        .unwrap();
    }
    raw.push_str("--==sep==--\r\n");
    raw.into_bytes()
}

/// A message with no attachments at all.
pub fn plain_message() -> Vec<u8> {
    b"Subject: hello\r\nContent-Type: text/plain\r\n\r\nNothing attached.\r\n".to_vec()
}
