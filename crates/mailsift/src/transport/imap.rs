//! [`MailTransport`] over the type-state IMAP client.

use std::mem;

use bytes::Bytes;
use mailsift_imap::{
    Authenticated, Client, Config, Error, FetchItem, FetchItems, ImapStream, NotAuthenticated,
    SearchCriteria, Selected, SeqNum, SequenceSet,
};
use tokio::io::{AsyncRead, AsyncWrite};

use super::{MailTransport, TransportError};

/// Where the underlying client is in the IMAP state machine.
enum State<S> {
    /// Logged out or never connected.
    Disconnected,
    /// Greeting read, not logged in.
    Connected(Client<S, NotAuthenticated>),
    /// Logged in.
    Authenticated(Client<S, Authenticated>),
    /// Folder open.
    Selected(Client<S, Selected>),
}

/// IMAP implementation of [`MailTransport`].
///
/// Folders are opened with EXAMINE and messages fetched with `BODY.PEEK[]`,
/// so nothing done through this transport changes the mailbox.
pub struct ImapTransport<S = ImapStream> {
    state: State<S>,
}

impl ImapTransport<ImapStream> {
    /// Connects and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable, the TLS handshake fails,
    /// the server greets with BYE, or the timeout elapses.
    pub async fn connect(config: &Config) -> Result<Self, TransportError> {
        let client = Client::connect(config).await?;
        Ok(Self::from_client(client))
    }
}

impl<S> ImapTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a client that has read the greeting.
    #[must_use]
    pub const fn from_client(client: Client<S, NotAuthenticated>) -> Self {
        Self {
            state: State::Connected(client),
        }
    }

    /// Whether a connection is held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self.state, State::Disconnected)
    }

    fn selected(&mut self) -> Result<&mut Client<S, Selected>, TransportError> {
        match &mut self.state {
            State::Selected(client) => Ok(client),
            _ => Err(Error::InvalidState("no folder is open".to_string())),
        }
    }
}

impl<S> MailTransport for ImapTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn login(&mut self, username: &str, password: &str) -> Result<(), TransportError> {
        let State::Connected(client) = mem::replace(&mut self.state, State::Disconnected) else {
            return Err(Error::InvalidState("already logged in".to_string()));
        };
        match client.login(username, password).await {
            Ok(authenticated) => {
                self.state = State::Authenticated(authenticated);
                Ok(())
            }
            Err((err, client)) => {
                self.state = State::Connected(client);
                Err(err)
            }
        }
    }

    async fn select(&mut self, folder: &str) -> Result<(), TransportError> {
        let client = match mem::replace(&mut self.state, State::Disconnected) {
            State::Authenticated(client) => client,
            State::Selected(client) => match client.close().await {
                Ok(client) => client,
                Err((err, client)) => {
                    self.state = State::Selected(client);
                    return Err(err);
                }
            },
            other => {
                self.state = other;
                return Err(Error::InvalidState("not logged in".to_string()));
            }
        };
        match client.examine(folder).await {
            Ok((selected, status)) => {
                tracing::debug!(folder, exists = status.exists, "Folder opened");
                self.state = State::Selected(selected);
                Ok(())
            }
            Err((err, client)) => {
                self.state = State::Authenticated(client);
                Err(err)
            }
        }
    }

    async fn search_all(&mut self) -> Result<Vec<SeqNum>, TransportError> {
        self.selected()?.search(&SearchCriteria::All).await
    }

    async fn fetch_message(&mut self, seq: SeqNum) -> Result<Bytes, TransportError> {
        let fetched = self
            .selected()?
            .fetch(&SequenceSet::from(seq), &FetchItems::full_message())
            .await?;

        fetched
            .into_iter()
            .filter(|(n, _)| *n == seq)
            .flat_map(|(_, items)| items)
            .find_map(|item| match item {
                FetchItem::Body {
                    section: None,
                    data: Some(data),
                    ..
                } => Some(data),
                _ => None,
            })
            .ok_or_else(|| Error::Protocol(format!("server returned no body for message {seq}")))
    }

    async fn close_mailbox(&mut self) -> Result<(), TransportError> {
        match mem::replace(&mut self.state, State::Disconnected) {
            State::Selected(client) => match client.close().await {
                Ok(client) => {
                    self.state = State::Authenticated(client);
                    Ok(())
                }
                Err((err, client)) => {
                    self.state = State::Selected(client);
                    Err(err)
                }
            },
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        match mem::replace(&mut self.state, State::Disconnected) {
            State::Connected(client) => client.logout().await,
            State::Authenticated(client) => client.logout().await,
            State::Selected(client) => client.logout().await,
            State::Disconnected => Ok(()),
        }
    }
}

impl<S> std::fmt::Debug for ImapTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Disconnected => "disconnected",
            State::Connected(_) => "connected",
            State::Authenticated(_) => "authenticated",
            State::Selected(_) => "selected",
        };
        f.debug_struct("ImapTransport")
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    async fn transport(mock: tokio_test::io::Mock) -> ImapTransport<tokio_test::io::Mock> {
        ImapTransport::from_client(Client::from_stream(mock).await.unwrap())
    }

    fn seq(n: u32) -> SeqNum {
        SeqNum::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_full_round() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN user pass\r\n")
            .read(b"A0000 OK logged in\r\n")
            .write(b"A0001 EXAMINE INBOX\r\n")
            .read(b"* 2 EXISTS\r\nA0001 OK [READ-ONLY] done\r\n")
            .write(b"A0002 SEARCH ALL\r\n")
            .read(b"* SEARCH 2 1\r\nA0002 OK done\r\n")
            .write(b"A0003 FETCH 2 BODY.PEEK[]\r\n")
            .read(b"* 2 FETCH (BODY[] {5}\r\nhello)\r\nA0003 OK done\r\n")
            .write(b"A0004 CLOSE\r\n")
            .read(b"A0004 OK closed\r\n")
            .write(b"A0005 LOGOUT\r\n")
            .read(b"* BYE logging out\r\nA0005 OK bye\r\n")
            .build();

        let mut transport = transport(mock).await;
        transport.login("user", "pass").await.unwrap();
        transport.select("INBOX").await.unwrap();
        assert_eq!(transport.search_all().await.unwrap(), [seq(1), seq(2)]);
        assert_eq!(transport.fetch_message(seq(2)).await.unwrap().as_ref(), b"hello");
        transport.close_mailbox().await.unwrap();
        transport.logout().await.unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_connection() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN user wrong\r\n")
            .read(b"A0000 NO [AUTHENTICATIONFAILED] nope\r\n")
            .write(b"A0001 LOGOUT\r\n")
            .read(b"A0001 OK bye\r\n")
            .build();

        let mut transport = transport(mock).await;
        let err = transport.login("user", "wrong").await.unwrap_err();
        assert!(err.is_rejection());
        assert!(transport.is_connected());
        transport.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_examine_stays_authenticated() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 EXAMINE Nope\r\n")
            .read(b"A0001 NO [NONEXISTENT] no such folder\r\n")
            .write(b"A0002 EXAMINE INBOX\r\n")
            .read(b"A0002 OK done\r\n")
            .build();

        let mut transport = transport(mock).await;
        transport.login("u", "p").await.unwrap();
        assert!(transport.select("Nope").await.is_err());
        transport.select("INBOX").await.unwrap();
    }

    #[tokio::test]
    async fn test_reselect_closes_first() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 EXAMINE INBOX\r\n")
            .read(b"A0001 OK done\r\n")
            .write(b"A0002 CLOSE\r\n")
            .read(b"A0002 OK done\r\n")
            .write(b"A0003 EXAMINE Archive\r\n")
            .read(b"A0003 OK done\r\n")
            .build();

        let mut transport = transport(mock).await;
        transport.login("u", "p").await.unwrap();
        transport.select("INBOX").await.unwrap();
        transport.select("Archive").await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_without_body_is_protocol_error() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 EXAMINE INBOX\r\n")
            .read(b"A0001 OK done\r\n")
            .write(b"A0002 FETCH 1 BODY.PEEK[]\r\n")
            .read(b"* 1 FETCH (FLAGS (\\Seen))\r\nA0002 OK done\r\n")
            .build();

        let mut transport = transport(mock).await;
        transport.login("u", "p").await.unwrap();
        transport.select("INBOX").await.unwrap();
        let err = transport.fetch_message(seq(1)).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_search_before_select_is_invalid_state() {
        let mock = Builder::new().read(b"* OK ready\r\n").build();
        let mut transport = transport(mock).await;
        let err = transport.search_all().await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }
}
