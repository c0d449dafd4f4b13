//! Type-state IMAP client connection.
//!
//! The connection state is part of the type: `Client<S, NotAuthenticated>`
//! only offers LOGIN, `Client<S, Authenticated>` offers SELECT/EXAMINE and
//! `Client<S, Selected>` offers SEARCH, FETCH and CLOSE. LOGOUT is available
//! in every state.
//!
//! Transitions consume the client. When a transition fails the client comes
//! back in the error (see [`Transition`]) so the caller can still log out.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::config::DEFAULT_IO_TIMEOUT;
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode, Status, Tag};
use crate::{Error, Result};

/// Result of a state transition: the new client, or the error together with
/// the unchanged client.
pub type Transition<T, S> = std::result::Result<T, (Error, S)>;

/// IMAP client connection with type-state.
pub struct Client<S, State> {
    stream: FramedStream<S>,
    tags: TagGenerator,
    capabilities: Vec<Capability>,
    io_timeout: Duration,
    state: State,
}

impl<S, State: std::fmt::Debug> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tags", &self.tags)
            .field("capabilities", &self.capabilities)
            .field("io_timeout", &self.io_timeout)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Shared implementation for all states.
impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the server capabilities last seen.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Checks if the server advertised a capability.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Returns true if LOGIN is refused on this connection.
    #[must_use]
    pub fn login_disabled(&self) -> bool {
        self.has_capability(&Capability::LoginDisabled)
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Sends NOOP.
    pub async fn noop(&mut self) -> Result<()> {
        self.execute(&Command::Noop).await.map(drop)
    }

    /// Sends CAPABILITY and refreshes the stored capabilities.
    pub async fn capability(&mut self) -> Result<Vec<Capability>> {
        let responses = self.execute(&Command::Capability).await?;
        self.absorb_capabilities(&responses);
        Ok(self.capabilities.clone())
    }

    /// Logs out and shuts the connection down. Works in every state.
    pub async fn logout(mut self) -> Result<()> {
        let result = self.execute(&Command::Logout).await.map(drop);
        // Best effort; the server may already have closed its side.
        let _ = self.stream.shutdown().await;
        result
    }

    /// Sends a command and reads every response up to its completion.
    ///
    /// Returns all parsed responses, the tagged completion last, after
    /// checking that the completion is OK.
    pub(crate) async fn execute(&mut self, command: &Command) -> Result<Vec<Response>> {
        let tag = self.tags.next_tag();
        let bytes = command.serialize(&tag)?;
        tracing::trace!(tag = %tag, command = command.name(), "sending command");

        let timeout = self.io_timeout;
        let stream = &mut self.stream;
        let raw = tokio::time::timeout(timeout, async {
            stream.write_command(&bytes).await?;
            stream.read_until_tagged(&tag).await
        })
        .await
        .map_err(|_| Error::Timeout(timeout))??;

        let responses = raw
            .iter()
            .map(|r| ResponseParser::parse(r))
            .collect::<Result<Vec<_>>>()?;
        check_completion(&responses, &tag)?;
        Ok(responses)
    }

    /// Picks up capabilities from untagged CAPABILITY data or a
    /// `[CAPABILITY ...]` response code.
    fn absorb_capabilities(&mut self, responses: &[Response]) {
        for response in responses {
            match response {
                Response::Untagged(UntaggedResponse::Capability(caps))
                | Response::Untagged(UntaggedResponse::Ok {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                })
                | Response::Tagged {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                } => self.capabilities.clone_from(caps),
                _ => {}
            }
        }
    }

    /// Moves the connection into another state.
    fn transition<Next>(self, state: Next) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tags: self.tags,
            capabilities: self.capabilities,
            io_timeout: self.io_timeout,
            state,
        }
    }
}

/// Maps the tagged completion for `tag` to a result.
pub(crate) fn check_completion(responses: &[Response], tag: &Tag) -> Result<()> {
    for response in responses.iter().rev() {
        if let Response::Tagged {
            tag: resp_tag,
            status,
            text,
            ..
        } = response
            && resp_tag == tag
        {
            return match status {
                Status::Ok | Status::PreAuth => Ok(()),
                Status::No => Err(Error::No(text.clone())),
                Status::Bad => Err(Error::Bad(text.clone())),
                Status::Bye => Err(Error::Bye(text.clone())),
            };
        }
    }
    Err(Error::Protocol(format!("missing tagged response for {tag}")))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn parse_all(lines: &[&[u8]]) -> Vec<Response> {
        lines.iter().map(|l| ResponseParser::parse(l).unwrap()).collect()
    }

    #[test]
    fn test_completion_ok() {
        let responses = parse_all(&[b"* 1 EXISTS\r\n", b"A0001 OK done\r\n"]);
        assert!(check_completion(&responses, &Tag::new("A0001")).is_ok());
    }

    #[test]
    fn test_completion_no_and_bad() {
        let responses = parse_all(&[b"A0001 NO [NONEXISTENT] no such mailbox\r\n"]);
        let err = check_completion(&responses, &Tag::new("A0001")).unwrap_err();
        assert!(matches!(err, Error::No(text) if text == "no such mailbox"));

        let responses = parse_all(&[b"A0002 BAD syntax error\r\n"]);
        let err = check_completion(&responses, &Tag::new("A0002")).unwrap_err();
        assert!(matches!(err, Error::Bad(_)));
    }

    #[test]
    fn test_completion_wrong_tag() {
        let responses = parse_all(&[b"A0009 OK other\r\n"]);
        let err = check_completion(&responses, &Tag::new("A0001")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
