//! Implementation for the not-authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, NotAuthenticated};
use super::{Client, Transition};
use crate::command::{Command, TagGenerator};
use crate::connection::config::{Config, DEFAULT_IO_TIMEOUT, Security};
use crate::connection::framed::FramedStream;
use crate::connection::stream::{self, ImapStream};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode};
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client from a connected stream by reading the greeting.
    ///
    /// A `BYE` greeting means the server refuses the connection.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);
        let greeting = ResponseParser::parse(&framed.read_response().await?)?;

        let capabilities = match greeting {
            Response::Untagged(
                UntaggedResponse::Ok { code, .. } | UntaggedResponse::PreAuth { code, .. },
            ) => match code {
                Some(ResponseCode::Capability(caps)) => caps,
                _ => Vec::new(),
            },
            Response::Untagged(UntaggedResponse::Bye { text, .. }) => return Err(Error::Bye(text)),
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        };

        Ok(Self {
            stream: framed,
            tags: TagGenerator::default(),
            capabilities,
            io_timeout: DEFAULT_IO_TIMEOUT,
            state: NotAuthenticated,
        })
    }

    /// Logs in with a username and password.
    ///
    /// On failure the unauthenticated client is handed back with the error.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Transition<Client<S, Authenticated>, Self> {
        if self.login_disabled() {
            return Err((
                Error::InvalidState("server advertises LOGINDISABLED".to_string()),
                self,
            ));
        }

        let command = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.execute(&command).await {
            Ok(responses) => {
                self.absorb_capabilities(&responses);
                Ok(self.transition(Authenticated))
            }
            Err(err) => Err((err, self)),
        }
    }
}

impl Client<ImapStream, NotAuthenticated> {
    /// Connects according to `config` and reads the greeting.
    ///
    /// With [`Security::StartTls`] the connection is upgraded before this
    /// returns, so `login` never sends credentials in the clear.
    pub async fn connect(config: &Config) -> Result<Self> {
        let tls = config.security == Security::Implicit;
        let stream =
            stream::connect(&config.host, config.port, tls, config.connect_timeout).await?;

        let client = tokio::time::timeout(config.connect_timeout, Self::from_stream(stream))
            .await
            .map_err(|_| Error::Timeout(config.connect_timeout))??
            .with_io_timeout(config.io_timeout);

        if config.security == Security::StartTls {
            client.starttls(&config.host).await
        } else {
            Ok(client)
        }
    }

    /// Upgrades the connection with STARTTLS.
    ///
    /// Capabilities are discarded and re-queried over the encrypted channel.
    pub async fn starttls(mut self, host: &str) -> Result<Self> {
        if !self.has_capability(&Capability::StartTls) {
            self.capability().await?;
        }
        if !self.has_capability(&Capability::StartTls) {
            return Err(Error::InvalidState(
                "server does not support STARTTLS".to_string(),
            ));
        }

        self.execute(&Command::StartTls).await?;

        let stream = self.stream.into_inner().upgrade_to_tls(host).await?;
        let mut client = Self {
            stream: FramedStream::new(stream),
            tags: self.tags,
            capabilities: Vec::new(),
            io_timeout: self.io_timeout,
            state: NotAuthenticated,
        };
        client.capability().await?;
        Ok(client)
    }
}
