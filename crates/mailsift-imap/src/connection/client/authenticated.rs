//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, Selected};
use super::{Client, Transition};
use crate::command::Command;
use crate::parser::{Response, UntaggedResponse};
use crate::types::{Mailbox, MailboxStatus, ResponseCode};

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Opens a mailbox read-write.
    pub async fn select(
        self,
        mailbox: &str,
    ) -> Transition<(Client<S, Selected>, MailboxStatus), Self> {
        let mailbox = Mailbox::new(mailbox);
        self.open_mailbox(Command::Select { mailbox: mailbox.clone() }, mailbox)
            .await
    }

    /// Opens a mailbox read-only. Nothing done while it is open can change
    /// flags or expunge messages.
    pub async fn examine(
        self,
        mailbox: &str,
    ) -> Transition<(Client<S, Selected>, MailboxStatus), Self> {
        let mailbox = Mailbox::new(mailbox);
        self.open_mailbox(Command::Examine { mailbox: mailbox.clone() }, mailbox)
            .await
    }

    async fn open_mailbox(
        mut self,
        command: Command,
        mailbox: Mailbox,
    ) -> Transition<(Client<S, Selected>, MailboxStatus), Self> {
        let read_only = matches!(command, Command::Examine { .. });
        match self.execute(&command).await {
            Ok(responses) => {
                let mut status = parse_mailbox_status(&responses);
                status.read_only |= read_only;
                let selected = self.transition(Selected {
                    mailbox,
                    status: status.clone(),
                });
                Ok((selected, status))
            }
            Err(err) => Err((err, self)),
        }
    }
}

/// Collects the mailbox status out of SELECT/EXAMINE responses.
pub(crate) fn parse_mailbox_status(responses: &[Response]) -> MailboxStatus {
    let mut status = MailboxStatus::default();
    for response in responses {
        let code = match response {
            Response::Untagged(UntaggedResponse::Exists(n)) => {
                status.exists = *n;
                continue;
            }
            Response::Untagged(UntaggedResponse::Recent(n)) => {
                status.recent = *n;
                continue;
            }
            Response::Untagged(UntaggedResponse::Ok { code, .. }) | Response::Tagged { code, .. } => {
                code
            }
            _ => continue,
        };
        match code {
            Some(ResponseCode::UidValidity(v)) => status.uid_validity = Some(*v),
            Some(ResponseCode::UidNext(v)) => status.uid_next = Some(*v),
            Some(ResponseCode::Unseen(v)) => status.unseen = Some(*v),
            Some(ResponseCode::ReadOnly) => status.read_only = true,
            Some(ResponseCode::ReadWrite) => status.read_only = false,
            _ => {}
        }
    }
    status
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
    use tokio_test::io::Builder;

    use super::*;
    use crate::Error;
    use crate::connection::client::NotAuthenticated;
    use crate::parser::ResponseParser;

    #[test]
    fn test_parse_mailbox_status() {
        let responses: Vec<Response> = [
            &b"* 172 EXISTS\r\n"[..],
            b"* 1 RECENT\r\n",
            b"* OK [UNSEEN 12] Message 12 is first unseen\r\n",
            b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n",
            b"* OK [UIDNEXT 4392] Predicted next UID\r\n",
            b"A0002 OK [READ-ONLY] EXAMINE completed\r\n",
        ]
        .iter()
        .map(|l| ResponseParser::parse(l).unwrap())
        .collect();

        let status = parse_mailbox_status(&responses);
        assert_eq!(status.exists, 172);
        assert_eq!(status.recent, 1);
        assert_eq!(status.unseen, Some(12));
        assert_eq!(status.uid_validity, Some(3857529045));
        assert_eq!(status.uid_next, Some(4392));
        assert!(status.read_only);
    }

    #[tokio::test]
    async fn test_examine_then_rejected_select() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 SELECT Missing\r\n")
            .read(b"A0001 NO [NONEXISTENT] Unknown Mailbox\r\n")
            .write(b"A0002 EXAMINE INBOX\r\n")
            .read(b"* 2 EXISTS\r\nA0002 OK [READ-ONLY] done\r\n")
            .build();

        let client = Client::<_, NotAuthenticated>::from_stream(mock).await.unwrap();
        let client = client.login("u", "p").await.map_err(|(e, _)| e).unwrap();

        let Err((err, client)) = client.select("Missing").await else {
            panic!("select should fail");
        };
        assert!(matches!(err, Error::No(_)));

        let (selected, status) = client.examine("INBOX").await.map_err(|(e, _)| e).unwrap();
        assert_eq!(status.exists, 2);
        assert!(selected.state.is_read_only());
        assert_eq!(selected.mailbox().as_str(), "INBOX");
    }
}
