//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, Selected};
use super::{Client, Transition};
use crate::command::{Command, FetchItems, SearchCriteria};
use crate::parser::{FetchItem, Response, UntaggedResponse};
use crate::types::{Mailbox, MailboxStatus, SeqNum, SequenceSet};
use crate::Result;

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// The open mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        self.state.mailbox()
    }

    /// Status reported when the mailbox was opened.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        self.state.status()
    }

    /// Searches the mailbox. Sequence numbers come back in ascending order.
    pub async fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<SeqNum>> {
        let responses = self
            .execute(&Command::Search {
                criteria: criteria.clone(),
            })
            .await?;

        let mut found: Vec<SeqNum> = responses
            .into_iter()
            .filter_map(|r| match r {
                Response::Untagged(UntaggedResponse::Search(nums)) => Some(nums),
                _ => None,
            })
            .flatten()
            .collect();
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    /// Fetches data items for a set of messages.
    ///
    /// Unsolicited FETCH responses (flag updates for other messages) are
    /// returned as well; callers pick the sequence numbers they asked for.
    pub async fn fetch(
        &mut self,
        sequence: &SequenceSet,
        items: &FetchItems,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        let responses = self
            .execute(&Command::Fetch {
                sequence: sequence.clone(),
                items: items.clone(),
            })
            .await?;

        Ok(responses
            .into_iter()
            .filter_map(|r| match r {
                Response::Untagged(UntaggedResponse::Fetch { seq, items }) => Some((seq, items)),
                _ => None,
            })
            .collect())
    }

    /// Closes the mailbox and returns to the authenticated state.
    pub async fn close(mut self) -> Transition<Client<S, Authenticated>, Self> {
        match self.execute(&Command::Close).await {
            Ok(_) => Ok(self.transition(Authenticated)),
            Err(err) => Err((err, self)),
        }
    }
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
    use crate::connection::client::NotAuthenticated;

    async fn selected(mock: tokio_test::io::Mock) -> Client<tokio_test::io::Mock, Selected> {
        let client = Client::<_, NotAuthenticated>::from_stream(mock).await.unwrap();
        let client = client.login("u", "p").await.map_err(|(e, _)| e).unwrap();
        client.examine("INBOX").await.map_err(|(e, _)| e).unwrap().0
    }

    fn prelude() -> Builder {
        let mut builder = Builder::new();
        builder
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 EXAMINE INBOX\r\n")
            .read(b"* 3 EXISTS\r\nA0001 OK [READ-ONLY] done\r\n");
        builder
    }

    #[tokio::test]
    async fn test_search_sorted() {
        let mock = prelude()
            .write(b"A0002 SEARCH ALL\r\n")
            .read(b"* SEARCH 3 1 2\r\nA0002 OK SEARCH completed\r\n")
            .build();
        let mut client = selected(mock).await;
        let found = client.search(&SearchCriteria::All).await.unwrap();
        let found: Vec<u32> = found.into_iter().map(SeqNum::get).collect();
        assert_eq!(found, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_literal_body() {
        let mock = prelude()
            .write(b"A0002 FETCH 2 BODY.PEEK[]\r\n")
            .read(b"* 2 FETCH (BODY[] {9}\r\nSubject:\n)\r\n")
            .read(b"A0002 OK FETCH completed\r\n")
            .build();
        let mut client = selected(mock).await;
        let fetched = client
            .fetch(&SequenceSet::single(2).unwrap(), &FetchItems::full_message())
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].0.get(), 2);
        assert!(matches!(
            &fetched[0].1[0],
            FetchItem::Body { data: Some(d), .. } if d.as_ref() == b"Subject:\n"
        ));
    }

    #[tokio::test]
    async fn test_close_returns_authenticated() {
        let mock = prelude()
            .write(b"A0002 CLOSE\r\n")
            .read(b"A0002 OK CLOSE completed\r\n")
            .write(b"A0003 LOGOUT\r\n")
            .read(b"* BYE\r\nA0003 OK bye\r\n")
            .build();
        let client = selected(mock).await;
        let client = client.close().await.map_err(|(e, _)| e).unwrap();
        client.logout().await.unwrap();
    }
}
