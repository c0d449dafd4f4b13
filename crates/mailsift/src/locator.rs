//! Finds matching attachments in a folder.

use mailsift_imap::SeqNum;
use mailsift_mime::Part;

use crate::matcher::MatchTarget;
use crate::transport::MailTransport;
use crate::{Error, Result};

/// A matched attachment: its decoded filename and payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename as decoded from the part headers.
    pub filename: String,
    /// Payload with the transfer encoding removed.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Splits into `(filename, data)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.filename, self.data)
    }
}

/// How much of the folder a lookup needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Every match in every message, oldest message first.
    All,
    /// Every match of the newest message that has any.
    Latest,
}

/// Opens `folder`, lists every message and collects the attachments whose
/// filename satisfies `target`.
///
/// Messages are fetched one at a time. The first failing fetch aborts the
/// lookup.
pub(crate) async fn locate<T: MailTransport>(
    transport: &mut T,
    folder: &str,
    target: &MatchTarget,
    scope: Scope,
) -> Result<Vec<Attachment>> {
    let mut messages = open_folder(transport, folder).await?;
    if scope == Scope::Latest {
        messages.reverse();
    }

    let mut found = Vec::new();
    for seq in messages {
        let raw = fetch(transport, seq).await?;
        let matched = extract_attachments(&raw, target, None)?;
        if !matched.is_empty() {
            tracing::debug!(%seq, matched = matched.len(), "Message has matching attachments");
        }
        found.extend(matched);

        if scope == Scope::Latest && !found.is_empty() {
            break;
        }
    }

    Ok(found)
}

/// Whether any message in `folder` has an attachment whose filename
/// satisfies `target`.
///
/// Matches on the filename alone, so a payload that would not decode still
/// counts. Stops fetching at the first match.
pub(crate) async fn contains<T: MailTransport>(
    transport: &mut T,
    folder: &str,
    target: &MatchTarget,
) -> Result<bool> {
    for seq in open_folder(transport, folder).await? {
        let raw = fetch(transport, seq).await?;
        if let Some(filename) = first_matching_filename(&raw, target) {
            tracing::debug!(%seq, filename, "Attachment matched");
            return Ok(true);
        }
    }
    Ok(false)
}

async fn open_folder<T: MailTransport>(transport: &mut T, folder: &str) -> Result<Vec<SeqNum>> {
    transport
        .select(folder)
        .await
        .map_err(|source| Error::Folder {
            folder: folder.to_string(),
            source,
        })?;

    let messages = transport.search_all().await.map_err(Error::Search)?;
    tracing::debug!(folder, count = messages.len(), "Messages to inspect");
    Ok(messages)
}

async fn fetch<T: MailTransport>(transport: &mut T, seq: SeqNum) -> Result<bytes::Bytes> {
    transport
        .fetch_message(seq)
        .await
        .map_err(|source| Error::Fetch {
            seq: seq.get(),
            source,
        })
}

/// Collects the matching attachments of one raw message in part order.
///
/// A part counts when its disposition is `attachment` and its decoded
/// filename satisfies `target`. Stops after `limit` matches when given.
///
/// # Errors
///
/// Returns [`Error::Decode`] if a matching part's transfer encoding is
/// malformed.
pub fn extract_attachments(
    raw: &[u8],
    target: &MatchTarget,
    limit: Option<usize>,
) -> Result<Vec<Attachment>> {
    let message = Part::parse(raw);
    let mut found = Vec::new();

    for (filename, part) in matching_parts(&message, target) {
        if limit.is_some_and(|l| found.len() >= l) {
            break;
        }
        let data = part.decoded_payload().map_err(|source| Error::Decode {
            filename: filename.clone(),
            source,
        })?;
        tracing::debug!(filename, bytes = data.len(), "Attachment matched");
        found.push(Attachment { filename, data });
    }

    Ok(found)
}

/// The filename of the first matching attachment of one raw message.
///
/// Payloads are never decoded.
#[must_use]
pub fn first_matching_filename(raw: &[u8], target: &MatchTarget) -> Option<String> {
    let message = Part::parse(raw);
    matching_parts(&message, target)
        .next()
        .map(|(filename, _)| filename)
}

fn matching_parts<'a>(
    message: &'a Part,
    target: &'a MatchTarget,
) -> impl Iterator<Item = (String, &'a Part)> + 'a {
    message
        .walk()
        .filter(|part| part.is_attachment())
        .filter_map(|part| part.filename().map(|filename| (filename, part)))
        .filter(move |(filename, _)| target.matches(filename))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TWO_CSVS: &[u8] = b"Content-Type: multipart/mixed; boundary=b\r\n\r\n\
--b\r\n\
Content-Type: text/plain\r\n\r\nbody\r\n\
--b\r\n\
Content-Disposition: attachment; filename=test1.csv\r\n\
Content-Transfer-Encoding: base64\r\n\r\nSWQsTmFtZQoxLEZlbGl4\r\n\
--b\r\n\
Content-Disposition: inline; filename=test2.csv\r\n\r\ninline\r\n\
--b\r\n\
Content-Disposition: attachment; filename=test3.csv\r\n\r\nthree\r\n\
--b--\r\n";

    #[test]
    fn test_exact_match() {
        let found = extract_attachments(TWO_CSVS, &MatchTarget::exact("test1.csv"), None).unwrap();
        assert_eq!(found, [Attachment::new("test1.csv", "Id,Name\n1,Felix")]);
    }

    #[test]
    fn test_inline_parts_ignored() {
        let found = extract_attachments(TWO_CSVS, &MatchTarget::exact("test2.csv"), None).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_pattern_keeps_part_order() {
        let target = MatchTarget::pattern(r"test\d\.csv").unwrap();
        let names: Vec<String> = extract_attachments(TWO_CSVS, &target, None)
            .unwrap()
            .into_iter()
            .map(|a| a.filename)
            .collect();
        assert_eq!(names, ["test1.csv", "test3.csv"]);
    }

    #[test]
    fn test_limit() {
        let target = MatchTarget::pattern(r"\.csv$").unwrap();
        let found = extract_attachments(TWO_CSVS, &target, Some(1)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "test1.csv");
    }

    #[test]
    fn test_undecodable_match_is_error() {
        let raw = b"Content-Disposition: attachment; filename=bad.bin\r\n\
Content-Transfer-Encoding: base64\r\n\r\n***\r\n";
        let err = extract_attachments(raw, &MatchTarget::exact("bad.bin"), None).unwrap_err();
        assert!(matches!(err, Error::Decode { filename, .. } if filename == "bad.bin"));
    }

    #[test]
    fn test_undecodable_non_match_is_skipped() {
        let raw = b"Content-Disposition: attachment; filename=bad.bin\r\n\
Content-Transfer-Encoding: base64\r\n\r\n***\r\n";
        let found = extract_attachments(raw, &MatchTarget::exact("other"), None).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_first_matching_filename_skips_decoding() {
        let raw = b"Content-Disposition: attachment; filename=bad.bin\r\n\
Content-Transfer-Encoding: base64\r\n\r\n***\r\n";
        assert_eq!(
            first_matching_filename(raw, &MatchTarget::exact("bad.bin")).as_deref(),
            Some("bad.bin")
        );
        assert_eq!(first_matching_filename(raw, &MatchTarget::exact("other")), None);
    }

    #[test]
    fn test_first_matching_filename_in_part_order() {
        let target = MatchTarget::pattern(r"\.csv$").unwrap();
        assert_eq!(
            first_matching_filename(TWO_CSVS, &target).as_deref(),
            Some("test1.csv")
        );
    }

    #[test]
    fn test_attachment_without_name_is_skipped() {
        let raw = b"Content-Disposition: attachment\r\n\r\ndata";
        let target = MatchTarget::pattern("").unwrap();
        assert!(extract_attachments(raw, &target, None).unwrap().is_empty());
    }
}
