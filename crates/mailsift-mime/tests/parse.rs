//! Attachment discovery over realistic messages.

#![allow(clippy::unwrap_used)]

use mailsift_mime::{Body, DispositionKind, Part, TransferEncoding};
use proptest::prelude::*;

fn attachment_names(raw: &[u8]) -> Vec<String> {
    Part::parse(raw)
        .walk()
        .filter(|p| p.is_attachment())
        .filter_map(Part::filename)
        .collect()
}

#[test]
fn csv_attachment_alongside_html_body() {
    let raw = b"From: reports@example.com\r\n\
To: me@example.com\r\n\
Subject: Daily report\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed;\r\n\
 boundary=\"===============0123456789==\"\r\n\
\r\n\
--===============0123456789==\r\n\
Content-Type: multipart/alternative; boundary=\"alt\"\r\n\
\r\n\
--alt\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Report attached.\r\n\
--alt\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Report attached.</p>\r\n\
--alt--\r\n\
\r\n\
--===============0123456789==\r\n\
Content-Type: text/csv; name=\"test1.csv\"\r\n\
Content-Transfer-Encoding: base64\r\n\
Content-Disposition: attachment; filename=\"test1.csv\"\r\n\
\r\n\
SWQsTmFtZQoxLEZlbGl4\r\n\
--===============0123456789==--\r\n";

    let message = Part::parse(raw);
    assert_eq!(message.walk().count(), 5);
    assert_eq!(attachment_names(raw), ["test1.csv"]);

    let csv = message.walk().find(|p| p.is_attachment()).unwrap();
    assert_eq!(csv.transfer_encoding(), TransferEncoding::Base64);
    assert_eq!(csv.decoded_payload().unwrap(), b"Id,Name\n1,Felix");
}

#[test]
fn inline_parts_are_not_attachments() {
    let raw = b"Content-Type: multipart/related; boundary=r\r\n\r\n\
--r\r\n\
Content-Type: text/html\r\n\r\n<img src=cid:logo>\r\n\
--r\r\n\
Content-Type: image/png; name=logo.png\r\n\
Content-Disposition: inline; filename=logo.png\r\n\r\nPNG\r\n\
--r--\r\n";

    let message = Part::parse(raw);
    let logo = message.walk().find(|p| p.filename().is_some()).unwrap();
    assert_eq!(
        logo.content_disposition().unwrap().kind,
        DispositionKind::Inline
    );
    assert!(attachment_names(raw).is_empty());
}

#[test]
fn rfc2231_continuations_and_encoded_words() {
    let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\r\n\
--b\r\n\
Content-Disposition: attachment;\r\n\
\tfilename*0*=UTF-8''Quartalsbericht%20;\r\n\
\tfilename*1*=%C3%BCbersicht.xlsx\r\n\r\nx\r\n\
--b\r\n\
Content-Disposition: attachment; filename=\"=?UTF-8?Q?Rechnung_M=C3=A4rz.pdf?=\"\r\n\r\ny\r\n\
--b--\r\n";

    assert_eq!(
        attachment_names(raw),
        ["Quartalsbericht übersicht.xlsx", "Rechnung März.pdf"]
    );
}

#[test]
fn forwarded_message_attachments_are_found() {
    let raw = b"Content-Type: multipart/mixed; boundary=outer\r\n\r\n\
--outer\r\n\
Content-Type: text/plain\r\n\r\nFYI\r\n\
--outer\r\n\
Content-Type: message/rfc822\r\n\
Content-Disposition: attachment; filename=\"original.eml\"\r\n\r\n\
Subject: original\r\n\
Content-Type: multipart/mixed; boundary=inner\r\n\r\n\
--inner\r\n\
Content-Disposition: attachment; filename=\"inner.txt\"\r\n\r\ninner body\r\n\
--inner--\r\n\
--outer--\r\n";

    let message = Part::parse(raw);
    assert_eq!(attachment_names(raw), ["original.eml", "inner.txt"]);

    let eml = message.walk().find(|p| p.is_attachment()).unwrap();
    assert!(matches!(eml.body(), Body::Message(_)));
    assert!(eml.decoded_payload().unwrap().starts_with(b"Subject: original"));
}

#[test]
fn truncated_message_keeps_earlier_parts() {
    let raw = b"Content-Type: multipart/mixed; boundary=t\r\n\r\n\
--t\r\n\
Content-Disposition: attachment; filename=a.txt\r\n\r\nAAA\r\n\
--t\r\n\
Content-Disposition: attachment; filename=b.txt\r\n\r\nBB";

    let message = Part::parse(raw);
    assert_eq!(attachment_names(raw), ["a.txt", "b.txt"]);
    let last = message.walk().last().unwrap();
    assert_eq!(last.decoded_payload().unwrap(), b"BB");
}

#[test]
fn single_part_attachment_message() {
    let raw = b"Content-Type: application/octet-stream\r\n\
Content-Disposition: attachment; filename=blob.bin\r\n\
Content-Transfer-Encoding: base64\r\n\r\nAAEC\r\n";
    let message = Part::parse(raw);
    assert_eq!(message.walk().count(), 1);
    assert_eq!(message.decoded_payload().unwrap(), [0, 1, 2]);
}

proptest! {
    #[test]
    fn parse_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..512)) {
        let message = Part::parse(&raw);
        for part in message.walk() {
            let _ = part.filename();
            let _ = part.decoded_payload();
        }
    }

    #[test]
    fn every_part_between_delimiters_is_found(
        bodies in proptest::collection::vec("[a-zA-Z0-9 ]{0,40}", 1..8)
    ) {
        let mut raw = b"Content-Type: multipart/mixed; boundary=SEP\r\n\r\n".to_vec();
        for (i, body) in bodies.iter().enumerate() {
            raw.extend_from_slice(
                format!("--SEP\r\nContent-Disposition: attachment; filename=f{i}.txt\r\n\r\n{body}\r\n")
                    .as_bytes(),
            );
        }
        raw.extend_from_slice(b"--SEP--\r\n");

        let message = Part::parse(&raw);
        let found: Vec<_> = message.walk().filter(|p| p.is_attachment()).collect();
        prop_assert_eq!(found.len(), bodies.len());
        for (part, body) in found.iter().zip(&bodies) {
            prop_assert_eq!(part.decoded_payload().unwrap(), body.as_bytes());
        }
    }
}
