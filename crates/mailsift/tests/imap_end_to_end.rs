//! Full stack over TCP: session, IMAP client and MIME parsing against a
//! scripted server on 127.0.0.1.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mailsift::{Attachment, Error, MailConfig, MailSession, Security, with_session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

async fn listen() -> (TcpListener, MailConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = MailConfig::new("127.0.0.1", "felix", "secret")
        .with_security(Security::None)
        .with_port(port)
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5));
    (listener, config)
}

/// Answers each expected command line with its scripted reply, then waits
/// for the client to hang up.
async fn serve(listener: TcpListener, script: Vec<(String, String)>) {
    let (socket, _) = listener.accept().await.unwrap();
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read).lines();

    write.write_all(b"* OK [CAPABILITY IMAP4rev1] ready\r\n").await.unwrap();
    for (expected, reply) in script {
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(line, expected);
        write.write_all(reply.as_bytes()).await.unwrap();
    }
    assert!(lines.next_line().await.unwrap().is_none());
}

fn csv_message() -> String {
    format!(
        "From: reports@example.com\r\n\
         Subject: export\r\n\
         Content-Type: multipart/mixed; boundary=\"b\"\r\n\
         \r\n\
         --b\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         Export attached.\r\n\
         --b\r\n\
         Content-Type: text/csv; name=\"test1.csv\"\r\n\
         Content-Disposition: attachment; filename=\"test1.csv\"\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {}\r\n\
         --b--\r\n",
        STANDARD.encode("Id,Name\n1,Felix")
    )
}

fn step(tag: u32, command: &str, reply: &str) -> (String, String) {
    (
        format!("A{tag:04} {command}"),
        format!("{reply}A{tag:04} OK done\r\n"),
    )
}

fn fetch_step(tag: u32, message: &str) -> (String, String) {
    step(
        tag,
        "FETCH 1 BODY.PEEK[]",
        &format!("* 1 FETCH (BODY[] {{{}}}\r\n{message})\r\n", message.len()),
    )
}

#[tokio::test]
async fn retrieves_csv_attachment_over_imap() {
    let (listener, config) = listen().await;
    let message = csv_message();
    let script = vec![
        step(0, "LOGIN felix secret", ""),
        step(1, "EXAMINE INBOX", "* 1 EXISTS\r\n"),
        step(2, "SEARCH ALL", "* SEARCH 1\r\n"),
        fetch_step(3, &message),
        step(4, "CLOSE", ""),
        step(5, "EXAMINE INBOX", "* 1 EXISTS\r\n"),
        step(6, "SEARCH ALL", "* SEARCH 1\r\n"),
        fetch_step(7, &message),
        step(8, "CLOSE", ""),
        step(9, "LOGOUT", "* BYE logging out\r\n"),
    ];
    let server = tokio::spawn(serve(listener, script));

    let (hit, miss) = with_session(&config, async |session| {
        let hit = session
            .retrieve_mail_attachments("test1.csv", "INBOX", false)
            .await?;
        let miss = session
            .retrieve_mail_attachments("test1.txt", "INBOX", false)
            .await?;
        Ok::<_, Error>((hit, miss))
    })
    .await
    .unwrap();

    assert_eq!(hit, [Attachment::new("test1.csv", "Id,Name\n1,Felix")]);
    assert!(miss.is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn rejected_login_is_authentication_error() {
    let (listener, config) = listen().await;
    let script = vec![
        (
            "A0000 LOGIN felix secret".to_string(),
            "A0000 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n".to_string(),
        ),
        step(1, "LOGOUT", "* BYE logging out\r\n"),
    ];
    let server = tokio::spawn(serve(listener, script));

    let err = MailSession::open(&config).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_server_is_connectivity_error() {
    let (listener, config) = listen().await;
    drop(listener);

    let err = MailSession::open(&config).await.unwrap_err();
    assert!(matches!(err, Error::Connectivity(_)));
}
