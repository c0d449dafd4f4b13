//! End-to-end client test against a scripted server on 127.0.0.1.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use mailsift_imap::{
    Client, Config, Error, FetchItem, FetchItems, SearchCriteria, Security, SequenceSet,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Serves one connection: sends the greeting, then answers each expected
/// command line with the scripted reply.
async fn serve(listener: TcpListener, script: Vec<(&'static str, String)>) -> Vec<String> {
    let (socket, _) = listener.accept().await.unwrap();
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut seen = Vec::new();

    write.write_all(b"* OK [CAPABILITY IMAP4rev1] ready\r\n").await.unwrap();
    for (expected, reply) in script {
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(line, expected);
        seen.push(line);
        write.write_all(reply.as_bytes()).await.unwrap();
    }
    seen
}

async fn listen() -> (TcpListener, Config) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = Config::builder("127.0.0.1")
        .security(Security::None)
        .port(port)
        .io_timeout(Duration::from_secs(5))
        .build();
    (listener, config)
}

#[tokio::test]
async fn fetches_message_over_tcp() {
    let (listener, config) = listen().await;
    let message = "Subject: hi\r\n\r\nbody\r\n";
    let script = vec![
        ("A0000 LOGIN user pass", "A0000 OK logged in\r\n".to_string()),
        (
            "A0001 EXAMINE INBOX",
            "* 1 EXISTS\r\n* OK [UIDVALIDITY 7] ok\r\nA0001 OK [READ-ONLY] done\r\n".to_string(),
        ),
        ("A0002 SEARCH ALL", "* SEARCH 1\r\nA0002 OK done\r\n".to_string()),
        (
            "A0003 FETCH 1 BODY.PEEK[]",
            format!(
                "* 1 FETCH (BODY[] {{{}}}\r\n{message})\r\nA0003 OK done\r\n",
                message.len()
            ),
        ),
        ("A0004 CLOSE", "A0004 OK closed\r\n".to_string()),
        ("A0005 LOGOUT", "* BYE bye\r\nA0005 OK done\r\n".to_string()),
    ];
    let server = tokio::spawn(serve(listener, script));

    let client = Client::connect(&config).await.unwrap();
    let client = client.login("user", "pass").await.map_err(|(e, _)| e).unwrap();
    let (mut client, status) = client.examine("INBOX").await.map_err(|(e, _)| e).unwrap();
    assert_eq!(status.exists, 1);
    assert_eq!(status.uid_validity, Some(7));

    let found = client.search(&SearchCriteria::All).await.unwrap();
    assert_eq!(found.len(), 1);

    let fetched = client
        .fetch(&SequenceSet::Single(found[0]), &FetchItems::full_message())
        .await
        .unwrap();
    let FetchItem::Body { data: Some(data), .. } = &fetched[0].1[0] else {
        panic!("expected body");
    };
    assert_eq!(data, message.as_bytes());

    let client = client.close().await.map_err(|(e, _)| e).unwrap();
    client.logout().await.unwrap();

    assert_eq!(server.await.unwrap().len(), 6);
}

#[tokio::test]
async fn rejected_login_still_logs_out() {
    let (listener, config) = listen().await;
    let script = vec![
        (
            "A0000 LOGIN user wrong",
            "A0000 NO [AUTHENTICATIONFAILED] nope\r\n".to_string(),
        ),
        ("A0001 LOGOUT", "* BYE bye\r\nA0001 OK done\r\n".to_string()),
    ];
    let server = tokio::spawn(serve(listener, script));

    let client = Client::connect(&config).await.unwrap();
    let (err, client) = client.login("user", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::No(_)));
    client.logout().await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn silent_server_times_out() {
    let (listener, config) = listen().await;
    let config = Config {
        io_timeout: Duration::from_millis(100),
        ..config
    };
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(b"* OK ready\r\n").await.unwrap();
        // Never answer.
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let client = Client::connect(&config).await.unwrap();
    let (err, _client) = client.login("user", "pass").await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));

    server.abort();
}
