//! # mailsift-imap
//!
//! A small async IMAP client (RFC 9051 / RFC 3501) covering exactly what an
//! attachment finder needs: connect, authenticate, open a mailbox, search it
//! and fetch raw messages.
//!
//! ## Features
//!
//! - **Type-state connection management**: `NotAuthenticated` → `Authenticated`
//!   → `Selected`, enforced at compile time
//! - **TLS via rustls**: implicit TLS and STARTTLS without OpenSSL
//! - **Sans-I/O parser**: response lexing and parsing separated from network I/O
//! - **Bounded framing**: line and literal size limits on everything read
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsift_imap::{Client, Config, FetchItems, SearchCriteria, SequenceSet};
//!
//! #[tokio::main]
//! async fn main() -> mailsift_imap::Result<()> {
//!     let config = Config::new("imap.example.com");
//!     let client = Client::connect(&config).await?;
//!     let client = client
//!         .login("user@example.com", "password")
//!         .await
//!         .map_err(|(err, _client)| err)?;
//!
//!     let (mut client, status) = client.examine("INBOX").await.map_err(|(err, _)| err)?;
//!     println!("Messages: {}", status.exists);
//!
//!     for seq in client.search(&SearchCriteria::All).await? {
//!         let items = client
//!             .fetch(&SequenceSet::Single(seq), &FetchItems::full_message())
//!             .await?;
//!         println!("{seq}: {} items", items.len());
//!     }
//!
//!     client.logout().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! NotAuthenticated ── login() ──→ Authenticated ── select()/examine() ──→ Selected
//!                                       ↑                                    │
//!                                       └────────────── close() ─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, FetchItems, SearchCriteria, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, ConfigBuilder, FramedStream, ImapStream, NotAuthenticated,
    Security, Selected, Transition,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Capability, Mailbox, MailboxStatus, ResponseCode, SeqNum, SequenceSet, Status, Tag, Uid,
};
