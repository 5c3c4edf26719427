#![deny(missing_docs)]
//! An embeddable FTP server library for Rust
//!
//! ftplet hosts a plain-FTP (RFC 959) server inside your application. You
//! register users — each with a password, a local directory that becomes their
//! filesystem root, and a permission mask — then start the server on a worker
//! pool of your chosen size. Active (PORT) and passive (PASV) transfers, the
//! usual navigation and maintenance commands, and restartable up/downloads are
//! handled by the library; an optional callback lets the host application
//! observe every command/reply pair.
//!
//! # Quick Start
//!
//! ```no_run
//! use ftplet::{auth::Permissions, Server};
//!
//! let mut server = Server::with_port(2121);
//! server.add_user("alice", "secret", "/srv/ftp/alice", Permissions::ALL);
//! server.add_anonymous("/srv/ftp/pub", Permissions::DIR_LIST | Permissions::FILE_READ);
//! assert!(server.start(4));
//! // ... the server now accepts connections on port 2121 ...
//! server.stop();
//! ```
//!
//! The server speaks plain FTP only: no TLS, no EPSV/EPRT. The wire is binary
//! clean in both `TYPE I` and `TYPE A`.

pub mod auth;
pub(crate) mod server;
pub mod storage;

pub use crate::server::ftpserver::{CommandCallback, Server};
