//! The RFC 959 Passive (`PASV`) command
//
// Binds a fresh acceptor on the address the client reached us on, with an
// OS-chosen free port, and advertises it in the 227 reply. The acceptor
// waits for exactly one connection, claimed by the next service command.

use async_trait::async_trait;

use tokio::net::TcpListener;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::DataMode;

pub struct Pasv;

#[async_trait]
impl CommandHandler for Pasv {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let conn_addr = match args.local_addr {
            std::net::SocketAddr::V4(addr) => addr,
            std::net::SocketAddr::V6(_) => {
                // We only listen on IPv4; PASV cannot advertise an IPv6 address.
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Passive mode requires IPv4"));
            }
        };

        let listener = match TcpListener::bind((*conn_addr.ip(), 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                slog::warn!(args.logger, "Could not bind passive data port: {}", err);
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No free data port"));
            }
        };
        let port = listener.local_addr()?.port();
        let octets = conn_addr.ip().octets();
        let (p1, p2) = (port >> 8, port & 0xff);

        let mut session = args.session.lock().await;
        session.data_mode = DataMode::Passive(listener);

        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!(
                "Entering Passive Mode ({},{},{},{},{},{})",
                octets[0], octets[1], octets[2], octets[3], p1, p2
            ),
        ))
    }
}
