use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::ControlChanError;
use super::reply::Reply;
use crate::auth::UserDatabase;
use crate::server::session::SharedSession;

// Common interface for the handlers of all `Command`s.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError>;
}

// The state a command handler can reach: the session itself plus the
// per-server bits that never change while the session lives.
pub struct CommandContext {
    pub session: SharedSession,
    pub users: Arc<UserDatabase>,
    // The local endpoint of the control connection; PASV advertises its IP.
    pub local_addr: SocketAddr,
    pub greeting: String,
    pub logger: slog::Logger,
}
