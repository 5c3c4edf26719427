//! The RFC 959 Reinitialize (`REIN`) command
//
// Flushes all account information and transfer parameters, leaving the
// session exactly as a freshly opened connection, and re-issues the greeting.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Rein;

#[async_trait]
impl CommandHandler for Rein {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.reinitialize();
        Ok(Reply::new_with_string(ReplyCode::ServiceReady, args.greeting.clone()))
    }
}
