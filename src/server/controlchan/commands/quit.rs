//! The RFC 959 Logout (`QUIT`) command
//
// The control loop closes the connection once the 221 has been flushed; a
// transfer still in flight is cancelled by the teardown.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Quit;

#[async_trait]
impl CommandHandler for Quit {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.shutdown_requested = true;
        Ok(Reply::new(ReplyCode::ClosingControlConnection, "Goodbye"))
    }
}
