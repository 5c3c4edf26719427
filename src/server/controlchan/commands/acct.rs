//! The RFC 959 Account (`ACCT`) command
//
// Accounting information is never needed by this server.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Acct;

#[async_trait]
impl CommandHandler for Acct {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandSuperfluous, "Account not needed for this server"))
    }
}
