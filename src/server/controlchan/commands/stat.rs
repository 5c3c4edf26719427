//! The RFC 959 Status (`STAT`) command

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Stat;

#[async_trait]
impl CommandHandler for Stat {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandNotImplemented, "Command not implemented"))
    }
}
