//! The RFC 959 Site Parameters (`SITE`) command
//
// No site-specific services are offered.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Site;

#[async_trait]
impl CommandHandler for Site {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandNotImplemented, "Command not implemented"))
    }
}
