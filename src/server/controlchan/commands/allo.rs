//! The RFC 959 Allocate (`ALLO`) command
//
// No pre-allocation is ever needed on this server.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Allo;

#[async_trait]
impl CommandHandler for Allo {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandSuperfluous, "No storage allocation necessary"))
    }
}
