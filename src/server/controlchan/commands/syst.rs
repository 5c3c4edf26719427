//! The RFC 959 System (`SYST`) command
//
// Returns the canonical UNIX answer; clients use it to pick the listing
// parser, and ours emits `ls -l` lines.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Syst;

#[async_trait]
impl CommandHandler for Syst {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::SystemType, "UNIX Type: L8"))
    }
}
