//! The Feature (`FEAT`) command (RFC 2389)
//
// Advertises the extensions beyond plain RFC 959: SIZE and stream-mode REST.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Feat;

#[async_trait]
impl CommandHandler for Feat {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_multiline(
            ReplyCode::SystemStatus,
            vec!["Features", " SIZE", " REST STREAM", "End"],
        ))
    }
}
