//! The RFC 959 Print Working Directory (`PWD`) command
//
// Causes the name of the current working directory to be returned in the
// reply, in the quoted form the 257 reply requires.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::ftp_path::quote_ftp_path;

pub struct Pwd;

#[async_trait]
impl CommandHandler for Pwd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        Ok(Reply::new_with_string(ReplyCode::PathCreated, quote_ftp_path(&session.cwd)))
    }
}
