//! The RFC 959 Change To Parent Directory (`CDUP`) command
//
// A special case of CWD so that transfer parameters need not change; at the
// root it is a no-op because ".." clamps there.

use async_trait::async_trait;

use super::Cwd;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::Reply;

pub struct Cdup;

#[async_trait]
impl CommandHandler for Cdup {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        Cwd::new("..".to_string()).handle(args).await
    }
}
