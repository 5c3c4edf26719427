//! The RFC 959 Transfer Mode (`MODE`) command
//
// Only the default Stream mode is supported.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Mode {
    param: String,
}

impl Mode {
    pub fn new(param: String) -> Self {
        Mode { param }
    }
}

#[async_trait]
impl CommandHandler for Mode {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        if self.param.trim().eq_ignore_ascii_case("S") {
            Ok(Reply::new(ReplyCode::CommandOkay, "Mode set to S"))
        } else {
            Ok(Reply::new(ReplyCode::ParameterNotImplemented, "Only mode S is supported"))
        }
    }
}
