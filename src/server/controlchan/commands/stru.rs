//! The RFC 959 File Structure (`STRU`) command
//
// Only the default File structure is supported.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Stru {
    param: String,
}

impl Stru {
    pub fn new(param: String) -> Self {
        Stru { param }
    }
}

#[async_trait]
impl CommandHandler for Stru {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        if self.param.trim().eq_ignore_ascii_case("F") {
            Ok(Reply::new(ReplyCode::CommandOkay, "Structure set to F"))
        } else {
            Ok(Reply::new(ReplyCode::ParameterNotImplemented, "Only structure F is supported"))
        }
    }
}
