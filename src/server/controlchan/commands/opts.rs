//! The Options (`OPTS`) command (RFC 2389)
//
// No command here takes options, so every OPTS argument is unrecognized.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Opts {
    option: String,
}

impl Opts {
    pub fn new(option: String) -> Self {
        Opts { option }
    }
}

#[async_trait]
impl CommandHandler for Opts {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_with_string(
            ReplyCode::ParameterSyntaxError,
            format!("Option {} not understood", self.option),
        ))
    }
}
