//! The RFC 959 Representation Type (`TYPE`) command
//
// Image and ASCII are accepted; the wire representation is byte-identical
// for both, but the negotiated value is reported back and SIZE refuses to
// answer in ASCII type.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Self {
        Type { param }
    }
}

#[async_trait]
impl CommandHandler for Type {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // "A N" style forms reduce to their format letter; the format
        // effector parameter is irrelevant on a binary-clean wire.
        let letter = self.param.trim().split(' ').next().unwrap_or("").to_ascii_uppercase();
        let binary = match letter.as_str() {
            "I" => true,
            "A" => false,
            _ => {
                return Ok(Reply::new(
                    ReplyCode::ParameterNotImplemented,
                    "Only types I and A are supported",
                ))
            }
        };
        let mut session = args.session.lock().await;
        session.binary_type = binary;
        Ok(Reply::new_with_string(ReplyCode::CommandOkay, format!("Type set to {}", letter)))
    }
}
