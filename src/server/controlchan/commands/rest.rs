//! The RFC 3659-style Restart (`REST`) command in its STREAM-mode form
//
// Stores the byte offset at which the next STOR or RETR resumes. The offset
// is one-shot; the next transfer attempt consumes it.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Rest {
    offset: u64,
}

impl Rest {
    pub fn new(offset: u64) -> Self {
        Rest { offset }
    }
}

#[async_trait]
impl CommandHandler for Rest {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.restart_offset = self.offset;
        Ok(Reply::new_with_string(
            ReplyCode::FileActionPending,
            format!("Restarting at {}. Send STOR or RETR next", self.offset),
        ))
    }
}
