//! The RFC 959 Abort (`ABOR`) command
//
// Cancels the transfer in flight, if any. The transfer task closes the data
// socket and reports back, which makes the control channel emit the 426 for
// the broken transfer followed by the 226 confirming the abort. With nothing
// in flight the answer is a plain 225.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Abor;

#[async_trait]
impl CommandHandler for Abor {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.data_abort_tx.take() {
            // The transfer task answers with 426 and 226.
            Some(tx) if tx.try_send(()).is_ok() => Ok(Reply::none()),
            // The transfer finished in the meantime (or none was running).
            _ => Ok(Reply::new(ReplyCode::DataConnectionOpen, "No transfer to abort")),
        }
    }
}
