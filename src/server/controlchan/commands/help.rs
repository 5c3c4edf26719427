//! The RFC 959 Help (`HELP`) command

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_multiline(
            ReplyCode::HelpMessage,
            vec![
                "The following commands are recognized:",
                " USER PASS ACCT CWD  CDUP REIN QUIT PORT",
                " PASV TYPE STRU MODE RETR STOR STOU APPE",
                " ALLO REST RNFR RNTO ABOR DELE RMD  MKD",
                " PWD  LIST NLST SITE SYST STAT HELP NOOP",
                " FEAT OPTS SIZE",
                "Help ok",
            ],
        ))
    }
}
