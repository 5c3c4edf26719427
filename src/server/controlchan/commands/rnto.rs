//! The RFC 959 Rename To (`RNTO`) command
//
// Completes the rename started by the immediately preceding RNFR; without
// one, the sequence is broken and the reply is 503.

use async_trait::async_trait;

use super::{fs_error_reply, resolve};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::ftp_path;
use crate::storage;

pub struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Self {
        Rnto { path }
    }
}

#[async_trait]
impl CommandHandler for Rnto {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (from_local, to_local) = {
            let mut session = args.session.lock().await;
            let from_ftp = match session.rename_from.take() {
                Some(ftp) => ftp,
                None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "RNFR required first")),
            };
            let (_to_ftp, to_local, user) = resolve(&session, &self.path)?;
            (ftp_path::to_local(user.root(), &from_ftp), to_local)
        };
        match storage::rename(&from_local, &to_local).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Rename successful")),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
