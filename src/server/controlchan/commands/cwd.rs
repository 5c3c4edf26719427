//! The RFC 959 Change Working Directory (`CWD`) command
//
// The argument is resolved against the current working directory and must
// name an existing directory under the user's root. Escape attempts are
// clamped at the virtual root by normalization, never rejected.

use async_trait::async_trait;

use super::{fs_error_reply, resolve};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::storage;

pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl CommandHandler for Cwd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (ftp, local, _user) = {
            let session = args.session.lock().await;
            resolve(&session, &self.path)?
        };
        match storage::stat(&local).await {
            Ok(status) if status.is_dir() => {
                let mut session = args.session.lock().await;
                session.cwd = ftp;
                Ok(Reply::new(ReplyCode::FileActionOkay, "Directory successfully changed"))
            }
            Ok(_) => Ok(Reply::new(ReplyCode::FileError, "Not a directory")),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
