//! The RFC 959 Remove Directory (`RMD`) command
//
// Only empty directories can be removed; a populated one yields 550.

use async_trait::async_trait;

use super::{fs_error_reply, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::storage;

pub struct Rmd {
    path: String,
}

impl Rmd {
    pub fn new(path: String) -> Self {
        Rmd { path }
    }
}

#[async_trait]
impl CommandHandler for Rmd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (_ftp, local, user) = {
            let session = args.session.lock().await;
            resolve(&session, &self.path)?
        };
        if !user.can(Permissions::DIR_DELETE) {
            return Ok(permission_denied());
        }
        match storage::stat(&local).await {
            Ok(status) if !status.is_dir() => return Ok(Reply::new(ReplyCode::FileError, "Not a directory")),
            Err(err) => return Ok(fs_error_reply(&err)),
            Ok(_) => {}
        }
        match storage::remove_dir(&local).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Directory removed")),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
