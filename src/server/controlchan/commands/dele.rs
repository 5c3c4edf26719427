//! The RFC 959 Delete (`DELE`) command

use async_trait::async_trait;

use super::{fs_error_reply, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::storage;

pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl CommandHandler for Dele {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (_ftp, local, user) = {
            let session = args.session.lock().await;
            resolve(&session, &self.path)?
        };
        if !user.can(Permissions::FILE_DELETE) {
            return Ok(permission_denied());
        }
        match storage::stat(&local).await {
            Ok(status) if !status.is_file() => return Ok(Reply::new(ReplyCode::FileError, "Not a regular file")),
            Err(err) => return Ok(fs_error_reply(&err)),
            Ok(_) => {}
        }
        match storage::remove_file(&local).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File deleted")),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
