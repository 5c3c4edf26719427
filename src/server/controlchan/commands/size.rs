//! The `SIZE` command (RFC 3659)
//
// Reports the byte size of a regular file. Only answered in binary type;
// in ASCII type the size on the wire would notionally differ from the size
// on disk, so the parameter is refused.

use async_trait::async_trait;

use super::{fs_error_reply, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::storage;

pub struct Size {
    path: String,
}

impl Size {
    pub fn new(path: String) -> Self {
        Size { path }
    }
}

#[async_trait]
impl CommandHandler for Size {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (local, user, binary) = {
            let session = args.session.lock().await;
            let (_ftp, local, user) = resolve(&session, &self.path)?;
            (local, user, session.binary_type)
        };
        if !binary {
            return Ok(Reply::new(ReplyCode::ParameterNotImplemented, "SIZE not available in ASCII type"));
        }
        if !user.can(Permissions::FILE_READ) {
            return Ok(permission_denied());
        }
        match storage::stat(&local).await {
            Ok(status) if status.is_file() => Ok(Reply::new_with_string(ReplyCode::FileStatus, status.len().to_string())),
            Ok(_) => Ok(Reply::new(ReplyCode::FileError, "Not a regular file")),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
