//! The RFC 959 Rename From (`RNFR`) command
//
// Remembers the rename source for an immediately following RNTO. The source
// must exist and the user needs the rename permission matching its kind.
// Any other command in between drops the stored source again.

use async_trait::async_trait;

use super::{fs_error_reply, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::storage::{self, FileKind};

pub struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Self {
        Rnfr { path }
    }
}

#[async_trait]
impl CommandHandler for Rnfr {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (ftp, local, user) = {
            let session = args.session.lock().await;
            resolve(&session, &self.path)?
        };
        let status = match storage::stat(&local).await {
            Ok(status) => status,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let wanted = match status.kind() {
            FileKind::File => Permissions::FILE_RENAME,
            FileKind::Dir => Permissions::DIR_RENAME,
            FileKind::Other => return Ok(Reply::new(ReplyCode::FileError, "Cannot rename that")),
        };
        if !user.can(wanted) {
            return Ok(permission_denied());
        }
        let mut session = args.session.lock().await;
        session.rename_from = Some(ftp);
        Ok(Reply::new(ReplyCode::FileActionPending, "Ready for RNTO"))
    }
}
