//! The RFC 959 Retrieve (`RETR`) command
//
// Causes the server to transfer a copy of the file to the client over the
// data connection. A stored REST offset selects the starting byte and is
// consumed by the attempt, successful or not.

use async_trait::async_trait;

use super::{begin_transfer, fs_error_reply, open_data_connection, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::TransferKind;
use crate::storage;

pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl CommandHandler for Retr {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (local, user, offset) = {
            let mut session = args.session.lock().await;
            let (_ftp, local, user) = resolve(&session, &self.path)?;
            (local, user, session.take_restart_offset())
        };
        if !user.can(Permissions::FILE_READ) {
            return Ok(permission_denied());
        }
        match storage::stat(&local).await {
            Ok(status) if !status.is_file() => return Ok(Reply::new(ReplyCode::FileError, "Not a regular file")),
            Err(err) => return Ok(fs_error_reply(&err)),
            Ok(_) => {}
        }
        let file = match storage::open_read(&local, offset).await {
            Ok(file) => file,
            Err(err) => return Ok(fs_error_reply(&err)),
        };

        let mut session = args.session.lock().await;
        let socket = match open_data_connection(&mut session).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };
        begin_transfer(&mut session, socket, TransferKind::Send { source: Box::new(file) });
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Opening data connection"))
    }
}
