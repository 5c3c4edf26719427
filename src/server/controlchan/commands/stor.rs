//! The RFC 959 Store (`STOR`) command
//
// Receives a file from the client. Without a REST offset the target is
// created or replaced; with one, the file is cut at the offset and the
// upload continues from there.

use async_trait::async_trait;

use super::{begin_transfer, fs_error_reply, open_data_connection, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::TransferKind;
use crate::storage::{self, WriteMode};

pub struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Self {
        Stor { path }
    }
}

#[async_trait]
impl CommandHandler for Stor {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (local, user, offset) = {
            let mut session = args.session.lock().await;
            let (_ftp, local, user) = resolve(&session, &self.path)?;
            (local, user, session.take_restart_offset())
        };
        if !user.can(Permissions::FILE_WRITE) {
            return Ok(permission_denied());
        }
        let file = match storage::open_write(&local, WriteMode::Truncate, offset).await {
            Ok(file) => file,
            Err(err) => return Ok(fs_error_reply(&err)),
        };

        let mut session = args.session.lock().await;
        let socket = match open_data_connection(&mut session).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };
        begin_transfer(&mut session, socket, TransferKind::Receive { sink: file });
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Opening data connection"))
    }
}
