//! The RFC 959 Append (`APPE`) command
//
// Like STOR, but existing content is kept and the upload goes past the end.
// A pending REST offset is consumed yet ignored; appends always write at
// the end.

use async_trait::async_trait;

use super::{begin_transfer, fs_error_reply, open_data_connection, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::TransferKind;
use crate::storage::{self, WriteMode};

pub struct Appe {
    path: String,
}

impl Appe {
    pub fn new(path: String) -> Self {
        Appe { path }
    }
}

#[async_trait]
impl CommandHandler for Appe {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (local, user) = {
            let mut session = args.session.lock().await;
            let (_ftp, local, user) = resolve(&session, &self.path)?;
            session.take_restart_offset();
            (local, user)
        };
        if !user.can(Permissions::FILE_APPEND) {
            return Ok(permission_denied());
        }
        let file = match storage::open_write(&local, WriteMode::Append, 0).await {
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
