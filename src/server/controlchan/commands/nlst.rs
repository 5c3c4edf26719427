//! The RFC 959 Name List (`NLST`) command
//
// Like LIST, but sends bare entry names, one per line.

use std::io::Cursor;

use async_trait::async_trait;

use super::{begin_transfer, fs_error_reply, open_data_connection, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::TransferKind;
use crate::storage;

pub struct Nlst {
    path: Option<String>,
}

impl Nlst {
    pub fn new(path: Option<String>) -> Self {
        Nlst { path }
    }
}

#[async_trait]
impl CommandHandler for Nlst {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (local, user) = {
            let session = args.session.lock().await;
            let input = self.path.clone().unwrap_or_else(|| session.cwd.clone());
            let (_ftp, local, user) = resolve(&session, &input)?;
            (local, user)
        };
        if !user.can(Permissions::DIR_LIST) {
            return Ok(permission_denied());
        }
        match storage::stat(&local).await {
            Ok(status) if !status.is_dir() => return Ok(Reply::new(ReplyCode::FileError, "Not a directory")),
            Err(err) => return Ok(fs_error_reply(&err)),
            Ok(_) => {}
        }
        let entries = match storage::list(&local).await {
            Ok(entries) => entries,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let listing: String = entries.iter().map(|(name, _)| format!("{}\r\n", name)).collect();

        let mut session = args.session.lock().await;
        let socket = match open_data_connection(&mut session).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };
        begin_transfer(
            &mut session,
            socket,
            TransferKind::Send {
                source: Box::new(Cursor::new(listing.into_bytes())),
            },
        );
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Opening data connection for name list"))
    }
}
