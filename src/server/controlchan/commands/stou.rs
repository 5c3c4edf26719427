//! The RFC 959 Store Unique (`STOU`) command
//
// Like STOR, but the server picks a name that does not yet exist in the
// working directory and announces it in the preliminary reply.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{begin_transfer, fs_error_reply, open_data_connection, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::TransferKind;
use crate::storage::{self, ErrorKind, WriteMode};

static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct Stou;

#[async_trait]
impl CommandHandler for Stou {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (dir_local, user) = {
            let mut session = args.session.lock().await;
            let cwd = session.cwd.clone();
            let (_ftp, local, user) = resolve(&session, &cwd)?;
            session.take_restart_offset();
            (local, user)
        };
        if !user.can(Permissions::FILE_WRITE | Permissions::DIR_LIST) {
            return Ok(permission_denied());
        }

        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let (name, target) = loop {
            let name = format!("u_{}_{}", timestamp, UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed));
            let candidate = dir_local.join(&name);
            match storage::stat(&candidate).await {
                Err(err) if err.kind() == ErrorKind::NotFound => break (name, candidate),
                Ok(_) => continue,
                Err(err) => return Ok(fs_error_reply(&err)),
            }
        };

        let file = match storage::open_write(&target, WriteMode::Truncate, 0).await {
            Ok(file) => file,
            Err(err) => return Ok(fs_error_reply(&err)),
        };

        let mut session = args.session.lock().await;
        let socket = match open_data_connection(&mut session).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };
        begin_transfer(&mut session, socket, TransferKind::Receive { sink: file });
        Ok(Reply::new_with_string(ReplyCode::FileStatusOkay, format!("FILE: {}", name)))
    }
}
