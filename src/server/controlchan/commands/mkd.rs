//! The RFC 959 Make Directory (`MKD`) command

use async_trait::async_trait;

use super::{fs_error_reply, permission_denied, resolve};
use crate::auth::Permissions;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::ftp_path::quote_ftp_path;
use crate::storage;

pub struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Self {
        Mkd { path }
    }
}

#[async_trait]
impl CommandHandler for Mkd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (ftp, local, user) = {
            let session = args.session.lock().await;
            resolve(&session, &self.path)?
        };
        if !user.can(Permissions::DIR_CREATE) {
            return Ok(permission_denied());
        }
        match storage::make_dir(&local).await {
            Ok(()) => Ok(Reply::new_with_string(
                ReplyCode::PathCreated,
                format!("{} Directory created", quote_ftp_path(&ftp)),
            )),
            Err(err) => Ok(fs_error_reply(&err)),
        }
    }
}
