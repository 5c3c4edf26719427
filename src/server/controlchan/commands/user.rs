//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user. The reply asks
// for a password in every case, including unknown usernames, so the dialogue
// cannot be used to probe which accounts exist.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::SessionState;

pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl CommandHandler for User {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::New | SessionState::WaitPass => {
                session.username_candidate = Some(self.username.clone());
                session.state = SessionState::WaitPass;
                Ok(Reply::new(ReplyCode::NeedPassword, "Password required"))
            }
            SessionState::WaitCmd => Ok(Reply::new(
                ReplyCode::BadCommandSequence,
                "Already logged in; use REIN or a new connection to switch user",
            )),
        }
    }
}
