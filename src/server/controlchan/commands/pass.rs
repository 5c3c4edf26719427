//! The RFC 959 Password (`PASS`) command
//
// This command must be immediately preceded by the user name command. The
// anonymous aliases accept any password; all other users require an exact
// match against the registered one.

use async_trait::async_trait;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::SessionState;

pub struct Pass {
    password: String,
}

impl Pass {
    pub fn new(password: String) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl CommandHandler for Pass {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::WaitPass => {
                let candidate = session.username_candidate.take().unwrap_or_default();
                match args.users.authenticate(&candidate, &self.password) {
                    Some(user) => {
                        slog::info!(args.logger, "User logged in"; "username" => user.username());
                        session.user = Some(user);
                        session.state = SessionState::WaitCmd;
                        Ok(Reply::new(ReplyCode::UserLoggedIn, "Login successful"))
                    }
                    None => {
                        slog::info!(args.logger, "Login failed"; "username" => &candidate);
                        session.state = SessionState::New;
                        Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"))
                    }
                }
            }
            SessionState::New => Ok(Reply::new(ReplyCode::BadCommandSequence, "Please supply a username first")),
            SessionState::WaitCmd => Ok(Reply::new(ReplyCode::UserLoggedIn, "Already logged in")),
        }
    }
}
