use async_trait::async_trait;

use super::command::Command;
use super::error::ControlChanError;
use super::middleware::ControlChanMiddleware;
use super::reply::{Reply, ReplyCode};
use crate::server::session::{SessionState, SharedSession};

// AuthMiddleware rejects everything but the login dialogue and a few harmless
// verbs until the user has authenticated.
pub struct AuthMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    pub session: SharedSession,
    pub next: Next,
}

#[async_trait]
impl<Next> ControlChanMiddleware for AuthMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, command: Command) -> Result<Reply, ControlChanError> {
        match command {
            // The commands below are exempt from the login check.
            Command::User { .. }
            | Command::Pass { .. }
            | Command::Acct
            | Command::Quit
            | Command::Feat
            | Command::Noop
            | Command::Help => self.next.handle(command).await,
            _ => {
                let state = self.session.lock().await.state;
                if state != SessionState::WaitCmd {
                    Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in"))
                } else {
                    self.next.handle(command).await
                }
            }
        }
    }
}
