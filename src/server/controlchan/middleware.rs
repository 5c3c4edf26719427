use async_trait::async_trait;

use super::command::Command;
use super::error::ControlChanError;
use super::reply::Reply;

// Requirements for code that wants to intercept commands on their way to the
// dispatcher (login gating, logging).
#[async_trait]
pub trait ControlChanMiddleware: Send + Sync {
    async fn handle(&mut self, command: Command) -> Result<Reply, ControlChanError>;
}
