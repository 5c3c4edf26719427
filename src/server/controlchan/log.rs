use async_trait::async_trait;

use super::command::Command;
use super::error::ControlChanError;
use super::middleware::ControlChanMiddleware;
use super::reply::Reply;

// Control channel middleware that logs every command and its reply.
pub struct LoggingMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    pub logger: slog::Logger,
    pub sequence_nr: u64,
    pub next: Next,
}

#[async_trait]
impl<Next> ControlChanMiddleware for LoggingMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, command: Command) -> Result<Reply, ControlChanError> {
        self.sequence_nr += 1;
        match &command {
            // Don't leak passwords into the logs.
            Command::Pass { .. } => slog::info!(self.logger, "Control channel command PASS ****"; "seq" => self.sequence_nr),
            other => slog::info!(self.logger, "Control channel command {:?}", other; "seq" => self.sequence_nr),
        }
        let result = self.next.handle(command).await;
        match &result {
            Ok(reply) => slog::info!(self.logger, "Control channel reply {:?}", reply; "seq" => self.sequence_nr),
            Err(error) => slog::warn!(self.logger, "Control channel error {:?}", error; "seq" => self.sequence_nr),
        };
        result
    }
}
