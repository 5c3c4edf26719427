//! The per-session control-channel event loop.
//!
//! One loop task runs per accepted connection. It frames the socket with
//! [`FtpCodec`], pushes every parsed command through the middleware chain
//! (logging → login gating → dispatch), sends the reply, and only then
//! launches any transfer the command prepared — which pins the `150` ahead of
//! the first data byte. Replies to a session's commands therefore always come
//! back in command order.

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio_util::codec::Decoder;

use super::auth::AuthMiddleware;
use super::codec::FtpCodec;
use super::command::Command;
use super::commands;
use super::error::{ControlChanError, ControlChanErrorKind};
use super::handler::{CommandContext, CommandHandler};
use super::log::LoggingMiddleware;
use super::middleware::ControlChanMiddleware;
use super::parser;
use super::reply::{Reply, ReplyCode};
use crate::auth::UserDatabase;
use crate::server::chancomms::ControlChanMsg;
use crate::server::datachan;
use crate::server::ftpserver::CommandCallback;
use crate::server::session::{ConnectionGuard, Session, SharedSession};
use crate::server::shutdown;

// Everything a session needs from the server, fixed at accept time.
pub struct Config {
    pub users: Arc<UserDatabase>,
    pub greeting: String,
    pub idle_timeout: Duration,
    pub callback: Option<CommandCallback>,
    pub logger: slog::Logger,
    pub shutdown: Arc<shutdown::Notifier>,
    pub open_connections: Arc<AtomicUsize>,
}

// What one turn of the event loop has to deal with.
enum Incoming {
    Line(String),
    Msg(ControlChanMsg),
    IdleTimeout,
    PeerClosed,
    Shutdown,
    Error(ControlChanError),
}

/// Wraps an accepted control connection in a session and spawns its event
/// loop. Returns once the greeting went out; the loop lives on its own task.
pub async fn spawn(config: Config, tcp_stream: TcpStream) -> Result<(), ControlChanError> {
    let local_addr = tcp_stream.local_addr()?;
    let source = tcp_stream.peer_addr()?;

    let guard = ConnectionGuard::new(config.open_connections.clone());
    let session = Session::new(source, guard);
    let logger = config
        .logger
        .new(slog::o!("trace-id" => format!("{}", session.trace_id), "source" => format!("{}", session.source)));
    let shared: SharedSession = Arc::new(Mutex::new(session));

    let (control_msg_tx, mut control_msg_rx) = mpsc::channel::<ControlChanMsg>(8);

    let dispatcher = CommandDispatcher {
        session: shared.clone(),
        users: config.users.clone(),
        local_addr,
        greeting: config.greeting.clone(),
        logger: logger.clone(),
    };
    let chain = AuthMiddleware {
        session: shared.clone(),
        next: dispatcher,
    };
    let mut chain = LoggingMiddleware {
        logger: logger.clone(),
        sequence_nr: 0,
        next: chain,
    };

    let framed = FtpCodec::new().framed(tcp_stream);
    let (mut reply_sink, mut command_source) = framed.split();
    reply_sink
        .send(Reply::new_with_string(ReplyCode::ServiceReady, config.greeting.clone()))
        .await?;

    let mut shutdown_listener = config.shutdown.subscribe();
    let shutdown_notifier = config.shutdown.clone();
    let callback = config.callback.clone();
    let idle_timeout = config.idle_timeout;

    tokio::spawn(async move {
        slog::info!(logger, "Starting control loop");
        loop {
            // The idle timer is suppressed while a transfer runs; large
            // transfers are not idleness.
            let data_busy = shared.lock().await.data_busy;
            let incoming = tokio::select! {
                line = command_source.next() => match line {
                    Some(Ok(line)) => Incoming::Line(line),
                    Some(Err(err)) => Incoming::Error(err),
                    None => Incoming::PeerClosed,
                },
                Some(msg) = control_msg_rx.recv() => Incoming::Msg(msg),
                _ = tokio::time::sleep(idle_timeout), if !data_busy => Incoming::IdleTimeout,
                _ = shutdown_listener.listen() => Incoming::Shutdown,
            };

            match incoming {
                Incoming::Line(line) => {
                    let (verb, param) = parser::tokenize(&line);
                    {
                        let mut session = shared.lock().await;
                        session.last_command = verb.clone();
                        session.last_param = param.clone();
                        // A pending RNFR only survives into its RNTO.
                        if verb != "RNFR" && verb != "RNTO" {
                            session.rename_from = None;
                        }
                    }
                    let reply = match parser::parse(&verb, &param) {
                        Ok(command) => match chain.handle(command).await {
                            Ok(reply) => reply,
                            Err(err) => {
                                slog::warn!(logger, "Command handler error: {:?}. Closing control connection", err);
                                break;
                            }
                        },
                        Err(err) => parse_error_reply(&err),
                    };
                    if send_reply(&mut reply_sink, &shared, &callback, reply).await.is_err() {
                        slog::warn!(logger, "Could not send reply to client");
                        break;
                    }
                    // Post-flush duties: launch a prepared transfer, honor QUIT.
                    let (job, quit) = {
                        let mut session = shared.lock().await;
                        (session.pending_transfer.take(), session.shutdown_requested)
                    };
                    if let Some(job) = job {
                        datachan::spawn(logger.clone(), job, control_msg_tx.clone(), shutdown_notifier.subscribe());
                    }
                    if quit {
                        break;
                    }
                }
                Incoming::Msg(msg) => {
                    let reply = {
                        let mut session = shared.lock().await;
                        session.data_busy = false;
                        session.data_abort_tx = None;
                        transfer_outcome_reply(msg)
                    };
                    if send_reply(&mut reply_sink, &shared, &callback, reply).await.is_err() {
                        slog::warn!(logger, "Could not send transfer reply to client");
                        break;
                    }
                }
                Incoming::IdleTimeout => {
                    slog::info!(logger, "Session idle timeout");
                    let reply = Reply::new(ReplyCode::ServiceNotAvailable, "Timeout");
                    let _ = send_reply(&mut reply_sink, &shared, &callback, reply).await;
                    break;
                }
                Incoming::PeerClosed => {
                    slog::info!(logger, "Client closed the control connection");
                    break;
                }
                Incoming::Shutdown => {
                    // Server stop: close promptly, no farewell.
                    slog::info!(logger, "Shutting down control loop");
                    break;
                }
                Incoming::Error(err) => {
                    // The framed stream does not survive a decode error, so
                    // explain ourselves where possible and close.
                    if matches!(err.kind(), ControlChanErrorKind::Utf8) {
                        let reply = Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF-8 in command");
                        let _ = send_reply(&mut reply_sink, &shared, &callback, reply).await;
                    } else {
                        slog::warn!(logger, "Control channel error: {:?}", err);
                    }
                    break;
                }
            }
        }

        // Teardown: a transfer still in flight is cancelled here; it also
        // hears the server-wide shutdown, but QUIT, timeouts and dropped
        // connections only reach it through this signal.
        {
            let mut session = shared.lock().await;
            if let Some(tx) = session.data_abort_tx.take() {
                let _ = tx.try_send(());
            }
            session.pending_transfer = None;
        }
        slog::info!(logger, "Exiting control loop");
    });

    Ok(())
}

// Sends a reply and, once it is on the wire, hands it to the command
// observer. The observer sees the verb/param of the command being answered,
// so a transfer's 150 and its closing 226 both notify under the service
// command that caused them.
async fn send_reply<S>(sink: &mut S, session: &SharedSession, callback: &Option<CommandCallback>, reply: Reply) -> Result<(), ControlChanError>
where
    S: Sink<Reply, Error = ControlChanError> + Unpin,
{
    if matches!(reply, Reply::None) {
        return Ok(());
    }
    let (code, text) = (reply.code(), reply.text());
    sink.send(reply).await?;
    if let Some(callback) = callback {
        let (command, param) = {
            let session = session.lock().await;
            (session.last_command.clone(), session.last_param.clone())
        };
        // The greeting precedes any command; observers only hear the dialogue.
        if !command.is_empty() {
            callback(&command, &param, code, &text);
        }
    }
    Ok(())
}

fn parse_error_reply(err: &ControlChanError) -> Reply {
    match err.kind() {
        ControlChanErrorKind::UnknownCommand { .. } => Reply::new(ReplyCode::CommandSyntaxError, "Syntax error, command unrecognized"),
        ControlChanErrorKind::Utf8 => Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF-8 in command"),
        ControlChanErrorKind::BadArgument => Reply::new(ReplyCode::ParameterSyntaxError, "Syntax error in parameters or arguments"),
        _ => Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"),
    }
}

// The closing reply of a data transfer.
fn transfer_outcome_reply(msg: ControlChanMsg) -> Reply {
    match msg {
        ControlChanMsg::TransferDone { bytes } => {
            Reply::new_with_string(ReplyCode::ClosingDataConnection, format!("Transfer complete ({} bytes)", bytes))
        }
        ControlChanMsg::TransferAborted => Reply::new(ReplyCode::ConnectionClosed, "Transfer aborted"),
        ControlChanMsg::AbortAcknowledged => Reply::new(ReplyCode::ClosingDataConnection, "Abort successful"),
        ControlChanMsg::DataChannelError => Reply::new(ReplyCode::ConnectionClosed, "Connection closed; transfer aborted"),
        ControlChanMsg::LocalFsError => Reply::new(ReplyCode::LocalError, "Requested action aborted: local error in processing"),
    }
}

// Routes each command to its handler.
struct CommandDispatcher {
    session: SharedSession,
    users: Arc<UserDatabase>,
    local_addr: SocketAddr,
    greeting: String,
    logger: slog::Logger,
}

#[async_trait::async_trait]
impl ControlChanMiddleware for CommandDispatcher {
    async fn handle(&mut self, command: Command) -> Result<Reply, ControlChanError> {
        let args = CommandContext {
            session: self.session.clone(),
            users: self.users.clone(),
            local_addr: self.local_addr,
            greeting: self.greeting.clone(),
            logger: self.logger.clone(),
        };

        let handler: Box<dyn CommandHandler> = match command {
            Command::User { username } => Box::new(commands::User::new(username)),
            Command::Pass { password } => Box::new(commands::Pass::new(password)),
            Command::Acct => Box::new(commands::Acct),
            Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
            Command::Cdup => Box::new(commands::Cdup),
            Command::Rein => Box::new(commands::Rein),
            Command::Quit => Box::new(commands::Quit),
            Command::Port { addr } => Box::new(commands::Port::new(addr)),
            Command::Pasv => Box::new(commands::Pasv),
            Command::Type { param } => Box::new(commands::Type::new(param)),
            Command::Stru { param } => Box::new(commands::Stru::new(param)),
            Command::Mode { param } => Box::new(commands::Mode::new(param)),
            Command::Retr { path } => Box::new(commands::Retr::new(path)),
            Command::Stor { path } => Box::new(commands::Stor::new(path)),
            Command::Stou => Box::new(commands::Stou),
            Command::Appe { path } => Box::new(commands::Appe::new(path)),
            Command::Allo => Box::new(commands::Allo),
            Command::Rest { offset } => Box::new(commands::Rest::new(offset)),
            Command::Rnfr { path } => Box::new(commands::Rnfr::new(path)),
            Command::Rnto { path } => Box::new(commands::Rnto::new(path)),
            Command::Abor => Box::new(commands::Abor),
            Command::Dele { path } => Box::new(commands::Dele::new(path)),
            Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
            Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
            Command::Pwd => Box::new(commands::Pwd),
            Command::List { path } => Box::new(commands::List::new(path)),
            Command::Nlst { path } => Box::new(commands::Nlst::new(path)),
            Command::Site => Box::new(commands::Site),
            Command::Syst => Box::new(commands::Syst),
            Command::Stat => Box::new(commands::Stat),
            Command::Help => Box::new(commands::Help),
            Command::Noop => Box::new(commands::Noop),
            Command::Feat => Box::new(commands::Feat),
            Command::Opts { option } => Box::new(commands::Opts::new(option)),
            Command::Size { path } => Box::new(commands::Size::new(path)),
        };

        handler.handle(args).await
    }
}
