//! The FTP *data* channel: streaming a prepared transfer job over its socket.
//!
//! Service-command handlers build a [`TransferJob`] (file or listing plus the
//! established data socket); the control loop launches it here right after
//! the `150` reply has been flushed, which keeps the reply strictly ahead of
//! the first data byte. The task reports its outcome through
//! [`ControlChanMsg`]; the closing `226`/`426`/`451` is then emitted by the
//! control loop after the socket is fully drained and shut down.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::server::chancomms::ControlChanMsg;
use crate::server::shutdown;
use crate::storage::CHUNK_SIZE;

// Which way the bytes flow.
pub enum TransferKind {
    // Server to client: a file opened at the restart offset, or an in-memory
    // directory listing.
    Send { source: Box<dyn AsyncRead + Send + Sync + Unpin> },
    // Client to server: a file opened for truncate-at-offset or append.
    Receive { sink: tokio::fs::File },
}

impl std::fmt::Debug for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferKind::Send { .. } => write!(f, "Send"),
            TransferKind::Receive { .. } => write!(f, "Receive"),
        }
    }
}

// A fully prepared transfer, ready to stream.
#[derive(Debug)]
pub struct TransferJob {
    pub socket: TcpStream,
    pub kind: TransferKind,
    pub abort_rx: Receiver<()>,
}

enum Outcome {
    Done(u64),
    // The data socket failed: 426.
    NetError,
    // The local file failed: 451.
    FsError,
    Aborted,
    Cancelled,
}

/// Runs the transfer on a fresh task. Outcome notifications go to the control
/// loop; on server shutdown the task stops silently.
pub fn spawn(logger: slog::Logger, job: TransferJob, tx: Sender<ControlChanMsg>, mut shutdown: shutdown::Listener) {
    tokio::spawn(async move {
        let TransferJob {
            mut socket,
            mut kind,
            mut abort_rx,
        } = job;

        let outcome = tokio::select! {
            biased;
            _ = abort_rx.recv() => Outcome::Aborted,
            _ = shutdown.listen() => Outcome::Cancelled,
            outcome = stream(&mut socket, &mut kind) => outcome,
        };

        // Dropping the socket below closes it in every outcome; an aborted
        // transfer must not keep the peer hanging.
        drop(socket);

        match outcome {
            Outcome::Done(bytes) => {
                slog::info!(logger, "Data transfer complete"; "bytes" => bytes);
                let _ = tx.send(ControlChanMsg::TransferDone { bytes }).await;
            }
            Outcome::NetError => {
                slog::warn!(logger, "Data connection failed mid-transfer");
                let _ = tx.send(ControlChanMsg::DataChannelError).await;
            }
            Outcome::FsError => {
                slog::warn!(logger, "Local file error mid-transfer");
                let _ = tx.send(ControlChanMsg::LocalFsError).await;
            }
            Outcome::Aborted => {
                slog::info!(logger, "Data transfer aborted");
                let _ = tx.send(ControlChanMsg::TransferAborted).await;
                let _ = tx.send(ControlChanMsg::AbortAcknowledged).await;
            }
            Outcome::Cancelled => {
                slog::info!(logger, "Data transfer cancelled by server shutdown");
            }
        }
    });
}

// The chunked copy loop. Keeping file and socket errors apart is what lets
// the control loop distinguish 451 from 426.
async fn stream(socket: &mut TcpStream, kind: &mut TransferKind) -> Outcome {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut bytes: u64 = 0;
    match kind {
        TransferKind::Send { source } => {
            loop {
                let n = match source.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(_) => return Outcome::FsError,
                };
                if socket.write_all(&buffer[..n]).await.is_err() {
                    return Outcome::NetError;
                }
                bytes += n as u64;
            }
            if socket.shutdown().await.is_err() {
                return Outcome::NetError;
            }
            Outcome::Done(bytes)
        }
        TransferKind::Receive { sink } => {
            loop {
                let n = match socket.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(_) => return Outcome::NetError,
                };
                if sink.write_all(&buffer[..n]).await.is_err() {
                    return Outcome::FsError;
                }
                bytes += n as u64;
            }
            if sink.flush().await.is_err() {
                return Outcome::FsError;
            }
            Outcome::Done(bytes)
        }
    }
}
