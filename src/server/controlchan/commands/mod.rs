//! One handler per FTP verb.

mod abor;
mod acct;
mod allo;
mod appe;
mod cdup;
mod cwd;
mod dele;
mod feat;
mod help;
mod list;
mod mkd;
mod mode;
mod nlst;
mod noop;
mod opts;
mod pass;
mod pasv;
mod port;
mod pwd;
mod quit;
mod rein;
mod rest;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod site;
mod size;
mod stat;
mod stor;
mod stou;
mod stru;
mod syst;
mod type_;
mod user;

pub use abor::Abor;
pub use acct::Acct;
pub use allo::Allo;
pub use appe::Appe;
pub use cdup::Cdup;
pub use cwd::Cwd;
pub use dele::Dele;
pub use feat::Feat;
pub use help::Help;
pub use list::List;
pub use mkd::Mkd;
pub use mode::Mode;
pub use nlst::Nlst;
pub use noop::Noop;
pub use opts::Opts;
pub use pass::Pass;
pub use pasv::Pasv;
pub use port::Port;
pub use pwd::Pwd;
pub use quit::Quit;
pub use rein::Rein;
pub use rest::Rest;
pub use retr::Retr;
pub use rmd::Rmd;
pub use rnfr::Rnfr;
pub use rnto::Rnto;
pub use site::Site;
pub use size::Size;
pub use stat::Stat;
pub use stor::Stor;
pub use stou::Stou;
pub use stru::Stru;
pub use syst::Syst;
pub use type_::Type;
pub use user::User;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::error::{ControlChanError, ControlChanErrorKind};
use super::reply::{Reply, ReplyCode};
use crate::server::datachan::{TransferJob, TransferKind};
use crate::server::ftp_path;
use crate::server::session::{DataMode, Session};
use crate::storage;

// Bounded wait for the client on either side of the data connection: the
// PASV accept and the PORT connect.
const DATA_CHANNEL_TIMEOUT: Duration = Duration::from_secs(60);

// Maps an FTP path argument against the session's working directory and the
// logged-in user's root. The auth middleware guarantees a user is present for
// every path-bearing command; a missing one is a server bug.
pub(super) fn resolve(session: &Session, input: &str) -> Result<(String, PathBuf, Arc<crate::auth::User>), ControlChanError> {
    let user = session
        .user
        .clone()
        .ok_or_else(|| ControlChanError::new(ControlChanErrorKind::InternalServerError))?;
    let ftp = ftp_path::to_absolute_ftp(&session.cwd, input);
    let local = ftp_path::to_local(user.root(), &ftp);
    Ok((ftp, local, user))
}

// The 550 for a failed file operation outside of a running transfer.
pub(super) fn fs_error_reply(err: &storage::Error) -> Reply {
    Reply::new_with_string(ReplyCode::FileError, format!("Requested action not taken: {}", err.kind()))
}

pub(super) fn permission_denied() -> Reply {
    Reply::new(ReplyCode::FileError, "Permission denied")
}

// Establishes the data connection for a service command, consuming the
// session's PORT/PASV setup. Returns the reply to send when that fails.
pub(super) async fn open_data_connection(session: &mut Session) -> Result<TcpStream, Reply> {
    if session.data_busy {
        return Err(Reply::new(ReplyCode::CantOpenDataConnection, "Transfer already in progress"));
    }
    match session.take_data_mode() {
        DataMode::None => Err(Reply::new(ReplyCode::CantOpenDataConnection, "Use PORT or PASV first")),
        DataMode::Active(addr) => match timeout(DATA_CHANNEL_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(socket)) => Ok(socket),
            _ => Err(Reply::new(ReplyCode::CantOpenDataConnection, "Failed to connect to PORT address")),
        },
        DataMode::Passive(listener) => match timeout(DATA_CHANNEL_TIMEOUT, listener.accept()).await {
            Ok(Ok((socket, _remote))) => Ok(socket),
            _ => Err(Reply::new(ReplyCode::CantOpenDataConnection, "No connection on the passive data port")),
        },
    }
}

// Parks a ready-to-run transfer on the session. The control loop launches it
// after the 150 reply has been flushed, so the reply always precedes the
// first data byte.
pub(super) fn begin_transfer(session: &mut Session, socket: TcpStream, kind: TransferKind) {
    let (abort_tx, abort_rx) = mpsc::channel(1);
    session.data_abort_tx = Some(abort_tx);
    session.data_busy = true;
    session.pending_transfer = Some(TransferJob { socket, kind, abort_rx });
}
