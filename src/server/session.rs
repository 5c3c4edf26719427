//! Per-connection session state.
//!
//! A session is shared between the control loop and any running data-transfer
//! task through an `Arc<Mutex<..>>`; the mutex is the command serializer — no
//! state mutation happens outside of it.

use std::fmt::{self, Formatter};
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc::Sender;

use crate::auth::User;
use crate::server::datachan::TransferJob;

// TraceId correlates the log statements of one session.
#[derive(PartialEq, Eq, Debug)]
pub struct TraceId(u64);

impl TraceId {
    pub fn new() -> Self {
        TraceId(rand::random())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SessionState {
    // Waiting for USER.
    New,
    // USER received, waiting for PASS.
    WaitPass,
    // Logged in.
    WaitCmd,
}

// How the next data connection will be established.
#[derive(Debug, Default)]
pub enum DataMode {
    #[default]
    None,
    // We connect out to the client endpoint given via PORT.
    Active(SocketAddrV4),
    // The client connects in to the acceptor we bound for PASV.
    Passive(TcpListener),
}

// The session shared between the control and data sides.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

// Decrements the server's open-connection gauge when the session goes away.
#[derive(Debug)]
pub struct ConnectionGuard(Arc<AtomicUsize>);

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard(counter)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// This is where we keep the state for an FTP session.
#[derive(Debug)]
pub struct Session {
    pub trace_id: TraceId,
    pub source: SocketAddr,
    // The authenticated account. None until login completes.
    pub user: Option<Arc<User>>,
    // The username offered by USER, pending its PASS.
    pub username_candidate: Option<String>,
    pub state: SessionState,
    // The virtual working directory, always absolute and normalized.
    pub cwd: String,
    pub data_mode: DataMode,
    // TYPE I selects binary; TYPE A selects ASCII. The wire is binary either
    // way, but SIZE refuses to answer in ASCII type.
    pub binary_type: bool,
    // Set by REST, consumed by the next STOR/RETR/APPE attempt.
    pub restart_offset: u64,
    // Set by RNFR, consumed by an immediately following RNTO; any other
    // command clears it.
    pub rename_from: Option<String>,
    // The verb/param of the command being processed, handed to the command
    // observer with every reply.
    pub last_command: String,
    pub last_param: String,
    // True while a data transfer is in flight.
    pub data_busy: bool,
    // Signals the running transfer task to stop (ABOR).
    pub data_abort_tx: Option<Sender<()>>,
    // A transfer prepared by a service command, launched by the control loop
    // once the 150 reply has been flushed.
    pub pending_transfer: Option<TransferJob>,
    // Set by QUIT; the control loop closes after flushing the 221.
    pub shutdown_requested: bool,
    _guard: ConnectionGuard,
}

impl Session {
    pub fn new(source: SocketAddr, guard: ConnectionGuard) -> Self {
        Session {
            trace_id: TraceId::new(),
            source,
            user: None,
            username_candidate: None,
            state: SessionState::New,
            cwd: "/".to_string(),
            data_mode: DataMode::None,
            binary_type: false,
            restart_offset: 0,
            rename_from: None,
            last_command: String::new(),
            last_param: String::new(),
            data_busy: false,
            data_abort_tx: None,
            pending_transfer: None,
            shutdown_requested: false,
            _guard: guard,
        }
    }

    // REIN: back to the state right after the connection was opened.
    pub fn reinitialize(&mut self) {
        self.user = None;
        self.username_candidate = None;
        self.state = SessionState::New;
        self.cwd = "/".to_string();
        self.data_mode = DataMode::None;
        self.binary_type = false;
        self.restart_offset = 0;
        self.rename_from = None;
    }

    // Consumes the transfer setup; PORT/PASV must be issued anew afterwards.
    pub fn take_data_mode(&mut self) -> DataMode {
        std::mem::take(&mut self.data_mode)
    }

    // The restart offset is one-shot.
    pub fn take_restart_offset(&mut self) -> u64 {
        std::mem::take(&mut self.restart_offset)
    }
}
