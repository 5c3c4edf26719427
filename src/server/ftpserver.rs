//! The server facade: configure, register users, start, stop.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Permissions, UserDatabase};
use crate::server::controlchan::control_loop;
use crate::server::shutdown;

const DEFAULT_GREETING: &str = "Welcome to the ftplet FTP server";
const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 300;
// Bounded wait for sessions to finish after stop() fires the shutdown signal.
const STOP_LINGER: Duration = Duration::from_secs(5);

/// Observes the command dialogue: called with `(command, param, reply_code,
/// reply_text)` after each reply has been put on the wire and before the next
/// command is dispatched. Invoked synchronously on a worker thread, so it
/// must not block; hand work off to your own executor if you need to.
pub type CommandCallback = Arc<dyn Fn(&str, &str, u32, &str) + Send + Sync>;

/// An embeddable FTP server.
///
/// Configure it, register users, then [`start`](Server::start) it on a worker
/// pool. The server accepts connections until [`stop`](Server::stop), which
/// closes all session sockets promptly — clients receive no farewell.
///
/// # Example
///
/// ```no_run
/// use ftplet::{auth::Permissions, Server};
///
/// let mut server = Server::new("127.0.0.1", 2121);
/// server.add_user("alice", "secret", "/srv/ftp/alice", Permissions::ALL);
/// assert!(server.start(2));
/// println!("listening on {}:{}", server.address(), server.port());
/// server.stop();
/// ```
pub struct Server {
    address: String,
    port: u16,
    greeting: String,
    idle_session_timeout: Duration,
    logger: slog::Logger,
    users: UserDatabase,
    callback: Option<CommandCallback>,
    running: Option<Running>,
}

// The parts that only exist while the server is started.
struct Running {
    runtime: tokio::runtime::Runtime,
    shutdown: Arc<shutdown::Notifier>,
    bound_addr: SocketAddr,
    open_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Creates a server that will listen on the given address and port.
    /// Use "0.0.0.0" to accept connections on any interface and port 0 to
    /// let the operating system pick a free port (query it with
    /// [`port`](Server::port) after starting).
    pub fn new<A: Into<String>>(address: A, port: u16) -> Self {
        Server {
            address: address.into(),
            port,
            greeting: DEFAULT_GREETING.to_string(),
            idle_session_timeout: Duration::from_secs(DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            logger: slog::Logger::root(slog::Discard, slog::o!()),
            users: UserDatabase::new(),
            callback: None,
            running: None,
        }
    }

    /// Creates a server listening on all interfaces ("0.0.0.0").
    pub fn with_port(port: u16) -> Self {
        Server::new("0.0.0.0", port)
    }

    /// Sets the greeting sent in the 220 welcome reply.
    pub fn greeting<T: Into<String>>(&mut self, greeting: T) -> &mut Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the structured logger the server and its sessions log to.
    /// The default discards everything.
    pub fn logger(&mut self, logger: slog::Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// Sets the idle session timeout in seconds. The default is 300.
    pub fn idle_session_timeout(&mut self, secs: u64) -> &mut Self {
        self.idle_session_timeout = Duration::from_secs(secs);
        self
    }

    /// Registers a user. See [`UserDatabase::add_user`] for the rejection
    /// rules. Returns false once the server is running.
    pub fn add_user<P: Into<std::path::PathBuf>>(&mut self, username: &str, password: &str, root: P, permissions: Permissions) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.users.add_user(username, password, root, permissions)
    }

    /// Registers the password-less "anonymous"/"ftp" account.
    /// Returns false once the server is running.
    pub fn add_anonymous<P: Into<std::path::PathBuf>>(&mut self, root: P, permissions: Permissions) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.users.add_anonymous(root, permissions)
    }

    /// Installs the command observer. Must be set before starting.
    pub fn set_command_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&str, &str, u32, &str) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Starts serving on a pool of `thread_count` worker threads.
    ///
    /// Returns false — with an error-level log entry — when the server is
    /// already running, `thread_count` is zero, the address does not parse,
    /// or binding fails.
    pub fn start(&mut self, thread_count: usize) -> bool {
        if self.running.is_some() || thread_count == 0 {
            slog::error!(self.logger, "Cannot start: already running or zero worker threads requested");
            return false;
        }
        let ip = match IpAddr::from_str(&self.address) {
            Ok(ip) => ip,
            Err(err) => {
                slog::error!(self.logger, "Cannot start: invalid listen address {}: {}", self.address, err);
                return false;
            }
        };
        // Bind synchronously so the chosen port is known before we return.
        let std_listener = match std::net::TcpListener::bind(SocketAddr::new(ip, self.port)) {
            Ok(listener) => listener,
            Err(err) => {
                slog::error!(self.logger, "Cannot start: bind to {}:{} failed: {}", self.address, self.port, err);
                return false;
            }
        };
        if let Err(err) = std_listener.set_nonblocking(true) {
            slog::error!(self.logger, "Cannot start: could not configure listener: {}", err);
            return false;
        }
        let bound_addr = match std_listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                slog::error!(self.logger, "Cannot start: could not query bound address: {}", err);
                return false;
            }
        };

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(thread_count)
            .thread_name("ftplet-worker")
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                slog::error!(self.logger, "Cannot start: worker pool creation failed: {}", err);
                return false;
            }
        };

        let shutdown = Arc::new(shutdown::Notifier::new());
        let open_connections = Arc::new(AtomicUsize::new(0));

        let config_template = AcceptLoop {
            users: Arc::new(self.users.clone()),
            greeting: self.greeting.clone(),
            idle_timeout: self.idle_session_timeout,
            callback: self.callback.clone(),
            logger: self.logger.clone(),
            shutdown: shutdown.clone(),
            open_connections: open_connections.clone(),
        };
        runtime.spawn(config_template.run(std_listener));

        slog::info!(self.logger, "Server started"; "address" => %bound_addr, "workers" => thread_count);
        self.running = Some(Running {
            runtime,
            shutdown,
            bound_addr,
            open_connections,
        });
        true
    }

    /// Stops the server: the acceptor is cancelled, every session socket is
    /// closed promptly (clients are not informed), in-flight transfers are
    /// cancelled, and the worker pool is joined.
    ///
    /// Must not be called from inside the pool (e.g. from the command
    /// callback); it blocks the calling thread while the pool winds down.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.notify();
            let shutdown = running.shutdown.clone();
            running.runtime.block_on(async move {
                let _ = tokio::time::timeout(STOP_LINGER, shutdown.linger()).await;
            });
            running.runtime.shutdown_timeout(STOP_LINGER);
            slog::info!(self.logger, "Server stopped");
        }
    }

    /// The port the server listens on: the configured one, or the port the
    /// operating system picked when configured with port 0 and started.
    pub fn port(&self) -> u16 {
        match &self.running {
            Some(running) => running.bound_addr.port(),
            None => self.port,
        }
    }

    /// The address the server was configured to listen on.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The number of currently open control connections.
    pub fn open_connection_count(&self) -> usize {
        match &self.running {
            Some(running) => running.open_connections.load(Ordering::SeqCst),
            None => 0,
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

// The accept loop: one session task per accepted control connection, until
// the shutdown notifier fires.
struct AcceptLoop {
    users: Arc<UserDatabase>,
    greeting: String,
    idle_timeout: Duration,
    callback: Option<CommandCallback>,
    logger: slog::Logger,
    shutdown: Arc<shutdown::Notifier>,
    open_connections: Arc<AtomicUsize>,
}

impl AcceptLoop {
    async fn run(self, std_listener: std::net::TcpListener) {
        let listener = match tokio::net::TcpListener::from_std(std_listener) {
            Ok(listener) => listener,
            Err(err) => {
                slog::error!(self.logger, "Could not adopt listener into the worker pool: {}", err);
                return;
            }
        };
        let mut shutdown_listener = self.shutdown.subscribe();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((tcp_stream, peer)) => {
                            slog::info!(self.logger, "Incoming control connection"; "peer" => %peer);
                            let config = control_loop::Config {
                                users: self.users.clone(),
                                greeting: self.greeting.clone(),
                                idle_timeout: self.idle_timeout,
                                callback: self.callback.clone(),
                                logger: self.logger.clone(),
                                shutdown: self.shutdown.clone(),
                                open_connections: self.open_connections.clone(),
                            };
                            if let Err(err) = control_loop::spawn(config, tcp_stream).await {
                                slog::warn!(self.logger, "Could not start session: {:?}", err);
                            }
                        }
                        Err(err) => {
                            slog::warn!(self.logger, "Accept failed: {}", err);
                        }
                    }
                }
                _ = shutdown_listener.listen() => {
                    slog::info!(self.logger, "Acceptor shutting down");
                    return;
                }
            }
        }
    }
}
