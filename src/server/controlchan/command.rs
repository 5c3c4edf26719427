use std::net::SocketAddrV4;

/// A parsed FTP command. Verbs the parser does not know about never construct
/// a `Command`; they surface as an unknown-command error (reply 500).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `USER <name>`
    User {
        /// The username offered for login.
        username: String,
    },
    /// `PASS <password>`
    Pass {
        /// The password for the pending username.
        password: String,
    },
    /// `ACCT <info>` — accounting is never needed here.
    Acct,
    /// `CWD <path>`
    Cwd {
        /// The target directory, absolute or relative.
        path: String,
    },
    /// `CDUP`
    Cdup,
    /// `REIN` — reset the session to its fresh-connection state.
    Rein,
    /// `QUIT`
    Quit,
    /// `PORT h1,h2,h3,h4,p1,p2`
    Port {
        /// The client endpoint to connect to for the next transfer.
        addr: SocketAddrV4,
    },
    /// `PASV`
    Pasv,
    /// `TYPE <param>` — the raw parameter; only `A` and `I` are accepted.
    Type {
        /// The raw representation-type parameter.
        param: String,
    },
    /// `STRU <param>` — only `F` is accepted.
    Stru {
        /// The raw file-structure parameter.
        param: String,
    },
    /// `MODE <param>` — only `S` is accepted.
    Mode {
        /// The raw transfer-mode parameter.
        param: String,
    },
    /// `RETR <path>`
    Retr {
        /// The file to send to the client.
        path: String,
    },
    /// `STOR <path>`
    Stor {
        /// The file to receive from the client.
        path: String,
    },
    /// `STOU`
    Stou,
    /// `APPE <path>`
    Appe {
        /// The file to append client data to.
        path: String,
    },
    /// `ALLO` — storage allocation is superfluous here.
    Allo,
    /// `REST <offset>`
    Rest {
        /// The byte offset for the next STOR/RETR.
        offset: u64,
    },
    /// `RNFR <path>`
    Rnfr {
        /// The rename source.
        path: String,
    },
    /// `RNTO <path>`
    Rnto {
        /// The rename destination.
        path: String,
    },
    /// `ABOR`
    Abor,
    /// `DELE <path>`
    Dele {
        /// The file to delete.
        path: String,
    },
    /// `RMD <path>`
    Rmd {
        /// The directory to remove.
        path: String,
    },
    /// `MKD <path>`
    Mkd {
        /// The directory to create.
        path: String,
    },
    /// `PWD`
    Pwd,
    /// `LIST [path]`
    List {
        /// The directory to list; the working directory when absent.
        path: Option<String>,
    },
    /// `NLST [path]`
    Nlst {
        /// The directory to list; the working directory when absent.
        path: Option<String>,
    },
    /// `SITE <param>`
    Site,
    /// `SYST`
    Syst,
    /// `STAT [path]`
    Stat,
    /// `HELP`
    Help,
    /// `NOOP`
    Noop,
    /// `FEAT`
    Feat,
    /// `OPTS <option>`
    Opts {
        /// The raw option string.
        option: String,
    },
    /// `SIZE <path>`
    Size {
        /// The file whose size is requested.
        path: String,
    },
}
