/// A reply to the FTP client.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Send nothing; the reply will arrive later (e.g. after a transfer).
    None,
    /// A single-line reply.
    CodeAndMsg {
        /// The three-digit reply code.
        code: ReplyCode,
        /// The human-readable text after the code.
        msg: String,
    },
    /// A multi-line reply per RFC 959 (`NNN-first ... NNN last`).
    MultiLine {
        /// The three-digit reply code.
        code: ReplyCode,
        /// The lines; the first gets the `NNN-` prefix, the last `NNN `.
        lines: Vec<String>,
    },
}

/// The RFC 959 reply codes used by this server.
//
// The three digits form a code. Codes between 100 and 199 indicate marks;
// codes between 200 and 399 indicate acceptance; codes between 400 and 599
// indicate rejection. Clients should not look past the first digit; the rest
// is for human consumption, except the special formats of 227 and 257.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[allow(dead_code)]
pub enum ReplyCode {
    /// 150
    FileStatusOkay = 150,

    /// 200
    CommandOkay = 200,
    /// 202
    CommandSuperfluous = 202,
    /// 211
    SystemStatus = 211,
    /// 213
    FileStatus = 213,
    /// 214
    HelpMessage = 214,
    /// 215
    SystemType = 215,
    /// 220
    ServiceReady = 220,
    /// 221
    ClosingControlConnection = 221,
    /// 225
    DataConnectionOpen = 225,
    /// 226
    ClosingDataConnection = 226,
    /// 227
    EnteringPassiveMode = 227,
    /// 230
    UserLoggedIn = 230,
    /// 250
    FileActionOkay = 250,
    /// 257
    PathCreated = 257,

    /// 331
    NeedPassword = 331,
    /// 332
    NeedAccount = 332,
    /// 350
    FileActionPending = 350,

    /// 421
    ServiceNotAvailable = 421,
    /// 425
    CantOpenDataConnection = 425,
    /// 426
    ConnectionClosed = 426,
    /// 430
    InvalidUsernameOrPassword = 430,
    /// 450
    TransientFileError = 450,
    /// 451
    LocalError = 451,

    /// 500
    CommandSyntaxError = 500,
    /// 501
    ParameterSyntaxError = 501,
    /// 502
    CommandNotImplemented = 502,
    /// 503
    BadCommandSequence = 503,
    /// 504
    ParameterNotImplemented = 504,
    /// 530
    NotLoggedIn = 530,
    /// 532
    NeedAccountToStore = 532,
    /// 550
    FileError = 550,
    /// 552
    ExceededStorageAllocation = 552,
    /// 553
    BadFileName = 553,
}

impl Reply {
    /// A single-line reply from a static message.
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    /// A single-line reply from an owned message.
    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    /// A multi-line reply.
    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| item.to_string()).collect(),
        }
    }

    /// The no-reply.
    pub fn none() -> Self {
        Reply::None
    }

    /// The numeric code, or 0 for [`Reply::None`].
    pub fn code(&self) -> u32 {
        match self {
            Reply::None => 0,
            Reply::CodeAndMsg { code, .. } | Reply::MultiLine { code, .. } => *code as u32,
        }
    }

    /// The reply text: the message of a single-line reply, or the lines of a
    /// multi-line reply joined with newlines.
    pub fn text(&self) -> String {
        match self {
            Reply::None => String::new(),
            Reply::CodeAndMsg { msg, .. } => msg.clone(),
            Reply::MultiLine { lines, .. } => lines.join("\n"),
        }
    }

    /// Serializes the reply into its wire form, every line CRLF-terminated.
    /// [`Reply::None`] serializes to nothing.
    pub fn to_wire(&self) -> String {
        match self {
            Reply::None => String::new(),
            Reply::CodeAndMsg { code, msg } if msg.is_empty() => format!("{}\r\n", *code as u32),
            Reply::CodeAndMsg { code, msg } => format!("{} {}\r\n", *code as u32, msg),
            Reply::MultiLine { code, lines } => {
                let code = *code as u32;
                let (last, opening) = match lines.split_last() {
                    Some(split) => split,
                    None => return format!("{}\r\n", code),
                };
                if opening.is_empty() {
                    return format!("{} {}\r\n", code, last);
                }
                let mut wire = String::new();
                for (position, line) in opening.iter().enumerate() {
                    if position == 0 {
                        wire.push_str(&format!("{}-{}\r\n", code, line));
                        continue;
                    }
                    // An intermediate line that opens with a digit could be
                    // mistaken for the closing line; a leading space
                    // disambiguates it.
                    if line.starts_with(|c: char| c.is_ascii_digit()) {
                        wire.push(' ');
                    }
                    wire.push_str(line);
                    wire.push_str("\r\n");
                }
                wire.push_str(&format!("{} {}\r\n", code, last));
                wire
            }
        }
    }
}
