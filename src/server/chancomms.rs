//! Messages sent from a session's data-transfer task back to its control loop.

/// The outcome notifications a transfer task emits. The control loop turns
/// each into the closing reply of the transfer and releases the session's
/// transfer state.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlChanMsg {
    /// The transfer ran to completion; the data socket is drained and closed.
    TransferDone {
        /// Bytes moved over the data channel.
        bytes: u64,
    },
    /// The transfer was cancelled by ABOR and the data socket closed.
    TransferAborted,
    /// Follows `TransferAborted`: the abort is fully processed.
    AbortAcknowledged,
    /// The data connection failed (peer reset, broken pipe).
    DataChannelError,
    /// Reading or writing the local file failed mid-transfer.
    LocalFsError,
}
