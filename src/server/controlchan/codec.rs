use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use super::error::{ControlChanError, ControlChanErrorKind};
use super::reply::Reply;

// No RFC 959 command line comes anywhere near this; anything longer is a
// client gone wrong and ends the session.
const MAX_LINE_BYTES: usize = 8 * 1024;

// FtpCodec hooks the control channel into tokio's `Decoder`/`Encoder`
// machinery: inbound CRLF-terminated command lines (bare LF tolerated),
// outbound replies in the wire form [`Reply::to_wire`] produces.
pub struct FtpCodec;

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec
    }
}

impl Decoder for FtpCodec {
    type Item = String;
    type Error = ControlChanError;

    // Splits off one line per call and strips its terminator; tokenizing is
    // the line parser's job.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let newline = buf.iter().position(|&byte| byte == b'\n');
        let line = match newline {
            Some(index) => buf.split_to(index + 1),
            None if buf.len() > MAX_LINE_BYTES => {
                return Err(ControlChanError::new(ControlChanErrorKind::BadArgument));
            }
            None => return Ok(None),
        };
        let line = std::str::from_utf8(&line)?;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        buf.extend_from_slice(reply.to_wire().as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::ReplyCode;
    use pretty_assertions::assert_eq;

    fn encode(reply: Reply) -> String {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn encodes_single_line_with_crlf() {
        assert_eq!(encode(Reply::new(ReplyCode::CommandOkay, "Okay")), "200 Okay\r\n");
    }

    #[test]
    fn encodes_multi_line_per_rfc959() {
        let reply = Reply::new_multiline(ReplyCode::SystemStatus, vec!["Features", " SIZE", " REST STREAM", "End"]);
        assert_eq!(encode(reply), "211-Features\r\n SIZE\r\n REST STREAM\r\n211 End\r\n");
    }

    #[test]
    fn encodes_nothing_for_none() {
        assert_eq!(encode(Reply::none()), "");
    }

    #[test]
    fn decodes_lines_separated_by_crlf_or_lf() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"USER alice\r\nNOOP\nQUI"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("USER alice".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("NOOP".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend(&b"T\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("QUIT".to_string()));
    }

    #[test]
    fn rejects_non_utf8_lines() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"USER \xff\xfe\r\n"[..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn rejects_unterminated_overlong_lines() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::new();
        buf.extend(std::iter::repeat(b'A').take(MAX_LINE_BYTES + 1));
        assert!(codec.decode(&mut buf).is_err());
    }
}
