//! Turns raw control-channel lines into [`Command`]s.
//!
//! A line is `VERB [SP param]` terminated by CRLF (bare LF tolerated). The
//! verb is case-insensitive; the parameter is everything after the first
//! space, verbatim. Parameter validation that maps to reply 501 happens here;
//! parameters that are syntactically fine but unsupported (TYPE/STRU/MODE
//! values) are left to the handlers, which answer 504.

use std::net::{Ipv4Addr, SocketAddrV4};

use super::command::Command;
use super::error::{ControlChanError, ControlChanErrorKind};

/// Splits a line into its uppercased verb and verbatim parameter.
pub fn tokenize(line: &str) -> (String, String) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(' ') {
        Some((verb, param)) => (verb.to_ascii_uppercase(), param.to_string()),
        None => (line.to_ascii_uppercase(), String::new()),
    }
}

/// Parses a tokenized command. `verb` must already be uppercased.
pub fn parse(verb: &str, param: &str) -> Result<Command, ControlChanError> {
    let cmd = match verb {
        "USER" => Command::User {
            username: required(param)?.to_string(),
        },
        "PASS" => Command::Pass {
            password: param.to_string(),
        },
        "ACCT" => Command::Acct,
        "CWD" | "XCWD" => Command::Cwd {
            path: required(param)?.to_string(),
        },
        "CDUP" => Command::Cdup,
        "REIN" => Command::Rein,
        "QUIT" => Command::Quit,
        "PORT" => Command::Port {
            addr: parse_port_param(param)?,
        },
        "PASV" => Command::Pasv,
        "TYPE" => Command::Type { param: param.to_string() },
        "STRU" => Command::Stru { param: param.to_string() },
        "MODE" => Command::Mode { param: param.to_string() },
        "RETR" => Command::Retr {
            path: required(param)?.to_string(),
        },
        "STOR" => Command::Stor {
            path: required(param)?.to_string(),
        },
        "STOU" => Command::Stou,
        "APPE" => Command::Appe {
            path: required(param)?.to_string(),
        },
        "ALLO" => Command::Allo,
        "REST" => {
            let offset = param
                .trim()
                .parse::<u64>()
                .map_err(|_| ControlChanError::new(ControlChanErrorKind::BadArgument))?;
            Command::Rest { offset }
        }
        "RNFR" => Command::Rnfr {
            path: required(param)?.to_string(),
        },
        "RNTO" => Command::Rnto {
            path: required(param)?.to_string(),
        },
        "ABOR" => Command::Abor,
        "DELE" => Command::Dele {
            path: required(param)?.to_string(),
        },
        "RMD" | "XRMD" => Command::Rmd {
            path: required(param)?.to_string(),
        },
        "MKD" | "XMKD" => Command::Mkd {
            path: required(param)?.to_string(),
        },
        "PWD" | "XPWD" => Command::Pwd,
        "LIST" => Command::List { path: listing_path(param) },
        "NLST" => Command::Nlst { path: listing_path(param) },
        "SITE" => Command::Site,
        "SYST" => Command::Syst,
        "STAT" => Command::Stat,
        "HELP" => Command::Help,
        "NOOP" => Command::Noop,
        "FEAT" => Command::Feat,
        "OPTS" => Command::Opts {
            option: required(param)?.to_string(),
        },
        "SIZE" => Command::Size {
            path: required(param)?.to_string(),
        },
        _ => {
            return Err(ControlChanError::new(ControlChanErrorKind::UnknownCommand {
                command: verb.to_string(),
            }))
        }
    };
    Ok(cmd)
}

fn required(param: &str) -> Result<&str, ControlChanError> {
    if param.is_empty() {
        Err(ControlChanError::new(ControlChanErrorKind::BadArgument))
    } else {
        Ok(param)
    }
}

// LIST/NLST take an optional path; clients routinely prepend ls-style flags
// ("-al"), which we strip and otherwise ignore.
fn listing_path(param: &str) -> Option<String> {
    param
        .split(' ')
        .filter(|token| !token.is_empty() && !token.starts_with('-'))
        .map(|token| token.to_string())
        .next()
}

// PORT h1,h2,h3,h4,p1,p2 with all six values in 0..=255.
fn parse_port_param(param: &str) -> Result<SocketAddrV4, ControlChanError> {
    let mut bytes = [0u8; 6];
    let mut count = 0;
    for part in param.split(',') {
        if count == 6 {
            return Err(ControlChanError::new(ControlChanErrorKind::BadArgument));
        }
        bytes[count] = part
            .trim()
            .parse::<u8>()
            .map_err(|_| ControlChanError::new(ControlChanErrorKind::BadArgument))?;
        count += 1;
    }
    if count != 6 {
        return Err(ControlChanError::new(ControlChanErrorKind::BadArgument));
    }
    let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
    let port = u16::from(bytes[4]) * 256 + u16::from(bytes[5]);
    Ok(SocketAddrV4::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokenize_uppercases_the_verb_only() {
        assert_eq!(tokenize("stor My File.txt\r\n"), ("STOR".to_string(), "My File.txt".to_string()));
        assert_eq!(tokenize("noop\n"), ("NOOP".to_string(), String::new()));
    }

    #[test]
    fn parameter_keeps_embedded_spaces() {
        let cmd = parse("RETR", "dir with spaces/file name").unwrap();
        assert_eq!(
            cmd,
            Command::Retr {
                path: "dir with spaces/file name".to_string()
            }
        );
    }

    #[test]
    fn unknown_verb_is_an_error() {
        let err = parse("EPSV", "").unwrap_err();
        assert!(matches!(err.kind(), ControlChanErrorKind::UnknownCommand { .. }));
    }

    #[test]
    fn missing_required_parameter_is_an_error() {
        let err = parse("RETR", "").unwrap_err();
        assert!(matches!(err.kind(), ControlChanErrorKind::BadArgument));
    }

    #[test]
    fn empty_password_is_allowed() {
        assert_eq!(parse("PASS", "").unwrap(), Command::Pass { password: String::new() });
    }

    #[test]
    fn port_parses_the_six_tuple() {
        let cmd = parse("PORT", "127,0,0,1,4,1").unwrap();
        assert_eq!(
            cmd,
            Command::Port {
                addr: SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 4 * 256 + 1)
            }
        );
        assert!(parse("PORT", "1,2,3,4,5").is_err());
        assert!(parse("PORT", "1,2,3,4,5,6,7").is_err());
        assert!(parse("PORT", "256,0,0,1,0,1").is_err());
    }

    #[test]
    fn rest_parses_the_offset() {
        assert_eq!(parse("REST", "1024").unwrap(), Command::Rest { offset: 1024 });
        assert!(parse("REST", "minus one").is_err());
        assert!(parse("REST", "-1").is_err());
    }

    #[test]
    fn list_strips_ls_flags() {
        assert_eq!(parse("LIST", "-al").unwrap(), Command::List { path: None });
        assert_eq!(
            parse("LIST", "-l subdir").unwrap(),
            Command::List {
                path: Some("subdir".to_string())
            }
        );
        assert_eq!(parse("LIST", "").unwrap(), Command::List { path: None });
    }

    #[test]
    fn type_parameter_is_kept_raw() {
        assert_eq!(parse("TYPE", "I").unwrap(), Command::Type { param: "I".to_string() });
        assert_eq!(parse("TYPE", "X").unwrap(), Command::Type { param: "X".to_string() });
    }
}
