//! Response lines

use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

/// Failures reported to the client as `ERR <message>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorReply {
    #[error("unknown command")]
    UnknownCommand,

    #[error("usage: PUT <filename> <size>")]
    PutUsage,

    #[error("invalid size")]
    InvalidSize,

    #[error("cannot create file")]
    CannotCreate,

    #[error("failed to read data")]
    ReadFailed,

    #[error("usage: GET <filename>")]
    GetUsage,

    #[error("file not found")]
    NotFound,

    #[error("usage: DELETE <filename>")]
    DeleteUsage,

    #[error("cannot delete file")]
    CannotDelete,
}

/// A status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK`
    Ok,
    /// `OK <size>`, followed on the wire by exactly `size` body bytes
    Data(u64),
    /// `ERR <message>`
    Error(String),
}

impl From<ErrorReply> for Response {
    fn from(reply: ErrorReply) -> Self {
        Response::Error(reply.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => f.write_str("OK"),
            Response::Data(size) => write!(f, "OK {}", size),
            Response::Error(msg) => write!(f, "ERR {}", msg),
        }
    }
}

/// Write a status line. The caller flushes.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    writeln!(writer, "{}", response)
}

/// Parse a status line with its newline already removed
pub fn parse_response(line: &str) -> Option<Response> {
    let line = line.trim_end_matches('\r');
    if line == "OK" {
        return Some(Response::Ok);
    }
    if let Some(size) = line.strip_prefix("OK ") {
        return size.parse().ok().map(Response::Data);
    }
    if line == "ERR" {
        return Some(Response::Error(String::new()));
    }
    line.strip_prefix("ERR ")
        .map(|msg| Response::Error(msg.to_string()))
}
