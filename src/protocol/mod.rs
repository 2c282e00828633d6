//! File protocol handling
//!
//! Line-oriented text protocol, one command per `\n`-terminated line:
//!
//! ```text
//! PUT <name> <size>\n<size raw bytes>   ->  OK
//! GET <name>                            ->  OK <size>\n<size raw bytes>
//! DELETE <name>                         ->  OK
//! ```
//!
//! Any failure is answered with a single `ERR <message>` line.

mod command;
mod response;

pub use command::Command;
pub use response::{parse_response, write_response, ErrorReply, Response};

use std::io::{self, BufRead, Read};

/// Default TCP port of the file server
pub const DEFAULT_PORT: u16 = 9000;

/// Longest command or response line accepted, newline included
pub const MAX_LINE_LEN: u64 = 64 * 1024;

/// Read one `\n`-terminated line without the terminator.
///
/// Returns `None` at end of stream. A trailing fragment with no newline
/// before EOF is dropped. The bytes are returned as sent; names need not be
/// UTF-8.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let read = reader.take(MAX_LINE_LEN).read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') {
        if read as u64 == MAX_LINE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line exceeds {} bytes", MAX_LINE_LEN),
            ));
        }
        return Ok(None);
    }

    buf.pop();
    Ok(Some(buf))
}
