//! Command line parsing

use super::ErrorReply;
use crate::storage::BlobName;
use std::fmt;

/// A request parsed from one command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store the `size` bytes that follow the line
    Put { name: BlobName, size: u64 },
    /// Fetch a blob
    Get { name: BlobName },
    /// Remove a blob
    Delete { name: BlobName },
}

impl Command {
    /// Parse a trimmed, non-empty command line.
    ///
    /// Arguments are separated by single spaces; runs of spaces produce
    /// empty arguments and fail the arity check. Names are taken as raw
    /// bytes, see [`BlobName::from_bytes`].
    pub fn parse(line: &[u8]) -> Result<Self, ErrorReply> {
        let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();

        match parts[0] {
            b"PUT" => {
                if parts.len() != 3 {
                    return Err(ErrorReply::PutUsage);
                }
                let name = BlobName::from_bytes(parts[1]);
                let size = parse_size(parts[2]).ok_or(ErrorReply::InvalidSize)?;
                Ok(Command::Put { name, size })
            }
            b"GET" => {
                if parts.len() != 2 {
                    return Err(ErrorReply::GetUsage);
                }
                Ok(Command::Get {
                    name: BlobName::from_bytes(parts[1]),
                })
            }
            b"DELETE" => {
                if parts.len() != 2 {
                    return Err(ErrorReply::DeleteUsage);
                }
                Ok(Command::Delete {
                    name: BlobName::from_bytes(parts[1]),
                })
            }
            _ => Err(ErrorReply::UnknownCommand),
        }
    }

    #[cfg(test)]
    pub fn name(&self) -> &BlobName {
        match self {
            Command::Put { name, .. } | Command::Get { name } | Command::Delete { name } => name,
        }
    }
}

/// Formats the command as its wire line, without the newline
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Put { name, size } => write!(f, "PUT {} {}", name, size),
            Command::Get { name } => write!(f, "GET {}", name),
            Command::Delete { name } => write!(f, "DELETE {}", name),
        }
    }
}

/// Decimal size with an optional sign; negative values are rejected
fn parse_size(token: &[u8]) -> Option<u64> {
    let size: i64 = std::str::from_utf8(token).ok()?.parse().ok()?;
    u64::try_from(size).ok()
}
