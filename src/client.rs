//! File server client
//!
//! Blocking client for the line protocol. One `FileClient` owns one
//! connection and can issue any number of commands on it, though a gateway
//! typically connects, sends a single command and drops the client.

use crate::protocol::{parse_response, read_line, Command, ErrorReply, Response};
use crate::storage::BlobName;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use thiserror::Error;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("server error: {0}")]
    Server(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}

impl ClientError {
    /// Whether the server reported that the file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Server(msg) if *msg == ErrorReply::NotFound.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Connection to a file server
pub struct FileClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl FileClient {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);
        Ok(Self { reader, writer })
    }

    /// Store `data` under `name`
    pub fn put(&mut self, name: &str, data: &[u8]) -> ClientResult<()> {
        self.put_from(name, data, data.len() as u64)
    }

    /// Store exactly `size` bytes read from `body` under `name`
    pub fn put_from<R: Read>(&mut self, name: &str, body: R, size: u64) -> ClientResult<()> {
        let command = Command::Put {
            name: wire_name(name)?,
            size,
        };
        writeln!(self.writer, "{}", command)?;

        let sent = io::copy(&mut body.take(size), &mut self.writer)?;
        if sent != size {
            // The server is still waiting for the rest; the connection is
            // unusable from here on.
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", sent, size),
            )));
        }
        self.writer.flush()?;

        match self.read_response()? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch the whole content of `name`
    pub fn get(&mut self, name: &str) -> ClientResult<Vec<u8>> {
        let mut data = Vec::new();
        self.get_to(name, &mut data)?;
        Ok(data)
    }

    /// Stream the content of `name` into `out`, returning its size
    pub fn get_to<W: Write>(&mut self, name: &str, out: &mut W) -> ClientResult<u64> {
        self.send(&Command::Get {
            name: wire_name(name)?,
        })?;

        let size = match self.read_response()? {
            Response::Data(size) => size,
            other => return Err(unexpected(other)),
        };

        let received = io::copy(&mut (&mut self.reader).take(size), out)?;
        if received != size {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", received, size),
            )));
        }

        Ok(size)
    }

    /// Delete `name`
    pub fn delete(&mut self, name: &str) -> ClientResult<()> {
        self.send(&Command::Delete {
            name: wire_name(name)?,
        })?;

        match self.read_response()? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn send(&mut self, command: &Command) -> ClientResult<()> {
        writeln!(self.writer, "{}", command)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_response(&mut self) -> ClientResult<Response> {
        let line = read_line(&mut self.reader)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )
        })?;
        let line = String::from_utf8_lossy(&line);

        parse_response(&line)
            .ok_or_else(|| ClientError::Protocol(format!("malformed response: {:?}", line)))
    }
}

/// Names travel as a single space-delimited token
fn wire_name(name: &str) -> ClientResult<BlobName> {
    let sanitized = BlobName::sanitize(name);
    if name.chars().any(char::is_whitespace) || !sanitized.is_valid() {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error(msg) => ClientError::Server(msg),
        other => ClientError::Protocol(format!("unexpected response: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::spawn_server;

    #[test]
    fn test_round_trip() {
        let (addr, _dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        client.put("notes.txt", b"some notes").unwrap();
        assert_eq!(client.get("notes.txt").unwrap(), b"some notes");

        client.put("notes.txt", b"v2").unwrap();
        assert_eq!(client.get("notes.txt").unwrap(), b"v2");

        client.delete("notes.txt").unwrap();
        let err = client.get("notes.txt").unwrap_err();
        assert!(err.is_not_found(), "{}", err);
    }

    #[test]
    fn test_put_from_reader_and_get_to_writer() {
        let (addr, dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();
        let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

        client
            .put_from("big.bin", payload.as_slice(), payload.len() as u64)
            .unwrap();
        assert_eq!(std::fs::read(dir.path().join("big.bin")).unwrap(), payload);

        let mut out = Vec::new();
        let size = client.get_to("big.bin", &mut out).unwrap();
        assert_eq!(size, payload.len() as u64);
        assert_eq!(out, payload);
    }

    #[test]
    fn test_empty_file() {
        let (addr, _dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        client.put("empty", b"").unwrap();
        assert_eq!(client.get("empty").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_server_errors_surface() {
        let (addr, _dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        let err = client.delete("never-stored").unwrap_err();
        assert!(matches!(&err, ClientError::Server(msg) if msg == "cannot delete file"));
        assert!(!err.is_not_found());

        // The connection stays usable after an error reply
        client.put("after", b"ok").unwrap();
        assert_eq!(client.get("after").unwrap(), b"ok");
    }

    #[test]
    fn test_directory_components_stripped() {
        let (addr, dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        client.put("../../outside.txt", b"x").unwrap();
        assert!(dir.path().join("outside.txt").exists());
        assert_eq!(client.get("outside.txt").unwrap(), b"x");
    }

    #[test]
    fn test_unsendable_names_rejected() {
        let (addr, _dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        for name in ["my file.txt", "line\nbreak", "", "..", "/"] {
            let err = client.put(name, b"data").unwrap_err();
            assert!(matches!(err, ClientError::InvalidName(_)), "{:?}", name);
        }
    }

    #[test]
    fn test_short_body_rejected() {
        let (addr, _dir) = spawn_server();
        let mut client = FileClient::connect(addr).unwrap();

        let err = client.put_from("short", &b"abc"[..], 10).unwrap_err();
        assert!(matches!(err, ClientError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }
}
