//! Per-connection command loop
//!
//! A session reads one command line at a time and fully consumes or emits
//! that command's payload before reading the next line.

use crate::protocol::{read_line, write_response, Command, ErrorReply, Response};
use crate::storage::{BlobName, BlobStore, StorageError};
use std::io::{self, BufRead, Read, Write};
use std::sync::Arc;

/// One client connection
pub struct Session<R, W, S> {
    reader: R,
    writer: W,
    store: Arc<S>,
    peer: String,
}

impl<R: BufRead, W: Write, S: BlobStore> Session<R, W, S> {
    pub fn new(reader: R, writer: W, store: Arc<S>, peer: impl Into<String>) -> Self {
        Self {
            reader,
            writer,
            store,
            peer: peer.into(),
        }
    }

    /// Serve commands until the client disconnects.
    ///
    /// End of stream is a normal return. An error means the connection is
    /// unusable: a transport failure, or a payload that ended early and
    /// left the stream out of sync.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(line) = read_line(&mut self.reader)? {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match Command::parse(line) {
                Ok(command) => {
                    log::debug!("{}: {}", self.peer, command);
                    self.dispatch(command)?;
                }
                Err(reply) => {
                    log::debug!(
                        "{}: rejected {:?}: {}",
                        self.peer,
                        String::from_utf8_lossy(line),
                        reply
                    );
                    self.respond(&reply.into())?;
                }
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Put { name, size } => self.handle_put(&name, size),
            Command::Get { name } => self.handle_get(&name),
            Command::Delete { name } => self.handle_delete(&name),
        }
    }

    /// Store exactly `size` bytes from the connection under `name`.
    ///
    /// If the blob cannot be created or written, the payload is still
    /// drained so the next command line is found where the client sent it.
    fn handle_put(&mut self, name: &BlobName, size: u64) -> io::Result<()> {
        let blob = self.store.create_or_truncate(name);
        let mut sink = PayloadSink { blob };

        let received = match io::copy(&mut (&mut self.reader).take(size), &mut sink) {
            Ok(received) => received,
            Err(e) => {
                let _ = self.respond(&ErrorReply::ReadFailed.into());
                return Err(e);
            }
        };

        if received != size {
            let _ = self.respond(&ErrorReply::ReadFailed.into());
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "payload for {} ended after {} of {} bytes",
                    name, received, size
                ),
            ));
        }

        match sink.blob.and_then(|blob| self.store.finish(blob)) {
            Ok(()) => {
                log::debug!("{}: stored {} ({} bytes)", self.peer, name, size);
                self.respond(&Response::Ok)
            }
            Err(e) => {
                log::warn!("{}: PUT {} failed: {}", self.peer, name, e);
                self.respond(&ErrorReply::CannotCreate.into())
            }
        }
    }

    /// Send `OK <size>` and then exactly `size` bytes of the blob.
    fn handle_get(&mut self, name: &BlobName) -> io::Result<()> {
        let (mut blob, size) = match self.store.open_for_read(name) {
            Ok(found) => found,
            Err(StorageError::NotFound(_)) => {
                return self.respond(&ErrorReply::NotFound.into());
            }
            Err(e) => {
                log::warn!("{}: GET {} failed: {}", self.peer, name, e);
                return self.respond(&ErrorReply::NotFound.into());
            }
        };

        write_response(&mut self.writer, &Response::Data(size))?;
        let sent = io::copy(&mut (&mut blob).take(size), &mut self.writer)?;
        if sent != size {
            // The header already promised `size` bytes; there is no way to
            // recover the framing.
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} shrank to {} of {} announced bytes", name, sent, size),
            ));
        }

        self.writer.flush()
    }

    fn handle_delete(&mut self, name: &BlobName) -> io::Result<()> {
        match self.store.remove(name) {
            Ok(()) => self.respond(&Response::Ok),
            Err(e) => {
                log::debug!("{}: DELETE {} failed: {}", self.peer, name, e);
                self.respond(&ErrorReply::CannotDelete.into())
            }
        }
    }

    fn respond(&mut self, response: &Response) -> io::Result<()> {
        write_response(&mut self.writer, response)?;
        self.writer.flush()
    }
}

/// Destination for PUT payload bytes.
///
/// Write failures are recorded instead of returned, so `io::copy` keeps
/// pulling the payload off the connection.
struct PayloadSink<B> {
    blob: Result<B, StorageError>,
}

impl<B: Write> Write for PayloadSink<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let failed = match &mut self.blob {
            Ok(blob) => blob.write_all(buf).err(),
            Err(_) => None,
        };
        if let Some(e) = failed {
            self.blob = Err(StorageError::Io(e));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
