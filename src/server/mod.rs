//! File server
//!
//! Accepts client connections and runs one session thread per connection.

mod session;

pub use session::Session;

use crate::config::ServerConfig;
use crate::storage::BlobStore;
use std::io::{self, BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// TCP file server
pub struct FileServer<S> {
    listener: TcpListener,
    store: Arc<S>,
    read_timeout: Option<Duration>,
}

impl<S: BlobStore + 'static> FileServer<S> {
    /// Bind the listening socket
    pub fn bind(config: &ServerConfig, store: S) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.bind)?;
        Ok(Self {
            listener,
            store: Arc::new(store),
            read_timeout: config.read_timeout(),
        })
    }

    /// Address actually bound, useful when binding port 0
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the server
    pub fn run(&self) -> io::Result<()> {
        log::info!("File server listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let store = Arc::clone(&self.store);
                    let read_timeout = self.read_timeout;
                    thread::spawn(move || {
                        if let Err(e) = handle_client(stream, store, read_timeout) {
                            log::warn!("Client handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                }
            }
        }

        Ok(())
    }
}

/// Handle a client connection
fn handle_client<S: BlobStore>(
    stream: TcpStream,
    store: Arc<S>,
    read_timeout: Option<Duration>,
) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    log::info!("New connection from {}", peer);

    stream.set_nodelay(true)?;
    stream.set_read_timeout(read_timeout)?;

    let reader = BufReader::new(stream.try_clone()?);
    let writer = BufWriter::new(stream);

    let mut session = Session::new(reader, writer, store, peer.to_string());
    session
        .run()
        .map_err(|e| io::Error::new(e.kind(), format!("dropped {}: {}", peer, e)))?;

    log::info!("Client {} disconnected", peer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::testutil::{spawn_server, spawn_server_with};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{Shutdown, SocketAddr, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn read_status(reader: &mut BufReader<TcpStream>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        line
    }

    #[test]
    fn test_example_scenario_over_tcp() {
        let (addr, _dir) = spawn_server();
        let mut stream = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        stream.write_all(b"PUT a.txt 5\nhello").unwrap();
        assert_eq!(read_status(&mut reader), "OK\n");

        stream.write_all(b"GET a.txt\n").unwrap();
        assert_eq!(read_status(&mut reader), "OK 5\n");
        let mut body = [0u8; 5];
        reader.read_exact(&mut body).unwrap();
        assert_eq!(&body, b"hello");

        stream.write_all(b"DELETE a.txt\n").unwrap();
        assert_eq!(read_status(&mut reader), "OK\n");

        stream.write_all(b"GET a.txt\n").unwrap();
        assert_eq!(read_status(&mut reader), "ERR file not found\n");
    }

    #[test]
    fn test_short_payload_drops_connection() {
        let (addr, dir) = spawn_server();
        let mut stream = TcpStream::connect(addr).unwrap();

        stream.write_all(b"PUT part.bin 100\nonly a few bytes").unwrap();
        stream.shutdown(Shutdown::Write).unwrap();

        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "ERR failed to read data\n");
        assert!(dir.path().join("part.bin").exists());
    }

    fn spawn_with_read_timeout(secs: u64) -> (SocketAddr, TempDir) {
        spawn_server_with(ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            read_timeout_secs: Some(secs),
            ..ServerConfig::default()
        })
    }

    #[test]
    fn test_stalled_payload_times_out() {
        let (addr, dir) = spawn_with_read_timeout(1);
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();

        // Write half stays open: only the server's deadline can end this
        let started = Instant::now();
        stream.write_all(b"PUT slow.bin 10\nabc").unwrap();

        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "ERR failed to read data\n");
        assert!(started.elapsed() >= Duration::from_millis(900));
        assert!(dir.path().join("slow.bin").exists());
    }

    #[test]
    fn test_idle_connection_closed_after_timeout() {
        let (addr, _dir) = spawn_with_read_timeout(1);
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();

        stream.write_all(b"PUT a 1\nx").unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        assert_eq!(read_status(&mut reader), "OK\n");

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "");
    }

    #[test]
    fn test_single_command_connections_in_parallel() {
        let (addr, _dir) = spawn_server();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                thread::spawn(move || {
                    let name = format!("file-{}", i);
                    let body = format!("content of {}", name);

                    let mut stream = TcpStream::connect(addr).unwrap();
                    write!(stream, "PUT {} {}\n{}", name, body.len(), body).unwrap();
                    stream.shutdown(Shutdown::Write).unwrap();
                    let mut reply = String::new();
                    stream.read_to_string(&mut reply).unwrap();
                    assert_eq!(reply, "OK\n");

                    let mut stream = TcpStream::connect(addr).unwrap();
                    writeln!(stream, "GET {}", name).unwrap();
                    stream.shutdown(Shutdown::Write).unwrap();
                    let mut reply = String::new();
                    stream.read_to_string(&mut reply).unwrap();
                    assert_eq!(reply, format!("OK {}\n{}", body.len(), body));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
