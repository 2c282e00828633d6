//! Helpers for tests that need a live server

use crate::config::ServerConfig;
use crate::server::FileServer;
use crate::storage::FileStore;
use std::net::SocketAddr;
use std::thread;
use tempfile::TempDir;

/// Start a server on an ephemeral loopback port over a fresh temporary root.
///
/// The server thread lives until the test binary exits; keep the returned
/// `TempDir` alive for as long as the server is used.
pub fn spawn_server() -> (SocketAddr, TempDir) {
    spawn_server_with(ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        ..ServerConfig::default()
    })
}

/// Like [`spawn_server`], but with the given settings. `storage_root` is
/// ignored in favour of the temporary directory.
pub fn spawn_server_with(config: ServerConfig) -> (SocketAddr, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path()).unwrap();

    let server = FileServer::bind(&config, store).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run());

    (addr, dir)
}
