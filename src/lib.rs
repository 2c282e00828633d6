//! Minimal networked file store
//!
//! This crate implements a TCP file server speaking a line-oriented
//! PUT/GET/DELETE protocol. Each upload is kept as a plain file, named by
//! its sanitized basename, directly under one storage root directory.

pub mod client;
pub mod config;
pub mod protocol;
pub mod server;
pub mod storage;
#[cfg(test)]
pub(crate) mod testutil;

pub use client::{ClientError, FileClient};
pub use config::Config;
pub use server::FileServer;
pub use storage::{BlobName, BlobStore, FileStore, StorageError};
