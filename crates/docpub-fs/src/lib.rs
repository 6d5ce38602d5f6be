//! Filesystem layer for docpub
//!
//! Provides the durable-state primitives (atomic, locked reads and writes),
//! content checksums, format-agnostic config loading, and the local document
//! store that the publication engine reads from and writes to.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod local;

pub use checksum::compute_content_checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use local::{FsVault, LocalDocuments};
