//! Interface of the underlying remote-access client.
//!
//! The authorization layer never talks to a server itself. It wraps handles
//! produced by a [`ClientBackend`] and forwards every operation unchanged;
//! its only job is to hand the backend the effective URL.

mod types;

pub use types::{
    Access, ChunkInfo, DirEntry, DirListFlags, Location, LocationKind, MkDirFlags, OpenFlags,
    PrepareFlags, ProtocolInfo, QueryCode, StatInfo, StatVfsInfo, Timeout,
};

use crate::error::ClientError;

pub type ClientResult<T> = Result<T, ClientError>;

/// A single remote file.
pub trait FileClient: Send {
    fn open(
        &mut self,
        url: &str,
        flags: OpenFlags,
        mode: Access,
        timeout: Timeout,
    ) -> ClientResult<()>;

    fn close(&mut self, timeout: Timeout) -> ClientResult<()>;

    fn stat(&mut self, force: bool, timeout: Timeout) -> ClientResult<StatInfo>;

    /// Reads up to `buf.len()` bytes at `offset`; returns the number read.
    fn read(&mut self, offset: u64, buf: &mut [u8], timeout: Timeout) -> ClientResult<usize>;

    fn write(&mut self, offset: u64, data: &[u8], timeout: Timeout) -> ClientResult<()>;

    fn sync(&mut self, timeout: Timeout) -> ClientResult<()>;

    fn truncate(&mut self, size: u64, timeout: Timeout) -> ClientResult<()>;

    /// One buffer per chunk, in request order.
    fn vector_read(&mut self, chunks: &[ChunkInfo], timeout: Timeout)
        -> ClientResult<Vec<Vec<u8>>>;

    fn fcntl(&mut self, arg: &[u8], timeout: Timeout) -> ClientResult<Vec<u8>>;

    fn visa(&mut self, timeout: Timeout) -> ClientResult<Vec<u8>>;

    fn is_open(&self) -> bool;

    fn set_property(&mut self, name: &str, value: &str) -> bool;

    fn get_property(&self, name: &str) -> Option<String>;
}

/// Namespace operations against one endpoint. Shared between threads.
pub trait FileSystemClient: Send + Sync {
    fn locate(&self, path: &str, flags: OpenFlags, timeout: Timeout)
        -> ClientResult<Vec<Location>>;

    fn mv(&self, source: &str, dest: &str, timeout: Timeout) -> ClientResult<()>;

    fn query(&self, code: QueryCode, arg: &[u8], timeout: Timeout) -> ClientResult<Vec<u8>>;

    fn truncate(&self, path: &str, size: u64, timeout: Timeout) -> ClientResult<()>;

    fn rm(&self, path: &str, timeout: Timeout) -> ClientResult<()>;

    fn mkdir(&self, path: &str, flags: MkDirFlags, mode: Access, timeout: Timeout)
        -> ClientResult<()>;

    fn rmdir(&self, path: &str, timeout: Timeout) -> ClientResult<()>;

    fn chmod(&self, path: &str, mode: Access, timeout: Timeout) -> ClientResult<()>;

    fn ping(&self, timeout: Timeout) -> ClientResult<()>;

    fn stat(&self, path: &str, timeout: Timeout) -> ClientResult<StatInfo>;

    fn stat_vfs(&self, path: &str, timeout: Timeout) -> ClientResult<StatVfsInfo>;

    fn protocol(&self, timeout: Timeout) -> ClientResult<ProtocolInfo>;

    fn dir_list(&self, path: &str, flags: DirListFlags, timeout: Timeout)
        -> ClientResult<Vec<DirEntry>>;

    fn send_info(&self, info: &str, timeout: Timeout) -> ClientResult<Vec<u8>>;

    fn prepare(
        &self,
        files: &[String],
        flags: PrepareFlags,
        priority: u8,
        timeout: Timeout,
    ) -> ClientResult<Vec<u8>>;

    fn set_property(&self, name: &str, value: &str) -> bool;

    fn get_property(&self, name: &str) -> Option<String>;
}

/// Constructs the underlying handles.
pub trait ClientBackend: Send + Sync {
    type File: FileClient;
    type FileSystem: FileSystemClient;

    /// A fresh, unopened file handle.
    fn new_file(&self) -> ClientResult<Self::File>;

    /// A filesystem handle bound to `url`, which is already customized.
    fn new_filesystem(&self, url: &str) -> ClientResult<Self::FileSystem>;
}
