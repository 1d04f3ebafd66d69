//! Filesystem handle bound to an effective URL at construction.

use crate::client::{
    Access, ClientResult, DirEntry, DirListFlags, FileSystemClient, Location, MkDirFlags,
    OpenFlags, PrepareFlags, ProtocolInfo, QueryCode, StatInfo, StatVfsInfo, Timeout,
};

/// Pure forwarding wrapper; the URL was customized before `inner` was built.
pub struct AuthzFileSystem<S> {
    inner: S,
    effective_url: String,
}

impl<S: FileSystemClient> AuthzFileSystem<S> {
    pub(crate) fn new(inner: S, effective_url: String) -> Self {
        Self {
            inner,
            effective_url,
        }
    }

    /// The customized URL the handle was constructed with.
    pub fn effective_url(&self) -> &str {
        &self.effective_url
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: FileSystemClient> FileSystemClient for AuthzFileSystem<S> {
    fn locate(
        &self,
        path: &str,
        flags: OpenFlags,
        timeout: Timeout,
    ) -> ClientResult<Vec<Location>> {
        self.inner.locate(path, flags, timeout)
    }

    fn mv(&self, source: &str, dest: &str, timeout: Timeout) -> ClientResult<()> {
        self.inner.mv(source, dest, timeout)
    }

    fn query(&self, code: QueryCode, arg: &[u8], timeout: Timeout) -> ClientResult<Vec<u8>> {
        self.inner.query(code, arg, timeout)
    }

    fn truncate(&self, path: &str, size: u64, timeout: Timeout) -> ClientResult<()> {
        self.inner.truncate(path, size, timeout)
    }

    fn rm(&self, path: &str, timeout: Timeout) -> ClientResult<()> {
        self.inner.rm(path, timeout)
    }

    fn mkdir(
        &self,
        path: &str,
        flags: MkDirFlags,
        mode: Access,
        timeout: Timeout,
    ) -> ClientResult<()> {
        self.inner.mkdir(path, flags, mode, timeout)
    }

    fn rmdir(&self, path: &str, timeout: Timeout) -> ClientResult<()> {
        self.inner.rmdir(path, timeout)
    }

    fn chmod(&self, path: &str, mode: Access, timeout: Timeout) -> ClientResult<()> {
        self.inner.chmod(path, mode, timeout)
    }

    fn ping(&self, timeout: Timeout) -> ClientResult<()> {
        self.inner.ping(timeout)
    }

    fn stat(&self, path: &str, timeout: Timeout) -> ClientResult<StatInfo> {
        self.inner.stat(path, timeout)
    }

    fn stat_vfs(&self, path: &str, timeout: Timeout) -> ClientResult<StatVfsInfo> {
        self.inner.stat_vfs(path, timeout)
    }

    fn protocol(&self, timeout: Timeout) -> ClientResult<ProtocolInfo> {
        self.inner.protocol(timeout)
    }

    fn dir_list(
        &self,
        path: &str,
        flags: DirListFlags,
        timeout: Timeout,
    ) -> ClientResult<Vec<DirEntry>> {
        self.inner.dir_list(path, flags, timeout)
    }

    fn send_info(&self, info: &str, timeout: Timeout) -> ClientResult<Vec<u8>> {
        self.inner.send_info(info, timeout)
    }

    fn prepare(
        &self,
        files: &[String],
        flags: PrepareFlags,
        priority: u8,
        timeout: Timeout,
    ) -> ClientResult<Vec<u8>> {
        self.inner.prepare(files, flags, priority, timeout)
    }

    fn set_property(&self, name: &str, value: &str) -> bool {
        self.inner.set_property(name, value)
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.inner.get_property(name)
    }
}
