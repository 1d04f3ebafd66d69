//! File handle that customizes the URL at open time.

use std::sync::Arc;

use crate::client::{Access, ChunkInfo, ClientResult, FileClient, OpenFlags, StatInfo, Timeout};
use crate::config::ConfigSource;
use crate::url_model;

/// Wraps a backend file; everything but `open` is forwarded untouched.
pub struct AuthzFile<F> {
    inner: F,
    config: Arc<ConfigSource>,
}

impl<F: FileClient> AuthzFile<F> {
    pub(crate) fn new(inner: F, config: Arc<ConfigSource>) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: FileClient> FileClient for AuthzFile<F> {
    fn open(
        &mut self,
        url: &str,
        flags: OpenFlags,
        mode: Access,
        timeout: Timeout,
    ) -> ClientResult<()> {
        let effective = url_model::customize(url, &self.config.current())?;
        tracing::debug!(url = %url_model::redact(&effective), "opening file");
        self.inner.open(&effective, flags, mode, timeout)
    }

    fn close(&mut self, timeout: Timeout) -> ClientResult<()> {
        self.inner.close(timeout)
    }

    fn stat(&mut self, force: bool, timeout: Timeout) -> ClientResult<StatInfo> {
        self.inner.stat(force, timeout)
    }

    fn read(&mut self, offset: u64, buf: &mut [u8], timeout: Timeout) -> ClientResult<usize> {
        self.inner.read(offset, buf, timeout)
    }

    fn write(&mut self, offset: u64, data: &[u8], timeout: Timeout) -> ClientResult<()> {
        self.inner.write(offset, data, timeout)
    }

    fn sync(&mut self, timeout: Timeout) -> ClientResult<()> {
        self.inner.sync(timeout)
    }

    fn truncate(&mut self, size: u64, timeout: Timeout) -> ClientResult<()> {
        self.inner.truncate(size, timeout)
    }

    fn vector_read(
        &mut self,
        chunks: &[ChunkInfo],
        timeout: Timeout,
    ) -> ClientResult<Vec<Vec<u8>>> {
        self.inner.vector_read(chunks, timeout)
    }

    fn fcntl(&mut self, arg: &[u8], timeout: Timeout) -> ClientResult<Vec<u8>> {
        self.inner.fcntl(arg, timeout)
    }

    fn visa(&mut self, timeout: Timeout) -> ClientResult<Vec<u8>> {
        self.inner.visa(timeout)
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn set_property(&mut self, name: &str, value: &str) -> bool {
        self.inner.set_property(name, value)
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.inner.get_property(name)
    }
}
