//! Hands out customized file and filesystem handles.

use std::sync::{Arc, Mutex};

use super::file::AuthzFile;
use super::filesystem::AuthzFileSystem;
use crate::client::{ClientBackend, ClientResult};
use crate::config::ConfigSource;
use crate::url_model;

/// Creates handles whose URLs carry the proxy substitution and bearer token.
///
/// A factory serves a single filesystem endpoint: the first
/// [`create_filesystem`](Self::create_filesystem) call builds the handle and
/// every later call returns that same handle, whatever URL it is given.
pub struct ConnectionFactory<B: ClientBackend> {
    backend: B,
    config: Arc<ConfigSource>,
    filesystem: Mutex<Option<Arc<AuthzFileSystem<B::FileSystem>>>>,
}

impl<B: ClientBackend> ConnectionFactory<B> {
    pub fn new(backend: B, config: ConfigSource) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            filesystem: Mutex::new(None),
        }
    }

    /// Factory configured from the process environment with default settings.
    pub fn from_env(backend: B) -> Self {
        Self::new(backend, ConfigSource::default())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ConfigSource {
        &self.config
    }

    /// A new, unopened file handle. The URL given to `open` is customized then.
    pub fn create_file(&self, url: &str) -> ClientResult<AuthzFile<B::File>> {
        tracing::trace!(url = %url_model::redact(url), "creating file handle");
        let inner = self.backend.new_file()?;
        Ok(AuthzFile::new(inner, Arc::clone(&self.config)))
    }

    /// The factory's filesystem handle, built from `url` on first use.
    ///
    /// Backend construction errors are returned as-is and leave the slot
    /// empty, so a later call may try again.
    pub fn create_filesystem(&self, url: &str) -> ClientResult<Arc<AuthzFileSystem<B::FileSystem>>> {
        // Held across construction so concurrent first calls build one handle.
        let mut slot = self
            .filesystem
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(fs) = slot.as_ref() {
            if fs.effective_url() != url {
                tracing::trace!("filesystem handle already bound, ignoring new URL");
            }
            return Ok(Arc::clone(fs));
        }

        let effective = url_model::customize(url, &self.config.current())?;
        let inner = self.backend.new_filesystem(&effective)?;
        tracing::debug!(url = %url_model::redact(&effective), "created filesystem handle");

        let fs = Arc::new(AuthzFileSystem::new(inner, effective));
        *slot = Some(Arc::clone(&fs));
        Ok(fs)
    }

    /// Whether a filesystem handle has been created.
    pub fn has_filesystem(&self) -> bool {
        self.filesystem
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}
