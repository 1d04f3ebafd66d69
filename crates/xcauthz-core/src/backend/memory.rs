//! In-memory backend for tests and dry runs.
//!
//! All handles created by one [`MemoryBackend`] (and its clones) share a
//! single store. The backend records every URL it is handed so callers can
//! check what the authorization layer actually passed down.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use url::Url;

use crate::client::{
    Access, ChunkInfo, ClientBackend, ClientResult, DirEntry, DirListFlags, FileClient,
    FileSystemClient, Location, LocationKind, MkDirFlags, OpenFlags, PrepareFlags, ProtocolInfo,
    QueryCode, StatInfo, StatVfsInfo, Timeout,
};
use crate::error::ClientError;

/// Property holding the URL a handle was opened or built with.
pub const LAST_URL_PROPERTY: &str = "LastURL";

#[derive(Debug, Default)]
struct Store {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    modes: HashMap<String, Access>,
    opened_urls: Vec<String>,
    filesystem_urls: Vec<String>,
    fail_filesystem: Option<String>,
}

impl Store {
    fn stat(&self, path: &str) -> ClientResult<StatInfo> {
        if let Some(data) = self.files.get(path) {
            return Ok(StatInfo {
                id: path.to_string(),
                size: data.len() as u64,
                ..StatInfo::default()
            });
        }
        if self.dirs.contains(path) {
            return Ok(StatInfo {
                id: path.to_string(),
                is_dir: true,
                ..StatInfo::default()
            });
        }
        Err(not_found(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.files
            .keys()
            .chain(self.dirs.iter())
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }
}

fn not_found(path: &str) -> ClientError {
    ClientError::NotFound {
        path: path.to_string(),
    }
}

/// Path component of a URL, for stores keyed by path.
fn url_path(url: &str) -> ClientResult<String> {
    let parsed =
        Url::parse(url).map_err(|e| ClientError::InvalidArgument(format!("{url}: {e}")))?;
    Ok(parsed.path().to_string())
}

/// Backend whose handles read and write a shared in-memory tree.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
    filesystems_built: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        lock(&self.store)
    }

    pub fn insert_file(&self, path: &str, data: &[u8]) {
        self.store().files.insert(path.to_string(), data.to_vec());
    }

    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        self.store().files.get(path).cloned()
    }

    /// URLs passed to `open`, in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.store().opened_urls.clone()
    }

    /// URLs filesystem handles were built with, in order.
    pub fn filesystem_urls(&self) -> Vec<String> {
        self.store().filesystem_urls.clone()
    }

    pub fn filesystems_built(&self) -> usize {
        self.filesystems_built.load(Ordering::SeqCst)
    }

    /// Make filesystem construction fail with `message` until cleared with `None`.
    pub fn fail_filesystem_construction(&self, message: Option<&str>) {
        self.store().fail_filesystem = message.map(str::to_string);
    }
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ClientBackend for MemoryBackend {
    type File = MemoryFile;
    type FileSystem = MemoryFileSystem;

    fn new_file(&self) -> ClientResult<MemoryFile> {
        Ok(MemoryFile {
            store: Arc::clone(&self.store),
            path: None,
            properties: HashMap::new(),
        })
    }

    fn new_filesystem(&self, url: &str) -> ClientResult<MemoryFileSystem> {
        let mut store = self.store();
        if let Some(message) = &store.fail_filesystem {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message.clone(),
            )));
        }
        let parsed =
            Url::parse(url).map_err(|e| ClientError::InvalidArgument(format!("{url}: {e}")))?;
        store.filesystem_urls.push(url.to_string());
        self.filesystems_built.fetch_add(1, Ordering::SeqCst);

        let mut properties = HashMap::new();
        properties.insert(LAST_URL_PROPERTY.to_string(), url.to_string());
        Ok(MemoryFileSystem {
            store: Arc::clone(&self.store),
            address: format!(
                "{}:{}",
                parsed.host_str().unwrap_or("localhost"),
                parsed.port().unwrap_or(1094)
            ),
            properties: Mutex::new(properties),
        })
    }
}

pub struct MemoryFile {
    store: Arc<Mutex<Store>>,
    path: Option<String>,
    properties: HashMap<String, String>,
}

impl MemoryFile {
    fn open_path(&self) -> ClientResult<&str> {
        self.path.as_deref().ok_or(ClientError::NotOpen)
    }
}

impl FileClient for MemoryFile {
    fn open(
        &mut self,
        url: &str,
        flags: OpenFlags,
        _mode: Access,
        _timeout: Timeout,
    ) -> ClientResult<()> {
        if self.path.is_some() {
            return Err(ClientError::AlreadyOpen);
        }
        let path = url_path(url)?;
        let mut store = lock(&self.store);
        store.opened_urls.push(url.to_string());
        if !store.files.contains_key(&path) {
            if !flags.contains(OpenFlags::NEW) {
                return Err(not_found(&path));
            }
            store.files.insert(path.clone(), Vec::new());
        } else if flags.contains(OpenFlags::DELETE) {
            store.files.insert(path.clone(), Vec::new());
        }
        self.properties
            .insert(LAST_URL_PROPERTY.to_string(), url.to_string());
        self.path = Some(path);
        Ok(())
    }

    fn close(&mut self, _timeout: Timeout) -> ClientResult<()> {
        self.path.take().map(|_| ()).ok_or(ClientError::NotOpen)
    }

    fn stat(&mut self, _force: bool, _timeout: Timeout) -> ClientResult<StatInfo> {
        let path = self.open_path()?;
        lock(&self.store).stat(path)
    }

    fn read(&mut self, offset: u64, buf: &mut [u8], _timeout: Timeout) -> ClientResult<usize> {
        let path = self.open_path()?;
        let store = lock(&self.store);
        let data = store.files.get(path).ok_or_else(|| not_found(path))?;
        let start = (offset as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write(&mut self, offset: u64, data: &[u8], _timeout: Timeout) -> ClientResult<()> {
        let path = self.open_path()?;
        let mut store = lock(&self.store);
        let file = store.files.get_mut(path).ok_or_else(|| not_found(path))?;
        let end = offset as usize + data.len();
        if file.len() < end {
            file.resize(end, 0);
        }
        file[offset as usize..end].copy_from_slice(data);
        Ok(())
    }

    fn sync(&mut self, _timeout: Timeout) -> ClientResult<()> {
        self.open_path().map(|_| ())
    }

    fn truncate(&mut self, size: u64, _timeout: Timeout) -> ClientResult<()> {
        let path = self.open_path()?;
        let mut store = lock(&self.store);
        let file = store.files.get_mut(path).ok_or_else(|| not_found(path))?;
        file.resize(size as usize, 0);
        Ok(())
    }

    fn vector_read(
        &mut self,
        chunks: &[ChunkInfo],
        timeout: Timeout,
    ) -> ClientResult<Vec<Vec<u8>>> {
        chunks
            .iter()
            .map(|chunk| {
                let mut buf = vec![0u8; chunk.length as usize];
                let n = self.read(chunk.offset, &mut buf, timeout)?;
                buf.truncate(n);
                Ok::<_, ClientError>(buf)
            })
            .collect()
    }

    fn fcntl(&mut self, arg: &[u8], _timeout: Timeout) -> ClientResult<Vec<u8>> {
        self.open_path()?;
        Ok(arg.to_vec())
    }

    fn visa(&mut self, _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("visa"))
    }

    fn is_open(&self) -> bool {
        self.path.is_some()
    }

    fn set_property(&mut self, name: &str, value: &str) -> bool {
        self.properties.insert(name.to_string(), value.to_string());
        true
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}

pub struct MemoryFileSystem {
    store: Arc<Mutex<Store>>,
    address: String,
    properties: Mutex<HashMap<String, String>>,
}

impl MemoryFileSystem {
    fn store(&self) -> MutexGuard<'_, Store> {
        lock(&self.store)
    }
}

impl FileSystemClient for MemoryFileSystem {
    fn locate(
        &self,
        path: &str,
        _flags: OpenFlags,
        _timeout: Timeout,
    ) -> ClientResult<Vec<Location>> {
        if !self.store().exists(path) {
            return Err(not_found(path));
        }
        Ok(vec![Location {
            address: self.address.clone(),
            kind: LocationKind::ServerOnline,
            writable: true,
        }])
    }

    fn mv(&self, source: &str, dest: &str, _timeout: Timeout) -> ClientResult<()> {
        let mut store = self.store();
        if let Some(data) = store.files.remove(source) {
            store.files.insert(dest.to_string(), data);
            return Ok(());
        }
        if store.dirs.remove(source) {
            store.dirs.insert(dest.to_string());
            return Ok(());
        }
        Err(not_found(source))
    }

    fn query(&self, code: QueryCode, _arg: &[u8], _timeout: Timeout) -> ClientResult<Vec<u8>> {
        match code {
            QueryCode::Config => Ok(b"memory".to_vec()),
            QueryCode::Stats => {
                let store = self.store();
                Ok(format!("files={} dirs={}", store.files.len(), store.dirs.len()).into_bytes())
            }
            _ => Err(ClientError::unsupported("query")),
        }
    }

    fn truncate(&self, path: &str, size: u64, _timeout: Timeout) -> ClientResult<()> {
        let mut store = self.store();
        let file = store.files.get_mut(path).ok_or_else(|| not_found(path))?;
        file.resize(size as usize, 0);
        Ok(())
    }

    fn rm(&self, path: &str, _timeout: Timeout) -> ClientResult<()> {
        self.store()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn mkdir(
        &self,
        path: &str,
        flags: MkDirFlags,
        mode: Access,
        _timeout: Timeout,
    ) -> ClientResult<()> {
        let mut store = self.store();
        let path = path.trim_end_matches('/');
        if flags.contains(MkDirFlags::MAKE_PATH) {
            let mut prefix = String::new();
            for part in path.split('/').filter(|p| !p.is_empty()) {
                prefix.push('/');
                prefix.push_str(part);
                store.dirs.insert(prefix.clone());
            }
        } else {
            let parent = path.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            if !parent.is_empty() && !store.dirs.contains(parent) {
                return Err(not_found(parent));
            }
            store.dirs.insert(path.to_string());
        }
        store.modes.insert(path.to_string(), mode);
        Ok(())
    }

    fn rmdir(&self, path: &str, _timeout: Timeout) -> ClientResult<()> {
        let mut store = self.store();
        if !store.dirs.contains(path) {
            return Err(not_found(path));
        }
        if !store.children(path).is_empty() {
            return Err(ClientError::InvalidArgument(format!(
                "directory not empty: {path}"
            )));
        }
        store.dirs.remove(path);
        Ok(())
    }

    fn chmod(&self, path: &str, mode: Access, _timeout: Timeout) -> ClientResult<()> {
        let mut store = self.store();
        if !store.exists(path) {
            return Err(not_found(path));
        }
        store.modes.insert(path.to_string(), mode);
        Ok(())
    }

    fn ping(&self, _timeout: Timeout) -> ClientResult<()> {
        Ok(())
    }

    fn stat(&self, path: &str, _timeout: Timeout) -> ClientResult<StatInfo> {
        self.store().stat(path)
    }

    fn stat_vfs(&self, _path: &str, _timeout: Timeout) -> ClientResult<StatVfsInfo> {
        Ok(StatVfsInfo::default())
    }

    fn protocol(&self, _timeout: Timeout) -> ClientResult<ProtocolInfo> {
        Ok(ProtocolInfo {
            version: 0x500,
            host_info: 1,
        })
    }

    fn dir_list(
        &self,
        path: &str,
        flags: DirListFlags,
        _timeout: Timeout,
    ) -> ClientResult<Vec<DirEntry>> {
        let store = self.store();
        if !store.dirs.contains(path) {
            return Err(not_found(path));
        }
        let base = path.trim_end_matches('/');
        store
            .children(path)
            .into_iter()
            .map(|name| {
                let stat = if flags.contains(DirListFlags::STAT) {
                    Some(store.stat(&format!("{base}/{name}"))?)
                } else {
                    None
                };
                Ok::<_, ClientError>(DirEntry { name, stat })
            })
            .collect()
    }

    fn send_info(&self, info: &str, _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Ok(info.as_bytes().to_vec())
    }

    fn prepare(
        &self,
        files: &[String],
        _flags: PrepareFlags,
        _priority: u8,
        _timeout: Timeout,
    ) -> ClientResult<Vec<u8>> {
        let store = self.store();
        if let Some(missing) = files.iter().find(|f| !store.exists(f)) {
            return Err(not_found(missing));
        }
        Ok(format!("prepared {}", files.len()).into_bytes())
    }

    fn set_property(&self, name: &str, value: &str) -> bool {
        self.properties
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), value.to_string());
        true
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.properties
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }
}
