//! HTTP/WebDAV backend over libcurl.
//!
//! Serves `http`, `https`, `dav` and `davs` URLs (`dav`/`davs` are sent as
//! `http`/`https`). Files are read-only: `open` probes with HEAD, reads are
//! Range GETs. The filesystem handle keeps the query string of the URL it was
//! built with on every request, so an `authz` parameter travels along.
//! Operations HTTP has no counterpart for return [`ClientError::Unsupported`].

mod parse;
mod request;

use std::collections::HashMap;
use std::sync::Mutex;

use url::Url;

use self::parse::ResponseMeta;
use self::request::{perform, Method, Request};
use crate::client::{
    Access, ChunkInfo, ClientBackend, ClientResult, DirEntry, DirListFlags, FileClient,
    FileSystemClient, Location, LocationKind, MkDirFlags, OpenFlags, PrepareFlags, ProtocolInfo,
    QueryCode, StatInfo, StatVfsInfo, Timeout,
};
use crate::config::HttpSettings;
use crate::error::ClientError;

const LAST_URL_PROPERTY: &str = "LastURL";

/// Open flags that would need write access.
const WRITE_FLAGS: [OpenFlags; 5] = [
    OpenFlags::WRITE,
    OpenFlags::UPDATE,
    OpenFlags::NEW,
    OpenFlags::DELETE,
    OpenFlags::APPEND,
];

/// Parses `url` and maps WebDAV schemes onto their HTTP equivalents.
pub fn to_http_url(url: &str) -> ClientResult<Url> {
    let parsed =
        Url::parse(url).map_err(|e| ClientError::InvalidArgument(format!("{url}: {e}")))?;
    let scheme = parsed.scheme().to_string();
    let replacement = match scheme.as_str() {
        "http" | "https" => return Ok(parsed),
        "dav" => "http",
        "davs" => "https",
        other => {
            return Err(ClientError::UnsupportedScheme {
                scheme: other.to_string(),
            })
        }
    };
    let rest = &parsed.as_str()[scheme.len()..];
    let mapped = format!("{replacement}{rest}");
    Url::parse(&mapped).map_err(|e| ClientError::InvalidArgument(format!("{mapped}: {e}")))
}

#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    settings: HttpSettings,
}

impl HttpBackend {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

impl ClientBackend for HttpBackend {
    type File = HttpFile;
    type FileSystem = HttpFileSystem;

    fn new_file(&self) -> ClientResult<HttpFile> {
        Ok(HttpFile {
            settings: self.settings.clone(),
            url: None,
            meta: None,
            properties: HashMap::new(),
        })
    }

    fn new_filesystem(&self, url: &str) -> ClientResult<HttpFileSystem> {
        let base = to_http_url(url)?;
        let mut properties = HashMap::new();
        properties.insert(LAST_URL_PROPERTY.to_string(), url.to_string());
        Ok(HttpFileSystem {
            settings: self.settings.clone(),
            base,
            properties: Mutex::new(properties),
        })
    }
}

/// Read-only remote file.
pub struct HttpFile {
    settings: HttpSettings,
    url: Option<Url>,
    meta: Option<ResponseMeta>,
    properties: HashMap<String, String>,
}

impl HttpFile {
    fn open_url(&self) -> ClientResult<&Url> {
        self.url.as_ref().ok_or(ClientError::NotOpen)
    }

    fn head(&self, url: &Url, timeout: Timeout) -> ClientResult<ResponseMeta> {
        let resp = perform(&self.settings, &Request::new(Method::Head, url.as_str(), timeout))?;
        Ok(resp.success(url.as_str(), url.path())?.meta)
    }
}

impl FileClient for HttpFile {
    fn open(
        &mut self,
        url: &str,
        flags: OpenFlags,
        _mode: Access,
        timeout: Timeout,
    ) -> ClientResult<()> {
        if self.url.is_some() {
            return Err(ClientError::AlreadyOpen);
        }
        if WRITE_FLAGS.iter().any(|f| flags.contains(*f)) {
            return Err(ClientError::unsupported("open for writing"));
        }
        let parsed = to_http_url(url)?;
        let meta = self.head(&parsed, timeout)?;
        self.properties
            .insert(LAST_URL_PROPERTY.to_string(), url.to_string());
        self.meta = Some(meta);
        self.url = Some(parsed);
        Ok(())
    }

    fn close(&mut self, _timeout: Timeout) -> ClientResult<()> {
        self.meta = None;
        self.url.take().map(|_| ()).ok_or(ClientError::NotOpen)
    }

    fn stat(&mut self, force: bool, timeout: Timeout) -> ClientResult<StatInfo> {
        let url = self.open_url()?.clone();
        let cached = if force { None } else { self.meta.clone() };
        let meta = match cached {
            Some(meta) => meta,
            None => {
                let meta = self.head(&url, timeout)?;
                self.meta = Some(meta.clone());
                meta
            }
        };
        Ok(meta.to_stat(url.path()))
    }

    fn read(&mut self, offset: u64, buf: &mut [u8], timeout: Timeout) -> ClientResult<usize> {
        let url = self.open_url()?;
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(size) = self.meta.as_ref().and_then(|m| m.content_length) {
            if offset >= size {
                return Ok(0);
            }
        }

        let mut req = Request::new(Method::Get, url.as_str(), timeout);
        req.range = Some((offset, offset + buf.len() as u64 - 1));
        let resp = perform(&self.settings, &req)?;
        if resp.status == 416 {
            return Ok(0);
        }
        let resp = resp.success(url.as_str(), url.path())?;

        // A 200 means the server ignored the range and sent the whole body.
        let body = if resp.status == 206 {
            &resp.body[..]
        } else {
            let start = (offset as usize).min(resp.body.len());
            &resp.body[start..]
        };
        let n = body.len().min(buf.len());
        buf[..n].copy_from_slice(&body[..n]);
        Ok(n)
    }

    fn write(&mut self, _offset: u64, _data: &[u8], _timeout: Timeout) -> ClientResult<()> {
        Err(ClientError::unsupported("write"))
    }

    fn sync(&mut self, _timeout: Timeout) -> ClientResult<()> {
        Err(ClientError::unsupported("sync"))
    }

    fn truncate(&mut self, _size: u64, _timeout: Timeout) -> ClientResult<()> {
        Err(ClientError::unsupported("truncate"))
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

    fn fcntl(&mut self, _arg: &[u8], _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("fcntl"))
    }

    fn visa(&mut self, _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("visa"))
    }

    fn is_open(&self) -> bool {
        self.url.is_some()
    }

    fn set_property(&mut self, name: &str, value: &str) -> bool {
        self.properties.insert(name.to_string(), value.to_string());
        true
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}

/// Namespace operations against one HTTP/WebDAV endpoint.
pub struct HttpFileSystem {
    settings: HttpSettings,
    base: Url,
    properties: Mutex<HashMap<String, String>>,
}

impl HttpFileSystem {
    /// URL for `path` on this endpoint, keeping the base query string.
    pub fn resolve(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }

    fn run(&self, method: Method, path: &str, timeout: Timeout) -> ClientResult<ResponseMeta> {
        let url = self.resolve(path);
        let resp = perform(&self.settings, &Request::new(method, url.as_str(), timeout))?;
        Ok(resp.success(url.as_str(), path)?.meta)
    }

    fn address(&self) -> String {
        format!(
            "{}:{}",
            self.base.host_str().unwrap_or_default(),
            self.base.port_or_known_default().unwrap_or(0)
        )
    }
}

impl FileSystemClient for HttpFileSystem {
    fn locate(
        &self,
        path: &str,
        _flags: OpenFlags,
        timeout: Timeout,
    ) -> ClientResult<Vec<Location>> {
        self.run(Method::Head, path, timeout)?;
        Ok(vec![Location {
            address: self.address(),
            kind: LocationKind::ServerOnline,
            writable: false,
        }])
    }

    fn mv(&self, source: &str, dest: &str, timeout: Timeout) -> ClientResult<()> {
        let url = self.resolve(source);
        let mut destination = self.resolve(dest);
        destination.set_query(None);
        let mut req = Request::new(Method::Move, url.as_str(), timeout);
        req.headers.push(format!("Destination: {}", destination));
        req.headers.push("Overwrite: T".to_string());
        perform(&self.settings, &req)?.success(url.as_str(), source)?;
        Ok(())
    }

    fn query(&self, _code: QueryCode, _arg: &[u8], _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("query"))
    }

    fn truncate(&self, _path: &str, _size: u64, _timeout: Timeout) -> ClientResult<()> {
        Err(ClientError::unsupported("truncate"))
    }

    fn rm(&self, path: &str, timeout: Timeout) -> ClientResult<()> {
        self.run(Method::Delete, path, timeout).map(|_| ())
    }

    fn mkdir(
        &self,
        path: &str,
        flags: MkDirFlags,
        _mode: Access,
        timeout: Timeout,
    ) -> ClientResult<()> {
        if !flags.contains(MkDirFlags::MAKE_PATH) {
            return self.run(Method::MkCol, path, timeout).map(|_| ());
        }
        // MKCOL each ancestor; 405 means the collection already exists.
        let mut prefix = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            prefix.push('/');
            prefix.push_str(part);
            let url = self.resolve(&prefix);
            let resp = perform(&self.settings, &Request::new(Method::MkCol, url.as_str(), timeout))?;
            if resp.status != 405 {
                resp.success(url.as_str(), &prefix)?;
            }
        }
        Ok(())
    }

    fn rmdir(&self, path: &str, timeout: Timeout) -> ClientResult<()> {
        self.run(Method::Delete, path, timeout).map(|_| ())
    }

    fn chmod(&self, _path: &str, _mode: Access, _timeout: Timeout) -> ClientResult<()> {
        Err(ClientError::unsupported("chmod"))
    }

    fn ping(&self, timeout: Timeout) -> ClientResult<()> {
        // Any HTTP answer means the endpoint is alive.
        perform(
            &self.settings,
            &Request::new(Method::Head, self.base.as_str(), timeout),
        )
        .map(|_| ())
    }

    fn stat(&self, path: &str, timeout: Timeout) -> ClientResult<StatInfo> {
        let meta = self.run(Method::Head, path, timeout)?;
        let mut stat = meta.to_stat(path);
        stat.is_dir = path.ends_with('/');
        Ok(stat)
    }

    fn stat_vfs(&self, _path: &str, _timeout: Timeout) -> ClientResult<StatVfsInfo> {
        Err(ClientError::unsupported("stat_vfs"))
    }

    fn protocol(&self, _timeout: Timeout) -> ClientResult<ProtocolInfo> {
        Err(ClientError::unsupported("protocol"))
    }

    fn dir_list(
        &self,
        _path: &str,
        _flags: DirListFlags,
        _timeout: Timeout,
    ) -> ClientResult<Vec<DirEntry>> {
        Err(ClientError::unsupported("dir_list"))
    }

    fn send_info(&self, _info: &str, _timeout: Timeout) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("send_info"))
    }

    fn prepare(
        &self,
        _files: &[String],
        _flags: PrepareFlags,
        _priority: u8,
        _timeout: Timeout,
    ) -> ClientResult<Vec<u8>> {
        Err(ClientError::unsupported("prepare"))
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
