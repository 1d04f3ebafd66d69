//! Client backends: an HTTP/WebDAV client built on libcurl and an in-memory double.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;
