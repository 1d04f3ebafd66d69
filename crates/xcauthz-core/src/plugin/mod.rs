//! Authorization plugin: handle factory and forwarding wrappers.
//!
//! The host runtime creates one [`ConnectionFactory`] per plugin instance.
//! File handles customize their URL when opened; the filesystem handle is
//! customized once, when it is built, and then shared.

mod factory;
mod file;
mod filesystem;

pub use factory::ConnectionFactory;
pub use file::AuthzFile;
pub use filesystem::AuthzFileSystem;
