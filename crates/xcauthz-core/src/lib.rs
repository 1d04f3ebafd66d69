pub mod config;
pub mod error;
pub mod logging;

pub mod backend;
pub mod client;
pub mod plugin;
pub mod sec_unix;
pub mod token;
pub mod url_model;

pub use error::{ClientError, CustomizeError};
pub use plugin::ConnectionFactory;
