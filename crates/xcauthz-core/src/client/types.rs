//! Argument and result types of the delegated file/filesystem operations.

use serde::Serialize;
use std::ops::BitOr;

/// Timeout in seconds; zero means the backend default.
pub type Timeout = u16;

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident($repr:ty) { $($(#[$fmeta:meta])* $flag:ident = $value:expr,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(pub $repr);

        impl $name {
            $($(#[$fmeta])* pub const $flag: $name = $name($value);)*

            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

flag_set! {
    /// Open flags.
    OpenFlags(u16) {
        NONE = 0,
        DELETE = 0x0002,
        FORCE = 0x0004,
        NEW = 0x0008,
        READ = 0x0010,
        UPDATE = 0x0020,
        REFRESH = 0x0080,
        MAKE_PATH = 0x0100,
        APPEND = 0x0200,
        REPLICA = 0x0800,
        POSC = 0x1000,
        NO_WAIT = 0x2000,
        SEQ_IO = 0x4000,
        WRITE = 0x8000,
    }
}

flag_set! {
    /// Permission bits for open, mkdir and chmod.
    Access(u16) {
        NONE = 0,
        UR = 0x100,
        UW = 0x080,
        UX = 0x040,
        GR = 0x020,
        GW = 0x010,
        GX = 0x008,
        OR = 0x004,
        OW = 0x002,
        OX = 0x001,
    }
}

flag_set! {
    MkDirFlags(u8) {
        NONE = 0,
        MAKE_PATH = 1,
    }
}

flag_set! {
    DirListFlags(u8) {
        NONE = 0,
        STAT = 1,
        LOCATE = 2,
        RECURSIVE = 4,
    }
}

flag_set! {
    PrepareFlags(u8) {
        NONE = 0,
        CANCEL = 1,
        NOTIFY = 2,
        NO_ERRORS = 4,
        STAGE = 8,
        WRITE_MODE = 16,
        COLOCATE = 32,
        FRESH = 64,
    }
}

/// What a filesystem `query` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCode {
    Config,
    ChecksumCancel,
    Checksum,
    Opaque,
    OpaqueFile,
    Prepare,
    Space,
    Stats,
    Visa,
    XAttr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatInfo {
    pub id: String,
    pub size: u64,
    pub is_dir: bool,
    /// Seconds since the Unix epoch, when known.
    pub mod_time: Option<u64>,
    /// Backend-specific version tag (e.g. an HTTP ETag).
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatVfsInfo {
    pub nodes_rw: u64,
    pub free_rw: u64,
    pub utilization_rw: u8,
    pub nodes_staging: u64,
    pub free_staging: u64,
    pub utilization_staging: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolInfo {
    pub version: u32,
    pub host_info: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationKind {
    ManagerOnline,
    ManagerPending,
    ServerOnline,
    ServerPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub address: String,
    pub kind: LocationKind,
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub stat: Option<StatInfo>,
}

/// One piece of a vectored read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    pub offset: u64,
    pub length: u32,
}
