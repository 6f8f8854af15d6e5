//! The storage engine: one backing file holding a header, a user table,
//! a metadata table and fixed-size data blocks.

pub mod disk;
pub mod fs;
pub mod kernel;
pub mod store;
pub mod user_map;
pub mod users;

pub use fs::{DirEntry, FileMode, FileStat, FsStats};
pub use kernel::{Errno, ErrorKind, OmniFs};
pub use users::SessionInfo;

// vim:ts=2 sw=2
