pub mod config;
pub mod omnifs;
pub mod util;

pub use crate::config::FormatConfig;
pub use crate::omnifs::{Errno, ErrorKind, OmniFs};

// vim:ts=2 sw=2
