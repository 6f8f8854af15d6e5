use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::disk::AddressSize;
use super::kernel::Errno;

/// The single backing file. No handle is held between calls: every
/// read or write opens the file, seeks, transfers and closes it again.
#[derive(Debug, Clone)]
pub struct Store {
  realpath: PathBuf,
}

impl Store {
  pub fn new(realpath: impl AsRef<Path>) -> Self {
    Self {
      realpath: realpath.as_ref().to_owned(),
    }
  }

  pub fn realpath(&self) -> &Path {
    &self.realpath
  }

  pub fn exists(&self) -> bool {
    self.realpath.is_file()
  }

  /// Create (or truncate) the file and fill it with `image`, then zero pad
  /// it to exactly `total_size` bytes.
  pub fn create(&self, image: &[u8], total_size: AddressSize) -> Result<(), Errno> {
    let mut realfile = OpenOptions::new()
      .write(true)
      .create(true)
      .truncate(true)
      .open(&self.realpath)?;

    realfile.write_all(image)?;
    realfile.set_len(total_size)?;
    realfile.flush()?;

    debug!(path = %self.realpath.display(), total_size, "store created");
    Ok(())
  }

  /// Positioned write of one whole record.
  pub fn write_record(&self, offset: AddressSize, bytes: &[u8]) -> Result<(), Errno> {
    let mut realfile = OpenOptions::new()
      .write(true)
      .open(&self.realpath)?;

    realfile.seek(SeekFrom::Start(offset))?;
    realfile.write_all(bytes)?;

    debug!(offset, len = bytes.len(), "record written");
    Ok(())
  }

  /// Positioned read of `len` bytes in a single call.
  pub fn read_all(&self, offset: AddressSize, len: usize) -> Result<Vec<u8>, Errno> {
    let mut realfile = OpenOptions::new()
      .read(true)
      .open(&self.realpath)?;

    let mut bytes = vec![0u8; len];
    realfile.seek(SeekFrom::Start(offset))?;
    realfile.read_exact(&mut bytes)?;

    Ok(bytes)
  }
}


// vim:ts=2 sw=2
