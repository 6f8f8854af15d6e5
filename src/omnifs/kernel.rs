use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FormatConfig;
use crate::util::{to_exact, to_fixed, unixtime};

use super::disk::{
  decode_table, encode_table, AddressSize, BlockIndex, Header, MetadataEntry, Role, UserRecord,
  UserSlot, ENTRY_OCCUPIED, FORMAT_VERSION, HEADER_SIZE, MAGIC, METADATA_ENTRY_SIZE,
  RESERVED_BLOCK, ROOT_INDEX, USER_RECORD_SIZE,
};
use super::store::Store;
use super::user_map::UserMap;

#[derive(Debug, Error)]
pub enum Errno {
  /// No such file, directory or user
  #[error("no such file or directory: {0}")]
  ENOENT(String),
  /// Name already taken
  #[error("already exists: {0}")]
  EEXIST(String),
  /// No free metadata slot, data block or user slot
  #[error("no space left: {0}")]
  ENOSPC(&'static str),
  /// Is a directory
  #[error("is a directory: {0}")]
  EISDIR(String),
  /// Not a directory
  #[error("not a directory: {0}")]
  ENOTDIR(String),
  /// Directory not empty
  #[error("directory not empty: {0}")]
  ENOTEMPTY(String),
  /// Operation not permitted
  #[error("operation not permitted: {0}")]
  EPERM(&'static str),
  /// File too large
  #[error("file too large: {0}")]
  EFBIG(String),
  /// Invalid argument
  #[error("invalid argument: {0}")]
  EINVAL(String),
  /// Authentication error
  #[error("authentication error: {0}")]
  EAUTH(&'static str),
  /// Permission denied
  #[error("permission denied: {0}")]
  EACCES(&'static str),
  /// I/O Error
  #[error("I/O error: {0}")]
  EIO(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Exhausted,
  InvalidOperation,
  Unauthenticated,
  Unauthorized,
  Io,
}

impl Errno {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Errno::ENOENT(_) => ErrorKind::NotFound,
      Errno::EEXIST(_) => ErrorKind::Conflict,
      Errno::ENOSPC(_) => ErrorKind::Exhausted,
      Errno::EISDIR(_)
      | Errno::ENOTDIR(_)
      | Errno::ENOTEMPTY(_)
      | Errno::EPERM(_)
      | Errno::EFBIG(_)
      | Errno::EINVAL(_) => ErrorKind::InvalidOperation,
      Errno::EAUTH(_) => ErrorKind::Unauthenticated,
      Errno::EACCES(_) => ErrorKind::Unauthorized,
      Errno::EIO(_) => ErrorKind::Io,
    }
  }
}

/// A loaded store: header, both tables and the block map mirrored in
/// memory, plus the ephemeral session registry.
///
/// Every method that mutates takes `&mut self`, so callers get exclusive
/// access per call from the borrow checker; a dispatcher serving several
/// clients wraps the engine in one `Mutex` and locks it around each call.
#[derive(Debug)]
pub struct OmniFs {
  pub(crate) store: Store,
  pub(crate) header: Header,
  pub(crate) users: Vec<UserRecord>,
  pub(crate) user_map: UserMap,
  pub(crate) sessions: BTreeMap<String, UserSlot>,
  pub(crate) entries: Vec<MetadataEntry>,
  /// `true` = free
  pub(crate) free_blocks: Vec<bool>,
}

impl OmniFs {
  /// Write a fresh store of exactly `config.total_size` bytes.
  pub fn format(realpath: impl AsRef<Path>, config: &FormatConfig) -> Result<Header, Errno> {
    config.validate()?;

    let store = Store::new(realpath);
    let now = unixtime();

    let user_table_offset = HEADER_SIZE;
    let metadata_offset = user_table_offset + config.max_users as AddressSize * USER_RECORD_SIZE;

    let header = Header {
      magic: MAGIC,
      format_version: FORMAT_VERSION,
      total_size: config.total_size,
      header_size: HEADER_SIZE,
      block_size: config.block_size,
      store_id: to_exact(&Uuid::new_v4().to_simple().to_string()),
      created_date: to_fixed(&chrono::Utc::now().format("%Y-%m-%d").to_string()),
      config_hash: to_exact(&config.fingerprint()?),
      config_timestamp: now,
      user_table_offset: u32::try_from(user_table_offset)
        .map_err(|_| Errno::EINVAL(String::from("user table offset overflows the header field")))?,
      max_users: config.max_users,
      metadata_offset: u32::try_from(metadata_offset)
        .map_err(|_| Errno::EINVAL(String::from("metadata offset overflows the header field")))?,
      change_log_offset: 0,
      metadata_count: config.metadata_count,
    };

    let mut users = vec![UserRecord::default(); config.max_users as usize];
    users[0] = UserRecord::new(&config.admin_username, &config.admin_password, Role::Admin, now);

    let mut entries = vec![MetadataEntry::default(); config.metadata_count as usize];
    entries[ROOT_INDEX as usize] = MetadataEntry::directory(ROOT_INDEX, "/", now);

    let mut image = header.to_bytes();
    image.extend(encode_table(&users, UserRecord::to_bytes));
    image.extend(encode_table(&entries, MetadataEntry::to_bytes));

    store.create(&image, config.total_size)?;

    info!(
      path = %store.realpath().display(),
      total_size = config.total_size,
      block_size = config.block_size,
      max_users = config.max_users,
      metadata_count = config.metadata_count,
      "store formatted"
    );

    Ok(header)
  }

  /// Load an existing store into memory.
  pub fn init(realpath: impl AsRef<Path>) -> Result<Self, Errno> {
    let store = Store::new(realpath);

    let header = Header::from_bytes(&store.read_all(0, HEADER_SIZE as usize)?)?;

    let users = decode_table(
      &store.read_all(
        header.user_table_offset as AddressSize,
        (header.max_users as AddressSize * USER_RECORD_SIZE) as usize,
      )?,
      USER_RECORD_SIZE,
      UserRecord::from_bytes,
    )?;

    let mut user_map = UserMap::new(header.max_users as usize);
    for (slot, user) in users.iter().enumerate() {
      if user.is_active() {
        user_map.insert(&user.username(), slot as UserSlot);
      }
    }

    let mut entries = decode_table(
      &store.read_all(
        header.metadata_offset as AddressSize,
        (header.metadata_count as AddressSize * METADATA_ENTRY_SIZE) as usize,
      )?,
      METADATA_ENTRY_SIZE,
      MetadataEntry::from_bytes,
    )?;

    // Root is occupied whatever the table says
    if let Some(root) = entries.get_mut(ROOT_INDEX as usize) {
      root.occupancy = ENTRY_OCCUPIED;
    }

    let free_blocks = Self::build_block_map(&header, &entries);

    info!(
      path = %store.realpath().display(),
      users = user_map.len(),
      blocks = free_blocks.len(),
      "store loaded"
    );

    Ok(Self {
      store,
      header,
      users,
      user_map,
      sessions: BTreeMap::new(),
      entries,
      free_blocks,
    })
  }

  /// Format the store first if it does not exist yet, then load it.
  pub fn open_or_format(realpath: impl AsRef<Path>, config: &FormatConfig) -> Result<Self, Errno> {
    if !Store::new(realpath.as_ref()).exists() {
      Self::format(realpath.as_ref(), config)?;
    }
    Self::init(realpath)
  }

  /// Derive block occupancy from the occupied file entries. Block 0 is
  /// reserved and always marked used.
  fn build_block_map(header: &Header, entries: &[MetadataEntry]) -> Vec<bool> {
    let mut free_blocks = vec![true; header.blocks_count() as usize];

    if let Some(reserved) = free_blocks.get_mut(RESERVED_BLOCK as usize) {
      *reserved = false;
    }

    for (index, entry) in entries.iter().enumerate() {
      if !entry.is_occupied() || entry.is_dir() || entry.start_block == RESERVED_BLOCK {
        continue;
      }
      match free_blocks.get_mut(entry.start_block as usize) {
        Some(block) => *block = false,
        None => warn!(index, block = entry.start_block, "entry points past the data region"),
      }
    }

    free_blocks
  }

  pub fn header(&self) -> &Header {
    &self.header
  }

  /// Write `user` into `slot` on disk only; the caller adopts it after.
  pub(crate) fn persist_user(&self, slot: usize, user: &UserRecord) -> Result<(), Errno> {
    self.store.write_record(self.header.user_offset(slot as UserSlot), &user.to_bytes())
  }

  /// Write a whole user table in one piece.
  pub(crate) fn persist_user_table(&self, users: &[UserRecord]) -> Result<(), Errno> {
    self.store.write_record(
      self.header.user_table_offset as AddressSize,
      &encode_table(users, UserRecord::to_bytes),
    )
  }

  pub(crate) fn write_block(&self, block: BlockIndex, at: AddressSize, data: &[u8]) -> Result<(), Errno> {
    self.store.write_record(self.header.block_offset(block) + at, data)
  }

  pub(crate) fn read_block(&self, block: BlockIndex, len: usize) -> Result<Vec<u8>, Errno> {
    self.store.read_all(self.header.block_offset(block), len)
  }
}


// vim:ts=2 sw=2
