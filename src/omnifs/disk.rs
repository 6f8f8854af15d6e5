use crate::util::{from_fixed, to_fixed};

use super::kernel::Errno;

pub type AddressSize = u64;
pub type EntryIndex = u32;
pub type BlockIndex = u32;
pub type UserSlot = u32;

pub const MAGIC: [u8; 8] = *b"OMNIFS01";
pub const FORMAT_VERSION: u32 = 0x0001_0000;

pub const HEADER_SIZE: AddressSize = 512;
pub const USER_RECORD_SIZE: AddressSize = 144;
pub const METADATA_ENTRY_SIZE: AddressSize = 72;

pub const USERNAME_LEN: usize = 32;
pub const PASSWORD_LEN: usize = 64;
pub const NAME_LEN: usize = 12;

/// Occupancy flag values, as the format defines them: `1` is free
pub const ENTRY_FREE: u8 = 1;
pub const ENTRY_OCCUPIED: u8 = 0;

pub const ROOT_INDEX: EntryIndex = 0;
pub const ADMIN_SLOT: UserSlot = 0;

/// Never handed out by the block allocator.
pub const RESERVED_BLOCK: BlockIndex = 0;

pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o755;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  File = 0,
  Dir = 1,
}

impl From<u8> for EntryKind {
  fn from(raw: u8) -> Self {
    match raw {
      1 => EntryKind::Dir,
      _ => EntryKind::File,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Role {
  Standard = 0,
  Admin = 1,
}

impl From<u32> for Role {
  fn from(raw: u32) -> Self {
    match raw {
      1 => Role::Admin,
      _ => Role::Standard,
    }
  }
}

/// Sequential little-endian reader over a record that has already been
/// checked for length.
struct Fields<'a> {
  bytes: &'a [u8],
  position: usize,
}

impl<'a> Fields<'a> {
  fn new(bytes: &'a [u8], expected: AddressSize, what: &str) -> Result<Self, Errno> {
    if (bytes.len() as AddressSize) < expected {
      return Err(Errno::EINVAL(format!("short {what} record: {} of {expected} bytes", bytes.len())));
    }
    Ok(Self { bytes, position: 0 })
  }

  fn take<const N: usize>(&mut self) -> [u8; N] {
    let mut field = [0u8; N];
    field.copy_from_slice(&self.bytes[self.position..self.position + N]);
    self.position += N;
    field
  }

  fn u8(&mut self) -> u8 {
    self.take::<1>()[0]
  }
  fn u32(&mut self) -> u32 {
    u32::from_le_bytes(self.take())
  }
  fn u64(&mut self) -> u64 {
    u64::from_le_bytes(self.take())
  }
}

/// Pads an encoded record with zeroes up to its fixed size.
fn finish(mut bytes: Vec<u8>, size: AddressSize) -> Vec<u8> {
  bytes.resize(size as usize, 0);
  bytes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
  pub magic: [u8; 8],
  pub format_version: u32,
  pub total_size: AddressSize,
  pub header_size: AddressSize,
  pub block_size: AddressSize,
  pub store_id: [u8; 32],
  pub created_date: [u8; 16],
  pub config_hash: [u8; 64],
  pub config_timestamp: u64,
  pub user_table_offset: u32,
  pub max_users: u32,
  pub metadata_offset: u32,
  pub change_log_offset: u32,
  pub metadata_count: u32,
}

impl Header {
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_SIZE as usize);
    bytes.extend_from_slice(&self.magic);
    bytes.extend_from_slice(&self.format_version.to_le_bytes());
    bytes.extend_from_slice(&self.total_size.to_le_bytes());
    bytes.extend_from_slice(&self.header_size.to_le_bytes());
    bytes.extend_from_slice(&self.block_size.to_le_bytes());
    bytes.extend_from_slice(&self.store_id);
    bytes.extend_from_slice(&self.created_date);
    bytes.extend_from_slice(&self.config_hash);
    bytes.extend_from_slice(&self.config_timestamp.to_le_bytes());
    bytes.extend_from_slice(&self.user_table_offset.to_le_bytes());
    bytes.extend_from_slice(&self.max_users.to_le_bytes());
    bytes.extend_from_slice(&self.metadata_offset.to_le_bytes());
    bytes.extend_from_slice(&self.change_log_offset.to_le_bytes());
    bytes.extend_from_slice(&self.metadata_count.to_le_bytes());
    finish(bytes, HEADER_SIZE)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, Errno> {
    let mut fields = Fields::new(bytes, HEADER_SIZE, "header")?;
    let header = Self {
      magic: fields.take(),
      format_version: fields.u32(),
      total_size: fields.u64(),
      header_size: fields.u64(),
      block_size: fields.u64(),
      store_id: fields.take(),
      created_date: fields.take(),
      config_hash: fields.take(),
      config_timestamp: fields.u64(),
      user_table_offset: fields.u32(),
      max_users: fields.u32(),
      metadata_offset: fields.u32(),
      change_log_offset: fields.u32(),
      metadata_count: fields.u32(),
    };

    if header.magic != MAGIC {
      return Err(Errno::EINVAL(format!("bad magic: {:?}", String::from_utf8_lossy(&header.magic))));
    }
    if header.block_size == 0 {
      return Err(Errno::EINVAL(String::from("header: zero block size")));
    }
    // Root lives in entry 0
    if header.metadata_count == 0 {
      return Err(Errno::EINVAL(String::from("header: empty metadata table")));
    }
    Ok(header)
  }

  pub fn user_offset(&self, slot: UserSlot) -> AddressSize {
    self.user_table_offset as AddressSize + slot as AddressSize * USER_RECORD_SIZE
  }

  pub fn entry_offset(&self, index: EntryIndex) -> AddressSize {
    self.metadata_offset as AddressSize + index as AddressSize * METADATA_ENTRY_SIZE
  }

  pub fn data_region_offset(&self) -> AddressSize {
    self.entry_offset(self.metadata_count)
  }

  pub fn block_offset(&self, block: BlockIndex) -> AddressSize {
    self.data_region_offset() + block as AddressSize * self.block_size
  }

  pub fn blocks_count(&self) -> AddressSize {
    self.total_size.saturating_sub(self.data_region_offset()) / self.block_size
  }

  pub fn store_id(&self) -> String {
    from_fixed(&self.store_id)
  }
  pub fn created_date(&self) -> String {
    from_fixed(&self.created_date)
  }
  pub fn config_hash(&self) -> String {
    from_fixed(&self.config_hash)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
  pub username: [u8; USERNAME_LEN],
  pub password: [u8; PASSWORD_LEN],
  pub role: u32,
  pub created_time: u64,
  pub last_login: u64,
  pub active: u8,
}

impl Default for UserRecord {
  fn default() -> Self {
    Self {
      username: [0; USERNAME_LEN],
      password: [0; PASSWORD_LEN],
      role: Role::Standard as u32,
      created_time: 0,
      last_login: 0,
      active: 0,
    }
  }
}

impl UserRecord {
  pub fn new(username: &str, password: &str, role: Role, created_time: u64) -> Self {
    Self {
      username: to_fixed(username),
      password: to_fixed(password),
      role: role as u32,
      created_time,
      last_login: 0,
      active: 1,
    }
  }

  pub fn username(&self) -> String {
    from_fixed(&self.username)
  }

  /// Verbatim comparison: the field holds the password itself, not a digest.
  pub fn password_matches(&self, password: &str) -> bool {
    from_fixed(&self.password) == password
  }

  pub fn role(&self) -> Role {
    Role::from(self.role)
  }

  pub fn is_active(&self) -> bool {
    self.active == 1
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(USER_RECORD_SIZE as usize);
    bytes.extend_from_slice(&self.username);
    bytes.extend_from_slice(&self.password);
    bytes.extend_from_slice(&self.role.to_le_bytes());
    bytes.extend_from_slice(&self.created_time.to_le_bytes());
    bytes.extend_from_slice(&self.last_login.to_le_bytes());
    bytes.push(self.active);
    finish(bytes, USER_RECORD_SIZE)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, Errno> {
    let mut fields = Fields::new(bytes, USER_RECORD_SIZE, "user")?;
    Ok(Self {
      username: fields.take(),
      password: fields.take(),
      role: fields.u32(),
      created_time: fields.u64(),
      last_login: fields.u64(),
      active: fields.u8(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
  pub occupancy: u8,
  pub kind: u8,
  pub parent_index: EntryIndex,
  pub name: [u8; NAME_LEN],
  pub start_block: BlockIndex,
  pub size: AddressSize,
  pub owner_id: u32,
  pub permissions: u32,
  pub created_time: u64,
  pub modified_time: u64,
}

impl Default for MetadataEntry {
  fn default() -> Self {
    Self {
      occupancy: ENTRY_FREE,
      kind: EntryKind::File as u8,
      parent_index: ROOT_INDEX,
      name: [0; NAME_LEN],
      start_block: RESERVED_BLOCK,
      size: 0,
      owner_id: 0,
      permissions: 0,
      created_time: 0,
      modified_time: 0,
    }
  }
}

impl MetadataEntry {
  pub fn directory(parent_index: EntryIndex, name: &str, now: u64) -> Self {
    Self {
      occupancy: ENTRY_OCCUPIED,
      kind: EntryKind::Dir as u8,
      parent_index,
      name: to_fixed(name),
      permissions: DEFAULT_DIR_PERMISSIONS,
      created_time: now,
      modified_time: now,
      ..Self::default()
    }
  }

  pub fn file(parent_index: EntryIndex, name: &str, start_block: BlockIndex, size: AddressSize, now: u64) -> Self {
    Self {
      occupancy: ENTRY_OCCUPIED,
      kind: EntryKind::File as u8,
      parent_index,
      name: to_fixed(name),
      start_block,
      size,
      permissions: DEFAULT_FILE_PERMISSIONS,
      created_time: now,
      modified_time: now,
      ..Self::default()
    }
  }

  pub fn is_occupied(&self) -> bool {
    self.occupancy == ENTRY_OCCUPIED
  }

  pub fn kind(&self) -> EntryKind {
    EntryKind::from(self.kind)
  }

  pub fn is_dir(&self) -> bool {
    self.kind() == EntryKind::Dir
  }

  pub fn name(&self) -> String {
    from_fixed(&self.name)
  }

  /// Byte-for-byte match against the stored (bounded) name.
  pub fn name_is(&self, name: &str) -> bool {
    self.name == to_fixed::<NAME_LEN>(name)
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(METADATA_ENTRY_SIZE as usize);
    bytes.push(self.occupancy);
    bytes.push(self.kind);
    bytes.extend_from_slice(&self.parent_index.to_le_bytes());
    bytes.extend_from_slice(&self.name);
    bytes.extend_from_slice(&self.start_block.to_le_bytes());
    bytes.extend_from_slice(&self.size.to_le_bytes());
    bytes.extend_from_slice(&self.owner_id.to_le_bytes());
    bytes.extend_from_slice(&self.permissions.to_le_bytes());
    bytes.extend_from_slice(&self.created_time.to_le_bytes());
    bytes.extend_from_slice(&self.modified_time.to_le_bytes());
    finish(bytes, METADATA_ENTRY_SIZE)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, Errno> {
    let mut fields = Fields::new(bytes, METADATA_ENTRY_SIZE, "metadata")?;
    Ok(Self {
      occupancy: fields.u8(),
      kind: fields.u8(),
      parent_index: fields.u32(),
      name: fields.take(),
      start_block: fields.u32(),
      size: fields.u64(),
      owner_id: fields.u32(),
      permissions: fields.u32(),
      created_time: fields.u64(),
      modified_time: fields.u64(),
    })
  }
}

/// Encode a run of records back to back, as the tables are laid out on disk.
pub fn encode_table<T>(records: &[T], encode: impl Fn(&T) -> Vec<u8>) -> Vec<u8> {
  records.iter().flat_map(encode).collect()
}

/// Split a table read in one piece back into records of `size` bytes.
pub fn decode_table<T>(
  bytes: &[u8],
  size: AddressSize,
  decode: impl Fn(&[u8]) -> Result<T, Errno>,
) -> Result<Vec<T>, Errno> {
  bytes.chunks(size as usize).map(decode).collect()
}


// vim:ts=2 sw=2
