use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::omnifs::disk::{AddressSize, HEADER_SIZE, METADATA_ENTRY_SIZE, PASSWORD_LEN, USER_RECORD_SIZE};
use crate::omnifs::kernel::Errno;
use crate::util::parse_size;

pub const DEFAULT_TOTAL_SIZE: AddressSize = 100 * 1024 * 1024;
pub const DEFAULT_BLOCK_SIZE: AddressSize = 4096;
pub const DEFAULT_MAX_USERS: u32 = 50;
pub const DEFAULT_METADATA_COUNT: u32 = 1000;

/// Parameters a store is formatted with, usually read from YAML:
///
/// ```yaml
/// total_size: 100M
/// block_size: 4096
/// max_users: 50
/// metadata_count: 1000
/// admin_username: admin
/// admin_password: admin123
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
  #[serde(deserialize_with = "size_or_number")]
  pub total_size: AddressSize,
  #[serde(deserialize_with = "size_or_number")]
  pub block_size: AddressSize,
  pub max_users: u32,
  pub metadata_count: u32,
  pub admin_username: String,
  pub admin_password: String,
}

impl Default for FormatConfig {
  fn default() -> Self {
    Self {
      total_size: DEFAULT_TOTAL_SIZE,
      block_size: DEFAULT_BLOCK_SIZE,
      max_users: DEFAULT_MAX_USERS,
      metadata_count: DEFAULT_METADATA_COUNT,
      admin_username: String::from("admin"),
      admin_password: String::from("admin123"),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeSpec {
  Number(AddressSize),
  Text(String),
}

fn size_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AddressSize, D::Error> {
  match SizeSpec::deserialize(deserializer)? {
    SizeSpec::Number(number) => Ok(number),
    SizeSpec::Text(text) => parse_size(&text).map_err(serde::de::Error::custom),
  }
}

impl FormatConfig {
  pub fn load(config_path: impl AsRef<Path>) -> Result<Self, Errno> {
    let reader = std::fs::File::open(config_path.as_ref())?;
    serde_yaml::from_reader::<_, FormatConfig>(reader)
      .map_err(|err| Errno::EINVAL(format!("{}: {err}", config_path.as_ref().display())))
  }

  /// Size of header plus both tables; data blocks start right after.
  pub fn tables_size(&self) -> AddressSize {
    HEADER_SIZE
      + self.max_users as AddressSize * USER_RECORD_SIZE
      + self.metadata_count as AddressSize * METADATA_ENTRY_SIZE
  }

  pub fn validate(&self) -> Result<(), Errno> {
    if self.block_size == 0 {
      return Err(Errno::EINVAL(String::from("block_size must be positive")));
    }
    if self.max_users == 0 {
      return Err(Errno::EINVAL(String::from("max_users must be positive")));
    }
    if self.metadata_count < 2 {
      return Err(Errno::EINVAL(String::from("metadata_count must leave room beside the root")));
    }
    if self.admin_username.is_empty() {
      return Err(Errno::EINVAL(String::from("admin_username must not be empty")));
    }
    if self.admin_password.len() > PASSWORD_LEN - 1 {
      return Err(Errno::EINVAL(format!("admin_password longer than {} bytes", PASSWORD_LEN - 1)));
    }
    // Block 0 is reserved, so at least two blocks must fit
    let needed = self.tables_size() + 2 * self.block_size;
    if self.total_size < needed {
      return Err(Errno::EINVAL(format!(
        "total_size {} too small, need at least {needed}",
        self.total_size
      )));
    }
    Ok(())
  }

  /// SHA-256 of the canonical YAML form, hex encoded (64 characters).
  pub fn fingerprint(&self) -> Result<String, Errno> {
    let canonical = serde_yaml::to_string(self)
      .map_err(|err| Errno::EINVAL(format!("can't serialize config: {err}")))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
  }
}


// vim:ts=2 sw=2
