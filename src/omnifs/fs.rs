use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::util::{get_bit_at, to_fixed, unixtime};

use super::disk::{
  AddressSize, BlockIndex, EntryIndex, MetadataEntry, ENTRY_FREE, RESERVED_BLOCK, ROOT_INDEX,
};
use super::kernel::{Errno, OmniFs};

///   user
///   |   group
///   |   |   others
///   |   |   |
///   rwx rwx rwx
/// 0b110_100_100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileMode(pub u32);

impl FileMode {
  pub fn user(&self) -> u32 {
    (self.0 >> 6) & 0b111
  }
  pub fn group(&self) -> u32 {
    (self.0 >> 3) & 0b111
  }
  pub fn others(&self) -> u32 {
    self.0 & 0b111
  }
}

impl fmt::Display for FileMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for triple in [self.user(), self.group(), self.others()] {
      let r = if get_bit_at(triple, 2) { 'r' } else { '-' };
      let w = if get_bit_at(triple, 1) { 'w' } else { '-' };
      let x = if get_bit_at(triple, 0) { 'x' } else { '-' };
      write!(f, "{r}{w}{x}")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
  pub name: String,
  pub is_directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
  pub index: EntryIndex,
  pub name: String,
  pub is_directory: bool,
  pub size: AddressSize,
  pub owner_id: u32,
  pub permissions: FileMode,
  pub created_time: u64,
  pub modified_time: u64,
}

/// Root is not counted in `directory_count`. `free_space` may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsStats {
  pub total_size: AddressSize,
  pub used_space: AddressSize,
  pub free_space: i64,
  pub file_count: u32,
  pub directory_count: u32,
}

/// Non-empty components of `pathname`; `""`, `"/"` and `"//"` all give none.
pub fn path_segments(pathname: &str) -> Vec<&str> {
  pathname.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Split at the last slash into (parent path, final name).
/// `"/a/b"` -> `("/a", "b")`, `"/b"` and `"b"` -> `("/", "b")`.
pub fn split_parent(pathname: &str) -> Result<(&str, &str), Errno> {
  let (parent, name) = match pathname.rsplit_once('/') {
    Some(("", name)) => ("/", name),
    Some((parent, name)) => (parent, name),
    None => ("/", pathname),
  };

  if name.is_empty() {
    return Err(Errno::EINVAL(format!("no final component in '{pathname}'")));
  }
  Ok((parent, name))
}

impl OmniFs {
  /// Walk the parent links from root. Intermediate components must be
  /// directories; the last one may be anything.
  pub fn resolve(&self, pathname: &str) -> Option<EntryIndex> {
    let segments = path_segments(pathname);
    let mut current = ROOT_INDEX;

    for (position, segment) in segments.iter().enumerate() {
      let found = self.find_child(current, segment)?;
      if position == segments.len() - 1 {
        return Some(found);
      }
      if !self.entries[found as usize].is_dir() {
        return None;
      }
      current = found;
    }

    Some(current)
  }

  /// Linear scan for an occupied entry named `name` under `parent`.
  /// Root itself is never matched.
  fn find_child(&self, parent: EntryIndex, name: &str) -> Option<EntryIndex> {
    self
      .entries
      .iter()
      .enumerate()
      .skip(1)
      .find(|(_, entry)| entry.is_occupied() && entry.parent_index == parent && entry.name_is(name))
      .map(|(index, _)| index as EntryIndex)
  }

  fn lookup(&self, pathname: &str) -> Result<usize, Errno> {
    self
      .resolve(pathname)
      .map(|index| index as usize)
      .ok_or_else(|| Errno::ENOENT(pathname.to_owned()))
  }

  fn lookup_file(&self, pathname: &str) -> Result<usize, Errno> {
    let index = self.lookup(pathname)?;
    if self.entries[index].is_dir() {
      return Err(Errno::EISDIR(pathname.to_owned()));
    }
    Ok(index)
  }

  /// Resolve the directory a new entry called `name` goes into, refusing
  /// names already present there.
  fn lookup_new_parent<'a>(&self, pathname: &'a str) -> Result<(EntryIndex, &'a str), Errno> {
    let (parent_path, name) = split_parent(pathname)?;

    let parent = self
      .resolve(parent_path)
      .ok_or_else(|| Errno::ENOENT(format!("parent directory '{parent_path}'")))?;
    if !self.entries[parent as usize].is_dir() {
      return Err(Errno::ENOTDIR(parent_path.to_owned()));
    }
    if self.find_child(parent, name).is_some() {
      return Err(Errno::EEXIST(pathname.to_owned()));
    }

    Ok((parent, name))
  }

  fn has_children(&self, index: EntryIndex) -> bool {
    self
      .entries
      .iter()
      .skip(1)
      .any(|entry| entry.is_occupied() && entry.parent_index == index)
  }

  /// Whether `index` sits somewhere beneath `ancestor`.
  fn is_beneath(&self, index: EntryIndex, ancestor: EntryIndex) -> bool {
    let mut current = index;
    // A cycle left behind by an earlier rename must not hang us
    for _ in 0..self.entries.len() {
      if current == ancestor {
        return true;
      }
      if current == ROOT_INDEX {
        return false;
      }
      current = self.entries[current as usize].parent_index;
    }
    false
  }

  /// First free metadata slot after root.
  pub fn allocate_metadata_slot(&self) -> Option<EntryIndex> {
    self
      .entries
      .iter()
      .skip(1)
      .position(|entry| !entry.is_occupied())
      .map(|position| position as EntryIndex + 1)
  }

  /// First free data block after the reserved block 0.
  pub fn allocate_block(&self) -> Option<BlockIndex> {
    self
      .free_blocks
      .iter()
      .skip(1)
      .position(|&free| free)
      .map(|position| position as BlockIndex + 1)
  }

  /// Persist `entry` into slot `index`, then adopt it in memory. A failed
  /// write leaves the in-memory table as it was.
  fn commit_entry(&mut self, index: usize, entry: MetadataEntry) -> Result<(), Errno> {
    self
      .store
      .write_record(self.header.entry_offset(index as EntryIndex), &entry.to_bytes())?;
    self.entries[index] = entry;
    Ok(())
  }

  pub fn create_directory(&mut self, pathname: &str) -> Result<EntryIndex, Errno> {
    let (parent, name) = self.lookup_new_parent(pathname)?;
    let index = self
      .allocate_metadata_slot()
      .ok_or(Errno::ENOSPC("no free metadata entries"))?;

    self.commit_entry(index as usize, MetadataEntry::directory(parent, name, unixtime()))?;

    info!(pathname, index, "directory created");
    Ok(index)
  }

  /// The whole content must fit in the single block a file owns.
  pub fn create_file(&mut self, pathname: &str, content: &[u8]) -> Result<EntryIndex, Errno> {
    if content.len() as AddressSize > self.header.block_size {
      return Err(Errno::EFBIG(format!(
        "{pathname}: {} bytes exceed the {} byte block",
        content.len(),
        self.header.block_size
      )));
    }

    let (parent, name) = self.lookup_new_parent(pathname)?;
    let index = self
      .allocate_metadata_slot()
      .ok_or(Errno::ENOSPC("no free metadata entries"))?;
    let block = self
      .allocate_block()
      .ok_or(Errno::ENOSPC("no free data blocks"))?;

    self.write_block(block, 0, content)?;
    let entry = MetadataEntry::file(parent, name, block, content.len() as AddressSize, unixtime());
    self.commit_entry(index as usize, entry)?;
    self.free_blocks[block as usize] = false;

    info!(pathname, index, block, size = content.len(), "file created");
    Ok(index)
  }

  pub fn read_file(&self, pathname: &str) -> Result<Vec<u8>, Errno> {
    let index = self.lookup_file(pathname)?;
    let entry = &self.entries[index];
    self.read_block(entry.start_block, entry.size as usize)
  }

  /// Overwrite bytes in place. The file never grows.
  pub fn edit_file(&mut self, pathname: &str, new_content: &[u8], at_index: AddressSize) -> Result<(), Errno> {
    let index = self.lookup_file(pathname)?;
    let entry = &self.entries[index];

    let end = at_index.checked_add(new_content.len() as AddressSize);
    if end.map_or(true, |end| end > entry.size) {
      return Err(Errno::EINVAL(format!(
        "{pathname}: edit of {} bytes at {at_index} exceeds size {}",
        new_content.len(),
        entry.size
      )));
    }

    self.write_block(entry.start_block, at_index, new_content)?;

    let mut edited = entry.clone();
    edited.modified_time = unixtime();
    self.commit_entry(index, edited)?;

    debug!(pathname, at_index, len = new_content.len(), "file edited");
    Ok(())
  }

  /// Size drops to zero; the block keeps its bytes and stays allocated.
  pub fn truncate_file(&mut self, pathname: &str) -> Result<(), Errno> {
    let index = self.lookup_file(pathname)?;

    let mut truncated = self.entries[index].clone();
    truncated.size = 0;
    truncated.modified_time = unixtime();
    self.commit_entry(index, truncated)?;

    debug!(pathname, "file truncated");
    Ok(())
  }

  pub fn remove_file(&mut self, pathname: &str) -> Result<(), Errno> {
    let index = self.lookup_file(pathname)?;

    let mut removed = self.entries[index].clone();
    let block = removed.start_block;
    removed.occupancy = ENTRY_FREE;
    self.commit_entry(index, removed)?;

    if block != RESERVED_BLOCK {
      if let Some(free) = self.free_blocks.get_mut(block as usize) {
        *free = true;
      }
    }

    info!(pathname, index, block, "file removed");
    Ok(())
  }

  pub fn remove_directory(&mut self, pathname: &str) -> Result<(), Errno> {
    let index = self.lookup(pathname)?;
    if index == ROOT_INDEX as usize {
      return Err(Errno::EPERM("cannot remove the root directory"));
    }
    if !self.entries[index].is_dir() {
      return Err(Errno::ENOTDIR(pathname.to_owned()));
    }
    if self.has_children(index as EntryIndex) {
      return Err(Errno::ENOTEMPTY(pathname.to_owned()));
    }

    let mut removed = self.entries[index].clone();
    removed.occupancy = ENTRY_FREE;
    self.commit_entry(index, removed)?;

    info!(pathname, index, "directory removed");
    Ok(())
  }

  /// Move and/or rename. Moving a directory beneath itself is not refused:
  /// the subtree becomes unreachable, which is only reported in the log.
  pub fn rename(&mut self, old_pathname: &str, new_pathname: &str) -> Result<(), Errno> {
    let index = self.lookup(old_pathname)?;
    if index == ROOT_INDEX as usize {
      return Err(Errno::EPERM("cannot rename the root directory"));
    }

    let (parent_path, name) = split_parent(new_pathname)?;
    let parent = self
      .resolve(parent_path)
      .ok_or_else(|| Errno::ENOENT(format!("destination directory '{parent_path}'")))?;
    if !self.entries[parent as usize].is_dir() {
      return Err(Errno::ENOTDIR(parent_path.to_owned()));
    }
    if let Some(existing) = self.find_child(parent, name) {
      if existing as usize != index {
        return Err(Errno::EEXIST(new_pathname.to_owned()));
      }
    }

    if self.entries[index].is_dir() && self.is_beneath(parent, index as EntryIndex) {
      warn!(
        old_pathname,
        new_pathname, "directory moved beneath itself, its subtree is now unreachable"
      );
    }

    let mut moved = self.entries[index].clone();
    moved.parent_index = parent;
    moved.name = to_fixed(name);
    moved.modified_time = unixtime();
    self.commit_entry(index, moved)?;

    info!(old_pathname, new_pathname, index, "renamed");
    Ok(())
  }

  pub fn list_directory(&self, pathname: &str) -> Result<Vec<DirEntry>, Errno> {
    let index = self.lookup(pathname)?;
    if !self.entries[index].is_dir() {
      return Err(Errno::ENOTDIR(pathname.to_owned()));
    }

    Ok(
      self
        .entries
        .iter()
        .skip(1)
        .filter(|entry| entry.is_occupied() && entry.parent_index as usize == index)
        .map(|entry| DirEntry {
          name: entry.name(),
          is_directory: entry.is_dir(),
        })
        .collect(),
    )
  }

  pub fn stat(&self, pathname: &str) -> Result<FileStat, Errno> {
    let index = self.lookup(pathname)?;
    let entry = &self.entries[index];

    Ok(FileStat {
      index: index as EntryIndex,
      name: entry.name(),
      is_directory: entry.is_dir(),
      size: entry.size,
      owner_id: entry.owner_id,
      permissions: FileMode(entry.permissions),
      created_time: entry.created_time,
      modified_time: entry.modified_time,
    })
  }

  pub fn set_permissions(&mut self, pathname: &str, permissions: u32) -> Result<(), Errno> {
    let index = self.lookup(pathname)?;

    let mut changed = self.entries[index].clone();
    changed.permissions = permissions;
    changed.modified_time = unixtime();
    self.commit_entry(index, changed)?;

    debug!(pathname, mode = %FileMode(permissions), "permissions set");
    Ok(())
  }

  pub fn fs_stats(&self) -> FsStats {
    let block_size = self.header.block_size;
    let mut stats = FsStats {
      total_size: self.header.total_size,
      used_space: 0,
      free_space: 0,
      file_count: 0,
      directory_count: 0,
    };

    for entry in self.entries.iter().skip(1).filter(|entry| entry.is_occupied()) {
      if entry.is_dir() {
        stats.directory_count += 1;
      } else {
        stats.file_count += 1;
        stats.used_space += (entry.size + block_size - 1) / block_size * block_size;
      }
    }

    stats.free_space = self.header.total_size as i64
      - self.header.data_region_offset() as i64
      - stats.used_space as i64;
    stats
  }

  pub fn path_is_directory(&self, pathname: &str) -> bool {
    self
      .resolve(pathname)
      .map_or(false, |index| self.entries[index as usize].is_dir())
  }

  pub fn path_is_file(&self, pathname: &str) -> bool {
    self
      .resolve(pathname)
      .map_or(false, |index| !self.entries[index as usize].is_dir())
  }
}


// vim:ts=2 sw=2
