use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::disk::UserSlot;

#[derive(Debug)]
struct UserMapNode {
  key: String,
  slot: UserSlot,
  next: Option<Box<UserMapNode>>,
}

/// Username -> user table slot. Separate chaining over a fixed number of
/// buckets (the user table capacity); supports insert and lookup only.
///
/// Inserting a key that is already present replaces its slot in place
/// rather than shadowing the old node with a new head.
#[derive(Debug)]
pub struct UserMap {
  buckets: Vec<Option<Box<UserMapNode>>>,
}

impl UserMap {
  pub fn new(size: usize) -> Self {
    let mut buckets = Vec::with_capacity(size.max(1));
    buckets.resize_with(size.max(1), || None);
    Self { buckets }
  }

  fn bucket(&self, key: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % self.buckets.len() as u64) as usize
  }

  pub fn insert(&mut self, key: &str, slot: UserSlot) {
    let index = self.bucket(key);

    let mut current = self.buckets[index].as_deref_mut();
    while let Some(node) = current {
      if node.key == key {
        node.slot = slot;
        return;
      }
      current = node.next.as_deref_mut();
    }

    let head = self.buckets[index].take();
    self.buckets[index] = Some(Box::new(UserMapNode {
      key: key.to_owned(),
      slot,
      next: head,
    }));
  }

  pub fn get(&self, key: &str) -> Option<UserSlot> {
    let mut current = self.buckets[self.bucket(key)].as_deref();
    while let Some(node) = current {
      if node.key == key {
        return Some(node.slot);
      }
      current = node.next.as_deref();
    }
    None
  }

  pub fn len(&self) -> usize {
    self
      .buckets
      .iter()
      .map(|bucket| {
        let mut count = 0;
        let mut current = bucket.as_deref();
        while let Some(node) = current {
          count += 1;
          current = node.next.as_deref();
        }
        count
      })
      .sum()
  }

  pub fn is_empty(&self) -> bool {
    self.buckets.iter().all(Option::is_none)
  }
}


// vim:ts=2 sw=2
