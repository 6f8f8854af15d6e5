use chrono::{TimeZone, Utc};
use fancy_regex::Regex;

use crate::omnifs::kernel::Errno;

/// Seconds since the unix epoch, as stored in every on-disk timestamp.
pub fn unixtime() -> u64 {
  Utc::now().timestamp().max(0) as u64
}

/// Render a stored timestamp the way `ls`/`stat` print it.
pub fn human_time(timestamp: u64) -> String {
  match Utc.timestamp_opt(timestamp as i64, 0).single() {
    Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
    None => String::from("<invalid time>"),
  }
}

/// gets the bit at position `n`. Bits are numbered from 0 (least significant) to 31 (most significant).
pub fn get_bit_at(input: u32, n: u8) -> bool {
  if n < 32 {
    input & (1 << n) != 0
  } else {
    false
  }
}

/// Parse `4096`, `64K`, `100M`, `1G` (binary multiples) into bytes.
pub fn parse_size(size: &str) -> Result<u64, Errno> {
  let regex = Regex::new(r"^\s*(\d+)\s*([KkMmGg]?)[Bb]?\s*$")
    .map_err(|_| Errno::EINVAL(String::from("util::parse_size: bad size pattern")))?;

  let captures = regex
    .captures(size)
    .map_err(|_| Errno::EINVAL(format!("can't match size: {size}")))?
    .ok_or_else(|| Errno::EINVAL(format!("not a size: {size}")))?;

  let number = captures
    .get(1)
    .map(|m| m.as_str())
    .unwrap_or("")
    .parse::<u64>()
    .map_err(|_| Errno::EINVAL(format!("size out of range: {size}")))?;

  let multiplier: u64 = match captures.get(2).map(|m| m.as_str()).unwrap_or("") {
    "k" | "K" => 1 << 10,
    "m" | "M" => 1 << 20,
    "g" | "G" => 1 << 30,
    _ => 1,
  };

  number
    .checked_mul(multiplier)
    .ok_or_else(|| Errno::EINVAL(format!("size out of range: {size}")))
}

/// Copy `value` into a NUL padded field of `N` bytes, keeping at most
/// `N - 1` bytes and never splitting a UTF-8 character.
pub fn to_fixed<const N: usize>(value: &str) -> [u8; N] {
  let mut field = [0u8; N];
  let kept = truncate_utf8(value, N.saturating_sub(1));
  field[..kept.len()].copy_from_slice(kept.as_bytes());
  field
}

/// Fill all `N` bytes of a field with no terminator, for fixed-width
/// provenance values such as hex digests.
pub fn to_exact<const N: usize>(value: &str) -> [u8; N] {
  let mut field = [0u8; N];
  let kept = truncate_utf8(value, N);
  field[..kept.len()].copy_from_slice(kept.as_bytes());
  field
}

/// Read a NUL padded field back into a string.
pub fn from_fixed(field: &[u8]) -> String {
  let end = field.iter().position(|&byte| byte == 0).unwrap_or(field.len());
  String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Longest prefix of `value` that fits in `limit` bytes on a char boundary.
pub fn truncate_utf8(value: &str, limit: usize) -> &str {
  if value.len() <= limit {
    return value;
  }
  let mut end = limit;
  while !value.is_char_boundary(end) {
    end -= 1;
  }
  &value[..end]
}


// vim:ts=2 sw=2
