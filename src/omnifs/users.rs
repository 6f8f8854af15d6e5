use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::util::{truncate_utf8, unixtime};

use super::disk::{Role, UserRecord, UserSlot, ADMIN_SLOT, PASSWORD_LEN, USERNAME_LEN};
use super::kernel::{Errno, OmniFs};

pub const SESSION_ID_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
  pub username: String,
  pub role: Role,
}

impl SessionInfo {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

/// 32 characters drawn uniformly from `[0-9A-Za-z]`. Not meant to be a
/// cryptographic token.
pub fn generate_session_id() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(SESSION_ID_LEN)
    .map(char::from)
    .collect()
}

impl OmniFs {
  fn active_slot(&self, username: &str) -> Option<usize> {
    self
      .users
      .iter()
      .position(|user| user.is_active() && user.username() == username)
  }

  /// Add a user in the first inactive slot and persist the whole table.
  pub fn create_user(&mut self, username: &str, password: &str, role: Role) -> Result<UserSlot, Errno> {
    let username = truncate_utf8(username, USERNAME_LEN - 1);
    if username.is_empty() {
      return Err(Errno::EINVAL(String::from("empty username")));
    }
    // Passwords compare verbatim, so one that would not fit is refused
    if password.len() > PASSWORD_LEN - 1 {
      return Err(Errno::EINVAL(format!("password longer than {} bytes", PASSWORD_LEN - 1)));
    }
    if self.active_slot(username).is_some() {
      return Err(Errno::EEXIST(username.to_owned()));
    }

    let slot = self
      .users
      .iter()
      .position(|user| !user.is_active())
      .ok_or(Errno::ENOSPC("no free user slots"))?;

    let mut users = self.users.clone();
    users[slot] = UserRecord::new(username, password, role, unixtime());
    self.persist_user_table(&users)?;

    self.users = users;
    self.user_map.insert(username, slot as UserSlot);

    info!(username, slot, ?role, "user created");
    Ok(slot as UserSlot)
  }

  /// Deactivate a user and persist that slot. Sessions held by the user
  /// are dropped as well; the index entry stays and is ignored by lookups
  /// until the slot is reused.
  pub fn delete_user(&mut self, username: &str) -> Result<(), Errno> {
    let slot = self
      .active_slot(username)
      .ok_or_else(|| Errno::ENOENT(format!("user '{username}'")))?;
    if slot == ADMIN_SLOT as usize {
      return Err(Errno::EPERM("cannot delete the administrator"));
    }

    let mut deleted = self.users[slot].clone();
    deleted.active = 0;
    self.persist_user(slot, &deleted)?;
    self.users[slot] = deleted;

    let before = self.sessions.len();
    self.sessions.retain(|_, session_slot| *session_slot as usize != slot);

    info!(username, slot, sessions_dropped = before - self.sessions.len(), "user deleted");
    Ok(())
  }

  /// Usernames of every active record, in slot order.
  pub fn list_users(&self) -> Vec<String> {
    self
      .users
      .iter()
      .filter(|user| user.is_active())
      .map(UserRecord::username)
      .collect()
  }

  /// Missing user and wrong password fail the same way.
  pub fn login(&mut self, username: &str, password: &str) -> Result<String, Errno> {
    let slot = self
      .user_map
      .get(username)
      .map(|slot| slot as usize)
      .filter(|&slot| {
        self
          .users
          .get(slot)
          .map_or(false, |user| user.is_active() && user.username() == username && user.password_matches(password))
      })
      .ok_or(Errno::EAUTH("invalid username or password"))?;

    let mut logged_in = self.users[slot].clone();
    logged_in.last_login = unixtime();
    self.persist_user(slot, &logged_in)?;
    self.users[slot] = logged_in;

    let session_id = generate_session_id();
    self.sessions.insert(session_id.clone(), slot as UserSlot);

    info!(username, "login");
    Ok(session_id)
  }

  /// Returns whether a session was actually removed.
  pub fn logout(&mut self, session_id: &str) -> bool {
    match self.sessions.remove(session_id) {
      Some(_) => true,
      None => {
        warn!("logout for a session that does not exist");
        false
      }
    }
  }

  pub fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
    let slot = *self.sessions.get(session_id)?;
    let user = self.users.get(slot as usize)?;
    Some(SessionInfo {
      username: user.username(),
      role: user.role(),
    })
  }

  pub fn require_session(&self, session_id: &str) -> Result<SessionInfo, Errno> {
    self
      .session_info(session_id)
      .ok_or(Errno::EAUTH("session expired or invalid"))
  }

  pub fn require_admin(&self, session_id: &str) -> Result<SessionInfo, Errno> {
    let info = self.require_session(session_id)?;
    if !info.is_admin() {
      return Err(Errno::EACCES("administrator role required"));
    }
    Ok(info)
  }

  pub fn sessions_count(&self) -> usize {
    self.sessions.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::omnifs::kernel::tests::{fresh, small_config};
  use crate::omnifs::kernel::ErrorKind;

  #[test]
  fn session_ids_are_alphanumeric() {
    let id = generate_session_id();
    assert_eq!(id.len(), SESSION_ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn admin_can_log_in() {
    let (_dir, mut fs) = fresh(&small_config());

    let session = fs.login("admin", "admin123").unwrap();
    let info = fs.session_info(&session).unwrap();

    assert_eq!(info.username, "admin");
    assert!(info.is_admin());
    assert!(fs.users[0].last_login > 0);
  }

  #[test]
  fn bad_credentials_fail_alike() {
    let (_dir, mut fs) = fresh(&small_config());

    let wrong_password = fs.login("admin", "nope").unwrap_err();
    let no_user = fs.login("ghost", "admin123").unwrap_err();

    assert_eq!(wrong_password.kind(), ErrorKind::Unauthenticated);
    assert_eq!(wrong_password.to_string(), no_user.to_string());
    assert_eq!(fs.sessions_count(), 0);
  }

  #[test]
  fn session_lifecycle() {
    let (_dir, mut fs) = fresh(&small_config());
    fs.create_user("alice", "pw", Role::Standard).unwrap();

    let session = fs.login("alice", "pw").unwrap();
    assert_eq!(
      fs.session_info(&session),
      Some(SessionInfo { username: String::from("alice"), role: Role::Standard })
    );

    assert!(fs.logout(&session));
    assert_eq!(fs.session_info(&session), None);
    assert!(!fs.logout(&session));
  }

  #[test]
  fn several_sessions_per_user() {
    let (_dir, mut fs) = fresh(&small_config());
    let first = fs.login("admin", "admin123").unwrap();
    let second = fs.login("admin", "admin123").unwrap();

    assert_ne!(first, second);
    assert_eq!(fs.sessions_count(), 2);
  }

  #[test]
  fn create_user_fills_first_free_slot_and_persists() {
    let (dir, mut fs) = fresh(&small_config());

    assert_eq!(fs.create_user("alice", "a", Role::Standard).unwrap(), 1);
    assert_eq!(fs.create_user("bob", "b", Role::Admin).unwrap(), 2);
    fs.delete_user("alice").unwrap();
    assert_eq!(fs.create_user("carol", "c", Role::Standard).unwrap(), 1);

    let reloaded = OmniFs::init(dir.path().join("test.omni")).unwrap();
    assert_eq!(reloaded.list_users(), vec!["admin", "carol", "bob"]);
  }

  #[test]
  fn create_user_rejects_duplicates_and_exhaustion() {
    let config = crate::config::FormatConfig {
      max_users: 2,
      ..small_config()
    };
    let (_dir, mut fs) = fresh(&config);

    assert!(matches!(fs.create_user("admin", "x", Role::Standard), Err(Errno::EEXIST(_))));
    fs.create_user("alice", "a", Role::Standard).unwrap();
    let err = fs.create_user("bob", "b", Role::Standard).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exhausted);
  }

  #[test]
  fn long_usernames_are_truncated() {
    let (_dir, mut fs) = fresh(&small_config());
    let long = "u".repeat(40);

    fs.create_user(&long, "pw", Role::Standard).unwrap();

    let stored = "u".repeat(31);
    assert!(fs.list_users().contains(&stored));
    assert!(fs.login(&stored, "pw").is_ok());
  }

  #[test]
  fn admin_cannot_be_deleted() {
    let (_dir, mut fs) = fresh(&small_config());
    assert!(matches!(fs.delete_user("admin"), Err(Errno::EPERM(_))));
    assert!(matches!(fs.delete_user("ghost"), Err(Errno::ENOENT(_))));
  }

  #[test]
  fn deleted_user_loses_sessions_and_login() {
    let (_dir, mut fs) = fresh(&small_config());
    fs.create_user("alice", "pw", Role::Standard).unwrap();
    let session = fs.login("alice", "pw").unwrap();

    fs.delete_user("alice").unwrap();

    assert_eq!(fs.session_info(&session), None);
    assert!(fs.login("alice", "pw").is_err());
    assert_eq!(fs.list_users(), vec!["admin"]);
  }

  #[test]
  fn oversize_password_is_refused() {
    let (_dir, mut fs) = fresh(&small_config());
    let longest = "p".repeat(PASSWORD_LEN - 1);

    let err = fs.create_user("bob", &"p".repeat(70), Role::Standard).unwrap_err();
    assert!(matches!(err, Errno::EINVAL(_)));
    assert_eq!(fs.list_users(), vec!["admin"]);

    fs.create_user("bob", &longest, Role::Standard).unwrap();
    assert!(fs.login("bob", &longest).is_ok());
  }

  #[test]
  fn failed_create_leaves_tables_alone() {
    let (dir, mut fs) = fresh(&small_config());
    std::fs::remove_file(dir.path().join("test.omni")).unwrap();
    let before = fs.users.clone();

    let err = fs.create_user("ghost", "pw", Role::Standard).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(fs.users, before);
    assert_eq!(fs.list_users(), vec!["admin"]);
    assert_eq!(fs.user_map.get("ghost"), None);
    assert!(fs.login("ghost", "pw").is_err());
  }

  #[test]
  fn failed_login_write_registers_nothing() {
    let (dir, mut fs) = fresh(&small_config());
    std::fs::remove_file(dir.path().join("test.omni")).unwrap();

    assert_eq!(fs.login("admin", "admin123").unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(fs.users[0].last_login, 0);
    assert_eq!(fs.sessions_count(), 0);
  }

  #[test]
  fn failed_delete_keeps_user_and_sessions() {
    let (dir, mut fs) = fresh(&small_config());
    fs.create_user("alice", "pw", Role::Standard).unwrap();
    let session = fs.login("alice", "pw").unwrap();
    std::fs::remove_file(dir.path().join("test.omni")).unwrap();

    assert_eq!(fs.delete_user("alice").unwrap_err().kind(), ErrorKind::Io);

    assert_eq!(fs.list_users(), vec!["admin", "alice"]);
    assert!(fs.session_info(&session).is_some());
  }

  #[test]
  fn role_checks() {
    let (_dir, mut fs) = fresh(&small_config());
    fs.create_user("alice", "pw", Role::Standard).unwrap();
    let admin = fs.login("admin", "admin123").unwrap();
    let alice = fs.login("alice", "pw").unwrap();

    assert!(fs.require_admin(&admin).is_ok());
    assert_eq!(fs.require_admin(&alice).unwrap_err().kind(), ErrorKind::Unauthorized);
    assert_eq!(fs.require_session("bogus").unwrap_err().kind(), ErrorKind::Unauthenticated);
  }
}

// vim:ts=2 sw=2
