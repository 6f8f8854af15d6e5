use omnifs::omnifs::disk::{Role, HEADER_SIZE, METADATA_ENTRY_SIZE, USER_RECORD_SIZE};
use omnifs::omnifs::DirEntry;
use omnifs::{Errno, ErrorKind, FormatConfig, OmniFs};

fn documented_config() -> FormatConfig {
  FormatConfig {
    total_size: 1024 * 1024,
    block_size: 4096,
    max_users: 50,
    metadata_count: 1000,
    ..FormatConfig::default()
  }
}

fn open(config: &FormatConfig) -> (tempfile::TempDir, std::path::PathBuf, OmniFs) {
  let dir = tempfile::tempdir().unwrap();
  let realpath = dir.path().join("store.omni");
  let fs = OmniFs::open_or_format(&realpath, config).unwrap();
  (dir, realpath, fs)
}

#[test]
fn docs_scenario() {
  let (_dir, _realpath, mut fs) = open(&documented_config());

  fs.create_directory("/docs").unwrap();
  fs.create_file("/docs/a.txt", b"hello").unwrap();

  assert_eq!(fs.read_file("/docs/a.txt").unwrap(), b"hello");

  let stats = fs.fs_stats();
  assert_eq!(stats.file_count, 1);
  assert_eq!(stats.directory_count, 1);
  assert_eq!(stats.used_space, 4096);

  assert_eq!(
    fs.list_directory("/docs").unwrap(),
    vec![DirEntry { name: String::from("a.txt"), is_directory: false }]
  );
}

#[test]
fn layout_offsets_follow_the_header() {
  let (_dir, realpath, fs) = open(&documented_config());
  let header = fs.header();

  assert_eq!(std::fs::metadata(&realpath).unwrap().len(), 1024 * 1024);
  assert_eq!(header.user_table_offset as u64, HEADER_SIZE);
  assert_eq!(header.metadata_offset as u64, HEADER_SIZE + 50 * USER_RECORD_SIZE);
  assert_eq!(
    header.data_region_offset(),
    HEADER_SIZE + 50 * USER_RECORD_SIZE + 1000 * METADATA_ENTRY_SIZE
  );
  assert_eq!(header.change_log_offset, 0);
  assert_eq!(header.created_date().len(), 10);
}

#[test]
fn everything_survives_a_restart() {
  let config = documented_config();
  let (_dir, realpath, mut fs) = open(&config);

  fs.create_user("alice", "secret", Role::Standard).unwrap();
  fs.create_directory("/home").unwrap();
  fs.create_directory("/home/alice").unwrap();
  fs.create_file("/home/alice/notes", b"buy milk").unwrap();
  fs.edit_file("/home/alice/notes", b"oat", 4).unwrap();
  fs.create_file("/tmp", b"scratch").unwrap();
  fs.rename("/tmp", "/home/scratch").unwrap();
  let session = fs.login("alice", "secret").unwrap();
  let store_id = fs.header().store_id();
  drop(fs);

  let mut fs = OmniFs::open_or_format(&realpath, &config).unwrap();

  assert_eq!(fs.header().store_id(), store_id);
  assert_eq!(fs.read_file("/home/alice/notes").unwrap(), b"buy oatk");
  assert_eq!(fs.read_file("/home/scratch").unwrap(), b"scratch");
  assert!(fs.resolve("/tmp").is_none());
  assert_eq!(fs.list_users(), vec!["admin", "alice"]);

  // Sessions are not persisted
  assert!(fs.session_info(&session).is_none());
  let session = fs.login("alice", "secret").unwrap();
  assert_eq!(fs.session_info(&session).unwrap().role, Role::Standard);
}

#[test]
fn block_exhaustion() {
  // Room for the tables plus block 0 and three usable blocks
  let base = FormatConfig {
    block_size: 512,
    max_users: 2,
    metadata_count: 16,
    ..FormatConfig::default()
  };
  let total_size = base.tables_size() + 4 * 512;
  let config = FormatConfig { total_size, ..base };
  let (_dir, _realpath, mut fs) = open(&config);

  for name in ["/a", "/b", "/c"] {
    fs.create_file(name, b"x").unwrap();
  }
  let err = fs.create_file("/d", b"x").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Exhausted);
  assert!(fs.resolve("/d").is_none());

  // Directories take no block
  fs.create_directory("/still-fine").unwrap();

  fs.remove_file("/b").unwrap();
  fs.create_file("/d", b"reused").unwrap();
  assert_eq!(fs.read_file("/d").unwrap(), b"reused");
}

#[test]
fn edit_bound_leaves_content() {
  let (_dir, _realpath, mut fs) = open(&documented_config());
  fs.create_file("/f", b"0123456789").unwrap();

  let err = fs.edit_file("/f", b"abcdef", 5).unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidOperation);
  assert_eq!(fs.read_file("/f").unwrap(), b"0123456789");
}

#[test]
fn directory_guard_then_cleanup() {
  let (_dir, _realpath, mut fs) = open(&documented_config());
  fs.create_directory("/a").unwrap();
  fs.create_directory("/a/b").unwrap();

  assert_eq!(fs.remove_directory("/a").unwrap_err().kind(), ErrorKind::InvalidOperation);
  fs.remove_directory("/a/b").unwrap();
  fs.remove_directory("/a").unwrap();
  assert_eq!(fs.fs_stats().directory_count, 0);
}

#[test]
fn custom_admin_from_yaml() {
  let dir = tempfile::tempdir().unwrap();
  let config_path = dir.path().join("omnifs.yaml");
  std::fs::write(
    &config_path,
    "total_size: 512K\nblock_size: 1K\nmax_users: 3\nmetadata_count: 20\nadmin_username: root\nadmin_password: toor\n",
  )
  .unwrap();
  let config = FormatConfig::load(&config_path).unwrap();

  let realpath = dir.path().join("store.omni");
  let mut fs = OmniFs::open_or_format(&realpath, &config).unwrap();

  assert_eq!(fs.header().block_size, 1024);
  assert_eq!(fs.header().config_hash(), config.fingerprint().unwrap());
  assert!(matches!(fs.login("admin", "admin123"), Err(Errno::EAUTH(_))));
  let session = fs.login("root", "toor").unwrap();
  assert!(fs.require_admin(&session).is_ok());
  assert!(matches!(fs.delete_user("root"), Err(Errno::EPERM(_))));
}

#[test]
fn invalid_config_formats_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let realpath = dir.path().join("store.omni");
  let config = FormatConfig {
    total_size: 4096,
    ..FormatConfig::default()
  };

  assert!(matches!(OmniFs::format(&realpath, &config), Err(Errno::EINVAL(_))));
  assert!(!realpath.exists());
}

// vim:ts=2 sw=2
