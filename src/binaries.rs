use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;

use omnifs::config::FormatConfig;
use omnifs::omnifs::disk::Role;
use omnifs::omnifs::fs::{FileMode, FileStat};
use omnifs::omnifs::kernel::{Errno, OmniFs};
use omnifs::omnifs::users::SessionInfo;
use omnifs::util::human_time;

pub type Args = Vec<String>;
pub type ExitCode = i32;

pub const EXIT_ENOENT: ExitCode = 127;
pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;

pub const USAGE: &[&str] = &[
  "login USERNAME PASSWORD",
  "logout",
  "whoami",
  "ls [-l] [PATH]",
  "cat PATH...",
  "stat PATH",
  "mkdir PATH",
  "rmdir PATH",
  "write PATH [TEXT...]",
  "edit PATH OFFSET TEXT...",
  "truncate PATH",
  "rm PATH",
  "mv SOURCE TARGET",
  "chmod OCTAL_MODE PATH",
  "df [--yaml]",
  "users",
  "useradd [--admin] USERNAME PASSWORD",
  "userdel USERNAME",
  "format --yes",
  "help",
  "exit",
];

/// Everything a command needs: the loaded store, where it lives, the
/// parameters `format` uses, and the session of whoever is logged in.
#[derive(Debug)]
pub struct Shell {
  pub fs: OmniFs,
  pub realpath: PathBuf,
  pub config: FormatConfig,
  pub session: Option<String>,
}

impl Shell {
  pub fn new(fs: OmniFs, realpath: PathBuf, config: FormatConfig) -> Self {
    Self {
      fs,
      realpath,
      config,
      session: None,
    }
  }

  /// The current session, or a diagnostic on behalf of `command`.
  fn session(&self, command: &str) -> Option<SessionInfo> {
    let session_id = match &self.session {
      Some(session_id) => session_id,
      None => {
        println!("{command}: not logged in");
        return None;
      }
    };
    match self.fs.require_session(session_id) {
      Ok(info) => Some(info),
      Err(errno) => {
        println!("{command}: {errno}");
        None
      }
    }
  }

  fn admin(&self, command: &str) -> Option<SessionInfo> {
    let info = self.session(command)?;
    if !info.is_admin() {
      println!("{command}: permission denied: administrator role required");
      return None;
    }
    Some(info)
  }
}

/// Diagnostics common to every command; missing things map to 127.
fn report(command: &str, errno: Errno) -> ExitCode {
  match errno {
    Errno::ENOENT(pathname) => {
      println!("{command}: {pathname}: No such file or directory");
      EXIT_ENOENT
    }
    Errno::EISDIR(pathname) => {
      println!("{command}: {pathname}: Is a directory");
      EXIT_FAILURE
    }
    Errno::ENOTDIR(pathname) => {
      println!("{command}: {pathname}: Not a directory");
      EXIT_FAILURE
    }
    Errno::ENOTEMPTY(pathname) => {
      println!("{command}: {pathname}: Directory not empty");
      EXIT_FAILURE
    }
    errno => {
      println!("{command}: {errno}");
      EXIT_FAILURE
    }
  }
}

/// Run one command line. `args[0]` is the command name.
pub fn run(args: Args, shell: &mut Shell) -> ExitCode {
  let command = match args.first() {
    Some(command) => command.clone(),
    None => return EXIT_SUCCESS,
  };

  match command.as_str() {
    "login" => login(args, shell),
    "logout" => logout(args, shell),
    "whoami" => whoami(args, shell),
    "ls" => ls(args, shell),
    "cat" => cat(args, shell),
    "stat" => stat(args, shell),
    "mkdir" => mkdir(args, shell),
    "rmdir" => rmdir(args, shell),
    "write" => write(args, shell),
    "edit" => edit(args, shell),
    "truncate" => truncate(args, shell),
    "rm" => rm(args, shell),
    "mv" => mv(args, shell),
    "chmod" => chmod(args, shell),
    "df" => df(args, shell),
    "users" => users(args, shell),
    "useradd" => useradd(args, shell),
    "userdel" => userdel(args, shell),
    "format" => format(args, shell),
    "help" => help(args, shell),
    "exit" => EXIT_SUCCESS,
    _ => {
      println!("omnifs: {command}: command not found");
      EXIT_ENOENT
    }
  }
}

// Sessions and users

pub fn login(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    username: String,
    password: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("login: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { username, password }) => match shell.fs.login(&username, &password) {
      Ok(session_id) => {
        if let Some(previous) = shell.session.replace(session_id) {
          shell.fs.logout(&previous);
        }
        EXIT_SUCCESS
      }
      Err(errno) => report("login", errno),
    },
  }
}

pub fn logout(_args: Args, shell: &mut Shell) -> ExitCode {
  match shell.session.take() {
    Some(session_id) => {
      shell.fs.logout(&session_id);
      EXIT_SUCCESS
    }
    None => {
      println!("logout: not logged in");
      EXIT_FAILURE
    }
  }
}

pub fn whoami(_args: Args, shell: &mut Shell) -> ExitCode {
  match shell.session("whoami") {
    Some(SessionInfo { username, role }) => {
      let role = match role {
        Role::Admin => "admin",
        Role::Standard => "user",
      };
      println!("{username} ({role})");
      EXIT_SUCCESS
    }
    None => EXIT_FAILURE,
  }
}

pub fn users(_args: Args, shell: &mut Shell) -> ExitCode {
  if shell.admin("users").is_none() {
    return EXIT_FAILURE;
  }
  for username in shell.fs.list_users() {
    println!("{username}");
  }
  EXIT_SUCCESS
}

pub fn useradd(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    #[clap(short, long)]
    admin: bool,
    username: String,
    password: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("useradd: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { admin, username, password }) => {
      if shell.admin("useradd").is_none() {
        return EXIT_FAILURE;
      }
      let role = if admin { Role::Admin } else { Role::Standard };
      match shell.fs.create_user(&username, &password, role) {
        Ok(_) => EXIT_SUCCESS,
        Err(Errno::EEXIST(username)) => {
          println!("useradd: user '{username}' already exists");
          EXIT_FAILURE
        }
        Err(errno) => report("useradd", errno),
      }
    }
  }
}

pub fn userdel(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    username: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("userdel: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { username }) => {
      if shell.admin("userdel").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.delete_user(&username) {
        Ok(_) => {
          // Our own session may have gone with the user
          let stale = shell
            .session
            .as_deref()
            .map_or(false, |session_id| shell.fs.session_info(session_id).is_none());
          if stale {
            shell.session = None;
          }
          EXIT_SUCCESS
        }
        Err(errno) => report("userdel", errno),
      }
    }
  }
}

// FS reading stuff

pub fn ls(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    #[clap(short, long)]
    long: bool,
    #[clap(default_value = "/")]
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("ls: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { long, pathname }) => {
      if shell.session("ls").is_none() {
        return EXIT_FAILURE;
      }
      let listing = match shell.fs.list_directory(&pathname) {
        Ok(listing) => listing,
        Err(errno) => return report("ls", errno),
      };

      if !long {
        let names = listing
          .iter()
          .map(|entry| if entry.is_directory { format!("{}/", entry.name) } else { entry.name.clone() })
          .join("  ");
        if !names.is_empty() {
          println!("{names}");
        }
        return EXIT_SUCCESS;
      }

      for entry in listing {
        let child_pathname = format!("{pathname}/{}", entry.name);
        match shell.fs.stat(&child_pathname) {
          Ok(FileStat { is_directory, size, owner_id, permissions, modified_time, name, .. }) => {
            let file_type = if is_directory { 'd' } else { '-' };
            let modified = human_time(modified_time);
            println!("{file_type}{permissions}\t{owner_id}\t{size}\t{modified}\t{name}");
          }
          Err(errno) => return report("ls", errno),
        }
      }
      EXIT_SUCCESS
    }
  }
}

pub fn cat(args: Args, shell: &mut Shell) -> ExitCode {
  if args[1..].is_empty() {
    println!("cat: no files to concatenate");
    return EXIT_FAILURE;
  }
  if shell.session("cat").is_none() {
    return EXIT_FAILURE;
  }

  let mut concatenated_bytes = Vec::new();

  for pathname in &args[1..] {
    match shell.fs.read_file(pathname) {
      Ok(mut bytes) => concatenated_bytes.append(&mut bytes),
      Err(errno) => return report("cat", errno),
    }
  }

  let mut stdout = std::io::stdout();
  let written = stdout
    .write_all(&concatenated_bytes)
    .and_then(|_| {
      if concatenated_bytes.last().map_or(false, |&byte| byte != b'\n') {
        stdout.write_all(b"\n")
      } else {
        Ok(())
      }
    })
    .and_then(|_| stdout.flush());

  match written {
    Ok(_) => EXIT_SUCCESS,
    Err(err) => {
      println!("cat: can't write output: {err}");
      EXIT_FAILURE
    }
  }
}

pub fn stat(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("stat: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname }) => {
      if shell.session("stat").is_none() {
        return EXIT_FAILURE;
      }
      let FileStat {
        index,
        name,
        is_directory,
        size,
        owner_id,
        permissions,
        created_time,
        modified_time,
      } = match shell.fs.stat(&pathname) {
        Ok(stat) => stat,
        Err(errno) => return report("stat", errno),
      };

      let file_type = if is_directory { "directory" } else { "regular file" };
      let FileMode(mode) = permissions;
      println!("  File: {pathname} ({name})");
      println!("  Size: {size}\tEntry: {index}\t{file_type}");
      println!("Access: ({mode:04o}/{permissions})\tOwner: {owner_id}");
      println!("Modify: {}", human_time(modified_time));
      println!(" Birth: {}", human_time(created_time));
      EXIT_SUCCESS
    }
  }
}

pub fn df(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    #[clap(short, long)]
    yaml: bool,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("df: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { yaml }) => {
      if shell.session("df").is_none() {
        return EXIT_FAILURE;
      }
      let stats = shell.fs.fs_stats();

      if yaml {
        return match serde_yaml::to_string(&stats) {
          Ok(text) => {
            print!("{text}");
            EXIT_SUCCESS
          }
          Err(err) => {
            println!("df: can't serialize: {err}");
            EXIT_FAILURE
          }
        };
      }

      let header = shell.fs.header();
      println!("Store: {}\tCreated: {}", header.store_id(), header.created_date());
      println!("Size\tUsed\tAvail\tFiles\tDirs");
      println!(
        "{}\t{}\t{}\t{}\t{}",
        stats.total_size, stats.used_space, stats.free_space, stats.file_count, stats.directory_count
      );
      EXIT_SUCCESS
    }
  }
}

// FS writing stuff

pub fn mkdir(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("mkdir: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname }) => {
      if shell.session("mkdir").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.create_directory(&pathname) {
        Ok(_) => EXIT_SUCCESS,
        Err(Errno::EEXIST(_)) => {
          println!("mkdir: cannot create directory '{pathname}': File exists");
          EXIT_FAILURE
        }
        Err(errno) => report("mkdir", errno),
      }
    }
  }
}

pub fn rmdir(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("rmdir: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname }) => {
      if shell.session("rmdir").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.remove_directory(&pathname) {
        Ok(_) => EXIT_SUCCESS,
        Err(errno) => report("rmdir", errno),
      }
    }
  }
}

pub fn write(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
    text: Vec<String>,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("write: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname, text }) => {
      if shell.session("write").is_none() {
        return EXIT_FAILURE;
      }
      let text = text.iter().join(" ");
      match shell.fs.create_file(&pathname, text.as_bytes()) {
        Ok(_) => EXIT_SUCCESS,
        Err(Errno::EEXIST(_)) => {
          println!("write: {pathname}: File exists");
          EXIT_FAILURE
        }
        Err(Errno::EFBIG(message)) => {
          println!("write: {message}");
          EXIT_FAILURE
        }
        Err(errno) => report("write", errno),
      }
    }
  }
}

pub fn edit(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
    offset: u64,
    #[clap(required = true)]
    text: Vec<String>,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("edit: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname, offset, text }) => {
      if shell.session("edit").is_none() {
        return EXIT_FAILURE;
      }
      let text = text.iter().join(" ");
      match shell.fs.edit_file(&pathname, text.as_bytes(), offset) {
        Ok(_) => EXIT_SUCCESS,
        Err(errno) => report("edit", errno),
      }
    }
  }
}

pub fn truncate(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("truncate: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname }) => {
      if shell.session("truncate").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.truncate_file(&pathname) {
        Ok(_) => EXIT_SUCCESS,
        Err(errno) => report("truncate", errno),
      }
    }
  }
}

pub fn rm(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("rm: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { pathname }) => {
      if shell.session("rm").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.remove_file(&pathname) {
        Ok(_) => EXIT_SUCCESS,
        Err(Errno::EISDIR(_)) => {
          println!("rm: cannot remove '{pathname}': Is a directory");
          EXIT_FAILURE
        }
        Err(errno) => report("rm", errno),
      }
    }
  }
}

pub fn mv(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    source_pathname: String,
    target_pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("mv: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { source_pathname, target_pathname }) => {
      if shell.session("mv").is_none() {
        return EXIT_FAILURE;
      }
      match shell.fs.rename(&source_pathname, &target_pathname) {
        Ok(_) => EXIT_SUCCESS,
        Err(errno) => report("mv", errno),
      }
    }
  }
}

pub fn chmod(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    mode: String,
    pathname: String,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("chmod: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(BinArgs { mode, pathname }) => {
      if shell.session("chmod").is_none() {
        return EXIT_FAILURE;
      }
      let permissions = match u32::from_str_radix(&mode, 8) {
        Ok(permissions) if permissions <= 0o777 => permissions,
        _ => {
          println!("chmod: invalid mode: '{mode}'");
          return EXIT_FAILURE;
        }
      };
      match shell.fs.set_permissions(&pathname, permissions) {
        Ok(_) => EXIT_SUCCESS,
        Err(errno) => report("chmod", errno),
      }
    }
  }
}

pub fn format(args: Args, shell: &mut Shell) -> ExitCode {
  #[derive(Debug, Parser)]
  struct BinArgs {
    /// Confirm wiping the store
    #[clap(short, long)]
    yes: bool,
  }

  match BinArgs::try_parse_from(args.iter()) {
    Err(message) => {
      println!("format: invalid arguments: {message}");
      EXIT_FAILURE
    }
    Ok(_) if shell.admin("format").is_none() => EXIT_FAILURE,
    Ok(BinArgs { yes: false }) => {
      println!("format: this erases {}, pass --yes to proceed", shell.realpath.display());
      EXIT_FAILURE
    }
    Ok(BinArgs { yes: true }) => {
      let reloaded = OmniFs::format(&shell.realpath, &shell.config)
        .and_then(|_| OmniFs::init(&shell.realpath));
      match reloaded {
        Ok(fs) => {
          shell.fs = fs;
          shell.session = None;
          println!("format: {} formatted, store id {}", shell.realpath.display(), shell.fs.header().store_id());
          EXIT_SUCCESS
        }
        Err(errno) => report("format", errno),
      }
    }
  }
}

pub fn help(_args: Args, _shell: &mut Shell) -> ExitCode {
  println!("Commands:");
  for usage in USAGE {
    println!("  {usage}");
  }
  EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(line: &str) -> Args {
    line.split_whitespace().map(String::from).collect()
  }

  fn shell() -> (tempfile::TempDir, Shell) {
    let dir = tempfile::tempdir().unwrap();
    let realpath = dir.path().join("shell.omni");
    let config = FormatConfig {
      total_size: 256 * 1024,
      block_size: 512,
      max_users: 4,
      metadata_count: 16,
      ..FormatConfig::default()
    };
    let fs = OmniFs::open_or_format(&realpath, &config).unwrap();
    (dir, Shell::new(fs, realpath, config))
  }

  #[test]
  fn commands_need_a_session() {
    let (_dir, mut shell) = shell();
    assert_eq!(run(args("mkdir /d"), &mut shell), EXIT_FAILURE);
    assert!(!shell.fs.path_is_directory("/d"));

    assert_eq!(run(args("login admin admin123"), &mut shell), EXIT_SUCCESS);
    assert_eq!(run(args("mkdir /d"), &mut shell), EXIT_SUCCESS);
    assert!(shell.fs.path_is_directory("/d"));
  }

  #[test]
  fn unknown_command_and_missing_path() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);

    assert_eq!(run(args("frobnicate"), &mut shell), EXIT_ENOENT);
    assert_eq!(run(args("cat /missing"), &mut shell), EXIT_ENOENT);
    assert_eq!(run(args("mkdir"), &mut shell), EXIT_FAILURE);
  }

  #[test]
  fn write_joins_words() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);

    assert_eq!(run(args("write /f hello big world"), &mut shell), EXIT_SUCCESS);
    assert_eq!(shell.fs.read_file("/f").unwrap(), b"hello big world");

    assert_eq!(run(args("edit /f 6 BIG"), &mut shell), EXIT_SUCCESS);
    assert_eq!(shell.fs.read_file("/f").unwrap(), b"hello BIG world");
  }

  #[test]
  fn chmod_parses_octal() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);
    run(args("write /f x"), &mut shell);

    assert_eq!(run(args("chmod 600 /f"), &mut shell), EXIT_SUCCESS);
    assert_eq!(shell.fs.stat("/f").unwrap().permissions, FileMode(0o600));
    assert_eq!(run(args("chmod 999 /f"), &mut shell), EXIT_FAILURE);
  }

  #[test]
  fn user_management_is_admin_only() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);
    assert_eq!(run(args("useradd alice pw"), &mut shell), EXIT_SUCCESS);

    run(args("login alice pw"), &mut shell);
    assert_eq!(shell.fs.sessions_count(), 1);
    assert_eq!(run(args("useradd bob pw"), &mut shell), EXIT_FAILURE);
    assert_eq!(run(args("users"), &mut shell), EXIT_FAILURE);
    assert_eq!(run(args("whoami"), &mut shell), EXIT_SUCCESS);

    run(args("login admin admin123"), &mut shell);
    assert_eq!(run(args("userdel alice"), &mut shell), EXIT_SUCCESS);
    assert_eq!(shell.fs.list_users(), vec!["admin"]);
  }

  #[test]
  fn logout_forgets_session() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);

    assert_eq!(run(args("logout"), &mut shell), EXIT_SUCCESS);
    assert_eq!(shell.session, None);
    assert_eq!(shell.fs.sessions_count(), 0);
    assert_eq!(run(args("logout"), &mut shell), EXIT_FAILURE);
  }

  #[test]
  fn format_needs_confirmation() {
    let (_dir, mut shell) = shell();
    run(args("login admin admin123"), &mut shell);
    run(args("mkdir /d"), &mut shell);

    assert_eq!(run(args("format"), &mut shell), EXIT_FAILURE);
    assert!(shell.fs.path_is_directory("/d"));

    assert_eq!(run(args("format --yes"), &mut shell), EXIT_SUCCESS);
    assert!(!shell.fs.path_is_directory("/d"));
    assert_eq!(shell.session, None);
  }

  #[test]
  fn format_is_admin_only() {
    let (_dir, mut shell) = shell();
    assert_eq!(run(args("format --yes"), &mut shell), EXIT_FAILURE);

    run(args("login admin admin123"), &mut shell);
    run(args("useradd alice pw"), &mut shell);
    run(args("mkdir /d"), &mut shell);
    run(args("login alice pw"), &mut shell);

    assert_eq!(run(args("format --yes"), &mut shell), EXIT_FAILURE);
    assert!(shell.fs.path_is_directory("/d"));
    assert_eq!(shell.fs.list_users(), vec!["admin", "alice"]);
  }
}

// vim:ts=2 sw=2
