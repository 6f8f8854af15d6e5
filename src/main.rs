mod binaries;

use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use binaries::{Shell, EXIT_FAILURE, EXIT_SUCCESS};
use omnifs::config::FormatConfig;
use omnifs::omnifs::kernel::OmniFs;

/// Multi-user filesystem kept inside a single store file
#[derive(Debug, Parser)]
#[clap(name = "omnifs", version, setting = clap::AppSettings::TrailingVarArg)]
struct Cli {
  /// Store file, formatted on first use
  #[clap(short, long, default_value = "omnifs.omni")]
  store: PathBuf,

  /// YAML file with the format parameters
  #[clap(short, long)]
  config: Option<PathBuf>,

  /// Log in as this user before running anything
  #[clap(short, long, requires = "password")]
  user: Option<String>,

  #[clap(short, long, requires = "user")]
  password: Option<String>,

  /// Run a single command instead of the interactive shell
  command: Vec<String>,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn repl(shell: &mut Shell) {
  let mut command = String::new();
  loop {
    command.clear();
    print!("omnifs# ");
    if stdout().flush().is_err() {
      break;
    }
    match stdin().read_line(&mut command) {
      Ok(0) | Err(_) => break,
      Ok(_) => {}
    }

    let args = command
      .split_whitespace()
      .map(String::from)
      .collect::<Vec<String>>();

    if args.is_empty() {
      continue;
    }
    if args[0] == "exit" {
      break;
    }
    binaries::run(args, shell);
  }
}

pub fn main() {
  init_tracing();
  let cli = Cli::parse();

  let config = match &cli.config {
    Some(config_path) => match FormatConfig::load(config_path) {
      Ok(config) => config,
      Err(errno) => {
        eprintln!("omnifs: {}: {errno}", config_path.display());
        std::process::exit(EXIT_FAILURE);
      }
    },
    None => FormatConfig::default(),
  };

  // Without a store there is nothing to serve
  let fs = match OmniFs::open_or_format(&cli.store, &config) {
    Ok(fs) => fs,
    Err(errno) => {
      eprintln!("omnifs: can't open {}: {errno}", cli.store.display());
      std::process::exit(EXIT_FAILURE);
    }
  };

  let mut shell = Shell::new(fs, cli.store, config);

  if let (Some(username), Some(password)) = (cli.user, cli.password) {
    let status = binaries::run(vec![String::from("login"), username, password], &mut shell);
    if status != EXIT_SUCCESS {
      std::process::exit(status);
    }
  }

  if cli.command.is_empty() {
    repl(&mut shell);
  } else {
    std::process::exit(binaries::run(cli.command, &mut shell));
  }
}

// vim:ts=2 sw=2
