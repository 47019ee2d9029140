// dmesg-recent - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing (usage errors exit 1, help exits 0)
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. One filter run over stdin/stdout, mapped to the exit code
//
// Usage: dmesg | dmesg-recent [-l|-s] <stampfile>

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dmesg_recent::app::run::{self, RunOptions};
use dmesg_recent::core::model::{ContinuationMode, Status};
use dmesg_recent::platform::config::{self, PlatformPaths};
use dmesg_recent::util::error::DmesgRecentError;
use dmesg_recent::util::{constants, logging};
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// dmesg-recent - print only the kernel log lines added since the last run.
///
/// Reads `dmesg` output on stdin and copies every message whose timestamp is
/// newer than the one recorded in STAMPFILE, then records the newest
/// timestamp seen. Do not run two instances against the same stamp file at
/// once.
#[derive(Parser, Debug)]
#[command(
    name = "dmesg-recent",
    version,
    about,
    args_override_self = true,
    override_usage = "dmesg | dmesg-recent [-l|-s] [-d] [-c <CONFIG>] <STAMPFILE>"
)]
struct Cli {
    /// File recording the timestamp of the last emitted message.
    ///
    /// Collected as a list so that `-h` anywhere on the line wins over a
    /// wrong argument count; exactly one is enforced after parsing.
    #[arg(value_name = "STAMPFILE")]
    stampfile: Vec<PathBuf>,

    /// Treat every line without a leading [timestamp] as a continuation.
    #[arg(short = 'l', long = "multiline", overrides_with = "strict")]
    multiline: bool,

    /// Only lines starting with whitespace are continuations (default).
    #[arg(short = 's', long = "strict", overrides_with = "multiline")]
    strict: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// Continuation mode from the flags, falling back to the config default.
    fn mode(&self, config_multiline: bool) -> ContinuationMode {
        if self.multiline {
            ContinuationMode::Multiline
        } else if self.strict {
            ContinuationMode::Strict
        } else {
            ContinuationMode::from_multiline(config_multiline)
        }
    }

    /// The single stamp file argument, or a usage message.
    fn stamp_path(&self) -> Result<&Path, String> {
        match self.stampfile.as_slice() {
            [path] => Ok(path.as_path()),
            [] => Err("missing <stampfile> argument".to_string()),
            many => Err(format!(
                "expected exactly one <stampfile> argument, got {}",
                many.len()
            )),
        }
    }
}

/// True if `-h`/`--help` appears before any `--`, including inside a
/// cluster of short flags such as `-lh`.
fn help_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .skip(1)
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .take_while(|arg| arg != "--")
        .any(|arg| {
            arg == "--help"
                || (arg.len() > 1
                    && arg.starts_with('-')
                    && !arg.starts_with("--")
                    && arg[1..].chars().all(|c| SHORT_FLAGS.contains(c))
                    && arg.contains('h'))
        })
}

/// Short flags that take no value and may be clustered.
const SHORT_FLAGS: &str = "lsdhV";

/// One-line reason from a rendered clap error, without the usage block.
fn clap_reason(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let reason = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let reason = reason.trim_start_matches("error: ");
    if reason.is_empty() {
        "invalid arguments".to_string()
    } else {
        reason.to_string()
    }
}

/// Name this process was invoked as, for diagnostic prefixes.
fn invocation_name() -> String {
    std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| constants::APP_NAME.to_string())
}

fn usage_error(prog: &str, reason: &str) -> ExitCode {
    eprintln!("{prog}: {reason}");
    eprintln!("Usage: dmesg | {prog} [-l|-s] <stampfile>");
    Status::Recoverable.into()
}

fn main() -> ExitCode {
    let prog = invocation_name();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) if help_requested(std::env::args_os()) => {
            let _ = Cli::command().print_help();
            return ExitCode::SUCCESS;
        }
        Err(e) => return usage_error(&prog, &clap_reason(&e)),
    };
    let stamp_path = match cli.stamp_path() {
        Ok(path) => path.to_path_buf(),
        Err(reason) => return usage_error(&prog, &reason),
    };

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    logging::init(cli.debug, app_config.log_level.as_deref());

    let report = |err: &DmesgRecentError| eprintln!("{prog}: {err}");
    let mut status = Status::Success;
    for warning in config_warnings {
        let err = DmesgRecentError::from(warning);
        tracing::debug!(error = %err, "Config warning");
        status.worsen(err.status());
        report(&err);
    }

    let options = RunOptions {
        stamp_path,
        mode: cli.mode(app_config.multiline),
        temp_suffix: app_config.temp_suffix.clone(),
    };
    tracing::debug!(
        stamp = %options.stamp_path.display(),
        mode = ?options.mode,
        config = %config_path.display(),
        "Starting run"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    let outcome = run::run(&options, stdin.lock(), &mut output, report);

    status.merge(outcome.status).into()
}
