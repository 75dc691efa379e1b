use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn echo(program: &str, args: &[String]) {
    println!("{}> {} {}{}", CYAN, program, args.join(" "), RESET);
}

fn to_strings<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .map(|s| s.as_ref().to_string_lossy().into_owned())
        .collect()
}

pub fn run<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = to_strings(args);
    let status = spawn(program, &args)?;

    if !status.success() {
        anyhow::bail!("{} failed with exit code {:?}", program, status.code());
    }

    Ok(())
}

/// Run a command, returning its exit status instead of failing on non-zero exit.
///
/// Failing to spawn the program at all is still an error.
pub fn run_lenient<I, S>(program: &str, args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = to_strings(args);
    spawn(program, &args)
}

fn spawn(program: &str, args: &[String]) -> Result<ExitStatus> {
    echo(program, args);

    Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", program))
}

/// Locate a required external tool on `PATH`
pub fn require_tool(program: &str) -> Result<PathBuf> {
    which::which(program).with_context(|| {
        format!(
            "{} not found in PATH (it is usually shipped in the xdg-utils package)",
            program
        )
    })
}

/// Seam between the installers and the processes they spawn
pub trait CommandRunner {
    /// Run a command whose failure aborts the current operation
    fn run(&self, program: &str, args: &[String]) -> Result<()>;

    /// Run a command whose non-zero exit is tolerated; returns whether it succeeded
    fn run_lenient(&self, program: &str, args: &[String]) -> Result<bool>;
}

/// Runs commands on the host system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        run(program, args)
    }

    fn run_lenient(&self, program: &str, args: &[String]) -> Result<bool> {
        Ok(run_lenient(program, args)?.success())
    }
}
