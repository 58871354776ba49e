use eyre::eyre;
use std::process::{Command, Stdio};
use std::str;
use tracing::{debug, trace};

use crate::error::{handle_exec_error, handle_generic_error, Error};
use crate::types::process::ChildProcess;
use crate::util::file::pipe_to_file;

pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

pub fn simple_exec(desc: &str, command_path: &str, args: &[&str]) -> Result<ExecOutput, Error> {
    debug!(
        "Executing command for {}: {} {}",
        desc,
        command_path,
        itertools::join(args, " ")
    );

    let output = Command::new(command_path)
        .args(args)
        .output()
        .map_err(handle_exec_error(command_path))?;

    if output.status.success() {
        let stdout = str::from_utf8(&output.stdout)
            .map_err(handle_generic_error)?
            .to_string();

        let stderr = str::from_utf8(&output.stderr)
            .map_err(handle_generic_error)?
            .to_string();

        trace!(
            "command executed successfully with stdout: {}, stderr: {}",
            stdout,
            stderr
        );

        Ok(ExecOutput { stdout, stderr })
    } else {
        let message = str::from_utf8(&output.stderr).map_err(handle_generic_error)?;

        Err(Error::generic(eyre!(
            "command exited with error status {:?} and message: {}",
            output.status.code(),
            message
        )))
    }
}

/**
   Spawn a long running command in the background, with its stdout and
   stderr appended to the given log files.
*/
pub fn spawn_logged(
    desc: &str,
    command_path: &str,
    args: &[&str],
    stdout_path: &str,
    stderr_path: &str,
) -> Result<ChildProcess, Error> {
    debug!(
        "Spawning command for {}: {} {}",
        desc,
        command_path,
        itertools::join(args, " ")
    );

    let mut child = Command::new(command_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(handle_exec_error(command_path))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre!("expected stdout to be present in child process"))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| eyre!("expected stderr to be present in child process"))?;

    pipe_to_file(stdout, stdout_path)?;
    pipe_to_file(stderr, stderr_path)?;

    Ok(ChildProcess::new(child))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let output = simple_exec("echo", "echo", &["hello"]).unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn reports_missing_command() {
        let res = simple_exec("missing", "cw-ibc-command-that-does-not-exist", &[]);
        assert!(res.is_err());
    }
}
