/*!
   Define wrapper type around [`std::process::Child`] to kill the
   child process when the value is dropped.
*/

use eyre::eyre;
use std::process::{Child, Command};
use tracing::debug;

use crate::error::Error;

/**
   A lightweight wrapper around [`std::process::Child`] to ensure that the
   process is killed when the handle is dropped.

   A daemon running inside a docker container is tracked by its container
   name instead, and the container is removed when dropped.
*/
pub struct ChildProcess {
    child: Option<Child>,
    container: Option<String>,
    waited: bool,
}

impl ChildProcess {
    /// Create a new [`ChildProcess`].
    pub fn new(child: Child) -> Self {
        Self {
            child: Some(child),
            container: None,
            waited: false,
        }
    }

    /// Track a detached docker container with the given name.
    pub fn new_container(container: String) -> Self {
        Self {
            child: None,
            container: Some(container),
            waited: false,
        }
    }

    /// Kill the underlying process or remove the container.
    pub fn kill(&mut self) -> Result<(), Error> {
        if self.waited {
            return Ok(());
        }

        if let Some(child) = &mut self.child {
            if child.try_wait()?.is_none() {
                child.kill()?;
            }
            child.wait()?;
        }

        if let Some(container) = &self.container {
            debug!("removing docker container {}", container);

            let status = Command::new("docker")
                .args(["rm", "-f", container])
                .output()?
                .status;

            if !status.success() {
                return Err(Error::generic(eyre!(
                    "failed to remove docker container {}",
                    container
                )));
            }
        }

        self.waited = true;

        Ok(())
    }

    /// Returns `true` if the process has not exited or been killed.
    pub fn is_running(&mut self) -> bool {
        if self.waited {
            return false;
        }

        match &mut self.child {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => true,
        }
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if let Err(e) = self.kill() {
            debug!("failed to stop child process: {}", e);
        }
    }
}
