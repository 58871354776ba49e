/*!
   Where the chain daemon commands are executed: directly on the host,
   or inside a docker container of a chain image.
*/

use crate::chain::exec::{simple_exec, spawn_logged, ExecOutput};
use crate::error::Error;
use crate::types::process::ChildProcess;

/**
   Decides how a chain daemon command such as `junod` is run.

   With [`ChainRunner::Docker`], every one-shot command runs in a fresh
   `--rm` container that shares the host network and bind mounts the
   chain home directory at the same path. This keeps all paths and
   addresses identical between the two modes, so the rest of the
   framework does not need to know which mode is in use.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainRunner {
    Native,
    Docker { image: String },
}

impl ChainRunner {
    pub fn from_image(image: Option<&String>) -> Self {
        match image {
            Some(image) if !image.is_empty() => Self::Docker {
                image: image.clone(),
            },
            _ => Self::Native,
        }
    }

    /**
       Build the full program and argument list for running `command_path`
       with `args`.
    */
    pub fn command_line(
        &self,
        command_path: &str,
        home_path: &str,
        args: &[&str],
    ) -> (String, Vec<String>) {
        match self {
            Self::Native => (
                command_path.to_string(),
                args.iter().map(|arg| arg.to_string()).collect(),
            ),
            Self::Docker { image } => {
                let mut docker_args = vec![
                    "run".to_string(),
                    "--rm".to_string(),
                    "--network".to_string(),
                    "host".to_string(),
                    "-v".to_string(),
                    format!("{home_path}:{home_path}"),
                    "--entrypoint".to_string(),
                    command_path.to_string(),
                    image.clone(),
                ];

                docker_args.extend(args.iter().map(|arg| arg.to_string()));

                ("docker".to_string(), docker_args)
            }
        }
    }

    pub fn exec(
        &self,
        desc: &str,
        command_path: &str,
        home_path: &str,
        args: &[&str],
    ) -> Result<ExecOutput, Error> {
        let (program, args) = self.command_line(command_path, home_path, args);
        let args: Vec<&str> = args.iter().map(|arg| arg.as_str()).collect();

        simple_exec(desc, &program, &args)
    }

    /**
       Start a long running daemon. In docker mode the container is
       detached and named `container_name`, and the returned
       [`ChildProcess`] removes it when dropped.
    */
    pub fn spawn(
        &self,
        desc: &str,
        command_path: &str,
        home_path: &str,
        container_name: &str,
        args: &[&str],
    ) -> Result<ChildProcess, Error> {
        match self {
            Self::Native => spawn_logged(
                desc,
                command_path,
                args,
                &format!("{home_path}/stdout.log"),
                &format!("{home_path}/stderr.log"),
            ),
            Self::Docker { image } => {
                let volume = format!("{home_path}:{home_path}");

                let mut docker_args = vec![
                    "run",
                    "-d",
                    "--name",
                    container_name,
                    "--network",
                    "host",
                    "-v",
                    &volume,
                    "--entrypoint",
                    command_path,
                    image,
                ];

                docker_args.extend_from_slice(args);

                simple_exec(desc, "docker", &docker_args)?;

                Ok(ChildProcess::new_container(container_name.to_string()))
            }
        }
    }
}
