/*!
   Constructs for driving the `hermes` relayer binary.

   The relayer runs as an external process configured through a TOML file
   written by [`config`]. One-shot commands such as creating clients or
   channels are run with `--json` so that their results can be parsed, and
   the long running `start` command is held in a
   [`ChildProcess`](crate::types::process::ChildProcess) by the
   [`RelayerDriver`](driver::RelayerDriver).
*/

pub mod config;
pub mod driver;
