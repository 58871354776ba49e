/*!
   Constructs for spawning and managing full nodes of wasm enabled chains,
   such as `junod` or `wasmd`.

   Almost everything is driven through the chain's command line. The
   [`ChainDriver`](driver::ChainDriver) bundles the information needed to
   run the commands, [`cli`] contains the thin wrappers around each
   command, and the traits in [`ext`] expose them as methods on the driver.
*/

pub mod builder;
pub mod cli;
pub mod config;
pub mod driver;
pub mod exec;
pub mod ext;
pub mod runner;
