// #![deny(warnings)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![doc = include_str!("../README.md")]

//!
//! ## Overview
//!
//! This crate provides two harnesses for exercising the `cw-ibc-example`
//! counter contract across two chains connected over IBC.
//!
//! The [`sim`] harness runs everything in-process. A
//! [`Coordinator`](sim::coordinator::Coordinator) owns the simulated chains
//! and relays packets between them on request, which makes it possible to
//! step through timeouts and light client expiry deterministically.
//!
//! The rest of the crate bootstraps real chain daemons, natively or in
//! docker containers, and connects them with a `hermes` relayer process.
//!
//! ## Example Test
//!
//! ```rust
//! use cw_ibc_test_framework::prelude::*;
//!
//! pub struct ExampleTest;
//!
//! #[test]
//! pub fn example_test() -> Result<(), Error> {
//!     run_binary_channel_test(&ExampleTest)
//! }
//!
//! impl TestOverrides for ExampleTest {}
//!
//! impl BinaryChannelTest for ExampleTest {
//!     fn run(
//!         &self,
//!         _config: &TestConfig,
//!         _relayer: RelayerDriver,
//!         _chains: ConnectedChains,
//!         _channel: ConnectedChannel,
//!     ) -> Result<(), Error> {
//!         suspend()
//!     }
//! }
//! ```
//!
//! The `example_test` function only picks the kind of test to run. A
//! [`BinaryChannelTest`](framework::binary::channel::BinaryChannelTest)
//! starts two full nodes, deploys the counter contract on both, and opens
//! a `counter-1` channel between the two contract ports before calling
//! `run`. The behavior of the setup is customized by implementing the
//! override methods of [`TestOverrides`](framework::overrides::TestOverrides).
//!
//! Calling [`suspend`] keeps the chains and the relayer running, so that
//! they can be inspected manually. The environment of the test, such as
//! the home directories and RPC addresses of the nodes, is written to
//! `binary-chains.env` and `binary-channels.env` in the test data
//! directory.
//!
//! ## Running Tests
//!
//! ```bash
//! RUST_LOG=info RUST_BACKTRACE=1 \
//!     cargo test -p cw-ibc-integration-test --features interchain -- --test-threads=1
//! ```
//!
//! Take a look at [`TestConfig`](types::config::TestConfig) for the
//! environment variables that select the chain binary, the docker image
//! and the contract wasm.

pub mod bootstrap;
pub mod chain;
pub mod error;
pub mod framework;
pub mod prelude;
pub mod relayer;
pub mod sim;
pub mod types;
pub mod util;

pub use util::suspend::suspend;
