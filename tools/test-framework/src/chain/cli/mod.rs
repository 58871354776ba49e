pub mod bootstrap;
pub mod ibc;
pub mod query;
pub mod wasm;
