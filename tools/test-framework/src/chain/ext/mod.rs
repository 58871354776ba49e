pub mod bootstrap;
pub mod ibc;
pub mod wasm;
