/*!
   All test cases are placed within this module.

   The simulated-chain scenarios are always built. The scenarios that
   need real chain binaries and a hermes relayer are gated behind the
   `interchain` feature.
*/

pub mod sim;

#[cfg(any(doc, feature = "interchain"))]
pub mod interchain;
