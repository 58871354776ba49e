/*!
   An in-process harness running contracts on simulated chains.

   A [`Coordinator`](coordinator::Coordinator) creates a number of
   [`SimChain`](chain::SimChain)s sharing one [`MockClock`](clock::MockClock)
   and acts as the relayer between them. Test code stores and
   instantiates contracts on the chains, signs transactions with
   [`Account`](account::Account)s, and drives packet relay explicitly
   through the coordinator. Time only advances when transactions are
   committed or when the test moves the clock.
*/

pub mod account;
pub mod chain;
pub mod clock;
pub mod contract;
pub mod coordinator;
pub mod helpers;
pub mod ibc;
pub mod path;
pub mod storage;
pub mod wasm_msg;
