/*!
   Imperative setup of the dockerized harness: spawning a single full
   node, then connecting two of them with clients, a connection and a
   channel between two counter contracts.

   The [`framework`](crate::framework) wrappers call these functions for
   the test author. They stay public so that a test can drive the setup
   step by step when it needs to.
*/

pub mod binary;
pub mod init;
pub mod single;
