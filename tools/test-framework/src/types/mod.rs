/*!
   This module contains definitions of core data structures that are used
   in the test suite.
*/

pub mod binary;
pub mod client;
pub mod config;
pub mod contract;
pub mod env;
pub mod process;
pub mod single;
pub mod wallet;
