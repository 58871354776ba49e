/*!
   Utility and helper functions used in the tests.
*/

pub mod assert;
pub mod file;
pub mod mutex;
pub mod random;
pub mod retry;
pub mod suspend;
