/*!
   Run N-ary test cases that involve two chains connected through the
   relayer.
*/

pub mod chain;
pub mod channel;
pub mod node;
