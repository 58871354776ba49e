/*!
   Data types for the setup of two chains connected over IBC.
*/

pub mod chains;
pub mod channel;
