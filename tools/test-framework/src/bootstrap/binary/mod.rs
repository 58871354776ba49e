/*!
   Helper functions for bootstrapping two chains connected through the
   relayer.
*/

pub mod chain;
pub mod channel;
