/*!
   Scenarios run against real chain daemons connected by a hermes
   relayer. They take minutes each, and should be run one at a time
   with `--test-threads=1`.
*/

pub mod can_count;
pub mod channel_discovery;
pub mod light_client_expiry;
