use cw_storage_plus::Map;

/// Packets received, keyed by the local channel they arrived on.
pub const CONNECTION_COUNTS: Map<String, u32> = Map::new("connection_counts");

/// Packets that timed out, keyed by the local channel they were sent from.
pub const TIMEOUT_COUNTS: Map<String, u32> = Map::new("timeout_count");
