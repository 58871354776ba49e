//! MockClock lets the coordinator and every simulated chain share a
//! single block time. The time only moves when it is explicitly
//! incremented.

use core::time::Duration;
use cosmwasm_std::Timestamp;
use eyre::eyre;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::util::mutex::MutexUtil;

/// 2020-01-02T10:00:00Z, the genesis time of every simulated chain.
pub const GENESIS_TIME_SECONDS: u64 = 1_577_959_200;

#[derive(Clone, Debug)]
pub struct MockClock {
    timestamp: Arc<Mutex<Timestamp>>,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Timestamp::from_seconds(GENESIS_TIME_SECONDS))
    }
}

impl MockClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            timestamp: Arc::new(Mutex::new(start)),
        }
    }

    pub fn increment(&self, duration: Duration) -> Result<(), Error> {
        let mut locked_timestamp = self.timestamp.acquire_mutex()?;

        let nanos = u64::try_from(duration.as_nanos())
            .ok()
            .and_then(|nanos| locked_timestamp.nanos().checked_add(nanos))
            .ok_or_else(|| {
                Error::generic(eyre!(
                    "overflow when adding {:?} to {}",
                    duration,
                    *locked_timestamp,
                ))
            })?;

        *locked_timestamp = Timestamp::from_nanos(nanos);

        Ok(())
    }

    pub fn now(&self) -> Result<Timestamp, Error> {
        let locked_timestamp = self.timestamp.acquire_mutex()?;

        Ok(*locked_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_time() -> Result<(), Error> {
        let clock = MockClock::default();
        let shared = clock.clone();

        clock.increment(Duration::from_secs(5))?;

        assert_eq!(
            shared.now()?,
            Timestamp::from_seconds(GENESIS_TIME_SECONDS + 5)
        );

        Ok(())
    }

    #[test]
    fn increment_overflow_is_an_error() {
        let clock = MockClock::new(Timestamp::from_nanos(u64::MAX - 1));

        assert!(clock.increment(Duration::from_secs(1)).is_err());
    }
}
