/*!
   Utilities for retrying test operations.
*/

use core::time::Duration;
use eyre::eyre;
use std::thread::sleep;
use tracing::trace;

use crate::error::Error;

/**
   A simplified version of retry logic used for testing.
   We do not need complicated retry logic as we need this
   only to test eventual consistency which should reach
   within a few seconds.
*/
pub fn assert_eventually_succeed<R>(
    task_name: &str,
    attempts: u16,
    interval: Duration,
    task: impl Fn() -> Result<R, Error>,
) -> Result<R, Error> {
    sleep(interval);
    for _ in 0..attempts {
        match task() {
            Ok(res) => return Ok(res),
            Err(e) => {
                trace!("retrying task that failed with error: {}", e);
                sleep(interval)
            }
        }
    }

    Err(Error::generic(eyre!(
        "Expected task to eventually succeeed, but failed after {} attempts: {}",
        attempts,
        task_name
    )))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn retries_until_success() {
        let calls = Cell::new(0);

        let res = assert_eventually_succeed("third time lucky", 5, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Error::assertion("not yet".to_string()))
            } else {
                Ok(calls.get())
            }
        })
        .unwrap();

        assert_eq!(res, 3);
    }

    #[test]
    fn gives_up_after_attempts() {
        let calls = Cell::new(0);

        let res = assert_eventually_succeed("never", 4, Duration::ZERO, || -> Result<(), _> {
            calls.set(calls.get() + 1);
            Err(Error::assertion("nope".to_string()))
        });

        assert!(res.is_err());
        assert_eq!(calls.get(), 4);
    }
}
