/*!
   Functions for suspending the test, so that the spawned chains and
   relayer can be inspected manually.
*/

use core::time::Duration;
use std::thread::sleep;
use tracing::{error, warn};

use crate::error::Error;

/**
   Call this function in the middle of a test to suspend the test
   indefinitely.
*/
pub fn suspend<R>() -> R {
    warn!("suspending the test indefinitely. you can still interact with any spawned chains and relayers");

    loop {
        sleep(Duration::from_secs(999_999_999))
    }
}

/**
   Suspends the test on failure if `hang_on_fail` is set, so that the
   chains and relayer spawned by the test stay alive for inspection.
*/
pub fn hang_on_error<R>(
    hang_on_fail: bool,
    cont: impl FnOnce() -> Result<R, Error>,
) -> Result<R, Error> {
    let result = cont();

    match result {
        Err(e) if hang_on_fail => {
            error!("test failure occured with HANG_ON_FAIL=1, suspending the test to allow debugging: {:?}",
                e);

            suspend()
        }
        Err(e) => {
            error!("test failure occured. set HANG_ON_FAIL=1 to suspend the test on failure for debugging: {}",
                e);

            Err(e)
        }
        _ => result,
    }
}
