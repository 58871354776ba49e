use core::fmt::Debug;

use crate::error::Error;

pub fn assert_eq<T: Eq + Debug>(message: &str, left: &T, right: &T) -> Result<(), Error> {
    if left == right {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "expect left ({:?}) to be equal to right ({:?}): {}",
            left, right, message
        )))
    }
}

pub fn assert_not_eq<T: Eq + Debug>(message: &str, left: &T, right: &T) -> Result<(), Error> {
    if left != right {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "expect left ({:?}) to be not equal to right ({:?}): {}",
            left, right, message
        )))
    }
}

pub fn assert_err<T: Debug, E: Debug>(message: &str, result: Result<T, E>) -> Result<(), Error> {
    if result.is_err() {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "expect result ({:?}) to be an error: {}",
            result, message
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertions_report_message() {
        assert!(assert_eq("same", &1, &1).is_ok());

        let err = assert_eq("count after relay", &1, &2).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("count after relay"), "{message}");

        assert!(assert_not_eq("different", &1, &2).is_ok());
        assert!(assert_err::<(), _>("fails", Err("boom")).is_ok());
        assert!(assert_err::<_, ()>("succeeds", Ok(1)).is_err());
    }
}
