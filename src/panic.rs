// Panic recovery at the API boundary.

use std::backtrace::Backtrace;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::ConvertError;

/// Run `f`, turning a panic into [`ConvertError::Panic`].
///
/// The backtrace is captured where the panic is caught, so it shows the
/// recovery point rather than the faulting frame; the message carries the
/// original panic payload.
pub(crate) fn recover<T, F>(f: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> Result<T, ConvertError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            crate::log::error!(message = %message, "recovered from panic");
            Err(ConvertError::Panic {
                message,
                backtrace: Backtrace::force_capture().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_results_through() {
        assert_eq!(recover(|| Ok::<_, ConvertError>(3)).ok(), Some(3));
    }

    #[test]
    fn test_catches_panic() {
        let err = recover::<(), _>(|| panic!("boom")).unwrap_err();
        match err {
            ConvertError::Panic { message, .. } => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_format() {
        let err = recover::<(), _>(|| panic!("bad {}", 1)).unwrap_err();
        assert!(err.to_string().starts_with("PANIC RECOVERED: bad 1\n"));
    }
}
