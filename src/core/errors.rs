/*!
 * Error Types
 * Centralized error handling with thiserror and miette support
 */

use miette::Diagnostic;
use thiserror::Error;

/// Handle lifecycle errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum HandleError {
    #[error("Native identifier is null")]
    #[diagnostic(
        code(handle::invalid_handle),
        help("The native acquire call returned 0, so no resource exists. Check the collaborator's own error reporting for the cause.")
    )]
    InvalidHandle,

    #[error("Handle has already been released")]
    #[diagnostic(
        code(handle::use_after_release),
        help("The resource was closed, or the backup finalizer reclaimed it. This instance is permanently dead; create a new one.")
    )]
    UseAfterRelease,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            HandleError::InvalidHandle.to_string(),
            "Native identifier is null"
        );
        assert_eq!(
            HandleError::UseAfterRelease.to_string(),
            "Handle has already been released"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(HandleError::UseAfterRelease, HandleError::UseAfterRelease);
        assert_ne!(HandleError::InvalidHandle, HandleError::UseAfterRelease);
    }
}
