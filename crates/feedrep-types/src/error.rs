//! Error types and handling for feedrep
//!
//! Every failure in a replication run is fatal for that run: the process exits
//! and the orchestration layer decides whether to retry. The severity and
//! recoverability accessors exist so that layer can make that decision.

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - operation can continue
    Low,
    /// Medium severity - operation may succeed when re-run
    Medium,
    /// High severity - operation should be aborted
    High,
    /// Critical severity - the request itself is malformed
    Critical,
}

/// Main error type for feedrep operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path to the file with permission issues
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A replication request violated one of its preconditions
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Description of the violated precondition
        message: String,
    },

    /// A path segment could not be compiled into a matcher
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern {
        /// The offending segment
        pattern: String,
        /// Compiler diagnostic
        message: String,
    },

    /// The bulk-copy engine failed
    #[error("Copy failed: {message}")]
    Copy {
        /// Error message describing the copy failure
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Precondition violations
    Precondition,
    /// Pattern compilation errors
    Pattern,
    /// Copy engine errors
    Copy,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Precondition { .. } => ErrorKind::Precondition,
            Self::Pattern { .. } => ErrorKind::Pattern,
            Self::Copy { .. } => ErrorKind::Copy,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Medium,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } => ErrorSeverity::High,
            Self::Config { .. } => ErrorSeverity::High,
            Self::Precondition { .. } | Self::Pattern { .. } => ErrorSeverity::Critical,
            Self::Copy { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check whether re-running the same request could succeed
    ///
    /// Nothing inside feedrep retries; this is advisory for the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { message } => {
                message.contains("Interrupted")
                    || message.contains("would block")
                    || message.contains("timed out")
            }
            Self::Copy { .. } => true,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::Config { .. }
            | Self::Precondition { .. }
            | Self::Pattern { .. } => false,
        }
    }

    /// Map an I/O error raised while touching `path` onto the matching variant
    pub fn io_at(path: impl AsRef<Path>, error: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                message: format!("{}: {}", path.display(), error),
            },
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new precondition error
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a new pattern compilation error
    pub fn pattern<P: Into<String>, S: Into<String>>(pattern: P, message: S) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a new copy engine error
    pub fn copy<S: Into<String>>(message: S) -> Self {
        Self::Copy {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: PathBuf::new(),
            },
            _ => Self::Io {
                message: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    proptest! {
        #[test]
        fn test_error_kind_consistency(message in ".*") {
            let errors = vec![
                Error::Io { message: message.clone() },
                Error::Config { message: message.clone() },
                Error::Precondition { message: message.clone() },
                Error::Copy { message: message.clone() },
            ];

            for error in errors {
                let kind = error.kind();
                match error {
                    Error::Io { .. } => prop_assert_eq!(kind, ErrorKind::Io),
                    Error::Config { .. } => prop_assert_eq!(kind, ErrorKind::Config),
                    Error::Precondition { .. } => prop_assert_eq!(kind, ErrorKind::Precondition),
                    Error::Copy { .. } => prop_assert_eq!(kind, ErrorKind::Copy),
                    _ => {}
                }
            }
        }

        #[test]
        fn test_precondition_never_recoverable(message in ".*") {
            let error = Error::precondition(message);
            prop_assert_eq!(error.severity(), ErrorSeverity::Critical);
            prop_assert!(!error.is_recoverable());
        }
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Low < ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = Error::from(io_error);

        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(error.severity(), ErrorSeverity::Medium);
        assert!(error.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_io_error_conversion_keeps_dedicated_variants() {
        let not_found = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        let denied = Error::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));

        assert!(matches!(not_found, Error::FileNotFound { ref path } if path.as_os_str().is_empty()));
        assert!(matches!(denied, Error::PermissionDenied { .. }));
        assert!(!not_found.is_recoverable());
        assert_eq!(denied.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_at_maps_not_found() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = Error::io_at("/data/feed", io_error);

        assert!(matches!(error, Error::FileNotFound { ref path } if path == &PathBuf::from("/data/feed")));
        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_io_at_maps_permission_denied() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let error = Error::io_at("/protected", io_error);

        assert!(matches!(error, Error::PermissionDenied { .. }));
        assert_eq!(error.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_at_keeps_path_in_message() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded");
        let error = Error::io_at("/dest/_SUCCESS", io_error);

        let text = error.to_string();
        assert!(text.contains("/dest/_SUCCESS"));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn test_pattern_error_display() {
        let error = Error::pattern("[abc", "unclosed character class");

        assert_eq!(error.kind(), ErrorKind::Pattern);
        assert!(error.to_string().contains("[abc"));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_io_error_recoverability() {
        let recoverable = Error::Io {
            message: "Interrupted system call".to_string(),
        };
        assert!(recoverable.is_recoverable());

        let fatal = Error::Io {
            message: "No space left on device".to_string(),
        };
        assert!(!fatal.is_recoverable());
    }
}
