//! Result type alias for feedrep operations

use crate::Error;

/// Result type alias for feedrep operations
pub type Result<T> = std::result::Result<T, Error>;
