//! Integration test support for feedrep
//!
//! Fixtures that lay out feed directories on disk and inspect the
//! replicated tree afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod test_utils;
