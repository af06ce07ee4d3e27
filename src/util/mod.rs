//! Shared utilities

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
