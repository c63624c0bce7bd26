//! Integration test crate for median price feeds.
//!
//! This crate has no library code; it only contains integration tests that
//! exercise report and deviation flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p feeds-integration-tests
//! ```
