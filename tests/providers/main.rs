//! Provider principal resolution test suite.
//!
//! Runs the GitHub and generic providers against an in-process mock of
//! their REST APIs.
//!
//! Run with: cargo test --test providers

mod mock_api;
mod test_helpers;

mod test_github;
