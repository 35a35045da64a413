//! Integration test binary. All integration tests live in one binary to keep
//! link time down.
//!
//! See <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod app_lifecycle;
mod host_bridge;
mod quote_flow;
