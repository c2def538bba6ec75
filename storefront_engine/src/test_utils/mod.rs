//! Helpers for tests in this crate and in crates that depend on it. Enable the `test_utils` feature to use them.
pub mod fake_gateway;
pub mod prepare_env;
pub mod seed;
