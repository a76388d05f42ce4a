//! Integration tests for qabox
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them reach the cloud or a remote host.

mod cli_tests;
