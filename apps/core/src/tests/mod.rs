//! Test Module
//!
//! Scenario tests spanning several modules.
//!
//! ## Test Categories
//! - `brain_tests`: classification rules, reply payloads, dispatch
//! - `conversation_tests`: history encoding and SQLite persistence
//! - `session_tests`: turn recording, restarts, failing storage, concurrency
//! - `config_tests`: environment-driven configuration

pub mod session_tests;
